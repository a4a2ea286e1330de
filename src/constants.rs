//! Common constants used throughout the crate.
//!
//! This was consolidated here so the entire crate is on the same page about these constant
//! values. If a value is spelled incorrectly, at least it can be fixed in one spot.
//!
//! Tests that are testing the content of an error code, message, or form field name should not
//! use these constants; they should use hard-coded strings so the tests are also testing for
//! misspellings.
//!
//! Please keep this file organized alphabetically.

/// Algorithm for AWS SigV4
pub(crate) const AWS4_HMAC_SHA256: &str = "AWS4-HMAC-SHA256";

/// Prefix prepended to the raw secret key to form `kSecret`.
pub(crate) const AWS4_KEY_PREFIX: &[u8] = b"AWS4";

/// String included at the end of the AWS SigV4 credential scope
pub(crate) const AWS4_REQUEST: &str = "aws4_request";

/// Condition type for a content length range.
pub(crate) const COND_CONTENT_LENGTH_RANGE: &str = "content-length-range";

/// Condition type for an exact match.
pub(crate) const COND_EQ: &str = "eq";

/// Condition type for a prefix match.
pub(crate) const COND_STARTS_WITH: &str = "starts-with";

/// Error code: EncodingFailure
pub(crate) const ERR_CODE_ENCODING_FAILURE: &str = "EncodingFailure";

/// Error code: ExpiredOrInvalidExpiration
pub(crate) const ERR_CODE_EXPIRED_OR_INVALID_EXPIRATION: &str = "ExpiredOrInvalidExpiration";

/// Error code: InvalidCondition
pub(crate) const ERR_CODE_INVALID_CONDITION: &str = "InvalidCondition";

/// Error code: InvalidSigningContext
pub(crate) const ERR_CODE_INVALID_SIGNING_CONTEXT: &str = "InvalidSigningContext";

/// Error code: MalformedTimestamp
pub(crate) const ERR_CODE_MALFORMED_TIMESTAMP: &str = "MalformedTimestamp";

/// Error code: MissingCredentials
pub(crate) const ERR_CODE_MISSING_CREDENTIALS: &str = "MissingCredentials";

/// Error code: MissingParameter
pub(crate) const ERR_CODE_MISSING_PARAMETER: &str = "MissingParameter";

/// Error code: SignatureDoesNotMatch
pub(crate) const ERR_CODE_SIGNATURE_DOES_NOT_MATCH: &str = "SignatureDoesNotMatch";

/// Form field carrying the bucket name.
pub(crate) const FIELD_BUCKET: &str = "bucket";

/// Form field carrying the object key.
pub(crate) const FIELD_KEY: &str = "key";

/// Form field carrying the base64-encoded policy document.
pub(crate) const FIELD_POLICY: &str = "policy";

/// Form field carrying the signature algorithm.
pub(crate) const FIELD_X_AMZ_ALGORITHM: &str = "x-amz-algorithm";

/// Form field carrying the credential (`access_key/scope`).
pub(crate) const FIELD_X_AMZ_CREDENTIAL: &str = "x-amz-credential";

/// Form field carrying the signing timestamp.
pub(crate) const FIELD_X_AMZ_DATE: &str = "x-amz-date";

/// Prefix for user metadata form fields.
pub(crate) const FIELD_X_AMZ_META_PREFIX: &str = "x-amz-meta-";

/// Prefix for other `x-amz-*` form fields.
pub(crate) const FIELD_X_AMZ_PREFIX: &str = "x-amz-";

/// Form field carrying the session token for temporary credentials.
pub(crate) const FIELD_X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

/// Form field carrying the hex-encoded signature.
pub(crate) const FIELD_X_AMZ_SIGNATURE: &str = "x-amz-signature";

/// Compact ISO8601 format used for `x-amz-date`.
pub(crate) const ISO8601_COMPACT_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Short date format used in the credential scope.
pub(crate) const ISO8601_DATE_FORMAT: &str = "%Y%m%d";

/// Extended ISO8601 format used for the policy `expiration`.
pub(crate) const ISO8601_EXTENDED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Error message: `"The request signature we calculated does not match the signature you provided. Check your key and signing method."`
pub(crate) const MSG_POLICY_SIGNATURE_MISMATCH: &str =
    "The request signature we calculated does not match the signature you provided. Check your key and signing method.";

/// Policy document key for the conditions array.
pub(crate) const POLICY_CONDITIONS: &str = "conditions";

/// Policy document key for the expiration timestamp.
pub(crate) const POLICY_EXPIRATION: &str = "expiration";

/// Placeholder printed in place of secret material.
pub(crate) const REDACTED: &str = "<redacted>";

/// The only service a POST policy is ever scoped to.
pub(crate) const S3_SERVICE: &str = "s3";

/// The length of a SHA-256 digest in bytes.
pub(crate) const SHA256_OUTPUT_LEN: usize = 32;

/// The length of a hex-encoded SHA-256 digest.
pub(crate) const SHA256_HEX_LENGTH: usize = SHA256_OUTPUT_LEN * 2;
