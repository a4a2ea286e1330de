//! Signature assembly for POST policies.
//!
//! This joins the canonical policy with the signing key derived from the caller's credentials
//! and the signing context, and packages the result as form fields.

use {
    crate::{
        chronoutil::{format_amz_date, format_expiration, format_scope_date, truncate_to_seconds},
        constants::*,
        derive_signing_key, CanonicalPolicy, Credentials, KSigningKey, PolicyDocument, PostPolicyError,
        SignedFields,
    },
    chrono::{DateTime, NaiveDate, Utc},
    derive_builder::Builder,
    log::{debug, trace},
    std::fmt::{Display, Formatter, Result as FmtResult},
    subtle::ConstantTimeEq,
};

/// Where and when a policy is signed.
///
/// The service is always `s3`. The signing date defaults to the calendar date of the signing
/// timestamp and, if set explicitly, must match it.
#[derive(Builder, Clone, Debug, PartialEq, Eq)]
#[builder(build_fn(error = "PostPolicyError", validate = "Self::validate"))]
pub struct SigningContext {
    /// The region of the bucket, e.g. `us-east-1`.
    #[builder(setter(into))]
    region: String,

    /// The signing timestamp. Sub-second precision is discarded.
    timestamp: DateTime<Utc>,

    /// The signing date, if different from the default.
    #[builder(setter(strip_option), default)]
    date: Option<NaiveDate>,
}

pub(crate) fn validate_region(region: &str) -> Result<(), PostPolicyError> {
    if region.is_empty() {
        return Err(PostPolicyError::InvalidSigningContext("Region must not be empty".to_string()));
    }

    if region.contains('/') {
        return Err(PostPolicyError::InvalidSigningContext(format!("Region must not contain '/': '{}'", region)));
    }

    Ok(())
}

impl SigningContextBuilder {
    fn validate(&self) -> Result<(), PostPolicyError> {
        if let Some(region) = &self.region {
            validate_region(region)?;
        }

        if let (Some(timestamp), Some(Some(date))) = (&self.timestamp, &self.date) {
            if timestamp.date_naive() != *date {
                return Err(PostPolicyError::InvalidSigningContext(format!(
                    "Signing date {} does not match signing timestamp {}",
                    format_scope_date(*date),
                    format_amz_date(timestamp),
                )));
            }
        }

        Ok(())
    }
}

impl SigningContext {
    /// Create a signing context for the given region and timestamp.
    pub fn new<R: Into<String>>(region: R, timestamp: DateTime<Utc>) -> Result<Self, PostPolicyError> {
        Self::builder().region(region).timestamp(timestamp).build()
    }

    /// Create a [SigningContextBuilder] to construct a [SigningContext].
    #[inline]
    pub fn builder() -> SigningContextBuilder {
        SigningContextBuilder::default()
    }

    /// Retrieve the region.
    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Retrieve the service; always `s3`.
    #[inline]
    pub fn service(&self) -> &'static str {
        S3_SERVICE
    }

    /// Retrieve the signing timestamp, truncated to whole seconds.
    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        truncate_to_seconds(self.timestamp)
    }

    /// Retrieve the signing date.
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| self.timestamp.date_naive())
    }

    /// The credential scope for this context.
    pub fn credential_scope(&self) -> CredentialScope {
        CredentialScope {
            date: self.date(),
            region: self.region.clone(),
        }
    }

    /// The `x-amz-date` form of the signing timestamp.
    pub fn amz_date(&self) -> String {
        format_amz_date(&self.timestamp())
    }
}

/// The scope a signature is bound to: `YYYYMMDD/region/s3/aws4_request`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CredentialScope {
    date: NaiveDate,
    region: String,
}

impl CredentialScope {
    /// The date component.
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The region component.
    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The full credential for an access key: `access_key/scope`.
    pub fn credential_for(&self, access_key_id: &str) -> String {
        format!("{}/{}", access_key_id, self)
    }
}

impl Display for CredentialScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}/{}/{}", format_scope_date(self.date), self.region, S3_SERVICE, AWS4_REQUEST)
    }
}

/// The output of the signature assembler, before packaging into form fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicySignature {
    credential: String,
    signature: String,
}

impl PolicySignature {
    /// The full credential, `access_key/YYYYMMDD/region/s3/aws4_request`.
    #[inline]
    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// The lowercase hex signature.
    #[inline]
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

/// Fail with [`PostPolicyError::MissingCredentials`] if either half of the key pair is empty.
pub(crate) fn check_credentials(credentials: &Credentials) -> Result<(), PostPolicyError> {
    if credentials.access_key_id().is_empty() {
        return Err(PostPolicyError::MissingCredentials("Access key id must not be empty".to_string()));
    }

    if credentials.secret_key().is_empty() {
        return Err(PostPolicyError::MissingCredentials("Secret key must not be empty".to_string()));
    }

    Ok(())
}

/// Sign an already-encoded policy.
///
/// The signing key is derived for the context's date and region, and the signature is the
/// lowercase hex HMAC-SHA256 of the encoded policy bytes.
pub fn sign_policy(
    credentials: &Credentials,
    context: &SigningContext,
    policy: &CanonicalPolicy,
) -> Result<PolicySignature, PostPolicyError> {
    check_credentials(credentials)?;

    let scope = context.credential_scope();
    let signing_key = derive_signing_key(credentials.secret_key(), scope.date(), scope.region());
    let signature = signing_key.sign(policy.as_bytes());
    let credential = scope.credential_for(credentials.access_key_id());
    trace!("sign_policy: credential={} signature={}", credential, signature);

    Ok(PolicySignature {
        credential,
        signature,
    })
}

/// Build, encode, sign, and package a policy document in one pass.
///
/// # Errors
/// * [`PostPolicyError::ExpiredOrInvalidExpiration`] if the document expires at or before the
///   signing timestamp.
/// * [`PostPolicyError::MissingCredentials`] if the access key id or secret key is empty.
/// * [`PostPolicyError::EncodingFailure`] if the document cannot be serialized.
///
/// No partial output is produced on failure.
pub fn sign_post_policy(
    credentials: &Credentials,
    context: &SigningContext,
    document: &PolicyDocument,
) -> Result<SignedFields, PostPolicyError> {
    let timestamp = context.timestamp();
    if document.expiration() <= timestamp {
        trace!("sign_post_policy: expiration {} is not after signing time {}", document.expiration(), timestamp);
        return Err(PostPolicyError::ExpiredOrInvalidExpiration(format!(
            "Policy expiration {} must be after the signing time {}",
            format_expiration(&document.expiration()),
            format_expiration(&timestamp),
        )));
    }

    check_credentials(credentials)?;

    let policy = CanonicalPolicy::from_document(document)?;
    let signed = sign_policy(credentials, context, &policy)?;
    debug!("Signed POST policy for {} in {}", signed.credential, context.region());

    Ok(SignedFields::package(
        policy,
        signed.credential,
        context.amz_date(),
        signed.signature,
        credentials.session_token(),
    ))
}

/// Verify the signature of a received POST upload.
///
/// `policy` and `signature` are the `policy` and `x-amz-signature` form fields as received;
/// `signing_key` is the key for the date and region named in the request's `x-amz-credential`.
/// The comparison is constant-time.
pub fn verify_post_signature(signing_key: &KSigningKey, policy: &str, signature: &str) -> Result<(), PostPolicyError> {
    let expected_signature = signing_key.sign(policy.as_bytes());

    if signature.len() != SHA256_HEX_LENGTH {
        trace!("verify_post_signature: signature has length {}, expected {}", signature.len(), SHA256_HEX_LENGTH);
        return Err(PostPolicyError::SignatureDoesNotMatch(Some(MSG_POLICY_SIGNATURE_MISMATCH.to_string())));
    }

    let is_equal: bool = signature.as_bytes().ct_eq(expected_signature.as_bytes()).into();
    if !is_equal {
        trace!("Signature mismatch: expected '{}', got '{}'", expected_signature, signature);
        Err(PostPolicyError::SignatureDoesNotMatch(Some(MSG_POLICY_SIGNATURE_MISMATCH.to_string())))
    } else {
        Ok(())
    }
}
