//! AWS SigV4 POST policy signing for browser-based S3 uploads.
//!
//! A POST policy is a JSON document listing the conditions an upload form must satisfy. It is
//! base64-encoded and signed with a key derived from the caller's secret key, the signing date,
//! and the region. The encoded policy, the signature, and the credential metadata are then
//! embedded as form fields so a browser can upload directly to a bucket.
//!
//! ```
//! use {
//!     chrono::{Duration, TimeZone, Utc},
//!     scratchstack_s3_post_policy::{Condition, Credentials, PostObjectPresigner, PostObjectRequest},
//! };
//!
//! # fn main() -> Result<(), scratchstack_s3_post_policy::PostPolicyError> {
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let credentials = Credentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY");
//! let presigner = PostObjectPresigner::builder().region("us-east-1").build()?;
//! let request = PostObjectRequest::builder()
//!     .bucket("my-bucket")
//!     .expires_in(Duration::hours(1), now)
//!     .condition(Condition::key_starts_with("uploads/"))
//!     .condition(Condition::content_length_range(0, 10 * 1024 * 1024)?)
//!     .build()?;
//!
//! let presigned = presigner.presign(&credentials, &request, now)?;
//! assert_eq!(presigned.url().to_string(), "https://my-bucket.s3.us-east-1.amazonaws.com/");
//! assert_eq!(presigned.fields()["x-amz-credential"], "AKIDEXAMPLE/20240101/us-east-1/s3/aws4_request");
//! # Ok(())
//! # }
//! ```
//!
//! The lower-level pieces ([`PolicyDocument`], [`CanonicalPolicy`], [`sign_post_policy`], and
//! [`verify_post_signature`]) are available for callers that manage their own conditions.

#![warn(missing_docs)]

mod canonical;
mod chronoutil;
mod condition;
mod constants;
mod credentials;
mod crypto;
mod error;
mod fields;
mod policy;
mod presign;
mod signature;
mod signing_key;

pub use {
    canonical::CanonicalPolicy,
    chronoutil::parse_iso8601,
    condition::{Condition, ContentLengthRange, ExactMatch, StartsWith},
    credentials::{Credentials, CredentialsBuilder, SecretKey},
    error::PostPolicyError,
    fields::SignedFields,
    policy::PolicyDocument,
    presign::{
        PostObjectPresigner, PostObjectPresignerBuilder, PostObjectRequest, PostObjectRequestBuilder,
        PresignedPostObject,
    },
    signature::{
        sign_policy, sign_post_policy, verify_post_signature, CredentialScope, PolicySignature, SigningContext,
        SigningContextBuilder,
    },
    signing_key::{derive_signing_key, KDateKey, KRegionKey, KServiceKey, KSecretKey, KSigningKey},
};
