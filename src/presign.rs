//! Presigned POST uploads.
//!
//! [`PostObjectPresigner`] is the high-level entry point: it adds the bucket and signing
//! conditions to the caller's policy, signs it, and returns the upload URL together with every
//! form field the client must send.

use {
    crate::{
        constants::*,
        sign_post_policy,
        signature::{check_credentials, validate_region},
        Condition, Credentials, PolicyDocument, PostPolicyError, SignedFields, SigningContext,
    },
    chrono::{DateTime, Duration, Utc},
    derive_builder::Builder,
    http::uri::{Authority, Scheme, Uri},
    lazy_static::lazy_static,
    log::debug,
    regex::Regex,
    std::collections::BTreeMap,
};

/// Form fields a caller may not constrain themselves; the presigner supplies them.
const RESERVED_FIELDS: [&str; 7] = [
    FIELD_BUCKET,
    FIELD_POLICY,
    FIELD_X_AMZ_ALGORITHM,
    FIELD_X_AMZ_CREDENTIAL,
    FIELD_X_AMZ_DATE,
    FIELD_X_AMZ_SECURITY_TOKEN,
    FIELD_X_AMZ_SIGNATURE,
];

lazy_static! {
    /// Characters a bucket name may use. Buckets are placed in the URL host or path verbatim.
    static ref BUCKET_NAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9._-]+$").expect("bucket name regex is valid");
}

/// A request to presign a POST upload into a bucket.
///
/// PostObjectRequest structs are immutable. Use [`PostObjectRequestBuilder`] to construct one.
#[derive(Builder, Clone, Debug, PartialEq, Eq)]
#[builder(build_fn(error = "PostPolicyError", validate = "Self::validate"))]
pub struct PostObjectRequest {
    /// The destination bucket.
    #[builder(setter(into))]
    bucket: String,

    /// When the policy stops being accepted.
    expiration: DateTime<Utc>,

    /// Caller conditions, in order. The presigner appends its own after these.
    #[builder(setter(each(name = "condition")), default)]
    conditions: Vec<Condition>,
}

impl PostObjectRequestBuilder {
    /// Set the expiration relative to `now`.
    pub fn expires_in(&mut self, duration: Duration, now: DateTime<Utc>) -> &mut Self {
        self.expiration = Some(now + duration);
        self
    }

    fn validate(&self) -> Result<(), PostPolicyError> {
        if let Some(bucket) = &self.bucket {
            if bucket.is_empty() {
                return Err(PostPolicyError::InvalidCondition("Bucket must not be empty".to_string()));
            }

            if !BUCKET_NAME_REGEX.is_match(bucket) {
                return Err(PostPolicyError::InvalidCondition(format!(
                    "Bucket name may only contain letters, digits, '.', '-', and '_': '{}'",
                    bucket
                )));
            }
        }

        for condition in self.conditions.iter().flatten() {
            if let Some(field) = condition.field() {
                if RESERVED_FIELDS.iter().any(|r| r.eq_ignore_ascii_case(field)) {
                    return Err(PostPolicyError::InvalidCondition(format!(
                        "Condition on '{}' is added by the presigner and must not be supplied",
                        field
                    )));
                }
            }
        }

        Ok(())
    }
}

impl PostObjectRequest {
    /// Create a [PostObjectRequestBuilder] to construct a [PostObjectRequest].
    #[inline]
    pub fn builder() -> PostObjectRequestBuilder {
        PostObjectRequestBuilder::default()
    }

    /// Retrieve the bucket.
    #[inline]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Retrieve the expiration.
    #[inline]
    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    /// Retrieve the caller conditions.
    #[inline]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}

/// Everything a client needs to perform the upload: where to POST and which form fields to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresignedPostObject {
    url: Uri,
    fields: BTreeMap<String, String>,
    expiration: DateTime<Utc>,
}

impl PresignedPostObject {
    /// The URL to POST the multipart form to.
    #[inline]
    pub fn url(&self) -> &Uri {
        &self.url
    }

    /// The form fields, in name order. The file itself must be the last part of the form.
    #[inline]
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// When the policy expires.
    #[inline]
    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }
}

/// Presigns POST uploads for one region and endpoint.
#[derive(Builder, Clone, Debug)]
#[builder(build_fn(error = "PostPolicyError", validate = "Self::validate"))]
pub struct PostObjectPresigner {
    /// The region of the buckets this presigner signs for.
    #[builder(setter(into))]
    region: String,

    /// An S3-compatible endpoint to use instead of `https://s3.<region>.amazonaws.com`.
    #[builder(setter(strip_option), default)]
    endpoint: Option<Uri>,

    /// Address buckets as a path component (`https://host/bucket`) rather than as a subdomain.
    #[builder(default)]
    path_style: bool,
}

impl PostObjectPresignerBuilder {
    fn validate(&self) -> Result<(), PostPolicyError> {
        if let Some(region) = &self.region {
            validate_region(region)?;
        }

        if let Some(Some(endpoint)) = &self.endpoint {
            if endpoint.authority().is_none() {
                return Err(PostPolicyError::InvalidSigningContext(format!(
                    "Endpoint must include a host: '{}'",
                    endpoint
                )));
            }
        }

        Ok(())
    }
}

impl PostObjectPresigner {
    /// Create a [PostObjectPresignerBuilder] to construct a [PostObjectPresigner].
    #[inline]
    pub fn builder() -> PostObjectPresignerBuilder {
        PostObjectPresignerBuilder::default()
    }

    /// Retrieve the region.
    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Retrieve the endpoint override, if any.
    #[inline]
    pub fn endpoint(&self) -> Option<&Uri> {
        self.endpoint.as_ref()
    }

    /// Returns `true` if buckets are addressed path-style.
    #[inline]
    pub fn path_style(&self) -> bool {
        self.path_style
    }

    /// The URL a POST upload into `bucket` is sent to.
    ///
    /// The bucket is inserted without percent-encoding; names that do not form a valid host or
    /// path fail with [`PostPolicyError::InvalidCondition`].
    pub fn upload_url(&self, bucket: &str) -> Result<Uri, PostPolicyError> {
        let (scheme, host, port, base_path) = match &self.endpoint {
            Some(endpoint) => {
                // Validated at build time.
                let authority = endpoint.authority().map(Authority::host).unwrap_or_default();
                (
                    endpoint.scheme().cloned().unwrap_or(Scheme::HTTPS),
                    authority.to_string(),
                    endpoint.port_u16(),
                    endpoint.path().trim_end_matches('/').to_string(),
                )
            }
            None => (Scheme::HTTPS, format!("s3.{}.amazonaws.com", self.region), None, String::new()),
        };

        let (host, path) = if self.path_style {
            (host, format!("{}/{}", base_path, bucket))
        } else {
            (format!("{}.{}", bucket, host), format!("{}/", base_path))
        };

        let authority = match port {
            Some(port) => format!("{}:{}", host, port),
            None => host,
        };

        Uri::builder().scheme(scheme).authority(authority).path_and_query(path).build().map_err(|e| {
            PostPolicyError::InvalidCondition(format!("Bucket '{}' does not form a valid upload URL: {}", bucket, e))
        })
    }

    /// Presign a POST upload.
    ///
    /// `now` is both the signing timestamp and the reference point for the expiration check.
    /// The signed policy contains the caller's conditions followed by `bucket`,
    /// `x-amz-algorithm`, `x-amz-credential`, `x-amz-date`, and (for temporary credentials)
    /// `x-amz-security-token`, each as an exact match. The returned form fields include every
    /// exact-match value except `bucket`, which is carried by the URL.
    pub fn presign(
        &self,
        credentials: &Credentials,
        request: &PostObjectRequest,
        now: DateTime<Utc>,
    ) -> Result<PresignedPostObject, PostPolicyError> {
        check_credentials(credentials)?;

        let context = SigningContext::new(self.region.clone(), now)?;
        let credential = context.credential_scope().credential_for(credentials.access_key_id());
        let url = self.upload_url(request.bucket())?;

        let mut conditions = request.conditions().to_vec();
        conditions.push(Condition::bucket_equals(request.bucket()));
        conditions.push(Condition::algorithm_equals(AWS4_HMAC_SHA256));
        conditions.push(Condition::credential_equals(credential));
        conditions.push(Condition::date_equals(context.amz_date()));
        if let Some(token) = credentials.session_token() {
            conditions.push(Condition::security_token_equals(token));
        }

        let document = PolicyDocument::new(request.expiration(), conditions, context.timestamp())?;
        let signed: SignedFields = sign_post_policy(credentials, &context, &document)?;

        let mut fields = signed.into_map();
        for condition in document.conditions() {
            if let Condition::ExactMatch(m) = condition {
                if m.field() != FIELD_BUCKET {
                    fields.entry(m.field().to_string()).or_insert_with(|| m.value().to_string());
                }
            }
        }

        debug!("Presigned POST upload to {} with {} form fields", url, fields.len());

        Ok(PresignedPostObject {
            url,
            fields,
            expiration: document.expiration(),
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{Condition, Credentials, PostObjectPresigner, PostObjectRequest, PostPolicyError},
        base64::{engine::general_purpose::STANDARD, Engine},
        chrono::{DateTime, Duration, TimeZone, Utc},
        http::Uri,
    };

    const SECRET_KEY: &str = "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn presigner() -> PostObjectPresigner {
        PostObjectPresigner::builder().region("us-east-1").build().unwrap()
    }

    fn request() -> PostObjectRequest {
        PostObjectRequest::builder()
            .bucket("my-bucket")
            .expires_in(Duration::days(1), now())
            .condition(Condition::key_starts_with("uploads/"))
            .condition(Condition::content_length_range(0, 10485760).unwrap())
            .condition(Condition::acl_equals("private"))
            .build()
            .unwrap()
    }

    fn decoded_policy(policy: &str) -> String {
        String::from_utf8(STANDARD.decode(policy).unwrap()).unwrap()
    }

    #[test_log::test]
    fn test_presign_augments_policy() {
        let creds = Credentials::new("AKIDEXAMPLE", SECRET_KEY);
        let presigned = presigner().presign(&creds, &request(), now()).unwrap();

        assert_eq!(presigned.url().to_string(), "https://my-bucket.s3.us-east-1.amazonaws.com/");
        assert_eq!(presigned.expiration(), Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());

        let fields = presigned.fields();
        assert_eq!(fields["x-amz-algorithm"], "AWS4-HMAC-SHA256");
        assert_eq!(fields["x-amz-credential"], "AKIDEXAMPLE/20240101/us-east-1/s3/aws4_request");
        assert_eq!(fields["x-amz-date"], "20240101T000000Z");
        assert_eq!(fields["acl"], "private");
        assert_eq!(fields["x-amz-signature"].len(), 64);
        assert!(!fields.contains_key("bucket"));
        assert!(!fields.contains_key("key"));
        assert!(!fields.contains_key("x-amz-security-token"));

        assert_eq!(
            decoded_policy(&fields["policy"]),
            concat!(
                r#"{"expiration":"2024-01-02T00:00:00Z","conditions":["#,
                r#"["starts-with","$key","uploads/"],"#,
                r#"["content-length-range",0,10485760],"#,
                r#"["eq","$acl","private"],"#,
                r#"["eq","$bucket","my-bucket"],"#,
                r#"["eq","$x-amz-algorithm","AWS4-HMAC-SHA256"],"#,
                r#"["eq","$x-amz-credential","AKIDEXAMPLE/20240101/us-east-1/s3/aws4_request"],"#,
                r#"["eq","$x-amz-date","20240101T000000Z"]]}"#
            )
        );
    }

    #[test_log::test]
    fn test_presign_with_session_token() {
        let creds = Credentials::new("ASIAEXAMPLE", SECRET_KEY).with_session_token("session-token");
        let presigned = presigner().presign(&creds, &request(), now()).unwrap();
        assert_eq!(presigned.fields()["x-amz-security-token"], "session-token");
        assert!(decoded_policy(&presigned.fields()["policy"])
            .ends_with(r#"["eq","$x-amz-security-token","session-token"]]}"#));
    }

    #[test_log::test]
    fn test_presign_exact_key_is_echoed() {
        let request = PostObjectRequest::builder()
            .bucket("my-bucket")
            .expiration(now() + Duration::hours(1))
            .condition(Condition::key_equals("uploads/photo.jpg"))
            .build()
            .unwrap();
        let presigned = presigner().presign(&Credentials::new("AKIDEXAMPLE", SECRET_KEY), &request, now()).unwrap();
        assert_eq!(presigned.fields()["key"], "uploads/photo.jpg");
    }

    #[test_log::test]
    fn test_presign_expired() {
        let creds = Credentials::new("AKIDEXAMPLE", SECRET_KEY);
        let e = presigner().presign(&creds, &request(), now() + Duration::days(1)).unwrap_err();
        assert!(matches!(e, PostPolicyError::ExpiredOrInvalidExpiration(_)));
    }

    #[test_log::test]
    fn test_presign_missing_credentials() {
        let e = presigner().presign(&Credentials::new("AKIDEXAMPLE", ""), &request(), now()).unwrap_err();
        assert!(matches!(e, PostPolicyError::MissingCredentials(_)));
    }

    #[test_log::test]
    fn test_request_validation() {
        let e = PostObjectRequest::builder().bucket("").expiration(now()).build().unwrap_err();
        assert_eq!(e.to_string(), "Bucket must not be empty");

        let e = PostObjectRequest::builder().expiration(now()).build().unwrap_err();
        assert_eq!(e.to_string(), "Missing required parameter: bucket");

        let e = PostObjectRequest::builder()
            .bucket("b")
            .expiration(now())
            .condition(Condition::exact_match("X-Amz-Date", "20240101T000000Z").unwrap())
            .build()
            .unwrap_err();
        assert_eq!(e.to_string(), "Condition on 'X-Amz-Date' is added by the presigner and must not be supplied");

        let e = PostObjectRequest::builder()
            .bucket("b")
            .expiration(now())
            .condition(Condition::bucket_equals("other"))
            .build()
            .unwrap_err();
        assert!(matches!(e, PostPolicyError::InvalidCondition(_)));

        let e = PostObjectRequest::builder()
            .bucket("b")
            .expiration(now())
            .condition(Condition::exact_match("Bucket", "other-bucket").unwrap())
            .build()
            .unwrap_err();
        assert_eq!(e.to_string(), "Condition on 'Bucket' is added by the presigner and must not be supplied");

        for bad in ["my bucket", "a/b", "b?x=1", "b%20"] {
            let e = PostObjectRequest::builder().bucket(bad).expiration(now()).build().unwrap_err();
            assert_eq!(
                e.to_string(),
                format!("Bucket name may only contain letters, digits, '.', '-', and '_': '{}'", bad)
            );
        }

        let ok = PostObjectRequest::builder().bucket("logs.example-bucket_1").expiration(now()).build().unwrap();
        assert_eq!(ok.bucket(), "logs.example-bucket_1");
    }

    #[test_log::test]
    fn test_upload_urls() {
        let virtual_host = presigner();
        assert_eq!(virtual_host.upload_url("b").unwrap().to_string(), "https://b.s3.us-east-1.amazonaws.com/");

        let path_style = PostObjectPresigner::builder().region("eu-west-1").path_style(true).build().unwrap();
        assert!(path_style.path_style());
        assert_eq!(path_style.upload_url("b").unwrap().to_string(), "https://s3.eu-west-1.amazonaws.com/b");

        let custom = PostObjectPresigner::builder()
            .region("us-east-1")
            .endpoint(Uri::from_static("http://localhost:9000"))
            .path_style(true)
            .build()
            .unwrap();
        assert_eq!(custom.endpoint().and_then(Uri::host), Some("localhost"));
        assert_eq!(custom.upload_url("b").unwrap().to_string(), "http://localhost:9000/b");

        let custom_vhost = PostObjectPresigner::builder()
            .region("us-east-1")
            .endpoint(Uri::from_static("https://storage.example.com/s3/"))
            .build()
            .unwrap();
        assert_eq!(custom_vhost.upload_url("b").unwrap().to_string(), "https://b.storage.example.com/s3/");

        assert!(virtual_host.upload_url("bad bucket").is_err());
    }

    #[test_log::test]
    fn test_presigner_validation() {
        let e = PostObjectPresigner::builder().region("").build().unwrap_err();
        assert_eq!(e.to_string(), "Region must not be empty");

        let e = PostObjectPresigner::builder().build().unwrap_err();
        assert!(matches!(e, PostPolicyError::UninitializedField("region")));

        let e = PostObjectPresigner::builder().region("us-east-1").endpoint(Uri::from_static("/relative")).build();
        assert!(e.is_err());
    }
}
