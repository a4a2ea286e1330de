use {
    crate::{constants::*, CanonicalPolicy},
    std::collections::{btree_map, BTreeMap},
};

/// The form fields a client embeds in its POST upload.
///
/// Always contains `policy`, `x-amz-algorithm`, `x-amz-credential`, `x-amz-date`, and
/// `x-amz-signature`. `x-amz-security-token` is present only for temporary credentials; it is
/// never present with an empty value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedFields {
    fields: BTreeMap<String, String>,
}

impl SignedFields {
    /// Assemble the fields from already-computed values.
    pub(crate) fn package(
        policy: CanonicalPolicy,
        credential: String,
        amz_date: String,
        signature: String,
        session_token: Option<&str>,
    ) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(FIELD_POLICY.to_string(), String::from(policy));
        fields.insert(FIELD_X_AMZ_ALGORITHM.to_string(), AWS4_HMAC_SHA256.to_string());
        fields.insert(FIELD_X_AMZ_CREDENTIAL.to_string(), credential);
        fields.insert(FIELD_X_AMZ_DATE.to_string(), amz_date);
        fields.insert(FIELD_X_AMZ_SIGNATURE.to_string(), signature);

        if let Some(token) = session_token {
            fields.insert(FIELD_X_AMZ_SECURITY_TOKEN.to_string(), token.to_string());
        }

        Self {
            fields,
        }
    }

    /// Look up a field by name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Returns `true` if the named field is present.
    #[inline]
    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// The base64-encoded policy (`policy`).
    pub fn policy(&self) -> &str {
        self.get(FIELD_POLICY).unwrap_or_default()
    }

    /// The signature algorithm (`x-amz-algorithm`), always `AWS4-HMAC-SHA256`.
    pub fn algorithm(&self) -> &str {
        self.get(FIELD_X_AMZ_ALGORITHM).unwrap_or_default()
    }

    /// The credential (`x-amz-credential`), `access_key/YYYYMMDD/region/s3/aws4_request`.
    pub fn credential(&self) -> &str {
        self.get(FIELD_X_AMZ_CREDENTIAL).unwrap_or_default()
    }

    /// The signing timestamp (`x-amz-date`) in `YYYYMMDDTHHMMSSZ` form.
    pub fn date(&self) -> &str {
        self.get(FIELD_X_AMZ_DATE).unwrap_or_default()
    }

    /// The lowercase hex signature (`x-amz-signature`).
    pub fn signature(&self) -> &str {
        self.get(FIELD_X_AMZ_SIGNATURE).unwrap_or_default()
    }

    /// The session token (`x-amz-security-token`), if any.
    pub fn security_token(&self) -> Option<&str> {
        self.get(FIELD_X_AMZ_SECURITY_TOKEN)
    }

    /// Iterate over the fields in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.fields.iter()
    }

    /// The number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always `false`; the mandatory fields are present in every instance.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume this, returning the underlying map.
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.fields
    }
}

impl<'a> IntoIterator for &'a SignedFields {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl IntoIterator for SignedFields {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use {
        crate::{CanonicalPolicy, Condition, PolicyDocument, SignedFields},
        chrono::{Duration, TimeZone, Utc},
    };

    fn policy() -> CanonicalPolicy {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let doc = PolicyDocument::new(now + Duration::days(1), vec![Condition::key_starts_with("a/")], now).unwrap();
        CanonicalPolicy::from_document(&doc).unwrap()
    }

    #[test_log::test]
    fn test_package_without_token() {
        let policy = policy();
        let fields = SignedFields::package(
            policy.clone(),
            "AKIDEXAMPLE/20240101/us-east-1/s3/aws4_request".to_string(),
            "20240101T000000Z".to_string(),
            "ab".repeat(32),
            None,
        );

        assert_eq!(fields.len(), 5);
        assert!(!fields.is_empty());
        assert_eq!(fields.policy(), policy.as_str());
        assert_eq!(fields.get("policy"), Some(policy.as_str()));
        assert_eq!(fields.algorithm(), "AWS4-HMAC-SHA256");
        assert_eq!(fields.credential(), "AKIDEXAMPLE/20240101/us-east-1/s3/aws4_request");
        assert_eq!(fields.date(), "20240101T000000Z");
        assert_eq!(fields.signature(), "ab".repeat(32));
        assert_eq!(fields.security_token(), None);
        assert!(!fields.contains_key("x-amz-security-token"));

        let names: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["policy", "x-amz-algorithm", "x-amz-credential", "x-amz-date", "x-amz-signature"]);
    }

    #[test_log::test]
    fn test_package_with_token() {
        let fields = SignedFields::package(
            policy(),
            "ASIAEXAMPLE/20240101/us-east-1/s3/aws4_request".to_string(),
            "20240101T000000Z".to_string(),
            "cd".repeat(32),
            Some("FQoGZXIvYXdzEXAMPLE"),
        );

        assert_eq!(fields.len(), 6);
        assert_eq!(fields.security_token(), Some("FQoGZXIvYXdzEXAMPLE"));
        let map = fields.clone().into_map();
        assert_eq!(map.get("x-amz-security-token").map(String::as_str), Some("FQoGZXIvYXdzEXAMPLE"));
        assert_eq!((&fields).into_iter().count(), 6);
        assert_eq!(fields.into_iter().count(), 6);
    }
}
