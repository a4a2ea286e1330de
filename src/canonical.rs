use {
    crate::{PolicyDocument, PostPolicyError},
    base64::{engine::general_purpose::STANDARD, Engine},
    log::trace,
    std::fmt::{Display, Formatter, Result as FmtResult},
};

/// The base64-encoded policy document.
///
/// This exact string is both sent to the client as the `policy` form field and signed; it is
/// computed once and reused for both.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalPolicy {
    encoded: String,
}

impl CanonicalPolicy {
    /// Serialize `document` to UTF-8 JSON and encode it with the standard base64 alphabet, with
    /// padding and without line wrapping.
    pub fn from_document(document: &PolicyDocument) -> Result<Self, PostPolicyError> {
        let json = document.to_json()?;
        trace!("Policy document: {}", json);
        Ok(Self {
            encoded: STANDARD.encode(json.as_bytes()),
        })
    }

    /// The encoded policy.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// The encoded policy as the bytes to sign.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.encoded.as_bytes()
    }
}

impl AsRef<str> for CanonicalPolicy {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

impl Display for CanonicalPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.encoded)
    }
}

impl From<CanonicalPolicy> for String {
    fn from(policy: CanonicalPolicy) -> Self {
        policy.encoded
    }
}
