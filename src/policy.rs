use {
    crate::{
        chronoutil::{format_expiration, truncate_to_seconds},
        constants::*,
        Condition, PostPolicyError,
    },
    chrono::{DateTime, Utc},
    log::trace,
    serde::ser::{Serialize, SerializeMap, Serializer},
};

/// A POST policy document: an expiration and the ordered conditions the upload must satisfy.
///
/// Condition order is part of the signed bytes; two documents with the same conditions in a
/// different order produce different signatures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyDocument {
    expiration: DateTime<Utc>,
    conditions: Vec<Condition>,
}

impl PolicyDocument {
    /// Create a policy document.
    ///
    /// The expiration is truncated to whole seconds and must be strictly after `now`; otherwise
    /// this fails with [`PostPolicyError::ExpiredOrInvalidExpiration`]. `now` is supplied by the
    /// caller, usually `Utc::now()`.
    pub fn new(
        expiration: DateTime<Utc>,
        conditions: Vec<Condition>,
        now: DateTime<Utc>,
    ) -> Result<Self, PostPolicyError> {
        let expiration = truncate_to_seconds(expiration);
        if expiration <= now {
            trace!("PolicyDocument::new: expiration {} is not after {}", expiration, now);
            return Err(PostPolicyError::ExpiredOrInvalidExpiration(format!(
                "Policy expiration {} must be after the current time {}",
                format_expiration(&expiration),
                format_expiration(&now),
            )));
        }

        Ok(Self {
            expiration,
            conditions,
        })
    }

    /// The expiration timestamp.
    #[inline]
    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    /// The conditions, in the order they will be serialized.
    #[inline]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Serialize this document to compact JSON.
    ///
    /// The output is byte-for-byte deterministic: `expiration` first, then `conditions` in
    /// insertion order, with no insignificant whitespace.
    pub fn to_json(&self) -> Result<String, PostPolicyError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for PolicyDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(POLICY_EXPIRATION, &format_expiration(&self.expiration))?;
        map.serialize_entry(POLICY_CONDITIONS, &self.conditions)?;
        map.end()
    }
}
