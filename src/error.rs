use {
    crate::constants::*,
    derive_builder::UninitializedFieldError,
    http::status::StatusCode,
    scratchstack_errors::ServiceError,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

/// Error returned when a POST policy cannot be built, signed, or verified.
///
/// Messages never include secret key material.
#[derive(Debug)]
#[non_exhaustive]
pub enum PostPolicyError {
    /// The policy document could not be serialized. This indicates a programming-contract
    /// violation rather than bad input.
    EncodingFailure(Box<dyn Error + Send + Sync>),

    /// The expiration is not strictly after the supplied current time.
    ExpiredOrInvalidExpiration(/* message */ String),

    /// A condition was malformed at construction time: an empty field name, a field name
    /// carrying its own `$` sigil, or a content length range with `min > max`.
    InvalidCondition(/* message */ String),

    /// The signing context is inconsistent, e.g. an empty region or a signing date that does
    /// not match the signing timestamp.
    InvalidSigningContext(/* message */ String),

    /// A timestamp string could not be parsed as ISO 8601.
    MalformedTimestamp(/* message */ String),

    /// The access key or secret key is empty.
    MissingCredentials(/* message */ String),

    /// A received POST policy signature did not match the calculated signature.
    SignatureDoesNotMatch(Option</* message */ String>),

    /// A required builder parameter was never set.
    UninitializedField(/* field name */ &'static str),
}

impl PostPolicyError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EncodingFailure(_) => ERR_CODE_ENCODING_FAILURE,
            Self::ExpiredOrInvalidExpiration(_) => ERR_CODE_EXPIRED_OR_INVALID_EXPIRATION,
            Self::InvalidCondition(_) => ERR_CODE_INVALID_CONDITION,
            Self::InvalidSigningContext(_) => ERR_CODE_INVALID_SIGNING_CONTEXT,
            Self::MalformedTimestamp(_) => ERR_CODE_MALFORMED_TIMESTAMP,
            Self::MissingCredentials(_) => ERR_CODE_MISSING_CREDENTIALS,
            Self::SignatureDoesNotMatch(_) => ERR_CODE_SIGNATURE_DOES_NOT_MATCH,
            Self::UninitializedField(_) => ERR_CODE_MISSING_PARAMETER,
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::ExpiredOrInvalidExpiration(_)
            | Self::InvalidCondition(_)
            | Self::InvalidSigningContext(_)
            | Self::MalformedTimestamp(_)
            | Self::MissingCredentials(_)
            | Self::UninitializedField(_) => StatusCode::BAD_REQUEST,
            Self::EncodingFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SignatureDoesNotMatch(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl ServiceError for PostPolicyError {
    fn error_code(&self) -> &'static str {
        PostPolicyError::error_code(self)
    }

    fn http_status(&self) -> StatusCode {
        PostPolicyError::http_status(self)
    }
}

impl Display for PostPolicyError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::EncodingFailure(ref e) => write!(f, "Unable to encode policy document: {}", e),
            Self::ExpiredOrInvalidExpiration(msg) => f.write_str(msg),
            Self::InvalidCondition(msg) => f.write_str(msg),
            Self::InvalidSigningContext(msg) => f.write_str(msg),
            Self::MalformedTimestamp(msg) => f.write_str(msg),
            Self::MissingCredentials(msg) => f.write_str(msg),
            Self::SignatureDoesNotMatch(msg) => {
                if let Some(msg) = msg {
                    f.write_str(msg)
                } else {
                    Ok(())
                }
            }
            Self::UninitializedField(field) => write!(f, "Missing required parameter: {}", field),
        }
    }
}

impl Error for PostPolicyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EncodingFailure(ref e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PostPolicyError {
    fn from(e: serde_json::Error) -> PostPolicyError {
        PostPolicyError::EncodingFailure(Box::new(e))
    }
}

impl From<UninitializedFieldError> for PostPolicyError {
    fn from(e: UninitializedFieldError) -> PostPolicyError {
        PostPolicyError::UninitializedField(e.field_name())
    }
}
