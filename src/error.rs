use thiserror::Error;

/// Errors surfaced by the record store adapter
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Spreadsheet API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service account authentication failed: {0}")]
    Auth(String),

    #[error("Spreadsheet API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected spreadsheet response: {0}")]
    Malformed(String),
}

/// Errors surfaced by the badge creation and lookup services
#[derive(Debug, Error)]
pub enum BadgeError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("User has already generated a badge")]
    DuplicateSubmission,

    #[error("Badge not found")]
    NotFound,

    #[error("Badge store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("QR code generation failed: {0}")]
    Encode(String),
}

impl BadgeError {
    /// Stable machine-readable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "VALIDATION_ERROR",
            Self::DuplicateSubmission => "DUPLICATE_SUBMISSION",
            Self::NotFound => "NOT_FOUND",
            Self::Store(_) => "STORE_ERROR",
            Self::Encode(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(BadgeError::MissingField("name").code(), "VALIDATION_ERROR");
        assert_eq!(BadgeError::DuplicateSubmission.code(), "DUPLICATE_SUBMISSION");
        assert_eq!(BadgeError::NotFound.code(), "NOT_FOUND");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Api {
            status: 403,
            body: "forbidden".to_string(),
        };
        assert_eq!(err.to_string(), "Spreadsheet API returned 403: forbidden");
    }
}
