use thiserror::Error;

/// Failure of one call to the analysis service.
///
/// `Rejected` is an application-level failure (`success: false`); every other
/// variant means the request did not complete with a usable answer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service answered HTTP {status}")]
    Status { status: u16 },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{}", .0.as_deref().unwrap_or("Unknown error"))]
    Rejected(Option<String>),
}

impl ApiError {
    pub fn rejected(message: Option<String>) -> Self {
        ApiError::Rejected(message.filter(|m| !m.is_empty()))
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected(_))
    }

    /// Operator-facing message for a failed `action` ("Analysis", "Discovery", ...).
    pub fn describe(&self, action: &str) -> String {
        match self {
            ApiError::Rejected(message) => {
                format!("{action} failed: {}", message.as_deref().unwrap_or("Unknown error"))
            }
            other => format!("Network error: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_text_names_the_action() {
        assert_eq!(ApiError::rejected(None).describe("Analysis"), "Analysis failed: Unknown error");
        assert_eq!(
            ApiError::rejected(Some("No answers to analyze".into())).describe("Analysis"),
            "Analysis failed: No answers to analyze"
        );
    }

    #[test]
    fn transport_class_failures_read_as_network_errors() {
        assert_eq!(
            ApiError::Status { status: 502 }.describe("Classification"),
            "Network error: service answered HTTP 502"
        );
    }
}
