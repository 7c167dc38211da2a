use thiserror::Error;

/// Reasons a language-model reply could not be turned into a structured value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("response was empty")]
    EmptyResponse,

    #[error("no tasks found: {reason}")]
    NoTasksFound { reason: String },

    #[error("no title found")]
    NoTitleFound,
}

/// Failure of a single item (one task, one draft, one issue) within a batch.
///
/// None of these abort the run: the item is reported and skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("{service} call failed: {reason}")]
    ExternalCall { service: String, reason: String },

    #[error("validation failed: {reason}")]
    Validation { reason: String },
}

impl ItemError {
    pub fn external(service: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::ExternalCall {
            service: service.into(),
            reason: format!("{err:#}"),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Extraction and validation failures are handled the same way
    pub fn is_content_failure(&self) -> bool {
        matches!(self, Self::Extraction(_) | Self::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_error_keeps_context_chain() {
        let err = anyhow::anyhow!("connection reset").context("Failed to send request");
        let item = ItemError::external("openai", &err);
        assert_eq!(
            item.to_string(),
            "openai call failed: Failed to send request: connection reset"
        );
        assert!(!item.is_content_failure());
    }

    #[test]
    fn test_extraction_converts_into_item_error() {
        let item: ItemError = ExtractionError::NoTitleFound.into();
        assert!(item.is_content_failure());
        assert_eq!(item.to_string(), "extraction failed: no title found");
    }
}
