use tracing::{info, warn};

use crate::error::ItemError;
use crate::models::{CreatedIssue, IssueDraft};
use crate::stages::ItemFailure;
use crate::tracker::IssueTracker;

/// Result of Stage 5
#[derive(Debug, Default)]
pub struct Stage5Result {
    /// Created issues in draft order
    pub created: Vec<CreatedIssue>,
    pub failures: Vec<ItemFailure>,
}

/// Execute Stage 5: file each draft on the tracker, one at a time
///
/// Drafts without a title are rejected here and never sent.
pub async fn execute_stage5(tracker: &dyn IssueTracker, drafts: &[IssueDraft]) -> Stage5Result {
    let mut result = Stage5Result::default();

    for draft in drafts {
        if !draft.has_title() {
            let label = if draft.source.is_empty() {
                "(untitled)".to_string()
            } else {
                draft.source.clone()
            };
            warn!("Skipping draft '{}': no title", label);
            result.failures.push(ItemFailure {
                label,
                error: ItemError::validation("issue title is empty"),
            });
            continue;
        }

        match tracker.create_issue(draft).await {
            Ok(issue) => {
                info!("Created issue: {} (#{})", issue.title, issue.number);
                result.created.push(issue);
            }
            Err(e) => {
                let error = ItemError::external("issue tracker", &e);
                warn!("Failed to create '{}': {}", draft.title, error);
                result.failures.push(ItemFailure {
                    label: draft.title.clone(),
                    error,
                });
            }
        }
    }

    info!(
        "Stage 5: {} created, {} failures",
        result.created.len(),
        result.failures.len()
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::tests::FakeTracker;

    #[tokio::test]
    async fn test_files_in_order_and_skips_failures() {
        let tracker = FakeTracker::default();
        let drafts = vec![
            IssueDraft::new("First", "a"),
            IssueDraft::new("boom", "b"),
            IssueDraft::new(" ", "c").with_source("Task C"),
            IssueDraft::new("Last", "d"),
        ];

        let result = execute_stage5(&tracker, &drafts).await;

        let titles: Vec<_> = result.created.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["First", "Last"]);
        assert_eq!(result.created[1].number, 2);
        assert_eq!(result.failures.len(), 2);
        assert!(matches!(result.failures[0].error, ItemError::ExternalCall { .. }));
        assert_eq!(result.failures[1].label, "Task C");
        assert!(matches!(result.failures[1].error, ItemError::Validation { .. }));
        assert_eq!(*tracker.filed.lock().unwrap(), ["First", "Last"]);
    }
}
