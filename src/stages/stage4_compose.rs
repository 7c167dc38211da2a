use tracing::{info, warn};

use crate::error::ItemError;
use crate::llm::{
    ISSUE_MAX_TOKENS, ISSUE_SYSTEM_PROMPT, LanguageModel, build_issue_prompt,
    normalize_issue_content,
};
use crate::models::{IssueDraft, IssueRequest, Task};

/// An item that could not be turned into a draft or an issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// Task or subtask label, or draft title
    pub label: String,
    pub error: ItemError,
}

/// Result of Stage 4
#[derive(Debug, Default)]
pub struct Stage4Result {
    /// Drafts in request order
    pub drafts: Vec<IssueDraft>,
    pub failures: Vec<ItemFailure>,
}

/// Work out which issues to compose, in task order
///
/// A task with subtasks is represented only by its selected subtasks; a task
/// without subtasks yields one request for itself.
pub fn plan_issue_requests(tasks: &[Task]) -> Vec<IssueRequest> {
    let mut requests = Vec::new();

    for task in tasks.iter().filter(|t| t.selected) {
        if task.has_subtasks() {
            requests.extend(
                task.selected_subtasks()
                    .map(|subtask| IssueRequest::for_subtask(task, subtask)),
            );
        } else {
            requests.push(IssueRequest::for_task(task));
        }
    }

    requests
}

/// Compose one draft
pub async fn compose_issue(
    model: &dyn LanguageModel,
    request: &IssueRequest,
) -> Result<IssueDraft, ItemError> {
    let prompt = build_issue_prompt(request);

    let reply = model
        .complete(ISSUE_SYSTEM_PROMPT, &prompt, ISSUE_MAX_TOKENS)
        .await
        .map_err(|e| ItemError::external("language model", &e))?;

    let draft = normalize_issue_content(&reply)?;
    if !draft.has_title() {
        return Err(ItemError::validation("issue title is empty"));
    }

    Ok(draft.with_source(request.label()))
}

/// Execute Stage 4: compose a draft per request, one at a time
///
/// Failures are recorded and skipped; the rest of the batch continues.
pub async fn execute_stage4(model: &dyn LanguageModel, requests: &[IssueRequest]) -> Stage4Result {
    let mut result = Stage4Result::default();

    for (i, request) in requests.iter().enumerate() {
        let label = request.label();
        info!("Composing issue {}/{}: {}", i + 1, requests.len(), label);

        match compose_issue(model, request).await {
            Ok(draft) => result.drafts.push(draft),
            Err(error) => {
                warn!("Skipping '{}': {}", label, error);
                result.failures.push(ItemFailure { label, error });
            }
        }
    }

    info!(
        "Stage 4: {} drafts, {} failures",
        result.drafts.len(),
        result.failures.len()
    );

    result
}
