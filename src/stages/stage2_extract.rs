use tracing::{info, warn};

use crate::error::ItemError;
use crate::llm::{
    LanguageModel, TASKS_MAX_TOKENS, TASKS_SYSTEM_PROMPT, build_tasks_prompt, normalize_task_list,
};
use crate::models::{ParseSource, TaskExtraction};

/// Execute Stage 2: extract a structured task list from a PRD
///
/// A failed model call or an unusable reply is returned as an [`ItemError`]
/// for the operator; it never panics or aborts the process.
pub async fn execute_stage2(
    model: &dyn LanguageModel,
    prd_text: &str,
) -> Result<TaskExtraction, ItemError> {
    let prompt = build_tasks_prompt(prd_text);

    let reply = model
        .complete(TASKS_SYSTEM_PROMPT, &prompt, TASKS_MAX_TOKENS)
        .await
        .map_err(|e| ItemError::external("language model", &e))?;

    let extraction = normalize_task_list(&reply)?;

    for warning in &extraction.warnings {
        warn!("Task extraction: {}", warning);
    }
    if extraction.source == ParseSource::LineFallback {
        warn!("Reply was not structured JSON; recovered tasks from a numbered list");
    }

    info!(
        "Stage 2: {} tasks, {} subtasks",
        extraction.tasks.len(),
        extraction
            .tasks
            .iter()
            .map(|t| t.subtasks.len())
            .sum::<usize>()
    );

    Ok(extraction)
}
