use std::path::Path;

use anyhow::{Context, Result};

use crate::llm::normalize_task_list;
use crate::models::{IssueDraft, TaskExtraction};

/// Read a text artifact (transcript, PRD)
pub fn read_text(path: &Path) -> Result<String> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    if content.trim().is_empty() {
        anyhow::bail!("File is empty: {:?}", path);
    }
    Ok(content)
}

/// Load a task list written by `extract`, or any raw extraction reply saved to disk
pub fn load_tasks(path: &Path) -> Result<TaskExtraction> {
    let content = read_text(path)?;
    normalize_task_list(&content).with_context(|| format!("No usable tasks in {:?}", path))
}

/// Load drafts written by the compose step
pub fn load_drafts(path: &Path) -> Result<Vec<IssueDraft>> {
    let content = read_text(path)?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse drafts: {:?}", path))
}
