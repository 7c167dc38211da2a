use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::models::{CreatedIssue, IssueDraft, Task};
use crate::stages::ItemFailure;

pub const TRANSCRIPT_FILE: &str = "transcript.txt";
pub const PRD_FILE: &str = "prd.md";
pub const TASKS_FILE: &str = "tasks.json";
pub const ISSUES_FILE: &str = "issues.json";
pub const CREATED_FILE: &str = "created.json";

/// Directory holding the intermediate files of one run
#[derive(Debug, Clone)]
pub struct RunDir {
    root: PathBuf,
}

impl RunDir {
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create directory: {:?}", root))?;
        Ok(Self { root })
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

/// On-disk form of an extracted task list
#[derive(Debug, Clone, Serialize)]
pub struct TaskSnapshot<'a> {
    /// RFC 3339 timestamp
    pub generated_at: String,
    pub tasks: &'a [Task],
}

impl<'a> TaskSnapshot<'a> {
    pub fn new(tasks: &'a [Task]) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            tasks,
        }
    }
}

/// Write a text artifact, with a trailing newline
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    let mut content = text.trim_end().to_string();
    content.push('\n');
    std::fs::write(path, content).with_context(|| format!("Failed to write file: {:?}", path))
}

/// Write any serializable value as pretty JSON
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}

pub fn write_tasks(path: &Path, tasks: &[Task]) -> Result<()> {
    write_json(path, &TaskSnapshot::new(tasks))
}

pub fn write_drafts(path: &Path, drafts: &[IssueDraft]) -> Result<()> {
    write_json(path, drafts)
}

pub fn write_created(path: &Path, created: &[CreatedIssue]) -> Result<()> {
    write_json(path, created)
}

/// Numbered task list for the terminal
pub fn format_task_list(tasks: &[Task]) -> String {
    let mut output = String::new();
    let mut current_phase: Option<&str> = None;

    for (i, task) in tasks.iter().enumerate() {
        let phase = task.phase_label();
        if current_phase != Some(phase) {
            if current_phase.is_some() {
                output.push('\n');
            }
            output.push_str(&format!("## {}\n", phase));
            current_phase = Some(phase);
        }

        output.push_str(&format!("{}. {}\n", i + 1, task.title));
        if !task.description.is_empty() {
            output.push_str(&format!("   {}\n", task.description));
        }
        for (j, subtask) in task.subtasks.iter().enumerate() {
            output.push_str(&format!("   {}.{} {}\n", i + 1, j + 1, subtask.title));
        }
    }

    output
}

/// Drafts for review before filing
pub fn format_drafts(drafts: &[IssueDraft]) -> String {
    let mut output = String::new();

    for (i, draft) in drafts.iter().enumerate() {
        output.push_str(&format!("[{}] {}\n", i + 1, draft.title));
        if !draft.source.is_empty() {
            output.push_str(&format!("    from: {}\n", draft.source));
        }
        let preview: String = draft.body.lines().take(3).collect::<Vec<_>>().join("\n    ");
        if !preview.is_empty() {
            output.push_str(&format!("    {}\n", preview));
        }
    }

    output
}

/// Final report of filed issues and skipped items
pub fn format_report(created: &[CreatedIssue], failures: &[ItemFailure]) -> String {
    let mut output = String::new();

    for issue in created {
        output.push_str(&format!("#{} {}\n    {}\n", issue.number, issue.title, issue.html_url));
    }
    if !failures.is_empty() {
        output.push_str("\nSkipped:\n");
        for failure in failures {
            output.push_str(&format!("- {}: {}\n", failure.label, failure.error));
        }
    }

    output
}
