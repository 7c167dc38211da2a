use serde::{Deserialize, Serialize};

use crate::models::{Subtask, Task};

/// Everything the composer needs to ask for one issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    pub phase: String,
    pub task_title: String,
    pub task_description: String,
    pub subtask_title: Option<String>,
    pub subtask_description: Option<String>,
    /// Task and subtask additional input, newline-joined
    pub additional_input: String,
}

impl IssueRequest {
    pub fn for_task(task: &Task) -> Self {
        Self {
            phase: task.phase_label().to_string(),
            task_title: task.title.clone(),
            task_description: task.description.clone(),
            subtask_title: None,
            subtask_description: None,
            additional_input: task.additional_input.trim().to_string(),
        }
    }

    pub fn for_subtask(task: &Task, subtask: &Subtask) -> Self {
        let additional_input = [task.additional_input.trim(), subtask.additional_input.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            phase: task.phase_label().to_string(),
            task_title: task.title.clone(),
            task_description: task.description.clone(),
            subtask_title: Some(subtask.title.clone()),
            subtask_description: Some(subtask.description.clone()),
            additional_input,
        }
    }

    /// Human-facing label, e.g. `Build login > Add form`
    pub fn label(&self) -> String {
        match &self.subtask_title {
            Some(sub) => format!("{} > {}", self.task_title, sub),
            None => self.task_title.clone(),
        }
    }
}

/// Title/body pair ready to be filed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDraft {
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Label of the task/subtask this draft was composed for
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
}

impl IssueDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            source: String::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Handle returned by the tracker for a filed issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub number: u64,
    pub title: String,
    pub html_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtask_request_joins_additional_input() {
        let mut task = Task::new("Build login").with_phase("Phase 1");
        task.additional_input = "See the auth RFC".to_string();
        let mut subtask = Subtask::new("Add form", "Email and password");
        subtask.additional_input = "  Use the design system  ".to_string();

        let request = IssueRequest::for_subtask(&task, &subtask);

        assert_eq!(request.additional_input, "See the auth RFC\nUse the design system");
        assert_eq!(request.label(), "Build login > Add form");
        assert_eq!(request.phase, "Phase 1");
    }

    #[test]
    fn test_subtask_request_skips_blank_inputs() {
        let task = Task::new("Build login");
        let mut subtask = Subtask::new("Add form", "");
        subtask.additional_input = "Only this".to_string();

        let request = IssueRequest::for_subtask(&task, &subtask);

        assert_eq!(request.additional_input, "Only this");
    }

    #[test]
    fn test_blank_title_is_not_a_title() {
        assert!(!IssueDraft::new("   ", "body").has_title());
        assert!(IssueDraft::new("Fix", "").has_title());
    }
}
