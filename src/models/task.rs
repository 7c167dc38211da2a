use serde::{Deserialize, Serialize};

/// Label shown wherever a task has no phase
pub const UNSPECIFIED_PHASE: &str = "N/A";

/// A unit of work extracted from a PRD
///
/// Field names on the wire match the JSON shape the extraction prompt asks for,
/// so a persisted task list can be fed back through the normalizer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Grouping label; `None` when the source gave none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    /// Short, non-empty title
    #[serde(rename = "task_title")]
    pub title: String,
    #[serde(rename = "task_description", default)]
    pub description: String,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// Context attached by the reviewer during selection
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub additional_input: String,
    #[serde(skip)]
    pub selected: bool,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            phase: None,
            title: title.into(),
            description: String::new(),
            subtasks: Vec::new(),
            additional_input: String::new(),
            selected: false,
        }
    }

    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.phase = Some(phase.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_subtask(mut self, subtask: Subtask) -> Self {
        self.subtasks.push(subtask);
        self
    }

    /// Phase label for display and prompts
    pub fn phase_label(&self) -> &str {
        self.phase.as_deref().unwrap_or(UNSPECIFIED_PHASE)
    }

    pub fn has_subtasks(&self) -> bool {
        !self.subtasks.is_empty()
    }

    pub fn selected_subtasks(&self) -> impl Iterator<Item = &Subtask> {
        self.subtasks.iter().filter(|s| s.selected)
    }
}

/// A step of a [`Task`]; owned by exactly one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub additional_input: String,
    #[serde(skip)]
    pub selected: bool,
}

impl Subtask {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            additional_input: String::new(),
            selected: false,
        }
    }
}

/// Where a normalized task list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseSource {
    /// Parsed as a JSON object with a `tasks` array
    Structured,
    /// Recovered from a numbered list
    LineFallback,
}

/// Output of task-list normalization
#[derive(Debug, Clone)]
pub struct TaskExtraction {
    /// Tasks in source order
    pub tasks: Vec<Task>,
    /// Records that were dropped and why
    pub warnings: Vec<String>,
    pub source: ParseSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_serializes_with_prompt_field_names() {
        let task = Task::new("Build login")
            .with_phase("Phase 1")
            .with_subtask(Subtask::new("Add form", ""));

        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["task_title"], "Build login");
        assert_eq!(json["phase"], "Phase 1");
        assert_eq!(json["subtasks"][0]["title"], "Add form");
        assert!(json.get("selected").is_none());
        assert!(json.get("additional_input").is_none());
    }

    #[test]
    fn test_phase_label_defaults() {
        assert_eq!(Task::new("x").phase_label(), UNSPECIFIED_PHASE);
        assert_eq!(Task::new("x").with_phase("Beta").phase_label(), "Beta");
    }
}
