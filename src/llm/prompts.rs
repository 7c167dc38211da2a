use crate::models::IssueRequest;

/// Reply budget for PRD creation
pub const PRD_MAX_TOKENS: u32 = 2000;
/// Reply budget for task extraction
pub const TASKS_MAX_TOKENS: u32 = 2000;
/// Reply budget for a single issue
pub const ISSUE_MAX_TOKENS: u32 = 1000;

pub const PRD_SYSTEM_PROMPT: &str =
    "You are a product manager tasked with creating a PRD from a meeting transcript.";

pub const TASKS_SYSTEM_PROMPT: &str =
    "You are a helpful assistant for extracting detailed tasks from PRD Markdown files.";

pub const ISSUE_SYSTEM_PROMPT: &str =
    "You are a helpful assistant for generating detailed GitHub issues from task descriptions.";

/// Sections every generated PRD must contain, in order
pub const PRD_SECTIONS: [&str; 10] = [
    "Introduction",
    "Product Overview",
    "Objectives and Goals",
    "Target Audience",
    "Features and Requirements",
    "User Stories",
    "Non-Functional Requirements",
    "Constraints and Limitations",
    "Milestones and Timeline",
    "Success Metrics",
];

/// Build the user prompt that turns a transcript into a PRD
pub fn build_prd_prompt(transcript: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("Convert the following meeting transcript into a comprehensive, industry-standard Product Requirements Document (PRD):\n\n");
    prompt.push_str(transcript.trim());
    prompt.push_str("\n\nThe PRD should include the following sections:\n");
    for (i, section) in PRD_SECTIONS.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, section));
    }

    prompt
}

/// Build the user prompt that extracts a structured task list from a PRD
pub fn build_tasks_prompt(prd_text: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("Extract all tasks from the following PRD:\n\n");
    prompt.push_str(prd_text.trim());
    prompt.push_str("\n\n## Instructions\n");
    prompt.push_str("Organize the tasks under their respective phases as outlined in the PRD.\n");
    prompt.push_str("For each task, include any sub-tasks or specific implementation details mentioned.\n");
    prompt.push_str("Fold notes from the product manager (deadlines, dependencies, timeline) into the task descriptions.\n\n");
    prompt.push_str("Respond with a single JSON object and nothing else, shaped like:\n");
    prompt.push_str(
        r#"{"tasks": [{"phase": "Phase 1", "task_title": "...", "task_description": "...", "subtasks": [{"title": "...", "description": "..."}]}]}"#,
    );
    prompt.push('\n');

    prompt
}

/// Build the user prompt for one issue
pub fn build_issue_prompt(request: &IssueRequest) -> String {
    let mut prompt = String::new();

    prompt.push_str("Please create a detailed GitHub issue for the following:\n\n");
    prompt.push_str(&format!("Phase: {}\n", request.phase));
    prompt.push_str(&format!("Task Title: {}\n", request.task_title));
    prompt.push_str(&format!("Task Description: {}\n", request.task_description));

    if let Some(subtask_title) = &request.subtask_title {
        prompt.push_str(&format!("Subtask Title: {}\n", subtask_title));
        prompt.push_str(&format!(
            "Subtask Description: {}\n",
            request.subtask_description.as_deref().unwrap_or_default()
        ));
    }

    if !request.additional_input.is_empty() {
        prompt.push_str(&format!("Additional Input: {}\n", request.additional_input));
    }

    prompt.push_str("\nInclude the following sections in your response:\n\n");
    prompt.push_str("- **Title**: A concise summary of the task.\n");
    prompt.push_str("- **Description**: A detailed explanation of what needs to be done.\n");
    prompt.push_str("- **Inputs**: A list of inputs that are required for the task or subtask.\n");
    prompt.push_str("- **Output**: A list of outputs that are expected from the task or subtask.\n");
    prompt.push_str("- **Acceptance Criteria**: Specific conditions that must be met for the task to be considered complete.\n");
    prompt.push_str("- **Additional Notes**: Any extra information that might be helpful (e.g., implementation suggestions, dependencies, references to relevant documents).\n\n");
    prompt.push_str("Format your response in Markdown. Put the title on the first line as a level-one heading (`# Title`).\n");
    prompt.push_str("Do not wrap the response in code fences.\n");

    prompt
}
