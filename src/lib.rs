pub mod config;
pub mod error;
pub mod interact;
pub mod io;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod stages;
pub mod tracker;

pub use config::AppConfig;
pub use error::{ExtractionError, ItemError};
pub use interact::{AcceptAll, DialoguerInteraction, Interaction};
pub use io::{RunDir, load_drafts, load_tasks, read_text};
pub use llm::{
    LanguageModel, LlmConfig, OpenAiClient, Transcriber, normalize_issue_content,
    normalize_task_list,
};
pub use models::{CreatedIssue, IssueDraft, IssueRequest, Subtask, Task, TaskExtraction};
pub use pipeline::{IssueRun, approve_tasks, compose_and_file, file_approved};
pub use stages::{
    AudioConfig, Stage3Config, execute_stage0, execute_stage1, execute_stage2, execute_stage3,
    execute_stage4, execute_stage5, plan_issue_requests, select_all,
};
pub use tracker::{GitHubClient, IssueTracker, TrackerConfig};
