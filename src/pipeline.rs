//! Operator approval gates between stages.
//!
//! Declining a gate is a normal outcome, not an error: nothing further is sent
//! to the model or the tracker.

use anyhow::Result;
use tracing::info;

use crate::interact::Interaction;
use crate::llm::LanguageModel;
use crate::models::{CreatedIssue, IssueDraft, IssueRequest, Task};
use crate::stages::{ItemFailure, Stage5Result, execute_stage4, execute_stage5};
use crate::tracker::IssueTracker;

pub const PROCEED_PROMPT: &str = "Do you want to proceed with these tasks?";
pub const APPROVE_PROMPT: &str = "Do you approve these issues to be created on GitHub?";

/// Outcome of composing, reviewing and filing a batch of issues
#[derive(Debug, Default)]
pub struct IssueRun {
    pub drafts: Vec<IssueDraft>,
    pub created: Vec<CreatedIssue>,
    /// Compose failures followed by filing failures
    pub failures: Vec<ItemFailure>,
    /// The operator approved filing
    pub approved: bool,
}

/// Ask whether to continue past the extracted task list
pub fn approve_tasks(interaction: &mut dyn Interaction, tasks: &[Task]) -> Result<bool> {
    if tasks.is_empty() {
        return Ok(false);
    }
    let approved = interaction.confirm(PROCEED_PROMPT, true)?;
    if !approved {
        info!("Task list declined");
    }
    Ok(approved)
}

/// File `drafts` only after the operator approves them
///
/// Returns `None` when there is nothing to file or filing was declined.
pub async fn file_approved(
    tracker: &dyn IssueTracker,
    interaction: &mut dyn Interaction,
    drafts: &[IssueDraft],
) -> Result<Option<Stage5Result>> {
    if drafts.is_empty() {
        return Ok(None);
    }
    if !interaction.confirm(APPROVE_PROMPT, false)? {
        info!("Filing of {} drafts declined", drafts.len());
        return Ok(None);
    }
    Ok(Some(execute_stage5(tracker, drafts).await))
}

/// Compose a draft per request, hand the drafts to `review`, then file on approval
pub async fn compose_and_file<F>(
    model: &dyn LanguageModel,
    tracker: &dyn IssueTracker,
    interaction: &mut dyn Interaction,
    requests: &[IssueRequest],
    review: F,
) -> Result<IssueRun>
where
    F: FnOnce(&[IssueDraft]) -> Result<()>,
{
    let composed = execute_stage4(model, requests).await;
    let mut run = IssueRun {
        drafts: composed.drafts,
        failures: composed.failures,
        ..IssueRun::default()
    };
    if run.drafts.is_empty() {
        return Ok(run);
    }

    review(&run.drafts)?;

    if let Some(filed) = file_approved(tracker, interaction, &run.drafts).await? {
        run.approved = true;
        run.created = filed.created;
        run.failures.extend(filed.failures);
    }

    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interact::AcceptAll;
    use crate::interact::tests::{Answer, ScriptedInteraction};
    use crate::llm::client::tests::CannedModel;
    use crate::stages::plan_issue_requests;
    use crate::tracker::tests::FakeTracker;

    fn requests(titles: &[&str]) -> Vec<IssueRequest> {
        let tasks: Vec<Task> = titles
            .iter()
            .map(|t| {
                let mut task = Task::new(*t);
                task.selected = true;
                task
            })
            .collect();
        plan_issue_requests(&tasks)
    }

    #[test]
    fn test_declined_task_list_stops() {
        let mut ui = ScriptedInteraction::new(vec![Answer::Confirm(false)]);

        assert!(!approve_tasks(&mut ui, &[Task::new("A")]).unwrap());
        assert_eq!(ui.prompts, [PROCEED_PROMPT]);
    }

    #[test]
    fn test_empty_task_list_asks_nothing() {
        let mut ui = ScriptedInteraction::new(vec![]);

        assert!(!approve_tasks(&mut ui, &[]).unwrap());
        assert!(ui.prompts.is_empty());
    }

    #[tokio::test]
    async fn test_declined_issues_are_never_filed() {
        let model = CannedModel::new(vec![Ok("# Issue A\nbody"), Ok("# Issue B\nbody")]);
        let tracker = FakeTracker::default();
        let mut ui = ScriptedInteraction::new(vec![Answer::Confirm(false)]);
        let mut reviewed = 0;

        let run = compose_and_file(&model, &tracker, &mut ui, &requests(&["A", "B"]), |drafts| {
            reviewed = drafts.len();
            Ok(())
        })
        .await
        .unwrap();

        assert!(!run.approved);
        assert_eq!(reviewed, 2);
        assert_eq!(run.drafts.len(), 2);
        assert!(run.created.is_empty());
        assert!(tracker.filed.lock().unwrap().is_empty());
        assert_eq!(ui.prompts, [APPROVE_PROMPT]);
        assert!(ui.is_exhausted());
    }

    #[tokio::test]
    async fn test_approved_issues_are_filed_with_failures_merged() {
        let model = CannedModel::new(vec![
            Ok("# Issue A\nbody"),
            Ok("no title"),
            Ok("# boom\nbody"),
        ]);
        let tracker = FakeTracker::default();
        let mut ui = ScriptedInteraction::new(vec![Answer::Confirm(true)]);

        let run = compose_and_file(&model, &tracker, &mut ui, &requests(&["A", "B", "C"]), |_| Ok(()))
            .await
            .unwrap();

        assert!(run.approved);
        let created: Vec<_> = run.created.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(created, ["Issue A"]);
        let failed: Vec<_> = run.failures.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(failed, ["B", "boom"]);
    }

    #[tokio::test]
    async fn test_nothing_composed_skips_review_and_approval() {
        let model = CannedModel::new(vec![Err("timeout")]);
        let tracker = FakeTracker::default();
        let mut ui = ScriptedInteraction::new(vec![]);

        let run = compose_and_file(&model, &tracker, &mut ui, &requests(&["A"]), |_| {
            anyhow::bail!("review must not run")
        })
        .await
        .unwrap();

        assert!(!run.approved);
        assert_eq!(run.failures.len(), 1);
        assert!(ui.prompts.is_empty());
    }

    #[tokio::test]
    async fn test_accept_all_files_saved_drafts() {
        let tracker = FakeTracker::default();
        let drafts = vec![IssueDraft::new("Fix", "a"), IssueDraft::new("Ship", "b")];

        let filed = file_approved(&tracker, &mut AcceptAll, &drafts)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(filed.created.len(), 2);
        assert_eq!(*tracker.filed.lock().unwrap(), ["Fix", "Ship"]);
    }
}
