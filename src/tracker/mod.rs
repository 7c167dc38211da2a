pub mod github;

pub use github::*;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{CreatedIssue, IssueDraft};

/// Remote issue tracker that accepts title/body pairs
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn create_issue(&self, draft: &IssueDraft) -> Result<CreatedIssue>;
}
