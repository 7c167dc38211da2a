use anyhow::{Result, anyhow};
use tracing::debug;

use crate::llm::LlmConfig;
use crate::stages::{AudioConfig, Stage3Config};
use crate::tracker::TrackerConfig;

/// Everything a run needs, built once and handed to each component
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    /// Only needed when filing issues; holds the reason when it could not be loaded
    pub tracker: Result<TrackerConfig, String>,
    pub audio: AudioConfig,
    pub selection: Stage3Config,
}

impl AppConfig {
    /// Language-model settings are required; tracker settings are optional
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_parts(LlmConfig::from_env()?, TrackerConfig::from_env()))
    }

    pub fn from_parts(llm: LlmConfig, tracker: Result<TrackerConfig>) -> Self {
        let tracker = tracker.map_err(|e| format!("{e:#}"));
        if let Err(reason) = &tracker {
            debug!("GitHub settings unavailable: {}", reason);
        }

        Self {
            llm,
            tracker,
            audio: AudioConfig::default(),
            selection: Stage3Config::default(),
        }
    }

    /// File into `owner/name` instead of the repository named in the environment
    pub fn with_repo(mut self, slug: &str) -> Result<Self> {
        self.tracker = Ok(TrackerConfig::from_env_for(Some(slug))?);
        Ok(self)
    }

    pub fn tracker(&self) -> Result<&TrackerConfig> {
        self.tracker.as_ref().map_err(|reason| {
            anyhow!(
                "GitHub is not configured ({reason}): set GITHUB_TOKEN and REPO_OWNER/REPO_NAME (or GITHUB_REPO)"
            )
        })
    }
}
