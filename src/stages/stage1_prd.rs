use anyhow::{Result, bail};
use tracing::info;

use crate::llm::{LanguageModel, PRD_MAX_TOKENS, PRD_SYSTEM_PROMPT, build_prd_prompt};

/// Execute Stage 1: turn a meeting transcript into a PRD
pub async fn execute_stage1(model: &dyn LanguageModel, transcript: &str) -> Result<String> {
    if transcript.trim().is_empty() {
        bail!("Cannot create a PRD from an empty transcript");
    }

    let prompt = build_prd_prompt(transcript);
    info!("Stage 1: requesting PRD ({} transcript chars)", transcript.len());

    let prd = model
        .complete(PRD_SYSTEM_PROMPT, &prompt, PRD_MAX_TOKENS)
        .await?;
    let prd = prd.trim();
    if prd.is_empty() {
        bail!("Language model returned an empty PRD");
    }

    Ok(prd.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::tests::CannedModel;

    #[tokio::test]
    async fn test_prd_is_trimmed_reply() {
        let model = CannedModel::new(vec![Ok("\n# PRD\n\n## 1. Introduction\n")]);

        let prd = execute_stage1(&model, "Bob: we need SSO").await.unwrap();

        assert_eq!(prd, "# PRD\n\n## 1. Introduction");
        assert!(model.prompts.lock().unwrap()[0].contains("Bob: we need SSO"));
    }

    #[tokio::test]
    async fn test_empty_inputs_and_replies_fail() {
        let model = CannedModel::new(vec![Ok("   ")]);
        assert!(execute_stage1(&model, "  ").await.is_err());
        assert!(execute_stage1(&model, "transcript").await.is_err());
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let model = CannedModel::new(vec![Err("rate limited")]);
        let err = execute_stage1(&model, "transcript").await.unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }
}
