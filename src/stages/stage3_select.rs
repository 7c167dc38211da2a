use anyhow::Result;
use regex::Regex;
use tracing::{info, warn};

use crate::interact::Interaction;
use crate::models::Task;

/// Kinds of context a reviewer can attach to a task or subtask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionalInputKind {
    None,
    TranscriptExcerpt,
    DocumentLink,
    CustomPrompt,
}

impl AdditionalInputKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::TranscriptExcerpt => "Transcript excerpt",
            Self::DocumentLink => "Document link",
            Self::CustomPrompt => "Custom prompt",
        }
    }
}

/// Configuration for Stage 3
#[derive(Debug, Clone)]
pub struct Stage3Config {
    /// Ask for additional input on each selected item
    pub offer_additional_input: bool,
    /// Characters of transcript kept on each side of an excerpt match
    pub excerpt_radius: usize,
}

impl Default for Stage3Config {
    fn default() -> Self {
        Self {
            offer_additional_input: true,
            excerpt_radius: 400,
        }
    }
}

/// Result of Stage 3 selection
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Stage3Result {
    pub tasks_selected: usize,
    pub subtasks_selected: usize,
    pub inputs_attached: usize,
}

/// Execute Stage 3: let the operator pick tasks/subtasks and attach context
///
/// Marks `selected` and fills `additional_input` in place. Task order is never
/// changed, so the numbering shown here matches every later report.
pub fn execute_stage3(
    interaction: &mut dyn Interaction,
    tasks: &mut [Task],
    transcript: Option<&str>,
    config: &Stage3Config,
) -> Result<Stage3Result> {
    let mut result = Stage3Result::default();

    let items: Vec<String> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| task_menu_label(i, t))
        .collect();
    let chosen = interaction.select_many(
        "Select tasks to turn into issues",
        &items,
        &vec![true; items.len()],
    )?;
    for (i, task) in tasks.iter_mut().enumerate() {
        task.selected = chosen.contains(&i);
    }

    for task in tasks.iter_mut().filter(|t| t.selected) {
        result.tasks_selected += 1;
        if !task.has_subtasks() {
            continue;
        }

        let items: Vec<String> = task
            .subtasks
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, s.title))
            .collect();
        let chosen = interaction.select_many(
            &format!("Subtasks of '{}'", task.title),
            &items,
            &vec![true; items.len()],
        )?;
        for (i, subtask) in task.subtasks.iter_mut().enumerate() {
            subtask.selected = chosen.contains(&i);
        }

        let count = task.selected_subtasks().count();
        if count == 0 {
            warn!("No subtasks of '{}' selected; it will produce no issue", task.title);
        }
        result.subtasks_selected += count;
    }

    if config.offer_additional_input {
        for task in tasks.iter_mut().filter(|t| t.selected) {
            let input = ask_additional_input(interaction, &task.title, transcript, config)?;
            if !input.is_empty() {
                task.additional_input = input;
                result.inputs_attached += 1;
            }

            let parent = task.title.clone();
            for subtask in task.subtasks.iter_mut().filter(|s| s.selected) {
                let label = format!("{} > {}", parent, subtask.title);
                let input = ask_additional_input(interaction, &label, transcript, config)?;
                if !input.is_empty() {
                    subtask.additional_input = input;
                    result.inputs_attached += 1;
                }
            }
        }
    }

    info!(
        "Stage 3: {} tasks, {} subtasks selected, {} inputs attached",
        result.tasks_selected, result.subtasks_selected, result.inputs_attached
    );

    Ok(result)
}

/// Mark every task and subtask as selected
pub fn select_all(tasks: &mut [Task]) {
    for task in tasks {
        task.selected = true;
        for subtask in &mut task.subtasks {
            subtask.selected = true;
        }
    }
}

fn task_menu_label(index: usize, task: &Task) -> String {
    let mut label = format!("{}. [{}] {}", index + 1, task.phase_label(), task.title);
    if task.has_subtasks() {
        label.push_str(&format!(" ({} subtasks)", task.subtasks.len()));
    }
    label
}

fn ask_additional_input(
    interaction: &mut dyn Interaction,
    label: &str,
    transcript: Option<&str>,
    config: &Stage3Config,
) -> Result<String> {
    let mut kinds = vec![AdditionalInputKind::None];
    if transcript.is_some() {
        kinds.push(AdditionalInputKind::TranscriptExcerpt);
    }
    kinds.push(AdditionalInputKind::DocumentLink);
    kinds.push(AdditionalInputKind::CustomPrompt);

    let items: Vec<String> = kinds.iter().map(|k| k.label().to_string()).collect();
    let choice = interaction.select_one(&format!("Additional input for '{label}'"), &items, 0)?;

    let input = match kinds.get(choice).copied().unwrap_or(AdditionalInputKind::None) {
        AdditionalInputKind::None => String::new(),
        AdditionalInputKind::TranscriptExcerpt => {
            let phrase = interaction.input("Phrase to find in the transcript")?;
            match transcript.and_then(|t| transcript_excerpt(t, &phrase, config.excerpt_radius)) {
                Some(excerpt) => format!("Transcript excerpt:\n{excerpt}"),
                None => {
                    warn!("'{}' not found in the transcript; nothing attached", phrase.trim());
                    String::new()
                }
            }
        }
        AdditionalInputKind::DocumentLink => {
            let link = interaction.input("Document link")?;
            let link = link.trim();
            if link.is_empty() {
                String::new()
            } else {
                format!("Reference document: {link}")
            }
        }
        AdditionalInputKind::CustomPrompt => interaction.input("Custom prompt")?.trim().to_string(),
    };

    Ok(input)
}

/// Passage of `transcript` around the first case-insensitive match of `phrase`,
/// widened by `radius` bytes on each side and cut back to whole words
pub fn transcript_excerpt(transcript: &str, phrase: &str, radius: usize) -> Option<String> {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return None;
    }

    let pattern = Regex::new(&format!("(?i){}", regex::escape(phrase))).ok()?;
    let found = pattern.find(transcript)?;

    let mut start = found.start().saturating_sub(radius);
    while !transcript.is_char_boundary(start) {
        start -= 1;
    }
    if start > 0 && !transcript[..start].ends_with(char::is_whitespace) {
        start = transcript[start..found.start()]
            .find(char::is_whitespace)
            .map_or(found.start(), |ws| start + ws);
    }

    let mut end = (found.end() + radius).min(transcript.len());
    while !transcript.is_char_boundary(end) {
        end += 1;
    }
    if end < transcript.len() && !transcript[end..].starts_with(char::is_whitespace) {
        end = transcript[found.end()..end]
            .rfind(char::is_whitespace)
            .map_or(found.end(), |ws| found.end() + ws);
    }

    Some(transcript[start..end].trim().to_string())
}
