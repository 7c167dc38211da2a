//! Turns raw language-model replies into task lists and issue drafts.
//!
//! Replies are often wrapped in code fences, prefixed with chatter, or ignore the
//! requested format entirely. Everything here is pure: the same input always
//! produces the same output, and nothing is logged. Dropped records are reported
//! through [`TaskExtraction::warnings`] for the caller to surface.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ExtractionError;
use crate::models::{IssueDraft, ParseSource, Subtask, Task, TaskExtraction};

/// `1. Title` or `1) Title`
static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s+(\S.*)$").expect("numbered line regex"));

/// `**Title**: x` or `**Title:** x`, optionally as a list item
static TITLE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[-*]\s+)?(?:\*\*title\*\*\s*:|\*\*title:\*\*)\s*(.*)$")
        .expect("title marker regex")
});

const FENCE: &str = "```";

/// Normalize a task-extraction reply into an ordered task list.
///
/// JSON (`{"tasks": [...]}` or a bare array) is tried first, then a numbered-list
/// fallback. Fails only if neither yields a task with a non-empty title.
pub fn normalize_task_list(raw_text: &str) -> Result<TaskExtraction, ExtractionError> {
    if raw_text.trim().is_empty() {
        return Err(ExtractionError::EmptyResponse);
    }

    let cleaned = strip_code_fence(raw_text);
    let mut warnings = Vec::new();

    if let Some(records) = parse_structured(&cleaned, raw_text) {
        let tasks = convert_raw_tasks(records, &mut warnings);
        if !tasks.is_empty() {
            return Ok(TaskExtraction {
                tasks,
                warnings,
                source: ParseSource::Structured,
            });
        }
        warnings.push("structured reply contained no titled tasks".to_string());
    }

    let tasks = parse_numbered_lines(&cleaned);
    if tasks.is_empty() {
        let reason = warnings
            .last()
            .cloned()
            .unwrap_or_else(|| "reply is neither a task object nor a numbered list".to_string());
        return Err(ExtractionError::NoTasksFound { reason });
    }

    Ok(TaskExtraction {
        tasks,
        warnings,
        source: ParseSource::LineFallback,
    })
}

/// Normalize an issue-composition reply into a title/body pair.
///
/// The title comes from the first `# ` heading, or failing that the first
/// `**Title**:` marker. Without either the reply is rejected.
pub fn normalize_issue_content(raw_text: &str) -> Result<IssueDraft, ExtractionError> {
    let text = raw_text.trim();
    if text.is_empty() {
        return Err(ExtractionError::EmptyResponse);
    }

    let all_lines: Vec<&str> = text.lines().collect();
    let mut lines = unwrap_fenced_reply(&all_lines);
    let dangling_fence = !fences_balanced(&lines);
    if dangling_fence && lines.last().is_some_and(|l| l.trim() == FENCE) {
        lines.pop();
    }

    let (title_index, title) = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| heading_title(line).map(|t| (i, t)))
        .or_else(|| {
            lines
                .iter()
                .enumerate()
                .find_map(|(i, line)| marker_title(line).map(|t| (i, t)))
        })
        .ok_or(ExtractionError::NoTitleFound)?;

    let body = lines
        .iter()
        .enumerate()
        .filter(|(i, line)| *i != title_index && !TITLE_MARKER.is_match(line.trim()))
        .map(|(_, line)| *line)
        .collect::<Vec<_>>()
        .join("\n");
    let body = body.trim();
    let body = if dangling_fence {
        body.strip_suffix(FENCE).unwrap_or(body).trim()
    } else {
        body
    };

    Ok(IssueDraft::new(title, body))
}

/// Remove a leading fence line (with optional language tag) and a trailing fence
pub fn strip_code_fence(raw_text: &str) -> String {
    let text = raw_text.trim();
    let mut lines: Vec<&str> = text.lines().collect();

    if lines.first().is_some_and(|l| fence_tag(l).is_some()) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.trim() == FENCE) {
        lines.pop();
    }

    let joined = lines.join("\n");
    let trimmed = joined.trim();
    trimmed.strip_suffix(FENCE).unwrap_or(trimmed).trim().to_string()
}

/// Language tag of a fence line; `Some("")` for a bare fence
fn fence_tag(line: &str) -> Option<&str> {
    let tag = line.trim().strip_prefix(FENCE)?.trim();
    tag.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        .then_some(tag)
}

fn is_markdown_fence(line: &str) -> bool {
    fence_tag(line).is_some_and(|tag| {
        tag.is_empty() || tag.eq_ignore_ascii_case("markdown") || tag.eq_ignore_ascii_case("md")
    })
}

/// Contents of the markdown (or bare) fence wrapping an issue reply.
///
/// Lines before the opening fence are treated as preamble only if they hold no
/// title and the fenced part holds one; otherwise the fence belongs to the body
/// and the reply is kept whole. An unclosed wrapper runs to the end of the reply.
fn unwrap_fenced_reply<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let Some(open) = lines.iter().position(|l| is_markdown_fence(l)) else {
        return lines.to_vec();
    };
    let preamble_has_title = lines[..open]
        .iter()
        .any(|l| heading_title(l).is_some() || marker_title(l).is_some());
    if preamble_has_title {
        return lines.to_vec();
    }

    let close = lines
        .iter()
        .rposition(|l| l.trim() == FENCE)
        .filter(|&close| close > open)
        .unwrap_or(lines.len());
    let inner = &lines[open + 1..close];
    if inner.iter().any(|l| heading_title(l).is_some() || marker_title(l).is_some()) {
        inner.to_vec()
    } else {
        lines.to_vec()
    }
}

/// Every opening fence line has a closing one
fn fences_balanced(lines: &[&str]) -> bool {
    lines.iter().filter(|l| fence_tag(l).is_some()).count() % 2 == 0
}

/// Body of the first fenced block anywhere in the text, for replies with a preamble
fn first_fenced_block(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let open = lines.iter().position(|l| fence_tag(l).is_some())?;
    let close = lines[open + 1..].iter().position(|l| l.trim() == FENCE)? + open + 1;
    Some(lines[open + 1..close].join("\n"))
}

/// Outermost `{ ... }` or `[ ... ]` span
fn bracketed_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// Task records of the first candidate that is a `{"tasks": [...]}` object or a bare array
fn parse_structured(cleaned: &str, raw_text: &str) -> Option<Vec<Value>> {
    let fenced = first_fenced_block(raw_text);
    let candidates = [
        Some(cleaned),
        fenced.as_deref(),
        bracketed_span(cleaned, '{', '}'),
        bracketed_span(cleaned, '[', ']'),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(|candidate| serde_json::from_str::<Value>(candidate.trim()).ok())
        .find_map(|value| match value {
            Value::Object(mut map) => match map.remove("tasks") {
                Some(Value::Array(records)) => Some(records),
                _ => None,
            },
            Value::Array(records) => Some(records),
            _ => None,
        })
}

/// Scalar field as trimmed text; numbers and booleans are stringified
fn text_field(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    let text = match keys.iter().find_map(|key| record.get(*key))? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn convert_raw_tasks(records: Vec<Value>, warnings: &mut Vec<String>) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let Value::Object(record) = record else {
            warnings.push(format!("task #{} is not an object; dropped", index + 1));
            continue;
        };
        let Some(title) = text_field(&record, &["task_title", "title"]) else {
            warnings.push(format!("task #{} has no title; dropped", index + 1));
            continue;
        };

        let raw_subtasks: &[Value] = match record.get("subtasks") {
            Some(Value::Array(items)) => items.as_slice(),
            None | Some(Value::Null) => &[],
            Some(_) => {
                warnings.push(format!("subtasks of '{}' are not a list; ignored", title));
                &[]
            }
        };

        let mut subtasks = Vec::with_capacity(raw_subtasks.len());
        for (sub_index, raw_sub) in raw_subtasks.iter().enumerate() {
            let Value::Object(raw_sub) = raw_sub else {
                warnings.push(format!(
                    "subtask #{} of '{}' is not an object; dropped",
                    sub_index + 1,
                    title
                ));
                continue;
            };
            let Some(sub_title) = text_field(raw_sub, &["title", "subtask_title"]) else {
                warnings.push(format!(
                    "subtask #{} of '{}' has no title; dropped",
                    sub_index + 1,
                    title
                ));
                continue;
            };
            let mut subtask = Subtask::new(
                sub_title,
                text_field(raw_sub, &["description", "subtask_description"]).unwrap_or_default(),
            );
            subtask.additional_input =
                text_field(raw_sub, &["additional_input"]).unwrap_or_default();
            subtasks.push(subtask);
        }

        tasks.push(Task {
            phase: text_field(&record, &["phase"]),
            description: text_field(&record, &["task_description", "description"])
                .unwrap_or_default(),
            subtasks,
            additional_input: text_field(&record, &["additional_input"]).unwrap_or_default(),
            selected: false,
            title,
        });
    }

    tasks
}

fn parse_numbered_lines(text: &str) -> Vec<Task> {
    text.lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty() && !line.starts_with('#') && !line.eq_ignore_ascii_case("tasks:")
        })
        .filter_map(|line| NUMBERED_LINE.captures(line))
        .filter_map(|caps| {
            let title = unwrap_emphasis(caps[1].trim());
            (!title.is_empty()).then(|| Task::new(title))
        })
        .collect()
}

/// `**Do X**` becomes `Do X`
fn unwrap_emphasis(text: &str) -> &str {
    text.strip_prefix("**")
        .and_then(|t| t.strip_suffix("**"))
        .map(str::trim)
        .unwrap_or(text)
}

fn heading_title(line: &str) -> Option<String> {
    let rest = line.strip_prefix("# ")?;
    let title = rest.trim().trim_end_matches('#').trim();
    (!title.is_empty()).then(|| title.to_string())
}

fn marker_title(line: &str) -> Option<String> {
    let caps = TITLE_MARKER.captures(line.trim())?;
    let title = unwrap_emphasis(caps[1].trim());
    (!title.is_empty()).then(|| title.to_string())
}
