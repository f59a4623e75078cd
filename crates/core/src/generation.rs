//! Task-generation contract: prompt construction, tolerant parsing of the
//! model's reply, and the fixed fallback list.
//!
//! The network call itself lives in `taskforge-llm`; this module only deals
//! with text in and drafts out so it can be tested without a model.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::task::TaskPriority;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lower bound of tasks the prompt asks for.
pub const MIN_REQUESTED_TASKS: usize = 5;
/// Upper bound of tasks the prompt asks for.
pub const MAX_REQUESTED_TASKS: usize = 8;

/// Matches markdown code-fence markers, with or without a `json` tag.
static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?\n?").expect("valid regex"));

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A task proposed by the generator, not yet linked to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub estimated_hours: Option<f64>,
}

/// Where a set of drafts came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSource {
    Model,
    Fallback,
}

impl GenerationSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Fallback => "fallback",
        }
    }
}

impl TryFrom<String> for GenerationSource {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "model" => Ok(Self::Model),
            "fallback" => Ok(Self::Fallback),
            other => Err(CoreError::Validation(format!(
                "Invalid generation source '{other}'"
            ))),
        }
    }
}

/// Drafts recovered from a model reply plus what had to be repaired.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDrafts {
    pub drafts: Vec<TaskDraft>,
    /// Entries whose priority was outside the closed set and got clamped to medium.
    pub clamped_priorities: usize,
    /// Entries dropped for lacking a usable title.
    pub discarded: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum DraftParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response JSON is not an array")]
    NotAnArray,

    #[error("response array contains no usable tasks")]
    NoUsableDrafts,
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// Build the fixed instructional prompt for a project description.
pub fn build_prompt(project_description: &str) -> String {
    format!(
        r#"You are a project planning assistant. Given a project description, generate {MIN_REQUESTED_TASKS}-{MAX_REQUESTED_TASKS} actionable tasks.

Project Description: "{project_description}"

Return ONLY a valid JSON array of tasks with this exact structure:
[
  {{
    "title": "Task title (short, clear)",
    "description": "Detailed description of what needs to be done",
    "priority": "high" | "medium" | "low",
    "estimated_hours": number (optional, can be null)
  }}
]

Requirements:
- Tasks should be specific and actionable
- Order tasks logically (foundational tasks first)
- Include realistic time estimates
- Priorities: "high" for critical/blocking, "medium" for important, "low" for nice-to-have
- Return ONLY the JSON array, no markdown formatting, no explanation"#
    )
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Remove every markdown code-fence marker and surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    FENCE_RE.replace_all(text, "").trim().to_string()
}

/// Parse a raw model reply into drafts.
///
/// The top level must be a JSON array. Elements without a non-empty string
/// `title` are discarded; priorities outside the closed set become
/// [`TaskPriority::Medium`]; negative or non-numeric `estimated_hours`
/// become `None`.
pub fn parse_drafts(raw: &str) -> Result<ParsedDrafts, DraftParseError> {
    let cleaned = strip_code_fences(raw);
    let value: serde_json::Value = serde_json::from_str(&cleaned)?;
    let items = value.as_array().ok_or(DraftParseError::NotAnArray)?;

    let mut drafts = Vec::with_capacity(items.len());
    let mut clamped_priorities = 0;
    let mut discarded = 0;

    for item in items {
        let title = item
            .get("title")
            .and_then(|t| t.as_str())
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let Some(title) = title else {
            discarded += 1;
            continue;
        };

        let description = item
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or_default()
            .trim()
            .to_string();

        let priority = match item.get("priority").and_then(|p| p.as_str()) {
            Some(p) => match p.parse::<TaskPriority>() {
                Ok(priority) => priority,
                Err(_) => {
                    clamped_priorities += 1;
                    TaskPriority::Medium
                }
            },
            None => {
                clamped_priorities += 1;
                TaskPriority::Medium
            }
        };

        let estimated_hours = item
            .get("estimated_hours")
            .and_then(|h| h.as_f64())
            .filter(|h| h.is_finite() && *h >= 0.0);

        drafts.push(TaskDraft {
            title: title.to_string(),
            description,
            priority,
            estimated_hours,
        });
    }

    if drafts.is_empty() {
        return Err(DraftParseError::NoUsableDrafts);
    }

    Ok(ParsedDrafts {
        drafts,
        clamped_priorities,
        discarded,
    })
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// The fixed three-task list used whenever generation fails.
pub fn fallback_drafts(project_description: &str) -> Vec<TaskDraft> {
    vec![
        TaskDraft {
            title: format!("Research for {project_description}"),
            description: "Gather requirements and analyze project scope".into(),
            priority: TaskPriority::High,
            estimated_hours: Some(4.0),
        },
        TaskDraft {
            title: "Create project structure".into(),
            description: "Set up folders, dependencies, and initial files".into(),
            priority: TaskPriority::Medium,
            estimated_hours: Some(2.0),
        },
        TaskDraft {
            title: "Implement core features".into(),
            description: "Build the main functionality based on requirements".into(),
            priority: TaskPriority::High,
            estimated_hours: Some(8.0),
        },
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = r#"[
        {"title": "Set up repo", "description": "Init git", "priority": "high", "estimated_hours": 1},
        {"title": "Write docs", "description": "README", "priority": "low"}
    ]"#;

    #[test]
    fn prompt_embeds_description_and_bounds() {
        let prompt = build_prompt("a recipe app");
        assert!(prompt.contains("\"a recipe app\""));
        assert!(prompt.contains("5-8 actionable tasks"));
        assert!(prompt.contains("\"estimated_hours\""));
    }

    #[test]
    fn strips_json_fences() {
        let fenced = format!("```json\n{REPLY}\n```");
        assert_eq!(strip_code_fences(&fenced), REPLY.trim());
    }

    #[test]
    fn strips_bare_fences() {
        assert_eq!(strip_code_fences("```\n[]\n```\n"), "[]");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fences("  [1]  "), "[1]");
    }

    #[test]
    fn parses_well_formed_reply() {
        let parsed = parse_drafts(REPLY).unwrap();
        assert_eq!(parsed.drafts.len(), 2);
        assert_eq!(parsed.drafts[0].title, "Set up repo");
        assert_eq!(parsed.drafts[0].priority, TaskPriority::High);
        assert_eq!(parsed.drafts[0].estimated_hours, Some(1.0));
        assert_eq!(parsed.drafts[1].estimated_hours, None);
        assert_eq!(parsed.clamped_priorities, 0);
        assert_eq!(parsed.discarded, 0);
    }

    #[test]
    fn parses_fenced_reply() {
        let fenced = format!("```json\n{REPLY}\n```");
        assert_eq!(parse_drafts(&fenced).unwrap().drafts.len(), 2);
    }

    #[test]
    fn object_reply_is_not_an_array() {
        let err = parse_drafts(r#"{"tasks": []}"#).unwrap_err();
        assert!(matches!(err, DraftParseError::NotAnArray));
    }

    #[test]
    fn prose_reply_is_invalid_json() {
        let err = parse_drafts("Sure! Here are your tasks:").unwrap_err();
        assert!(matches!(err, DraftParseError::InvalidJson(_)));
    }

    #[test]
    fn empty_array_has_no_usable_drafts() {
        let err = parse_drafts("[]").unwrap_err();
        assert!(matches!(err, DraftParseError::NoUsableDrafts));
    }

    #[test]
    fn out_of_domain_priority_is_clamped_to_medium() {
        let parsed =
            parse_drafts(r#"[{"title": "A", "description": "", "priority": "urgent"}]"#).unwrap();
        assert_eq!(parsed.drafts[0].priority, TaskPriority::Medium);
        assert_eq!(parsed.clamped_priorities, 1);
    }

    #[test]
    fn untitled_entries_are_discarded() {
        let parsed = parse_drafts(
            r#"[{"title": "  ", "priority": "low"}, 42, {"title": "Keep", "priority": "low"}]"#,
        )
        .unwrap();
        assert_eq!(parsed.drafts.len(), 1);
        assert_eq!(parsed.discarded, 2);
    }

    #[test]
    fn negative_hours_are_dropped() {
        let parsed =
            parse_drafts(r#"[{"title": "A", "priority": "low", "estimated_hours": -3}]"#).unwrap();
        assert_eq!(parsed.drafts[0].estimated_hours, None);
    }

    #[test]
    fn fallback_has_fixed_shape() {
        let drafts = fallback_drafts("Portfolio site");
        assert_eq!(drafts.len(), 3);
        assert!(drafts[0].title.contains("Portfolio site"));
        let priorities: Vec<TaskPriority> = drafts.iter().map(|d| d.priority).collect();
        assert_eq!(
            priorities,
            vec![TaskPriority::High, TaskPriority::Medium, TaskPriority::High]
        );
    }
}
