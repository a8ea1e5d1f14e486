//! Prompt kinds and the recognizers that turn a raw reply into a step
//! result.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// What kind of answer a pending prompt expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Text,
    Confirm,
    DateTime,
}

impl std::fmt::Display for PromptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Confirm => "confirm",
            Self::DateTime => "date_time",
        };
        write!(f, "{s}")
    }
}

/// A prompt that was sent and is waiting for a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPrompt {
    pub kind: PromptKind,
    pub text: String,
}

/// One candidate interpretation of a date/time reply.
///
/// `value` is the resolved date (`YYYY-MM-DD`). `timex` is the symbolic
/// form and may be partial, e.g. `XXXX-05-17` when no year was given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeResolution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timex: Option<String>,
}

impl DateTimeResolution {
    fn resolved(date: NaiveDate) -> Self {
        let s = date.format("%Y-%m-%d").to_string();
        Self {
            value: Some(s.clone()),
            timex: Some(s),
        }
    }
}

/// The value a step receives from the step before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepValue {
    None,
    Text(String),
    Confirmed(bool),
    DateTime(Vec<DateTimeResolution>),
}

/// Recognize `input` for a prompt of the given kind.
///
/// `None` means the reply was not understood and the prompt should be sent
/// again.
pub fn recognize(kind: PromptKind, input: &str) -> Option<StepValue> {
    match kind {
        PromptKind::Text => recognize_text(input).map(StepValue::Text),
        PromptKind::Confirm => recognize_confirm(input).map(StepValue::Confirmed),
        PromptKind::DateTime => {
            let today = Utc::now().date_naive();
            let candidates = recognize_datetime(input, today);
            if candidates.is_empty() {
                None
            } else {
                Some(StepValue::DateTime(candidates))
            }
        }
    }
}

pub fn recognize_text(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn recognize_confirm(input: &str) -> Option<bool> {
    let normalized = input
        .trim()
        .trim_end_matches(['.', '!'])
        .to_lowercase();
    match normalized.as_str() {
        "yes" | "y" | "yeah" | "yep" | "sure" | "ok" | "okay" | "true" | "1" => Some(true),
        "no" | "n" | "nope" | "nah" | "false" | "0" => Some(false),
        _ => None,
    }
}

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b").unwrap());

static DOTTED_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})\.(\d{1,2})\.(\d{4})\b").unwrap());

static SLASHED_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap());

static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]+)\.?,?\s+(\d{4})\b").unwrap()
});

static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b").unwrap()
});

static MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?\b").unwrap()
});

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    let name = name.to_lowercase();
    if name.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(&name))
        .map(|i| i as u32 + 1)
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Recognize date candidates in free text, most likely first.
///
/// Numeric `A/B/YYYY` is ambiguous and yields a month-first and a
/// day-first candidate when both are valid dates. A month and day without
/// a year yields a timex-only candidate with no resolved value.
pub fn recognize_datetime(input: &str, today: NaiveDate) -> Vec<DateTimeResolution> {
    let text = input.trim();
    let lower = text.to_lowercase();

    match lower.as_str() {
        "today" | "now" => return vec![DateTimeResolution::resolved(today)],
        "yesterday" => return vec![DateTimeResolution::resolved(today - Duration::days(1))],
        _ => {}
    }

    if let Some(c) = ISO_DATE.captures(text) {
        return ymd(&c[1], &c[2], &c[3])
            .map(DateTimeResolution::resolved)
            .into_iter()
            .collect();
    }

    if let Some(c) = DOTTED_DATE.captures(text) {
        return ymd(&c[3], &c[2], &c[1])
            .map(DateTimeResolution::resolved)
            .into_iter()
            .collect();
    }

    if let Some(c) = SLASHED_DATE.captures(text) {
        let month_first = ymd(&c[3], &c[1], &c[2]);
        let day_first = ymd(&c[3], &c[2], &c[1]);
        let mut out: Vec<DateTimeResolution> = month_first
            .into_iter()
            .map(DateTimeResolution::resolved)
            .collect();
        if let Some(d) = day_first {
            if Some(d) != month_first {
                out.push(DateTimeResolution::resolved(d));
            }
        }
        return out;
    }

    if let Some(c) = DAY_MONTH_YEAR.captures(text) {
        if let Some(month) = month_number(&c[2]) {
            if let Some(d) = ymd(&c[3], &month.to_string(), &c[1]) {
                return vec![DateTimeResolution::resolved(d)];
            }
        }
    }

    if let Some(c) = MONTH_DAY_YEAR.captures(text) {
        if let Some(month) = month_number(&c[1]) {
            if let Some(d) = ymd(&c[3], &month.to_string(), &c[2]) {
                return vec![DateTimeResolution::resolved(d)];
            }
        }
    }

    if let Some(c) = MONTH_DAY.captures(text) {
        if let (Some(month), Ok(day)) = (month_number(&c[1]), c[2].parse::<u32>()) {
            // Validate against a leap year so Feb 29 is accepted.
            if NaiveDate::from_ymd_opt(2000, month, day).is_some() {
                return vec![DateTimeResolution {
                    value: None,
                    timex: Some(format!("XXXX-{month:02}-{day:02}")),
                }];
            }
        }
    }

    Vec::new()
}

/// Pick a concrete date out of a recognition result.
///
/// Takes the first candidate and prefers its resolved value over the
/// timex. Empty lists and unparsable or partial forms give `None`.
pub fn resolve_date(candidates: &[DateTimeResolution]) -> Option<NaiveDate> {
    let first = candidates.first()?;
    let raw = first.value.as_deref().or(first.timex.as_deref())?;
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()?;
    // Year 1 is the zero value some recognizers emit for "no date".
    if date.year() <= 1 {
        return None;
    }
    Some(date)
}
