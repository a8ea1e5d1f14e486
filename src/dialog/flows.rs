//! The named flows and their steps.
//!
//! A flow is a fixed list of [`StepKind`]s. Each step takes the value
//! produced by the step before it and either prompts (the flow suspends
//! until the next reply), passes a value straight on, or ends the flow.

use std::str::FromStr;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::model::UserProfile;
use super::prompts::{PendingPrompt, PromptKind, StepValue, resolve_date};
use super::questions::QuestionSet;
use crate::bot::TurnContext;
use crate::error::{ConfigError, DialogError};

pub const NAME_PROMPT: &str = "Hi my name is Baby bot, What is your name?";
pub const OFFER_BIRTHDATE_PROMPT: &str = "Would you like to give your birthdate?";
pub const BIRTHDATE_PROMPT: &str = "Please enter your birthdate.";
pub const REVIEW_PROMPT: &str = "Is this ok?";
pub const NO_BIRTHDATE: &str = "No birthdate given.";
pub const PROFILE_DISCARDED: &str = "Thanks. Your profile will not be kept.";

/// Question-list positions read by the flows.
const NAME_QUESTION: usize = 0;
const BIRTHDATE_QUESTION: usize = 1;

/// The flows the bot can run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    /// Name, offer to give a birthdate, birthdate, review, summary.
    #[default]
    Detailed,
    /// Name, birthdate, summary.
    Quick,
    /// Like `Quick` with prompts from the question list and an age summary.
    Questionnaire,
}

/// One step of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    AskName,
    GreetAndOfferBirthdate,
    AskBirthdateIfWanted,
    ReviewBirthdate,
    ConfirmSummary,
    GreetAndAskBirthdate,
    CaptureAndSummarize,
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AskName => "ask_name",
            Self::GreetAndOfferBirthdate => "greet_and_offer_birthdate",
            Self::AskBirthdateIfWanted => "ask_birthdate_if_wanted",
            Self::ReviewBirthdate => "review_birthdate",
            Self::ConfirmSummary => "confirm_summary",
            Self::GreetAndAskBirthdate => "greet_and_ask_birthdate",
            Self::CaptureAndSummarize => "capture_and_summarize",
        };
        write!(f, "{s}")
    }
}

impl FlowKind {
    pub fn steps(&self) -> &'static [StepKind] {
        use StepKind::*;
        match self {
            Self::Detailed => &[
                AskName,
                GreetAndOfferBirthdate,
                AskBirthdateIfWanted,
                ReviewBirthdate,
                ConfirmSummary,
            ],
            Self::Quick | Self::Questionnaire => {
                &[AskName, GreetAndAskBirthdate, CaptureAndSummarize]
            }
        }
    }

    /// How many entries a question file must hold to drive this flow.
    pub fn questions_required(&self) -> usize {
        match self {
            Self::Questionnaire => 2,
            Self::Detailed | Self::Quick => 0,
        }
    }

    pub fn reports_age(&self) -> bool {
        matches!(self, Self::Questionnaire)
    }
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Detailed => "detailed",
            Self::Quick => "quick",
            Self::Questionnaire => "questionnaire",
        };
        write!(f, "{s}")
    }
}

impl FromStr for FlowKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "detailed" => Ok(Self::Detailed),
            "quick" => Ok(Self::Quick),
            "questionnaire" => Ok(Self::Questionnaire),
            other => Err(ConfigError::UnknownFlow(other.to_string())),
        }
    }
}

/// What a step decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Send the prompt and wait for the reply.
    Prompt(PendingPrompt),
    /// Run the next step right away with this value.
    Next(StepValue),
    /// The flow is finished.
    End,
}

/// Everything a step may read or change.
pub struct StepEnv<'a> {
    pub profile: &'a mut Option<UserProfile>,
    pub turn: &'a mut TurnContext,
    pub questions: Option<&'a QuestionSet>,
}

impl StepEnv<'_> {
    fn profile(&mut self) -> &mut UserProfile {
        self.profile.get_or_insert_with(UserProfile::default)
    }

    fn question(
        &self,
        flow: FlowKind,
        index: usize,
        fallback: &str,
    ) -> Result<String, DialogError> {
        match self.questions.and_then(|q| q.text(index)) {
            Some(text) => Ok(text.to_string()),
            None if flow.questions_required() > index => Err(DialogError::MissingQuestion {
                flow: flow.to_string(),
                index,
            }),
            None => Ok(fallback.to_string()),
        }
    }
}

fn prompt(kind: PromptKind, text: impl Into<String>) -> StepOutcome {
    StepOutcome::Prompt(PendingPrompt {
        kind,
        text: text.into(),
    })
}

fn unexpected(flow: FlowKind, step: StepKind, expected: &'static str) -> DialogError {
    DialogError::UnexpectedResult {
        flow: flow.to_string(),
        step: step.to_string(),
        expected,
    }
}

/// Run one step of `flow`.
///
/// `value` must have the shape the step expects (text after a text
/// prompt, a boolean after a confirm prompt, resolutions after a date
/// prompt). A mismatch is reported as [`DialogError::UnexpectedResult`].
pub fn run_step(
    flow: FlowKind,
    step: StepKind,
    value: StepValue,
    env: &mut StepEnv<'_>,
) -> Result<StepOutcome, DialogError> {
    match step {
        StepKind::AskName => {
            let text = env.question(flow, NAME_QUESTION, NAME_PROMPT)?;
            Ok(prompt(PromptKind::Text, text))
        }

        StepKind::GreetAndOfferBirthdate => {
            let StepValue::Text(name) = value else {
                return Err(unexpected(flow, step, "text"));
            };
            env.turn.send_text(format!("Thanks {name}."));
            env.profile().name = name;
            Ok(prompt(PromptKind::Confirm, OFFER_BIRTHDATE_PROMPT))
        }

        StepKind::AskBirthdateIfWanted => {
            let StepValue::Confirmed(wanted) = value else {
                return Err(unexpected(flow, step, "confirm"));
            };
            if wanted {
                let text = env.question(flow, BIRTHDATE_QUESTION, BIRTHDATE_PROMPT)?;
                Ok(prompt(PromptKind::DateTime, text))
            } else {
                Ok(StepOutcome::Next(StepValue::DateTime(Vec::new())))
            }
        }

        StepKind::ReviewBirthdate => {
            let StepValue::DateTime(candidates) = value else {
                return Err(unexpected(flow, step, "date_time"));
            };
            capture_birthdate(env, &candidates);
            Ok(prompt(PromptKind::Confirm, REVIEW_PROMPT))
        }

        StepKind::ConfirmSummary => {
            let StepValue::Confirmed(keep) = value else {
                return Err(unexpected(flow, step, "confirm"));
            };
            if keep {
                let summary = env.profile().summary();
                env.turn.send_text(summary);
            } else {
                env.turn.send_text(PROFILE_DISCARDED);
            }
            Ok(StepOutcome::End)
        }

        StepKind::GreetAndAskBirthdate => {
            let StepValue::Text(name) = value else {
                return Err(unexpected(flow, step, "text"));
            };
            env.turn.send_text(format!("Thanks {name}."));
            env.profile().name = name;
            let text = env.question(flow, BIRTHDATE_QUESTION, BIRTHDATE_PROMPT)?;
            Ok(prompt(PromptKind::DateTime, text))
        }

        StepKind::CaptureAndSummarize => {
            let StepValue::DateTime(candidates) = value else {
                return Err(unexpected(flow, step, "date_time"));
            };
            let captured = resolve_date(&candidates);
            let profile = env.profile();
            profile.birthdate = captured;
            let summary = profile.summary();
            let age = profile.age_in(Utc::now().year());

            if captured.is_none() {
                env.turn.send_text(NO_BIRTHDATE);
            }
            env.turn.send_text(summary);
            if flow.reports_age() {
                if let Some(age) = age {
                    env.turn.send_text(format!("You are {age} years old."));
                }
            }
            Ok(StepOutcome::End)
        }
    }
}

/// Store the first resolvable birthdate and tell the user what was kept.
fn capture_birthdate(env: &mut StepEnv<'_>, candidates: &[super::prompts::DateTimeResolution]) {
    match resolve_date(candidates) {
        Some(date) => {
            let profile = env.profile();
            profile.birthdate = Some(date);
            let shown = profile.birthdate_display().unwrap_or_default();
            env.turn
                .send_text(format!("I have your birthdate as {shown} ."));
        }
        None => {
            env.profile().birthdate = None;
            env.turn.send_text(NO_BIRTHDATE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::Activity;
    use crate::dialog::prompts::DateTimeResolution;
    use chrono::NaiveDate;

    fn turn() -> TurnContext {
        TurnContext::new(Activity::message("c1", "u1", "x"))
    }

    fn resolution(value: &str) -> StepValue {
        StepValue::DateTime(vec![DateTimeResolution {
            value: Some(value.to_string()),
            timex: None,
        }])
    }

    #[test]
    fn flow_names_round_trip() {
        for flow in [FlowKind::Detailed, FlowKind::Quick, FlowKind::Questionnaire] {
            assert_eq!(flow.to_string().parse::<FlowKind>().unwrap(), flow);
            let json = serde_json::to_string(&flow).unwrap();
            assert_eq!(json, format!("\"{flow}\""));
        }
        assert!("getUserDetails".parse::<FlowKind>().is_err());
    }

    #[test]
    fn step_counts() {
        assert_eq!(FlowKind::Detailed.steps().len(), 5);
        assert_eq!(FlowKind::Quick.steps().len(), 3);
        assert_eq!(FlowKind::Questionnaire.steps().len(), 3);
    }

    #[test]
    fn ask_name_uses_builtin_prompt_without_questions() {
        let mut profile = None;
        let mut t = turn();
        let mut env = StepEnv {
            profile: &mut profile,
            turn: &mut t,
            questions: None,
        };
        let out =
            run_step(FlowKind::Detailed, StepKind::AskName, StepValue::None, &mut env).unwrap();
        assert_eq!(out, prompt(PromptKind::Text, NAME_PROMPT));
        assert!(profile.is_none(), "asking must not create the profile");
    }

    #[test]
    fn questionnaire_without_questions_is_an_error() {
        let mut profile = None;
        let mut t = turn();
        let mut env = StepEnv {
            profile: &mut profile,
            turn: &mut t,
            questions: None,
        };
        let err = run_step(
            FlowKind::Questionnaire,
            StepKind::AskName,
            StepValue::None,
            &mut env,
        )
        .unwrap_err();
        assert!(matches!(err, DialogError::MissingQuestion { index: 0, .. }));
    }

    #[test]
    fn greeting_stores_name_and_thanks_user() {
        let mut profile = None;
        let mut t = turn();
        let mut env = StepEnv {
            profile: &mut profile,
            turn: &mut t,
            questions: None,
        };
        let out = run_step(
            FlowKind::Detailed,
            StepKind::GreetAndOfferBirthdate,
            StepValue::Text("Sam".to_string()),
            &mut env,
        )
        .unwrap();
        assert_eq!(out, prompt(PromptKind::Confirm, OFFER_BIRTHDATE_PROMPT));
        assert_eq!(t.reply_texts(), vec!["Thanks Sam."]);
        assert_eq!(profile.unwrap().name, "Sam");
    }

    #[test]
    fn declining_birthdate_skips_with_empty_resolutions() {
        let mut profile = None;
        let mut t = turn();
        let mut env = StepEnv {
            profile: &mut profile,
            turn: &mut t,
            questions: None,
        };
        let out = run_step(
            FlowKind::Detailed,
            StepKind::AskBirthdateIfWanted,
            StepValue::Confirmed(false),
            &mut env,
        )
        .unwrap();
        assert_eq!(out, StepOutcome::Next(StepValue::DateTime(Vec::new())));
    }

    #[test]
    fn review_with_no_resolution_reports_missing_birthdate() {
        let mut profile = Some(UserProfile {
            name: "Sam".to_string(),
            birthdate: NaiveDate::from_ymd_opt(2000, 1, 1),
        });
        let mut t = turn();
        let mut env = StepEnv {
            profile: &mut profile,
            turn: &mut t,
            questions: None,
        };
        run_step(
            FlowKind::Detailed,
            StepKind::ReviewBirthdate,
            StepValue::DateTime(Vec::new()),
            &mut env,
        )
        .unwrap();
        assert_eq!(t.reply_texts(), vec![NO_BIRTHDATE]);
        assert!(profile.unwrap().birthdate.is_none());
    }

    #[test]
    fn review_formats_captured_birthdate() {
        let mut profile = None;
        let mut t = turn();
        let mut env = StepEnv {
            profile: &mut profile,
            turn: &mut t,
            questions: None,
        };
        run_step(
            FlowKind::Detailed,
            StepKind::ReviewBirthdate,
            resolution("1990-05-17"),
            &mut env,
        )
        .unwrap();
        assert_eq!(t.reply_texts(), vec!["I have your birthdate as 1990/05/17 ."]);
        assert_eq!(profile.unwrap().birthdate, NaiveDate::from_ymd_opt(1990, 5, 17));
    }

    #[test]
    fn rejected_summary_discards_message() {
        let mut profile = Some(UserProfile::default());
        let mut t = turn();
        let mut env = StepEnv {
            profile: &mut profile,
            turn: &mut t,
            questions: None,
        };
        let out = run_step(
            FlowKind::Detailed,
            StepKind::ConfirmSummary,
            StepValue::Confirmed(false),
            &mut env,
        )
        .unwrap();
        assert_eq!(out, StepOutcome::End);
        assert_eq!(t.reply_texts(), vec![PROFILE_DISCARDED]);
    }

    #[test]
    fn questionnaire_summary_includes_age() {
        let mut profile = Some(UserProfile {
            name: "Sam".to_string(),
            birthdate: None,
        });
        let mut t = turn();
        let mut env = StepEnv {
            profile: &mut profile,
            turn: &mut t,
            questions: None,
        };
        run_step(
            FlowKind::Questionnaire,
            StepKind::CaptureAndSummarize,
            resolution("1990-05-17"),
            &mut env,
        )
        .unwrap();
        let expected_age = Utc::now().year() - 1990;
        assert_eq!(
            t.reply_texts(),
            vec![
                "I have your name as Sam and birthdate as 1990/05/17.".to_string(),
                format!("You are {expected_age} years old."),
            ]
        );
    }

    #[test]
    fn wrong_value_shape_is_reported() {
        let mut profile = None;
        let mut t = turn();
        let mut env = StepEnv {
            profile: &mut profile,
            turn: &mut t,
            questions: None,
        };
        let err = run_step(
            FlowKind::Detailed,
            StepKind::AskBirthdateIfWanted,
            StepValue::Text("yes".to_string()),
            &mut env,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DialogError::UnexpectedResult {
                expected: "confirm",
                ..
            }
        ));
    }
}
