//! Question list loaded from a JSON file.
//!
//! Shape: `{ "flowId": "questionnaire", "questions": [{ "text": "..." }] }`.
//! The file is validated as a whole when it is loaded.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::flows::FlowKind;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
}

/// A validated question list bound to the flow it drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    pub flow: FlowKind,
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct QuestionFile {
    flow_id: String,
    questions: Vec<Question>,
}

impl QuestionSet {
    /// Read and validate a question file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::QuestionFileIo {
            path: path.display().to_string(),
            source,
        })?;
        let set = Self::parse(&raw).map_err(|e| match e {
            ConfigError::QuestionFileParse { source, .. } => ConfigError::QuestionFileParse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        tracing::info!(
            path = %path.display(),
            flow = %set.flow,
            questions = set.questions.len(),
            "Question file loaded"
        );
        Ok(set)
    }

    /// Parse and validate question-file JSON.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let file: QuestionFile =
            serde_json::from_str(raw).map_err(|source| ConfigError::QuestionFileParse {
                path: "<inline>".to_string(),
                source,
            })?;

        if file.flow_id.trim().is_empty() {
            return Err(ConfigError::InvalidQuestions("flowId is empty".to_string()));
        }
        let flow: FlowKind = file.flow_id.parse()?;

        if let Some(i) = file.questions.iter().position(|q| q.text.trim().is_empty()) {
            return Err(ConfigError::InvalidQuestions(format!(
                "question {i} has empty text"
            )));
        }

        let required = flow.questions_required();
        if file.questions.len() < required {
            return Err(ConfigError::InvalidQuestions(format!(
                "flow {flow} needs {required} questions, file has {}",
                file.questions.len()
            )));
        }

        Ok(Self {
            flow,
            questions: file.questions,
        })
    }

    /// Question text at `index`, if present.
    pub fn text(&self, index: usize) -> Option<&str> {
        self.questions.get(index).map(|q| q.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "flowId": "questionnaire",
        "questions": [
            { "text": "What should I call you?" },
            { "text": "When were you born?" }
        ]
    }"#;

    #[test]
    fn parses_valid_file() {
        let set = QuestionSet::parse(VALID).unwrap();
        assert_eq!(set.flow, FlowKind::Questionnaire);
        assert_eq!(set.text(0), Some("What should I call you?"));
        assert_eq!(set.text(1), Some("When were you born?"));
        assert_eq!(set.text(2), None);
    }

    #[test]
    fn rejects_unknown_flow() {
        let err = QuestionSet::parse(r#"{"flowId":"nope","questions":[]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownFlow(ref f) if f == "nope"));
    }

    #[test]
    fn rejects_missing_fields() {
        let err = QuestionSet::parse(r#"{"questions":[]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::QuestionFileParse { .. }));

        let err = QuestionSet::parse(r#"{"flowId":"quick","questions":[{}]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::QuestionFileParse { .. }));
    }

    #[test]
    fn rejects_blank_question_text() {
        let err = QuestionSet::parse(
            r#"{"flowId":"questionnaire","questions":[{"text":"Name?"},{"text":"  "}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("question 1"));
    }

    #[test]
    fn rejects_too_few_questions_for_flow() {
        let err =
            QuestionSet::parse(r#"{"flowId":"questionnaire","questions":[{"text":"Name?"}]}"#)
                .unwrap_err();
        assert!(err.to_string().contains("needs 2 questions"));
    }

    #[test]
    fn flows_with_builtin_prompts_accept_empty_list() {
        let set = QuestionSet::parse(r#"{"flowId":"detailed","questions":[]}"#).unwrap();
        assert_eq!(set.flow, FlowKind::Detailed);
        assert!(set.questions.is_empty());
    }

    #[test]
    fn load_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = QuestionSet::load(&path).unwrap_err();
        assert!(err.to_string().contains("questions.json"));

        std::fs::write(&path, VALID).unwrap();
        assert_eq!(QuestionSet::load(&path).unwrap().flow, FlowKind::Questionnaire);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = QuestionSet::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::QuestionFileIo { .. }));
    }
}
