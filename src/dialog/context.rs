//! DialogContext: begins and resumes flows for a single turn.

use super::flows::{FlowKind, StepEnv, StepOutcome, run_step};
use super::model::UserProfile;
use super::prompts::{PendingPrompt, StepValue, recognize};
use super::questions::QuestionSet;
use super::state::{DialogState, DialogTurnStatus};
use crate::bot::TurnContext;
use crate::error::DialogError;

/// Borrowed view of everything the dialog engine touches during a turn.
pub struct DialogContext<'a> {
    state: &'a mut DialogState,
    profile: &'a mut Option<UserProfile>,
    turn: &'a mut TurnContext,
    questions: Option<&'a QuestionSet>,
}

impl<'a> DialogContext<'a> {
    pub fn new(
        state: &'a mut DialogState,
        profile: &'a mut Option<UserProfile>,
        turn: &'a mut TurnContext,
        questions: Option<&'a QuestionSet>,
    ) -> Self {
        Self {
            state,
            profile,
            turn,
            questions,
        }
    }

    /// Start `flow` from its first step.
    pub fn begin_dialog(&mut self, flow: FlowKind) -> Result<DialogTurnStatus, DialogError> {
        if let DialogState::Suspended { flow: active, step, .. } = &*self.state {
            return Err(DialogError::AlreadyActive {
                flow: active.to_string(),
                step: *step,
            });
        }
        tracing::info!(flow = %flow, "Beginning dialog");
        self.run_from(flow, 0, StepValue::None)
    }

    /// Feed the turn's text to the suspended flow, if there is one.
    pub fn continue_dialog(&mut self) -> Result<DialogTurnStatus, DialogError> {
        let (flow, step, prompt) = match &*self.state {
            DialogState::Empty => return Ok(DialogTurnStatus::Empty),
            DialogState::Suspended { flow, step, prompt } => (*flow, *step, prompt.clone()),
        };

        if step >= flow.steps().len() {
            tracing::warn!(
                flow = %flow,
                step,
                "Discarding dialog state with out-of-range step"
            );
            *self.state = DialogState::Empty;
            return Ok(DialogTurnStatus::Empty);
        }

        let loaded = self.questions.map_or(0, |q| q.questions.len());
        if loaded < flow.questions_required() {
            tracing::warn!(
                flow = %flow,
                step,
                loaded,
                "Discarding dialog state for a flow the loaded questions cannot run"
            );
            *self.state = DialogState::Empty;
            return Ok(DialogTurnStatus::Empty);
        }

        let input = self.turn.activity().text_or_empty().to_string();
        match recognize(prompt.kind, &input) {
            Some(value) => {
                tracing::debug!(flow = %flow, step, kind = %prompt.kind, "Reply recognized");
                self.run_from(flow, step + 1, value)
            }
            None => {
                tracing::debug!(
                    flow = %flow,
                    step,
                    kind = %prompt.kind,
                    "Reply not recognized, prompting again"
                );
                self.turn.send_text(prompt.text);
                Ok(DialogTurnStatus::Waiting)
            }
        }
    }

    fn run_from(
        &mut self,
        flow: FlowKind,
        start: usize,
        mut value: StepValue,
    ) -> Result<DialogTurnStatus, DialogError> {
        let steps = flow.steps();
        let mut index = start;

        while let Some(&step) = steps.get(index) {
            let mut env = StepEnv {
                profile: &mut *self.profile,
                turn: &mut *self.turn,
                questions: self.questions,
            };
            match run_step(flow, step, value, &mut env)? {
                StepOutcome::Prompt(prompt) => {
                    self.suspend(flow, index, prompt);
                    return Ok(DialogTurnStatus::Waiting);
                }
                StepOutcome::Next(next) => {
                    value = next;
                    index += 1;
                }
                StepOutcome::End => break,
            }
        }

        tracing::info!(flow = %flow, "Dialog complete");
        *self.state = DialogState::Empty;
        Ok(DialogTurnStatus::Complete)
    }

    fn suspend(&mut self, flow: FlowKind, step: usize, prompt: PendingPrompt) {
        self.turn.send_text(prompt.text.clone());
        *self.state = DialogState::Suspended { flow, step, prompt };
    }
}
