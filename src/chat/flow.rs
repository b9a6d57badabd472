//! Question-flow state machine.
//!
//! `Idle` until [`QuestionFlow::start`]; then `Collecting` with the field
//! whose question was asked last. An answer is validated against that
//! field only. A rejected answer changes nothing; an accepted one is stored
//! and the flow asks the first field still unanswered or, once all six are
//! in, yields the completed record and resets to `Idle` with an empty draft.

use crate::events::{EventDraft, EventField, EventRecord};

use super::questions::{question, Question};

/// Where the flow is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Not collecting; input goes to intent classification.
    Idle,
    /// Waiting for the answer to `last_asked`.
    Collecting {
        /// Field whose question is outstanding.
        last_asked: EventField,
    },
}

/// Result of feeding one answer to the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The flow is idle; the answer was not consumed.
    NotCollecting,
    /// The answer failed validation; ask `question` again.
    Rejected {
        /// The question still outstanding.
        question: Question,
    },
    /// The answer was stored; ask `question` next.
    Next {
        /// The newly asked question.
        question: Question,
    },
    /// The sixth answer was stored; the flow is idle again.
    Completed(EventRecord),
}

/// Six-question flow owning the draft record.
#[derive(Debug, Clone)]
pub struct QuestionFlow {
    state: FlowState,
    draft: EventDraft,
}

impl Default for QuestionFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionFlow {
    /// An idle flow with an empty draft.
    pub fn new() -> Self {
        Self {
            state: FlowState::Idle,
            draft: EventDraft::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> FlowState {
        self.state
    }

    /// True while questions are outstanding.
    pub fn is_collecting(&self) -> bool {
        matches!(self.state, FlowState::Collecting { .. })
    }

    /// Number of questions asked so far in this cycle (0 when idle).
    pub fn pending_index(&self) -> usize {
        match self.state {
            FlowState::Idle => 0,
            FlowState::Collecting { last_asked } => last_asked.position().saturating_add(1),
        }
    }

    /// Answers accepted so far.
    pub fn draft(&self) -> &EventDraft {
        &self.draft
    }

    /// Clear the draft and ask the first question.
    pub fn start(&mut self) -> Question {
        self.draft = EventDraft::new();
        self.state = FlowState::Collecting {
            last_asked: EventField::Name,
        };
        question(EventField::Name)
    }

    /// Feed one trimmed answer.
    pub fn answer(&mut self, input: &str) -> Step {
        let FlowState::Collecting { last_asked } = self.state else {
            return Step::NotCollecting;
        };

        if !last_asked.validate(input) {
            return Step::Rejected {
                question: question(last_asked),
            };
        }

        self.draft.set(last_asked, input.to_owned());

        match self.draft.complete() {
            Ok(record) => {
                self.state = FlowState::Idle;
                self.draft = EventDraft::new();
                Step::Completed(record)
            }
            Err(next) => {
                self.state = FlowState::Collecting { last_asked: next };
                Step::Next {
                    question: question(next),
                }
            }
        }
    }
}
