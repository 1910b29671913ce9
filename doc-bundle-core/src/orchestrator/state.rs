//! Generation lifecycle as an explicit state machine.
//!
//! ```text
//! idle ──start──▶ validating ──validated──▶ generating ──type_finished*──▶ generating
//!                     │                          │
//!                  rejected                    finish
//!                     ▼                          ▼
//!                  failed          complete | partial_success | failed
//! ```
//!
//! `cancelled` moves validating or generating to failed when a run is abandoned midway.
//! Terminal states accept `start` again for the next run. Progress is derived from the
//! finished-type count only.

use serde::Serialize;
use strum::Display;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GenerationState {
    Idle,
    Validating,
    Generating,
    PartialSuccess,
    Failed,
    Complete,
}

impl GenerationState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GenerationState::PartialSuccess | GenerationState::Failed | GenerationState::Complete
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum GenerationEvent {
    Start,
    Validated { total: usize },
    Rejected,
    TypeFinished { succeeded: bool },
    Finish,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("event {event} is not valid in state {from}")]
pub struct InvalidTransition {
    pub from: GenerationState,
    pub event: GenerationEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationStatus {
    pub state: GenerationState,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl Default for GenerationStatus {
    fn default() -> Self {
        Self {
            state: GenerationState::Idle,
            total: 0,
            succeeded: 0,
            failed: 0,
        }
    }
}

impl GenerationStatus {
    pub fn completed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Percentage of selected types accounted for, in `[0, 100]`. Reaches 100 only once
    /// every type has succeeded or failed.
    pub fn progress(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (self.completed() * 100 / self.total) as u8
    }

    pub fn apply(self, event: GenerationEvent) -> Result<Self, InvalidTransition> {
        use GenerationEvent as E;
        use GenerationState as S;

        let invalid = InvalidTransition {
            from: self.state,
            event,
        };
        match (self.state, event) {
            (S::Idle, E::Start) => Ok(Self {
                state: S::Validating,
                ..Self::default()
            }),
            (s, E::Start) if s.is_terminal() => Ok(Self {
                state: S::Validating,
                ..Self::default()
            }),
            (S::Validating, E::Validated { total }) if total > 0 => Ok(Self {
                state: S::Generating,
                total,
                ..self
            }),
            (S::Validating, E::Rejected) => Ok(Self {
                state: S::Failed,
                ..self
            }),
            (S::Validating | S::Generating, E::Cancelled) => Ok(Self {
                state: S::Failed,
                ..self
            }),
            (S::Generating, E::TypeFinished { succeeded }) if self.completed() < self.total => {
                let mut next = self;
                if succeeded {
                    next.succeeded += 1;
                } else {
                    next.failed += 1;
                }
                Ok(next)
            }
            (S::Generating, E::Finish) if self.completed() == self.total => {
                let state = if self.failed == 0 {
                    S::Complete
                } else if self.succeeded == 0 {
                    S::Failed
                } else {
                    S::PartialSuccess
                };
                Ok(Self { state, ..self })
            }
            _ => Err(invalid),
        }
    }
}

/// Publishes status changes on a watch channel; any number of observers may subscribe,
/// none is required.
#[derive(Debug)]
pub struct ProgressTracker {
    tx: watch::Sender<GenerationStatus>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(GenerationStatus::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<GenerationStatus> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> GenerationStatus {
        *self.tx.borrow()
    }

    pub fn apply(&self, event: GenerationEvent) -> Result<GenerationStatus, InvalidTransition> {
        let mut outcome = Err(InvalidTransition {
            from: GenerationState::Idle,
            event,
        });
        self.tx.send_if_modified(|status| match status.apply(event) {
            Ok(next) => {
                *status = next;
                outcome = Ok(next);
                true
            }
            Err(e) => {
                outcome = Err(e);
                false
            }
        });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_monotonic_and_reaches_100_only_when_all_finished() {
        let mut status = GenerationStatus::default()
            .apply(GenerationEvent::Start)
            .unwrap()
            .apply(GenerationEvent::Validated { total: 3 })
            .unwrap();
        let mut seen = vec![status.progress()];
        for succeeded in [true, false, true] {
            status = status
                .apply(GenerationEvent::TypeFinished { succeeded })
                .unwrap();
            seen.push(status.progress());
        }
        assert_eq!(seen, vec![0, 33, 66, 100]);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));

        let done = status.apply(GenerationEvent::Finish).unwrap();
        assert_eq!(done.state, GenerationState::PartialSuccess);
    }

    #[test]
    fn finish_before_all_types_report_is_rejected() {
        let status = GenerationStatus::default()
            .apply(GenerationEvent::Start)
            .unwrap()
            .apply(GenerationEvent::Validated { total: 2 })
            .unwrap()
            .apply(GenerationEvent::TypeFinished { succeeded: true })
            .unwrap();
        let err = status.apply(GenerationEvent::Finish).unwrap_err();
        assert_eq!(err.from, GenerationState::Generating);
    }

    #[test]
    fn start_while_generating_is_rejected() {
        let status = GenerationStatus::default()
            .apply(GenerationEvent::Start)
            .unwrap()
            .apply(GenerationEvent::Validated { total: 1 })
            .unwrap();
        assert!(status.apply(GenerationEvent::Start).is_err());
    }

    #[test]
    fn cancelled_run_fails_and_accepts_the_next_start() {
        let status = GenerationStatus::default()
            .apply(GenerationEvent::Start)
            .unwrap()
            .apply(GenerationEvent::Validated { total: 2 })
            .unwrap()
            .apply(GenerationEvent::Cancelled)
            .unwrap();
        assert_eq!(status.state, GenerationState::Failed);
        assert_eq!(status.total, 2);

        let restarted = status.apply(GenerationEvent::Start).unwrap();
        assert_eq!(restarted.state, GenerationState::Validating);
        assert!(GenerationStatus::default()
            .apply(GenerationEvent::Cancelled)
            .is_err());
    }

    #[test]
    fn all_failed_finishes_in_failed_state() {
        let status = GenerationStatus::default()
            .apply(GenerationEvent::Start)
            .unwrap()
            .apply(GenerationEvent::Validated { total: 1 })
            .unwrap()
            .apply(GenerationEvent::TypeFinished { succeeded: false })
            .unwrap()
            .apply(GenerationEvent::Finish)
            .unwrap();
        assert_eq!(status.state, GenerationState::Failed);
        assert_eq!(status.progress(), 100);
    }
}
