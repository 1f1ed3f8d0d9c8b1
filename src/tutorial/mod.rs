// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The guided tutorial engine.
//!
//! [`StepController`] is the state machine driving the tour: exactly one frame
//! is active (or the tour is closed), forward movement is gated by the active
//! frame's completion rule, backward movement never is. Frame content comes
//! from a [`FrameStore`], targets resolve against the widget registry via
//! [`resolve_targets`], and [`completion_met`] decides whether the gate is
//! open. The controller holds no widget or terminal state itself, which keeps
//! every transition unit-testable.

pub mod completion;
pub mod frames;
pub mod resolve;

pub use completion::completion_met;
pub use frames::{FrameDefaults, FrameRecord, FrameStore, FrameStoreError, FrameTable};
pub use resolve::{resolve_targets, ResolveTicket, RetryPolicy};

use crate::form::WidgetEntry;
use crate::model::Frame;

/// Where the tour currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Active(usize),
    Closed,
}

/// User intents the controller accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    /// One frame back, never gated.
    Retreat,
    /// One frame forward, gated by the active frame's completion rule.
    Advance,
    /// Jump forward by `n` frames ignoring completion, clamped to the last frame.
    SkipAhead(usize),
    /// Leave the tour.
    Close,
    /// Reopen a closed tour at the first frame.
    Restart,
}

/// What an action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Moved { index: usize },
    /// Advance was refused; the task text gets the shake animation.
    Nudged,
    Closed,
    /// Frame data is not loaded yet; retry on a later tick.
    Deferred,
    Unchanged,
}

/// Shake animation state for a refused advance: the task line is drawn at a
/// horizontal offset that runs left, right, home over successive ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nudge {
    remaining: u8,
}

impl Nudge {
    const MOVES: [i16; 3] = [-1, 1, 0];

    fn new() -> Self {
        Self { remaining: Self::MOVES.len() as u8 }
    }

    /// Current horizontal offset of the task line, in cells.
    pub fn dx(&self) -> i16 {
        let step = Self::MOVES.len() - self.remaining as usize;
        Self::MOVES[step]
    }

    fn tick(self) -> Option<Self> {
        match self.remaining {
            0 | 1 => None,
            n => Some(Self { remaining: n - 1 }),
        }
    }
}

/// The tour state machine.
///
/// The epoch counts frame activations; asynchronous work started for an
/// earlier activation compares its recorded epoch and drops stale results.
#[derive(Debug, Clone)]
pub struct StepController {
    state: StepState,
    epoch: u64,
    click_latched: bool,
    nudge: Option<Nudge>,
}

impl Default for StepController {
    fn default() -> Self {
        Self::new()
    }
}

impl StepController {
    /// Opens the tour at the first frame.
    pub fn new() -> Self {
        Self { state: StepState::Active(0), epoch: 1, click_latched: false, nudge: None }
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn active_index(&self) -> Option<usize> {
        match self.state {
            StepState::Active(index) => Some(index),
            StepState::Closed => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, StepState::Closed)
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn click_latched(&self) -> bool {
        self.click_latched
    }

    /// Records an activation of one of the active frame's targets.
    pub fn notify_target_clicked(&mut self) {
        if matches!(self.state, StepState::Active(_)) {
            self.click_latched = true;
        }
    }

    pub fn nudge(&self) -> Option<Nudge> {
        self.nudge
    }

    /// Advances the shake animation by one tick.
    pub fn tick_nudge(&mut self) {
        self.nudge = self.nudge.and_then(Nudge::tick);
    }

    /// The active frame, fetched from the store.
    pub fn active_frame(&self, store: &FrameStore) -> Option<Frame> {
        let index = self.active_index()?;
        store.frame(index).ok()
    }

    /// Applies one action. `targets` are the resolved widgets of the active
    /// frame, used only for the completion gate on [`StepAction::Advance`].
    pub fn apply(
        &mut self,
        action: StepAction,
        store: &FrameStore,
        targets: &[WidgetEntry],
    ) -> StepOutcome {
        match (self.state, action) {
            (StepState::Closed, StepAction::Restart) => self.activate(0),
            (StepState::Closed, _) => StepOutcome::Unchanged,
            (StepState::Active(_), StepAction::Restart) => StepOutcome::Unchanged,

            (StepState::Active(_), StepAction::Close) => {
                self.state = StepState::Closed;
                self.click_latched = false;
                self.nudge = None;
                StepOutcome::Closed
            }

            (StepState::Active(0), StepAction::Retreat) => StepOutcome::Unchanged,
            (StepState::Active(index), StepAction::Retreat) => self.activate(index - 1),

            (StepState::Active(index), StepAction::Advance) => {
                let (len, frame) = match (store.len(), store.frame(index)) {
                    (Ok(len), Ok(frame)) => (len, frame),
                    _ => return StepOutcome::Deferred,
                };
                if !completion_met(frame.completion(), targets, self.click_latched) {
                    self.nudge = Some(Nudge::new());
                    return StepOutcome::Nudged;
                }
                if index + 1 >= len {
                    self.state = StepState::Closed;
                    self.click_latched = false;
                    self.nudge = None;
                    return StepOutcome::Closed;
                }
                self.activate(index + 1)
            }

            (StepState::Active(index), StepAction::SkipAhead(count)) => {
                let len = match store.len() {
                    Ok(len) => len,
                    Err(_) => return StepOutcome::Deferred,
                };
                let last = len.saturating_sub(1);
                let next = index.saturating_add(count).min(last);
                if next == index {
                    return StepOutcome::Unchanged;
                }
                self.activate(next)
            }
        }
    }

    /// Makes `index` the active frame: new epoch, latch and shake reset.
    fn activate(&mut self, index: usize) -> StepOutcome {
        self.state = StepState::Active(index);
        self.epoch = self.epoch.wrapping_add(1);
        self.click_latched = false;
        self.nudge = None;
        StepOutcome::Moved { index }
    }
}
