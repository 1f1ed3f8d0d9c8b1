// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Target resolution with bounded retry.
//!
//! A frame's targets may not exist yet when the frame becomes active, e.g. the
//! plot image panel before the first diagram arrives. Resolution is retried on
//! a fixed interval for a bounded number of attempts; a [`ResolveTicket`] is
//! tagged with the controller epoch so results for a frame the user already
//! left are dropped.

use std::env;
use std::time::{Duration, Instant};

use crate::form::{WidgetEntry, WidgetRegistry};
use crate::model::TargetQuery;

const POLL_MS_VAR: &str = "TRITON_TUTORIAL_POLL_MS";
const POLL_ATTEMPTS_VAR: &str = "TRITON_TUTORIAL_POLL_ATTEMPTS";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
const DEFAULT_MAX_ATTEMPTS: u32 = 400;

/// All widgets matching the query, in registry order.
pub fn resolve_targets(query: &TargetQuery, registry: &WidgetRegistry) -> Vec<WidgetEntry> {
    registry
        .entries()
        .iter()
        .filter(|entry| query.matches(&entry.id, &entry.groups))
        .cloned()
        .collect()
}

/// How long and how often to retry resolving a missing target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    interval: Duration,
    max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { interval: DEFAULT_POLL_INTERVAL, max_attempts: DEFAULT_MAX_ATTEMPTS }
    }
}

impl RetryPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self { interval, max_attempts }
    }

    /// Reads `TRITON_TUTORIAL_POLL_MS` / `TRITON_TUTORIAL_POLL_ATTEMPTS`,
    /// keeping the defaults for unset or unparsable values.
    pub fn from_env() -> Self {
        let mut policy = Self::default();
        if let Some(ms) = env_u64(POLL_MS_VAR) {
            policy.interval = Duration::from_millis(ms);
        }
        if let Some(attempts) = env_u64(POLL_ATTEMPTS_VAR) {
            policy.max_attempts = attempts.min(u32::MAX as u64) as u32;
        }
        policy
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

fn env_u64(var: &str) -> Option<u64> {
    env::var(var).ok().and_then(|raw| raw.trim().parse().ok())
}

/// One pending resolution attempt series for a single frame activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveTicket {
    epoch: u64,
    attempts: u32,
    next_attempt_at: Instant,
}

impl ResolveTicket {
    pub fn new(epoch: u64) -> Self {
        Self { epoch, attempts: 0, next_attempt_at: Instant::now() }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// True when the ticket belongs to a frame activation that is still current.
    pub fn is_current(&self, controller_epoch: u64) -> bool {
        self.epoch == controller_epoch
    }

    pub fn due(&self, now: Instant) -> bool {
        now >= self.next_attempt_at
    }

    pub fn exhausted(&self, policy: &RetryPolicy) -> bool {
        self.attempts >= policy.max_attempts()
    }

    /// Records a failed attempt and schedules the next one.
    pub fn retry(&mut self, policy: &RetryPolicy, now: Instant) {
        self.attempts = self.attempts.saturating_add(1);
        self.next_attempt_at = now + policy.interval();
    }
}
