// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pure task-completion check for the active tutorial frame.

use crate::form::WidgetEntry;
use crate::model::CompletionMode;

/// Decides whether the active frame's task is done.
///
/// `targets` are the resolved widgets of the frame, `click_latched` is true
/// once the user activated one of them since the frame became active. Value
/// checks read the first resolved target only; with no resolved targets a
/// value check can never pass.
pub fn completion_met(mode: &CompletionMode, targets: &[WidgetEntry], click_latched: bool) -> bool {
    match mode {
        CompletionMode::None => true,
        CompletionMode::Click => click_latched,
        CompletionMode::ValueEquals(expected) => {
            first_value(targets).map(|value| value == expected).unwrap_or(false)
        }
        // Whitespace counts: "entered something" is literal, not trimmed.
        CompletionMode::NonEmpty => {
            first_value(targets).map(|value| !value.is_empty()).unwrap_or(false)
        }
    }
}

fn first_value(targets: &[WidgetEntry]) -> Option<&str> {
    targets.first().and_then(|entry| entry.value.as_deref())
}

#[cfg(test)]
mod tests {
    use super::completion_met;
    use crate::form::WidgetEntry;
    use crate::model::CompletionMode;

    fn target(value: &str) -> Vec<WidgetEntry> {
        vec![WidgetEntry::new("s0").with_value(value)]
    }

    #[test]
    fn none_is_always_met() {
        assert!(completion_met(&CompletionMode::None, &[], false));
    }

    #[test]
    fn click_requires_the_latch() {
        assert!(!completion_met(&CompletionMode::Click, &target("x"), false));
        assert!(completion_met(&CompletionMode::Click, &target("x"), true));
    }

    #[test]
    fn value_equals_is_exact_and_case_sensitive() {
        let mode = CompletionMode::ValueEquals("Polarstern".to_owned());
        assert!(completion_met(&mode, &target("Polarstern"), false));
        assert!(!completion_met(&mode, &target("polarstern"), false));
        assert!(!completion_met(&mode, &target("Polarstern "), false));
    }

    #[test]
    fn value_checks_fail_without_resolved_targets() {
        let mode = CompletionMode::ValueEquals("x".to_owned());
        assert!(!completion_met(&mode, &[], true));
        assert!(!completion_met(&CompletionMode::NonEmpty, &[], true));
    }

    #[test]
    fn non_empty_accepts_whitespace_only_input() {
        assert!(!completion_met(&CompletionMode::NonEmpty, &target(""), false));
        assert!(completion_met(&CompletionMode::NonEmpty, &target("  "), false));
        assert!(completion_met(&CompletionMode::NonEmpty, &target("600"), false));
    }

    #[test]
    fn value_check_ignores_latch_state() {
        let mode = CompletionMode::ValueEquals("xy".to_owned());
        assert!(completion_met(&mode, &target("xy"), false));
        assert!(!completion_met(&mode, &target("h1"), true));
    }

    #[test]
    fn only_the_first_target_is_consulted() {
        let mode = CompletionMode::ValueEquals("xy".to_owned());
        let targets = vec![
            WidgetEntry::new("m0").with_value("h1"),
            WidgetEntry::new("m1").with_value("xy"),
        ];
        assert!(!completion_met(&mode, &targets, false));
    }
}
