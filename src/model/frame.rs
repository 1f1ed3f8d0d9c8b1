// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Placement of the tutorial text panel, in percent of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPosition {
    pub x: u16,
    pub y: u16,
}

impl Default for TextPosition {
    fn default() -> Self {
        Self { x: 75, y: 40 }
    }
}

/// Per-frame rule deciding whether the user may advance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompletionMode {
    #[default]
    None,
    /// Satisfied once the tracked widget received an activation since the frame
    /// became current (one-shot; the latch resets on frame change).
    Click,
    /// Exact, case-sensitive comparison against the first target's value.
    ValueEquals(String),
    /// First target's value is a non-empty string (whitespace counts).
    NonEmpty,
}

/// Widget query of a tutorial frame: a comma-separated union of selectors.
///
/// `name` matches a widget id exactly; `.group` matches every widget tagged
/// with that group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetQuery {
    selectors: Vec<Selector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Id(SmolStr),
    Group(SmolStr),
}

impl Selector {
    pub fn matches(&self, widget_id: &str, groups: &[SmolStr]) -> bool {
        match self {
            Self::Id(id) => id == widget_id,
            Self::Group(group) => groups.iter().any(|g| g == group),
        }
    }
}

impl TargetQuery {
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    pub fn matches(&self, widget_id: &str, groups: &[SmolStr]) -> bool {
        self.selectors.iter().any(|s| s.matches(widget_id, groups))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetQueryError {
    Empty,
    EmptySelector,
}

impl fmt::Display for TargetQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("target query must not be empty"),
            Self::EmptySelector => f.write_str("target query contains an empty selector"),
        }
    }
}

impl std::error::Error for TargetQueryError {}

impl FromStr for TargetQuery {
    type Err = TargetQueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(TargetQueryError::Empty);
        }

        let mut selectors = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(TargetQueryError::EmptySelector);
            }
            if let Some(group) = part.strip_prefix('.') {
                if group.is_empty() {
                    return Err(TargetQueryError::EmptySelector);
                }
                selectors.push(Selector::Group(SmolStr::new(group)));
            } else {
                selectors.push(Selector::Id(SmolStr::new(part)));
            }
        }

        Ok(Self { selectors })
    }
}

impl fmt::Display for TargetQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, selector) in self.selectors.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            match selector {
                Selector::Id(id) => f.write_str(id)?,
                Selector::Group(group) => write!(f, ".{group}")?,
            }
        }
        Ok(())
    }
}

/// One step of the guided tutorial, with store defaults already merged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    index: usize,
    headline: String,
    explanation: String,
    task: String,
    text_position: TextPosition,
    target: Option<TargetQuery>,
    completion: CompletionMode,
    locked: bool,
}

impl Frame {
    pub fn new(index: usize, headline: impl Into<String>) -> Self {
        Self {
            index,
            headline: headline.into(),
            explanation: String::new(),
            task: String::new(),
            text_position: TextPosition::default(),
            target: None,
            completion: CompletionMode::None,
            locked: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn set_explanation(&mut self, explanation: impl Into<String>) {
        self.explanation = explanation.into();
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn set_task(&mut self, task: impl Into<String>) {
        self.task = task.into();
    }

    pub fn text_position(&self) -> TextPosition {
        self.text_position
    }

    pub fn set_text_position(&mut self, text_position: TextPosition) {
        self.text_position = text_position;
    }

    pub fn target(&self) -> Option<&TargetQuery> {
        self.target.as_ref()
    }

    pub fn set_target(&mut self, target: Option<TargetQuery>) {
        self.target = target;
    }

    pub fn completion(&self) -> &CompletionMode {
        &self.completion
    }

    pub fn set_completion(&mut self, completion: CompletionMode) {
        self.completion = completion;
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }
}

#[cfg(test)]
mod tests {
    use super::{CompletionMode, Selector, TargetQuery, TargetQueryError};
    use smol_str::SmolStr;

    #[test]
    fn parses_single_id() {
        let query: TargetQuery = "experiment0".parse().expect("parse query");
        assert_eq!(query.selectors().len(), 1);
        assert!(query.matches("experiment0", &[]));
        assert!(!query.matches("experiment1", &[]));
    }

    #[test]
    fn parses_union_and_groups() {
        let query: TargetQuery = "plot-settings, .saved-actions".parse().expect("parse query");
        assert!(query.matches("plot-settings", &[]));
        assert!(query.matches("btn-load", &[SmolStr::new("saved-actions")]));
        assert!(!query.matches("btn-load", &[SmolStr::new("other")]));
    }

    #[test]
    fn rejects_empty_query_and_selectors() {
        assert_eq!("  ".parse::<TargetQuery>().unwrap_err(), TargetQueryError::Empty);
        assert_eq!(
            "a,,b".parse::<TargetQuery>().unwrap_err(),
            TargetQueryError::EmptySelector
        );
        assert_eq!(".".parse::<TargetQuery>().unwrap_err(), TargetQueryError::EmptySelector);
    }

    #[test]
    fn group_selector_matches_only_group_tags() {
        let sel = Selector::Group(SmolStr::new("btns"));
        assert!(sel.matches("anything", &[SmolStr::new("btns")]));
        assert!(!sel.matches("btns", &[]));
    }

    #[test]
    fn completion_mode_document_representation() {
        let json = serde_json::to_string(&CompletionMode::ValueEquals("Polarstern".into()))
            .expect("serialize");
        assert_eq!(json, r#"{"valueEquals":"Polarstern"}"#);
        let mode: CompletionMode = serde_json::from_str("\"nonEmpty\"").expect("deserialize");
        assert_eq!(mode, CompletionMode::NonEmpty);
    }
}
