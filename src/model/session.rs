// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::plot::PlotDef;

/// Field visibility level of the form (`detaillevel` in the request).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    #[default]
    Basic,
    Advanced,
}

impl DetailLevel {
    pub const ALL: [DetailLevel; 2] = [DetailLevel::Basic, DetailLevel::Advanced];

    pub fn as_param(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Advanced => "advanced",
        }
    }
}

/// A plot the user kept: the submitted request plus the server's result URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPlot {
    name: String,
    params: Vec<(String, String)>,
    result_url: Option<String>,
}

impl SavedPlot {
    pub fn new(name: impl Into<String>, params: Vec<(String, String)>) -> Self {
        Self { name: name.into(), params, result_url: None }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn result_url(&self) -> Option<&str> {
        self.result_url.as_deref()
    }

    pub fn set_result_url(&mut self, result_url: Option<String>) {
        self.result_url = result_url;
    }
}

/// The top-level container the TUI runs against: the current plot definitions,
/// session-wide settings, and the plots the user saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotSession {
    detail_level: DetailLevel,
    plots: Vec<PlotDef>,
    time_binning: String,
    legend_position: String,
    saved_plots: Vec<SavedPlot>,
    rev: u64,
}

impl Default for PlotSession {
    fn default() -> Self {
        Self {
            detail_level: DetailLevel::Basic,
            plots: vec![PlotDef::new()],
            time_binning: String::new(),
            legend_position: "best".to_owned(),
            saved_plots: Vec::new(),
            rev: 0,
        }
    }
}

impl PlotSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detail_level(&self) -> DetailLevel {
        self.detail_level
    }

    pub fn set_detail_level(&mut self, detail_level: DetailLevel) {
        self.detail_level = detail_level;
    }

    pub fn plots(&self) -> &[PlotDef] {
        &self.plots
    }

    pub fn plots_mut(&mut self) -> &mut Vec<PlotDef> {
        &mut self.plots
    }

    pub fn time_binning(&self) -> &str {
        &self.time_binning
    }

    pub fn set_time_binning(&mut self, time_binning: impl Into<String>) {
        self.time_binning = time_binning.into();
    }

    pub fn legend_position(&self) -> &str {
        &self.legend_position
    }

    pub fn set_legend_position(&mut self, legend_position: impl Into<String>) {
        self.legend_position = legend_position.into();
    }

    pub fn saved_plots(&self) -> &[SavedPlot] {
        &self.saved_plots
    }

    pub fn saved_plots_mut(&mut self) -> &mut Vec<SavedPlot> {
        &mut self.saved_plots
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn bump_rev(&mut self) {
        self.rev = self.rev.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::PlotSession;

    #[test]
    fn default_session_has_one_empty_plot() {
        let session = PlotSession::new();
        assert_eq!(session.plots().len(), 1);
        assert!(session.plots()[0].dataset().is_empty());
        assert_eq!(session.rev(), 0);
    }

    #[test]
    fn bump_rev_is_monotonic() {
        let mut session = PlotSession::new();
        session.bump_rev();
        session.bump_rev();
        assert_eq!(session.rev(), 2);
    }
}
