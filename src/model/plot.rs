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

/// Diagram kind for one plot definition, mirroring the render server's `m<i>` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotMode {
    #[default]
    Histogram1d,
    Xy,
    Histogram2d,
    Profile,
    Map,
}

impl PlotMode {
    pub const ALL: [PlotMode; 5] = [
        PlotMode::Histogram1d,
        PlotMode::Xy,
        PlotMode::Histogram2d,
        PlotMode::Profile,
        PlotMode::Map,
    ];

    /// Wire value understood by the render server.
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Histogram1d => "h1",
            Self::Xy => "xy",
            Self::Histogram2d => "h2",
            Self::Profile => "p",
            Self::Map => "map",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Histogram1d => "1D histogram",
            Self::Xy => "XY diagram",
            Self::Histogram2d => "2D histogram",
            Self::Profile => "profile",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for PlotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePlotModeError {
    value: String,
}

impl fmt::Display for ParsePlotModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown plot mode '{}'", self.value)
    }
}

impl std::error::Error for ParsePlotModeError {}

impl FromStr for PlotMode {
    type Err = ParsePlotModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "h1" => Ok(Self::Histogram1d),
            "xy" => Ok(Self::Xy),
            "h2" => Ok(Self::Histogram2d),
            "p" => Ok(Self::Profile),
            "map" => Ok(Self::Map),
            other => Err(ParsePlotModeError { value: other.to_owned() }),
        }
    }
}

/// One dataset as advertised by the render server's `a=list` action.
///
/// The `id` is the server-side handle (`<experiment>/<file>.h5:<table path>`); the
/// experiment name is the leading path segment of that handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    id: String,
    title: String,
}

impl DatasetInfo {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn experiment(&self) -> &str {
        match self.id.split_once('/') {
            Some((experiment, _)) => experiment,
            None => &self.id,
        }
    }

    /// Short label for select boxes: file stem plus table title.
    pub fn label(&self) -> String {
        let file = self.id.split(':').next().unwrap_or(&self.id);
        let stem = file
            .rsplit('/')
            .next()
            .unwrap_or(file)
            .trim_end_matches(".h5");
        format!("{stem} - {}", self.title)
    }
}

/// One plot definition within a session, the unit the form edits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlotDef {
    experiment: String,
    dataset: String,
    mode: PlotMode,
    x_expr: String,
    y_expr: String,
}

impl PlotDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    pub fn set_experiment(&mut self, experiment: impl Into<String>) {
        self.experiment = experiment.into();
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    pub fn set_dataset(&mut self, dataset: impl Into<String>) {
        self.dataset = dataset.into();
    }

    pub fn mode(&self) -> PlotMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PlotMode) {
        self.mode = mode;
    }

    pub fn x_expr(&self) -> &str {
        &self.x_expr
    }

    pub fn set_x_expr(&mut self, x_expr: impl Into<String>) {
        self.x_expr = x_expr.into();
    }

    pub fn y_expr(&self) -> &str {
        &self.y_expr
    }

    pub fn set_y_expr(&mut self, y_expr: impl Into<String>) {
        self.y_expr = y_expr.into();
    }
}

#[cfg(test)]
mod tests {
    use super::{DatasetInfo, PlotMode};

    #[test]
    fn plot_mode_params_round_trip() {
        for mode in PlotMode::ALL {
            assert_eq!(mode.as_param().parse::<PlotMode>().expect("parse mode"), mode);
        }
    }

    #[test]
    fn unknown_mode_is_rejected() {
        "scatter".parse::<PlotMode>().unwrap_err();
    }

    #[test]
    fn dataset_experiment_is_leading_segment() {
        let info = DatasetInfo::new(
            "Polarstern/2017-2018_PS-nm-mt.h5:/raw/PS_mu_nm_data",
            "neutron monitor and muon telescope",
        );
        assert_eq!(info.experiment(), "Polarstern");
        assert_eq!(info.label(), "2017-2018_PS-nm-mt - neutron monitor and muon telescope");
    }
}
