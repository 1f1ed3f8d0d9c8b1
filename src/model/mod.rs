// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Sessions contain plot definitions plus saved plots; tutorial frames describe
//! the guided tour steps layered over the form UI.

pub(crate) mod fixtures;
pub mod frame;
pub mod plot;
pub mod session;

pub use frame::{CompletionMode, Frame, Selector, TargetQuery, TargetQueryError, TextPosition};
pub use plot::{DatasetInfo, ParsePlotModeError, PlotDef, PlotMode};
pub use session::{DetailLevel, PlotSession, SavedPlot};
