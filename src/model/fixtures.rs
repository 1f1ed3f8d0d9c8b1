// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Built-in demo data for offline/demo mode and tests.

use super::plot::{DatasetInfo, PlotMode};
use super::session::PlotSession;

/// Dataset catalog used when no render server is configured.
///
/// Ids follow the server's `<experiment>/<file>.h5:<table>` handles.
pub(crate) fn demo_datasets() -> Vec<DatasetInfo> {
    vec![
        DatasetInfo::new(
            "Polarstern/2017-2018_PS-nm-mt.h5:/raw/PS_mu_nm_data",
            "neutron monitor and muon telescope",
        ),
        DatasetInfo::new(
            "Neumayer/2014_NM-Station.h5:/raw/NM_data",
            "neutron monitor station",
        ),
        DatasetInfo::new(
            "Zeuthen/2015_trigger-hodoscope.h5:/raw/hodoscope_rates",
            "trigger hodoscope rates",
        ),
        DatasetInfo::new(
            "Zeuthen/2013_weather-station.h5:/raw/weather",
            "weather station",
        ),
        DatasetInfo::new(
            "Cosmo/2016_cosmo-mill.h5:/raw/cosmo_events",
            "cosmo event mill",
        ),
    ]
}

pub(crate) fn demo_session() -> PlotSession {
    let mut session = PlotSession::new();
    {
        let plot = &mut session.plots_mut()[0];
        plot.set_experiment("Polarstern");
        plot.set_dataset("Polarstern/2017-2018_PS-nm-mt.h5:/raw/PS_mu_nm_data");
        plot.set_mode(PlotMode::Xy);
        plot.set_x_expr("time");
        plot.set_y_expr("mu_rate");
    }
    session
}
