// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Triton — terminal front end for a scientific plot server, with a guided tour.
//!
//! The crate is a single-crate layout: plot form and session model, tutorial
//! engine (frame store, step controller, overlay mask), HTTP client worker,
//! and on-disk session persistence.

pub mod client;
pub mod form;
pub mod model;
pub mod render;
pub mod store;
pub mod tui;
pub mod tutorial;
pub mod ui;

#[cfg(test)]
mod tests {
    #[test]
    fn sanity() {
        assert_eq!(2 + 2, 4);
    }
}
