// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Shared UI state for cross-component coordination.
//!
//! The tutorial engine requests scroll adjustments here and the form view
//! consumes them on the next draw; neither side holds a reference to the other.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    rev: u64,
    scroll_y: u16,
    requested_scroll_line: Option<u16>,
}

impl Default for UiState {
    fn default() -> Self {
        Self { rev: 0, scroll_y: 0, requested_scroll_line: None }
    }
}

impl UiState {
    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn scroll_y(&self) -> u16 {
        self.scroll_y
    }

    pub fn set_scroll_y(&mut self, scroll_y: u16) {
        if self.scroll_y == scroll_y {
            return;
        }
        self.scroll_y = scroll_y;
        self.rev = self.rev.wrapping_add(1);
    }

    /// Asks the form view to bring `line` into its preferred band on the next
    /// draw. The newest request wins.
    pub fn request_scroll_to_line(&mut self, line: u16) {
        self.requested_scroll_line = Some(line);
        self.rev = self.rev.wrapping_add(1);
    }

    pub fn take_scroll_request(&mut self) -> Option<u16> {
        self.requested_scroll_line.take()
    }
}
