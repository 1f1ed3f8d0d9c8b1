// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tutorial overlay rendering.
//!
//! The overlay is a pure function of the current geometry: a dark mask over the
//! viewport with fully transparent holes cut around the highlighted widgets and
//! a lighter translucent strip over the navigation bar. The TUI applies the
//! resulting mask cell-by-cell to the frame buffer; `mask_to_string` exists so
//! tests can snapshot masks as text grids.

use ratatui::layout::Rect;

pub mod overlay;

pub use overlay::{paint_mask, HOLE_PADDING};

/// Per-cell shading decision of the overlay mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shade {
    /// Opaque dark mask; the underlying cell is dimmed and inert.
    Dim,
    /// Cut-out around a highlighted widget; the cell shows through untouched.
    Hole,
    /// Navigation strip: dimmed lighter, stays visible and interactive.
    Nav,
}

/// Row-major shading grid covering one terminal area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayMask {
    area: Rect,
    cells: Vec<Shade>,
}

impl OverlayMask {
    pub fn filled(area: Rect, shade: Shade) -> Self {
        let len = area.width as usize * area.height as usize;
        Self { area, cells: vec![shade; len] }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Shade at absolute terminal coordinates; `None` outside the mask area.
    pub fn shade_at(&self, x: u16, y: u16) -> Option<Shade> {
        if x < self.area.x
            || y < self.area.y
            || x >= self.area.x + self.area.width
            || y >= self.area.y + self.area.height
        {
            return None;
        }
        let col = (x - self.area.x) as usize;
        let row = (y - self.area.y) as usize;
        Some(self.cells[row * self.area.width as usize + col])
    }

    pub(crate) fn fill_rect(&mut self, rect: Rect, shade: Shade) {
        let rect = rect.intersection(self.area);
        for y in rect.y..rect.y + rect.height {
            let row = (y - self.area.y) as usize;
            for x in rect.x..rect.x + rect.width {
                let col = (x - self.area.x) as usize;
                self.cells[row * self.area.width as usize + col] = shade;
            }
        }
    }

    pub(crate) fn replace_rect(&mut self, rect: Rect, from: Shade, to: Shade) {
        let rect = rect.intersection(self.area);
        for y in rect.y..rect.y + rect.height {
            let row = (y - self.area.y) as usize;
            for x in rect.x..rect.x + rect.width {
                let col = (x - self.area.x) as usize;
                let cell = &mut self.cells[row * self.area.width as usize + col];
                if *cell == from {
                    *cell = to;
                }
            }
        }
    }
}

/// Text-grid snapshot of a mask: `▓` dim, `░` nav, `·` hole.
pub fn mask_to_string(mask: &OverlayMask) -> String {
    let area = mask.area();
    let mut out = String::with_capacity((area.width as usize + 1) * area.height as usize);
    for y in area.y..area.y + area.height {
        if y > area.y {
            out.push('\n');
        }
        for x in area.x..area.x + area.width {
            let ch = match mask.shade_at(x, y) {
                Some(Shade::Dim) => '▓',
                Some(Shade::Nav) => '░',
                Some(Shade::Hole) => '·',
                None => ' ',
            };
            out.push(ch);
        }
    }
    out
}
