// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use ratatui::layout::Rect;
use smallvec::SmallVec;

use super::{OverlayMask, Shade};

/// Margin, in cells, added around each highlighted widget before cutting its hole.
pub const HOLE_PADDING: u16 = 1;

/// Paints the tutorial mask for one draw pass.
///
/// Everything inside `area` is dimmed, the nav strip gets the lighter
/// translucent shade, and each hole rectangle is cut with `padding` extra cells
/// on every side. Holes are clipped to the content region; the nav strip never
/// loses its shade to a hole. Stateless by design: callers re-run this on frame
/// change, resize, and scroll, and the latest call wins.
pub fn paint_mask(area: Rect, nav: Rect, holes: &[Rect], padding: u16) -> OverlayMask {
    let mut mask = OverlayMask::filled(area, Shade::Dim);
    mask.fill_rect(nav, Shade::Nav);

    let expanded: SmallVec<[Rect; 4]> =
        holes.iter().map(|hole| expand_rect(*hole, padding)).collect();
    for hole in expanded {
        // Dim-only replacement keeps the nav strip intact where a hole overlaps it.
        mask.replace_rect(hole, Shade::Dim, Shade::Hole);
    }

    mask
}

fn expand_rect(rect: Rect, padding: u16) -> Rect {
    let x = rect.x.saturating_sub(padding);
    let y = rect.y.saturating_sub(padding);
    Rect {
        x,
        y,
        width: rect.width.saturating_add(rect.x - x).saturating_add(padding),
        height: rect.height.saturating_add(rect.y - y).saturating_add(padding),
    }
}
