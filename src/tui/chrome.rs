// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Layout, title, footer, and tutorial-panel geometry helpers used by TUI rendering.
fn stack_main_panes_vertically(area: Rect) -> bool {
    area.width < 100
}

fn view_title(label: &str, key: char, tail: Option<&str>) -> String {
    let mut title = format!("─[{key}]─ {label}");
    if let Some(tail) = tail {
        let tail = tail.trim();
        if !tail.is_empty() {
            title.push(' ');
            title.push_str(tail);
        }
    }
    title.push(' ');
    title
}

fn frame_counter_label(index: usize, total: usize) -> String {
    format!("({} / {total})", index + 1)
}

fn push_footer_entry(spans: &mut Vec<Span<'static>>, label: &str, key: &str) {
    spans.push(Span::styled(
        format!("{label} "),
        Style::default().fg(FOOTER_LABEL_COLOR),
    ));
    spans.push(Span::styled(key.to_owned(), Style::default().fg(FOOTER_KEY_COLOR)));
    spans.push(Span::raw("  "));
}

fn footer_help_line(app: &App, toast_suffix: &str) -> Line<'static> {
    let mut spans = Vec::<Span<'static>>::new();

    if app.tutorial_active() {
        push_footer_entry(&mut spans, "BACK", "←");
        push_footer_entry(&mut spans, "NEXT", "→");
        push_footer_entry(&mut spans, "SKIP", "g");
        push_footer_entry(&mut spans, "RESET", "c");
        push_footer_entry(&mut spans, "LEAVE", "esc");
    } else {
        push_footer_entry(&mut spans, "FIELD", "tab");
        push_footer_entry(&mut spans, "CYCLE", "←→");
        push_footer_entry(&mut spans, "RUN", "enter");
        push_footer_entry(&mut spans, "FIND", "/");
        push_footer_entry(&mut spans, "TOUR", "t");
        push_footer_entry(&mut spans, "QUIT", "q");
    }

    if !toast_suffix.is_empty() {
        spans.push(Span::styled(
            toast_suffix.to_owned(),
            Style::default().fg(FOOTER_LABEL_COLOR),
        ));
    }

    Line::from(spans)
}

fn footer_brand_line() -> Line<'static> {
    Line::from(Span::styled(
        FOOTER_BRAND.to_owned(),
        Style::default().fg(FOOTER_BRAND_COLOR),
    ))
}

fn search_footer_line(query: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled("dataset> ".to_owned(), Style::default().fg(FOOTER_KEY_COLOR)),
        Span::raw(query.to_owned()),
    ])
}

/// Panel placement for the tutorial text, from viewport-percent coordinates.
/// The panel is centered on the requested point and clamped into `area`.
fn text_panel_rect(position: TextPosition, area: Rect) -> Rect {
    let width = TUTORIAL_PANEL_WIDTH.min(area.width.saturating_sub(2)).max(1);
    let height = TUTORIAL_PANEL_HEIGHT.min(area.height.saturating_sub(2)).max(1);
    if width > area.width || height > area.height {
        // Degenerate area: nothing to place the panel in.
        return Rect { width: 0, height: 0, ..area };
    }

    let anchor_x = area.x + (area.width.saturating_mul(position.x.min(100))) / 100;
    let anchor_y = area.y + (area.height.saturating_mul(position.y.min(100))) / 100;

    let max_x = area.x + (area.width - width);
    let max_y = area.y + (area.height - height);
    Rect {
        x: anchor_x.saturating_sub(width / 2).clamp(area.x, max_x),
        y: anchor_y.saturating_sub(height / 2).clamp(area.y, max_y),
        width,
        height,
    }
}

/// Horizontal shake offset, kept inside `bounds`.
fn shift_rect_x(rect: Rect, dx: i16, bounds: Rect) -> Rect {
    let max_x = bounds.x + bounds.width.saturating_sub(rect.width);
    let x = (rect.x as i32 + dx as i32).clamp(bounds.x as i32, max_x as i32) as u16;
    Rect { x, ..rect }
}

/// Scroll offset that puts a content line in the upper band of its pane
/// (2/5 down). Lines already near the top stay at offset zero.
fn scroll_for_line(line: u16, viewport_height: u16) -> u16 {
    let band = viewport_height.saturating_mul(2) / 5;
    line.saturating_sub(band)
}

fn truncate_cell_text(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_owned();
    }
    let keep = max_width.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push('…');
    out
}
