// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! Provides the interactive TUI shell (ratatui + crossterm): the plot form on
//! the left, render results and saved plots on the right, and the guided
//! tutorial overlay on top of everything. The shell owns the draw loop; the
//! render server is reached through the channel pair from
//! [`crate::client::spawn_worker`].

use std::{
    error::Error,
    io,
    sync::mpsc::Receiver,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use smol_str::SmolStr;
use tokio::sync::mpsc::UnboundedSender;

use crate::client::{ClientRequest, ClientResponse, PlotResult};
use crate::form::{FieldKind, PlotForm, Section, WidgetEntry, WidgetRegistry};
use crate::model::{CompletionMode, DatasetInfo, PlotSession, SavedPlot, TextPosition};
use crate::render::{paint_mask, OverlayMask, Shade, HOLE_PADDING};
use crate::store::SessionFolder;
use crate::tutorial::{
    resolve_targets, FrameStore, ResolveTicket, RetryPolicy, StepAction, StepController,
    StepOutcome,
};
use crate::ui::UiState;

mod theme;
use theme::TuiTheme;

const FOOTER_LABEL_COLOR: Color = Color::Gray;
const FOOTER_KEY_COLOR: Color = Color::Cyan;
const FOOTER_BRAND_COLOR: Color = Color::White;
const FOOTER_BRAND: &str = "🆃 🆁 🅸 🆃 🅾 🅽 ";
const TUTORIAL_PANEL_WIDTH: u16 = 44;
const TUTORIAL_PANEL_HEIGHT: u16 = 10;
const TOAST_TTL: Duration = Duration::from_secs(3);
const FIELD_LABEL_WIDTH: usize = 16;

/// The built-in demo content, also used by `--demo`.
pub fn demo_session() -> PlotSession {
    crate::model::fixtures::demo_session()
}

pub fn demo_datasets() -> Vec<DatasetInfo> {
    crate::model::fixtures::demo_datasets()
}

/// Runs the interactive terminal UI until the user quits.
pub fn run(
    session_folder: SessionFolder,
    frame_store: FrameStore,
    datasets: Vec<DatasetInfo>,
    requests: UnboundedSender<ClientRequest>,
    responses: Receiver<ClientResponse>,
) -> Result<(), Box<dyn Error>> {
    let session = session_folder.load_or_init_session()?;
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(session, session_folder, frame_store, datasets, requests, responses);

    while !app.should_quit {
        app.drain_client_responses();
        app.tick();
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                _ => {}
            }
        }
    }

    app.persist_session();
    Ok(())
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.size();
    app.registry.clear();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let nav_area = rows[0];
    let main_area = rows[1];
    let status_area = rows[2];

    let (form_area, right_area) = {
        let direction = if stack_main_panes_vertically(main_area) {
            Direction::Vertical
        } else {
            Direction::Horizontal
        };
        let panes = Layout::default()
            .direction(direction)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(main_area);
        (panes[0], panes[1])
    };
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(right_area);
    let plot_area = right[0];
    let session_area = right[1];

    render_nav(frame, app, nav_area);
    render_form(frame, app, form_area);
    render_plot(frame, app, plot_area);
    render_session(frame, app, session_area);

    let toast_snapshot = app.toast.as_ref().map(|toast| (toast.message.clone(), toast.expires_at));
    let toast_suffix = match toast_snapshot {
        Some((message, expires_at)) if expires_at > Instant::now() => format!("| {message}"),
        Some(_) => {
            app.toast = None;
            String::new()
        }
        None => String::new(),
    };

    if let Some(search) = app.search.as_ref() {
        let status = Paragraph::new(search_footer_line(&search.query));
        frame.render_widget(status, status_area);
        let cursor_x = status_area
            .x
            .saturating_add(9)
            .saturating_add(search.query.chars().count() as u16)
            .min(status_area.x.saturating_add(status_area.width.saturating_sub(1)));
        frame.set_cursor(cursor_x, status_area.y);
    } else {
        let status = Paragraph::new(footer_help_line(app, &toast_suffix));
        frame.render_widget(status, status_area);
        let brand = Paragraph::new(footer_brand_line()).alignment(Alignment::Right);
        frame.render_widget(brand, status_area);
    }

    // Overlay last so the mask covers the panels but not the footer.
    app.refresh_tutorial_targets(Instant::now());
    render_tutorial_overlay(frame, app, nav_area, main_area);

    if app.intro_visible {
        render_intro(frame, app, main_area);
    }
}

fn render_nav(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let line = if app.tutorial_active() {
        Line::from(vec![
            Span::styled("Guided tour  ".to_owned(), Style::default().fg(FOOTER_BRAND_COLOR)),
            Span::styled("← back   → next   g skip   Esc leave".to_owned(),
                Style::default().fg(FOOTER_LABEL_COLOR)),
        ])
    } else {
        Line::from(Span::styled(
            "Triton — plot builder".to_owned(),
            Style::default().fg(FOOTER_BRAND_COLOR),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_form(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let focused_section = app.focused_section();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(view_title("Plot", '1', None))
        .border_style(app.theme.panel_border_style(focused_section == Some(Section::Form)));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    if let Some(line) = app.scroll.take_scroll_request() {
        app.scroll.set_scroll_y(line);
    }
    let scroll = app.scroll.scroll_y();

    let focused_id = app.focused_id();
    let mut lines = Vec::<Line<'static>>::new();

    for field in app.form.section_fields(Section::Form) {
        let focused = focused_id.as_ref() == Some(field.id());
        lines.push(field_line(field.label(), &field_display(field), focused, &app.theme, inner));
    }

    let para = Paragraph::new(Text::from(lines)).scroll((scroll, 0));
    frame.render_widget(para, inner);

    app.register_form_widgets(inner, scroll);
}

fn render_plot(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(view_title("Result", '2', None))
        .border_style(
            app.theme.panel_border_style(app.focused_section() == Some(Section::Output)),
        );
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height < 4 {
        return;
    }

    let image_rect = Rect { height: inner.height - 3, ..inner };
    let downloads_rect = visible_line_rect(inner, (inner.height - 3) as usize, 0)
        .unwrap_or(Rect { y: inner.y + inner.height - 3, height: 1, ..inner });
    let settings_rect = Rect { y: downloads_rect.y + 1, ..downloads_rect };
    let load_rect = Rect { y: downloads_rect.y + 2, ..downloads_rect };

    let mut image_lines = Vec::<Line<'static>>::new();
    if app.plot_pending {
        image_lines.push(Line::from("Rendering…".to_owned()));
    } else if let Some(result) = app.plot_result.as_ref() {
        match result.png.as_deref() {
            Some(png) => {
                image_lines.push(Line::from(format!("▨ {png}")));
            }
            None => image_lines.push(Line::from("No image in last answer".to_owned())),
        }
        for message in result.errors.messages() {
            image_lines.push(Line::from(Span::styled(message, app.theme.error_style())));
        }
    } else {
        image_lines
            .push(Line::from("No diagram yet — fill the form and press Enter on [ Create diagram ]".to_owned()));
    }
    frame.render_widget(Paragraph::new(Text::from(image_lines)).wrap(Wrap { trim: false }), image_rect);

    let focused_id = app.focused_id();
    if let Some(result) = app.plot_result.as_ref() {
        let downloads = downloads_line(result);
        frame.render_widget(Paragraph::new(downloads), downloads_rect);

        let settings = app.settings_string();
        frame.render_widget(
            Paragraph::new(format!(
                "Settings: {}",
                truncate_cell_text(&settings, settings_rect.width.saturating_sub(10) as usize)
            )),
            settings_rect,
        );

        app.registry.insert(WidgetEntry::new("plot-image").with_rect(image_rect));
        app.registry
            .insert(WidgetEntry::new("download-buttons").with_rect(downloads_rect).interactive());
        app.registry
            .insert(WidgetEntry::new("plot-settings").with_rect(settings_rect).with_value(settings));
    }

    if let Some(field) = app.form.field("load-settings") {
        let focused = focused_id.as_deref() == Some("load-settings");
        frame.render_widget(
            Paragraph::new(field_line(field.label(), &field_display(field), focused, &app.theme, load_rect)),
            load_rect,
        );
        app.registry.insert(
            WidgetEntry::new("load-settings")
                .with_rect(load_rect)
                .with_value(field.value())
                .interactive(),
        );
    }
}

fn render_session(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(view_title("Saved", '3', None))
        .border_style(
            app.theme.panel_border_style(app.focused_section() == Some(Section::Session)),
        );
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let focused_id = app.focused_id();
    let mut lines = Vec::<Line<'static>>::new();
    for field in app.form.section_fields(Section::Session) {
        let focused = focused_id.as_ref() == Some(field.id());
        lines.push(field_line(field.label(), &field_display(field), focused, &app.theme, inner));
    }
    let header_len = lines.len();

    for saved in app.session.saved_plots() {
        let marker = match saved.result_url() {
            Some(_) => "▣",
            None => "▢",
        };
        lines.push(Line::from(format!("{marker} {}", saved.name())));
        lines.push(Line::from("   [l]oad  [d]elete".to_owned()));
    }
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);

    let session_fields: Vec<SmolStr> =
        app.form.section_fields(Section::Session).map(|f| f.id().clone()).collect();
    for (idx, id) in session_fields.iter().enumerate() {
        let Some(rect) = visible_line_rect(inner, idx, 0) else {
            continue;
        };
        let field = app.form.field(id).expect("form field ids are stable within a draw");
        let mut entry = WidgetEntry::new(id.clone()).with_rect(rect).interactive();
        if !field.is_button() {
            entry = entry.with_value(field.value());
        }
        app.registry.insert(entry);
    }

    for (plot_idx, _) in app.session.saved_plots().iter().enumerate() {
        let name_line = header_len + plot_idx * 2;
        if let Some(rect) = visible_line_rect(inner, name_line, 0) {
            if plot_idx == 0 {
                app.registry.insert(WidgetEntry::new("saved-plot-image").with_rect(rect));
            }
        }
        if let Some(rect) = visible_line_rect(inner, name_line + 1, 0) {
            let half = rect.width / 2;
            app.registry.insert(
                WidgetEntry::new(format!("saved-load-{plot_idx}"))
                    .with_rect(Rect { width: half.max(1), ..rect })
                    .with_group("saved-actions")
                    .interactive(),
            );
            app.registry.insert(
                WidgetEntry::new(format!("saved-delete-{plot_idx}"))
                    .with_rect(Rect { x: rect.x + half, width: rect.width - half, ..rect })
                    .with_group("saved-actions")
                    .interactive(),
            );
        }
    }
}

fn render_tutorial_overlay(frame: &mut Frame<'_>, app: &mut App, nav_area: Rect, main_area: Rect) {
    let Some(run) = app.tutorial.as_ref() else {
        return;
    };

    if !run.store.is_ready() {
        if let Some(message) = run.store.load_error() {
            app.set_toast(format!("Tour unavailable: {message}"));
            app.tutorial = None;
        }
        return;
    }

    let Some(active) = run.controller.active_frame(&run.store) else {
        return;
    };
    let total = run.store.len().unwrap_or(0);

    let mask_area = Rect {
        x: nav_area.x,
        y: nav_area.y,
        width: nav_area.width,
        height: nav_area.height + main_area.height,
    };
    let holes: Vec<Rect> = run.targets.iter().filter_map(|target| target.rect).collect();
    let mask = paint_mask(mask_area, nav_area, &holes, HOLE_PADDING);
    frame.render_widget(
        MaskOverlay {
            mask: &mask,
            dim: app.theme.overlay_dim_style(),
            nav: app.theme.overlay_nav_style(),
        },
        mask_area,
    );

    let mut panel = text_panel_rect(active.text_position(), main_area);
    if let Some(nudge) = run.controller.nudge() {
        panel = shift_rect_x(panel, nudge.dx(), main_area);
    }
    frame.render_widget(Clear, panel);

    let mut lines = vec![Line::from(vec![
        Span::styled(
            active.headline().to_owned(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            frame_counter_label(active.index(), total),
            Style::default().fg(FOOTER_LABEL_COLOR),
        ),
    ])];
    if !active.explanation().is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::from(active.explanation().to_owned()));
    }
    if !active.task().is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("➤ {}", active.task()),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }

    let para = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .style(app.theme.tutorial_panel_style())
        .block(Block::default().borders(Borders::ALL).title(view_title("Tour", 't', None)));
    frame.render_widget(para, panel);
}

fn render_intro(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let panel = text_panel_rect(TextPosition { x: 50, y: 50 }, area);
    frame.render_widget(Clear, panel);
    let text = Text::from(vec![
        Line::from(Span::styled(
            "First visit?".to_owned(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from("A short guided tour walks you through creating your first diagram."),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Enter".to_owned(), Style::default().fg(FOOTER_KEY_COLOR)),
            Span::raw(" start the tour    "),
            Span::styled("Esc".to_owned(), Style::default().fg(FOOTER_KEY_COLOR)),
            Span::raw(" not now"),
        ]),
    ]);
    let para = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .style(app.theme.tutorial_panel_style())
        .block(Block::default().borders(Borders::ALL).title(view_title("Welcome", '?', None)));
    frame.render_widget(para, panel);
}

fn field_line(
    label: &str,
    value: &str,
    focused: bool,
    theme: &TuiTheme,
    viewport: Rect,
) -> Line<'static> {
    let text = format!(
        "{label:<FIELD_LABEL_WIDTH$}{}",
        truncate_cell_text(value, viewport.width.saturating_sub(FIELD_LABEL_WIDTH as u16) as usize)
    );
    if focused {
        Line::from(Span::styled(text, theme.selection_style()))
    } else {
        Line::from(Span::styled(text, theme.base_style()))
    }
}

fn field_display(field: &crate::form::FormField) -> String {
    match field.kind() {
        FieldKind::Select { .. } => format!("‹ {} ›", field.value()),
        FieldKind::Input => format!("[{}]", field.value()),
        FieldKind::Button => format!("[ {} ]", field.label()),
    }
}

fn downloads_line(result: &PlotResult) -> Line<'static> {
    let mut spans = vec![Span::raw("Downloads: ".to_owned())];
    for (label, url) in
        [("PNG", result.png.as_ref()), ("PDF", result.pdf.as_ref()), ("SVG", result.svg.as_ref())]
    {
        let style = if url.is_some() {
            Style::default().fg(FOOTER_KEY_COLOR)
        } else {
            Style::default().fg(FOOTER_LABEL_COLOR)
        };
        spans.push(Span::styled(format!("[{label}] "), style));
    }
    Line::from(spans)
}

fn visible_line_rect(inner: Rect, line_idx: usize, scroll: u16) -> Option<Rect> {
    let idx = line_idx as u16;
    if idx < scroll {
        return None;
    }
    let y = inner.y + (idx - scroll);
    if y >= inner.y + inner.height {
        return None;
    }
    Some(Rect { x: inner.x, y, width: inner.width, height: 1 })
}

// Extracted layout/footer/panel-geometry helpers.
include!("chrome.rs");

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    expires_at: Instant,
}

#[derive(Debug, Clone)]
struct DatasetSearch {
    row: usize,
    query: String,
}

/// One running tour: frames, state machine, and the current target snapshot.
struct TutorialRun {
    store: FrameStore,
    controller: StepController,
    targets: Vec<WidgetEntry>,
    ticket: Option<ResolveTicket>,
    policy: RetryPolicy,
}

struct MaskOverlay<'a> {
    mask: &'a OverlayMask,
    dim: Style,
    nav: Style,
}

impl Widget for MaskOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(self.mask.area());
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                match self.mask.shade_at(x, y) {
                    Some(Shade::Dim) => {
                        buf.get_mut(x, y).set_style(self.dim);
                    }
                    Some(Shade::Nav) => {
                        buf.get_mut(x, y).set_style(self.nav);
                    }
                    _ => {}
                }
            }
        }
    }
}

struct App {
    session: PlotSession,
    session_folder: SessionFolder,
    form: PlotForm,
    datasets: Vec<DatasetInfo>,
    registry: WidgetRegistry,
    focus: usize,
    scroll: UiState,
    theme: TuiTheme,
    toast: Option<Toast>,
    intro_visible: bool,
    tutorial: Option<TutorialRun>,
    frame_store: FrameStore,
    plot_result: Option<PlotResult>,
    plot_pending: bool,
    search: Option<DatasetSearch>,
    requests: UnboundedSender<ClientRequest>,
    responses: Receiver<ClientResponse>,
    form_viewport: Rect,
    should_quit: bool,
}

impl App {
    fn new(
        session: PlotSession,
        session_folder: SessionFolder,
        frame_store: FrameStore,
        datasets: Vec<DatasetInfo>,
        requests: UnboundedSender<ClientRequest>,
        responses: Receiver<ClientResponse>,
    ) -> Self {
        let form = PlotForm::from_session(&session, &datasets);
        let (theme, theme_toast) = match TuiTheme::from_env() {
            Ok(theme) => (theme, None),
            Err(err) => (TuiTheme::default(), Some(err.to_string())),
        };
        let intro_visible = !session_folder.visited();

        let mut app = Self {
            session,
            session_folder,
            form,
            datasets,
            registry: WidgetRegistry::new(),
            focus: 0,
            scroll: UiState::default(),
            theme,
            toast: None,
            intro_visible,
            tutorial: None,
            frame_store,
            plot_result: None,
            plot_pending: false,
            search: None,
            requests,
            responses,
            form_viewport: Rect::default(),
            should_quit: false,
        };
        if let Some(message) = theme_toast {
            app.set_toast(message);
        }
        app
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast =
            Some(Toast { message: message.into(), expires_at: Instant::now() + TOAST_TTL });
    }

    fn tutorial_active(&self) -> bool {
        self.tutorial.is_some()
    }

    fn focus_order(&self) -> Vec<SmolStr> {
        self.form.fields().iter().map(|field| field.id().clone()).collect()
    }

    fn focused_id(&self) -> Option<SmolStr> {
        self.focus_order().get(self.focus).cloned()
    }

    fn focused_section(&self) -> Option<Section> {
        let id = self.focused_id()?;
        self.form.field(&id).map(|field| field.section())
    }

    fn focused_is_input(&self) -> bool {
        self.focused_id()
            .and_then(|id| self.form.field(&id).map(|field| field.is_input()))
            .unwrap_or(false)
    }

    fn move_focus(&mut self, forward: bool) {
        let len = self.focus_order().len();
        if len == 0 {
            return;
        }
        self.focus = if forward {
            (self.focus + 1) % len
        } else {
            (self.focus + len - 1) % len
        };
    }

    fn persist_session(&mut self) {
        self.form.apply_to_session(&mut self.session);
        if let Err(err) = self.session_folder.save_session(&self.session) {
            self.set_toast(format!("Session save failed: {err}"));
        }
    }

    fn start_tutorial(&mut self) {
        self.intro_visible = false;
        let controller = StepController::new();
        let ticket = ResolveTicket::new(controller.epoch());
        self.tutorial = Some(TutorialRun {
            store: self.frame_store.clone(),
            controller,
            targets: Vec::new(),
            ticket: Some(ticket),
            policy: RetryPolicy::from_env(),
        });
    }

    fn mark_visited(&mut self) {
        if let Err(err) = self.session_folder.set_visited() {
            self.set_toast(format!("Could not remember tour state: {err}"));
        }
    }

    fn apply_tutorial_action(&mut self, action: StepAction) {
        let Some(run) = self.tutorial.as_mut() else {
            return;
        };
        match run.controller.apply(action, &run.store, &run.targets) {
            StepOutcome::Moved { .. } => {
                run.targets.clear();
                run.ticket = Some(ResolveTicket::new(run.controller.epoch()));
            }
            StepOutcome::Closed => {
                self.tutorial = None;
                self.mark_visited();
                self.set_toast("Tour finished — press t to run it again");
            }
            StepOutcome::Deferred => self.set_toast("Tour steps are still loading"),
            StepOutcome::Nudged | StepOutcome::Unchanged => {}
        }
    }

    fn tutorial_locks_input(&self) -> bool {
        let Some(run) = self.tutorial.as_ref() else {
            return false;
        };
        run.controller
            .active_frame(&run.store)
            .map(|frame| frame.locked())
            .unwrap_or(false)
    }

    /// A click on the tracked widget latches the completion; for click-gated
    /// frames it also advances on the spot, sparing the extra arrow press.
    fn notify_tutorial_click(&mut self, widget_id: &str) {
        let advance = {
            let Some(run) = self.tutorial.as_mut() else {
                return;
            };
            if !run.targets.iter().any(|target| target.id == widget_id) {
                return;
            }
            run.controller.notify_target_clicked();
            run.controller
                .active_frame(&run.store)
                .map(|frame| *frame.completion() == CompletionMode::Click)
                .unwrap_or(false)
        };
        if advance {
            self.apply_tutorial_action(StepAction::Advance);
        }
    }

    /// Registers every form-section field for the current draw pass. Fields
    /// scrolled out of the pane keep their entry (value checks must still see
    /// them) but carry no geometry, only their content line.
    fn register_form_widgets(&mut self, inner: Rect, scroll: u16) {
        self.form_viewport = inner;
        let field_ids: Vec<SmolStr> =
            self.form.section_fields(Section::Form).map(|f| f.id().clone()).collect();
        for (idx, id) in field_ids.iter().enumerate() {
            let field = self.form.field(id).expect("form field ids are stable within a draw");
            let mut entry = WidgetEntry::new(id.clone()).with_line(idx as u16).interactive();
            if let Some(rect) = visible_line_rect(inner, idx, scroll) {
                entry = entry.with_rect(rect);
            }
            if !field.is_button() {
                entry = entry.with_value(field.value());
            }
            self.registry.insert(entry);
        }
    }

    /// Re-resolves the active frame's targets against the freshly rebuilt
    /// registry and keeps the retry ticket honest for still-missing widgets.
    fn refresh_tutorial_targets(&mut self, now: Instant) {
        let Some(run) = self.tutorial.as_mut() else {
            return;
        };
        let Some(frame) = run.controller.active_frame(&run.store) else {
            return;
        };
        let Some(query) = frame.target() else {
            run.targets.clear();
            run.ticket = None;
            return;
        };

        let hits = resolve_targets(query, &self.registry);
        if !hits.is_empty() {
            // A target without geometry was scrolled out of its pane; its
            // content line says where the pane has to scroll to show it.
            if hits[0].rect.is_none() {
                if let (Some(line), true) = (hits[0].line, self.form_viewport.height > 0) {
                    self.scroll
                        .request_scroll_to_line(scroll_for_line(line, self.form_viewport.height));
                }
            }
            run.targets = hits;
            run.ticket = None;
            return;
        }

        run.targets.clear();
        match run.ticket.as_mut() {
            Some(ticket) if ticket.is_current(run.controller.epoch()) => {
                if ticket.due(now) && !ticket.exhausted(&run.policy) {
                    ticket.retry(&run.policy, now);
                }
            }
            _ => run.ticket = Some(ResolveTicket::new(run.controller.epoch())),
        }
    }

    fn tick(&mut self) {
        if let Some(run) = self.tutorial.as_mut() {
            run.controller.tick_nudge();
        }
    }

    fn drain_client_responses(&mut self) {
        while let Ok(response) = self.responses.try_recv() {
            match response {
                ClientResponse::Datasets(Ok(datasets)) => {
                    self.form.apply_to_session(&mut self.session);
                    // These two live outside the session; the rebuild would
                    // drop whatever the user typed into them.
                    let load_text =
                        self.form.field("load-settings").map(|f| f.value().to_owned());
                    let name_text =
                        self.form.field("session-name").map(|f| f.value().to_owned());
                    self.datasets = datasets;
                    self.form = PlotForm::from_session(&self.session, &self.datasets);
                    if let Some(value) = load_text {
                        self.form.set_value("load-settings", value);
                    }
                    if let Some(value) = name_text {
                        self.form.set_value("session-name", value);
                    }
                    self.focus = self.focus.min(self.focus_order().len().saturating_sub(1));
                    self.set_toast(format!("{} datasets available", self.datasets.len()));
                }
                ClientResponse::Datasets(Err(err)) => {
                    self.set_toast(format!("Dataset list failed: {err}"));
                }
                ClientResponse::Plot(Ok(result)) => {
                    self.plot_pending = false;
                    if !result.errors.is_empty() {
                        if let Some(first) = result.errors.messages().first() {
                            self.set_toast(first.clone());
                        }
                    }
                    self.plot_result = Some(result);
                }
                ClientResponse::Plot(Err(err)) => {
                    self.plot_pending = false;
                    self.set_toast(format!("Render failed: {err}"));
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.intro_visible {
            match key.code {
                KeyCode::Enter => self.start_tutorial(),
                KeyCode::Esc | KeyCode::Char('q') => {
                    self.intro_visible = false;
                    self.mark_visited();
                }
                _ => {}
            }
            return;
        }

        if self.search.is_some() {
            self.handle_search_key(key);
            return;
        }

        if self.tutorial.is_some() {
            self.handle_tutorial_key(key);
            return;
        }

        self.handle_form_key(key, false);
    }

    fn handle_tutorial_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left => self.apply_tutorial_action(StepAction::Retreat),
            KeyCode::Right => self.apply_tutorial_action(StepAction::Advance),
            KeyCode::Char('g') if !self.focused_is_input() => {
                self.apply_tutorial_action(StepAction::SkipAhead(1));
            }
            KeyCode::Esc => {
                self.apply_tutorial_action(StepAction::Close);
            }
            KeyCode::Char('c') if !self.focused_is_input() => {
                match self.session_folder.clear_visited() {
                    Ok(()) => self.set_toast("Tour marker cleared"),
                    Err(err) => self.set_toast(format!("Could not clear tour marker: {err}")),
                }
            }
            _ => {
                if self.tutorial_locks_input() {
                    return;
                }
                self.handle_form_key(key, true);
            }
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent, in_tutorial: bool) {
        let Some(focused_id) = self.focused_id() else {
            return;
        };

        match key.code {
            KeyCode::Tab => self.move_focus(true),
            KeyCode::BackTab => self.move_focus(false),
            KeyCode::Down if !in_tutorial => self.move_focus(true),
            KeyCode::Up if !in_tutorial => self.move_focus(false),
            // During the tour the horizontal arrows belong to tour navigation,
            // so selects cycle with the vertical arrows instead.
            KeyCode::Left | KeyCode::Right if !in_tutorial => {
                if let Some(field) = self.form.field_mut(&focused_id) {
                    field.cycle(key.code == KeyCode::Right);
                }
            }
            KeyCode::Up | KeyCode::Down if in_tutorial => {
                if let Some(field) = self.form.field_mut(&focused_id) {
                    field.cycle(key.code == KeyCode::Down);
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.form.field_mut(&focused_id) {
                    field.pop_char();
                }
            }
            KeyCode::Enter => {
                self.notify_tutorial_click(&focused_id);
                match focused_id.as_str() {
                    "submit" => self.submit_plot(),
                    "save-plot" => self.save_plot(),
                    "load-settings" => self.load_settings(),
                    _ => {
                        if let Some(field) = self.form.field_mut(&focused_id) {
                            field.cycle(true);
                        }
                    }
                }
            }
            KeyCode::Char('/') if !self.focused_is_input() => {
                let row = focused_id
                    .strip_prefix('s')
                    .and_then(|rest| rest.parse::<usize>().ok())
                    .unwrap_or(0);
                self.search = Some(DatasetSearch { row, query: String::new() });
            }
            KeyCode::Char('q') if !self.focused_is_input() => self.should_quit = true,
            KeyCode::Char('t') if !self.focused_is_input() && !in_tutorial => {
                self.start_tutorial();
            }
            KeyCode::Char('l') if focused_id == "save-plot" => self.load_saved_plot(),
            KeyCode::Char('d') if focused_id == "save-plot" => self.delete_saved_plot(),
            KeyCode::Char(ch) => {
                if let Some(field) = self.form.field_mut(&focused_id) {
                    field.push_char(ch);
                }
            }
            _ => {}
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let Some(search) = self.search.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.search = None,
            KeyCode::Backspace => {
                search.query.pop();
            }
            KeyCode::Enter => {
                let row = search.row;
                let best = rank_datasets(&search.query, &self.datasets).into_iter().next();
                self.search = None;
                if let Some(id) = best {
                    let experiment = self
                        .datasets
                        .iter()
                        .find(|dataset| dataset.id() == id)
                        .map(|dataset| dataset.experiment().to_owned())
                        .unwrap_or_default();
                    self.form.set_value(&format!("s{row}"), id);
                    self.form.set_value(&format!("experiment{row}"), experiment);
                }
            }
            KeyCode::Char(ch) => search.query.push(ch),
            _ => {}
        }
    }

    fn settings_string(&self) -> String {
        self.form
            .request_params()
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn submit_plot(&mut self) {
        self.persist_session();
        let params = self.form.request_params();
        self.plot_pending = true;
        if self.requests.send(ClientRequest::SubmitPlot { params }).is_err() {
            self.plot_pending = false;
            self.set_toast("Render worker is gone");
        }
    }

    fn save_plot(&mut self) {
        let name = self
            .form
            .field("session-name")
            .map(|field| field.value().trim().to_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "session".to_owned());
        let mut saved = SavedPlot::new(name.clone(), self.form.request_params());
        saved.set_result_url(self.plot_result.as_ref().and_then(|r| r.png.clone()));
        self.session.saved_plots_mut().push(saved);
        self.session.bump_rev();
        self.persist_session();
        self.set_toast(format!("Saved plot under '{name}'"));
    }

    /// Applies a pasted `k=v&k=v` settings string back onto the form.
    fn load_settings(&mut self) {
        let Some(raw) = self.form.field("load-settings").map(|f| f.value().to_owned()) else {
            return;
        };
        if raw.trim().is_empty() {
            return;
        }
        let mut applied = 0usize;
        for pair in raw.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            if key == "a" {
                continue;
            }
            if self.form.set_value(key.trim(), value.trim()) {
                applied += 1;
            }
        }
        self.form.set_value("load-settings", "");
        self.set_toast(format!("Applied {applied} settings"));
    }

    fn load_saved_plot(&mut self) {
        let Some(saved) = self.session.saved_plots().last().cloned() else {
            self.set_toast("No saved plots yet");
            return;
        };
        for (key, value) in saved.params() {
            if key == "a" {
                continue;
            }
            self.form.set_value(key, value.clone());
        }
        self.set_toast(format!("Loaded '{}'", saved.name()));
    }

    fn delete_saved_plot(&mut self) {
        if self.session.saved_plots_mut().pop().is_some() {
            self.session.bump_rev();
            self.persist_session();
            self.set_toast("Removed last saved plot");
        } else {
            self.set_toast("No saved plots yet");
        }
    }
}

fn rank_datasets(query: &str, datasets: &[DatasetInfo]) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() {
        return datasets.iter().map(|dataset| dataset.id().to_owned()).collect();
    }

    let mut scored: Vec<(f64, String)> = datasets
        .iter()
        .map(|dataset| {
            let haystack = format!("{} {}", dataset.id(), dataset.title());
            let score = rapidfuzz::fuzz::ratio(query.chars(), haystack.chars());
            (score, dataset.id().to_owned())
        })
        .filter(|(score, _)| *score > 0.0)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, id)| id).collect()
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);
}
