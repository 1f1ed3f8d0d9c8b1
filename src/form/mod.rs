// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The dynamic plot form and the widget registry.
//!
//! [`PlotForm`] owns every interactive field while the TUI is running and is
//! the single place tutorial completion reads values from. The
//! [`WidgetRegistry`] is rebuilt on every draw pass with the geometry of that
//! pass, so tutorial target resolution always sees current rectangles.

use ratatui::layout::Rect;
use smol_str::SmolStr;

use crate::model::{DatasetInfo, DetailLevel, PlotMode, PlotSession};

pub const LEGEND_POSITIONS: [&str; 6] =
    ["best", "upper right", "upper left", "lower right", "lower left", "hide"];

/// Where a field is rendered; the chrome lays sections out separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Form,
    Output,
    Session,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Select { options: Vec<String> },
    Input,
    Button,
}

/// One interactive widget of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    id: SmolStr,
    label: String,
    kind: FieldKind,
    value: String,
    section: Section,
    groups: Vec<SmolStr>,
}

impl FormField {
    fn select(id: &str, label: &str, options: Vec<String>, section: Section) -> Self {
        Self {
            id: SmolStr::new(id),
            label: label.to_owned(),
            kind: FieldKind::Select { options },
            value: String::new(),
            section,
            groups: Vec::new(),
        }
    }

    fn input(id: &str, label: &str, section: Section) -> Self {
        Self {
            id: SmolStr::new(id),
            label: label.to_owned(),
            kind: FieldKind::Input,
            value: String::new(),
            section,
            groups: Vec::new(),
        }
    }

    fn button(id: &str, label: &str, section: Section) -> Self {
        Self {
            id: SmolStr::new(id),
            label: label.to_owned(),
            kind: FieldKind::Button,
            value: String::new(),
            section,
            groups: Vec::new(),
        }
    }

    pub fn id(&self) -> &SmolStr {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn groups(&self) -> &[SmolStr] {
        &self.groups
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn is_button(&self) -> bool {
        matches!(self.kind, FieldKind::Button)
    }

    pub fn is_input(&self) -> bool {
        matches!(self.kind, FieldKind::Input)
    }

    /// Steps a select to the next/previous option, wrapping at the ends.
    /// A value not present in the options snaps to the first option.
    pub fn cycle(&mut self, forward: bool) {
        let FieldKind::Select { options } = &self.kind else {
            return;
        };
        if options.is_empty() {
            return;
        }

        let current = options.iter().position(|opt| *opt == self.value);
        let next = match (current, forward) {
            (Some(idx), true) => (idx + 1) % options.len(),
            (Some(idx), false) => (idx + options.len() - 1) % options.len(),
            (None, _) => 0,
        };
        self.value = options[next].clone();
    }

    pub fn push_char(&mut self, ch: char) {
        if self.is_input() {
            self.value.push(ch);
        }
    }

    pub fn pop_char(&mut self) {
        if self.is_input() {
            self.value.pop();
        }
    }
}

/// Every interactive field of the UI, in render order per section.
#[derive(Debug, Clone)]
pub struct PlotForm {
    fields: Vec<FormField>,
    plot_rows: usize,
}

impl PlotForm {
    pub fn from_session(session: &PlotSession, datasets: &[DatasetInfo]) -> Self {
        let mut fields = Vec::new();

        fields.push(FormField::select(
            "detaillevel",
            "Detail level",
            DetailLevel::ALL.iter().map(|l| l.as_param().to_owned()).collect(),
            Section::Form,
        ));

        let plot_rows = session.plots().len().max(1);
        for (row, plot) in session.plots().iter().enumerate() {
            let mut experiment = FormField::select(
                &format!("experiment{row}"),
                "Experiment",
                experiment_options(datasets),
                Section::Form,
            );
            experiment.set_value(plot.experiment());
            fields.push(experiment);

            let mut dataset = FormField::select(
                &format!("s{row}"),
                "Dataset",
                dataset_options(datasets),
                Section::Form,
            );
            dataset.set_value(plot.dataset());
            fields.push(dataset);

            let mut mode = FormField::select(
                &format!("m{row}"),
                "Diagram type",
                PlotMode::ALL.iter().map(|m| m.as_param().to_owned()).collect(),
                Section::Form,
            );
            mode.set_value(plot.mode().as_param());
            fields.push(mode);

            let mut x_expr = FormField::input(&format!("x{row}"), "X expression", Section::Form);
            x_expr.set_value(plot.x_expr());
            fields.push(x_expr);

            let mut y_expr = FormField::input(&format!("y{row}"), "Y expression", Section::Form);
            y_expr.set_value(plot.y_expr());
            fields.push(y_expr);
        }

        let mut time_binning = FormField::input("t", "Time binning [s]", Section::Form);
        time_binning.set_value(session.time_binning());
        fields.push(time_binning);

        let mut legend = FormField::select(
            "l",
            "Legend",
            LEGEND_POSITIONS.iter().map(|l| (*l).to_owned()).collect(),
            Section::Form,
        );
        legend.set_value(session.legend_position());
        fields.push(legend);

        fields.push(FormField::button("submit", "Create diagram", Section::Form));

        fields.push(FormField::input("load-settings", "Load settings", Section::Output));

        fields.push(FormField::input("session-name", "Session", Section::Session));
        fields.push(FormField::button("save-plot", "Save plot", Section::Session));

        let mut form = Self { fields, plot_rows };
        if form.field("detaillevel").map(|f| f.value().is_empty()).unwrap_or(false) {
            form.set_value("detaillevel", session.detail_level().as_param());
        }
        form
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn plot_rows(&self) -> usize {
        self.plot_rows
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id() == id)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.id() == id)
    }

    pub fn set_value(&mut self, id: &str, value: impl Into<String>) -> bool {
        match self.field_mut(id) {
            Some(field) => {
                field.set_value(value);
                true
            }
            None => false,
        }
    }

    /// Fields rendered in the left form panel, in order.
    pub fn section_fields(&self, section: Section) -> impl Iterator<Item = &FormField> {
        self.fields.iter().filter(move |f| f.section() == section)
    }

    /// Writes the current field values back into the typed session.
    pub fn apply_to_session(&self, session: &mut PlotSession) {
        if let Some(field) = self.field("detaillevel") {
            let level = if field.value() == "advanced" {
                DetailLevel::Advanced
            } else {
                DetailLevel::Basic
            };
            session.set_detail_level(level);
        }

        session.plots_mut().resize_with(self.plot_rows, Default::default);
        for row in 0..self.plot_rows {
            let experiment = self.value_of(&format!("experiment{row}"));
            let dataset = self.value_of(&format!("s{row}"));
            let mode = self
                .value_of(&format!("m{row}"))
                .parse::<PlotMode>()
                .unwrap_or_default();
            let x_expr = self.value_of(&format!("x{row}"));
            let y_expr = self.value_of(&format!("y{row}"));

            let plot = &mut session.plots_mut()[row];
            plot.set_experiment(experiment);
            plot.set_dataset(dataset);
            plot.set_mode(mode);
            plot.set_x_expr(x_expr);
            plot.set_y_expr(y_expr);
        }

        session.set_time_binning(self.value_of("t"));
        session.set_legend_position(self.value_of("l"));
    }

    fn value_of(&self, id: &str) -> String {
        self.field(id).map(|f| f.value().to_owned()).unwrap_or_default()
    }

    /// The request as ordered query parameters, `a=plot` first.
    pub fn request_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("a".to_owned(), "plot".to_owned())];
        params.push(("detaillevel".to_owned(), self.value_of("detaillevel")));
        for row in 0..self.plot_rows {
            for key in ["experiment", "s", "m", "x", "y"] {
                let id = format!("{key}{row}");
                params.push((id.clone(), self.value_of(&id)));
            }
        }
        params.push(("t".to_owned(), self.value_of("t")));
        params.push(("l".to_owned(), self.value_of("l")));
        params
    }
}

fn experiment_options(datasets: &[DatasetInfo]) -> Vec<String> {
    let mut options = vec![String::new()];
    for dataset in datasets {
        let experiment = dataset.experiment().to_owned();
        if !options.contains(&experiment) {
            options.push(experiment);
        }
    }
    options
}

fn dataset_options(datasets: &[DatasetInfo]) -> Vec<String> {
    let mut options = vec![String::new()];
    options.extend(datasets.iter().map(|d| d.id().to_owned()));
    options
}

/// One widget as seen by tutorial target resolution: identity, geometry of the
/// latest draw pass, and the current value if the widget carries one.
///
/// `rect` is only present for widgets that were actually painted; a widget
/// scrolled out of its pane keeps its entry (so value checks still work) but
/// carries no geometry. `line` is the widget's content line inside a
/// scrollable pane, present whether or not the line is currently visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetEntry {
    pub id: SmolStr,
    pub rect: Option<Rect>,
    pub line: Option<u16>,
    pub value: Option<String>,
    pub groups: Vec<SmolStr>,
    pub interactive: bool,
}

impl WidgetEntry {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self {
            id: id.into(),
            rect: None,
            line: None,
            value: None,
            groups: Vec::new(),
            interactive: false,
        }
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    pub fn with_line(mut self, line: u16) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<SmolStr>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }
}

/// Widget geometry of the most recent draw pass.
#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    entries: Vec<WidgetEntry>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn insert(&mut self, entry: WidgetEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.id == entry.id) {
            *existing = entry;
            return;
        }
        self.entries.push(entry);
    }

    pub fn get(&self, id: &str) -> Option<&WidgetEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[WidgetEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::{PlotForm, Section, WidgetEntry, WidgetRegistry};
    use crate::model::fixtures::{demo_datasets, demo_session};
    use crate::model::{PlotMode, PlotSession};

    #[test]
    fn form_exposes_original_field_names() {
        let form = PlotForm::from_session(&PlotSession::new(), &demo_datasets());
        for id in ["detaillevel", "experiment0", "s0", "m0", "x0", "y0", "t", "l", "submit"] {
            assert!(form.field(id).is_some(), "missing field {id}");
        }
        assert_eq!(form.plot_rows(), 1);
    }

    #[test]
    fn select_cycles_and_wraps() {
        let mut form = PlotForm::from_session(&PlotSession::new(), &demo_datasets());
        let mode = form.field_mut("m0").expect("mode field");
        assert_eq!(mode.value(), "h1");
        mode.cycle(true);
        assert_eq!(mode.value(), "xy");
        mode.cycle(false);
        mode.cycle(false);
        assert_eq!(mode.value(), "map");
    }

    #[test]
    fn session_round_trip_through_form() {
        let session = demo_session();
        let form = PlotForm::from_session(&session, &demo_datasets());
        assert_eq!(form.field("experiment0").expect("field").value(), "Polarstern");
        assert_eq!(form.field("m0").expect("field").value(), "xy");

        let mut restored = PlotSession::new();
        form.apply_to_session(&mut restored);
        assert_eq!(restored.plots()[0].mode(), PlotMode::Xy);
        assert_eq!(restored.plots()[0].y_expr(), "mu_rate");
        assert_eq!(restored.legend_position(), "best");
    }

    #[test]
    fn request_params_start_with_plot_action() {
        let form = PlotForm::from_session(&demo_session(), &demo_datasets());
        let params = form.request_params();
        assert_eq!(params[0], ("a".to_owned(), "plot".to_owned()));
        assert!(params.iter().any(|(k, v)| k == "x0" && v == "time"));
        assert!(params.iter().any(|(k, v)| k == "m0" && v == "xy"));
    }

    #[test]
    fn output_and_session_sections_are_separate() {
        let form = PlotForm::from_session(&PlotSession::new(), &demo_datasets());
        let output: Vec<_> = form.section_fields(Section::Output).collect();
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].id(), "load-settings");
        let session: Vec<_> = form.section_fields(Section::Session).collect();
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn registry_replaces_entries_by_id() {
        let mut registry = WidgetRegistry::new();
        registry.insert(WidgetEntry::new("x0").with_value("a"));
        registry.insert(WidgetEntry::new("x0").with_value("b"));
        assert_eq!(registry.entries().len(), 1);
        assert_eq!(registry.get("x0").expect("entry").value.as_deref(), Some("b"));
    }
}
