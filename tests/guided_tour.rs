// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Drives the built-in tour end to end through the frame store, step
//! controller, target resolution, and form layers, without a terminal.

use rstest::{fixture, rstest};

use triton::form::{PlotForm, WidgetEntry, WidgetRegistry};
use triton::model::PlotSession;
use triton::store::SessionFolder;
use triton::tui::demo_datasets;
use triton::tutorial::{resolve_targets, FrameStore, StepAction, StepController, StepOutcome};

struct TourCtx {
    store: FrameStore,
    controller: StepController,
    form: PlotForm,
    registry: WidgetRegistry,
}

impl TourCtx {
    /// Mirrors what the draw loop does each frame: every form field becomes a
    /// registered widget carrying its current value.
    fn sync_registry(&mut self) {
        for field in self.form.fields() {
            let mut entry = WidgetEntry::new(field.id().clone()).interactive();
            if !field.is_button() {
                entry = entry.with_value(field.value().to_owned());
            }
            for group in field.groups() {
                entry = entry.with_group(group.clone());
            }
            self.registry.insert(entry);
        }
    }

    fn active_targets(&self) -> Vec<WidgetEntry> {
        let Some(frame) = self.controller.active_frame(&self.store) else {
            return Vec::new();
        };
        match frame.target() {
            Some(query) => resolve_targets(query, &self.registry),
            None => Vec::new(),
        }
    }

    fn advance(&mut self) -> StepOutcome {
        let targets = self.active_targets();
        self.controller.apply(StepAction::Advance, &self.store, &targets)
    }

    fn set_field(&mut self, id: &str, value: &str) {
        assert!(self.form.set_value(id, value), "field {id} exists");
        self.sync_registry();
    }
}

#[fixture]
fn tour() -> TourCtx {
    let session = PlotSession::default();
    let form = PlotForm::from_session(&session, &demo_datasets());
    let mut ctx = TourCtx {
        store: FrameStore::builtin(),
        controller: StepController::new(),
        form,
        registry: WidgetRegistry::new(),
    };
    ctx.sync_registry();
    ctx
}

#[rstest]
fn builtin_tour_completes_the_polarstern_scenario(mut tour: TourCtx) {
    assert_eq!(tour.controller.active_index(), Some(0));

    // Welcome and detail-level frames advance freely.
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 1 });
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 2 });

    // The experiment frame refuses to advance until the value matches.
    assert_eq!(tour.advance(), StepOutcome::Nudged);
    assert!(tour.controller.nudge().is_some());
    tour.set_field("experiment0", "Polarstern");
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 3 });
    assert!(tour.controller.nudge().is_none());

    tour.set_field("s0", "Polarstern/2017-2018_PS-nm-mt.h5:/raw/PS_mu_nm_data");
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 4 });

    tour.set_field("m0", "xy");
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 5 });
    tour.set_field("x0", "time");
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 6 });
    tour.set_field("y0", "mu_rate");
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 7 });

    // Any non-empty binning satisfies the frame.
    assert_eq!(tour.advance(), StepOutcome::Nudged);
    tour.set_field("t", "3600");
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 8 });

    // Legend frame has no completion rule.
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 9 });

    // Submit requires an activation, not a value.
    assert_eq!(tour.advance(), StepOutcome::Nudged);
    tour.controller.notify_target_clicked();
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 10 });
    // The latch does not carry over into the new frame.
    assert!(!tour.controller.click_latched());

    // A submitted plot makes the result widgets appear.
    tour.registry.insert(WidgetEntry::new("plot-image"));
    tour.registry.insert(WidgetEntry::new("download-buttons"));
    tour.registry.insert(WidgetEntry::new("plot-settings"));
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 11 });
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 12 });

    // The settings frame targets two widgets at once.
    assert_eq!(tour.active_targets().len(), 2);
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 13 });
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 14 });

    tour.controller.notify_target_clicked();
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 15 });

    // Saving produced a saved-plot row; its action buttons share a group.
    tour.registry.insert(WidgetEntry::new("saved-plot-image"));
    tour.registry
        .insert(WidgetEntry::new("saved-load-0").with_group("saved-actions").interactive());
    tour.registry
        .insert(WidgetEntry::new("saved-delete-0").with_group("saved-actions").interactive());

    let frame = tour.controller.active_frame(&tour.store).expect("frame 15");
    assert!(frame.locked());
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 16 });

    let frame = tour.controller.active_frame(&tour.store).expect("frame 16");
    assert!(frame.locked());
    assert_eq!(tour.active_targets().len(), 2);
    assert_eq!(tour.advance(), StepOutcome::Moved { index: 17 });

    // Advancing past the last frame closes the tour.
    assert_eq!(tour.advance(), StepOutcome::Closed);
    assert!(tour.controller.is_closed());
    assert_eq!(tour.advance(), StepOutcome::Unchanged);

    // A restart begins over from the welcome frame.
    let outcome = tour.controller.apply(StepAction::Restart, &tour.store, &[]);
    assert_eq!(outcome, StepOutcome::Moved { index: 0 });
}

#[rstest]
fn retreat_is_never_gated(mut tour: TourCtx) {
    tour.advance();
    tour.advance();
    assert_eq!(tour.controller.active_index(), Some(2));

    // Going back ignores the completion rule of the current frame.
    let outcome = tour.controller.apply(StepAction::Retreat, &tour.store, &[]);
    assert_eq!(outcome, StepOutcome::Moved { index: 1 });

    tour.controller.apply(StepAction::Retreat, &tour.store, &[]);
    assert_eq!(
        tour.controller.apply(StepAction::Retreat, &tour.store, &[]),
        StepOutcome::Unchanged
    );
}

#[rstest]
fn skip_jumps_over_unmet_completions(mut tour: TourCtx) {
    // Frame 2 would nudge, but a skip bypasses the gate entirely.
    tour.advance();
    tour.advance();
    let outcome = tour.controller.apply(StepAction::SkipAhead(1), &tour.store, &[]);
    assert_eq!(outcome, StepOutcome::Moved { index: 3 });

    // A skip clamps to the last frame instead of closing.
    let outcome = tour.controller.apply(StepAction::SkipAhead(99), &tour.store, &[]);
    assert_eq!(outcome, StepOutcome::Moved { index: 17 });
    assert_eq!(
        tour.controller.apply(StepAction::SkipAhead(1), &tour.store, &[]),
        StepOutcome::Unchanged
    );
}

#[test]
fn document_tour_merges_defaults_and_resolves_groups() {
    let raw = r#"{
        "default": { "textPosition": { "x": 20, "y": 30 }, "locked": true },
        "frames": [
            { "headline": "Intro", "textPosition": { "x": 50, "y": 50 }, "locked": false },
            { "headline": "Pick", "target": "m0", "completion": { "valueEquals": "xy" } },
            { "headline": "Look", "target": ".saved-actions" }
        ]
    }"#;

    let store = FrameStore::from_document_str(raw).expect("document parses");
    assert!(store.is_ready());
    assert_eq!(store.len().expect("len"), 3);

    let intro = store.frame(0).expect("frame 0");
    assert!(!intro.locked());
    assert_eq!(intro.text_position().x, 50);

    let pick = store.frame(1).expect("frame 1");
    assert!(pick.locked());
    assert_eq!(pick.text_position().x, 20);

    let mut registry = WidgetRegistry::new();
    registry.insert(WidgetEntry::new("m0").with_value("xy").interactive());
    registry.insert(WidgetEntry::new("saved-load-0").with_group("saved-actions"));
    registry.insert(WidgetEntry::new("saved-delete-0").with_group("saved-actions"));

    let mut controller = StepController::new();
    let targets = {
        let frame = controller.active_frame(&store).expect("frame");
        frame
            .target()
            .map(|query| resolve_targets(query, &registry))
            .unwrap_or_default()
    };
    assert_eq!(controller.apply(StepAction::Advance, &store, &targets), StepOutcome::Moved {
        index: 1
    });

    let query = store.frame(2).expect("frame 2").target().cloned().expect("group target");
    assert_eq!(resolve_targets(&query, &registry).len(), 2);
}

#[test]
fn visited_marker_survives_a_session_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let folder = SessionFolder::new(dir.path());
    assert!(!folder.visited());

    let mut session = folder.load_or_init_session().expect("load");
    session.plots_mut()[0].set_x_expr("time");
    folder.save_session(&session).expect("save");
    folder.set_visited().expect("set visited");

    // A fresh handle on the same folder sees both.
    let reopened = SessionFolder::new(dir.path());
    assert!(reopened.visited());
    let loaded = reopened.load_or_init_session().expect("reload");
    assert_eq!(loaded.plots()[0].x_expr(), "time");

    reopened.clear_visited().expect("clear");
    assert!(!folder.visited());
}
