// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Frame storage for the guided tutorial.
//!
//! Two interchangeable backends sit behind [`FrameStore`]: the built-in tour
//! embedded in the binary, and a JSON document loaded from disk on a background
//! thread. Consumers never block on the document backend; a read before the
//! loader finished yields [`FrameStoreError::NotReady`] and the caller retries
//! on a later tick.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::model::{CompletionMode, Frame, TargetQuery, TargetQueryError, TextPosition};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStoreError {
    /// The backend has not produced frames yet; recoverable by retrying later.
    NotReady,
    OutOfRange { index: usize, len: usize },
    InvalidTarget { index: usize, reason: TargetQueryError },
    Document(String),
}

impl fmt::Display for FrameStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => f.write_str("frame data not loaded yet"),
            Self::OutOfRange { index, len } => {
                write!(f, "frame index {index} out of range (len={len})")
            }
            Self::InvalidTarget { index, reason } => {
                write!(f, "frame {index} has an invalid target query: {reason}")
            }
            Self::Document(msg) => write!(f, "frames document error: {msg}"),
        }
    }
}

impl std::error::Error for FrameStoreError {}

/// Store-wide fallback values applied to every frame that leaves a field unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameDefaults {
    pub text_position: TextPosition,
    pub target: Option<String>,
    pub completion: CompletionMode,
    pub locked: bool,
}

impl Default for FrameDefaults {
    fn default() -> Self {
        Self {
            text_position: TextPosition::default(),
            target: None,
            completion: CompletionMode::None,
            locked: false,
        }
    }
}

/// One frame as authored: every field optional, merged over [`FrameDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameRecord {
    pub headline: Option<String>,
    pub explanation: Option<String>,
    pub task: Option<String>,
    pub text_position: Option<TextPosition>,
    pub target: Option<String>,
    pub completion: Option<CompletionMode>,
    pub locked: Option<bool>,
}

/// On-disk shape of a frames document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FramesDocument {
    default: FrameDefaults,
    frames: Vec<FrameRecord>,
}

/// An ordered frame sequence with its defaults, shared by both backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTable {
    defaults: FrameDefaults,
    records: Vec<FrameRecord>,
}

impl FrameTable {
    /// Validates every target query up front so `frame()` cannot fail on
    /// malformed selectors later.
    pub fn new(
        defaults: FrameDefaults,
        records: Vec<FrameRecord>,
    ) -> Result<Self, FrameStoreError> {
        if records.is_empty() {
            return Err(FrameStoreError::Document("a tour needs at least one frame".to_owned()));
        }
        if let Some(raw) = defaults.target.as_deref() {
            raw.parse::<TargetQuery>()
                .map_err(|reason| FrameStoreError::InvalidTarget { index: 0, reason })?;
        }
        for (index, record) in records.iter().enumerate() {
            if let Some(raw) = record.target.as_deref() {
                raw.parse::<TargetQuery>()
                    .map_err(|reason| FrameStoreError::InvalidTarget { index, reason })?;
            }
        }
        Ok(Self { defaults, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Shallow merge: explicit record fields win, unset fields inherit defaults.
    pub fn frame(&self, index: usize) -> Result<Frame, FrameStoreError> {
        let record = self.records.get(index).ok_or(FrameStoreError::OutOfRange {
            index,
            len: self.records.len(),
        })?;

        let mut frame = Frame::new(index, record.headline.clone().unwrap_or_default());
        frame.set_explanation(record.explanation.clone().unwrap_or_default());
        frame.set_task(record.task.clone().unwrap_or_default());
        frame.set_text_position(record.text_position.unwrap_or(self.defaults.text_position));
        frame.set_completion(
            record.completion.clone().unwrap_or_else(|| self.defaults.completion.clone()),
        );
        frame.set_locked(record.locked.unwrap_or(self.defaults.locked));

        let target_raw = record.target.as_deref().or(self.defaults.target.as_deref());
        let target = match target_raw {
            Some(raw) => Some(
                raw.parse::<TargetQuery>()
                    .map_err(|reason| FrameStoreError::InvalidTarget { index, reason })?,
            ),
            None => None,
        };
        frame.set_target(target);

        Ok(frame)
    }
}

#[derive(Debug)]
enum DocumentState {
    Loading,
    Ready(FrameTable),
    Failed(String),
}

/// Frames parsed from a JSON document, loaded off the UI thread.
///
/// A failed load leaves the store permanently not-ready: the tutorial stays
/// dormant without affecting the host TUI.
#[derive(Debug, Clone)]
pub struct DocumentFrames {
    shared: Arc<Mutex<DocumentState>>,
}

impl DocumentFrames {
    fn spawn_load(path: PathBuf) -> Self {
        let shared = Arc::new(Mutex::new(DocumentState::Loading));

        let state = shared.clone();
        let spawned = std::thread::Builder::new()
            .name("triton-frames-load".to_owned())
            .spawn(move || {
                let outcome = match fs::read_to_string(&path) {
                    Ok(raw) => parse_document(&raw),
                    Err(err) => Err(FrameStoreError::Document(format!(
                        "read {}: {err}",
                        path.display()
                    ))),
                };
                let mut state = state.lock().expect("frames document lock poisoned");
                *state = match outcome {
                    Ok(table) => DocumentState::Ready(table),
                    Err(err) => DocumentState::Failed(err.to_string()),
                };
            });
        if let Err(err) = spawned {
            let mut state = shared.lock().expect("frames document lock poisoned");
            *state = DocumentState::Failed(format!("spawn loader: {err}"));
        }

        Self { shared }
    }

    fn ready(table: FrameTable) -> Self {
        Self { shared: Arc::new(Mutex::new(DocumentState::Ready(table))) }
    }

    fn with_state<T>(&self, f: impl FnOnce(&DocumentState) -> T) -> T {
        let state = self.shared.lock().expect("frames document lock poisoned");
        f(&state)
    }
}

fn parse_document(raw: &str) -> Result<FrameTable, FrameStoreError> {
    let document: FramesDocument =
        serde_json::from_str(raw).map_err(|err| FrameStoreError::Document(err.to_string()))?;
    FrameTable::new(document.default, document.frames)
}

/// Frame supply for the step controller, backend-agnostic.
#[derive(Debug, Clone)]
pub enum FrameStore {
    Builtin(FrameTable),
    Document(DocumentFrames),
}

impl FrameStore {
    /// The embedded guided tour of the plot form.
    pub fn builtin() -> Self {
        Self::Builtin(builtin_table())
    }

    /// Frames fetched from a JSON document on a background thread.
    pub fn document(path: impl Into<PathBuf>) -> Self {
        Self::Document(DocumentFrames::spawn_load(path.into()))
    }

    /// Synchronous document parse, mainly for tests and pre-loaded content.
    pub fn from_document_str(raw: &str) -> Result<Self, FrameStoreError> {
        Ok(Self::Document(DocumentFrames::ready(parse_document(raw)?)))
    }

    pub fn is_ready(&self) -> bool {
        match self {
            Self::Builtin(_) => true,
            Self::Document(doc) => {
                doc.with_state(|state| matches!(state, DocumentState::Ready(_)))
            }
        }
    }

    /// Load failure message of the document backend, if any.
    pub fn load_error(&self) -> Option<String> {
        match self {
            Self::Builtin(_) => None,
            Self::Document(doc) => doc.with_state(|state| match state {
                DocumentState::Failed(msg) => Some(msg.clone()),
                _ => None,
            }),
        }
    }

    pub fn len(&self) -> Result<usize, FrameStoreError> {
        match self {
            Self::Builtin(table) => Ok(table.len()),
            Self::Document(doc) => doc.with_state(|state| match state {
                DocumentState::Ready(table) => Ok(table.len()),
                _ => Err(FrameStoreError::NotReady),
            }),
        }
    }

    pub fn frame(&self, index: usize) -> Result<Frame, FrameStoreError> {
        match self {
            Self::Builtin(table) => table.frame(index),
            Self::Document(doc) => doc.with_state(|state| match state {
                DocumentState::Ready(table) => table.frame(index),
                _ => Err(FrameStoreError::NotReady),
            }),
        }
    }
}

fn builtin_table() -> FrameTable {
    fn step(headline: &str, explanation: &str, task: &str) -> FrameRecord {
        FrameRecord {
            headline: Some(headline.to_owned()),
            explanation: Some(explanation.to_owned()),
            task: Some(task.to_owned()),
            ..FrameRecord::default()
        }
    }

    let centered = TextPosition { x: 50, y: 50 };

    let mut frames = vec![
        step(
            "Welcome",
            "This tour walks you through building your first diagram from real \
             cosmic-particle data. Use the right arrow to continue and the left \
             arrow to go back; Esc leaves the tour at any time.",
            "Press the right arrow to begin.",
        ),
        step(
            "Detail level",
            "The form starts in basic mode and hides the advanced fields. \
             Everything in this tour works in basic mode.",
            "Have a look at the detail level switch, then continue.",
        ),
        step(
            "Choose an experiment",
            "Every dataset belongs to a measurement site. The research vessel \
             Polarstern carries a neutron monitor and a muon telescope across \
             the Atlantic.",
            "Select 'Polarstern' as the experiment for the first plot.",
        ),
        step(
            "Choose a dataset",
            "Within an experiment you pick one HDF5 table to read from.",
            "Select the 2017-2018 neutron monitor and muon telescope dataset.",
        ),
        step(
            "Diagram type",
            "Five diagram types are available: a 1D histogram, an XY diagram, a \
             2D histogram, a profile, and a map.",
            "Select the XY diagram.",
        ),
        step(
            "X axis",
            "The x expression names the table column plotted horizontally.",
            "Set the x expression to 'time'.",
        ),
        step(
            "Y axis",
            "The y expression names the column plotted vertically.",
            "Set the y expression to 'mu_rate', the muon rate.",
        ),
        step(
            "Time binning",
            "Raw rates are noisy; binning averages them over a time window.",
            "Enter any binning value, for example 3600.",
        ),
        step(
            "Legend",
            "The legend position is cosmetic; 'best' lets the renderer decide.",
            "Pick a legend position, or keep 'best', then continue.",
        ),
        step(
            "Create the diagram",
            "The render server now has everything it needs.",
            "Activate the submit button to request the plot.",
        ),
        step(
            "The result",
            "The finished diagram appears here once the server answers.",
            "Have a look at the plot area, then continue.",
        ),
        step(
            "Downloads",
            "Finished plots can be fetched as PNG, PDF, or SVG.",
            "These buttons link to each format; continue when ready.",
        ),
        step(
            "Plot settings",
            "The settings box holds the exact request as text; pasting it into \
             the load box reproduces the plot later.",
            "Note both boxes, then continue.",
        ),
        step(
            "Session name",
            "Saved plots are grouped under a session name.",
            "Have a look at the session field, then continue.",
        ),
        step(
            "Save the plot",
            "Saving keeps the request and the result image in your session.",
            "Activate the save button.",
        ),
        step(
            "Saved plots",
            "Saved plots show up as thumbnails in the session list.",
            "This area is read-only during the tour; continue.",
        ),
        step(
            "Saved plot actions",
            "Each saved plot can be reloaded into the form or deleted.",
            "These buttons stay disabled during the tour; continue.",
        ),
        step(
            "That's it",
            "You have created and saved your first diagram. Restart the tour \
             any time from the help menu.",
            "Press the right arrow to finish.",
        ),
    ];

    frames[0].text_position = Some(centered);
    frames[17].text_position = Some(centered);

    frames[1].target = Some("detaillevel".to_owned());

    frames[2].target = Some("experiment0".to_owned());
    frames[2].completion = Some(CompletionMode::ValueEquals("Polarstern".to_owned()));

    frames[3].target = Some("s0".to_owned());
    frames[3].completion = Some(CompletionMode::ValueEquals(
        "Polarstern/2017-2018_PS-nm-mt.h5:/raw/PS_mu_nm_data".to_owned(),
    ));

    frames[4].target = Some("m0".to_owned());
    frames[4].completion = Some(CompletionMode::ValueEquals("xy".to_owned()));

    frames[5].target = Some("x0".to_owned());
    frames[5].completion = Some(CompletionMode::ValueEquals("time".to_owned()));

    frames[6].target = Some("y0".to_owned());
    frames[6].completion = Some(CompletionMode::ValueEquals("mu_rate".to_owned()));

    frames[7].target = Some("t".to_owned());
    frames[7].completion = Some(CompletionMode::NonEmpty);

    frames[8].target = Some("l".to_owned());

    frames[9].target = Some("submit".to_owned());
    frames[9].completion = Some(CompletionMode::Click);

    frames[10].target = Some("plot-image".to_owned());
    frames[11].target = Some("download-buttons".to_owned());
    frames[12].target = Some("plot-settings,load-settings".to_owned());
    frames[13].target = Some("session-name".to_owned());

    frames[14].target = Some("save-plot".to_owned());
    frames[14].completion = Some(CompletionMode::Click);

    frames[15].target = Some("saved-plot-image".to_owned());
    frames[15].locked = Some(true);

    frames[16].target = Some(".saved-actions".to_owned());
    frames[16].locked = Some(true);

    FrameTable::new(FrameDefaults::default(), frames)
        .expect("builtin tour targets are statically valid")
}
