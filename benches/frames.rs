// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use triton::form::{WidgetEntry, WidgetRegistry};
use triton::model::TargetQuery;
use triton::tutorial::{resolve_targets, FrameStore};

mod profiler;

fn synthetic_document(frames: usize) -> String {
    let mut records = Vec::with_capacity(frames);
    for index in 0..frames {
        records.push(format!(
            r#"{{ "headline": "Step {index}", "explanation": "Walks field {index}.", "task": "Adjust field {index}.", "target": "field{index}", "completion": "nonEmpty" }}"#
        ));
    }
    format!(
        r#"{{ "default": {{ "textPosition": {{ "x": 75, "y": 40 }} }}, "frames": [{}] }}"#,
        records.join(",")
    )
}

fn wide_registry(widgets: usize) -> WidgetRegistry {
    let mut registry = WidgetRegistry::new();
    for index in 0..widgets {
        let mut entry = WidgetEntry::new(format!("field{index}"))
            .with_value(format!("value {index}"))
            .interactive();
        if index % 7 == 0 {
            entry = entry.with_group("saved-actions");
        }
        registry.insert(entry);
    }
    registry
}

// Benchmark identity (keep stable):
// - Group names in this file: `frames.load`, `frames.resolve`
// - Case IDs (the string after the `/`) must remain stable across refactors so
//   results stay comparable over time.
fn benches_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("frames.load");
    let doc_small = synthetic_document(18);
    group.bench_function("document_18", |b| {
        b.iter(|| {
            let store = FrameStore::from_document_str(black_box(&doc_small)).expect("document");
            black_box(store.len().expect("len"))
        })
    });
    let doc_large = synthetic_document(200);
    group.bench_function("document_200", |b| {
        b.iter(|| {
            let store = FrameStore::from_document_str(black_box(&doc_large)).expect("document");
            black_box(store.len().expect("len"))
        })
    });
    group.bench_function("builtin_full_merge", |b| {
        let store = FrameStore::builtin();
        b.iter(|| {
            let len = store.len().expect("len");
            let mut chars = 0usize;
            for index in 0..len {
                let frame = store.frame(black_box(index)).expect("frame");
                chars += frame.headline().len() + frame.explanation().len();
            }
            black_box(chars)
        })
    });
    group.finish();

    let mut group = c.benchmark_group("frames.resolve");
    let registry = wide_registry(160);
    let id_query: TargetQuery = "field42".parse().expect("query");
    let union_query: TargetQuery = "field1,field80,field159".parse().expect("query");
    let group_query: TargetQuery = ".saved-actions".parse().expect("query");

    group.bench_function("single_id", |b| {
        b.iter(|| black_box(resolve_targets(black_box(&id_query), black_box(&registry))).len())
    });
    group.bench_function("id_union", |b| {
        b.iter(|| black_box(resolve_targets(black_box(&union_query), black_box(&registry))).len())
    });
    group.bench_function("group_scan", |b| {
        b.iter(|| black_box(resolve_targets(black_box(&group_query), black_box(&registry))).len())
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_frames
}
criterion_main!(benches);
