// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ratatui::layout::Rect;
use triton::render::{mask_to_string, paint_mask, Shade};

mod profiler;

// Benchmark identity (keep stable):
// - Group names in this file: `overlay.paint`, `overlay.scan`
// - Case IDs (the string after the `/`) must remain stable across refactors so
//   results stay comparable over time.
fn benches_overlay(c: &mut Criterion) {
    let small = Rect::new(0, 0, 80, 24);
    let large = Rect::new(0, 0, 250, 70);
    let nav_small = Rect::new(0, 0, 80, 1);
    let nav_large = Rect::new(0, 0, 250, 1);

    let one_hole = [Rect::new(10, 5, 30, 1)];
    let many_holes: Vec<Rect> =
        (0..12).map(|i| Rect::new(5 + i * 18, 4 + (i % 9) * 6, 16, 2)).collect();

    let mut group = c.benchmark_group("overlay.paint");
    group.bench_function("small_one_hole", |b| {
        b.iter(|| {
            let mask =
                paint_mask(black_box(small), black_box(nav_small), black_box(&one_hole), 1);
            black_box(mask.area().width)
        })
    });
    group.bench_function("large_one_hole", |b| {
        b.iter(|| {
            let mask =
                paint_mask(black_box(large), black_box(nav_large), black_box(&one_hole), 1);
            black_box(mask.area().width)
        })
    });
    group.bench_function("large_many_holes", |b| {
        b.iter(|| {
            let mask =
                paint_mask(black_box(large), black_box(nav_large), black_box(&many_holes), 1);
            black_box(mask.area().width)
        })
    });
    group.finish();

    let mut group = c.benchmark_group("overlay.scan");
    let mask = paint_mask(large, nav_large, &many_holes, 1);
    group.bench_function("shade_at_full_sweep", |b| {
        b.iter(|| {
            let mut holes = 0usize;
            for y in 0..large.height {
                for x in 0..large.width {
                    if mask.shade_at(x, y) == Some(Shade::Hole) {
                        holes += 1;
                    }
                }
            }
            black_box(holes)
        })
    });
    group.bench_function("mask_to_string", |b| {
        b.iter(|| black_box(mask_to_string(black_box(&mask))).len())
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_overlay
}
criterion_main!(benches);
