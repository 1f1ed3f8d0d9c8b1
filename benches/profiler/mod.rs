// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::str::FromStr;
use std::time::Duration;

use criterion::Criterion;

use pprof::criterion::{Output, PProfProfiler};

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name).ok().and_then(|raw| raw.trim().parse().ok()).unwrap_or(default)
}

/// Shared criterion setup for the mask and frame-store benches.
///
/// These are microbenches over in-memory grids and small JSON documents, so
/// the windows are short by default; override via `TRITON_BENCH_SAMPLES`,
/// `TRITON_BENCH_WARMUP_SECS`, `TRITON_BENCH_MEASURE_SECS`, and
/// `TRITON_PROFILE_FREQ` (flamegraph sampling rate).
pub fn criterion() -> Criterion {
    let frequency = env_or::<i32>("TRITON_PROFILE_FREQ", 250).clamp(1, 1000);
    let samples = env_or::<usize>("TRITON_BENCH_SAMPLES", 80).clamp(10, 500);
    let warmup = env_or::<u64>("TRITON_BENCH_WARMUP_SECS", 2).clamp(1, 30);
    let measure = env_or::<u64>("TRITON_BENCH_MEASURE_SECS", 4).clamp(1, 60);

    Criterion::default()
        .sample_size(samples)
        .warm_up_time(Duration::from_secs(warmup))
        .measurement_time(Duration::from_secs(measure))
        .with_profiler(PProfProfiler::new(frequency, Output::Flamegraph(None)))
}
