// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Triton CLI entrypoint.
//!
//! Runs the interactive TUI against a plot server. The client worker runs on a
//! current-thread tokio runtime while the TUI itself runs on a blocking thread.

use std::error::Error;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<session-dir>] [--server <url>] [--frames <file>] [--durable-writes]\n  {program} [--session <dir>] [--server <url>] [--frames <file>] [--durable-writes]\n  {program} --demo [--frames <file>]\n\nIf session-dir/--session is omitted, the current working directory is used.\n--demo uses a built-in demo session and dataset list and cannot be combined\nwith session-dir/--session or --server.\n\n--server selects the plot server base URL (default {DEFAULT_SERVER_URL}).\n--frames loads the tour from a JSON frame document instead of the built-in tour.\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    demo: bool,
    session_dir: Option<String>,
    server: Option<String>,
    frames: Option<String>,
    durable_writes: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--session" => {
                if options.session_dir.is_some() {
                    return Err(());
                }
                let dir = args.next().ok_or(())?;
                options.session_dir = Some(dir);
            }
            "--server" => {
                if options.server.is_some() {
                    return Err(());
                }
                let url = args.next().ok_or(())?;
                options.server = Some(url);
            }
            "--frames" => {
                if options.frames.is_some() {
                    return Err(());
                }
                let file = args.next().ok_or(())?;
                options.frames = Some(file);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.session_dir.is_some() {
                    return Err(());
                }
                options.session_dir = Some(arg);
            }
        }
    }

    if options.demo && (options.session_dir.is_some() || options.server.is_some()) {
        return Err(());
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "triton".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let session_folder = if options.demo {
            // Demo sessions still persist, just into a throwaway temp folder.
            let now_millis = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0);
            let demo_dir = std::env::temp_dir()
                .join(format!("triton-demo-session-{}-{now_millis}", std::process::id()));
            let folder = triton::store::SessionFolder::new(demo_dir);
            folder.save_session(&triton::tui::demo_session())?;
            folder
        } else {
            let dir = options.session_dir.unwrap_or_else(|| ".".to_owned());
            if options.durable_writes {
                triton::store::SessionFolder::new(dir)
                    .with_durability(triton::store::WriteDurability::Durable)
            } else {
                triton::store::SessionFolder::new(dir)
            }
        };

        let frame_store = match options.frames {
            Some(path) => triton::tutorial::FrameStore::document(path),
            None => triton::tutorial::FrameStore::builtin(),
        };

        let server = options.server.unwrap_or_else(|| DEFAULT_SERVER_URL.to_owned());
        let demo = options.demo;

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        runtime.block_on(async move {
            let client = triton::client::PlotClient::new(server)?;
            let (requests, responses) = triton::client::spawn_worker(client);

            let datasets = if demo {
                triton::tui::demo_datasets()
            } else {
                // The dataset list streams in once the worker answers; the form
                // starts from whatever the session already references.
                requests.send(triton::client::ClientRequest::ListDatasets).ok();
                Vec::new()
            };

            let tui_join = tokio::task::spawn_blocking(move || {
                triton::tui::run(session_folder, frame_store, datasets, requests, responses)
                    .map_err(|err| err.to_string())
            })
            .await;

            let tui_result = tui_join.map_err(|err| -> Box<dyn Error> { Box::new(err) })?;
            tui_result.map_err(|err| Box::new(std::io::Error::other(err)) as Box<dyn Error>)?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("triton: {err}");
        std::process::exit(1);
    }
}
