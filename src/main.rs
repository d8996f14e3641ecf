mod calc;
mod config;
mod error;
mod ipc;
mod loader;
mod roster;
mod sheet;
mod table;
mod view;
mod xlsx;

use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // stdout carries the IPC protocol, so logs must stay on stderr.
    let filter =
        EnvFilter::try_from_env(config::LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = config::Cli::parse();
    init_tracing();

    let dataset = loader::load(&cli.path, &cli.load_options());
    if dataset.table.is_empty() {
        warn!("no grade data available; check the spreadsheet");
    }

    if let Some(name) = cli.snapshot.as_deref() {
        std::process::exit(print_snapshot(&dataset, name, cli.unit.as_deref()));
    }

    info!(version = env!("CARGO_PKG_VERSION"), "serving requests on stdin");
    serve(ipc::AppState::new(dataset));
}

fn print_snapshot(dataset: &table::Dataset, name: &str, unit: Option<&str>) -> i32 {
    let selection = roster::resolve(&dataset.table, name);
    let mut doc = view::dashboard_json(&dataset.table, selection.as_ref(), unit);
    doc["dataPath"] = serde_json::json!(dataset.path.to_string_lossy());
    doc["loadError"] = match &dataset.load_error {
        Some(e) => serde_json::json!({ "code": e.code(), "message": e.to_string() }),
        None => serde_json::Value::Null,
    };
    match serde_json::to_string_pretty(&doc) {
        Ok(s) => {
            println!("{}", s);
            0
        }
        Err(e) => {
            error!("failed to render snapshot: {}", e);
            1
        }
    }
}

fn serve(mut state: ipc::AppState) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                warn!("bad request line: {}", e);
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
