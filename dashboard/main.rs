/// annostat dashboard
///
/// Browser view of a running statistics scan: live per-image table, progress
/// bar and the three final distribution charts. Served by a synchronous
/// tiny_http server; no JavaScript frameworks required.
///
/// Run with:
///   cargo run --bin dashboard --release -- [project.json]
/// Then open http://127.0.0.1:7879
///
/// Without a dump path a synthetic demo project is scanned.

mod state;
mod render;
mod routes;
mod handlers;
mod util;

use std::sync::{Arc, Mutex};

use clap::Parser;
use tiny_http::Server;
use tracing::{error, info};

use annostat::catalog::SyntheticOptions;
use annostat::ScanConfig;

use state::{DashboardState, ProjectSource};

#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(about = "Live dashboard for annotation statistics scans", long_about = None)]
struct Cli {
    /// Project dump to scan (JSON). Omit to scan a synthetic project.
    dump: Option<String>,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:7879")]
    addr: String,

    /// Scan config (JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// Seed of the synthetic project
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = annostat::logging::init("info") {
        eprintln!("{}", e);
    }

    let config = match &cli.config {
        Some(path) => match ScanConfig::load_json(path) {
            Ok(c) => c,
            Err(e) => {
                error!("Could not load scan config {}: {}", path, e);
                return;
            }
        },
        None => ScanConfig::default(),
    };
    let source = match cli.dump {
        Some(path) => ProjectSource::Dump(path),
        None => ProjectSource::Synthetic(SyntheticOptions { seed: cli.seed, ..Default::default() }),
    };

    let server = match Server::http(&cli.addr) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to bind HTTP server on {}: {}", cli.addr, e);
            return;
        }
    };
    info!("annostat dashboard on http://{} ({})", cli.addr, source.label());

    let shared_state = Arc::new(Mutex::new(DashboardState::new(source, config)));

    // One thread per request: the SSE handler blocks for the whole scan.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
}
