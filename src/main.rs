mod app;
mod geometry;
mod model;
mod store;
mod util;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::model::MapId;
use crate::store::{JsonFileStore, MapStore, MemoryStore};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON document the map is persisted in.
    #[arg(long, default_value = "relmap-data.json")]
    data_path: PathBuf,

    /// Directory CSV exports and PNG snapshots land in.
    #[arg(long, default_value = "exports")]
    export_dir: PathBuf,

    /// Which map to open.
    #[arg(long, default_value = "default")]
    map: String,

    /// Run against an in-memory demo dataset instead of a data file.
    #[arg(long)]
    demo: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let store: Arc<dyn MapStore> = if args.demo {
        tracing::info!("running with the in-memory demo dataset");
        Arc::new(MemoryStore::with_demo_data())
    } else {
        tracing::info!(path = %args.data_path.display(), "opening map store");
        Arc::new(JsonFileStore::open(&args.data_path)?)
    };
    let map_id = MapId::new(&args.map);
    let export_dir = args.export_dir;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "relmap",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::RelMapApp::new(
                cc,
                Arc::clone(&store),
                map_id.clone(),
                export_dir.clone(),
            )))
        }),
    )
    .map_err(|error| anyhow::anyhow!("{error}"))
}
