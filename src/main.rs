mod app;

use std::path::PathBuf;

use affect_atlas::classify::{PlaceholderOcr, SeededClassifier};
use affect_atlas::render::Theme;
use affect_atlas::store::{EntryStore, JsonStore, MemoryStore, seed_if_empty};
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file holding the entries. Entries live in memory only when omitted.
    #[arg(long)]
    entries: Option<PathBuf>,
    /// Sample entries to create when the store starts empty.
    #[arg(long, default_value_t = 40)]
    samples: usize,
    #[arg(long, value_enum, default_value_t = Theme::Dark)]
    theme: Theme,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn open_store(args: &Args) -> anyhow::Result<Box<dyn EntryStore>> {
    let mut store: Box<dyn EntryStore> = match &args.entries {
        Some(path) => Box::new(JsonStore::open(path)?),
        None => Box::new(MemoryStore::new()),
    };
    seed_if_empty(store.as_mut(), args.samples).context("failed to seed sample entries")?;
    Ok(store)
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let store = open_store(&args)?;
    let theme = args.theme;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "affect-atlas",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::AtlasApp::new(
                cc,
                store,
                Box::new(SeededClassifier),
                Box::new(PlaceholderOcr),
                theme,
            )))
        }),
    )
    .map_err(|error| anyhow::anyhow!("failed to run the atlas window: {error}"))
}
