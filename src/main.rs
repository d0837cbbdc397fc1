use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;
use showcase::config::{ModelDescriptor, ShowcaseConfig, ViewportConfig};

#[derive(Parser, Debug)]
#[command(name = "showcase")]
#[command(about = "Rotating 3D model viewports with procedural fallback")]
struct Cli {
    /// JSON file describing the viewports to open
    config: Option<PathBuf>,

    /// Directory that model paths are resolved against
    #[arg(long)]
    asset_root: Option<PathBuf>,

    /// Open a single viewport with these models instead, e.g.
    /// `obj:models/brain.obj` or `procedural:icosahedron`
    #[arg(long = "model", value_name = "DESCRIPTOR")]
    models: Vec<ModelDescriptor>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ShowcaseConfig::from_path(path)?,
        None => ShowcaseConfig::default(),
    };
    if !cli.models.is_empty() {
        config.viewports = vec![ViewportConfig::new("showcase", cli.models)];
    }
    if let Some(root) = cli.asset_root {
        config.asset_root = root;
    }
    config.validate()?;

    info!(
        "opening {} viewport(s), assets under {}",
        config.viewports.len(),
        config.asset_root.display()
    );
    showcase::run(config)
}
