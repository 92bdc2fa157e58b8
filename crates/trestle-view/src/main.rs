use anyhow::Result;
use clap::Parser;
use trestle_view::ViewerConfig;

mod cli;
mod headless;
#[cfg(feature = "gui")]
mod gui;

fn main() -> Result<()> {
    init_tracing();
    let args = cli::CliArgs::parse();
    match args.mode {
        Some(cli::Mode::Headless { command }) => headless::run_headless(command),
        None => run_gui(args.view.to_config()),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(feature = "gui")]
fn run_gui(config: ViewerConfig) -> Result<()> {
    config.validate()?;
    gui::run_gui(config)
}

#[cfg(not(feature = "gui"))]
fn run_gui(_config: ViewerConfig) -> Result<()> {
    anyhow::bail!("GUI support disabled. Rebuild with --features gui.");
}
