mod app;
mod backend;
mod config;
mod input;
mod protocol;
mod request;
mod settings;
mod state;
mod theme;
mod ui;
mod view;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to a file, stdout belongs to the TUI
    let log_dir = config::data_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| "/tmp".into());
    std::fs::create_dir_all(&log_dir).ok();

    let log_file = std::fs::File::create(log_dir.join("terminal.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let config = config::load();
    app::run(config).await
}
