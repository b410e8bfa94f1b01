//! figwatch - log fig-tree phenology and fruit-bat activity, with local weather.

use clap::Parser;
use fig_cmd::config::Settings;

#[derive(Parser)]
#[command(
    name = "figwatch",
    version,
    about = "Fig-tree phenology and fruit-bat monitoring toolkit"
)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: fig_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("settings: {:?}", cli.settings);
    fig_cmd::run(&cli.settings, cli.command).await
}
