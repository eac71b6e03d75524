use clap::Parser;
use dash_config::ConfigLoader;
use dash_server::logging::{init_logging, report_config_warnings};
use dash_server::server;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let loaded = ConfigLoader::new(&args.config).load()?;
    init_logging(&loaded.config.logging)?;
    report_config_warnings(&loaded.warnings);

    tracing::info!("Starting DASH monitor with config: {}", args.config);

    server::run(loaded.config).await
}
