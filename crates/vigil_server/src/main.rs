use clap::Parser;
use mimalloc::MiMalloc;
use std::path::PathBuf;
use vigil_server::start_main_server;
use vigil_settings::VigilServerConfig;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "vigil-server", version, about = "Sliding-window drift monitoring service")]
struct Args {
    /// Monitoring config file
    #[arg(long, env = "VIGIL_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, env = "VIGIL_SERVER_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let mut config = VigilServerConfig::from_env()?;
    if let Some(config_path) = args.config {
        config.config_path = config_path;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    start_main_server(config).await
}
