use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use clap::Parser;
use env_logger::Env;
use log::{error, info, warn};
use rtmp::{ControlConsole, RtmpServer, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "rtmp-serve", version, about = "Stub RTMP server: answers connect, createStream and play")]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = rtmp::DEFAULT_PORT)]
    port: u16,

    /// Seconds a new connection may stay silent before it is dropped
    #[arg(long, default_value_t = 5)]
    ready_timeout: u64,

    /// Listen backlog
    #[arg(long, default_value_t = 10)]
    backlog: u32,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    info!("rtmp-serve v{}", env!("CARGO_PKG_VERSION"));

    let config = match ServerConfig::builder()
        .host(cli.host)
        .port(cli.port)
        .ready_timeout(Duration::from_secs(cli.ready_timeout))
        .backlog(cli.backlog)
        .build()
    {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(1);
        }
    };

    let server = match RtmpServer::bind(config).await {
        Ok(server) => Arc::new(server),
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(1);
        }
    };
    info!("Streaming on rtmp://{}", server.local_addr());

    let accept = {
        let server = server.clone();
        tokio::spawn(async move {
            if let Err(e) = server.run().await {
                error!("Accept loop failed: {}", e);
            }
        })
    };

    let console = ControlConsole::new(server.clone(), tokio::runtime::Handle::current());
    if let Err(e) = console.spawn() {
        warn!("Console unavailable: {}", e);
    }

    {
        let server = server.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Caught interrupt, shutting down");
                    server.stop().await;
                }
                Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
            }
        });
    }

    server.wait_stopped().await;
    if let Err(e) = accept.await {
        error!("Accept task ended abnormally: {}", e);
    }

    ExitCode::SUCCESS
}
