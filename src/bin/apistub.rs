use apistub::{MockApiServer, ServerUrl, DEFAULT_FIXTURE_DIR, DEFAULT_URL};
use clap::Parser;
use log::info;
use std::path::PathBuf;

/// Serve canned API responses until `GET /STOP` or Ctrl-C.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Base URL to listen on and advertise in responses.
    #[arg(default_value = DEFAULT_URL)]
    url: String,

    /// Directory holding the JSON fixtures.
    #[arg(long, env = "APISTUB_FIXTURES", default_value = DEFAULT_FIXTURE_DIR)]
    fixtures: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let url = ServerUrl::parse(&args.url)?;
    let mut server = MockApiServer::builder()
        .url(url)
        .fixtures(args.fixtures)
        .start()?;

    tokio::select! {
        _ = server.wait() => {}
        interrupted = tokio::signal::ctrl_c() => {
            interrupted?;
            info!("Interrupted, shutting down");
            server.stop();
            server.wait().await;
        }
    }
    Ok(())
}
