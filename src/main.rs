use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use fgasim::config::Port;
use fgasim::device::{Device, Model};
use fgasim::{persist, service};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the port to connect to
    ///
    /// either serial:///device/path or tcp+raw://host:port URLs supported
    port: Url,

    /// Emulated model id (1 = Office, 2 = Horizontal, 3 = VRF).
    ///
    /// Overrides the persisted selection.
    #[arg(long)]
    model: Option<u8>,

    /// Path of the model-selection config file
    #[arg(long, default_value = persist::DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let model = match args.model {
        Some(id) => Model::from_id(id)
            .with_context(|| format!("unknown model id {id}, expected 1-3"))?,
        None => persist::load_model(&args.config),
    };
    info!(%model, "starting emulator");

    let device = Device::new(model);

    // persist every model change so restarts come back as the same unit
    {
        let mut updates = device.subscribe();
        let config = args.config.clone();
        let mut last = model;

        tokio::spawn(async move {
            while let Ok(snapshot) = updates.recv().await {
                if snapshot.model != last {
                    last = snapshot.model;
                    if let Err(err) = persist::store_model(&config, snapshot.model) {
                        warn!(%err, "failed to persist model selection");
                    }
                }
            }
        });
    }

    if let Err(err) = persist::store_model(&args.config, model) {
        warn!(%err, "failed to persist model selection");
    }

    let port = Port::open(&args.port).await?.framed();

    let cancel = CancellationToken::new();
    let mut server = tokio::spawn(service::run(port, device, cancel.clone()));

    tokio::select! {
        result = &mut server => {
            match result? {
                Ok(()) => info!("emulator service exited"),
                Err(err) => error!(%err, "emulator service failed"),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            cancel.cancel();
            let _ = server.await;
        }
    }

    Ok(())
}
