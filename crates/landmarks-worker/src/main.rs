//! Frame-analysis worker binary.

use tracing::{error, info};

use landmarks_worker::telemetry::{init_metrics, init_tracing};
use landmarks_worker::{WorkerConfig, WorkerExecutor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting landmarks-worker");

    let config = match WorkerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(addr) = config.metrics_addr {
        init_metrics(addr)?;
    }

    let executor = WorkerExecutor::new(config)?;
    info!("Worker config: {:?}", executor.config());
    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
    };

    let summary = executor.run(shutdown).await?;
    info!(
        snapshots = summary.snapshots,
        faces = summary.faces,
        "Worker shutdown complete"
    );
    Ok(())
}
