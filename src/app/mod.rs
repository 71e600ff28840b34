pub mod config;
pub mod identity;
pub mod logging;

pub use config::{Config, ConfigError, DeliveryMode, LogLevel};
pub use logging::init_tracing;

use crate::collector::{CpuTempProbe, ReadingSource};
use crate::sender::{BackendTransmitter, DirectSender, ReadingSink};
use std::future::Future;
use std::process;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

pub struct App {
    config: Config,
}

impl App {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let config = Config::from_args(args)?;
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        init_tracing(self.config.log_level);

        info!("Starting enviro-forwarder v{}", env!("CARGO_PKG_VERSION"));
        info!("Device id: {}", identity::device_id());
        info!(
            "Wi-Fi: {}",
            if identity::wifi_connected() {
                "connected"
            } else {
                "disconnected"
            }
        );
        info!(
            base_url = %self.config.base_url,
            batch_size = self.config.batch_size,
            max_pending = self.config.max_pending,
            queue_file = %self.config.queue_file.display(),
            mode = ?self.config.delivery_mode,
            "Configuration loaded"
        );

        let probe = CpuTempProbe::new();
        match self.config.delivery_mode {
            DeliveryMode::Durable => {
                let transmitter = BackendTransmitter::new(self.config.transmitter_config())?;
                run_loop(probe, transmitter, self.config.sample_interval, shutdown_signal()).await;
            }
            DeliveryMode::Direct => {
                let sender = DirectSender::new(
                    &self.config.base_url,
                    &self.config.api_key,
                    self.config.timeout,
                )?;
                run_loop(probe, sender, self.config.sample_interval, shutdown_signal()).await;
            }
        }

        info!("enviro-forwarder stopped.");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

/// One sampling/delivery cycle runs to completion before the next begins;
/// the queue inside the sink is the retry mechanism, so the loop keeps
/// going through transient failures and only exits when `shutdown`
/// resolves. The shutdown future lives across iterations, so a signal
/// arriving while a delivery is in flight still stops the loop at the end
/// of that cycle.
async fn run_loop<R, S>(
    mut source: R,
    mut sink: S,
    period: Duration,
    shutdown: impl Future<Output = ()>,
) where
    R: ReadingSource,
    S: ReadingSink,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
            _ = ticker.tick() => {
                let reading = match source.sample() {
                    Ok(reading) => reading,
                    Err(e) => {
                        warn!("Sampling failed: {e}");
                        continue;
                    }
                };
                debug!(?reading, "Sampled reading");
                if !sink.submit(reading).await {
                    warn!("Delivery incomplete; undelivered readings remain queued");
                }
            }
        }
    }
}

// Main entry point for the application
pub async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    match App::from_args(args) {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("Application error: {e}");
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Configuration error: {e}");
            process::exit(1);
        }
    }

    Ok(())
}
