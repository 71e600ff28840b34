use crate::domain::Reading;
use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed sensor value: {0:?}")]
    Malformed(String),
}

/// Boundary to the sensor-acquisition collaborator: anything that can
/// produce one reading per sampling cycle.
pub trait ReadingSource {
    fn sample(&mut self) -> Result<Reading, ProbeError>;
}

/// Minimal built-in source: the SoC thermal zone. Real sensor drivers
/// (I2C/SPI glue) live outside this crate and plug in through
/// `ReadingSource`.
#[derive(Debug)]
pub struct CpuTempProbe {
    thermal_path: PathBuf,
}

impl CpuTempProbe {
    pub fn new() -> Self {
        Self::with_path("/sys/class/thermal/thermal_zone0/temp")
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            thermal_path: path.into(),
        }
    }
}

impl Default for CpuTempProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingSource for CpuTempProbe {
    fn sample(&mut self) -> Result<Reading, ProbeError> {
        let raw = fs::read_to_string(&self.thermal_path)?;
        let millidegrees: i64 = raw
            .trim()
            .parse()
            .map_err(|_| ProbeError::Malformed(raw.trim().to_string()))?;

        let mut reading = Reading::new();
        reading.set(
            "cpu_temperature",
            format!("{:.2}", millidegrees as f64 / 1000.0),
        );
        reading.set("sampled_at", Utc::now().to_rfc3339());
        Ok(reading)
    }
}
