use std::fs;
use std::path::Path;

/// Stable identifier for this device: the SoC serial from /proc/cpuinfo
/// where available (Raspberry Pi and friends), hostname otherwise.
pub fn device_id() -> String {
    if let Some(serial) = board_serial(Path::new("/proc/cpuinfo")) {
        return serial;
    }

    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Best-effort connectivity probe: whether this host currently holds any
/// address, read from `hostname -I`. Any failure to run the command counts
/// as disconnected.
pub fn wifi_connected() -> bool {
    std::process::Command::new("hostname")
        .arg("-I")
        .output()
        .map(|output| has_address(&output.stdout))
        .unwrap_or(false)
}

fn has_address(stdout: &[u8]) -> bool {
    !String::from_utf8_lossy(stdout).trim().is_empty()
}

fn board_serial(cpuinfo_path: &Path) -> Option<String> {
    let cpuinfo = fs::read_to_string(cpuinfo_path).ok()?;
    cpuinfo
        .lines()
        .find(|line| line.starts_with("Serial"))
        .and_then(|line| line.split(':').nth(1))
        .map(|serial| serial.trim().to_string())
        .filter(|serial| !serial.is_empty())
}
