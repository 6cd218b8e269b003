use std::io::{self, Write};

use serde::Serialize;

use crate::progress::{ProgressEvent, ProgressSink};
use crate::resolver::{AcquireAction, AcquireResult, StatusResult};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_acquire(result: &AcquireResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_status(result: &StatusResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_acquire(result: &AcquireResult) -> io::Result<()> {
        let mut stdout = io::stdout();
        match result.action {
            AcquireAction::Cache => writeln!(stdout, "{} (cached): {}", result.variant, result.path),
            AcquireAction::Download => writeln!(
                stdout,
                "{} (downloaded {}): {}",
                result.variant,
                human_bytes(result.bytes.unwrap_or(0)),
                result.path
            ),
        }
    }

    pub fn print_status(result: &StatusResult) -> io::Result<()> {
        let mut stdout = io::stdout();
        writeln!(stdout, "cache: {}", result.cache_dir)?;
        for entry in &result.entries {
            let state = match entry.size {
                Some(size) => format!("cached, {}", human_bytes(size)),
                None => "missing".to_string(),
            };
            writeln!(stdout, "  {:<8} {state}", entry.variant.as_str())?;
            writeln!(stdout, "           {}", entry.path)?;
        }
        Ok(())
    }
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_bytes_units() {
        assert_eq!(human_bytes(512), "512 B");
        assert_eq!(human_bytes(1_000_000), "976.6 KiB");
        assert_eq!(human_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }
}
