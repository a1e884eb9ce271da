//! Terminal implementations of the core capabilities.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use chargeminder_core::battery::BatteryProbe;
use chargeminder_core::{Notification, Notifier, NotifyError};

/// Prints reminders to stdout with a bell; asks for consent on stdin.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for ConsoleNotifier {
    fn prompt_consent(&mut self) -> bool {
        eprint!("Allow chargeminder to show reminders? [y/N] ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
            Err(e) => {
                tracing::warn!("could not read consent answer: {e}");
                false
            }
        }
    }

    fn show(&mut self, notification: &Notification) -> Result<(), NotifyError> {
        let mut out = std::io::stdout().lock();
        let write = |out: &mut std::io::StdoutLock<'_>| -> std::io::Result<()> {
            writeln!(out, "\x07[{}] {}", notification.tag, notification.title)?;
            writeln!(out, "    {}", notification.body)?;
            for action in &notification.actions {
                writeln!(out, "    - {}", action.title())?;
            }
            out.flush()
        };
        write(&mut out).map_err(|e| NotifyError::DeliveryFailed(e.to_string()))
    }
}

/// Reads `/sys/class/power_supply/BAT*/capacity` on Linux.
#[derive(Debug, Clone)]
pub struct SysfsBatteryProbe {
    root: PathBuf,
}

impl Default for SysfsBatteryProbe {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/sys/class/power_supply"),
        }
    }
}

impl BatteryProbe for SysfsBatteryProbe {
    fn read_fraction(&self) -> Option<f64> {
        let entries = std::fs::read_dir(&self.root).ok()?;
        for entry in entries.flatten() {
            if !entry.file_name().to_string_lossy().starts_with("BAT") {
                continue;
            }
            let Ok(raw) = std::fs::read_to_string(entry.path().join("capacity")) else {
                continue;
            };
            if let Ok(percent) = raw.trim().parse::<f64>() {
                tracing::debug!(percent, "battery read from sysfs");
                return Some(percent / 100.0);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_reads_first_battery() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("AC")).unwrap();
        std::fs::create_dir(dir.path().join("BAT0")).unwrap();
        std::fs::write(dir.path().join("BAT0/capacity"), "63\n").unwrap();
        let probe = SysfsBatteryProbe {
            root: dir.path().to_path_buf(),
        };
        assert_eq!(probe.read_fraction(), Some(0.63));
    }

    #[test]
    fn probe_without_battery() {
        let dir = tempfile::tempdir().unwrap();
        let probe = SysfsBatteryProbe {
            root: dir.path().to_path_buf(),
        };
        assert_eq!(probe.read_fraction(), None);
    }
}
