use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started { label: String, total: Option<u64> },
    Advanced { written: u64 },
    Finished { written: u64 },
    Notice(String),
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn event(&self, _event: ProgressEvent) {}
}

#[derive(Default)]
pub struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn start(label: String, total: Option<u64>) -> ProgressBar {
        let (bar, template) = match total {
            Some(total) if total > 0 => (
                ProgressBar::new(total),
                "{msg}: {percent}%|{bar:40.cyan/blue}| {bytes}/{total_bytes} [{elapsed_precise}<{eta}, {bytes_per_sec}]",
            ),
            _ => (
                ProgressBar::new_spinner(),
                "{msg}: {spinner} {bytes} [{elapsed_precise}, {bytes_per_sec}]",
            ),
        };
        let style = ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        bar.set_style(style);
        bar.set_message(label);
        if total.unwrap_or(0) == 0 {
            bar.enable_steady_tick(Duration::from_millis(100));
        }
        bar
    }
}

impl ProgressSink for BarProgress {
    fn event(&self, event: ProgressEvent) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        match event {
            ProgressEvent::Started { label, total } => {
                if let Some(previous) = slot.take() {
                    previous.finish_and_clear();
                }
                *slot = Some(Self::start(label, total));
            }
            ProgressEvent::Advanced { written } => {
                if let Some(bar) = slot.as_ref() {
                    bar.set_position(written);
                }
            }
            ProgressEvent::Finished { written } => {
                if let Some(bar) = slot.take() {
                    bar.set_position(written);
                    bar.finish();
                }
            }
            ProgressEvent::Notice(message) => match slot.as_ref() {
                Some(bar) => bar.println(message),
                None => eprintln!("{message}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_lifecycle_without_total() {
        let sink = BarProgress::new();
        sink.event(ProgressEvent::Started {
            label: "sample".to_string(),
            total: None,
        });
        sink.event(ProgressEvent::Advanced { written: 10 });
        sink.event(ProgressEvent::Finished { written: 10 });
        assert!(sink.bar.lock().unwrap().is_none());
    }

    #[test]
    fn started_replaces_previous_bar() {
        let sink = BarProgress::new();
        sink.event(ProgressEvent::Started {
            label: "first".to_string(),
            total: Some(100),
        });
        sink.event(ProgressEvent::Started {
            label: "second".to_string(),
            total: Some(50),
        });
        let guard = sink.bar.lock().unwrap();
        assert_eq!(guard.as_ref().and_then(|bar| bar.length()), Some(50));
    }
}
