//! Pipeline event observers
//!
//! Components never log directly. They report [`EtlEvent`]s to an injected
//! observer, which decides where the events go.

use super::PipelineState;
use crate::error::Stage;
use std::path::PathBuf;
use std::sync::Mutex;

/// Something noteworthy that happened during a run
#[derive(Debug, Clone, PartialEq)]
pub enum EtlEvent {
    StateChanged(PipelineState),
    FileRead {
        path: PathBuf,
        rows: usize,
    },
    FileSkipped {
        path: PathBuf,
        reason: String,
    },
    Extracted {
        files: usize,
        skipped: usize,
        rows: usize,
    },
    StepApplied {
        step: String,
        before: usize,
        after: usize,
    },
    Loaded {
        table: String,
        records: usize,
    },
    Failed {
        stage: Stage,
        message: String,
    },
}

/// Receiver of pipeline events
pub trait EtlObserver: Send + Sync {
    fn notify(&self, event: &EtlEvent);
}

/// Forwards events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl EtlObserver for LogObserver {
    fn notify(&self, event: &EtlEvent) {
        match event {
            EtlEvent::StateChanged(state) => log::debug!("Pipeline state: {:?}", state),
            EtlEvent::FileRead { path, rows } => {
                log::info!("Read {} row(s) from {}", rows, path.display())
            }
            EtlEvent::FileSkipped { path, reason } => {
                log::warn!("Skipping {}: {}", path.display(), reason)
            }
            EtlEvent::Extracted {
                files,
                skipped,
                rows,
            } => log::info!(
                "Extracted {} row(s) from {} file(s), skipped {}",
                rows,
                files,
                skipped
            ),
            EtlEvent::StepApplied {
                step,
                before,
                after,
            } => log::debug!("{}: {} -> {} row(s)", step, before, after),
            EtlEvent::Loaded { table, records } => {
                log::info!("Loaded {} record(s) into {}", records, table)
            }
            EtlEvent::Failed { stage, message } => {
                log::error!("ETL process failed during {}: {}", stage, message)
            }
        }
    }
}

/// Keeps every event in memory, in arrival order
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<EtlEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EtlEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Pipeline states in the order they were entered
    pub fn states(&self) -> Vec<PipelineState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                EtlEvent::StateChanged(state) => Some(state),
                _ => None,
            })
            .collect()
    }
}

impl EtlObserver for RecordingObserver {
    fn notify(&self, event: &EtlEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        observer.notify(&EtlEvent::StateChanged(PipelineState::Extracting));
        observer.notify(&EtlEvent::FileRead {
            path: PathBuf::from("a.csv"),
            rows: 3,
        });
        observer.notify(&EtlEvent::StateChanged(PipelineState::Done));

        assert_eq!(observer.events().len(), 3);
        assert_eq!(
            observer.states(),
            vec![PipelineState::Extracting, PipelineState::Done]
        );
    }
}
