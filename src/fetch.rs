use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::config::AppConfig;
use crate::data::error::LoadError;
use crate::data::loader;
use crate::data::model::{RegionalTable, TimeSeriesTable};

// ---------------------------------------------------------------------------
// Request tokens
// ---------------------------------------------------------------------------

/// Monotonic id of a load request.
pub type RequestToken = u64;

/// Tracks the newest request issued for one component.
///
/// Only the response carrying the newest token is applied; anything older
/// that resolves later is discarded.
#[derive(Debug, Default)]
pub struct RequestTracker {
    issued: RequestToken,
    pending: Option<RequestToken>,
}

impl RequestTracker {
    pub fn issue(&mut self) -> RequestToken {
        self.issued += 1;
        self.pending = Some(self.issued);
        self.issued
    }

    /// Whether a response with `token` should be applied. Accepting clears
    /// the pending request.
    pub fn accept(&mut self, token: RequestToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }
}

// ---------------------------------------------------------------------------
// Background loads
// ---------------------------------------------------------------------------

pub enum LoadOutcome {
    Aggregated(Result<TimeSeriesTable, LoadError>),
    Regional(Result<RegionalTable, LoadError>),
}

struct LoadMessage {
    token: RequestToken,
    outcome: LoadOutcome,
}

type Notify = Arc<dyn Fn() + Send + Sync>;

/// Runs each source load on its own thread and hands results back to the
/// UI thread through a channel.
///
/// The two sources are independent: each has its own tracker, and a
/// failure of one never touches the other.
pub struct Loader {
    tx: Sender<LoadMessage>,
    rx: Receiver<LoadMessage>,
    aggregated: RequestTracker,
    regional: RequestTracker,
    notify: Notify,
}

impl Loader {
    /// `notify` runs on the worker thread after each result is sent
    /// (typically a repaint request).
    pub fn new(notify: impl Fn() + Send + Sync + 'static) -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx,
            aggregated: RequestTracker::default(),
            regional: RequestTracker::default(),
            notify: Arc::new(notify),
        }
    }

    /// Start a fresh fetch of the aggregated source.
    pub fn request_aggregated(&mut self, config: &AppConfig) -> RequestToken {
        let token = self.aggregated.issue();
        let base = config.base_path.clone();
        let resource = config.aggregated_file.clone();
        self.spawn(token, move || {
            LoadOutcome::Aggregated(loader::load_table(&base, &resource))
        });
        token
    }

    /// Start a fresh fetch of the regional source.
    pub fn request_regional(&mut self, config: &AppConfig) -> RequestToken {
        let token = self.regional.issue();
        let base: PathBuf = config.base_path.clone();
        let resource = config.regional_file.clone();
        self.spawn(token, move || {
            LoadOutcome::Regional(loader::load_regional(&base, &resource))
        });
        token
    }

    pub fn aggregated_in_flight(&self) -> bool {
        self.aggregated.in_flight()
    }

    pub fn regional_in_flight(&self) -> bool {
        self.regional.in_flight()
    }

    /// Drain finished loads without blocking, dropping stale responses.
    pub fn poll(&mut self) -> Vec<LoadOutcome> {
        let mut fresh = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            if let Some(outcome) = self.accept(msg) {
                fresh.push(outcome);
            }
        }
        fresh
    }

    fn accept(&mut self, msg: LoadMessage) -> Option<LoadOutcome> {
        let (tracker, kind) = match msg.outcome {
            LoadOutcome::Aggregated(_) => (&mut self.aggregated, "aggregated"),
            LoadOutcome::Regional(_) => (&mut self.regional, "regional"),
        };
        if tracker.accept(msg.token) {
            Some(msg.outcome)
        } else {
            log::warn!("Discarding stale {kind} response (request #{})", msg.token);
            None
        }
    }

    fn spawn(&self, token: RequestToken, job: impl FnOnce() -> LoadOutcome + Send + 'static) {
        let tx = self.tx.clone();
        let notify = Arc::clone(&self.notify);
        thread::spawn(move || {
            let outcome = job();
            if tx.send(LoadMessage { token, outcome }).is_ok() {
                notify();
            }
        });
    }

    #[cfg(test)]
    fn wait(&mut self, expected: usize) -> Vec<LoadOutcome> {
        use std::time::Duration;
        let mut fresh = Vec::new();
        for _ in 0..expected {
            let msg = self
                .rx
                .recv_timeout(Duration::from_secs(5))
                .expect("load did not finish");
            fresh.extend(self.accept(msg));
        }
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_newest_token_is_accepted() {
        let mut tracker = RequestTracker::default();
        let first = tracker.issue();
        let second = tracker.issue();
        assert!(tracker.in_flight());
        assert!(!tracker.accept(first));
        assert!(tracker.accept(second));
        assert!(!tracker.in_flight());
        assert!(!tracker.accept(second));
    }

    fn config_in(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            base_path: dir.to_path_buf(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn stale_reload_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("aggregated_states.csv"),
            "date,CA\n2024-01-01,1\n",
        )
        .unwrap();
        let config = config_in(dir.path());

        let mut loader = Loader::new(|| {});
        loader.request_aggregated(&config);
        loader.request_aggregated(&config);
        let fresh = loader.wait(2);
        assert_eq!(fresh.len(), 1);
        assert!(matches!(&fresh[0], LoadOutcome::Aggregated(Ok(t)) if t.len() == 1));
        assert!(!loader.aggregated_in_flight());
    }

    #[test]
    fn sources_fail_independently() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("aggregated_states.csv"),
            "date,CA\n2024-01-01,1\n",
        )
        .unwrap();
        let config = config_in(dir.path());

        let mut loader = Loader::new(|| {});
        loader.request_aggregated(&config);
        loader.request_regional(&config);
        let fresh = loader.wait(2);
        assert_eq!(fresh.len(), 2);
        for outcome in fresh {
            match outcome {
                LoadOutcome::Aggregated(result) => assert!(result.is_ok()),
                LoadOutcome::Regional(result) => {
                    assert!(matches!(result, Err(LoadError::Network { .. })))
                }
            }
        }
    }
}
