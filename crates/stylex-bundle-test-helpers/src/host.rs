use parking_lot::Mutex;

use stylex_bundle_core::dev::{HostReloader, InvalidationTarget, ReloadOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadEvent {
    Invalidated(InvalidationTarget),
    Reloaded(InvalidationTarget),
    NotReady(InvalidationTarget),
}

/// Host stand-in that records every invalidation and reload request.
///
/// Reloads can be made to report [`ReloadOutcome::NotReady`] a fixed number
/// of times, or forever, to exercise the retry path.
#[derive(Debug)]
pub struct RecordingReloader {
    events: Mutex<Vec<ReloadEvent>>,
    /// `None` means never ready
    not_ready_remaining: Mutex<Option<u32>>,
}

impl Default for RecordingReloader {
    fn default() -> Self {
        Self::not_ready_for(0)
    }
}

impl RecordingReloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `NotReady` for the next `times` reload calls.
    pub fn not_ready_for(times: u32) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            not_ready_remaining: Mutex::new(Some(times)),
        }
    }

    pub fn never_ready() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            not_ready_remaining: Mutex::new(None),
        }
    }

    pub fn events(&self) -> Vec<ReloadEvent> {
        self.events.lock().clone()
    }

    pub fn reloaded(&self) -> Vec<InvalidationTarget> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                ReloadEvent::Reloaded(target) => Some(target.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn reload_attempts(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, ReloadEvent::Reloaded(_) | ReloadEvent::NotReady(_)))
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl HostReloader for RecordingReloader {
    fn invalidate(&self, target: &InvalidationTarget) {
        self.events
            .lock()
            .push(ReloadEvent::Invalidated(target.clone()));
    }

    fn reload(&self, target: &InvalidationTarget) -> ReloadOutcome {
        let ready = {
            let mut remaining = self.not_ready_remaining.lock();
            match remaining.as_mut() {
                None => false,
                Some(0) => true,
                Some(n) => {
                    *n -= 1;
                    false
                }
            }
        };

        let (event, outcome) = if ready {
            (ReloadEvent::Reloaded(target.clone()), ReloadOutcome::Reloaded)
        } else {
            (ReloadEvent::NotReady(target.clone()), ReloadOutcome::NotReady)
        };
        self.events.lock().push(event);
        outcome
    }
}
