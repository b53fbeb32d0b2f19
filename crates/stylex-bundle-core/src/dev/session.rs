use indexmap::IndexSet;
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::barrier::TransformBarrier;
use crate::extractor::strip_query;
use crate::pipeline::{Pipeline, TransformOutput};
use crate::placement::{count_markers, splice_marker};
use crate::registry::Epoch;
use crate::{Result, StylexError, RESOLVED_VIRTUAL_MODULE_ID, VIRTUAL_MODULE_ID};

/// Reload attempts per target before giving up.
pub const RELOAD_MAX_ATTEMPTS: u32 = 10;

/// Pause between reload attempts while the host is not ready.
pub const RELOAD_RETRY_DELAY: Duration = Duration::from_millis(25);

/// Map the public virtual stylesheet id to its internal form.
pub fn resolve_virtual_id(id: &str) -> Option<&'static str> {
    (strip_query(id) == VIRTUAL_MODULE_ID).then_some(RESOLVED_VIRTUAL_MODULE_ID)
}

/// A module whose served content embeds the stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InvalidationTarget {
    VirtualModule(String),
    Placeholder(String),
}

impl InvalidationTarget {
    pub fn module_id(&self) -> &str {
        match self {
            InvalidationTarget::VirtualModule(id) | InvalidationTarget::Placeholder(id) => id,
        }
    }
}

impl fmt::Display for InvalidationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module_id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Reloaded,
    /// The host has no servable representation of the target yet
    NotReady,
}

/// The host's module graph, as far as the dev protocol needs it.
pub trait HostReloader: Send + Sync {
    /// Drop the host's cached transform result for `target`.
    fn invalidate(&self, target: &InvalidationTarget);

    /// Ask connected clients to reload `target`.
    fn reload(&self, target: &InvalidationTarget) -> ReloadOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolPhase {
    Idle,
    /// Targets are being invalidated and reloaded
    PendingNotify,
}

#[derive(Debug)]
struct ProtocolState {
    phase: ProtocolPhase,
    targets: IndexSet<InvalidationTarget, FxBuildHasher>,
    last_notified: Epoch,
}

/// Dev-server wrapper around a [`Pipeline`].
pub struct DevSession {
    pipeline: Arc<Pipeline>,
    reloader: Arc<dyn HostReloader>,
    barrier: TransformBarrier,
    protocol: Mutex<ProtocolState>,
    /// Serializes notification rounds so overlapping changes coalesce
    notify_lock: tokio::sync::Mutex<()>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl DevSession {
    pub fn new(pipeline: Arc<Pipeline>, reloader: Arc<dyn HostReloader>) -> Self {
        let last_notified = pipeline.epoch();
        Self {
            pipeline,
            reloader,
            barrier: TransformBarrier::new(),
            protocol: Mutex::new(ProtocolState {
                phase: ProtocolPhase::Idle,
                targets: IndexSet::default(),
                last_notified,
            }),
            notify_lock: tokio::sync::Mutex::new(()),
            max_attempts: RELOAD_MAX_ATTEMPTS,
            retry_delay: RELOAD_RETRY_DELAY,
        }
    }

    pub fn with_retry_policy(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    pub fn barrier(&self) -> &TransformBarrier {
        &self.barrier
    }

    pub fn phase(&self) -> ProtocolPhase {
        self.protocol.lock().phase
    }

    pub fn last_notified_epoch(&self) -> Epoch {
        self.protocol.lock().last_notified
    }

    pub fn targets(&self) -> Vec<InvalidationTarget> {
        self.protocol.lock().targets.iter().cloned().collect()
    }

    /// Stop tracking a target (its module was deleted).
    pub fn forget_target(&self, target: &InvalidationTarget) -> bool {
        self.protocol.lock().targets.shift_remove(target)
    }

    /// Transform one module and, if its rules changed, push the new
    /// stylesheet to every target.
    pub async fn on_transform(&self, module_id: &str, source: &str) -> Result<TransformOutput> {
        let output = {
            let _guard = self.barrier.begin();
            self.pipeline.on_transform(module_id, source)?
        };
        if output.rules_changed {
            self.notify().await?;
        }
        Ok(output)
    }

    pub async fn remove_module(&self, module_id: &str) -> Result<bool> {
        let removed = self.pipeline.remove_module(module_id);
        if removed {
            self.notify().await?;
        }
        Ok(removed)
    }

    /// Serve the virtual stylesheet module once pending transforms settle.
    pub async fn load_virtual_module(&self, cancel: &CancellationToken) -> Result<Arc<str>> {
        self.register(InvalidationTarget::VirtualModule(
            RESOLVED_VIRTUAL_MODULE_ID.to_string(),
        ))?;
        self.barrier.wait_idle(cancel).await?;
        self.pipeline.compile_stylesheet()
    }

    /// Serve a CSS module that may carry the placeholder marker.
    ///
    /// Returns `None` for sources without a marker. Otherwise the module is
    /// tracked as a target and the marker is replaced with the stylesheet
    /// once pending transforms settle.
    pub async fn serve_placeholder(
        &self,
        module_id: &str,
        source: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<String>> {
        if count_markers(source) == 0 {
            return Ok(None);
        }
        self.register(InvalidationTarget::Placeholder(module_id.to_string()))?;
        self.barrier.wait_idle(cancel).await?;

        let css = self.pipeline.compile_stylesheet()?;
        splice_marker(module_id, source, &css).map(Some)
    }

    /// Invalidate and reload every target if the registry moved past the
    /// last notified epoch. Returns the number of targets reloaded.
    pub async fn notify(&self) -> Result<usize> {
        let _round = self.notify_lock.lock().await;

        let (epoch, targets) = {
            let mut protocol = self.protocol.lock();
            let epoch = self.pipeline.epoch();
            if epoch == protocol.last_notified {
                return Ok(0);
            }
            protocol.phase = ProtocolPhase::PendingNotify;
            (epoch, protocol.targets.iter().cloned().collect::<Vec<_>>())
        };

        let result = self.reload_all(&targets).await;

        let mut protocol = self.protocol.lock();
        protocol.phase = ProtocolPhase::Idle;
        if result.is_ok() {
            protocol.last_notified = epoch;
            tracing::debug!(%epoch, targets = targets.len(), "stylesheet targets reloaded");
        }
        result.map(|()| targets.len())
    }

    async fn reload_all(&self, targets: &[InvalidationTarget]) -> Result<()> {
        for target in targets {
            self.reloader.invalidate(target);
            self.reload_with_retry(target).await?;
        }
        Ok(())
    }

    async fn reload_with_retry(&self, target: &InvalidationTarget) -> Result<()> {
        for attempt in 1..=self.max_attempts {
            match self.reloader.reload(target) {
                ReloadOutcome::Reloaded => return Ok(()),
                ReloadOutcome::NotReady if attempt < self.max_attempts => {
                    tracing::trace!(%target, attempt, "target not ready, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
                ReloadOutcome::NotReady => {}
            }
        }
        tracing::warn!(%target, attempts = self.max_attempts, "gave up reloading stylesheet target");
        Err(StylexError::ReloadTimeout {
            target: target.to_string(),
            attempts: self.max_attempts,
        })
    }

    fn register(&self, target: InvalidationTarget) -> Result<()> {
        let mut protocol = self.protocol.lock();
        if protocol.targets.contains(&target) {
            return Ok(());
        }

        // Query variants (`root.css?direct`) are the same file; each stays
        // its own target so the host reloads every variant it served.
        if let InvalidationTarget::Placeholder(duplicate) = &target {
            let single = self.pipeline.variant().max_placeholders() == Some(1);
            let file = strip_query(duplicate);
            let existing = protocol.targets.iter().find_map(|t| match t {
                InvalidationTarget::Placeholder(id) if strip_query(id) != file => Some(id),
                _ => None,
            });
            if let (true, Some(existing)) = (single, existing) {
                return Err(StylexError::DuplicatePlaceholder {
                    existing: existing.clone(),
                    duplicate: duplicate.clone(),
                });
            }
        }

        tracing::debug!(%target, "tracking stylesheet target");
        protocol.targets.insert(target);
        Ok(())
    }
}

impl fmt::Debug for DevSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DevSession")
            .field("protocol", &*self.protocol.lock())
            .field("in_flight", &self.barrier.in_flight())
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}
