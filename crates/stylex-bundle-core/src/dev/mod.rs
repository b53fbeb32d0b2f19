//! Dev-server support
//!
//! During development the host transforms modules one at a time, out of
//! order, and serves the stylesheet on request. [`DevSession`] wraps a
//! [`crate::Pipeline`] so that:
//!
//! - stylesheet requests wait for in-flight transforms ([`TransformBarrier`]),
//! - every registry change invalidates and reloads each module that embeds
//!   the stylesheet ([`HostReloader`]),
//! - repeated transforms of unchanged code trigger nothing.

mod barrier;
mod session;

pub use barrier::{TransformBarrier, TransformGuard};
pub use session::{
    resolve_virtual_id, DevSession, HostReloader, InvalidationTarget, ProtocolPhase,
    ReloadOutcome, RELOAD_MAX_ATTEMPTS, RELOAD_RETRY_DELAY,
};
