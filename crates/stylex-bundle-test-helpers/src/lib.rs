//! Shared fakes and fixtures for stylex-bundle tests
//!
//! The real extractor and host bundlers are out of process; these stand-ins
//! let integration tests drive a [`stylex_bundle_core::Pipeline`] end to end.

pub mod extract;
pub mod fixtures;
pub mod host;

/// Route `tracing` output through the test harness.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
