use semver::Version;

use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics};

/// Version of the extractor this integration was built against.
pub const SUPPORTED_EXTRACTOR_VERSION: &str = "0.9.3";

/// Warn (once per session) when the installed extractor's major/minor
/// version differs from `expected`. Unparseable versions are reported too.
///
/// Returns whether the versions are compatible.
pub fn check_extractor_version(expected: &str, installed: &str, diagnostics: &Diagnostics) -> bool {
    let compatible = match (Version::parse(expected), Version::parse(installed)) {
        (Ok(expected), Ok(installed)) => {
            expected.major == installed.major && expected.minor == installed.minor
        }
        _ => false,
    };

    if !compatible {
        diagnostics.report_once(Diagnostic::warning(
            DiagnosticCode::VersionMismatch,
            format!(
                "extractor version {installed} does not match the supported version {expected}; \
                 generated styles may be inconsistent"
            ),
        ));
    }
    compatible
}
