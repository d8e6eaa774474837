/// Tablemap - schema-driven SQL mutations and NULL-safe row mapping
///
/// This is the root crate that provides workspace-level documentation.
/// The implementation lives in the `tablemap-core` subcrate and is
/// re-exported here.
pub use tablemap_core::*;

/// Returns the version of the package.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
