//! Compile-time build information, shown by `trophies --version`.

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// One-line version string: crate version, build date and short commit.
pub fn version_line() -> String {
    format!(
        "trophies {} ({} {})",
        env!("CARGO_PKG_VERSION"),
        BUILD_DATE,
        BUILD_COMMIT
    )
}
