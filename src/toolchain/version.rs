//! Version and vendor resolution.

/// Vendor assumed when a requirement does not name one.
///
/// This is also the only vendor the local providers are trusted with.
pub const DEFAULT_VENDOR: &str = "oracle_open_jdk";

/// Reduce a version string to its major version.
///
/// `"17.0.1"` becomes `"17"`, legacy `"1.8"` becomes `"8"`, and a version
/// without a `.` is returned unchanged.
pub fn major_version(version: &str) -> &str {
    match version.split_once('.') {
        None => version,
        Some(_) if version.starts_with("1.") => "8",
        Some((major, _)) => major,
    }
}

/// Resolve the vendor to acquire, substituting [`DEFAULT_VENDOR`] when
/// the requirement names none.
pub fn resolve_vendor(vendor: Option<&str>) -> &str {
    match vendor {
        Some(v) if !v.is_empty() => v,
        _ => {
            tracing::info!("No vendor specified, using default: {}", DEFAULT_VENDOR);
            DEFAULT_VENDOR
        }
    }
}

/// Whether `vendor` is the default vendor.
pub fn is_default_vendor(vendor: &str) -> bool {
    vendor.eq_ignore_ascii_case(DEFAULT_VENDOR)
}
