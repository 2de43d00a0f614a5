//! Pre-flight checks for bbq
//!
//! Validates system requirements before attempting to load eBPF programs.
//! Provides clear, actionable error messages when requirements aren't met.

#![allow(unsafe_code)] // geteuid() requires unsafe

use anyhow::{bail, Context, Result};
use std::path::Path;

/// `BPF_MAP_TYPE_RINGBUF` landed in Linux 5.8
const MIN_KERNEL_VERSION: (u32, u32) = (5, 8);

/// Run all pre-flight checks before eBPF loading
///
/// # Errors
/// Returns the first failed check
pub fn run_preflight_checks(object: &Path) -> Result<()> {
    check_privileges()?;
    check_kernel_version()?;
    check_object_exists(object)?;
    Ok(())
}

/// Whether the process runs with root privileges
#[must_use]
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Check if running with sufficient privileges for eBPF
fn check_privileges() -> Result<()> {
    if is_root() {
        return Ok(());
    }

    bail!(
        "Permission denied: bbq requires root privileges to load eBPF programs.\n\n\
         Run with: sudo bbq ..."
    );
}

/// Check if the kernel version is sufficient for ring buffers
fn check_kernel_version() -> Result<()> {
    let version_str = std::fs::read_to_string("/proc/version")
        .context("Failed to read kernel version from /proc/version")?;

    let release = version_str.split_whitespace().nth(2).unwrap_or("unknown");

    // Can't parse, assume it's fine
    let Some((major, minor)) = parse_kernel_release(release) else {
        return Ok(());
    };

    if (major, minor) < MIN_KERNEL_VERSION {
        bail!(
            "Kernel version {major}.{minor} is too old.\n\n\
             bbq requires Linux {}.{} or newer for eBPF ring buffer support.\n\
             Current kernel: {release}",
            MIN_KERNEL_VERSION.0,
            MIN_KERNEL_VERSION.1,
        );
    }

    Ok(())
}

/// Parse `major.minor` from a release like "6.1.0-arch1-1"
fn parse_kernel_release(release: &str) -> Option<(u32, u32)> {
    let mut parts = release.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts
        .next()?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok()?;
    Some((major, minor))
}

/// Check if the eBPF object has been built
fn check_object_exists(object: &Path) -> Result<()> {
    if !object.is_file() {
        bail!(
            "eBPF object not found: {}\n\n\
             Build it first with: cargo xtask build-ebpf",
            object.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_version_check() {
        // Don't assert success since test might run on old kernel
        let _ = check_kernel_version();
    }

    #[test]
    fn test_parse_kernel_release() {
        assert_eq!(parse_kernel_release("5.15.0-generic"), Some((5, 15)));
        assert_eq!(parse_kernel_release("6.1.0-arch1-1"), Some((6, 1)));
        assert_eq!(parse_kernel_release("5.8"), Some((5, 8)));
        assert_eq!(parse_kernel_release("6.18rc1"), Some((6, 18)));
        assert_eq!(parse_kernel_release("6"), None);
        assert_eq!(parse_kernel_release("unknown"), None);
    }

    #[test]
    fn test_old_kernel_is_rejected() {
        assert!(parse_kernel_release("4.19.0").unwrap() < MIN_KERNEL_VERSION);
        assert!(parse_kernel_release("5.8.0").unwrap() >= MIN_KERNEL_VERSION);
    }

    #[test]
    fn test_object_not_found() {
        let result = check_object_exists(Path::new("/nonexistent/path/to/bbq"));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("eBPF object not found"));
    }
}
