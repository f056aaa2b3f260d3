//! Pre-flight checks for tally
//!
//! Validates system requirements before attempting to load the image.
//! Provides clear, actionable error messages when requirements aren't met.

#![allow(unsafe_code)] // geteuid() requires unsafe

use anyhow::{bail, Context, Result};
use log::warn;
use object::{Architecture, Object};
use std::path::Path;

/// Tracepoint programs with hash maps need Linux 4.7
const MIN_KERNEL_VERSION: (u32, u32) = (4, 7);

/// Run all pre-flight checks before loading the image
///
/// # Errors
/// Returns the first failed check.
pub fn run_preflight_checks(image_path: &Path) -> Result<()> {
    check_privileges()?;
    check_kernel_version()?;
    check_image_exists(image_path)?;
    check_image_machine(image_path)?;
    Ok(())
}

/// Check if running with sufficient privileges to load and attach programs
fn check_privileges() -> Result<()> {
    if unsafe { libc::geteuid() } == 0 {
        return Ok(());
    }

    // CAP_BPF + CAP_PERFMON would also do on 5.8+, but checking capabilities
    // needs extra dependencies
    bail!(
        "Permission denied: tally requires root privileges to load BPF programs.\n\n\
         Run with: sudo tally ..."
    );
}

fn check_kernel_version() -> Result<()> {
    let version_str = std::fs::read_to_string("/proc/version")
        .context("Failed to read kernel version from /proc/version")?;

    let Some((major, minor)) = parse_kernel_release(&version_str) else {
        // Can't parse, assume it's fine
        return Ok(());
    };

    if (major, minor) < MIN_KERNEL_VERSION {
        bail!(
            "Kernel version {major}.{minor} is too old.\n\n\
             tally requires Linux {}.{} or newer for tracepoint programs.",
            MIN_KERNEL_VERSION.0,
            MIN_KERNEL_VERSION.1,
        );
    }

    Ok(())
}

/// Parse "Linux version 5.15.0-generic ..." into (5, 15).
fn parse_kernel_release(version_str: &str) -> Option<(u32, u32)> {
    let release = version_str.split_whitespace().nth(2)?;
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

fn check_image_exists(image_path: &Path) -> Result<()> {
    if !image_path.exists() {
        bail!(
            "Image not found: {}\n\n\
             Build the BPF object first, or point --image at it.",
            image_path.display()
        );
    }
    if !image_path.is_file() {
        bail!(
            "Not a file: {}\n\n\
             --image must point to a compiled BPF object, not a directory.",
            image_path.display()
        );
    }
    Ok(())
}

/// Warn when the object was not compiled for the BPF target
fn check_image_machine(image_path: &Path) -> Result<()> {
    let data = std::fs::read(image_path)
        .with_context(|| format!("Failed to read image: {}", image_path.display()))?;

    // Not an object file at all: the loader reports that with more detail
    let Ok(obj) = object::File::parse(&*data) else {
        return Ok(());
    };

    if obj.architecture() != Architecture::Bpf {
        warn!(
            "{} targets {:?}, not BPF; loading will likely fail",
            image_path.display(),
            obj.architecture()
        );
    }

    Ok(())
}
