//! # Program and Table Resolution
//!
//! Picks the one program to attach and the one table to poll from a
//! [`Catalog`], honouring whatever the user pinned down and filling in the
//! rest deterministically.
//!
//! Catalog order is meaningless (it mirrors hash map iteration inside the
//! loader), so every heuristic below chooses by smallest name, never by
//! first-seen.
//!
//! ## Program
//! 1. `--program` given: must exist.
//! 2. Otherwise the smallest name among tracepoint programs
//!    (`tracepoint/...` or `tp/...` sections).
//! 3. Otherwise the smallest name overall.
//!
//! ## Attach point
//! Both `--tp-category` and `--tp-name`, or neither. With neither, the point
//! is parsed from the section string `prefix/category/name`.
//!
//! ## Table
//! 1. `--map` given: must exist.
//! 2. Otherwise the smallest hash-family table, then the smallest of any kind.

use log::{debug, info};

use crate::domain::{AttachPoint, SetupError};
use crate::image::{Catalog, ProgramInfo, TableInfo};

/// Section prefixes marking a tracepoint program.
pub const TRACEPOINT_PREFIXES: [&str; 2] = ["tracepoint/", "tp/"];

/// User-supplied pins. `None` means "work it out".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub program: Option<String>,
    pub table: Option<String>,
    pub category: Option<String>,
    pub entry: Option<String>,
}

/// Outcome of resolution: what to attach, where, and what to poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub program: ProgramInfo,
    pub attach_point: AttachPoint,
    pub table: TableInfo,
}

/// Resolve program, attach point and table in one go.
///
/// # Errors
/// `NotFound` for missing or un-inferable pieces, `ConfigConflict` for a
/// half-specified attach point.
pub fn resolve(catalog: &Catalog, overrides: &Overrides) -> Result<Selection, SetupError> {
    let program = select_program(catalog, overrides.program.as_deref())?;
    let attach_point =
        resolve_attach_point(program, overrides.category.as_deref(), overrides.entry.as_deref())?;
    let table = select_table(catalog, overrides.table.as_deref())?;

    info!(
        "Selected program {} ({}) at {attach_point}, table {}",
        program.name,
        if program.section.is_empty() { "no section" } else { program.section.as_str() },
        table.name
    );

    Ok(Selection { program: program.clone(), attach_point, table: table.clone() })
}

/// # Errors
/// `NotFound` when the named program is absent or the image has none.
pub fn select_program<'c>(
    catalog: &'c Catalog,
    explicit: Option<&str>,
) -> Result<&'c ProgramInfo, SetupError> {
    if let Some(name) = explicit {
        return catalog
            .programs
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| SetupError::NotFound(format!("program '{name}'")));
    }

    let smallest_tracepoint = catalog
        .programs
        .iter()
        .filter(|p| is_tracepoint_section(&p.section))
        .min_by(|a, b| a.name.cmp(&b.name));
    if let Some(program) = smallest_tracepoint {
        return Ok(program);
    }

    let fallback = catalog
        .programs
        .iter()
        .min_by(|a, b| a.name.cmp(&b.name))
        .ok_or_else(|| SetupError::NotFound("program (image contains none)".to_string()))?;
    debug!("No tracepoint program in image, falling back to {}", fallback.name);
    Ok(fallback)
}

/// # Errors
/// `ConfigConflict` when exactly one of `category`/`entry` is given,
/// `NotFound` when neither is given and the section cannot be parsed.
pub fn resolve_attach_point(
    program: &ProgramInfo,
    category: Option<&str>,
    entry: Option<&str>,
) -> Result<AttachPoint, SetupError> {
    match (category, entry) {
        (Some(category), Some(entry)) => Ok(AttachPoint::new(category, entry)),
        (Some(_), None) | (None, Some(_)) => Err(SetupError::ConfigConflict(
            "--tp-category and --tp-name must be given together".to_string(),
        )),
        (None, None) => parse_section(&program.section).ok_or_else(|| {
            SetupError::NotFound(format!(
                "attach point for program '{}' (cannot infer from section '{}')",
                program.name, program.section
            ))
        }),
    }
}

/// # Errors
/// `NotFound` when the named table is absent or the image has none.
pub fn select_table<'c>(
    catalog: &'c Catalog,
    explicit: Option<&str>,
) -> Result<&'c TableInfo, SetupError> {
    if let Some(name) = explicit {
        return catalog
            .tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| SetupError::NotFound(format!("table '{name}'")));
    }

    let smallest_hash = catalog
        .tables
        .iter()
        .filter(|t| t.kind.is_hash_family())
        .min_by(|a, b| a.name.cmp(&b.name));
    if let Some(table) = smallest_hash {
        return Ok(table);
    }

    let fallback = catalog
        .tables
        .iter()
        .min_by(|a, b| a.name.cmp(&b.name))
        .ok_or_else(|| SetupError::NotFound("table (image contains none)".to_string()))?;
    debug!("No hash table in image, falling back to {} ({:?})", fallback.name, fallback.kind);
    Ok(fallback)
}

/// Parse `prefix/category/name` into an attach point.
///
/// Exactly three non-empty segments are required.
#[must_use]
pub fn parse_section(section: &str) -> Option<AttachPoint> {
    let mut parts = section.split('/');
    let (Some(prefix), Some(category), Some(name), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    if prefix.is_empty() || category.is_empty() || name.is_empty() {
        return None;
    }
    Some(AttachPoint::new(category, name))
}

fn is_tracepoint_section(section: &str) -> bool {
    TRACEPOINT_PREFIXES.iter().any(|prefix| section.starts_with(prefix))
}
