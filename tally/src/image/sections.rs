//! Attach-section discovery
//!
//! The loader does not keep the ELF section a program was compiled into, so
//! it is read straight from the object: every global function symbol outside
//! `.text` is a program, and its section name is the attach section.

use object::{Object, ObjectSection, ObjectSymbol, SymbolKind, SymbolSection};
use std::collections::BTreeMap;

/// Sub-programs (BPF-to-BPF calls) live here and are not attachable.
const SUBPROGRAM_SECTION: &str = ".text";

/// Map each program name in the object to its attach section.
///
/// # Errors
/// Returns an error if `data` is not a parseable object file.
pub fn program_sections(data: &[u8]) -> Result<BTreeMap<String, String>, object::Error> {
    let file = object::File::parse(data)?;
    let mut sections = BTreeMap::new();

    for symbol in file.symbols() {
        if symbol.kind() != SymbolKind::Text || !symbol.is_global() {
            continue;
        }
        let SymbolSection::Section(index) = symbol.section() else {
            continue;
        };
        let Ok(section) = file.section_by_index(index) else {
            continue;
        };
        let (Ok(section_name), Ok(name)) = (section.name(), symbol.name()) else {
            continue;
        };
        if section_name == SUBPROGRAM_SECTION || name.is_empty() {
            continue;
        }
        sections.insert(name.to_string(), section_name.to_string());
    }

    Ok(sections)
}
