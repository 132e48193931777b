// src/introspect/pe.rs
//! PE/COFF reader
//!
//! DLLs have no SONAME; the export directory name stands in for it, and the
//! on-disk file name is used when the export directory is missing. Imports
//! are always bound to the DLL they come from.

use super::{BinaryFormat, BinaryInfo, NeededLibrary};
use goblin::pe::PE;

pub(super) fn inspect(content: &[u8], file_name: &str) -> goblin::error::Result<Option<BinaryInfo>> {
    let pe = PE::parse(content)?;

    let mut info = BinaryInfo::executable(BinaryFormat::Pe);
    if pe.is_lib {
        let name = pe
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or(file_name)
            .to_string();
        info.soname = Some(name);

        for export in &pe.exports {
            if let Some(name) = export.name {
                info.exports.insert(name.to_string());
            }
        }
    }

    for lib in &pe.libraries {
        let mut needed = NeededLibrary::new(*lib);
        for import in pe.imports.iter().filter(|i| i.dll.eq_ignore_ascii_case(lib)) {
            // Ordinal-only imports have no name to resolve
            if !import.name.starts_with("ORDINAL ") {
                needed.symbols.insert(import.name.to_string());
            }
        }
        info.needed.push(needed);
    }

    Ok(Some(info))
}
