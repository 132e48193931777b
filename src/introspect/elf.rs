// src/introspect/elf.rs
//! ELF reader
//!
//! Shared objects carry their SONAME in the dynamic section. Objects without
//! one (PIE executables, dlopen plugins) are reported without a SONAME so
//! they never spawn a library package.

use super::{BinaryFormat, BinaryInfo, NeededLibrary};
use goblin::elf::header::{ET_DYN, ET_EXEC};
use goblin::elf::sym::{STB_GLOBAL, STB_WEAK};
use goblin::elf::Elf;

/// Section index of undefined symbols
const SHN_UNDEF: usize = 0;

pub(super) fn inspect(content: &[u8]) -> goblin::error::Result<Option<BinaryInfo>> {
    let elf = Elf::parse(content)?;

    // Relocatable objects and core dumps have no dynamic linking story
    if elf.header.e_type != ET_DYN && elf.header.e_type != ET_EXEC {
        return Ok(None);
    }

    let mut info = BinaryInfo::executable(BinaryFormat::Elf);
    if elf.header.e_type == ET_DYN {
        info.soname = elf.soname.map(str::to_string);
    }

    for lib in &elf.libraries {
        info.needed.push(NeededLibrary::new(*lib));
    }

    for sym in elf.dynsyms.iter() {
        let Some(name) = elf.dynstrtab.get_at(sym.st_name) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }

        let bind = sym.st_bind();
        if sym.st_shndx == SHN_UNDEF {
            // Weak undefined references are optional at run time
            if bind == STB_GLOBAL {
                info.unbound.insert(name.to_string());
            }
        } else if bind == STB_GLOBAL || bind == STB_WEAK {
            info.exports.insert(name.to_string());
        }
    }

    Ok(Some(info))
}
