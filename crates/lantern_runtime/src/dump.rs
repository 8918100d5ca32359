//! Human-readable listing of a loaded program.

use std::io::{self, Write};

use lantern_storage::ProgramStore;

/// Writes every table of `program` and a hex dump of its instruction stream.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_dump(program: &ProgramStore, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n## Strings")?;
    for string in program.strings() {
        writeln!(out, "[{}] ~{}~", string.id, string.text)?;
    }

    writeln!(out, "\n## Lists")?;
    for list in program.lists() {
        write!(out, "[{}] {{", list.id)?;
        for item in &list.items {
            write!(out, " {item}")?;
        }
        writeln!(out, " }}")?;
    }

    writeln!(out, "\n## Maps")?;
    for map in program.maps() {
        write!(out, "[{}] {{", map.id)?;
        for row in &map.rows {
            write!(out, " ({}, {})", row.key, row.value)?;
        }
        writeln!(out, " }}")?;
    }

    writeln!(out, "\n## Objects")?;
    for object in program.objects() {
        write!(out, "[{}] {{", object.id)?;
        for (property, value) in &object.properties {
            write!(out, " ({property}, {value})")?;
        }
        writeln!(out, " }}")?;
    }

    writeln!(out, "\n## Function Headers")?;
    for function in program.functions() {
        writeln!(
            out,
            "[{}] args: {} locals: {} position: {}",
            function.id, function.arg_count, function.local_count, function.position
        )?;
    }

    write!(out, "\n## Bytecode")?;
    write_hex(program.code(), out)
}

/// 16 bytes per row, offset first, with a wider gap after the eighth byte.
fn write_hex(bytes: &[u8], out: &mut impl Write) -> io::Result<()> {
    for (i, byte) in bytes.iter().enumerate() {
        if i % 16 == 0 {
            write!(out, "\n{i:04x}  ")?;
        } else if i % 8 == 0 {
            write!(out, "  ")?;
        }
        write!(out, " {byte:02x}")?;
    }
    writeln!(out)
}
