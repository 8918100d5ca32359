//! Binary program loader.
//!
//! The image is a fixed header followed by five count-prefixed tables and the
//! raw instruction stream. All integers are little-endian:
//!
//! ```text
//! [magic:u32][version:u32][main:u32]
//! [count:u32] strings   {len:u16, bytes}
//! [count:u32] lists     {id:u32, n:u16, n x {tag:u8, payload:u32}}
//! [count:u32] maps      {id:u32, n:u16, n x {tag:u8, payload:u32, tag:u8, payload:u32}}
//! [count:u32] objects   {id:u32, n:u16, n x {prop:u16, tag:u8, payload:u32}}
//! [count:u32] functions {id:u32, args:u16, locals:u16, position:u32}
//! [len:u32]   code bytes
//! ```
//!
//! Loading is all-or-nothing: any failure discards everything decoded so far.

#![allow(clippy::cast_possible_wrap)]

use std::collections::BTreeMap;

use lantern_foundation::{Tag, Value};
use thiserror::Error;
use tracing::debug;

use crate::program::{FunctionDef, ListDef, MapDef, MapRow, ObjectDef, ProgramStore, StringDef};

/// File signature (`"TRPG"` read as a little-endian `u32`).
pub const MAGIC: u32 = 0x4750_5254;

/// The only supported format version.
pub const FORMAT_VERSION: u32 = 0;

/// Reasons a program image can be rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The image does not start with [`MAGIC`].
    #[error("not a valid gamefile (magic {found:#010x})")]
    BadMagic {
        /// The signature that was read.
        found: u32,
    },

    /// The image declares a version other than [`FORMAT_VERSION`].
    #[error("gamefile has format version {found}, but only version {FORMAT_VERSION} is supported")]
    UnsupportedVersion {
        /// The version that was read.
        found: u32,
    },

    /// The image ended in the middle of a field.
    #[error("gamefile truncated in {section} at byte {offset} (needed {needed} more bytes)")]
    Truncated {
        /// Section being decoded.
        section: &'static str,
        /// Offset of the short read.
        offset: usize,
        /// Bytes required by the field.
        needed: usize,
    },

    /// A constant carried a tag byte that names no tag.
    #[error("invalid type tag {byte} at byte {offset}")]
    InvalidTag {
        /// The offending byte.
        byte: u8,
        /// Offset of the byte.
        offset: usize,
    },
}

/// Decodes a program image.
///
/// # Errors
///
/// Returns a [`LoadError`] on bad magic, unsupported version, short input or
/// an unknown tag byte.
pub fn load(bytes: &[u8]) -> Result<ProgramStore, LoadError> {
    let mut reader = Reader::new(bytes);

    reader.section = "header";
    let magic = reader.u32()?;
    if magic != MAGIC {
        return Err(LoadError::BadMagic { found: magic });
    }
    let version = reader.u32()?;
    if version != FORMAT_VERSION {
        return Err(LoadError::UnsupportedVersion { found: version });
    }
    let main_function = reader.u32()? as i32;

    reader.section = "strings";
    let mut strings = BTreeMap::new();
    for index in 0..reader.u32()? {
        let len = usize::from(reader.u16()?);
        let text = String::from_utf8_lossy(reader.bytes(len)?).into_owned();
        let id = index as i32;
        strings.insert(id, StringDef { id, text });
    }

    // Duplicate ids and property ids keep the first entry.
    reader.section = "lists";
    let mut lists = BTreeMap::new();
    for _ in 0..reader.u32()? {
        let id = reader.u32()? as i32;
        let count = reader.u16()?;
        let mut items = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            items.push(reader.value()?);
        }
        lists.entry(id).or_insert(ListDef { id, items });
    }

    reader.section = "maps";
    let mut maps = BTreeMap::new();
    for _ in 0..reader.u32()? {
        let id = reader.u32()? as i32;
        let count = reader.u16()?;
        let mut rows = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let key = reader.value()?;
            let value = reader.value()?;
            rows.push(MapRow { key, value });
        }
        maps.entry(id).or_insert(MapDef { id, rows });
    }

    reader.section = "objects";
    let mut objects = BTreeMap::new();
    for _ in 0..reader.u32()? {
        let id = reader.u32()? as i32;
        let count = reader.u16()?;
        let mut properties = BTreeMap::new();
        for _ in 0..count {
            let property = reader.u16()?;
            let value = reader.value()?;
            properties.entry(property).or_insert(value);
        }
        objects.entry(id).or_insert(ObjectDef { id, properties });
    }

    reader.section = "functions";
    let mut functions = BTreeMap::new();
    for _ in 0..reader.u32()? {
        let id = reader.u32()? as i32;
        let arg_count = reader.u16()?;
        let local_count = reader.u16()?;
        let position = reader.u32()?;
        functions.entry(id).or_insert(FunctionDef {
            id,
            arg_count,
            local_count,
            position,
        });
    }

    reader.section = "code";
    let code_len = reader.u32()? as usize;
    let code = reader.bytes(code_len)?.to_vec();

    debug!(
        strings = strings.len(),
        lists = lists.len(),
        maps = maps.len(),
        objects = objects.len(),
        functions = functions.len(),
        code_len,
        main_function,
        "program loaded"
    );

    Ok(ProgramStore {
        main_function,
        strings,
        lists,
        maps,
        objects,
        functions,
        code,
    })
}

impl ProgramStore {
    /// Decodes a program image; see [`load`].
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the image is malformed.
    pub fn load(bytes: &[u8]) -> Result<Self, LoadError> {
        load(bytes)
    }
}

/// Little-endian cursor over the image.
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
    section: &'static str,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            section: "header",
        }
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8], LoadError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(LoadError::Truncated {
                section: self.section,
                offset: self.offset,
                needed: len,
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, LoadError> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, LoadError> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, LoadError> {
        let b = self.bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads a `{tag:u8, payload:u32}` constant.
    fn value(&mut self) -> Result<Value, LoadError> {
        let offset = self.offset;
        let byte = self.u8()?;
        let tag = Tag::from_u8(byte).ok_or(LoadError::InvalidTag { byte, offset })?;
        let payload = self.u32()? as i32;
        Ok(Value::new(tag, payload))
    }
}
