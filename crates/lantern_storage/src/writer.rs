//! Binary program writer.
//!
//! Produces exactly the layout [`load`](crate::load) reads, so
//! `load(&store.encode()?)` reproduces `store`.

#![allow(clippy::cast_sign_loss)]

use lantern_foundation::Value;
use thiserror::Error;

use crate::loader::{FORMAT_VERSION, MAGIC};
use crate::program::ProgramStore;

/// A store that cannot be represented in the binary format.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A length or count exceeds its field width.
    #[error("{what} has {len} entries, more than the format allows")]
    TooLong {
        /// What overflowed.
        what: &'static str,
        /// The actual length.
        len: usize,
    },
}

impl ProgramStore {
    /// Encodes this store in the binary program format.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] if a table, string, or entry is too long for
    /// its count field.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut out = ByteStream::default();
        out.u32(MAGIC);
        out.u32(FORMAT_VERSION);
        out.u32(self.main_function as u32);

        out.count32("string table", self.strings.len())?;
        for def in self.strings.values() {
            out.count16("string", def.text.len())?;
            out.bytes(def.text.as_bytes());
        }

        out.count32("list table", self.lists.len())?;
        for def in self.lists.values() {
            out.u32(def.id as u32);
            out.count16("list", def.items.len())?;
            for item in &def.items {
                out.value(item);
            }
        }

        out.count32("map table", self.maps.len())?;
        for def in self.maps.values() {
            out.u32(def.id as u32);
            out.count16("map", def.rows.len())?;
            for row in &def.rows {
                out.value(&row.key);
                out.value(&row.value);
            }
        }

        out.count32("object table", self.objects.len())?;
        for def in self.objects.values() {
            out.u32(def.id as u32);
            out.count16("object", def.properties.len())?;
            for (property, value) in &def.properties {
                out.u16(*property);
                out.value(value);
            }
        }

        out.count32("function table", self.functions.len())?;
        for def in self.functions.values() {
            out.u32(def.id as u32);
            out.u16(def.arg_count);
            out.u16(def.local_count);
            out.u32(def.position);
        }

        out.count32("code", self.code.len())?;
        out.bytes(&self.code);

        Ok(out.data)
    }
}

/// Growable little-endian byte sink.
#[derive(Default)]
struct ByteStream {
    data: Vec<u8>,
}

impl ByteStream {
    fn u8(&mut self, value: u8) {
        self.data.push(value);
    }

    fn u16(&mut self, value: u16) {
        self.data.extend(value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.data.extend(value.to_le_bytes());
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    fn value(&mut self, value: &Value) {
        self.u8(value.tag().as_u8());
        self.u32(value.payload() as u32);
    }

    fn count16(&mut self, what: &'static str, len: usize) -> Result<(), EncodeError> {
        let count = u16::try_from(len).map_err(|_| EncodeError::TooLong { what, len })?;
        self.u16(count);
        Ok(())
    }

    fn count32(&mut self, what: &'static str, len: usize) -> Result<(), EncodeError> {
        let count = u32::try_from(len).map_err(|_| EncodeError::TooLong { what, len })?;
        self.u32(count);
        Ok(())
    }
}
