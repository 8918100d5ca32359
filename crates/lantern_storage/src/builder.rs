//! In-memory construction of program images.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

use std::collections::BTreeMap;

use lantern_foundation::Value;

use crate::program::{FunctionDef, ListDef, MapDef, MapRow, ObjectDef, ProgramStore, StringDef};

/// Assembles a [`ProgramStore`] without going through the binary format.
///
/// Strings are numbered in insertion order, matching how the loader assigns
/// string ids. Every other table takes explicit ids; re-using an id replaces
/// the earlier entry.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    store: ProgramStore,
}

impl ProgramBuilder {
    /// Creates an empty builder whose entry function is id 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entry function id.
    pub fn main_function(&mut self, id: i32) -> &mut Self {
        self.store.main_function = id;
        self
    }

    /// Adds a string and returns its id.
    pub fn string(&mut self, text: impl Into<String>) -> i32 {
        let id = self.store.strings.len() as i32;
        self.store.strings.insert(
            id,
            StringDef {
                id,
                text: text.into(),
            },
        );
        id
    }

    /// Adds a constant list.
    pub fn list(&mut self, id: i32, items: Vec<Value>) -> &mut Self {
        self.store.lists.insert(id, ListDef { id, items });
        self
    }

    /// Adds a constant map from `(key, value)` rows.
    pub fn map(&mut self, id: i32, rows: Vec<(Value, Value)>) -> &mut Self {
        let rows = rows
            .into_iter()
            .map(|(key, value)| MapRow { key, value })
            .collect();
        self.store.maps.insert(id, MapDef { id, rows });
        self
    }

    /// Adds an object.
    pub fn object(&mut self, id: i32, properties: BTreeMap<u16, Value>) -> &mut Self {
        self.store.objects.insert(id, ObjectDef { id, properties });
        self
    }

    /// Adds a function header.
    pub fn function(&mut self, id: i32, arg_count: u16, local_count: u16, position: u32) -> &mut Self {
        self.store.functions.insert(
            id,
            FunctionDef {
                id,
                arg_count,
                local_count,
                position,
            },
        );
        self
    }

    /// Sets the instruction stream.
    pub fn code(&mut self, code: Vec<u8>) -> &mut Self {
        self.store.code = code;
        self
    }

    /// Returns the current length of the instruction stream.
    #[must_use]
    pub fn code_len(&self) -> usize {
        self.store.code.len()
    }

    /// Appends a function body to the instruction stream and registers its
    /// header at the current end of the stream.
    pub fn function_body(
        &mut self,
        id: i32,
        arg_count: u16,
        local_count: u16,
        body: &[u8],
    ) -> &mut Self {
        let position = self.store.code.len() as u32;
        self.store.code.extend_from_slice(body);
        self.function(id, arg_count, local_count, position)
    }

    /// Finishes the store, leaving the builder empty.
    pub fn build(&mut self) -> ProgramStore {
        std::mem::take(&mut self.store)
    }
}
