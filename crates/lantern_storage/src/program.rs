//! Decoded program tables.
//!
//! A [`ProgramStore`] is produced once by the loader (or a
//! [`ProgramBuilder`](crate::ProgramBuilder)) and is only ever read after
//! that. Every call frame borrows the same store.

use std::collections::BTreeMap;

use lantern_foundation::{Error, Result, Table, Value};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A constant string.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StringDef {
    /// Table id (the entry's position in the string table).
    pub id: i32,
    /// The text.
    pub text: String,
}

/// A constant literal list.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ListDef {
    /// Table id.
    pub id: i32,
    /// Items in declaration order.
    pub items: Vec<Value>,
}

impl ListDef {
    /// Returns the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }
}

/// One key/value pair of a [`MapDef`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapRow {
    /// The key.
    pub key: Value,
    /// The associated value.
    pub value: Value,
}

/// A constant association list.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MapDef {
    /// Table id.
    pub id: i32,
    /// Rows in declaration order.
    pub rows: Vec<MapRow>,
}

impl MapDef {
    /// Finds the value for `key`.
    ///
    /// Lookup is a linear scan, so the first declared row wins when keys
    /// repeat.
    #[must_use]
    pub fn lookup(&self, key: &Value) -> Option<&Value> {
        self.rows
            .iter()
            .find(|row| &row.key == key)
            .map(|row| &row.value)
    }
}

/// An object and its property values.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectDef {
    /// Table id.
    pub id: i32,
    /// Property id to value.
    pub properties: BTreeMap<u16, Value>,
}

impl ObjectDef {
    /// Returns the value stored under a property id.
    ///
    /// Ids outside the 16-bit property space are never present.
    #[must_use]
    pub fn property(&self, property: i32) -> Option<&Value> {
        u16::try_from(property)
            .ok()
            .and_then(|key| self.properties.get(&key))
    }
}

/// A function header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FunctionDef {
    /// Table id.
    pub id: i32,
    /// Maximum number of caller-supplied arguments.
    pub arg_count: u16,
    /// Additional scratch locals.
    pub local_count: u16,
    /// Absolute offset of the first instruction in the code stream.
    pub position: u32,
}

impl FunctionDef {
    /// Number of local slots a frame for this function holds.
    #[must_use]
    pub fn frame_size(&self) -> usize {
        usize::from(self.arg_count) + usize::from(self.local_count)
    }
}

/// The decoded program image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProgramStore {
    pub(crate) main_function: i32,
    pub(crate) strings: BTreeMap<i32, StringDef>,
    pub(crate) lists: BTreeMap<i32, ListDef>,
    pub(crate) maps: BTreeMap<i32, MapDef>,
    pub(crate) objects: BTreeMap<i32, ObjectDef>,
    pub(crate) functions: BTreeMap<i32, FunctionDef>,
    pub(crate) code: Vec<u8>,
}

impl ProgramStore {
    /// The entry function id.
    #[must_use]
    pub const fn main_function(&self) -> i32 {
        self.main_function
    }

    /// The flat instruction stream shared by all functions.
    #[must_use]
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Looks up a function header.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no function has this id.
    pub fn function(&self, id: i32) -> Result<&FunctionDef> {
        self.functions
            .get(&id)
            .ok_or_else(|| Error::not_found(Table::Function, id))
    }

    /// Looks up a constant string.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no string has this id.
    pub fn string(&self, id: i32) -> Result<&StringDef> {
        self.strings
            .get(&id)
            .ok_or_else(|| Error::not_found(Table::String, id))
    }

    /// Looks up a constant list.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no list has this id.
    pub fn list(&self, id: i32) -> Result<&ListDef> {
        self.lists
            .get(&id)
            .ok_or_else(|| Error::not_found(Table::List, id))
    }

    /// Looks up a constant map.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no map has this id.
    pub fn map(&self, id: i32) -> Result<&MapDef> {
        self.maps
            .get(&id)
            .ok_or_else(|| Error::not_found(Table::Map, id))
    }

    /// Looks up an object.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no object has this id.
    pub fn object(&self, id: i32) -> Result<&ObjectDef> {
        self.objects
            .get(&id)
            .ok_or_else(|| Error::not_found(Table::Object, id))
    }

    /// All strings in id order.
    pub fn strings(&self) -> impl Iterator<Item = &StringDef> {
        self.strings.values()
    }

    /// All lists in id order.
    pub fn lists(&self) -> impl Iterator<Item = &ListDef> {
        self.lists.values()
    }

    /// All maps in id order.
    pub fn maps(&self) -> impl Iterator<Item = &MapDef> {
        self.maps.values()
    }

    /// All objects in id order.
    pub fn objects(&self) -> impl Iterator<Item = &ObjectDef> {
        self.objects.values()
    }

    /// All function headers in id order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.values()
    }
}
