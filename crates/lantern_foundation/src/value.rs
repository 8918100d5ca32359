//! Tagged scalar values.
//!
//! Every instruction operates on a [`Value`]: a [`Tag`] plus a 32-bit signed
//! payload. The payload is an id into one of the program's tables for most
//! tags; only [`Tag::Symbol`] carries text of its own.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type tag of a [`Value`].
///
/// The discriminants are the tag bytes used by the binary program format and
/// by the push instructions, so the set is closed.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Tag {
    /// Absence of a value.
    None = 0,
    /// Plain integer; the payload is the number.
    Integer = 1,
    /// Payload is a string-table id.
    String = 2,
    /// Payload is a list-table id.
    List = 3,
    /// Payload is a map-table id.
    Map = 4,
    /// Payload is a function id (a callable reference).
    Node = 5,
    /// Payload is an object id.
    Object = 6,
    /// Payload is a property id.
    Property = 7,
    /// Payload is an index into the current frame's locals.
    LocalVar = 8,
    /// Payload is a byte offset from the owning function's start.
    JumpTarget = 9,
    /// Literal symbol; the text lives in [`Value::text`].
    Symbol = 99,
}

impl Tag {
    /// Every tag, in wire-code order.
    pub const ALL: [Tag; 11] = [
        Tag::None,
        Tag::Integer,
        Tag::String,
        Tag::List,
        Tag::Map,
        Tag::Node,
        Tag::Object,
        Tag::Property,
        Tag::LocalVar,
        Tag::JumpTarget,
        Tag::Symbol,
    ];

    /// Decodes a tag byte.
    #[must_use]
    pub const fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::None),
            1 => Some(Self::Integer),
            2 => Some(Self::String),
            3 => Some(Self::List),
            4 => Some(Self::Map),
            5 => Some(Self::Node),
            6 => Some(Self::Object),
            7 => Some(Self::Property),
            8 => Some(Self::LocalVar),
            9 => Some(Self::JumpTarget),
            99 => Some(Self::Symbol),
            _ => None,
        }
    }

    /// Returns the wire byte for this tag.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns the display name of this tag.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Integer => "Integer",
            Self::String => "String",
            Self::List => "List",
            Self::Map => "Map",
            Self::Node => "Node",
            Self::Object => "Object",
            Self::Property => "Property",
            Self::LocalVar => "LocalVar",
            Self::JumpTarget => "JumpTarget",
            Self::Symbol => "Symbol",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A tagged scalar.
///
/// Values are small and cheaply cloneable; symbol text is shared.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Value {
    tag: Tag,
    payload: i32,
    text: Option<Arc<str>>,
}

impl Value {
    /// Creates a value from a tag and payload.
    #[must_use]
    pub const fn new(tag: Tag, payload: i32) -> Self {
        Self {
            tag,
            payload,
            text: None,
        }
    }

    /// The `None` value.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(Tag::None, 0)
    }

    /// An `Integer` value.
    #[must_use]
    pub const fn integer(n: i32) -> Self {
        Self::new(Tag::Integer, n)
    }

    /// A `Symbol` value carrying its literal text.
    #[must_use]
    pub fn symbol(text: impl Into<Arc<str>>) -> Self {
        Self {
            tag: Tag::Symbol,
            payload: 0,
            text: Some(text.into()),
        }
    }

    /// Returns the type tag.
    #[must_use]
    pub const fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the raw payload.
    #[must_use]
    pub const fn payload(&self) -> i32 {
        self.payload
    }

    /// Returns the symbol text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns true if this is the `None` value.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self.tag, Tag::None)
    }

    /// Returns true if the value carries the given tag.
    #[must_use]
    pub fn is(&self, tag: Tag) -> bool {
        self.tag == tag
    }

    /// Attempts to extract an integer.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i32> {
        match self.tag {
            Tag::Integer => Some(self.payload),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::none()
    }
}

// Symbols compare by text; their payload carries nothing.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.payload == other.payload
            && (self.tag != Tag::Symbol || self.text == other.text)
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
        self.payload.hash(state);
        if self.tag == Tag::Symbol {
            self.text.hash(state);
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Tag::None => write!(f, "<None>"),
            Tag::Symbol => write!(f, "<Symbol ~{}~>", self.text().unwrap_or_default()),
            tag => write!(f, "<{tag} {}>", self.payload),
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::integer(n)
    }
}
