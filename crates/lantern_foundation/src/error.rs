//! Runtime error types for Lantern.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::value::Tag;

/// Result alias used throughout the VM.
pub type Result<T> = std::result::Result<T, Error>;

/// The main runtime error type.
///
/// Every error is fatal to the run that raised it; the context records the
/// call frames it unwound through.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Appends a call frame to this error's context, creating it if needed.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Creates a stack underflow error.
    #[must_use]
    pub fn stack_underflow() -> Self {
        Self::new(ErrorKind::StackUnderflow)
    }

    /// Creates a type mismatch error for a named instruction operand.
    #[must_use]
    pub fn type_mismatch(operand: &'static str, expected: Tag, actual: Tag) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            operand,
            expected,
            actual,
        })
    }

    /// Creates a table lookup failure.
    #[must_use]
    pub fn not_found(table: Table, id: i32) -> Self {
        Self::new(ErrorKind::NotFound { table, id })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// An instruction needed more operands than the stack holds.
    #[error("stack underflow")]
    StackUnderflow,

    /// An instruction operand carried the wrong tag.
    #[error("{operand}: expected value of type {expected}, but found {actual}")]
    TypeMismatch {
        /// Instruction and operand name, e.g. `add/value-1`.
        operand: &'static str,
        /// The tag the instruction requires.
        expected: Tag,
        /// The tag encountered.
        actual: Tag,
    },

    /// Two operands that must share a tag did not.
    #[error("tried to compare values of different types ({left} and {right})")]
    IncomparableTypes {
        /// Tag of the first popped operand.
        left: Tag,
        /// Tag of the second popped operand.
        right: Tag,
    },

    /// A `LocalVar` referenced a slot outside the frame.
    #[error("tried to access non-existent local {index} (frame has {count})")]
    LocalOutOfRange {
        /// The requested slot.
        index: i32,
        /// Number of locals in the frame.
        count: usize,
    },

    /// A store targeted a slot outside the frame.
    #[error("tried to store to non-existent local {index} (frame has {count})")]
    StoreOutOfRange {
        /// The requested slot.
        index: i32,
        /// Number of locals in the frame.
        count: usize,
    },

    /// An id was absent from one of the program tables.
    #[error("tried to access non-existent {table} {id}")]
    NotFound {
        /// The table that was searched.
        table: Table,
        /// The id that was requested.
        id: i32,
    },

    /// `Call` was given something other than a function reference.
    #[error("value type {0} not callable")]
    NotCallable(Tag),

    /// A call supplied more arguments than the callee declares.
    #[error("too many arguments to function {function}: expected at most {expected}, got {actual}")]
    TooManyArguments {
        /// The callee id.
        function: i32,
        /// Declared argument count.
        expected: u16,
        /// Supplied argument count.
        actual: usize,
    },

    /// An undefined or reserved opcode was dispatched.
    #[error("unknown opcode {opcode} at code position {position}")]
    UnknownOpcode {
        /// The opcode byte.
        opcode: u8,
        /// Position of the opcode byte in the instruction stream.
        position: usize,
    },

    /// `StackPeek` asked for a slot the stack does not have.
    #[error("stack-peek: tried to peek beyond bottom of stack (depth {depth}, size {size})")]
    PeekOutOfRange {
        /// The requested depth.
        depth: i32,
        /// Stack size after popping the depth operand.
        size: usize,
    },

    /// An instruction carried a tag byte that names no tag.
    #[error("invalid type tag {byte} at code position {position}")]
    InvalidTag {
        /// The offending byte.
        byte: u8,
        /// Position of the byte in the instruction stream.
        position: usize,
    },

    /// Execution ran off the end of the instruction stream.
    #[error("code position {position} is outside the instruction stream")]
    CodeOutOfBounds {
        /// The position that was read or jumped to.
        position: i64,
    },

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// The host sink failed.
    #[error("io error: {0}")]
    Io(String),
}

/// Program tables addressable by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Table {
    /// The string table.
    String,
    /// The list table.
    List,
    /// The map table.
    Map,
    /// The object table.
    Object,
    /// The function table.
    Function,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::List => "list",
            Self::Map => "map",
            Self::Object => "object",
            Self::Function => "function",
        };
        f.write_str(name)
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source file the program was loaded from.
    pub source: Option<String>,
    /// Call frames unwound, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            writeln!(f, "at {source}")?;
        }
        for frame in &self.stack {
            writeln!(f, "  in {frame}")?;
        }
        Ok(())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(err.to_string()))
    }
}
