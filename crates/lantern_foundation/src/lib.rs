//! Core types for Lantern.
//!
//! This crate provides:
//! - [`Value`] - The tagged scalar every instruction operates on
//! - [`Tag`] - The closed set of value type tags
//! - [`Error`] - Runtime errors with call-frame context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod value;

pub use error::{Error, ErrorContext, ErrorKind, Result, Table};
pub use value::{Tag, Value};
