//! Program store for Lantern.
//!
//! This crate provides:
//! - [`ProgramStore`] - The decoded, immutable program image
//! - [`load`] - Binary loader with magic/version validation
//! - [`ProgramStore::encode`] - The matching binary writer
//! - [`ProgramBuilder`] - In-memory construction of program images

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builder;
pub mod loader;
pub mod program;
pub mod writer;

pub use builder::ProgramBuilder;
pub use loader::{FORMAT_VERSION, LoadError, MAGIC, load};
pub use program::{FunctionDef, ListDef, MapDef, MapRow, ObjectDef, ProgramStore, StringDef};
pub use writer::EncodeError;
