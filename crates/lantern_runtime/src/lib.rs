//! Console host, CLI, and program dump for Lantern.
//!
//! This crate provides:
//! - [`ConsoleSink`] - A [`Sink`](lantern_vm::Sink) over a line editor and a writer
//! - [`LineEditor`] - Line input abstraction, backed by rustyline
//! - [`write_dump`] - Human-readable listing of a loaded program
//! - [`init_logging`] - `tracing` subscriber setup for the CLI

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod console;
pub mod dump;
pub mod editor;
pub mod logging;

pub use console::ConsoleSink;
pub use dump::write_dump;
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use logging::init_logging;
