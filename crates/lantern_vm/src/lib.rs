//! Instruction set and bytecode VM for Lantern.
//!
//! This crate provides:
//! - [`Opcode`] - The instruction set, including reserved opcodes
//! - [`CodeBuilder`] - Emits instruction bytes
//! - [`Vm`] - Stack-based interpreter over a borrowed program store
//! - [`Sink`] - The host boundary used for output and key input

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod opcode;
pub mod vm;

pub use opcode::{CodeBuilder, Opcode};
pub use vm::{BufferSink, Sink, Vm, format_value, run};
