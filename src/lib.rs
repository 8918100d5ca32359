//! Lantern - Bytecode VM for compiled interactive fiction
//!
//! This crate re-exports all layers of the Lantern system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: lantern_runtime    — Console sink, CLI, program dump
//! Layer 2: lantern_vm         — Instruction set, stack VM, Sink boundary
//! Layer 1: lantern_storage    — Program store, binary loader and writer
//! Layer 0: lantern_foundation — Core types (Value, Tag, Error)
//! ```

pub use lantern_foundation as foundation;
pub use lantern_runtime as runtime;
pub use lantern_storage as storage;
pub use lantern_vm as vm;
