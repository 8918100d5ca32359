//! Integration tests for Layer 2: VM
//!
//! Tests for whole programs run through the VM.

mod programs;
