//! Integration tests for Layer 1: Storage
//!
//! Tests for the program store, binary loader, and writer.

mod loading;
