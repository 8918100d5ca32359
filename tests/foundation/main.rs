//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Tag, Value, and Error.

mod errors;
