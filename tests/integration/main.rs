//! Cross-layer integration tests
//!
//! Programs go through the whole pipeline: build, encode, write to disk,
//! load, and run against the console sink.

mod game_file;
