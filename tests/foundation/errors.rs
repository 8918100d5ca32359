//! Integration tests for error types
//!
//! Tests error kinds, messages, and call-frame context.

use lantern_foundation::{Error, ErrorContext, ErrorKind, Table, Tag};

#[test]
fn messages_name_the_operand() {
    let err = Error::type_mismatch("jz/target", Tag::JumpTarget, Tag::Integer);
    assert_eq!(
        err.to_string(),
        "jz/target: expected value of type JumpTarget, but found Integer"
    );
}

#[test]
fn not_found_names_the_table() {
    assert_eq!(
        Error::not_found(Table::Function, 4).to_string(),
        "tried to access non-existent function 4"
    );
    assert_eq!(
        Error::not_found(Table::String, 0).to_string(),
        "tried to access non-existent string 0"
    );
}

#[test]
fn unknown_opcode_message() {
    let err = Error::new(ErrorKind::UnknownOpcode {
        opcode: 22,
        position: 130,
    });
    assert_eq!(err.to_string(), "unknown opcode 22 at code position 130");
}

#[test]
fn not_callable_message() {
    let err = Error::new(ErrorKind::NotCallable(Tag::Object));
    assert_eq!(err.to_string(), "value type Object not callable");
}

#[test]
fn with_frame_creates_context() {
    let err = Error::stack_underflow().with_frame("function 2 at position 7");
    let context = err.context.unwrap();
    assert_eq!(context.source, None);
    assert_eq!(context.stack, vec!["function 2 at position 7".to_string()]);
}

#[test]
fn with_context_replaces_context() {
    let err = Error::stack_underflow()
        .with_frame("function 2 at position 7")
        .with_context(ErrorContext::new().with_source("story.bin"));
    let context = err.context.unwrap();
    assert_eq!(context.source.as_deref(), Some("story.bin"));
    assert!(context.stack.is_empty());
}

#[test]
fn io_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
    let err: Error = io.into();
    assert!(matches!(err.kind, ErrorKind::Io(ref msg) if msg.contains("pipe closed")));
}
