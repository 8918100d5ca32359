//! Stack-based virtual machine for Lantern bytecode.
//!
//! The VM walks the shared instruction stream of a borrowed
//! [`ProgramStore`]. Each call gets its own [`Frame`] (locals, operand stack,
//! instruction pointer); nested `Call` instructions recurse through
//! [`Vm::call`], so the host call stack mirrors the program's call depth.
//!
//! # Host I/O
//!
//! The only observable effects go through a [`Sink`]: `Say` and
//! `SayUnsigned` emit text, `WaitKey` reads a key. Everything else touches
//! only the current frame.
//!
//! # Errors
//!
//! Every runtime error is fatal. As an error unwinds through each call
//! level the VM appends a `function <id> at position <ip>` frame to its
//! [`ErrorContext`](lantern_foundation::ErrorContext), innermost first.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]

mod frame;
mod sink;

pub use sink::{BufferSink, Sink};

use lantern_foundation::{Error, ErrorKind, Result, Tag, Value};
use lantern_storage::ProgramStore;
use tracing::{debug, trace};

use crate::opcode::Opcode;
use frame::Frame;

/// Stack-based virtual machine.
///
/// Borrows the program for its whole lifetime and owns the sink. Pass
/// `&mut sink` to keep the sink after the run.
pub struct Vm<'p, S: Sink> {
    program: &'p ProgramStore,
    sink: S,
    depth: usize,
}

impl<'p, S: Sink> Vm<'p, S> {
    /// Creates a VM over `program` that talks to `sink`.
    pub fn new(program: &'p ProgramStore, sink: S) -> Self {
        Self {
            program,
            sink,
            depth: 0,
        }
    }

    /// Returns the program being executed.
    #[must_use]
    pub fn program(&self) -> &'p ProgramStore {
        self.program
    }

    /// Returns the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the sink mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the VM, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Calls the entry function with no arguments.
    ///
    /// # Errors
    ///
    /// Returns the first runtime error raised anywhere in the call tree.
    pub fn run(&mut self) -> Result<Value> {
        self.call(self.program.main_function(), Vec::new())
    }

    /// Calls function `id` with `args` bound to its first locals.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id, `TooManyArguments` if `args`
    /// exceeds the declared argument count (checked before any instruction
    /// runs), or any error raised while executing the body.
    pub fn call(&mut self, id: i32, args: Vec<Value>) -> Result<Value> {
        let function = self.program.function(id)?;
        if args.len() > usize::from(function.arg_count) {
            return Err(Error::new(ErrorKind::TooManyArguments {
                function: id,
                expected: function.arg_count,
                actual: args.len(),
            }));
        }

        debug!(function = id, depth = self.depth, args = args.len(), "call");
        let mut frame = Frame::new(function, self.program.code(), args);

        self.depth += 1;
        let result = self.execute(&mut frame);
        self.depth -= 1;

        match result {
            Ok(value) => {
                debug!(function = id, depth = self.depth, %value, "return");
                Ok(value)
            }
            Err(err) => {
                Err(err.with_frame(format!("function {id} at position {}", frame.ip())))
            }
        }
    }

    fn execute(&mut self, frame: &mut Frame<'p>) -> Result<Value> {
        loop {
            let position = frame.ip();
            let byte = frame.fetch_u8()?;
            let opcode = Opcode::from_u8(byte).ok_or_else(|| {
                Error::new(ErrorKind::UnknownOpcode {
                    opcode: byte,
                    position,
                })
            })?;

            trace!(
                function = frame.function.id,
                position,
                ?opcode,
                stack = frame.stack_len(),
                "dispatch"
            );

            match opcode {
                Opcode::Return => return frame.return_value(),

                // Push
                Opcode::Push0 => {
                    let tag = frame.fetch_tag()?;
                    frame.push(Value::new(tag, 0));
                }
                Opcode::Push1 => {
                    let tag = frame.fetch_tag()?;
                    frame.push(Value::new(tag, 1));
                }
                Opcode::PushNeg1 => {
                    let tag = frame.fetch_tag()?;
                    frame.push(Value::new(tag, -1));
                }
                Opcode::Push8 => {
                    let tag = frame.fetch_tag()?;
                    let literal = i32::from(frame.fetch_u8()? as i8);
                    frame.push(Value::new(tag, literal));
                }
                Opcode::Push16 => {
                    let tag = frame.fetch_tag()?;
                    let literal = i32::from(frame.fetch_u16()? as i16);
                    frame.push(Value::new(tag, literal));
                }
                Opcode::Push32 => {
                    let tag = frame.fetch_tag()?;
                    let literal = frame.fetch_u32()? as i32;
                    frame.push(Value::new(tag, literal));
                }
                Opcode::Store => {
                    let local = frame.pop()?;
                    let value = frame.pop()?;
                    let local = require("store/local-id", local, Tag::LocalVar)?;
                    frame.store(&local, value)?;
                }

                // Output
                Opcode::Say => {
                    let value = frame.pop_resolved()?;
                    let text = format_value(self.program, &value)?;
                    self.sink.emit(&text)?;
                }
                Opcode::SayUnsigned => {
                    let value = frame.pop_resolved()?;
                    let value = require("say-unsigned/value", value, Tag::Integer)?;
                    self.sink.emit(&(value.payload() as u32).to_string())?;
                }

                // Stack
                Opcode::StackPop => {
                    frame.pop()?;
                }
                Opcode::StackDup => {
                    let top = frame.top()?.clone();
                    frame.push(top);
                }
                Opcode::StackPeek => {
                    let depth = frame.pop()?;
                    let depth = require("stack-peek/depth", depth, Tag::Integer)?;
                    let value = frame.peek_at(depth.payload())?;
                    frame.push(value);
                }
                Opcode::StackSize => {
                    let size = i32::try_from(frame.stack_len()).unwrap_or(i32::MAX);
                    frame.push(Value::integer(size));
                }

                // Calls and objects
                Opcode::Call => {
                    let callee = frame.pop_resolved()?;
                    let arg_count = frame.pop_resolved()?;
                    let arg_count = require("call/arg-count", arg_count, Tag::Integer)?;
                    let mut args = Vec::new();
                    for _ in 0..arg_count.payload() {
                        args.push(frame.pop_resolved()?);
                    }
                    let result = match callee.tag() {
                        Tag::Node => self.call(callee.payload(), args)?,
                        tag @ (Tag::None
                        | Tag::Integer
                        | Tag::String
                        | Tag::List
                        | Tag::Map
                        | Tag::Object
                        | Tag::Property
                        | Tag::LocalVar
                        | Tag::JumpTarget
                        | Tag::Symbol) => return Err(Error::new(ErrorKind::NotCallable(tag))),
                    };
                    frame.push(result);
                }
                Opcode::GetProp => {
                    let object = frame.pop_resolved()?;
                    let property = frame.pop_resolved()?;
                    let object = require("get-prop/object-id", object, Tag::Object)?;
                    let property = require("get-prop/prop-id", property, Tag::Property)?;
                    let value = self
                        .program
                        .object(object.payload())?
                        .property(property.payload())
                        .cloned()
                        .unwrap_or(Value::integer(0));
                    frame.push(value);
                }

                // Comparison
                Opcode::CompareTypes => {
                    let v1 = frame.pop_resolved()?;
                    let v2 = frame.pop_resolved()?;
                    frame.push(Value::integer(i32::from(v1.tag() != v2.tag())));
                }
                Opcode::Compare => {
                    let v1 = frame.pop_resolved()?;
                    let v2 = frame.pop_resolved()?;
                    if v1.tag() != v2.tag() {
                        return Err(Error::new(ErrorKind::IncomparableTypes {
                            left: v1.tag(),
                            right: v2.tag(),
                        }));
                    }
                    frame.push(Value::integer(v2.payload().wrapping_sub(v1.payload())));
                }

                // Jumps
                Opcode::Jump => {
                    let target = frame.pop_resolved()?;
                    let target = require("jmp/target", target, Tag::JumpTarget)?;
                    frame.jump(&target)?;
                }
                Opcode::JumpZero => branch(frame, "jz/target", |n| n == 0)?,
                Opcode::JumpNotZero => branch(frame, "jnz/target", |n| n != 0)?,
                Opcode::JumpLessThan => branch(frame, "jlt/target", |n| n < 0)?,
                Opcode::JumpLessThanEqual => branch(frame, "jlte/target", |n| n <= 0)?,
                Opcode::JumpGreaterThan => branch(frame, "jgt/target", |n| n > 0)?,
                Opcode::JumpGreaterThanEqual => branch(frame, "jgte/target", |n| n >= 0)?,

                // Arithmetic
                Opcode::Add => arithmetic(frame, ["add/value-1", "add/value-2"], |a, b| {
                    Ok(a.wrapping_add(b))
                })?,
                Opcode::Sub => arithmetic(frame, ["sub/value-1", "sub/value-2"], |a, b| {
                    Ok(a.wrapping_sub(b))
                })?,
                Opcode::Mult => arithmetic(frame, ["mult/value-1", "mult/value-2"], |a, b| {
                    Ok(a.wrapping_mul(b))
                })?,
                Opcode::Div => arithmetic(frame, ["div/value-1", "div/value-2"], |a, b| {
                    if b == 0 {
                        Err(Error::new(ErrorKind::DivisionByZero))
                    } else {
                        Ok(a.wrapping_div(b))
                    }
                })?,

                // Input
                Opcode::WaitKey => {
                    let value = match self.sink.read_key()? {
                        Some(key) => Value::integer(u32::from(key) as i32),
                        None => Value::none(),
                    };
                    frame.push(value);
                }

                // Reserved
                Opcode::SayChar
                | Opcode::CallMethod
                | Opcode::SelfRef
                | Opcode::HasProp
                | Opcode::SetProp
                | Opcode::GetItem
                | Opcode::HasItem
                | Opcode::GetSize
                | Opcode::SetItem
                | Opcode::TypeOf => {
                    return Err(Error::new(ErrorKind::UnknownOpcode {
                        opcode: byte,
                        position,
                    }));
                }
            }
        }
    }
}

/// Runs the entry function of `program` against `sink`.
///
/// # Errors
///
/// Returns the first runtime error raised anywhere in the call tree.
pub fn run<S: Sink>(program: &ProgramStore, sink: S) -> Result<Value> {
    Vm::new(program, sink).run()
}

/// Formats a value the way `Say` prints it.
///
/// Strings print their text from the string table, integers their payload,
/// and everything else its bracketed `<Tag payload>` form. Symbols print
/// their payload like any other tag, not their text.
///
/// # Errors
///
/// Returns `NotFound` for a string id absent from the table.
pub fn format_value(program: &ProgramStore, value: &Value) -> Result<String> {
    match value.tag() {
        Tag::String => Ok(program.string(value.payload())?.text.clone()),
        Tag::Integer => Ok(value.payload().to_string()),
        Tag::None
        | Tag::List
        | Tag::Map
        | Tag::Node
        | Tag::Object
        | Tag::Property
        | Tag::LocalVar
        | Tag::JumpTarget => Ok(value.to_string()),
        Tag::Symbol => Ok(format!("<{} {}>", value.tag(), value.payload())),
    }
}

/// Checks an operand's tag, passing it through on success.
fn require(operand: &'static str, value: Value, tag: Tag) -> Result<Value> {
    if value.is(tag) {
        Ok(value)
    } else {
        Err(Error::type_mismatch(operand, tag, value.tag()))
    }
}

/// Conditional jump: pops target then value, branching if `taken(value)`.
fn branch(frame: &mut Frame<'_>, operand: &'static str, taken: fn(i32) -> bool) -> Result<()> {
    let target = frame.pop_resolved()?;
    let value = frame.pop_resolved()?;
    let target = require(operand, target, Tag::JumpTarget)?;
    if taken(value.payload()) {
        frame.jump(&target)?;
    }
    Ok(())
}

/// In-place binary arithmetic: pops `v1`, then overwrites the new top `v2`
/// with `op(v2, v1)`.
fn arithmetic(
    frame: &mut Frame<'_>,
    [first, second]: [&'static str; 2],
    op: impl FnOnce(i32, i32) -> Result<i32>,
) -> Result<()> {
    let v1 = frame.pop()?;
    let v2 = frame.top()?.clone();
    let v1 = require(first, frame.resolve(v1)?, Tag::Integer)?;
    let v2 = require(second, frame.resolve(v2)?, Tag::Integer)?;
    let result = op(v2.payload(), v1.payload())?;
    frame.replace_top(Value::integer(result))
}
