//! Per-call storage: locals, operand stack and instruction pointer.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

use lantern_foundation::{Error, ErrorKind, Result, Tag, Value};
use lantern_storage::FunctionDef;

/// One active function invocation.
///
/// A frame is owned by the `Vm::call` that created it and dropped on return.
pub(super) struct Frame<'p> {
    pub(super) function: &'p FunctionDef,
    code: &'p [u8],
    locals: Vec<Value>,
    stack: Vec<Value>,
    ip: usize,
}

impl<'p> Frame<'p> {
    /// Creates a frame with zero-filled locals, the first of which are
    /// overwritten by `args`.
    pub(super) fn new(function: &'p FunctionDef, code: &'p [u8], args: Vec<Value>) -> Self {
        let mut locals = vec![Value::integer(0); function.frame_size()];
        for (slot, arg) in locals.iter_mut().zip(args) {
            *slot = arg;
        }
        Self {
            function,
            code,
            locals,
            stack: Vec::new(),
            ip: function.position as usize,
        }
    }

    pub(super) fn ip(&self) -> usize {
        self.ip
    }

    // === Instruction stream ===

    pub(super) fn fetch_u8(&mut self) -> Result<u8> {
        let byte = self.code.get(self.ip).copied().ok_or_else(|| {
            Error::new(ErrorKind::CodeOutOfBounds {
                position: self.ip as i64,
            })
        })?;
        self.ip += 1;
        Ok(byte)
    }

    pub(super) fn fetch_u16(&mut self) -> Result<u16> {
        let lo = self.fetch_u8()?;
        let hi = self.fetch_u8()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    pub(super) fn fetch_u32(&mut self) -> Result<u32> {
        let lo = self.fetch_u16()?;
        let hi = self.fetch_u16()?;
        Ok(u32::from(lo) | (u32::from(hi) << 16))
    }

    pub(super) fn fetch_tag(&mut self) -> Result<Tag> {
        let position = self.ip;
        let byte = self.fetch_u8()?;
        Tag::from_u8(byte).ok_or_else(|| Error::new(ErrorKind::InvalidTag { byte, position }))
    }

    /// Moves the instruction pointer to `target`, relative to the function start.
    pub(super) fn jump(&mut self, target: &Value) -> Result<()> {
        let destination = i64::from(self.function.position) + i64::from(target.payload());
        self.ip = usize::try_from(destination)
            .map_err(|_| Error::new(ErrorKind::CodeOutOfBounds { position: destination }))?;
        Ok(())
    }

    // === Operand stack ===

    pub(super) fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub(super) fn pop(&mut self) -> Result<Value> {
        self.stack.pop().ok_or_else(Error::stack_underflow)
    }

    pub(super) fn top(&self) -> Result<&Value> {
        self.stack.last().ok_or_else(Error::stack_underflow)
    }

    /// Overwrites the top slot.
    pub(super) fn replace_top(&mut self, value: Value) -> Result<()> {
        let top = self.stack.last_mut().ok_or_else(Error::stack_underflow)?;
        *top = value;
        Ok(())
    }

    /// Pops and reads through a `LocalVar`.
    pub(super) fn pop_resolved(&mut self) -> Result<Value> {
        let value = self.pop()?;
        self.resolve(value)
    }

    /// Copies the slot at absolute index `depth`, counted from the bottom.
    pub(super) fn peek_at(&self, depth: i32) -> Result<Value> {
        usize::try_from(depth)
            .ok()
            .and_then(|index| self.stack.get(index))
            .cloned()
            .ok_or_else(|| {
                Error::new(ErrorKind::PeekOutOfRange {
                    depth,
                    size: self.stack.len(),
                })
            })
    }

    pub(super) fn stack_len(&self) -> usize {
        self.stack.len()
    }

    // === Locals ===

    /// Replaces a `LocalVar` with the referenced local's value.
    pub(super) fn resolve(&self, value: Value) -> Result<Value> {
        if !value.is(Tag::LocalVar) {
            return Ok(value);
        }
        let index = value.payload();
        usize::try_from(index)
            .ok()
            .and_then(|slot| self.locals.get(slot))
            .cloned()
            .ok_or_else(|| {
                Error::new(ErrorKind::LocalOutOfRange {
                    index,
                    count: self.locals.len(),
                })
            })
    }

    pub(super) fn store(&mut self, local: &Value, value: Value) -> Result<()> {
        let index = local.payload();
        let count = self.locals.len();
        let slot = usize::try_from(index)
            .ok()
            .and_then(|slot| self.locals.get_mut(slot))
            .ok_or_else(|| Error::new(ErrorKind::StoreOutOfRange { index, count }))?;
        *slot = value;
        Ok(())
    }

    /// The frame's result: the resolved top of stack, or `Integer 0`.
    pub(super) fn return_value(&self) -> Result<Value> {
        match self.stack.last() {
            Some(top) => self.resolve(top.clone()),
            None => Ok(Value::integer(0)),
        }
    }
}
