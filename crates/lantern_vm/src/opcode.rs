//! Bytecode instruction set for the Lantern VM.
//!
//! The VM is stack-based. Most operations consume operands from the stack
//! and push results back. Push instructions are the only ones with inline
//! operands: a tag byte followed by an optional little-endian literal.

#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use lantern_foundation::Tag;

/// A single instruction opcode.
///
/// Starred entries in the comments are reserved: they decode, but the VM
/// rejects them as unknown when dispatched.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    // === Control ===
    /// Return top of stack, or `Integer 0` when empty.
    Return = 0,

    // === Push (inline tag byte, then literal) ===
    /// Push `{tag, 0}`.
    Push0 = 1,
    /// Push `{tag, 1}`.
    Push1 = 2,
    /// Push `{tag, -1}`.
    PushNeg1 = 3,
    /// Push `{tag, i8}` sign-extended.
    Push8 = 4,
    /// Push `{tag, i16}` sign-extended.
    Push16 = 5,
    /// Push `{tag, i32}`.
    Push32 = 6,
    /// Store: `[value, local] -> []`
    Store = 7,

    // === Output ===
    /// Say: `[value] -> []`
    Say = 10,
    /// Say as unsigned: `[int] -> []`
    SayUnsigned = 11,
    /// * Say a single character.
    SayChar = 12,

    // === Stack ===
    /// Pop and discard the top of stack.
    StackPop = 13,
    /// Duplicate the top of stack.
    StackDup = 14,
    /// Copy the slot at an absolute depth: `[depth] -> [value]`
    StackPeek = 15,
    /// Push the current stack depth.
    StackSize = 16,

    // === Calls and objects ===
    /// Call: `[args.., arg_count, function] -> [result]`
    Call = 17,
    /// * Call an object property as a function.
    CallMethod = 18,
    /// * Object the current function is a property of.
    SelfRef = 19,
    /// Get property: `[prop, object] -> [value]`
    GetProp = 20,
    /// * Check whether a property is set.
    HasProp = 21,
    /// * Set a property.
    SetProp = 22,
    /// * Get a list item or map value.
    GetItem = 23,
    /// * Check whether a list index or map key exists.
    HasItem = 24,
    /// * Size of a list or map.
    GetSize = 25,
    /// * Set a list item or map value.
    SetItem = 26,
    /// * Type tag of a value.
    TypeOf = 27,

    // === Comparison ===
    /// `[v2, v1] -> [Integer(tags differ)]`
    CompareTypes = 30,
    /// `[v2, v1] -> [Integer(v2 - v1)]`
    Compare = 31,

    // === Jumps (targets are relative to the function start) ===
    /// Unconditional jump: `[target] -> []`
    Jump = 32,
    /// Jump if value == 0: `[value, target] -> []`
    JumpZero = 33,
    /// Jump if value != 0.
    JumpNotZero = 34,
    /// Jump if value < 0.
    JumpLessThan = 35,
    /// Jump if value <= 0.
    JumpLessThanEqual = 36,
    /// Jump if value > 0.
    JumpGreaterThan = 37,
    /// Jump if value >= 0.
    JumpGreaterThanEqual = 38,

    // === Arithmetic (result replaces the second-from-top slot) ===
    /// `[a, b] -> [a + b]`
    Add = 40,
    /// `[a, b] -> [a - b]`
    Sub = 41,
    /// `[a, b] -> [a * b]`
    Mult = 42,
    /// `[a, b] -> [a / b]`
    Div = 43,

    // === Input ===
    /// Block for one key: `[] -> [Integer(code) | None]`
    WaitKey = 50,
}

impl Opcode {
    /// Decodes an opcode byte.
    #[must_use]
    pub const fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Self::Return,
            1 => Self::Push0,
            2 => Self::Push1,
            3 => Self::PushNeg1,
            4 => Self::Push8,
            5 => Self::Push16,
            6 => Self::Push32,
            7 => Self::Store,
            10 => Self::Say,
            11 => Self::SayUnsigned,
            12 => Self::SayChar,
            13 => Self::StackPop,
            14 => Self::StackDup,
            15 => Self::StackPeek,
            16 => Self::StackSize,
            17 => Self::Call,
            18 => Self::CallMethod,
            19 => Self::SelfRef,
            20 => Self::GetProp,
            21 => Self::HasProp,
            22 => Self::SetProp,
            23 => Self::GetItem,
            24 => Self::HasItem,
            25 => Self::GetSize,
            26 => Self::SetItem,
            27 => Self::TypeOf,
            30 => Self::CompareTypes,
            31 => Self::Compare,
            32 => Self::Jump,
            33 => Self::JumpZero,
            34 => Self::JumpNotZero,
            35 => Self::JumpLessThan,
            36 => Self::JumpLessThanEqual,
            37 => Self::JumpGreaterThan,
            38 => Self::JumpGreaterThanEqual,
            40 => Self::Add,
            41 => Self::Sub,
            42 => Self::Mult,
            43 => Self::Div,
            50 => Self::WaitKey,
            _ => return None,
        })
    }

    /// Returns the opcode byte.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns true for opcodes that are declared but have no handler.
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        matches!(
            self,
            Self::SayChar
                | Self::CallMethod
                | Self::SelfRef
                | Self::HasProp
                | Self::SetProp
                | Self::GetItem
                | Self::HasItem
                | Self::GetSize
                | Self::SetItem
                | Self::TypeOf
        )
    }
}

/// Emits instruction bytes for one function body.
///
/// Positions reported by [`CodeBuilder::position`] are relative to the start
/// of the builder, which is how jump targets are expressed when each function
/// body is built separately.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeBuilder {
    code: Vec<u8>,
}

impl CodeBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the offset the next instruction will be written at.
    #[must_use]
    pub fn position(&self) -> usize {
        self.code.len()
    }

    /// Emits an opcode with no inline operands.
    pub fn op(&mut self, opcode: Opcode) -> &mut Self {
        self.code.push(opcode.as_u8());
        self
    }

    /// Emits the shortest push instruction for `{tag, literal}`.
    pub fn push(&mut self, tag: Tag, literal: i32) -> &mut Self {
        match literal {
            0 => self.op(Opcode::Push0).raw(tag.as_u8()),
            1 => self.op(Opcode::Push1).raw(tag.as_u8()),
            -1 => self.op(Opcode::PushNeg1).raw(tag.as_u8()),
            n if i8::try_from(n).is_ok() => self.op(Opcode::Push8).raw(tag.as_u8()).raw(n as u8),
            n if i16::try_from(n).is_ok() => {
                self.op(Opcode::Push16).raw(tag.as_u8()).raw_u16(n as u16)
            }
            n => self.push_wide(tag, n),
        }
    }

    /// Emits a `Push32` regardless of the literal's size.
    ///
    /// Useful for jump targets that are patched after the body is laid out.
    pub fn push_wide(&mut self, tag: Tag, literal: i32) -> &mut Self {
        self.op(Opcode::Push32)
            .raw(tag.as_u8())
            .raw_u32(literal as u32)
    }

    /// Overwrites the 32-bit literal of a `Push32` emitted at `at`.
    ///
    /// # Panics
    ///
    /// Panics if no `Push32` was emitted at `at`.
    pub fn patch_wide(&mut self, at: usize, literal: i32) {
        assert_eq!(
            self.code.get(at).copied(),
            Some(Opcode::Push32.as_u8()),
            "cannot patch non-Push32 instruction at {at}"
        );
        self.code[at + 2..at + 6].copy_from_slice(&literal.to_le_bytes());
    }

    /// Emits a raw byte.
    pub fn raw(&mut self, byte: u8) -> &mut Self {
        self.code.push(byte);
        self
    }

    /// Emits a raw little-endian `u16`.
    pub fn raw_u16(&mut self, value: u16) -> &mut Self {
        self.code.extend(value.to_le_bytes());
        self
    }

    /// Emits a raw little-endian `u32`.
    pub fn raw_u32(&mut self, value: u32) -> &mut Self {
        self.code.extend(value.to_le_bytes());
        self
    }

    /// Returns the emitted bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.code
    }

    /// Takes the emitted bytes, leaving the builder empty.
    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.code)
    }
}
