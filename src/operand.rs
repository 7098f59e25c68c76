//! # Operands
//!
//! This module defines how the words following an opcode are interpreted.
//!
//! Every operand word is either a literal value or a register selector:
//!
//! - **0..=32767**: literal value
//! - **32768..=32775**: register r0..r7
//! - **32776..=65535**: invalid in operand position

use std::fmt;

/// Number of general purpose registers.
pub const REGISTER_COUNT: usize = 8;

/// Operand word selecting register r0. Register n is selected by `REGISTER_BASE + n`.
pub const REGISTER_BASE: u16 = 32768;

/// Largest value a register, stack entry or arithmetic result may hold.
pub const MAX_VALUE: u16 = 32767;

/// All arithmetic is reduced modulo this value.
pub const MODULUS: u32 = 32768;

/// Largest word that is valid in operand position (register r7).
pub const MAX_OPERAND_WORD: u16 = REGISTER_BASE + REGISTER_COUNT as u16 - 1;

/// A decoded instruction operand.
///
/// # Examples
///
/// ```
/// use synvm::Operand;
///
/// assert_eq!(Operand::decode(42), Some(Operand::Literal(42)));
/// assert_eq!(Operand::decode(32770), Some(Operand::Register(2)));
/// assert_eq!(Operand::decode(32776), None);
///
/// assert_eq!(Operand::Register(2).to_string(), "r2");
/// assert_eq!(Operand::Literal(42).to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Literal value (0..=32767).
    ///
    /// As a destination, a literal names the memory cell at that address.
    Literal(u16),

    /// Register index (0..=7).
    Register(u8),
}

impl Operand {
    /// Decodes an operand word, returning `None` for words above r7.
    pub fn decode(word: u16) -> Option<Operand> {
        if word <= MAX_VALUE {
            Some(Operand::Literal(word))
        } else if word <= MAX_OPERAND_WORD {
            Some(Operand::Register((word - REGISTER_BASE) as u8))
        } else {
            None
        }
    }

    /// Encodes the operand back into its word representation.
    pub fn encode(self) -> u16 {
        match self {
            Operand::Literal(value) => value,
            Operand::Register(index) => REGISTER_BASE + index as u16,
        }
    }

    /// Returns the literal value, or `None` for registers.
    pub fn literal(self) -> Option<u16> {
        match self {
            Operand::Literal(value) => Some(value),
            Operand::Register(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Literal(value) => write!(f, "{}", value),
            Operand::Register(index) => write!(f, "r{}", index),
        }
    }
}

/// How an instruction interprets one of its operand words.
///
/// The disassembler discovers jump, call and data targets from these roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandRole {
    /// Register (or memory cell, for a literal) receiving the result.
    ///
    /// Examples: the first operand of SET, ADD, POP, IN
    Destination,

    /// Value read through register resolution.
    ///
    /// Examples: PUSH a, OUT a, the condition of JT
    Value,

    /// Address control is transferred to.
    ///
    /// Examples: JMP a, the second operand of JT and JF
    JumpTarget,

    /// Subroutine entry point.
    ///
    /// Example: CALL a
    CallTarget,

    /// Raw memory address read or written.
    ///
    /// Examples: the source of RMEM, the destination of WMEM
    MemoryAddress,
}
