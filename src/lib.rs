//! # synvm
//!
//! A virtual machine for a fixed 22-opcode, 15-bit word instruction set,
//! together with its toolchain:
//!
//! - an **interpreter** ([`Machine`]) executing one instruction per
//!   [`Machine::step`] call under host control,
//! - a **two-pass assembler** ([`assemble`]) compiling symbolic source into
//!   the binary word stream,
//! - a **heuristic disassembler** ([`disassemble`]) reconstructing annotated
//!   source from the memory of a loaded machine.
//!
//! ## Quick Start
//!
//! ```rust
//! use synvm::{assemble, Interrupt, Machine};
//!
//! let output = assemble("SET r0 1\nADD r0 r0 1\nOUT r0\nHALT").unwrap();
//! let mut machine = Machine::from_bytes(&output.bytes).unwrap();
//!
//! assert_eq!(machine.step(), Ok(Interrupt::None));
//! assert_eq!(machine.step(), Ok(Interrupt::None));
//! assert_eq!(machine.step(), Ok(Interrupt::Output(2)));
//! assert_eq!(machine.step(), Ok(Interrupt::Halt));
//! assert_eq!(machine.registers()[0], 2);
//! ```
//!
//! ## Blocking I/O
//!
//! The machine never blocks. Character output is returned as
//! [`Interrupt::Output`]; an `IN` instruction suspends with
//! [`Interrupt::Input`] until the host supplies a value through
//! [`Machine::resolve`], after which the next `step()` completes it.
//!
//! ## Modules
//!
//! - `opcodes` - Opcode metadata table shared by every component
//! - `operand` - Operand encoding (literal vs. register)
//! - `memory` - Flat word memory and the binary program codec
//! - `cpu` - Machine state, step loop, inspection and editing
//! - `assembler` - Source text to bytecode
//! - `disassembler` - Memory to annotated source text

pub mod assembler;
pub mod cpu;
pub mod disassembler;
pub mod memory;
pub mod opcodes;
pub mod operand;

// Internal instruction implementations (not part of public API)
mod instructions;

// WebAssembly bindings (only compiled with the "wasm" feature)
pub mod wasm;

// Re-export public API
pub use assembler::{assemble, AssemblerError, AssemblerOutput, ErrorType, Symbol, SymbolKind};
pub use cpu::{Interrupt, Machine};
pub use disassembler::{disassemble, DisassemblyOptions, Instruction};
pub use memory::{decode_words, encode_words, FlatMemory, MEMORY_SIZE};
pub use opcodes::{lookup_mnemonic, lookup_opcode, Opcode, OpcodeMetadata, OPCODE_TABLE};
pub use operand::{Operand, OperandRole, MAX_VALUE, REGISTER_COUNT};

/// Errors that can occur while loading, executing or editing a machine.
///
/// All of them are fatal to the current machine state: none is retried
/// internally, and the host is expected to discard and reload the machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// The word at the instruction pointer is not a valid opcode.
    #[error("word {word} at address {address} is not a valid opcode")]
    IllegalOpcode { address: u16, word: u16 },

    /// An operand word is above the last register selector (r7).
    #[error("operand word {word} at address {address} is neither a literal nor a register")]
    InvalidOperand { address: u16, word: u16 },

    /// POP or RET executed with an empty stack.
    #[error("{mnemonic} at address {address} on an empty stack")]
    StackUnderflow { address: u16, mnemonic: &'static str },

    /// MOD executed with a zero divisor.
    #[error("MOD at address {address} divides by zero")]
    DivisionByZero { address: u16 },

    /// The program does not fit into memory.
    #[error("program of {words} words exceeds memory of {capacity} words")]
    OutOfMemory { words: usize, capacity: usize },

    /// A direct-write accessor received an index or value outside its range.
    #[error("{what} {index} is out of range (limit {limit})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        limit: usize,
    },

    /// `step()` was called after HALT.
    #[error("machine has halted")]
    MachineHalted,

    /// `resolve()` was called while no IN instruction was waiting for input.
    #[error("no input is pending")]
    InputNotPending,
}
