//! # Instruction Implementations
//!
//! This module contains the implementations of all instructions, organized by category.
//! Each instruction is implemented as a standalone function that takes a mutable reference
//! to the machine and the metadata of the opcode being executed.
//!
//! Every function decodes all of its operands before modifying any state, so a
//! failing instruction leaves the machine exactly as it found it.
//!
//! ## Categories
//!
//! - **alu**: Arithmetic, logic and comparison (ADD, MUL, MOD, AND, OR, NOT, EQ, GT)
//! - **control**: Control flow instructions (HALT, JMP, JT, JF, CALL, RET, NOP)
//! - **stack**: Stack operations (PUSH, POP)
//! - **load_store**: Register and memory transfers (SET, RMEM, WMEM)
//! - **io**: Character I/O (OUT, IN)

pub mod alu;
pub mod control;
pub mod io;
pub mod load_store;
pub mod stack;
