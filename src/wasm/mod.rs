//! WebAssembly bindings for the synvm machine and toolchain.
//!
//! This module provides JavaScript-callable interfaces to the interpreter,
//! the assembler and the disassembler, so a browser page can host a terminal
//! for the machine.

#[cfg(feature = "wasm")]
pub mod api;

#[cfg(feature = "wasm")]
pub use api::{StepKind, StepResult, WasmMachine};
