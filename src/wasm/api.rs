//! WASM API for the synvm machine.
//!
//! Provides JavaScript-callable interfaces for execution control, state
//! inspection and editing, and assembly/disassembly operations.

use crate::{
    assemble, disassemble, DisassemblyOptions, ExecutionError, Interrupt, Machine, Operand,
};
use wasm_bindgen::prelude::*;

/// JavaScript-compatible error wrapper
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsError {
    message: String,
}

#[wasm_bindgen]
impl JsError {
    #[wasm_bindgen(constructor)]
    pub fn new(message: &str) -> JsError {
        JsError {
            message: message.to_string(),
        }
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }
}

impl From<ExecutionError> for JsError {
    fn from(error: ExecutionError) -> Self {
        JsError::new(&error.to_string())
    }
}

/// Kind of a [`StepResult`]
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    None = 0,
    Halt = 1,
    Output = 2,
    Input = 3,
}

/// Tagged result of one step
///
/// `value` is the character code for `Output` and the encoded destination
/// operand word for `Input`; it is 0 otherwise.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    kind: StepKind,
    value: u16,
}

#[wasm_bindgen]
impl StepResult {
    #[wasm_bindgen(getter)]
    pub fn kind(&self) -> StepKind {
        self.kind
    }

    #[wasm_bindgen(getter)]
    pub fn value(&self) -> u16 {
        self.value
    }
}

impl From<Interrupt> for StepResult {
    fn from(interrupt: Interrupt) -> Self {
        let (kind, value) = match interrupt {
            Interrupt::None => (StepKind::None, 0),
            Interrupt::Halt => (StepKind::Halt, 0),
            Interrupt::Output(code) => (StepKind::Output, code),
            Interrupt::Input(destination) => (StepKind::Input, destination.encode()),
        };
        StepResult { kind, value }
    }
}

/// Result of an assembly operation
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct AssemblyResult {
    success: bool,
    bytecode: Vec<u8>,
    errors: Vec<String>,
}

#[wasm_bindgen]
impl AssemblyResult {
    #[wasm_bindgen(getter)]
    pub fn success(&self) -> bool {
        self.success
    }

    #[wasm_bindgen(getter)]
    pub fn bytecode(&self) -> Vec<u8> {
        self.bytecode.clone()
    }

    /// Every error of the failing pass, formatted as `line N: message`
    #[wasm_bindgen(getter)]
    pub fn errors(&self) -> Vec<String> {
        self.errors.clone()
    }
}

/// Assemble source code into bytecode
#[wasm_bindgen(js_name = assemble)]
pub fn assemble_source(source: &str) -> AssemblyResult {
    match assemble(source) {
        Ok(output) => AssemblyResult {
            success: true,
            bytecode: output.bytes,
            errors: Vec::new(),
        },
        Err(errors) => AssemblyResult {
            success: false,
            bytecode: Vec::new(),
            errors: errors.iter().map(ToString::to_string).collect(),
        },
    }
}

/// Machine interface for JavaScript
#[wasm_bindgen]
pub struct WasmMachine {
    machine: Machine,
}

#[wasm_bindgen]
impl WasmMachine {
    /// Create a machine with `bytecode` loaded at address 0
    #[wasm_bindgen(constructor)]
    pub fn new(bytecode: &[u8]) -> Result<WasmMachine, JsError> {
        Ok(WasmMachine {
            machine: Machine::from_bytes(bytecode)?,
        })
    }

    /// Execute a single instruction
    pub fn step(&mut self) -> Result<StepResult, JsError> {
        Ok(self.machine.step()?.into())
    }

    /// Supply the value for a suspended IN
    ///
    /// `destination` is the encoded operand word reported by the Input step.
    pub fn resolve(&mut self, destination: u16, value: u16) -> Result<(), JsError> {
        let destination = Operand::decode(destination)
            .ok_or_else(|| JsError::new(&format!("{} is not a valid operand", destination)))?;
        Ok(self.machine.resolve(destination, value)?)
    }

    /// Mnemonic text of the instruction at `addr`
    pub fn disasm(&self, addr: u16) -> String {
        self.machine.disasm(addr)
    }

    /// Size in words of the instruction at `addr`
    pub fn instruction_size(&self, addr: u16) -> usize {
        self.machine.instruction_size(addr)
    }

    /// Disassemble the loaded program into source lines
    pub fn disassemble(
        &self,
        fold_output: bool,
        label_jumps: bool,
        label_calls: bool,
        label_memory: bool,
        address_comments: bool,
    ) -> Vec<String> {
        let options = DisassemblyOptions {
            fold_output,
            label_jumps,
            label_calls,
            label_memory,
            address_comments,
        };
        disassemble(&self.machine, options)
    }

    // State getters

    #[wasm_bindgen(getter)]
    pub fn ip(&self) -> u16 {
        self.machine.ip()
    }

    #[wasm_bindgen(getter)]
    pub fn registers(&self) -> Vec<u16> {
        self.machine.registers().to_vec()
    }

    #[wasm_bindgen(getter)]
    pub fn memory(&self) -> Vec<u16> {
        self.machine.memory().to_vec()
    }

    #[wasm_bindgen(getter)]
    pub fn stack(&self) -> Vec<u16> {
        self.machine.stack().to_vec()
    }

    #[wasm_bindgen(getter)]
    pub fn word_count(&self) -> usize {
        self.machine.word_count()
    }

    #[wasm_bindgen(getter)]
    pub fn halted(&self) -> bool {
        self.machine.is_halted()
    }

    // State setters

    pub fn set_register(&mut self, index: usize, value: u16) -> Result<(), JsError> {
        Ok(self.machine.set_register(index, value)?)
    }

    pub fn set_ip(&mut self, address: usize) -> Result<(), JsError> {
        Ok(self.machine.set_ip(address)?)
    }

    pub fn set_memory_cell(&mut self, address: usize, value: u16) -> Result<(), JsError> {
        Ok(self.machine.set_memory_cell(address, value)?)
    }

    pub fn set_stack_cell(&mut self, index: usize, value: u16) -> Result<(), JsError> {
        Ok(self.machine.set_stack_cell(index, value)?)
    }
}
