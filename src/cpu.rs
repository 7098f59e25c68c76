//! # Machine State and Execution
//!
//! This module contains the [`Machine`] struct representing the processor
//! state and the fetch-decode-execute loop.
//!
//! ## Machine State
//!
//! The machine maintains:
//! - **Instruction pointer** (IP): 15-bit address of the next instruction
//! - **Registers**: eight general purpose registers r0..r7
//! - **Memory**: 32768 words, the program is loaded at address 0
//! - **Stack**: unbounded stack of words, empty after load
//!
//! ## Execution Model
//!
//! The machine executes instructions via:
//! - `step()`: Execute one instruction and return an [`Interrupt`]
//! - `run_for_steps()`: Repeat `step()` until HALT, pending input or budget exhaustion
//!
//! ## Input Protocol
//!
//! `IN` is the only instruction that can suspend. The first `step()` on an
//! `IN` returns [`Interrupt::Input`] without advancing the IP. Further calls
//! keep returning the same interrupt and change nothing until the host calls
//! [`Machine::resolve`], which writes the value into the destination. The
//! next `step()` then completes the `IN`, advances the IP and returns
//! [`Interrupt::None`].

use log::{debug, log_enabled, trace, Level};

use crate::disassembler::{decoder, formatter, Instruction};
use crate::instructions::{alu, control, io, load_store, stack};
use crate::memory::{decode_words, FlatMemory, ADDRESS_MASK, MEMORY_SIZE};
use crate::operand::{Operand, MAX_VALUE, REGISTER_COUNT};
use crate::{ExecutionError, Opcode, OpcodeMetadata};

/// Signal returned by every successful [`Machine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// The instruction completed, continue with the next step.
    None,

    /// HALT executed; the machine is now terminal.
    Halt,

    /// OUT executed; the host should print this character code.
    Output(u16),

    /// IN is waiting for a value to be written to this destination.
    Input(Operand),
}

/// Progress of the `IN` instruction at `address`.
///
/// A state whose address differs from the IP is stale and reads as idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputState {
    /// No IN is in flight.
    Idle,

    /// IN suspended, waiting for `resolve()`.
    Pending { address: u16, destination: Operand },

    /// Value written, the next step completes the IN.
    Supplied { address: u16 },
}

/// Machine state and execution context.
///
/// A machine exclusively owns its state. Hosts inspect it through the read
/// accessors and edit it only through the `set_*` direct-write accessors,
/// which validate their arguments.
///
/// # Examples
///
/// ```
/// use synvm::{Interrupt, Machine};
///
/// // SET r1 5, PUSH r1, POP r2, HALT
/// let mut machine = Machine::from_words(&[1, 32769, 5, 2, 32769, 3, 32770, 0]).unwrap();
///
/// assert_eq!(machine.ip(), 0);
/// while machine.step().unwrap() != Interrupt::Halt {}
///
/// assert_eq!(machine.registers()[2], 5);
/// assert!(machine.stack().is_empty());
/// assert!(machine.is_halted());
/// ```
#[derive(Debug, Clone)]
pub struct Machine {
    /// Instruction pointer (always below 32768)
    pub(crate) ip: u16,

    /// General purpose registers r0..r7
    pub(crate) registers: [u16; REGISTER_COUNT],

    /// Program and data memory
    pub(crate) memory: FlatMemory,

    /// Call and data stack
    pub(crate) stack: Vec<u16>,

    /// Number of words occupied by the loaded program
    pub(crate) word_count: usize,

    /// Set once HALT executed
    pub(crate) halted: bool,

    /// Suspend/resume state of IN
    pub(crate) input: InputState,
}

impl Machine {
    /// Creates a machine with zeroed memory and no program loaded.
    pub fn new() -> Self {
        Self {
            ip: 0,
            registers: [0; REGISTER_COUNT],
            memory: FlatMemory::new(),
            stack: Vec::new(),
            word_count: 0,
            halted: false,
            input: InputState::Idle,
        }
    }

    /// Creates a machine and loads `words` at address 0.
    pub fn from_words(words: &[u16]) -> Result<Self, ExecutionError> {
        let mut machine = Self::new();
        machine.load(words)?;
        Ok(machine)
    }

    /// Creates a machine from a binary program (little-endian words).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExecutionError> {
        Self::from_words(&decode_words(bytes))
    }

    /// Installs a program at address 0 and resets the machine.
    ///
    /// Memory is zero-filled before the program is copied; the IP, registers
    /// and stack are reset. Fails with [`ExecutionError::OutOfMemory`] if the
    /// program exceeds 32768 words, in which case the machine is unchanged.
    pub fn load(&mut self, words: &[u16]) -> Result<(), ExecutionError> {
        self.memory.load(words)?;

        self.ip = 0;
        self.registers = [0; REGISTER_COUNT];
        self.stack.clear();
        self.word_count = words.len();
        self.halted = false;
        self.input = InputState::Idle;

        debug!("loaded program of {} words", words.len());
        Ok(())
    }

    /// Decodes a binary program and loads it, see [`Machine::load`].
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), ExecutionError> {
        self.load(&decode_words(bytes))
    }

    /// Executes one instruction and returns the resulting interrupt.
    ///
    /// Every instruction either completes atomically or fails before any
    /// state is modified. The only suspension point is `IN`, see the module
    /// documentation.
    ///
    /// # Errors
    ///
    /// - [`ExecutionError::MachineHalted`] if HALT already executed
    /// - [`ExecutionError::IllegalOpcode`] if the IP points at raw data
    /// - [`ExecutionError::InvalidOperand`] for operand words above r7
    /// - [`ExecutionError::StackUnderflow`] for POP/RET on an empty stack
    /// - [`ExecutionError::DivisionByZero`] for MOD by zero
    ///
    /// # Examples
    ///
    /// ```
    /// use synvm::{ExecutionError, Interrupt, Machine};
    ///
    /// // OUT 72, HALT
    /// let mut machine = Machine::from_words(&[19, 72, 0]).unwrap();
    ///
    /// assert_eq!(machine.step(), Ok(Interrupt::Output(72)));
    /// assert_eq!(machine.step(), Ok(Interrupt::Halt));
    /// assert_eq!(machine.step(), Err(ExecutionError::MachineHalted));
    /// ```
    pub fn step(&mut self) -> Result<Interrupt, ExecutionError> {
        if self.halted {
            return Err(ExecutionError::MachineHalted);
        }

        let address = self.ip;
        let word = self.memory.read(address);
        let opcode =
            Opcode::from_word(word).ok_or(ExecutionError::IllegalOpcode { address, word })?;
        let metadata = opcode.metadata();

        if log_enabled!(Level::Trace) {
            trace!("{:05}: {}", address, self.disasm(address));
        }

        match opcode {
            Opcode::Halt => control::execute_halt(self, metadata),
            Opcode::Set => load_store::execute_set(self, metadata),
            Opcode::Push => stack::execute_push(self, metadata),
            Opcode::Pop => stack::execute_pop(self, metadata),
            Opcode::Eq => alu::execute_eq(self, metadata),
            Opcode::Gt => alu::execute_gt(self, metadata),
            Opcode::Jmp => control::execute_jmp(self, metadata),
            Opcode::Jt => control::execute_jt(self, metadata),
            Opcode::Jf => control::execute_jf(self, metadata),
            Opcode::Add => alu::execute_add(self, metadata),
            Opcode::Mul => alu::execute_mul(self, metadata),
            Opcode::Mod => alu::execute_mod(self, metadata),
            Opcode::And => alu::execute_and(self, metadata),
            Opcode::Or => alu::execute_or(self, metadata),
            Opcode::Not => alu::execute_not(self, metadata),
            Opcode::Rmem => load_store::execute_rmem(self, metadata),
            Opcode::Wmem => load_store::execute_wmem(self, metadata),
            Opcode::Call => control::execute_call(self, metadata),
            Opcode::Ret => control::execute_ret(self, metadata),
            Opcode::Out => io::execute_out(self, metadata),
            Opcode::In => io::execute_in(self, metadata),
            Opcode::Nop => control::execute_nop(self, metadata),
        }
    }

    /// Runs the machine for at most `step_budget` steps.
    ///
    /// Output characters are handed to `on_output` and execution continues.
    /// Returns [`Interrupt::Halt`] or [`Interrupt::Input`] as soon as one
    /// occurs, or [`Interrupt::None`] once the budget is exhausted.
    ///
    /// # Examples
    ///
    /// ```
    /// use synvm::{Interrupt, Machine};
    ///
    /// // OUT 104, OUT 105, HALT
    /// let mut machine = Machine::from_words(&[19, 104, 19, 105, 0]).unwrap();
    ///
    /// let mut printed = String::new();
    /// let stop = machine
    ///     .run_for_steps(100, |code| printed.extend(char::from_u32(code as u32)))
    ///     .unwrap();
    ///
    /// assert_eq!(stop, Interrupt::Halt);
    /// assert_eq!(printed, "hi");
    /// ```
    pub fn run_for_steps<F>(
        &mut self,
        step_budget: u64,
        mut on_output: F,
    ) -> Result<Interrupt, ExecutionError>
    where
        F: FnMut(u16),
    {
        for _ in 0..step_budget {
            match self.step()? {
                Interrupt::None => {}
                Interrupt::Output(code) => on_output(code),
                stop => return Ok(stop),
            }
        }

        Ok(Interrupt::None)
    }

    /// Supplies the value for a suspended `IN` instruction.
    ///
    /// The value is written to `destination` with the same rule as any
    /// destination operand: a register operand writes the register, a literal
    /// operand writes the memory cell at that address. The next `step()`
    /// completes the `IN`.
    ///
    /// # Errors
    ///
    /// - [`ExecutionError::InputNotPending`] unless the last step returned
    ///   [`Interrupt::Input`] and it has not been resolved yet
    /// - [`ExecutionError::OutOfRange`] if `value` exceeds 32767
    pub fn resolve(&mut self, destination: Operand, value: u16) -> Result<(), ExecutionError> {
        let address = match self.input_at_ip() {
            InputState::Pending { address, .. } => address,
            _ => return Err(ExecutionError::InputNotPending),
        };
        check_value("input value", value)?;

        self.write_destination(destination, value);
        self.input = InputState::Supplied { address };

        debug!("input {} resolved into {}", value, destination);
        Ok(())
    }

    /// Returns the mnemonic representation of the instruction at `addr`.
    ///
    /// Operands are printed as decimal literals or `r<N>`. Words that are not
    /// opcodes render as `?? <word>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use synvm::Machine;
    ///
    /// let machine = Machine::from_words(&[9, 32768, 32768, 1, 9999]).unwrap();
    /// assert_eq!(machine.disasm(0), "ADD r0 r0 1");
    /// assert_eq!(machine.disasm(4), "?? 9999");
    /// ```
    pub fn disasm(&self, addr: u16) -> String {
        formatter::format_instruction(&self.decode(addr))
    }

    /// Returns the number of words occupied by the instruction at `addr`.
    ///
    /// Raw data words occupy one word.
    pub fn instruction_size(&self, addr: u16) -> usize {
        match Opcode::from_word(self.memory.read(addr)) {
            Some(opcode) => opcode.metadata().size_words as usize,
            None => 1,
        }
    }

    /// Decodes the instruction at `addr` without executing it.
    pub fn decode(&self, addr: u16) -> Instruction {
        decoder::decode_instruction(&self.memory, addr)
    }

    // ========== Read Accessors ==========

    /// Returns the instruction pointer.
    pub fn ip(&self) -> u16 {
        self.ip
    }

    /// Returns the eight registers.
    pub fn registers(&self) -> &[u16; REGISTER_COUNT] {
        &self.registers
    }

    /// Returns the full 32768-word memory.
    pub fn memory(&self) -> &[u16] {
        self.memory.as_slice()
    }

    /// Returns the stack, bottom first.
    pub fn stack(&self) -> &[u16] {
        &self.stack
    }

    /// Returns the number of words occupied by the loaded program.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Returns true once HALT has executed.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Returns the destination of the `IN` waiting for `resolve()`, if any.
    pub fn pending_input(&self) -> Option<Operand> {
        match self.input_at_ip() {
            InputState::Pending { destination, .. } => Some(destination),
            _ => None,
        }
    }

    /// Input state of the IN at the current IP.
    pub(crate) fn input_at_ip(&self) -> InputState {
        match self.input {
            InputState::Pending { address, .. } | InputState::Supplied { address }
                if address != self.ip =>
            {
                InputState::Idle
            }
            state => state,
        }
    }

    // ========== Direct-Write Accessors ==========

    /// Overwrites register `index` (0..=7) with `value` (0..=32767).
    pub fn set_register(&mut self, index: usize, value: u16) -> Result<(), ExecutionError> {
        if index >= REGISTER_COUNT {
            return Err(ExecutionError::OutOfRange {
                what: "register",
                index,
                limit: REGISTER_COUNT,
            });
        }
        check_value("register value", value)?;

        self.registers[index] = value;
        Ok(())
    }

    /// Moves the instruction pointer to `address` (0..=32767).
    ///
    /// An `IN` that was suspended at the old IP is abandoned.
    pub fn set_ip(&mut self, address: usize) -> Result<(), ExecutionError> {
        let address = check_address(address)?;

        self.ip = address;
        self.input = InputState::Idle;
        Ok(())
    }

    /// Overwrites the memory word at `address` (0..=32767).
    ///
    /// Any 16-bit word is accepted, since memory also holds encoded operands.
    pub fn set_memory_cell(&mut self, address: usize, value: u16) -> Result<(), ExecutionError> {
        let address = check_address(address)?;

        self.memory.write(address, value);
        Ok(())
    }

    /// Overwrites stack entry `index` (0 is the bottom) with `value` (0..=32767).
    pub fn set_stack_cell(&mut self, index: usize, value: u16) -> Result<(), ExecutionError> {
        let depth = self.stack.len();
        let cell = self
            .stack
            .get_mut(index)
            .ok_or(ExecutionError::OutOfRange {
                what: "stack index",
                index,
                limit: depth,
            })?;
        check_value("stack value", value)?;

        *cell = value;
        Ok(())
    }

    // ========== Instruction Helpers ==========

    /// Decodes operand `n` (0-based) of the instruction at the IP.
    pub(crate) fn operand(&self, n: u16) -> Result<Operand, ExecutionError> {
        let address = self.ip.wrapping_add(n + 1) & ADDRESS_MASK;
        let word = self.memory.read(address);
        Operand::decode(word).ok_or(ExecutionError::InvalidOperand { address, word })
    }

    /// Decodes operand `n` and resolves registers to their contents.
    pub(crate) fn value(&self, n: u16) -> Result<u16, ExecutionError> {
        Ok(match self.operand(n)? {
            Operand::Literal(value) => value,
            Operand::Register(index) => self.registers[index as usize],
        })
    }

    /// Writes `value` to a destination operand.
    pub(crate) fn write_destination(&mut self, destination: Operand, value: u16) {
        match destination {
            Operand::Register(index) => self.registers[index as usize] = value,
            Operand::Literal(address) => self.memory.write(address, value),
        }
    }

    /// Moves the IP past the current instruction.
    pub(crate) fn advance(&mut self, metadata: &OpcodeMetadata) {
        self.ip = self.ip.wrapping_add(metadata.size_words as u16) & ADDRESS_MASK;
    }

    /// Transfers control to `address`.
    pub(crate) fn jump(&mut self, address: u16) {
        self.ip = address & ADDRESS_MASK;
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

fn check_value(what: &'static str, value: u16) -> Result<(), ExecutionError> {
    if value > MAX_VALUE {
        return Err(ExecutionError::OutOfRange {
            what,
            index: value as usize,
            limit: MAX_VALUE as usize + 1,
        });
    }
    Ok(())
}

fn check_address(address: usize) -> Result<u16, ExecutionError> {
    if address >= MEMORY_SIZE {
        return Err(ExecutionError::OutOfRange {
            what: "address",
            index: address,
            limit: MEMORY_SIZE,
        });
    }
    Ok(address as u16)
}
