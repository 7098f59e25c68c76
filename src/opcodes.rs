//! # Opcode Metadata Table
//!
//! This module contains the 22-entry opcode metadata table that serves as the
//! single source of truth for all instruction information. The interpreter,
//! the assembler and the disassembler all read from it, so opcode numbering,
//! mnemonics and instruction sizes can never disagree between them.
//!
//! Each opcode entry includes:
//! - Mnemonic (instruction name, as written in assembly source)
//! - Opcode word value
//! - Instruction size in words (opcode word plus operand words)
//! - Operand roles, describing how each operand word is interpreted
//!
//! Any memory word that is not one of the 22 opcode values decodes as raw data
//! and is written `?? <word>` in assembly source.

use crate::operand::OperandRole;

/// Mnemonic of the raw-data pseudo-opcode.
///
/// A raw-data word occupies exactly one word and carries no operands.
pub const RAW_DATA_MNEMONIC: &str = "??";

/// Every opcode understood by the machine.
///
/// The discriminant is the word value that encodes the opcode in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    Halt = 0,
    Set = 1,
    Push = 2,
    Pop = 3,
    Eq = 4,
    Gt = 5,
    Jmp = 6,
    Jt = 7,
    Jf = 8,
    Add = 9,
    Mul = 10,
    Mod = 11,
    And = 12,
    Or = 13,
    Not = 14,
    Rmem = 15,
    Wmem = 16,
    Call = 17,
    Ret = 18,
    Out = 19,
    In = 20,
    Nop = 21,
}

impl Opcode {
    /// Decodes a memory word into an opcode.
    ///
    /// Returns `None` for every word that is not a valid opcode, which is how
    /// raw data is recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use synvm::Opcode;
    ///
    /// assert_eq!(Opcode::from_word(9), Some(Opcode::Add));
    /// assert_eq!(Opcode::from_word(9999), None);
    /// ```
    pub fn from_word(word: u16) -> Option<Opcode> {
        OPCODE_TABLE.get(word as usize).map(|metadata| metadata.opcode)
    }

    /// Returns the word value encoding this opcode.
    pub fn word(self) -> u16 {
        self as u16
    }

    /// Returns the static metadata entry for this opcode.
    pub fn metadata(self) -> &'static OpcodeMetadata {
        &OPCODE_TABLE[self as usize]
    }

    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(self) -> &'static str {
        self.metadata().mnemonic
    }
}

/// Metadata for a single opcode.
///
/// # Fields
///
/// - `mnemonic`: Instruction name (e.g., "SET", "ADD", "HALT")
/// - `opcode`: The opcode this entry describes
/// - `size_words`: Total instruction size including the opcode word (1-4 words)
/// - `operands`: Role of each operand word, in encoding order
///
/// # Examples
///
/// ```
/// use synvm::{OperandRole, OPCODE_TABLE};
///
/// let add = &OPCODE_TABLE[9];
/// assert_eq!(add.mnemonic, "ADD");
/// assert_eq!(add.size_words, 4);
/// assert_eq!(add.operands[0], OperandRole::Destination);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeMetadata {
    /// Instruction mnemonic.
    pub mnemonic: &'static str,

    /// The opcode described by this entry.
    pub opcode: Opcode,

    /// Total instruction size in words (opcode + operands).
    ///
    /// Always equal to `operands.len() + 1`.
    pub size_words: u8,

    /// How each operand word is interpreted.
    pub operands: &'static [OperandRole],
}

impl OpcodeMetadata {
    /// Returns the number of operand words following the opcode word.
    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }
}

use OperandRole::{CallTarget, Destination, JumpTarget, MemoryAddress, Value};

/// Complete opcode metadata table indexed by opcode word value.
///
/// # Examples
///
/// ```
/// use synvm::OPCODE_TABLE;
///
/// let jmp = &OPCODE_TABLE[6];
/// println!("{} - {} words", jmp.mnemonic, jmp.size_words);
/// // Output: JMP - 2 words
/// ```
pub const OPCODE_TABLE: [OpcodeMetadata; 22] = [
    OpcodeMetadata {
        mnemonic: "HALT",
        opcode: Opcode::Halt,
        size_words: 1,
        operands: &[],
    },
    OpcodeMetadata {
        mnemonic: "SET",
        opcode: Opcode::Set,
        size_words: 3,
        operands: &[Destination, Value],
    },
    OpcodeMetadata {
        mnemonic: "PUSH",
        opcode: Opcode::Push,
        size_words: 2,
        operands: &[Value],
    },
    OpcodeMetadata {
        mnemonic: "POP",
        opcode: Opcode::Pop,
        size_words: 2,
        operands: &[Destination],
    },
    OpcodeMetadata {
        mnemonic: "EQ",
        opcode: Opcode::Eq,
        size_words: 4,
        operands: &[Destination, Value, Value],
    },
    OpcodeMetadata {
        mnemonic: "GT",
        opcode: Opcode::Gt,
        size_words: 4,
        operands: &[Destination, Value, Value],
    },
    OpcodeMetadata {
        mnemonic: "JMP",
        opcode: Opcode::Jmp,
        size_words: 2,
        operands: &[JumpTarget],
    },
    OpcodeMetadata {
        mnemonic: "JT",
        opcode: Opcode::Jt,
        size_words: 3,
        operands: &[Value, JumpTarget],
    },
    OpcodeMetadata {
        mnemonic: "JF",
        opcode: Opcode::Jf,
        size_words: 3,
        operands: &[Value, JumpTarget],
    },
    OpcodeMetadata {
        mnemonic: "ADD",
        opcode: Opcode::Add,
        size_words: 4,
        operands: &[Destination, Value, Value],
    },
    OpcodeMetadata {
        mnemonic: "MUL",
        opcode: Opcode::Mul,
        size_words: 4,
        operands: &[Destination, Value, Value],
    },
    OpcodeMetadata {
        mnemonic: "MOD",
        opcode: Opcode::Mod,
        size_words: 4,
        operands: &[Destination, Value, Value],
    },
    OpcodeMetadata {
        mnemonic: "AND",
        opcode: Opcode::And,
        size_words: 4,
        operands: &[Destination, Value, Value],
    },
    OpcodeMetadata {
        mnemonic: "OR",
        opcode: Opcode::Or,
        size_words: 4,
        operands: &[Destination, Value, Value],
    },
    OpcodeMetadata {
        mnemonic: "NOT",
        opcode: Opcode::Not,
        size_words: 3,
        operands: &[Destination, Value],
    },
    OpcodeMetadata {
        mnemonic: "RMEM",
        opcode: Opcode::Rmem,
        size_words: 3,
        operands: &[Destination, MemoryAddress],
    },
    OpcodeMetadata {
        mnemonic: "WMEM",
        opcode: Opcode::Wmem,
        size_words: 3,
        operands: &[MemoryAddress, Value],
    },
    OpcodeMetadata {
        mnemonic: "CALL",
        opcode: Opcode::Call,
        size_words: 2,
        operands: &[CallTarget],
    },
    OpcodeMetadata {
        mnemonic: "RET",
        opcode: Opcode::Ret,
        size_words: 1,
        operands: &[],
    },
    OpcodeMetadata {
        mnemonic: "OUT",
        opcode: Opcode::Out,
        size_words: 2,
        operands: &[Value],
    },
    OpcodeMetadata {
        mnemonic: "IN",
        opcode: Opcode::In,
        size_words: 2,
        operands: &[Destination],
    },
    OpcodeMetadata {
        mnemonic: "NOP",
        opcode: Opcode::Nop,
        size_words: 1,
        operands: &[],
    },
];

/// Looks up opcode metadata by memory word.
///
/// Returns `None` for raw data words.
pub fn lookup_opcode(word: u16) -> Option<&'static OpcodeMetadata> {
    OPCODE_TABLE.get(word as usize)
}

/// Looks up opcode metadata by assembly mnemonic.
///
/// Mnemonics are case-sensitive and written in upper case. The raw-data
/// pseudo-opcode `??` has no table entry and returns `None`.
pub fn lookup_mnemonic(mnemonic: &str) -> Option<&'static OpcodeMetadata> {
    OPCODE_TABLE.iter().find(|metadata| metadata.mnemonic == mnemonic)
}
