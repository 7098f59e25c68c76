//! Instruction decoder shared by the interpreter and the disassembler

use crate::disassembler::Instruction;
use crate::memory::{FlatMemory, ADDRESS_MASK};
use crate::opcodes::{Opcode, RAW_DATA_MNEMONIC};

/// Decode a single instruction from memory
///
/// # Arguments
///
/// * `memory` - The memory holding the instruction
/// * `address` - The memory address of the opcode word
///
/// # Returns
///
/// The decoded instruction. Words that are not opcodes decode as one-word raw
/// data (`opcode: None`, mnemonic `??`). Operand words are read with address
/// wrap-around at the top of memory.
pub fn decode_instruction(memory: &FlatMemory, address: u16) -> Instruction {
    let address = address & ADDRESS_MASK;
    let word = memory.read(address);

    let Some(opcode) = Opcode::from_word(word) else {
        return Instruction {
            address,
            word,
            opcode: None,
            mnemonic: RAW_DATA_MNEMONIC,
            operand_words: Vec::new(),
            size_words: 1,
        };
    };

    let metadata = opcode.metadata();
    let operand_words = (1..metadata.size_words as u16)
        .map(|offset| memory.read(address.wrapping_add(offset)))
        .collect();

    Instruction {
        address,
        word,
        opcode: Some(opcode),
        mnemonic: metadata.mnemonic,
        operand_words,
        size_words: metadata.size_words as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_with(words: &[u16]) -> FlatMemory {
        let mut memory = FlatMemory::new();
        memory.load(words).unwrap();
        memory
    }

    #[test]
    fn test_decode_add() {
        let memory = memory_with(&[9, 32768, 32769, 4]);
        let instr = decode_instruction(&memory, 0);

        assert_eq!(instr.address, 0);
        assert_eq!(instr.opcode, Some(Opcode::Add));
        assert_eq!(instr.mnemonic, "ADD");
        assert_eq!(instr.operand_words, vec![32768, 32769, 4]);
        assert_eq!(instr.size_words, 4);
    }

    #[test]
    fn test_decode_halt() {
        let memory = memory_with(&[21, 0]);
        let instr = decode_instruction(&memory, 1);

        assert_eq!(instr.address, 1);
        assert_eq!(instr.opcode, Some(Opcode::Halt));
        assert!(instr.operand_words.is_empty());
        assert_eq!(instr.size_words, 1);
    }

    #[test]
    fn test_decode_raw_data() {
        let memory = memory_with(&[9999]);
        let instr = decode_instruction(&memory, 0);

        assert_eq!(instr.opcode, None);
        assert_eq!(instr.word, 9999);
        assert_eq!(instr.mnemonic, "??");
        assert_eq!(instr.size_words, 1);
    }

    #[test]
    fn test_decode_wraps_operands() {
        let mut memory = FlatMemory::new();
        memory.write(32767, 6); // JMP
        memory.write(0, 1234);

        let instr = decode_instruction(&memory, 32767);
        assert_eq!(instr.operand_words, vec![1234]);
    }
}
