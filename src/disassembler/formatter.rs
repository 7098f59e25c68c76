//! Formatting functions for disassembled instructions

use crate::disassembler::Instruction;
use crate::opcodes::RAW_DATA_MNEMONIC;
use crate::operand::Operand;

/// Format a single instruction as assembly text
///
/// # Arguments
///
/// * `instr` - The instruction to format
///
/// # Returns
///
/// `NAME operand...` with each operand as a decimal literal or `r<N>`, or
/// `?? <word>` for raw data. The output is valid assembler input.
pub fn format_instruction(instr: &Instruction) -> String {
    format_with_operands(instr, |_, word| format_operand(word))
}

/// Format an instruction, letting `render` choose the text of each operand
///
/// `render` receives the operand index and the raw operand word.
pub fn format_with_operands<F>(instr: &Instruction, mut render: F) -> String
where
    F: FnMut(usize, u16) -> String,
{
    if instr.opcode.is_none() {
        return format!("{} {}", RAW_DATA_MNEMONIC, instr.word);
    }

    let mut text = instr.mnemonic.to_string();
    for (index, &word) in instr.operand_words.iter().enumerate() {
        text.push(' ');
        text.push_str(&render(index, word));
    }
    text
}

/// Format one operand word
///
/// Words above r7 cannot be decoded and are printed as plain numbers.
pub fn format_operand(word: u16) -> String {
    match Operand::decode(word) {
        Some(operand) => operand.to_string(),
        None => word.to_string(),
    }
}
