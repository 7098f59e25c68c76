//! Instruction encoder
//!
//! Turns fully interpolated lines into words using the `OPCODE_TABLE`.

use crate::assembler::parser::{parse_number, parse_operand};
use crate::assembler::{AssemblerError, ErrorType, SourceLine};
use crate::opcodes::{lookup_mnemonic, RAW_DATA_MNEMONIC};

/// Pass 7: encode every line, reporting all errors of the pass
pub fn encode_lines(lines: &[SourceLine]) -> Result<Vec<u16>, Vec<AssemblerError>> {
    let mut errors = Vec::new();
    let mut words = Vec::new();

    for line in lines {
        match encode_line(line) {
            Ok(encoded) => words.extend(encoded),
            Err(error) => errors.push(error),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(words)
}

/// Encode a single instruction or `??` directive
pub fn encode_line(line: &SourceLine) -> Result<Vec<u16>, AssemblerError> {
    let tokens = line.tokens();
    let head = tokens.first().copied().unwrap_or_default();
    let operands = tokens.get(1..).unwrap_or_default();

    if head == RAW_DATA_MNEMONIC {
        check_arity(line, 1, operands.len())?;
        let word = parse_number(operands[0]).map_err(|reason| {
            line.error(
                ErrorType::InvalidOperand,
                format!("invalid raw value in '{}': {}", line.text, reason),
            )
        })?;
        return Ok(vec![word]);
    }

    let metadata = lookup_mnemonic(head).ok_or_else(|| {
        line.error(
            ErrorType::UnknownInstruction,
            format!("invalid instruction '{}' in '{}'", head, line.text),
        )
    })?;
    check_arity(line, metadata.operand_count(), operands.len())?;

    let mut words = Vec::with_capacity(metadata.size_words as usize);
    words.push(metadata.opcode.word());
    for operand in operands {
        let word = parse_operand(operand).map_err(|reason| {
            line.error(
                ErrorType::InvalidOperand,
                format!("invalid operand in '{}': {}", line.text, reason),
            )
        })?;
        words.push(word);
    }
    Ok(words)
}

fn check_arity(line: &SourceLine, expected: usize, got: usize) -> Result<(), AssemblerError> {
    if expected != got {
        return Err(line.error(
            ErrorType::ArityMismatch,
            format!(
                "wrong number of operands in '{}' (expected {}, got {})",
                line.text, expected, got
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> Result<Vec<u16>, AssemblerError> {
        encode_line(&SourceLine::new(1, text))
    }

    #[test]
    fn test_encode_instructions() {
        assert_eq!(encode("HALT").unwrap(), vec![0]);
        assert_eq!(encode("SET r0 1").unwrap(), vec![1, 32768, 1]);
        assert_eq!(encode("ADD r1 r1 32767").unwrap(), vec![9, 32769, 32769, 32767]);
        assert_eq!(encode("OUT 65").unwrap(), vec![19, 65]);
        assert_eq!(encode("NOP").unwrap(), vec![21]);
    }

    #[test]
    fn test_encode_raw_word() {
        assert_eq!(encode("?? 0").unwrap(), vec![0]);
        assert_eq!(encode("?? 65535").unwrap(), vec![65535]);
        assert_eq!(encode("?? 65536").unwrap_err().error_type, ErrorType::InvalidOperand);
        assert_eq!(encode("?? 1 2").unwrap_err().error_type, ErrorType::ArityMismatch);
    }

    #[test]
    fn test_encode_arity_mismatch() {
        let error = encode("ADD r0 1").unwrap_err();
        assert_eq!(error.error_type, ErrorType::ArityMismatch);
        assert!(error.message.contains("expected 3, got 2"));

        assert_eq!(encode("HALT 1").unwrap_err().error_type, ErrorType::ArityMismatch);
    }

    #[test]
    fn test_encode_invalid_operand() {
        assert_eq!(encode("SET r8 1").unwrap_err().error_type, ErrorType::InvalidOperand);
        assert_eq!(encode("OUT 32776").unwrap_err().error_type, ErrorType::InvalidOperand);
        assert_eq!(encode("JMP start").unwrap_err().error_type, ErrorType::InvalidOperand);
    }

    #[test]
    fn test_encode_lines_collects_errors() {
        let lines = vec![
            SourceLine::new(1, "SET r0"),
            SourceLine::new(2, "NOP"),
            SourceLine::new(3, "OUT x"),
        ];
        let errors = encode_lines(&lines).unwrap_err();
        let found: Vec<_> = errors.iter().map(|e| (e.line, e.error_type)).collect();

        assert_eq!(
            found,
            vec![(1, ErrorType::ArityMismatch), (3, ErrorType::InvalidOperand)]
        );
    }
}
