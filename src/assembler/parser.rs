//! Assembly source parser
//!
//! Line classification for the first two passes, plus number and operand
//! parsing shared with the encoder.

use crate::assembler::{validate_symbol_name, AssemblerError, ErrorType, SourceLine};
use crate::operand::{MAX_OPERAND_WORD, REGISTER_BASE, REGISTER_COUNT};

/// A `.name value [repeat]` declaration awaiting placement in the data segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDeclaration {
    /// Name without the `.` prefix
    pub name: String,

    /// Word stored in every repetition
    pub value: u16,

    /// Number of consecutive words, 1 unless given
    pub repeat: u16,

    /// Source line of the declaration (1-indexed)
    pub line_number: usize,
}

/// Largest accepted repeat count for a data declaration.
const MAX_REPEAT: u16 = 32768;

/// Pass 1: drop blank lines and whole-line `#` comments, trimming the rest
pub fn strip_comments(source: &str) -> Vec<SourceLine> {
    source
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_number, line)| SourceLine::new(line_number, line))
        .collect()
}

/// Pass 2: remove data declarations from the line stream
///
/// Declarations are returned in source order. Every error in the pass is
/// reported.
pub fn extract_data(
    lines: Vec<SourceLine>,
) -> Result<(Vec<SourceLine>, Vec<DataDeclaration>), Vec<AssemblerError>> {
    let mut errors = Vec::new();
    let mut remaining = Vec::new();
    let mut declarations: Vec<DataDeclaration> = Vec::new();

    for line in lines {
        if !line.text.starts_with('.') {
            remaining.push(line);
            continue;
        }

        match parse_data_declaration(&line) {
            Ok(declaration) => {
                if let Some(existing) = declarations.iter().find(|d| d.name == declaration.name) {
                    errors.push(line.error(
                        ErrorType::DuplicateOrInvalidDataName,
                        format!(
                            "data '.{}' is already defined on line {}",
                            declaration.name, existing.line_number
                        ),
                    ));
                } else {
                    declarations.push(declaration);
                }
            }
            Err(error) => errors.push(error),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok((remaining, declarations))
}

fn parse_data_declaration(line: &SourceLine) -> Result<DataDeclaration, AssemblerError> {
    let tokens = line.tokens();
    if tokens.len() != 2 && tokens.len() != 3 {
        return Err(line.error(
            ErrorType::ArityMismatch,
            format!(
                "invalid data definition in '{}' (expected 2 or 3 tokens, got {})",
                line.text,
                tokens.len()
            ),
        ));
    }

    let name = &tokens[0][1..];
    validate_symbol_name(name).map_err(|reason| {
        line.error(
            ErrorType::DuplicateOrInvalidDataName,
            format!("invalid data name in '{}': {}", line.text, reason),
        )
    })?;

    let value = parse_number(tokens[1]).map_err(|reason| {
        line.error(
            ErrorType::InvalidOperand,
            format!("invalid data value in '{}': {}", line.text, reason),
        )
    })?;

    let repeat = match tokens.get(2) {
        None => 1,
        Some(token) => parse_number(token)
            .ok()
            .filter(|&repeat| repeat <= MAX_REPEAT)
            .ok_or_else(|| {
                line.error(
                    ErrorType::InvalidOperand,
                    format!(
                        "invalid data size in '{}' (must be 0~{}, got {})",
                        line.text, MAX_REPEAT, token
                    ),
                )
            })?,
    };

    Ok(DataDeclaration {
        name: name.to_string(),
        value,
        repeat,
        line_number: line.line_number,
    })
}

/// Parse a non-negative decimal number (0-65535)
pub fn parse_number(s: &str) -> Result<u16, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("empty number string".to_string());
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{}' is not a decimal number", s));
    }

    s.parse::<u16>()
        .map_err(|e| format!("invalid decimal number '{}': {}", s, e))
}

/// Parse an instruction operand into its word encoding
///
/// Accepts `r0`..`r7` (32768..32775) and bare integers 0..32775.
pub fn parse_operand(token: &str) -> Result<u16, String> {
    if let Some(index) = token.strip_prefix('r') {
        return match parse_number(index) {
            Ok(n) if (n as usize) < REGISTER_COUNT => Ok(REGISTER_BASE + n),
            _ => Err(format!("'{}' is not a valid register", token)),
        };
    }

    match parse_number(token) {
        Ok(word) if word <= MAX_OPERAND_WORD => Ok(word),
        _ => Err(format!("'{}' is not a valid value", token)),
    }
}
