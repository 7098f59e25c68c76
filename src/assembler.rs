//! Assembler Module
//!
//! Converts assembly source text into the binary program format.
//!
//! ## Source Syntax
//!
//! One statement per line:
//!
//! ```text
//! # whole-line comment
//! .counter 0            # data declaration: .name value [repeat]
//! :start                # label definition
//! SET r0 .counter       # instruction, operands are integers, r0..r7, :labels or .data
//! !println `Hello`      # macro invocation
//! ?? 1234               # raw data word
//! JMP :start
//! ```
//!
//! ## Passes
//!
//! Assembly runs as strictly ordered passes; each pass reports every error it
//! finds and assembly stops after the first failing pass:
//!
//! 1. Strip blank lines and comments
//! 2. Extract data declarations
//! 3. Expand macros (`!print`, `!println`, `!neg`)
//! 4. Resolve label offsets
//! 5. Place the data segment after the instructions
//! 6. Interpolate label and data references
//! 7. Encode instructions and append the data segment
//!
//! Output is all-or-nothing: no bytes are produced when any pass fails.

pub mod encoder;
pub mod macros;
pub mod parser;
pub mod symbol_table;

use log::debug;

use crate::memory::{encode_words, MEMORY_SIZE};
use crate::opcodes::{lookup_mnemonic, RAW_DATA_MNEMONIC};
use symbol_table::SymbolTable;

/// Complete output from assembling source code
#[derive(Debug, Clone)]
pub struct AssemblerOutput {
    /// Assembled program in the binary format (little-endian words)
    pub bytes: Vec<u8>,

    /// Assembled program as words
    pub words: Vec<u16>,

    /// Number of words occupied by instructions, i.e. the data segment start
    pub code_words: usize,

    /// Symbol table with all labels and data declarations
    pub symbol_table: Vec<Symbol>,
}

/// A symbol table entry mapping a name to an address
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    /// Name without its `:` or `.` prefix
    pub name: String,

    /// Label or data declaration
    pub kind: SymbolKind,

    /// Resolved word address
    pub address: u16,

    /// Source line where the symbol was defined (1-indexed)
    pub defined_at: usize,
}

/// What a symbol names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Instruction offset defined by `:name`
    Label,

    /// Data segment entry defined by `.name value [repeat]`
    Data { value: u16, repeat: u16 },
}

/// An error encountered during assembly
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct AssemblerError {
    /// Error type classification
    pub error_type: ErrorType,

    /// Source line where the error occurred (1-indexed)
    pub line: usize,

    /// Human-readable error message, quoting the offending line
    pub message: String,
}

/// Classification of assembly errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Line does not start with a known mnemonic
    UnknownInstruction,

    /// Wrong number of operands for the instruction or directive
    ArityMismatch,

    /// Operand or data value is not a valid word
    InvalidOperand,

    /// Reference to a label or data name that is never defined
    UndefinedSymbol,

    /// Unknown macro or malformed macro arguments
    MalformedMacroInvocation,

    /// Data name defined twice or not a valid name
    DuplicateOrInvalidDataName,

    /// Label defined twice or not a valid name
    DuplicateOrInvalidLabel,

    /// Code and data do not fit in memory
    ProgramTooLarge,
}

/// A line of source surviving comment stripping
///
/// Keeps the original line number so errors in macro expansions and
/// interpolated lines still point at the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// Line number in source file (1-indexed)
    pub line_number: usize,

    /// Trimmed line text
    pub text: String,
}

impl SourceLine {
    pub(crate) fn new(line_number: usize, text: impl Into<String>) -> Self {
        Self {
            line_number,
            text: text.into(),
        }
    }

    /// Whitespace-separated tokens of the line.
    pub(crate) fn tokens(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }

    pub(crate) fn error(&self, error_type: ErrorType, message: impl Into<String>) -> AssemblerError {
        AssemblerError {
            error_type,
            line: self.line_number,
            message: message.into(),
        }
    }
}

/// Assemble source code into a program
///
/// # Arguments
///
/// * `source` - The assembly source code text
///
/// # Returns
///
/// Ok(AssemblerOutput) on success, Err(Vec<AssemblerError>) listing every
/// error of the first failing pass
///
/// # Examples
///
/// ```
/// use synvm::assemble;
///
/// let output = assemble(":loop\nJMP :loop").unwrap();
/// assert_eq!(output.words, vec![6, 0]);
/// assert_eq!(output.bytes, vec![6, 0, 0, 0]);
/// ```
pub fn assemble(source: &str) -> Result<AssemblerOutput, Vec<AssemblerError>> {
    // Pass 1: comments and blank lines
    let lines = parser::strip_comments(source);

    // Pass 2: data declarations
    let (lines, declarations) = parser::extract_data(lines)?;

    // Pass 3: macros
    let lines = macros::expand(lines)?;

    // Pass 4: labels
    let mut symbols = SymbolTable::new();
    let (lines, code_words) = resolve_labels(lines, &mut symbols)?;

    // Pass 5: data segment placement
    let mut offset = code_words;
    let mut data_segment = Vec::new();
    for declaration in &declarations {
        if offset >= MEMORY_SIZE {
            return Err(vec![AssemblerError {
                error_type: ErrorType::ProgramTooLarge,
                line: declaration.line_number,
                message: format!(
                    "data '.{}' would start at offset {}, beyond the end of memory",
                    declaration.name, offset
                ),
            }]);
        }
        symbols
            .add_symbol(
                declaration.name.clone(),
                SymbolKind::Data {
                    value: declaration.value,
                    repeat: declaration.repeat,
                },
                offset as u16,
                declaration.line_number,
            )
            .map_err(|_| {
                vec![AssemblerError {
                    error_type: ErrorType::DuplicateOrInvalidDataName,
                    line: declaration.line_number,
                    message: format!("data '.{}' is already defined", declaration.name),
                }]
            })?;
        offset += declaration.repeat as usize;
        data_segment.extend(std::iter::repeat(declaration.value).take(declaration.repeat as usize));
    }
    if offset > MEMORY_SIZE {
        let last = declarations.last().map_or(0, |d| d.line_number);
        return Err(vec![AssemblerError {
            error_type: ErrorType::ProgramTooLarge,
            line: last,
            message: format!(
                "program needs {} words but memory holds {}",
                offset, MEMORY_SIZE
            ),
        }]);
    }

    // Pass 6: symbol interpolation
    let lines = interpolate(lines, &symbols)?;

    // Pass 7: encoding
    let mut words = encoder::encode_lines(&lines)?;
    words.extend(data_segment);

    debug!(
        "assembled {} instruction words and {} data words, {} symbols",
        code_words,
        words.len() - code_words,
        symbols.symbols().len()
    );

    Ok(AssemblerOutput {
        bytes: encode_words(&words),
        words,
        code_words,
        symbol_table: symbols.symbols().to_vec(),
    })
}

/// Records label offsets and drops label lines.
///
/// Returns the remaining instruction lines and their total size in words.
fn resolve_labels(
    lines: Vec<SourceLine>,
    symbols: &mut SymbolTable,
) -> Result<(Vec<SourceLine>, usize), Vec<AssemblerError>> {
    let mut errors = Vec::new();
    let mut instructions = Vec::new();
    let mut offset = 0usize;

    for line in lines {
        let tokens = line.tokens();
        let head = tokens.first().copied().unwrap_or_default();

        if let Some(name) = head.strip_prefix(':') {
            if offset >= MEMORY_SIZE {
                errors.push(line.error(
                    ErrorType::ProgramTooLarge,
                    format!("label ':{}' at offset {} is beyond the end of memory", name, offset),
                ));
                continue;
            }
            if tokens.len() != 1 {
                errors.push(line.error(
                    ErrorType::DuplicateOrInvalidLabel,
                    format!("label definition '{}' must stand alone on its line", line.text),
                ));
                continue;
            }
            if let Err(reason) = validate_symbol_name(name) {
                errors.push(line.error(ErrorType::DuplicateOrInvalidLabel, reason));
                continue;
            }
            if let Err(existing) =
                symbols.add_symbol(name.to_string(), SymbolKind::Label, offset as u16, line.line_number)
            {
                errors.push(line.error(
                    ErrorType::DuplicateOrInvalidLabel,
                    format!(
                        "label ':{}' is already defined on line {}",
                        name, existing.defined_at
                    ),
                ));
            }
            continue;
        }

        let size = if head == RAW_DATA_MNEMONIC {
            1
        } else if let Some(metadata) = lookup_mnemonic(head) {
            metadata.size_words as usize
        } else {
            errors.push(line.error(
                ErrorType::UnknownInstruction,
                format!("invalid instruction '{}' in '{}'", head, line.text),
            ));
            continue;
        };

        offset += size;
        instructions.push(line);
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok((instructions, offset))
}

/// Replaces every `:label` and `.data` operand with its address.
fn interpolate(
    lines: Vec<SourceLine>,
    symbols: &SymbolTable,
) -> Result<Vec<SourceLine>, Vec<AssemblerError>> {
    let mut errors = Vec::new();
    let mut resolved = Vec::with_capacity(lines.len());

    for line in lines {
        let mut tokens: Vec<String> = Vec::new();
        for (index, token) in line.tokens().into_iter().enumerate() {
            let symbol = if index == 0 {
                None
            } else if let Some(name) = token.strip_prefix(':') {
                Some((symbols.lookup_label(name), "label"))
            } else if let Some(name) = token.strip_prefix('.') {
                Some((symbols.lookup_data(name), "data"))
            } else {
                None
            };

            match symbol {
                None => tokens.push(token.to_string()),
                Some((Some(found), _)) => tokens.push(found.address.to_string()),
                Some((None, what)) => errors.push(line.error(
                    ErrorType::UndefinedSymbol,
                    format!("{} '{}' is not defined", what, token),
                )),
            }
        }
        resolved.push(SourceLine::new(line.line_number, tokens.join(" ")));
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(resolved)
}

/// Validate a label or data name
///
/// Names must:
/// - Start with a letter [a-zA-Z]
/// - Contain only alphanumeric characters, underscores and hyphens
/// - Not exceed 32 characters in length
pub(crate) fn validate_symbol_name(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err("name cannot be empty".to_string());
    };

    if name.len() > 32 {
        return Err(format!("name too long (max 32 characters): {}", name));
    }

    if !first.is_ascii_alphabetic() {
        return Err(format!("name must start with a letter, not '{}'", first));
    }

    for ch in chars {
        if !ch.is_ascii_alphanumeric() && ch != '_' && ch != '-' {
            return Err(format!(
                "name contains invalid character '{}' (only letters, digits, '_' and '-' allowed)",
                ch
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_symbol_name_valid() {
        assert!(validate_symbol_name("start").is_ok());
        assert!(validate_symbol_name("loop_1").is_ok());
        assert!(validate_symbol_name("jump-42").is_ok());
        assert!(validate_symbol_name("A").is_ok());
    }

    #[test]
    fn test_validate_symbol_name_invalid() {
        assert!(validate_symbol_name("").is_err());
        assert!(validate_symbol_name("1start").is_err());
        assert!(validate_symbol_name("my.label").is_err());
        assert!(validate_symbol_name("label!").is_err());
        assert!(validate_symbol_name(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_resolve_labels_offsets() {
        let lines = vec![
            SourceLine::new(1, ":start"),
            SourceLine::new(2, "SET r0 1"),
            SourceLine::new(3, ":next"),
            SourceLine::new(4, "?? 7"),
            SourceLine::new(5, ":end"),
        ];
        let mut symbols = SymbolTable::new();
        let (rest, size) = resolve_labels(lines, &mut symbols).unwrap();

        assert_eq!(rest.len(), 2);
        assert_eq!(size, 4);
        assert_eq!(symbols.lookup_label("start").map(|s| s.address), Some(0));
        assert_eq!(symbols.lookup_label("next").map(|s| s.address), Some(3));
        assert_eq!(symbols.lookup_label("end").map(|s| s.address), Some(4));
    }

    #[test]
    fn test_resolve_labels_duplicate() {
        let lines = vec![SourceLine::new(1, ":a"), SourceLine::new(2, ":a")];
        let errors = resolve_labels(lines, &mut SymbolTable::new()).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, ErrorType::DuplicateOrInvalidLabel);
        assert_eq!(errors[0].line, 2);
    }

    #[test]
    fn test_interpolate_skips_mnemonic() {
        let mut symbols = SymbolTable::new();
        symbols
            .add_symbol("x".to_string(), SymbolKind::Label, 12, 1)
            .unwrap();

        let lines = vec![SourceLine::new(3, "JT r1 :x")];
        let resolved = interpolate(lines, &symbols).unwrap();
        assert_eq!(resolved[0].text, "JT r1 12");
    }
}
