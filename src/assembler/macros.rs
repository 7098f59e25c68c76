//! Macro expansion
//!
//! Macros are expanded in a single, non-recursive pass. Expanded lines keep
//! the line number of the invocation.
//!
//! | Macro | Expansion |
//! |-------|-----------|
//! | ``!print `text` `` | one `OUT <code>` per character |
//! | ``!println `text` `` | `!print` followed by `OUT 10` |
//! | `!neg dest src` | `NOT dest src`, `ADD dest dest 1` |

use crate::assembler::{AssemblerError, ErrorType, SourceLine};
use crate::operand::MAX_VALUE;

/// Delimiter of macro string literals.
const DELIMITER: char = '`';

/// Pass 3: expand every `!macro` line
pub fn expand(lines: Vec<SourceLine>) -> Result<Vec<SourceLine>, Vec<AssemblerError>> {
    let mut errors = Vec::new();
    let mut expanded = Vec::with_capacity(lines.len());

    for line in lines {
        if !line.text.starts_with('!') {
            expanded.push(line);
            continue;
        }

        match expand_line(&line) {
            Ok(instructions) => expanded.extend(
                instructions
                    .into_iter()
                    .map(|text| SourceLine::new(line.line_number, text)),
            ),
            Err(error) => errors.push(error),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(expanded)
}

/// Expand a single macro invocation into instruction lines
pub fn expand_line(line: &SourceLine) -> Result<Vec<String>, AssemblerError> {
    let tokens = line.tokens();
    let name = tokens.first().copied().unwrap_or_default();

    match name {
        "!print" => print(line, name),
        "!println" => {
            let mut instructions = print(line, name)?;
            instructions.push("OUT 10".to_string());
            Ok(instructions)
        }
        "!neg" => {
            if tokens.len() != 3 {
                return Err(line.error(
                    ErrorType::MalformedMacroInvocation,
                    format!(
                        "wrong arguments number in '{}' (expected 3, got {})",
                        line.text,
                        tokens.len()
                    ),
                ));
            }
            Ok(vec![
                format!("NOT {} {}", tokens[1], tokens[2]),
                format!("ADD {} {} 1", tokens[1], tokens[1]),
            ])
        }
        _ => Err(line.error(
            ErrorType::MalformedMacroInvocation,
            format!("invalid macro '{}' in '{}'", name, line.text),
        )),
    }
}

/// Emits one `OUT` per character of the delimited string after `name`.
fn print(line: &SourceLine, name: &str) -> Result<Vec<String>, AssemblerError> {
    let text = quoted_argument(line, name)?;

    text.chars()
        .map(|ch| {
            let code = ch as u32;
            if code > MAX_VALUE as u32 {
                return Err(line.error(
                    ErrorType::MalformedMacroInvocation,
                    format!("character '{}' in '{}' cannot be printed", ch, line.text),
                ));
            }
            Ok(format!("OUT {}", code))
        })
        .collect()
}

/// Extracts `text` from ``name `text` ``.
///
/// The line must contain exactly one delimiter pair, and nothing but
/// whitespace may surround it.
fn quoted_argument<'a>(line: &'a SourceLine, name: &str) -> Result<&'a str, AssemblerError> {
    let malformed = || {
        line.error(
            ErrorType::MalformedMacroInvocation,
            format!("malformed expression in '{}' (missing backticks?)", line.text),
        )
    };

    if line.text.matches(DELIMITER).count() != 2 {
        return Err(malformed());
    }

    let argument = line.text[name.len()..].trim();
    argument
        .strip_prefix(DELIMITER)
        .and_then(|rest| rest.strip_suffix(DELIMITER))
        .ok_or_else(malformed)
}
