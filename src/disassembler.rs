//! Disassembler Module
//!
//! Reconstructs annotated assembly source from the memory of a loaded machine.
//!
//! The program is walked three times, always stepping by
//! [`Machine::instruction_size`]:
//!
//! 1. **Discovery**: literal jump, call and memory operands are collected as
//!    candidate targets, each category gated by its own option.
//! 2. **Alignment**: a candidate is kept only if it lands exactly on an
//!    instruction boundary of the walk. Targets inside another instruction's
//!    operand words are reported as `# Unaligned ...` comments instead.
//! 3. **Emission**: label definitions (`:jump-N`, `:proc-N`, `:data-N`) are
//!    written before aligned addresses, operands pointing at aligned targets
//!    are replaced by those labels, and runs of `OUT` can be folded into
//!    `!print` / `!println` macro calls.
//!
//! Disassembly never fails: unknown words become `?? <word>` lines.

pub mod decoder;
pub mod formatter;

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::opcodes::Opcode;
use crate::operand::{Operand, OperandRole};
use crate::Machine;

/// A single decoded instruction (or raw data word)
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Memory address where this instruction starts
    pub address: u16,

    /// The word at `address`
    pub word: u16,

    /// Decoded opcode, `None` for raw data
    pub opcode: Option<Opcode>,

    /// Instruction mnemonic (e.g., "SET", "JMP"), `??` for raw data
    pub mnemonic: &'static str,

    /// Operand words, in encoding order
    pub operand_words: Vec<u16>,

    /// Total size in words (opcode + operands, 1 for raw data)
    pub size_words: usize,
}

/// Options controlling disassembly output
///
/// Every option is off by default, which produces one plain instruction per
/// line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisassemblyOptions {
    /// Fold runs of printable `OUT` literals into `!print` / `!println` macros
    pub fold_output: bool,

    /// Replace jump targets (JMP, JT, JF) with `:jump-N` labels
    pub label_jumps: bool,

    /// Replace call targets (CALL) with `:proc-N` labels
    pub label_calls: bool,

    /// Replace memory addresses (RMEM, WMEM) with `:data-N` labels
    pub label_memory: bool,

    /// Precede every emitted instruction with a `# N` address comment
    pub address_comments: bool,
}

impl DisassemblyOptions {
    fn labels(&self, kind: TargetKind) -> bool {
        match kind {
            TargetKind::Jump => self.label_jumps,
            TargetKind::Call => self.label_calls,
            TargetKind::Data => self.label_memory,
        }
    }
}

/// Category of a discovered target address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetKind {
    Jump,
    Call,
    Data,
}

impl TargetKind {
    const ALL: [TargetKind; 3] = [TargetKind::Jump, TargetKind::Call, TargetKind::Data];

    /// Target category of an operand, if it names one.
    ///
    /// Every operand of RMEM and WMEM names a memory cell, including a
    /// literal destination.
    fn for_operand(opcode: Opcode, role: OperandRole) -> Option<Self> {
        if matches!(opcode, Opcode::Rmem | Opcode::Wmem) {
            return Some(TargetKind::Data);
        }
        match role {
            OperandRole::JumpTarget => Some(TargetKind::Jump),
            OperandRole::CallTarget => Some(TargetKind::Call),
            OperandRole::MemoryAddress => Some(TargetKind::Data),
            OperandRole::Destination | OperandRole::Value => None,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            TargetKind::Jump => ":jump-",
            TargetKind::Call => ":proc-",
            TargetKind::Data => ":data-",
        }
    }

    fn label(self, address: u16) -> String {
        format!("{}{}", self.prefix(), address)
    }
}

/// One address set per [`TargetKind`]
#[derive(Debug, Clone, Default)]
struct Targets([BTreeSet<u16>; 3]);

impl Targets {
    fn get(&self, kind: TargetKind) -> &BTreeSet<u16> {
        &self.0[kind as usize]
    }

    fn get_mut(&mut self, kind: TargetKind) -> &mut BTreeSet<u16> {
        &mut self.0[kind as usize]
    }
}

/// Pending run of folded `OUT` characters
#[derive(Debug, Default)]
struct OutputRun {
    start: u16,
    text: String,
}

/// Iterates over the instruction boundaries of the loaded program.
fn boundaries(machine: &Machine) -> impl Iterator<Item = u16> + '_ {
    let end = machine.word_count();
    let mut address = 0usize;
    std::iter::from_fn(move || {
        if address >= end {
            return None;
        }
        let current = address as u16;
        address += machine.instruction_size(current);
        Some(current)
    })
}

/// Disassemble the program loaded into `machine`
///
/// Walks the addresses `0..machine.word_count()`.
///
/// # Examples
///
/// ```
/// use synvm::{disassemble, DisassemblyOptions, Machine};
///
/// // JMP 0
/// let machine = Machine::from_words(&[6, 0]).unwrap();
///
/// let plain = disassemble(&machine, DisassemblyOptions::default());
/// assert_eq!(plain, vec!["JMP 0"]);
///
/// let options = DisassemblyOptions { label_jumps: true, ..Default::default() };
/// assert_eq!(disassemble(&machine, options), vec![":jump-0", "JMP :jump-0"]);
/// ```
pub fn disassemble(machine: &Machine, options: DisassemblyOptions) -> Vec<String> {
    let candidates = discover_targets(machine, &options);

    // Alignment filter
    let aligned_addresses: BTreeSet<u16> = boundaries(machine).collect();
    let mut aligned = Targets::default();
    let mut lines = Vec::new();
    for kind in TargetKind::ALL {
        for &address in candidates.get(kind) {
            if aligned_addresses.contains(&address) {
                aligned.get_mut(kind).insert(address);
            } else {
                warn!("{} is not on an instruction boundary", kind.label(address));
                lines.push(format!("# Unaligned {}", kind.label(address)));
            }
        }
    }

    // Emission
    let mut pending = aligned.clone();
    let mut run: Option<OutputRun> = None;
    for address in boundaries(machine) {
        let labelled = TargetKind::ALL
            .iter()
            .any(|&kind| pending.get(kind).contains(&address));
        if labelled {
            flush_print(&mut lines, &mut run, &options);
        }
        for kind in TargetKind::ALL {
            if pending.get_mut(kind).remove(&address) {
                lines.push(kind.label(address));
            }
        }

        let instr = machine.decode(address);

        if options.fold_output {
            if let Some(ch) = foldable_char(&instr) {
                let current = run.get_or_insert_with(|| OutputRun {
                    start: address,
                    text: String::new(),
                });
                if ch == '\n' {
                    let start = current.start;
                    let text = std::mem::take(&mut current.text);
                    run = None;
                    push_address_comment(&mut lines, start, &options);
                    lines.push(format!("!println `{}`", text));
                } else {
                    current.text.push(ch);
                }
                continue;
            }
            flush_print(&mut lines, &mut run, &options);
        }

        push_address_comment(&mut lines, address, &options);
        lines.push(render(&instr, &aligned, &options));
    }
    flush_print(&mut lines, &mut run, &options);

    debug!("disassembled {} words into {} lines", machine.word_count(), lines.len());
    lines
}

/// Collects literal jump, call and memory operands of every instruction.
fn discover_targets(machine: &Machine, options: &DisassemblyOptions) -> Targets {
    let mut targets = Targets::default();

    for address in boundaries(machine) {
        let instr = machine.decode(address);
        let Some(opcode) = instr.opcode else {
            continue;
        };

        for (&role, &word) in opcode.metadata().operands.iter().zip(&instr.operand_words) {
            let Some(kind) = TargetKind::for_operand(opcode, role) else {
                continue;
            };
            if !options.labels(kind) {
                continue;
            }
            if let Some(Operand::Literal(target)) = Operand::decode(word) {
                targets.get_mut(kind).insert(target);
            }
        }
    }

    targets
}

/// Renders an instruction, substituting labels for aligned targets.
fn render(instr: &Instruction, aligned: &Targets, options: &DisassemblyOptions) -> String {
    let Some(opcode) = instr.opcode else {
        return formatter::format_instruction(instr);
    };
    let roles = opcode.metadata().operands;

    formatter::format_with_operands(instr, |index, word| {
        let kind = roles
            .get(index)
            .and_then(|&role| TargetKind::for_operand(opcode, role))
            .filter(|&kind| options.labels(kind));

        match (kind, Operand::decode(word)) {
            (Some(kind), Some(Operand::Literal(target))) if aligned.get(kind).contains(&target) => {
                kind.label(target)
            }
            _ => formatter::format_operand(word),
        }
    })
}

/// Returns the character printed by a foldable `OUT`.
///
/// Only literal operands are folded: newline, and printable ASCII other than
/// the backtick used to delimit macro strings.
fn foldable_char(instr: &Instruction) -> Option<char> {
    if instr.opcode != Some(Opcode::Out) {
        return None;
    }
    match instr.operand_words.first().copied() {
        Some(10) => Some('\n'),
        Some(code @ 0x20..=0x7E) if code != u16::from(b'`') => Some(code as u8 as char),
        _ => None,
    }
}

fn flush_print(lines: &mut Vec<String>, run: &mut Option<OutputRun>, options: &DisassemblyOptions) {
    if let Some(OutputRun { start, text }) = run.take() {
        push_address_comment(lines, start, options);
        lines.push(format!("!print `{}`", text));
    }
}

fn push_address_comment(lines: &mut Vec<String>, address: u16, options: &DisassemblyOptions) {
    if options.address_comments {
        lines.push(format!("# {}", address));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(words: &[u16]) -> Machine {
        Machine::from_words(words).unwrap()
    }

    #[test]
    fn test_disassemble_empty() {
        let lines = disassemble(&Machine::new(), DisassemblyOptions::default());
        assert!(lines.is_empty());
    }

    #[test]
    fn test_boundaries_follow_instruction_sizes() {
        // SET r0 1, NOP, ?? 9999, HALT
        let m = machine(&[1, 32768, 1, 21, 9999, 0]);
        assert_eq!(boundaries(&m).collect::<Vec<_>>(), vec![0, 3, 4, 5]);
    }

    #[test]
    fn test_foldable_char() {
        let m = machine(&[19, 65, 19, 10, 19, 96, 19, 32768, 19, 7]);

        assert_eq!(foldable_char(&m.decode(0)), Some('A'));
        assert_eq!(foldable_char(&m.decode(2)), Some('\n'));
        assert_eq!(foldable_char(&m.decode(4)), None); // backtick
        assert_eq!(foldable_char(&m.decode(6)), None); // register
        assert_eq!(foldable_char(&m.decode(8)), None); // bell
    }

    #[test]
    fn test_discovery_respects_options() {
        // CALL 4, JMP 6, HALT, RMEM r0 7
        let m = machine(&[17, 4, 6, 6, 0, 15, 32768, 7]);

        let none = discover_targets(&m, &DisassemblyOptions::default());
        assert!(TargetKind::ALL.iter().all(|&kind| none.get(kind).is_empty()));

        let options = DisassemblyOptions {
            label_jumps: true,
            label_calls: true,
            label_memory: true,
            ..Default::default()
        };
        let all = discover_targets(&m, &options);
        assert_eq!(all.get(TargetKind::Call).iter().copied().collect::<Vec<_>>(), vec![4]);
        assert_eq!(all.get(TargetKind::Jump).iter().copied().collect::<Vec<_>>(), vec![6]);
        assert_eq!(all.get(TargetKind::Data).iter().copied().collect::<Vec<_>>(), vec![7]);
    }
}
