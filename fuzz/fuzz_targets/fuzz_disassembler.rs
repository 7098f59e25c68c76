//! Fuzz target for the disassembler.
//!
//! This target feeds arbitrary word sequences to the disassembler and checks
//! that plain output reassembles into the same program.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use synvm::{assemble, disassemble, DisassemblyOptions, Machine};

/// Disassembly options for fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzOptions {
    fold_output: bool,
    label_jumps: bool,
    label_calls: bool,
    label_memory: bool,
    address_comments: bool,
}

/// Complete fuzz input
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    words: Vec<u16>,
    options: FuzzOptions,
}

fuzz_target!(|input: FuzzInput| {
    // Limit input size to prevent OOM
    if input.words.len() > 4096 {
        return;
    }

    let Ok(machine) = Machine::from_words(&input.words) else {
        return;
    };

    let options = DisassemblyOptions {
        fold_output: input.options.fold_output,
        label_jumps: input.options.label_jumps,
        label_calls: input.options.label_calls,
        label_memory: input.options.label_memory,
        address_comments: input.options.address_comments,
    };
    let _ = disassemble(&machine, options);

    // Plain output of a program whose last instruction fits must reassemble
    let end: usize = {
        let mut address = 0usize;
        while address < input.words.len() {
            address += machine.instruction_size(address as u16);
        }
        address
    };
    if end != input.words.len() {
        return;
    }
    let source = disassemble(&machine, DisassemblyOptions::default()).join("\n");
    if let Ok(output) = assemble(&source) {
        assert_eq!(output.words, input.words);
    }
});
