//! Fuzz target for machine execution.
//!
//! This target loads arbitrary words and register contents, then executes a
//! bounded number of steps to find edge cases and crashes.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use synvm::{Interrupt, Machine, MAX_VALUE};

/// Complete fuzz input
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Program words loaded at address 0
    program: Vec<u16>,
    /// Initial register contents (masked to 15 bits)
    registers: [u16; 8],
    /// Values supplied to IN, consumed in order
    input: Vec<u16>,
}

fuzz_target!(|input: FuzzInput| {
    // Limit program size to the memory size
    if input.program.len() > 32768 {
        return;
    }

    let Ok(mut machine) = Machine::from_words(&input.program) else {
        return;
    };
    for (index, &value) in input.registers.iter().enumerate() {
        machine.set_register(index, value & MAX_VALUE).unwrap();
    }

    let mut supplies = input.input.iter();
    for _ in 0..1024 {
        // We don't care about execution errors - just no panics
        let Ok(interrupt) = machine.step() else {
            break;
        };
        match interrupt {
            Interrupt::Halt => {
                assert!(machine.is_halted());
                break;
            }
            Interrupt::Input(destination) => {
                let Some(&value) = supplies.next() else {
                    break;
                };
                machine.resolve(destination, value & MAX_VALUE).unwrap();
            }
            Interrupt::None | Interrupt::Output(_) => {}
        }

        // Machine invariants
        assert!((machine.ip() as usize) < 32768);
        assert!(machine.registers().iter().all(|&r| r <= MAX_VALUE));
        assert!(machine.stack().iter().all(|&v| v <= MAX_VALUE));
    }
});
