//! Tests for the arithmetic, logic and comparison instructions.
//!
//! Tests cover:
//! - ADD and MUL modulo 32768
//! - MOD, including division by zero
//! - AND, OR and 15-bit NOT
//! - EQ and GT results
//! - Register and memory destinations

use synvm::{ExecutionError, Interrupt, Machine};

const R0: u16 = 32768;
const R1: u16 = 32769;
const R2: u16 = 32770;

/// Helper function to load a program and preset registers
fn setup_machine(program: &[u16], registers: &[(usize, u16)]) -> Machine {
    let mut machine = Machine::from_words(program).unwrap();
    for &(index, value) in registers {
        machine.set_register(index, value).unwrap();
    }
    machine
}

// ========== Arithmetic ==========

#[test]
fn test_add_literals() {
    // ADD r0 2 3
    let mut machine = setup_machine(&[9, R0, 2, 3], &[]);

    assert_eq!(machine.step(), Ok(Interrupt::None));
    assert_eq!(machine.registers()[0], 5);
    assert_eq!(machine.ip(), 4);
}

#[test]
fn test_add_wraps_modulo_32768() {
    // ADD r0 r1 r2
    let mut machine = setup_machine(&[9, R0, R1, R2], &[(1, 32758), (2, 15)]);

    machine.step().unwrap();
    assert_eq!(machine.registers()[0], 5);
}

#[test]
fn test_add_same_register_as_source_and_destination() {
    // ADD r0 r0 1
    let mut machine = setup_machine(&[9, R0, R0, 1], &[(0, 41)]);

    machine.step().unwrap();
    assert_eq!(machine.registers()[0], 42);
}

#[test]
fn test_mul_wraps_modulo_32768() {
    // MUL r0 r1 r2
    let mut machine = setup_machine(&[10, R0, R1, R2], &[(1, 256), (2, 129)]);

    machine.step().unwrap();
    assert_eq!(machine.registers()[0], (256 * 129) % 32768);
}

#[test]
fn test_mod() {
    // MOD r0 17 5
    let mut machine = setup_machine(&[11, R0, 17, 5], &[]);

    machine.step().unwrap();
    assert_eq!(machine.registers()[0], 2);
}

#[test]
fn test_mod_by_zero_fails_without_side_effects() {
    // MOD r0 17 r1 with r1 = 0
    let mut machine = setup_machine(&[11, R0, 17, R1], &[(0, 9)]);

    assert_eq!(
        machine.step(),
        Err(ExecutionError::DivisionByZero { address: 0 })
    );
    assert_eq!(machine.registers()[0], 9);
    assert_eq!(machine.ip(), 0);
}

// ========== Bitwise Logic ==========

#[test]
fn test_and_or() {
    // AND r0 r1 r2, OR r1 r1 r2
    let mut machine = setup_machine(&[12, R0, R1, R2, 13, R1, R1, R2], &[(1, 0b1100), (2, 0b1010)]);

    machine.step().unwrap();
    assert_eq!(machine.registers()[0], 0b1000);

    machine.step().unwrap();
    assert_eq!(machine.registers()[1], 0b1110);
    assert_eq!(machine.ip(), 8);
}

#[test]
fn test_not_is_15_bit() {
    // NOT r0 0, NOT r1 32767, NOT r2 21845
    let mut machine = setup_machine(&[14, R0, 0, 14, R1, 32767, 14, R2, 21845], &[]);

    machine.step().unwrap();
    machine.step().unwrap();
    machine.step().unwrap();

    assert_eq!(machine.registers()[0], 32767);
    assert_eq!(machine.registers()[1], 0);
    assert_eq!(machine.registers()[2], 10922);
    assert_eq!(machine.ip(), 9);
}

// ========== Comparisons ==========

#[test]
fn test_eq() {
    // EQ r0 r1 7, EQ r2 r1 8
    let mut machine = setup_machine(&[4, R0, R1, 7, 4, R2, R1, 8], &[(1, 7)]);

    machine.step().unwrap();
    machine.step().unwrap();

    assert_eq!(machine.registers()[0], 1);
    assert_eq!(machine.registers()[2], 0);
}

#[test]
fn test_gt() {
    // GT r0 5 4, GT r1 4 4, GT r2 3 4
    let mut machine = setup_machine(&[5, R0, 5, 4, 5, R1, 4, 4, 5, R2, 3, 4], &[(1, 9), (2, 9)]);

    for _ in 0..3 {
        machine.step().unwrap();
    }

    assert_eq!(machine.registers()[..3], [1, 0, 0]);
}

// ========== Destinations and Operands ==========

#[test]
fn test_literal_destination_writes_memory() {
    // ADD 100 1 2
    let mut machine = setup_machine(&[9, 100, 1, 2], &[]);

    machine.step().unwrap();
    assert_eq!(machine.memory()[100], 3);
    assert_eq!(machine.registers(), &[0; 8]);
}

#[test]
fn test_invalid_operand_word() {
    // ADD r0 32776 1
    let mut machine = setup_machine(&[9, R0, 32776, 1], &[]);

    assert_eq!(
        machine.step(),
        Err(ExecutionError::InvalidOperand {
            address: 2,
            word: 32776
        })
    );
    assert_eq!(machine.ip(), 0);
}
