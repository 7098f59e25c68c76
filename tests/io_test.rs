//! Tests for OUT, IN and the suspend/resolve protocol.

use synvm::{ExecutionError, Interrupt, Machine, Operand};

const R0: u16 = 32768;
const R1: u16 = 32769;
const R3: u16 = 32771;

#[test]
fn test_out_literal_and_register() {
    // OUT 72, OUT r0
    let mut machine = Machine::from_words(&[19, 72, 19, R0]).unwrap();
    machine.set_register(0, 105).unwrap();

    assert_eq!(machine.step(), Ok(Interrupt::Output(72)));
    assert_eq!(machine.ip(), 2);
    assert_eq!(machine.step(), Ok(Interrupt::Output(105)));
    assert_eq!(machine.ip(), 4);
}

#[test]
fn test_in_suspends_until_resolved() {
    // IN r3, HALT
    let mut machine = Machine::from_words(&[20, R3, 0]).unwrap();

    let interrupt = machine.step().unwrap();
    assert_eq!(interrupt, Interrupt::Input(Operand::Register(3)));
    assert_eq!(machine.ip(), 0);
    assert_eq!(machine.pending_input(), Some(Operand::Register(3)));

    machine.resolve(Operand::Register(3), 65).unwrap();
    assert_eq!(machine.registers()[3], 65);
    assert_eq!(machine.pending_input(), None);

    assert_eq!(machine.step(), Ok(Interrupt::None));
    assert_eq!(machine.ip(), 2);
    assert_eq!(machine.step(), Ok(Interrupt::Halt));
}

#[test]
fn test_unresolved_input_is_repeated_without_mutation() {
    let mut machine = Machine::from_words(&[20, R0]).unwrap();

    let first = machine.step().unwrap();
    let snapshot = machine.clone();
    for _ in 0..5 {
        assert_eq!(machine.step().unwrap(), first);
    }

    assert_eq!(machine.ip(), snapshot.ip());
    assert_eq!(machine.registers(), snapshot.registers());
    assert_eq!(machine.stack(), snapshot.stack());
}

#[test]
fn test_resolve_without_pending_input() {
    let mut machine = Machine::from_words(&[21]).unwrap();

    assert_eq!(
        machine.resolve(Operand::Register(0), 1),
        Err(ExecutionError::InputNotPending)
    );
}

#[test]
fn test_resolve_twice_fails() {
    let mut machine = Machine::from_words(&[20, R0, 0]).unwrap();
    machine.step().unwrap();

    machine.resolve(Operand::Register(0), 65).unwrap();
    assert_eq!(
        machine.resolve(Operand::Register(0), 66),
        Err(ExecutionError::InputNotPending)
    );
    assert_eq!(machine.registers()[0], 65);
}

#[test]
fn test_resolve_rejects_wide_values() {
    let mut machine = Machine::from_words(&[20, R0]).unwrap();
    machine.step().unwrap();

    assert!(matches!(
        machine.resolve(Operand::Register(0), 32768),
        Err(ExecutionError::OutOfRange { .. })
    ));
    assert_eq!(machine.pending_input(), Some(Operand::Register(0)));
}

#[test]
fn test_set_ip_abandons_pending_input() {
    let mut machine = Machine::from_words(&[20, R0, 0]).unwrap();
    machine.step().unwrap();

    machine.set_ip(2).unwrap();
    assert_eq!(machine.pending_input(), None);
    assert_eq!(machine.step(), Ok(Interrupt::Halt));
}

#[test]
fn test_supplied_input_belongs_to_its_instruction() {
    // IN r0, IN r1, HALT
    let mut machine = Machine::from_words(&[20, R0, 20, R1, 0]).unwrap();
    machine.step().unwrap();
    machine.resolve(Operand::Register(0), 65).unwrap();

    // Replace the first IN with two NOPs before it completes
    machine.set_memory_cell(0, 21).unwrap();
    machine.set_memory_cell(1, 21).unwrap();

    assert_eq!(machine.step(), Ok(Interrupt::None));
    assert_eq!(machine.step(), Ok(Interrupt::None));
    assert_eq!(machine.step(), Ok(Interrupt::Input(Operand::Register(1))));
    assert_eq!(machine.ip(), 2);
    assert_eq!(machine.pending_input(), Some(Operand::Register(1)));
}

#[test]
fn test_run_for_steps_collects_output_and_stops_on_input() {
    // OUT 111, OUT 107, IN r0, HALT
    let mut machine = Machine::from_words(&[19, 111, 19, 107, 20, R0, 0]).unwrap();

    let mut printed = Vec::new();
    let stop = machine.run_for_steps(100, |code| printed.push(code)).unwrap();

    assert_eq!(stop, Interrupt::Input(Operand::Register(0)));
    assert_eq!(printed, vec![111, 107]);

    machine.resolve(Operand::Register(0), 10).unwrap();
    assert_eq!(machine.run_for_steps(100, |_| {}), Ok(Interrupt::Halt));
    assert_eq!(machine.registers()[0], 10);
}
