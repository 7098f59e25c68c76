//! Tests for control flow instructions: HALT, JMP, JT, JF, CALL, RET, NOP.

use synvm::{ExecutionError, Interrupt, Machine};

const R0: u16 = 32768;

fn setup_machine(program: &[u16]) -> Machine {
    Machine::from_words(program).unwrap()
}

#[test]
fn test_halt_is_terminal() {
    let mut machine = setup_machine(&[0]);

    assert_eq!(machine.step(), Ok(Interrupt::Halt));
    assert!(machine.is_halted());
    assert_eq!(machine.ip(), 0);

    assert_eq!(machine.step(), Err(ExecutionError::MachineHalted));
    assert_eq!(machine.step(), Err(ExecutionError::MachineHalted));
}

#[test]
fn test_nop_advances() {
    let mut machine = setup_machine(&[21, 21, 0]);

    assert_eq!(machine.step(), Ok(Interrupt::None));
    assert_eq!(machine.ip(), 1);
    assert_eq!(machine.step(), Ok(Interrupt::None));
    assert_eq!(machine.ip(), 2);
}

#[test]
fn test_jmp_literal_and_register() {
    // JMP 4, ?? 9999, ?? 9999, JMP r0
    let mut machine = setup_machine(&[6, 4, 9999, 9999, 6, R0]);
    machine.set_register(0, 2).unwrap();

    machine.step().unwrap();
    assert_eq!(machine.ip(), 4);

    machine.step().unwrap();
    assert_eq!(machine.ip(), 2);
}

#[test]
fn test_jt_taken_and_not_taken() {
    // JT r0 10, twice
    let mut machine = setup_machine(&[7, R0, 10, 7, R0, 10]);

    machine.step().unwrap();
    assert_eq!(machine.ip(), 3);

    machine.set_register(0, 1).unwrap();
    machine.step().unwrap();
    assert_eq!(machine.ip(), 10);
}

#[test]
fn test_jf_taken_and_not_taken() {
    // JF 1 10, JF 0 20
    let mut machine = setup_machine(&[8, 1, 10, 8, 0, 20]);

    machine.step().unwrap();
    assert_eq!(machine.ip(), 3);

    machine.step().unwrap();
    assert_eq!(machine.ip(), 20);
}

#[test]
fn test_call_pushes_return_address() {
    // CALL 5, HALT, ?? 0, ?? 0, RET
    let mut machine = setup_machine(&[17, 5, 0, 0, 0, 18]);

    machine.step().unwrap();
    assert_eq!(machine.ip(), 5);
    assert_eq!(machine.stack(), &[2]);

    machine.step().unwrap();
    assert_eq!(machine.ip(), 2);
    assert!(machine.stack().is_empty());

    assert_eq!(machine.step(), Ok(Interrupt::Halt));
}

#[test]
fn test_ret_on_empty_stack() {
    let mut machine = setup_machine(&[21, 18]);
    machine.step().unwrap();

    assert_eq!(
        machine.step(),
        Err(ExecutionError::StackUnderflow {
            address: 1,
            mnemonic: "RET"
        })
    );
    assert_eq!(machine.ip(), 1);
}

#[test]
fn test_illegal_opcode() {
    let mut machine = setup_machine(&[9999]);

    assert_eq!(
        machine.step(),
        Err(ExecutionError::IllegalOpcode {
            address: 0,
            word: 9999
        })
    );
}

#[test]
fn test_ip_wraps_at_end_of_memory() {
    let mut machine = Machine::new();
    machine.set_memory_cell(32767, 21).unwrap();
    machine.set_ip(32767).unwrap();

    machine.step().unwrap();
    assert_eq!(machine.ip(), 0);
}

#[test]
fn test_run_for_steps_budget() {
    // :loop JMP :loop
    let mut machine = setup_machine(&[6, 0]);

    let mut outputs = 0;
    assert_eq!(machine.run_for_steps(1000, |_| outputs += 1), Ok(Interrupt::None));
    assert_eq!(outputs, 0);
    assert!(!machine.is_halted());
}
