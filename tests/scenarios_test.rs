//! End-to-end scenarios across the assembler, the machine and the
//! disassembler.

use synvm::{
    assemble, disassemble, encode_words, DisassemblyOptions, Interrupt, Machine, Operand,
};

/// Runs until HALT, collecting output. Panics on Input or after `limit` steps.
fn run_to_halt(machine: &mut Machine, limit: u64) -> Vec<u16> {
    let mut output = Vec::new();
    let stop = machine
        .run_for_steps(limit, |code| output.push(code))
        .unwrap();
    assert_eq!(stop, Interrupt::Halt);
    output
}

#[test]
fn test_scenario_a_add_and_output() {
    let program = assemble("SET r0 1\nADD r0 r0 1\nOUT r0\nHALT").unwrap();
    let mut machine = Machine::from_bytes(&program.bytes).unwrap();

    assert_eq!(machine.step(), Ok(Interrupt::None));
    assert_eq!(machine.step(), Ok(Interrupt::None));
    assert_eq!(machine.step(), Ok(Interrupt::Output(2)));
    assert_eq!(machine.step(), Ok(Interrupt::Halt));
    assert_eq!(machine.registers()[0], 2);
}

#[test]
fn test_scenario_b_infinite_loop() {
    let program = assemble(":loop\nJMP :loop").unwrap();
    assert_eq!(program.words, vec![6, 0]);

    let mut machine = Machine::from_bytes(&program.bytes).unwrap();
    for _ in 0..10_000 {
        assert_eq!(machine.step(), Ok(Interrupt::None));
        assert_eq!(machine.ip(), 0);
    }
}

#[test]
fn test_scenario_c_data_after_instructions() {
    let program = assemble("SET r0 .values\nNOP\n.values 0 5").unwrap();

    assert_eq!(program.code_words, 4);
    assert_eq!(program.words[2], 4);
    assert_eq!(program.words.len(), 9);
    assert_eq!(&program.words[4..], &[0, 0, 0, 0, 0]);
    assert_eq!(&program.bytes[program.bytes.len() - 10..], &[0; 10]);
}

#[test]
fn test_scenario_d_raw_data_marker() {
    let machine = Machine::from_words(&[9999]).unwrap();

    assert_eq!(machine.disasm(0), "?? 9999");
    assert_eq!(
        disassemble(&machine, DisassemblyOptions::default()),
        vec!["?? 9999"]
    );
}

#[test]
fn test_round_trip_through_address_comments() {
    let source = "\
SET r1 10
PUSH r1
POP r2
EQ r3 r1 r2
MUL r4 r1 r1
MOD r5 r4 7
WMEM 200 r5
RMEM r6 200
NOT r7 r6
OUT 79
OUT 75
?? 9999
HALT";
    let original = assemble(source).unwrap();
    let machine = Machine::from_bytes(&original.bytes).unwrap();

    let options = DisassemblyOptions {
        address_comments: true,
        ..Default::default()
    };
    let text = disassemble(&machine, options).join("\n");
    let reassembled = assemble(&text).unwrap();

    assert_eq!(reassembled.bytes, original.bytes);
}

#[test]
fn test_countdown_program() {
    let source = "\
.counter 3
RMEM r0 .counter
:loop
JF r0 :done
ADD r1 r0 48
OUT r1
ADD r0 r0 32767
JMP :loop
:done
!println ` liftoff`
HALT";
    let program = assemble(source).unwrap();
    let mut machine = Machine::from_bytes(&program.bytes).unwrap();

    let output = run_to_halt(&mut machine, 1000);
    let text: String = output.iter().map(|&c| c as u8 as char).collect();
    assert_eq!(text, "321 liftoff\n");
}

#[test]
fn test_procedure_with_negation() {
    let source = "\
SET r1 5
CALL :negate
ADD r2 r0 5
HALT
:negate
!neg r0 r1
RET";
    let program = assemble(source).unwrap();
    let mut machine = Machine::from_bytes(&program.bytes).unwrap();

    run_to_halt(&mut machine, 100);
    assert_eq!(machine.registers()[0], 32763);
    assert_eq!(machine.registers()[2], 0);
    assert!(machine.stack().is_empty());
}

#[test]
fn test_echo_with_host_input() {
    let program = assemble(":next\nIN r0\nEQ r1 r0 10\nJT r1 :end\nOUT r0\nJMP :next\n:end\nHALT")
        .unwrap();
    let mut machine = Machine::from_bytes(&program.bytes).unwrap();

    let mut input = b"hey\n".iter();
    let mut echoed = Vec::new();
    loop {
        match machine.run_for_steps(100, |code| echoed.push(code)).unwrap() {
            Interrupt::Input(destination) => {
                assert_eq!(destination, Operand::Register(0));
                let byte = *input.next().unwrap();
                machine.resolve(destination, byte as u16).unwrap();
            }
            Interrupt::Halt => break,
            other => panic!("unexpected {:?}", other),
        }
    }

    assert_eq!(echoed, vec![104, 101, 121]);
}

#[test]
fn test_reload_resets_state() {
    let mut machine = Machine::from_words(&[2, 7, 0]).unwrap();
    run_to_halt(&mut machine, 10);
    assert_eq!(machine.stack(), &[7]);

    machine.load_bytes(&encode_words(&[21])).unwrap();
    assert_eq!(machine.ip(), 0);
    assert!(machine.stack().is_empty());
    assert!(!machine.is_halted());
    assert_eq!(machine.word_count(), 1);
    assert_eq!(machine.memory()[1], 0);
}
