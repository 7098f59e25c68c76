//! # Control Flow Instructions
//!
//! This module implements control flow instructions:
//! - HALT: Stop execution
//! - JMP: Unconditional jump
//! - JT, JF: Conditional jumps on a nonzero / zero value
//! - CALL, RET: Subroutine call and return through the stack
//! - NOP: No operation
//!
//! Taken jumps set the IP directly; everything else advances it by the
//! instruction size.

use crate::{ExecutionError, Interrupt, Machine, OpcodeMetadata};

/// Executes HALT.
///
/// The IP stays on the HALT instruction and the machine becomes terminal:
/// any further `step()` fails with [`ExecutionError::MachineHalted`].
pub(crate) fn execute_halt(
    vm: &mut Machine,
    _metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    vm.halted = true;
    Ok(Interrupt::Halt)
}

/// Executes JMP a.
pub(crate) fn execute_jmp(
    vm: &mut Machine,
    _metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    let target = vm.value(0)?;
    vm.jump(target);
    Ok(Interrupt::None)
}

/// Executes JT a b: jump to `b` if `a` is nonzero.
pub(crate) fn execute_jt(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    let condition = vm.value(0)?;
    let target = vm.value(1)?;

    if condition != 0 {
        vm.jump(target);
    } else {
        vm.advance(metadata);
    }
    Ok(Interrupt::None)
}

/// Executes JF a b: jump to `b` if `a` is zero.
pub(crate) fn execute_jf(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    let condition = vm.value(0)?;
    let target = vm.value(1)?;

    if condition == 0 {
        vm.jump(target);
    } else {
        vm.advance(metadata);
    }
    Ok(Interrupt::None)
}

/// Executes CALL a.
///
/// Pushes the address of the next instruction, then jumps to `a`.
pub(crate) fn execute_call(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    let target = vm.value(0)?;

    vm.advance(metadata);
    vm.stack.push(vm.ip);
    vm.jump(target);

    Ok(Interrupt::None)
}

/// Executes RET.
///
/// Pops the return address and jumps to it. Fails with
/// [`ExecutionError::StackUnderflow`] on an empty stack.
pub(crate) fn execute_ret(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    let target = vm.stack.pop().ok_or(ExecutionError::StackUnderflow {
        address: vm.ip,
        mnemonic: metadata.mnemonic,
    })?;

    vm.jump(target);
    Ok(Interrupt::None)
}

/// Executes NOP.
pub(crate) fn execute_nop(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    vm.advance(metadata);
    Ok(Interrupt::None)
}
