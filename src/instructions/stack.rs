//! # Stack Operations
//!
//! This module implements stack manipulation instructions:
//! - PUSH: Push a value onto the stack
//! - POP: Pop the top of the stack into a destination
//!
//! The stack is unbounded and lives outside the 32768-word memory.

use crate::{ExecutionError, Interrupt, Machine, OpcodeMetadata};

/// Executes PUSH a.
pub(crate) fn execute_push(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    let value = vm.value(0)?;

    vm.stack.push(value);
    vm.advance(metadata);

    Ok(Interrupt::None)
}

/// Executes POP a.
///
/// Fails with [`ExecutionError::StackUnderflow`] on an empty stack, leaving
/// the destination and IP untouched.
pub(crate) fn execute_pop(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    let destination = vm.operand(0)?;
    let value = vm.stack.pop().ok_or(ExecutionError::StackUnderflow {
        address: vm.ip,
        mnemonic: metadata.mnemonic,
    })?;

    vm.write_destination(destination, value);
    vm.advance(metadata);

    Ok(Interrupt::None)
}
