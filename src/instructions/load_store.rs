//! # Load and Store Instructions
//!
//! This module implements register and memory transfers:
//! - SET: Copy a value into a destination
//! - RMEM: Read the memory word at an address
//! - WMEM: Write a value to the memory word at an address

use crate::operand::MAX_VALUE;
use crate::{ExecutionError, Interrupt, Machine, OpcodeMetadata};

/// Executes SET a b.
pub(crate) fn execute_set(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    let destination = vm.operand(0)?;
    let value = vm.value(1)?;

    vm.write_destination(destination, value);
    vm.advance(metadata);

    Ok(Interrupt::None)
}

/// Executes RMEM a b: `a` receives the memory word at address `b`.
///
/// Memory may hold raw words above 32767 (encoded register selectors); they
/// are reduced modulo 32768 so the destination always holds a valid value.
pub(crate) fn execute_rmem(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    let destination = vm.operand(0)?;
    let address = vm.value(1)?;

    let word = vm.memory.read(address) & MAX_VALUE;

    vm.write_destination(destination, word);
    vm.advance(metadata);

    Ok(Interrupt::None)
}

/// Executes WMEM a b: the memory word at address `a` receives `b`.
pub(crate) fn execute_wmem(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    let address = vm.value(0)?;
    let value = vm.value(1)?;

    vm.memory.write(address, value);
    vm.advance(metadata);

    Ok(Interrupt::None)
}
