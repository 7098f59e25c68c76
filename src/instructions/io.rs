//! # Character I/O
//!
//! This module implements the two instructions that talk to the host:
//! - OUT: Emit a character code, returned as [`Interrupt::Output`]
//! - IN: Read a character code, suspending with [`Interrupt::Input`]
//!
//! OUT completes within a single step. IN spans at least two steps, see the
//! input protocol in [`crate::cpu`].

use log::debug;

use crate::cpu::InputState;
use crate::{ExecutionError, Interrupt, Machine, OpcodeMetadata};

/// Executes OUT a.
pub(crate) fn execute_out(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    let code = vm.value(0)?;

    vm.advance(metadata);

    Ok(Interrupt::Output(code))
}

/// Executes IN a.
///
/// - No value supplied yet: suspend, leaving the IP on this instruction.
/// - Still waiting: return the same interrupt again, changing nothing.
/// - Value supplied by `resolve()`: complete and advance.
pub(crate) fn execute_in(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    match vm.input_at_ip() {
        InputState::Idle => {
            let destination = vm.operand(0)?;
            debug!("IN at {} waiting for input into {}", vm.ip, destination);

            vm.input = InputState::Pending {
                address: vm.ip,
                destination,
            };
            Ok(Interrupt::Input(destination))
        }
        InputState::Pending { destination, .. } => Ok(Interrupt::Input(destination)),
        InputState::Supplied { .. } => {
            vm.input = InputState::Idle;
            vm.advance(metadata);
            Ok(Interrupt::None)
        }
    }
}
