//! # ALU (Arithmetic Logic Unit) Instructions
//!
//! This module implements arithmetic, logical and comparison operations:
//! - ADD, MUL, MOD: arithmetic modulo 32768
//! - AND, OR, NOT: 15-bit bitwise logic
//! - EQ, GT: comparisons producing 0 or 1
//!
//! All three-operand forms share the layout `OP a b c`: `b` and `c` are
//! resolved values, the result is written to destination `a`.

use crate::operand::{MAX_VALUE, MODULUS};
use crate::{ExecutionError, Interrupt, Machine, OpcodeMetadata};

/// Decodes `a b c`, computes `op(b, c)` and writes it to `a`.
fn execute_binary<F>(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
    op: F,
) -> Result<Interrupt, ExecutionError>
where
    F: FnOnce(u16, u16) -> Result<u16, ExecutionError>,
{
    let destination = vm.operand(0)?;
    let b = vm.value(1)?;
    let c = vm.value(2)?;

    let result = op(b, c)?;

    vm.write_destination(destination, result);
    vm.advance(metadata);

    Ok(Interrupt::None)
}

/// Executes ADD: `a = (b + c) mod 32768`.
pub(crate) fn execute_add(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    execute_binary(vm, metadata, |b, c| {
        Ok(((b as u32 + c as u32) % MODULUS) as u16)
    })
}

/// Executes MUL: `a = (b * c) mod 32768`.
pub(crate) fn execute_mul(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    execute_binary(vm, metadata, |b, c| {
        Ok(((b as u32 * c as u32) % MODULUS) as u16)
    })
}

/// Executes MOD: `a = b mod c`.
///
/// Fails with [`ExecutionError::DivisionByZero`] when `c` is zero.
pub(crate) fn execute_mod(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    let address = vm.ip;
    execute_binary(vm, metadata, |b, c| {
        if c == 0 {
            return Err(ExecutionError::DivisionByZero { address });
        }
        Ok(b % c)
    })
}

/// Executes AND: `a = b & c`.
pub(crate) fn execute_and(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    execute_binary(vm, metadata, |b, c| Ok(b & c))
}

/// Executes OR: `a = b | c`.
pub(crate) fn execute_or(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    execute_binary(vm, metadata, |b, c| Ok(b | c))
}

/// Executes EQ: `a = 1` if `b == c`, otherwise `a = 0`.
pub(crate) fn execute_eq(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    execute_binary(vm, metadata, |b, c| Ok((b == c) as u16))
}

/// Executes GT: `a = 1` if `b > c`, otherwise `a = 0`.
pub(crate) fn execute_gt(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    execute_binary(vm, metadata, |b, c| Ok((b > c) as u16))
}

/// Executes NOT: `a` receives the 15-bit bitwise inverse of `b`.
pub(crate) fn execute_not(
    vm: &mut Machine,
    metadata: &OpcodeMetadata,
) -> Result<Interrupt, ExecutionError> {
    let destination = vm.operand(0)?;
    let b = vm.value(1)?;

    vm.write_destination(destination, !b & MAX_VALUE);
    vm.advance(metadata);

    Ok(Interrupt::None)
}
