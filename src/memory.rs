//! # Word Memory and Program Codec
//!
//! This module provides the machine's flat 32768-word memory and the helpers
//! converting between the binary program format and word sequences.
//!
//! ## Binary Program Format
//!
//! A program file is a plain sequence of little-endian 16-bit words with no
//! header, magic number or length prefix. It is loaded starting at address 0,
//! and its length in words is its length in bytes divided by two. A trailing
//! odd byte is ignored.

use crate::ExecutionError;

/// Number of addressable memory words.
pub const MEMORY_SIZE: usize = 32768;

/// Mask reducing any address to the 15-bit address space.
pub const ADDRESS_MASK: u16 = 0x7FFF;

/// Flat 32768-word memory.
///
/// All addresses (0..=32767) are writable and initialized to zero. Addresses
/// wrap at the top of memory: a read or write at `addr` touches cell
/// `addr & 0x7FFF`.
///
/// Cells hold raw words. Unlike registers, a memory cell may contain any
/// 16-bit value, since encoded operands (register selectors) live in memory.
///
/// # Examples
///
/// ```
/// use synvm::FlatMemory;
///
/// let mut mem = FlatMemory::new();
/// mem.write(0x1234, 42);
/// assert_eq!(mem.read(0x1234), 42);
///
/// // Addresses wrap at 32768
/// mem.write(32768, 7);
/// assert_eq!(mem.read(0), 7);
/// ```
#[derive(Clone)]
pub struct FlatMemory {
    data: Box<[u16; MEMORY_SIZE]>,
}

impl FlatMemory {
    /// Creates a new FlatMemory instance with all words initialized to zero.
    pub fn new() -> Self {
        Self {
            data: Box::new([0; MEMORY_SIZE]),
        }
    }

    /// Reads the word at `addr` (wrapped to 15 bits).
    pub fn read(&self, addr: u16) -> u16 {
        self.data[(addr & ADDRESS_MASK) as usize]
    }

    /// Writes `value` at `addr` (wrapped to 15 bits).
    pub fn write(&mut self, addr: u16, value: u16) {
        self.data[(addr & ADDRESS_MASK) as usize] = value;
    }

    /// Zero-fills memory and copies `words` to address 0.
    ///
    /// Fails with [`ExecutionError::OutOfMemory`] without touching memory if
    /// the program does not fit.
    pub fn load(&mut self, words: &[u16]) -> Result<(), ExecutionError> {
        if words.len() > MEMORY_SIZE {
            return Err(ExecutionError::OutOfMemory {
                words: words.len(),
                capacity: MEMORY_SIZE,
            });
        }

        self.data.fill(0);
        self.data[..words.len()].copy_from_slice(words);
        Ok(())
    }

    /// Returns the whole memory as a slice.
    pub fn as_slice(&self) -> &[u16] {
        &self.data[..]
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FlatMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let used = self.data.iter().filter(|&&word| word != 0).count();
        f.debug_struct("FlatMemory")
            .field("size", &MEMORY_SIZE)
            .field("nonzero_words", &used)
            .finish()
    }
}

/// Decodes a binary program (little-endian words) into a word vector.
///
/// # Examples
///
/// ```
/// use synvm::decode_words;
///
/// assert_eq!(decode_words(&[0x06, 0x00, 0x00, 0x80]), vec![6, 0x8000]);
/// // Trailing odd byte is ignored
/// assert_eq!(decode_words(&[0x13, 0x00, 0xFF]), vec![19]);
/// ```
pub fn decode_words(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Encodes words into the binary program format (little-endian).
pub fn encode_words(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_le_bytes()).collect()
}
