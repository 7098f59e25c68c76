//! Fuzz target for the assembler.
//!
//! This target feeds arbitrary strings to the assembler to find
//! edge cases, panics, and crashes in parsing and encoding.

#![no_main]

use libfuzzer_sys::fuzz_target;
use synvm::{assemble, decode_words};

fuzz_target!(|data: &[u8]| {
    let source = String::from_utf8_lossy(data);

    match assemble(&source) {
        Ok(output) => {
            // Bytes and words must describe the same program
            assert_eq!(output.bytes.len(), output.words.len() * 2);
            assert_eq!(decode_words(&output.bytes), output.words);
            assert!(output.code_words <= output.words.len());
        }
        Err(errors) => {
            // A failed assembly always explains itself
            assert!(!errors.is_empty());
            assert!(errors.iter().all(|e| e.line >= 1));
        }
    }
});
