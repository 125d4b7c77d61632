//! Key derivation for literal sites
//!
//! A key is `<prefix><n>` where `n` is the first four bytes of the SHA-256 digest of a context
//! string, read as a big-endian `u32`. The context string describes where the literal sits:
//!
//!     declarator:<name>:<line>           initializer of `name`, declared on `line`
//!     argument:<raw>:<index>:<line>      call argument with source text `raw`
//!     location:<line>:<column>           anything else
//!
//! Lines are 1-based, columns 0-based. Equal contexts always hash to equal keys; collisions
//! between different contexts are not detected.

use sha2::{Digest, Sha256};
use std::fmt;

/// The structural context a key is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext<'a> {
    Declarator { name: &'a str, line: usize },
    Argument { raw: &'a str, index: usize, line: usize },
    Location { line: usize, column: usize },
}

impl fmt::Display for KeyContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyContext::Declarator { name, line } => write!(f, "declarator:{}:{}", name, line),
            KeyContext::Argument { raw, index, line } => {
                write!(f, "argument:{}:{}:{}", raw, index, line)
            }
            KeyContext::Location { line, column } => write!(f, "location:{}:{}", line, column),
        }
    }
}

/// Deterministic 32-bit hash of a context string
pub fn hash_context(context: &str) -> u32 {
    let digest = Sha256::digest(context.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

pub fn derive_key(prefix: &str, context: &KeyContext<'_>) -> String {
    format!("{}{}", prefix, hash_context(&context.to_string()))
}
