use thiserror::Error;

use crate::constant_pool::ConstantTag;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Truncated input at byte {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("Unknown constant pool tag {tag} at byte {offset}")]
    UnknownConstantTag { tag: u8, offset: usize },
    #[error("Invalid magic identifier: 0x{0:X}")]
    BadMagic(u32),
    #[error("Constant pool entry #{index} needs two slots but is the last declared slot")]
    ConstantPoolOverflow { index: u16 },
    #[error("Constant pool index 0 is never valid")]
    ZeroIndex,
    #[error("Constant pool index #{index} is out of range (pool has {len} slots)")]
    IndexOutOfRange { index: u16, len: usize },
    #[error("Constant pool index #{0} is the placeholder slot of an 8-byte constant")]
    PlaceholderIndex(u16),
    #[error("Expected {expected} at constant pool index #{index}, found {found}")]
    UnexpectedConstantPoolEntry {
        index: u16,
        expected: ConstantTag,
        found: ConstantTag,
    },
    #[error("Invalid descriptor {descriptor:?}: {reason}")]
    InvalidDescriptor {
        descriptor: String,
        reason: &'static str,
    },
}

impl ClassFileError {
    pub(crate) fn invalid_descriptor(descriptor: &str, reason: &'static str) -> Self {
        ClassFileError::InvalidDescriptor {
            descriptor: descriptor.to_owned(),
            reason,
        }
    }
}
