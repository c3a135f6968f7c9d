use std::fmt;

use thiserror::Error;

/// Encoder input that must fit in a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Tag,
    SubTag,
    ArgCount,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Tag => "tag",
            Field::SubTag => "sub-tag",
            Field::ArgCount => "argument count",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("{field} out of range: {value} (expected 0..=255)")]
    Range { field: Field, value: u64 },

    #[error("argument {index} contains the reserved sentinel byte 0xFF")]
    SentinelInArgument { index: usize },

    #[error("payload is {len} bytes, limit is {limit}")]
    PayloadTooLarge { len: usize, limit: usize },

    #[error("malformed payload: {0}")]
    Decode(#[from] DecodeError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structural failures of an incoming payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("payload too short: {len} bytes, need at least 3")]
    TooShort { len: usize },

    #[error("expected sentinel after header, found {found:#04x}")]
    MissingSentinel { found: u8 },

    #[error("zero-argument payload has {extra} trailing bytes")]
    UnexpectedTrailingBytes { extra: usize },

    #[error("trailer declares {declared} arguments, found {found}")]
    CountMismatch { declared: usize, found: usize },

    #[error("inflate failed: {0}")]
    Inflate(String),

    #[error("inflated payload exceeds {limit} bytes")]
    InflatedTooLarge { limit: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;
