//! Raw Framed Form
//!
//! `[tag][sub_tag]([0xFF][arg bytes])*[count]`, where every header and
//! trailer byte is stored as `value - 128` (mod 256).

use crate::error::{CodecError, DecodeError, Field, Result};

/// Reserved byte that opens every argument chunk
pub const SENTINEL: u8 = 0xFF;

/// Header plus trailer: tag, sub-tag and count
pub const MIN_FRAME_LEN: usize = 3;

/// Offset applied to tag, sub-tag and count bytes
const OFFSET: u8 = 128;

#[inline]
fn to_wire(value: u8) -> u8 {
    value.wrapping_sub(OFFSET)
}

#[inline]
fn from_wire(byte: u8) -> u8 {
    byte.wrapping_add(OFFSET)
}

fn check_range(field: Field, value: u64) -> Result<u8> {
    u8::try_from(value).map_err(|_| CodecError::Range { field, value })
}

/// A decoded callback payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackData {
    tag: u8,
    sub_tag: u8,
    args: Vec<Vec<u8>>,
}

impl CallbackData {
    pub fn new(tag: u8, sub_tag: u8, args: Vec<Vec<u8>>) -> Self {
        Self { tag, sub_tag, args }
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn sub_tag(&self) -> u8 {
        self.sub_tag
    }

    pub fn args(&self) -> &[Vec<u8>] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Option<&[u8]> {
        self.args.get(index).map(Vec::as_slice)
    }

    pub fn into_args(self) -> Vec<Vec<u8>> {
        self.args
    }
}

/// Build the raw framed form.
///
/// Rejects out-of-range tag, sub-tag or argument count, and any argument
/// containing [`SENTINEL`].
pub fn encode_raw<A: AsRef<[u8]>>(tag: u32, sub_tag: u32, args: &[A]) -> Result<Vec<u8>> {
    let tag = check_range(Field::Tag, u64::from(tag))?;
    let sub_tag = check_range(Field::SubTag, u64::from(sub_tag))?;
    let count = check_range(Field::ArgCount, args.len() as u64)?;

    let body_len: usize = args.iter().map(|a| a.as_ref().len() + 1).sum();
    let mut out = Vec::with_capacity(MIN_FRAME_LEN + body_len);

    out.push(to_wire(tag));
    out.push(to_wire(sub_tag));

    for (index, arg) in args.iter().enumerate() {
        let bytes = arg.as_ref();
        if bytes.contains(&SENTINEL) {
            return Err(CodecError::SentinelInArgument { index });
        }
        out.push(SENTINEL);
        out.extend_from_slice(bytes);
    }

    out.push(to_wire(count));
    Ok(out)
}

/// Recover tag and sub-tag without touching the arguments.
pub fn peek_header(payload: &[u8]) -> Result<(u8, u8)> {
    if payload.len() < MIN_FRAME_LEN {
        return Err(DecodeError::TooShort { len: payload.len() }.into());
    }
    Ok((from_wire(payload[0]), from_wire(payload[1])))
}

/// Decode a raw framed payload.
///
/// Every sentinel closes the pending chunk into the current slot and moves
/// on to the next one; whatever is pending at the end fills the last slot.
pub fn decode_raw(payload: &[u8]) -> Result<CallbackData> {
    let (tag, sub_tag) = peek_header(payload)?;
    let last = payload.len() - 1;
    let declared = usize::from(from_wire(payload[last]));

    if declared == 0 {
        let extra = payload.len() - MIN_FRAME_LEN;
        if extra != 0 {
            return Err(DecodeError::UnexpectedTrailingBytes { extra }.into());
        }
        return Ok(CallbackData::new(tag, sub_tag, Vec::new()));
    }

    // the count byte sits where the first sentinel would be
    if payload.len() == MIN_FRAME_LEN {
        return Err(DecodeError::CountMismatch { declared, found: 0 }.into());
    }

    if payload[2] != SENTINEL {
        return Err(DecodeError::MissingSentinel { found: payload[2] }.into());
    }

    let chunks = &payload[MIN_FRAME_LEN..last];
    let found = chunks.iter().filter(|&&b| b == SENTINEL).count() + 1;
    if found != declared {
        return Err(DecodeError::CountMismatch { declared, found }.into());
    }

    let mut args: Vec<Vec<u8>> = Vec::with_capacity(declared);
    let mut pending = Vec::new();

    for &byte in chunks {
        if byte == SENTINEL {
            // completed chunk takes the next slot
            args.push(std::mem::take(&mut pending));
        } else {
            pending.push(byte);
        }
    }
    args.push(pending);

    Ok(CallbackData::new(tag, sub_tag, args))
}
