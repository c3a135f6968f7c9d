//! Zlib Layer
//!
//! Whole-payload DEFLATE with the zlib wrapper, and the header sniffing used
//! to recognize a compressed payload on the way back in.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::DecodeError;

/// Zlib CMF byte for DEFLATE with a 32K window
const ZLIB_CMF: u8 = 0x78;

/// Compress `data`. Returns `None` on failure so callers can keep the raw form.
pub fn compress(data: &[u8], level: u32) -> Option<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len()), Compression::new(level));
    let result = encoder.write_all(data).and_then(|_| encoder.finish());
    match result {
        Ok(compressed) => Some(compressed),
        Err(e) => {
            tracing::warn!("Compression failed, keeping raw form: {}", e);
            None
        }
    }
}

/// Whether `payload` starts with a valid zlib header.
pub fn is_compressed(payload: &[u8]) -> bool {
    match payload {
        [cmf, flg, ..] => *cmf == ZLIB_CMF && (u16::from(*cmf) * 256 + u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}

/// Inflate a zlib payload, refusing output larger than `limit` bytes.
pub fn decompress(payload: &[u8], limit: usize) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::new();
    ZlibDecoder::new(payload)
        .take(limit as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| DecodeError::Inflate(e.to_string()))?;

    if out.len() > limit {
        return Err(DecodeError::InflatedTooLarge { limit });
    }
    Ok(out)
}
