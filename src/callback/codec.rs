//! Callback Codec
//!
//! Chooses between the raw framed form and its zlib-compressed form, and
//! reverses either on the way back in.

use serde::Serialize;

use super::compress::{compress, decompress, is_compressed};
use super::frame::{decode_raw, encode_raw, CallbackData};
use crate::config::CodecConfig;
use crate::error::{CodecError, Result};

/// Which candidate `pack` returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Form {
    Raw,
    Compressed,
}

impl Form {
    pub fn as_str(&self) -> &'static str {
        match self {
            Form::Raw => "raw",
            Form::Compressed => "compressed",
        }
    }
}

/// Outcome of packing, with the raw length kept for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packed {
    pub form: Form,
    pub raw_len: usize,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct CallbackCodec {
    config: CodecConfig,
}

impl CallbackCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode without the payload budget check.
    ///
    /// The compressed candidate wins only when strictly shorter than the raw one.
    pub fn encode_detailed<A: AsRef<[u8]>>(
        &self,
        tag: u32,
        sub_tag: u32,
        args: &[A],
    ) -> Result<Packed> {
        let raw = encode_raw(tag, sub_tag, args)?;
        let raw_len = raw.len();

        let packed = match compress(&raw, self.config.compression_level) {
            Some(compressed) if compressed.len() < raw_len => Packed {
                form: Form::Compressed,
                raw_len,
                bytes: compressed,
            },
            _ => Packed {
                form: Form::Raw,
                raw_len,
                bytes: raw,
            },
        };

        tracing::debug!(
            tag,
            sub_tag,
            raw_len,
            len = packed.bytes.len(),
            "Encoded callback payload as {}",
            packed.form.as_str()
        );
        Ok(packed)
    }

    /// Encode and enforce `max_payload_len`.
    pub fn pack_detailed<A: AsRef<[u8]>>(
        &self,
        tag: u32,
        sub_tag: u32,
        args: &[A],
    ) -> Result<Packed> {
        let packed = self.encode_detailed(tag, sub_tag, args)?;
        let limit = self.config.max_payload_len;
        if packed.bytes.len() > limit {
            return Err(CodecError::PayloadTooLarge {
                len: packed.bytes.len(),
                limit,
            });
        }
        Ok(packed)
    }

    pub fn pack<A: AsRef<[u8]>>(&self, tag: u32, sub_tag: u32, args: &[A]) -> Result<Vec<u8>> {
        self.pack_detailed(tag, sub_tag, args).map(|p| p.bytes)
    }

    /// Decode a payload in either form.
    pub fn unpack(&self, payload: &[u8]) -> Result<CallbackData> {
        self.unpack_detailed(payload).map(|(_, data)| data)
    }

    /// Decode a payload in either form and report which one it was.
    ///
    /// A raw payload for tag 248 / sub-tag 90 starts with the same two bytes
    /// as a level-9 zlib stream, so a payload that fails to inflate or decode
    /// is retried as raw before giving up.
    pub fn unpack_detailed(&self, payload: &[u8]) -> Result<(Form, CallbackData)> {
        if !is_compressed(payload) {
            return decode_raw(payload).map(|data| (Form::Raw, data));
        }

        let inflated = decompress(payload, self.config.max_inflated_len)
            .map_err(CodecError::from)
            .and_then(|raw| decode_raw(&raw));

        match inflated {
            Ok(data) => Ok((Form::Compressed, data)),
            Err(err) => match decode_raw(payload) {
                Ok(data) => {
                    tracing::debug!("Payload with zlib header decoded as raw ({})", err);
                    Ok((Form::Raw, data))
                }
                Err(_) => {
                    tracing::warn!("Failed to unpack compressed payload: {}", err);
                    Err(err)
                }
            },
        }
    }

    /// The form `unpack` would decode `payload` as; `Raw` when neither decodes.
    pub fn detect_form(&self, payload: &[u8]) -> Form {
        self.unpack_detailed(payload)
            .map(|(form, _)| form)
            .unwrap_or(Form::Raw)
    }
}

/// Encode with the default configuration and no budget check.
pub fn encode<A: AsRef<[u8]>>(tag: u32, sub_tag: u32, args: &[A]) -> Result<Vec<u8>> {
    CallbackCodec::new()
        .encode_detailed(tag, sub_tag, args)
        .map(|p| p.bytes)
}

/// Decode a raw framed payload.
pub fn decode(payload: &[u8]) -> Result<CallbackData> {
    decode_raw(payload)
}

/// Decode a payload in either form with the default configuration.
pub fn unpack(payload: &[u8]) -> Result<CallbackData> {
    CallbackCodec::new().unpack(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    #[test]
    fn test_short_payload_stays_raw() {
        let packed = CallbackCodec::new().encode_detailed(5, 1, &["ab"]).unwrap();
        assert_eq!(packed.form, Form::Raw);
        assert_eq!(packed.bytes, vec![0x85, 0x81, 0xFF, b'a', b'b', 0x81]);
        assert_eq!(packed.raw_len, 6);
    }

    #[test]
    fn test_repetitive_payload_compresses() {
        let arg = "a".repeat(60);
        let packed = CallbackCodec::new().encode_detailed(3, 4, &[arg.as_str()]).unwrap();
        assert_eq!(packed.form, Form::Compressed);
        assert!(packed.bytes.len() < packed.raw_len);
        assert_eq!(&packed.bytes[..2], &[0x78, 0xDA]);

        let data = unpack(&packed.bytes).unwrap();
        assert_eq!(data.tag(), 3);
        assert_eq!(data.sub_tag(), 4);
        assert_eq!(data.arg(0), Some(arg.as_bytes()));
    }

    #[test]
    fn test_level_zero_never_wins() {
        let config = CodecConfig {
            compression_level: 0,
            ..CodecConfig::default()
        };
        let codec = CallbackCodec::with_config(config).unwrap();
        let arg = "a".repeat(60);
        let packed = codec.encode_detailed(3, 4, &[arg.as_str()]).unwrap();
        assert_eq!(packed.form, Form::Raw);
    }

    #[test]
    fn test_pack_enforces_budget() {
        let codec = CallbackCodec::new();
        let mut seed: u32 = 0x1234_5678;
        let mut args = Vec::new();
        for _ in 0..10 {
            let mut arg = Vec::with_capacity(14);
            for _ in 0..14 {
                seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                arg.push(((seed >> 16) % 255) as u8);
            }
            args.push(arg);
        }
        let err = codec.pack(1, 1, &args).unwrap_err();
        assert!(matches!(err, CodecError::PayloadTooLarge { limit: 64, .. }));

        // encode itself has no budget
        assert!(encode(1, 1, &args).unwrap().len() > 64);
    }

    #[test]
    fn test_raw_payload_with_zlib_like_header() {
        // tag 248 and sub-tag 90 put 0x78 0xDA in front of the raw frame
        let raw = encode_raw(248, 90, &["x"]).unwrap();
        assert_eq!(&raw[..2], &[0x78, 0xDA]);
        assert!(is_compressed(&raw));

        let data = unpack(&raw).unwrap();
        assert_eq!(data.tag(), 248);
        assert_eq!(data.sub_tag(), 90);
        assert_eq!(data.arg(0), Some(&b"x"[..]));
        assert_eq!(CallbackCodec::new().detect_form(&raw), Form::Raw);
    }

    #[test]
    fn test_zlib_header_frame_reports_raw() {
        // zero-argument frame for tag 248 / sub-tag 90: a zlib header followed
        // by a truncated stored block, whatever inflate makes of it
        let payload = [0x78, 0xDA, 0x80];
        assert!(is_compressed(&payload));

        let codec = CallbackCodec::new();
        let (form, data) = codec.unpack_detailed(&payload).unwrap();
        assert_eq!(form, Form::Raw);
        assert_eq!((data.tag(), data.sub_tag()), (248, 90));
        assert!(data.args().is_empty());
        assert_eq!(codec.detect_form(&payload), Form::Raw);
    }

    #[test]
    fn test_unpack_detailed_reports_compressed() {
        let arg = "a".repeat(60);
        let codec = CallbackCodec::new();
        let payload = codec.pack(3, 4, &[arg.as_str()]).unwrap();
        let (form, data) = codec.unpack_detailed(&payload).unwrap();
        assert_eq!(form, Form::Compressed);
        assert_eq!(data.arg(0), Some(arg.as_bytes()));
        assert_eq!(codec.detect_form(&payload), Form::Compressed);
    }

    #[test]
    fn test_unpack_reports_decode_errors() {
        let err = unpack(&[0x01]).unwrap_err();
        assert!(matches!(err, CodecError::Decode(DecodeError::TooShort { len: 1 })));
    }

    #[test]
    fn test_with_config_validates() {
        let config = CodecConfig {
            compression_level: 12,
            ..CodecConfig::default()
        };
        assert!(CallbackCodec::with_config(config).is_err());
    }
}
