//! Callback Payload Codec Module
//!
//! Packs a command tag, a sub-tag and opaque byte arguments into the
//! smallest byte string that fits an inline-button callback payload.

pub mod codec;
pub mod compress;
pub mod frame;

pub use codec::{decode, encode, unpack, CallbackCodec, Form, Packed};
pub use compress::is_compressed;
pub use frame::{decode_raw, encode_raw, peek_header, CallbackData, MIN_FRAME_LEN, SENTINEL};
