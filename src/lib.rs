pub mod callback;
pub mod config;
pub mod error;

pub use callback::{
    decode, encode, is_compressed, peek_header, unpack, CallbackCodec, CallbackData, Form, Packed,
    SENTINEL,
};
pub use config::CodecConfig;
pub use error::{CodecError, DecodeError, Field, Result};
