//! Integration tests for loading codec configuration files.

use std::io::Write;

use tempfile::NamedTempFile;

use callback_codec::{CallbackCodec, CodecConfig, CodecError};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write config");
    file
}

#[test]
fn load_overrides_budget() {
    let file = write_config("max_payload_len = 8\ncompression_level = 6\n");
    let config = CodecConfig::load(file.path()).unwrap();
    assert_eq!(config.max_payload_len, 8);
    assert_eq!(config.compression_level, 6);
    assert_eq!(config.max_inflated_len, 4096);

    let codec = CallbackCodec::with_config(config).unwrap();
    assert!(codec.pack(1, 1, &["abc"]).is_ok());
    assert!(matches!(
        codec.pack(1, 1, &["abcdefgh"]),
        Err(CodecError::PayloadTooLarge { len: 12, limit: 8 })
    ));
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let err = CodecConfig::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, CodecError::Io(_)));
}

#[test]
fn load_rejects_bad_toml() {
    let file = write_config("max_payload_len = \"lots\"\n");
    assert!(matches!(CodecConfig::load(file.path()), Err(CodecError::Config(_))));
}
