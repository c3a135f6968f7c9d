use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use callback_codec::{peek_header, CallbackCodec, CallbackData, CodecConfig, Form};

#[derive(Parser)]
#[command(name = "callback-codec")]
#[command(about = "Pack and inspect compact inline-button callback payloads")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Pack tag 5, sub-tag 1 with one argument
    callback-codec encode 5 1 ab

    # Arguments given as hex, payload printed as base64
    callback-codec encode 12 0 0a0b 0c --hex-args --format base64

    # Decode a payload
    callback-codec decode 8581ff616281

    # Show which form a payload is in
    callback-codec inspect 8581ff616281
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML codec config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a tag, sub-tag and arguments into a payload
    Encode {
        /// Command tag (0-255)
        tag: u32,

        /// Sub-command tag (0-255)
        sub_tag: u32,

        /// Arguments, UTF-8 unless --hex-args is set
        args: Vec<String>,

        /// Treat every argument as hex-encoded bytes
        #[arg(long)]
        hex_args: bool,

        /// Payload output encoding
        #[arg(long, value_enum, default_value = "hex")]
        format: PayloadFormat,

        /// Skip the payload size limit
        #[arg(long)]
        no_budget: bool,
    },

    /// Decode a payload (raw or compressed)
    Decode {
        /// Encoded payload
        payload: String,

        /// Payload input encoding
        #[arg(long, value_enum, default_value = "hex")]
        format: PayloadFormat,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show size, form and header of a payload
    Inspect {
        /// Encoded payload
        payload: String,

        /// Payload input encoding
        #[arg(long, value_enum, default_value = "hex")]
        format: PayloadFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PayloadFormat {
    Hex,
    Base64,
}

#[derive(Serialize)]
struct ArgView {
    hex: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
struct DecodedView {
    form: Form,
    tag: u8,
    sub_tag: u8,
    args: Vec<ArgView>,
}

impl DecodedView {
    fn new(form: Form, data: &CallbackData) -> Self {
        Self {
            form,
            tag: data.tag(),
            sub_tag: data.sub_tag(),
            args: data
                .args()
                .iter()
                .map(|arg| ArgView {
                    hex: hex::encode(arg),
                    text: std::str::from_utf8(arg).ok().map(str::to_string),
                })
                .collect(),
        }
    }
}

pub fn load_codec(config: Option<&Path>) -> Result<CallbackCodec> {
    let config = match config {
        Some(path) => CodecConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CodecConfig::default(),
    };
    Ok(CallbackCodec::with_config(config)?)
}

pub fn parse_payload(text: &str, format: PayloadFormat) -> Result<Vec<u8>> {
    let text = text.trim();
    match format {
        PayloadFormat::Hex => hex::decode(text).context("Payload is not valid hex"),
        PayloadFormat::Base64 => URL_SAFE_NO_PAD
            .decode(text.trim_end_matches('='))
            .context("Payload is not valid URL-safe base64"),
    }
}

pub fn render_payload(bytes: &[u8], format: PayloadFormat) -> String {
    match format {
        PayloadFormat::Hex => hex::encode(bytes),
        PayloadFormat::Base64 => URL_SAFE_NO_PAD.encode(bytes),
    }
}

pub fn parse_args(args: &[String], hex_args: bool) -> Result<Vec<Vec<u8>>> {
    if !hex_args {
        return Ok(args.iter().map(|a| a.as_bytes().to_vec()).collect());
    }
    args.iter()
        .enumerate()
        .map(|(i, a)| hex::decode(a).with_context(|| format!("Argument {} is not valid hex", i)))
        .collect()
}

pub fn encode_payload(
    codec: &CallbackCodec,
    tag: u32,
    sub_tag: u32,
    args: &[String],
    hex_args: bool,
    format: PayloadFormat,
    no_budget: bool,
) -> Result<()> {
    let args = parse_args(args, hex_args)?;
    let packed = if no_budget {
        codec.encode_detailed(tag, sub_tag, &args)?
    } else {
        codec.pack_detailed(tag, sub_tag, &args)?
    };

    println!("{}", render_payload(&packed.bytes, format));
    println!(
        "  {} form, {} bytes (raw {} bytes, limit {})",
        packed.form.as_str(),
        packed.bytes.len(),
        packed.raw_len,
        codec.config().max_payload_len
    );
    Ok(())
}

pub fn decode_payload(
    codec: &CallbackCodec,
    payload: &str,
    format: PayloadFormat,
    json: bool,
) -> Result<()> {
    let bytes = parse_payload(payload, format)?;
    let (form, data) = codec.unpack_detailed(&bytes)?;
    let view = DecodedView::new(form, &data);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("tag: {}", view.tag);
    println!("sub-tag: {}", view.sub_tag);
    println!("args: {}", view.args.len());
    for (i, arg) in view.args.iter().enumerate() {
        match &arg.text {
            Some(text) => println!("  [{}] {:?} ({})", i, text, arg.hex),
            None => println!("  [{}] {}", i, arg.hex),
        }
    }
    Ok(())
}

pub fn inspect_payload(codec: &CallbackCodec, payload: &str, format: PayloadFormat) -> Result<()> {
    let bytes = parse_payload(payload, format)?;
    let form = codec.detect_form(&bytes);
    let limit = codec.config().max_payload_len;

    println!("Payload:");
    println!("  Length: {} bytes (limit {})", bytes.len(), limit);
    println!("  Form: {}", form.as_str());
    if bytes.len() > limit {
        println!("  Warning: payload exceeds the size limit");
    }

    if form == Form::Raw {
        let (tag, sub_tag) = peek_header(&bytes)?;
        println!("  Tag: {}", tag);
        println!("  Sub-tag: {}", sub_tag);
    }
    Ok(())
}
