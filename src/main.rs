mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "callback_codec=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let codec = cli::load_codec(cli.config.as_deref())?;

    match cli.command {
        Commands::Encode {
            tag,
            sub_tag,
            args,
            hex_args,
            format,
            no_budget,
        } => {
            cli::encode_payload(&codec, tag, sub_tag, &args, hex_args, format, no_budget)?;
        }
        Commands::Decode {
            payload,
            format,
            json,
        } => {
            cli::decode_payload(&codec, &payload, format, json)?;
        }
        Commands::Inspect { payload, format } => {
            cli::inspect_payload(&codec, &payload, format)?;
        }
    }

    Ok(())
}
