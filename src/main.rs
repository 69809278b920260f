use std::process;

use cachebust::{
    AssetReference, CacheBuster, CacheBusterToken, StoredAsset,
    application::{error::AppError, policy},
    config,
    infra::{content, telemetry},
};
use serde::Serialize;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    let messages = error.messages();
    if dispatcher::has_been_set() {
        error!(error = %error, chain = ?messages, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, chain = ?messages, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)?;
    policy::install_global(&settings.cache_busting);

    match cli_args.command {
        config::Command::Bust(args) => run_bust(args).await,
        config::Command::Hash(args) => run_hash(args).await,
    }
}

#[derive(Debug, Serialize)]
struct BustOutput<'a> {
    url: &'a str,
    token: Option<&'a str>,
    source: Option<&'static str>,
}

async fn run_bust(args: config::BustArgs) -> Result<(), AppError> {
    if args.file.is_some() && args.hash.is_some() {
        info!(
            target = "cachebust::cli",
            "--file given; ignoring --hash in favour of the computed digest"
        );
    }

    let asset = match args.file.as_deref() {
        Some(path) => content::asset_for_path(path, &args.class).await?,
        None => StoredAsset::with_hash(args.hash.clone().unwrap_or_default()).class(&args.class),
    };
    let asset = asset.variant_descriptor(args.variant.clone().unwrap_or_default());

    let buster = CacheBuster::global();
    let url = buster.bust(&args.url, &asset);
    info!(
        target = "cachebust::cli",
        class = asset.asset_class(),
        default_enabled = policy::global_policy().default_enabled(),
        decorated = url != args.url.as_str(),
        "url processed"
    );

    if args.json {
        // Report the token only when it was actually appended.
        let token = (url != args.url.as_str())
            .then(|| CacheBusterToken::for_asset(&asset))
            .flatten();
        let output = BustOutput {
            url: &url,
            token: token.as_ref().map(CacheBusterToken::as_str),
            source: token.as_ref().map(|token| token.source().as_str()),
        };
        let rendered = serde_json::to_string(&output)
            .map_err(|err| AppError::unexpected(format!("failed to encode output: {err}")))?;
        println!("{rendered}");
    } else {
        println!("{url}");
    }

    Ok(())
}

async fn run_hash(args: config::HashArgs) -> Result<(), AppError> {
    let checksum = content::hash_path(&args.file).await?;
    let token = CacheBusterToken::from_content_hash(&checksum);
    println!("{checksum}\t{token}");
    Ok(())
}
