use clap::Parser;
use std::path::PathBuf;
use visual_search_sdk::{MatchOptions, OutputShape, SdkConfig, VisualSearchClient};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// API key
    #[arg(short, long)]
    api_key: String,

    /// Path to the image
    #[arg(short, long)]
    file: PathBuf,

    /// Backend base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Maximum number of offers
    #[arg(short, long, default_value_t = 20)]
    limit: u32,

    /// Print the raw JSON response instead of a summary
    #[arg(long)]
    json: bool,

    /// Flag the match as not found afterwards
    #[arg(long)]
    not_found: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = SdkConfig::new(args.api_key);
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url)?;
    }
    let client = VisualSearchClient::new(config)?;
    let options = MatchOptions::new().limit(args.limit);

    println!("Matching {:?}...", args.file);

    if args.json {
        let json = client
            .image_matching()
            .match_file(&args.file, &options, OutputShape::JsonEnvelope)
            .await?
            .into_json()
            .ok_or("unexpected response shape")?;
        println!("{}", json.as_str());
        return Ok(());
    }

    let envelope = client
        .image_matching()
        .match_file(&args.file, &options, OutputShape::ResponseEnvelope)
        .await?
        .into_envelope()
        .ok_or("unexpected response shape")?;

    println!("Found {} offers:", envelope.body.offers.len());
    for offer in &envelope.body.offers {
        println!(
            "  {:.3}  {}  {}",
            offer.score,
            offer.sku.as_deref().unwrap_or("-"),
            offer.title.as_deref().unwrap_or("(untitled)")
        );
    }

    if args.not_found {
        let request_id = envelope
            .correlation_id
            .ok_or("backend did not return a request id")?;
        client
            .not_found_matching()
            .mark_as_not_found(&request_id)
            .await?;
        println!("Marked request {request_id} as not found");
    }

    Ok(())
}
