use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;

use animal_classifier::client::{chart, encode_png, load_image, ApiClient, ClientError, Drawing, DEFAULT_API_URL};
use animal_classifier::telemetry;

/// Send an image to the classifier service and chart the probabilities.
#[derive(Debug, Parser)]
#[command(name = "classify", version)]
struct Cli {
    /// Prediction endpoint.
    #[arg(long, env = "CLASSIFIER_API_URL", default_value = DEFAULT_API_URL)]
    url: String,

    /// Also write the uploaded PNG here.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Width of the bars in characters.
    #[arg(long, default_value_t = chart::BAR_WIDTH)]
    width: usize,

    /// Plain bars even on a terminal.
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    source: Source,
}

#[derive(Debug, Subcommand)]
enum Source {
    /// Classify an image file (PNG, JPEG, ...).
    Image { path: PathBuf },
    /// Classify a freehand drawing described by a strokes JSON file.
    Draw { path: PathBuf },
}

#[actix_rt::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    telemetry::init_client();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ClientError> {
    let image = match &cli.source {
        Source::Image { path } => load_image(path)?,
        Source::Draw { path } => Drawing::from_file(path)?.render().to_rgb(),
    };
    let png = encode_png(&image)?;

    if let Some(path) = &cli.save {
        std::fs::write(path, &png).map_err(|source| ClientError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "saved upload");
    }

    let client = ApiClient::new(cli.url);
    info!(url = client.url(), "uploading image");
    let prediction = client.classify(png).await?;
    let color = !cli.no_color && std::io::stdout().is_terminal();
    println!("{}", chart::render(&prediction, cli.width, color));
    Ok(())
}
