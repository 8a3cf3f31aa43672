use osmprint::config::Config;
use osmprint::models::GeometryCollection;
use osmprint::render::PdfRenderer;
use osmprint::services::area_of_interest;
use osmprint::services::overpass::OverpassClient;
use osmprint::services::MapService;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_OUTPUT_PATH: &str = "output_map_detailed.pdf";

fn print_help() {
    eprintln!(
        "\
Usage: render_map <INPUT.geojson> [OPTIONS]

Renders the features of a GeoJSON file over OpenStreetMap context layers
and writes a single-page PDF.

Options:
  --output=PATH         Output file (default: output_map_detailed.pdf)
  --padding=DEG         Padding around the input bounds in degrees
                        (default: MAP_PADDING_DEG or 0.002)
  --help                Show this help message"
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (less verbose than the server)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "osmprint=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI args
    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help") {
        print_help();
        return Ok(());
    }

    let Some(input) = args.iter().find(|a| !a.starts_with("--")) else {
        print_help();
        return Err("missing input file".into());
    };
    let input = PathBuf::from(input);

    let output = args
        .iter()
        .find_map(|a| a.strip_prefix("--output="))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));

    let mut config =
        Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;
    if let Some(padding) = args.iter().find_map(|a| a.strip_prefix("--padding=")) {
        config.padding_deg = padding
            .parse()
            .map_err(|_| format!("Invalid --padding value: {}", padding))?;
    }

    let bytes = std::fs::read(&input)
        .map_err(|e| format!("Failed to read {}: {}", input.display(), e))?;
    let collection = GeometryCollection::from_geojson_bytes(&bytes)?;

    let area = area_of_interest::build(&collection, config.padding_deg)?;
    println!(
        "Bounding box (W, S, E, N): ({:.6}, {:.6}, {:.6}, {:.6})",
        area.bbox.west, area.bbox.south, area.bbox.east, area.bbox.north
    );

    let service = MapService::new(
        Arc::new(OverpassClient::with_config(&config.overpass)),
        Arc::new(PdfRenderer::new()),
        config.padding_deg,
        config.map_title.clone(),
    );

    let pdf = service.generate_pdf(collection).await?;
    std::fs::write(&output, &pdf)
        .map_err(|e| format!("Failed to write {}: {}", output.display(), e))?;

    println!("Saved map to {} ({} bytes)", output.display(), pdf.len());
    Ok(())
}
