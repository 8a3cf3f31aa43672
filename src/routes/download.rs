use crate::error::{AppError, Result};
use crate::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

const ACCEPTED_EXTENSIONS: [&str; 2] = [".geojson", ".json"];

struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

/// POST /download
/// Render an uploaded GeoJSON file as a PDF map attachment
pub async fn download_map(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response> {
    let upload = read_upload(&mut multipart).await?;

    tracing::info!(
        filename = %upload.filename,
        bytes = upload.bytes.len(),
        "Map request for {} ({} bytes)",
        upload.filename,
        upload.bytes.len()
    );

    let pdf = tokio::time::timeout(
        state.request_timeout,
        state.map_service.generate_pdf_from_bytes(&upload.bytes),
    )
    .await
    .map_err(|_| {
        AppError::Timeout(format!(
            "Map generation did not finish within {}s",
            state.request_timeout.as_secs()
        ))
    })??;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=map_output.pdf",
            ),
        ],
        pdf,
    )
        .into_response())
}

/// Pull the `file` field out of the multipart body and check its name.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", e))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if !has_geojson_extension(&filename) {
            return Err(AppError::InvalidInput(
                "File must be a GeoJSON file (.geojson or .json)".to_string(),
            ));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read uploaded file", e))?;

        return Ok(Upload {
            filename,
            bytes: bytes.to_vec(),
        });
    }

    Err(AppError::InvalidInput("No file uploaded".to_string()))
}

/// Keep axum's own status for multipart failures so an upload over the body
/// limit is reported as 413 rather than a malformed request.
fn multipart_error(context: &str, e: MultipartError) -> AppError {
    let message = format!("{}: {}", context, e.body_text());
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::InvalidInput(message)
    }
}

fn has_geojson_extension(filename: &str) -> bool {
    ACCEPTED_EXTENSIONS
        .iter()
        .any(|extension| filename.ends_with(extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_geojson_and_json_names() {
        assert!(has_geojson_extension("route.geojson"));
        assert!(has_geojson_extension("export.json"));
        assert!(!has_geojson_extension("route.kml"));
        assert!(!has_geojson_extension("geojson"));
        assert!(!has_geojson_extension(""));
    }
}
