use crate::error::ApiError;
use crate::AppState;
use api_shared::{HealthCheckRes, UPLOAD_OK_BODY};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path as AxumPath, State},
    response::Json,
};
use relay_core::{PathSegment, TransferError};

/// Name of the multipart part that carries the uploaded file.
pub const FILE_FIELD: &str = "file";

#[utoipa::path(
    get,
    path = "/healthcheck",
    responses(
        (status = 200, description = "Storage health; reported as FAILED rather than as an error status", body = HealthCheckRes)
    )
)]
/// Health check endpoint
///
/// Opens and closes one connection to the storage backend. Always answers 200; a broken
/// backend shows up as `FAILED` in both fields.
#[axum::debug_handler]
pub async fn healthcheck(State(state): State<AppState>) -> Json<HealthCheckRes> {
    Json(state.health.check_health().await)
}

#[utoipa::path(
    post,
    path = "/upload/{id}/{filename}",
    params(
        ("id" = String, Path, description = "Collection id; names the container the file is stored in"),
        ("filename" = String, Path, description = "Name the file is stored under")
    ),
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "Multipart form with the file content in a part named `file`"
    ),
    responses(
        (status = 200, description = "File stored", body = String),
        (status = 400, description = "Not a multipart request, no `file` part, or an unsafe id or filename", body = String),
        (status = 500, description = "Storage backend failure", body = String)
    )
)]
/// Upload a file into the container for a collection
///
/// The container is created on first use. The `file` part is streamed to storage as it
/// arrives; it is never buffered whole.
///
/// # Errors
/// Returns `400 Bad Request` if:
/// - the body is not `multipart/form-data`,
/// - there is no `file` part,
/// - `id` or `filename` is not a safe single path segment.
///
/// Returns `500 Internal Server Error` if the storage backend cannot be reached, the container
/// cannot be created or entered, the write fails, or the request (reading the parts and
/// storing the file) does not complete within the configured timeout.
#[axum::debug_handler]
pub async fn upload_file(
    State(state): State<AppState>,
    AxumPath((id, filename)): AxumPath<(String, String)>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<&'static str, ApiError> {
    tracing::info!(collection_id = %id, filename = %filename, "received upload");

    PathSegment::collection_id(&id)?;
    PathSegment::filename(&filename)?;

    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    // One deadline covers reading the parts as well as the transfer itself.
    let deadline = state.engine.timeout();
    let upload = store_file_part(&state, multipart, &id, &filename);
    match tokio::time::timeout(deadline, upload).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(
                collection_id = %id,
                filename = %filename,
                stage = "timeout",
                "upload request abandoned after {:?}",
                deadline
            );
            Err(TransferError::Timeout(deadline).into())
        }
    }
}

async fn store_file_part(
    state: &AppState,
    mut multipart: Multipart,
    id: &str,
    filename: &str,
) -> Result<&'static str, ApiError> {
    // Parts before the file part are skipped; anything after it is never read.
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to parse multipart data: {}", e)))?
    {
        if field.name() == Some(FILE_FIELD) {
            state.engine.transfer_stream(field, filename, id).await?;
            return Ok(UPLOAD_OK_BODY);
        }
    }

    Err(ApiError::BadRequest(format!(
        "request has no '{}' part",
        FILE_FIELD
    )))
}

/// OpenAPI document for this server.
pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    use utoipa::OpenApi;
    Json(crate::ApiDoc::openapi())
}
