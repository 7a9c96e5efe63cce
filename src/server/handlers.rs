//! Route handlers

use super::{error::ApiError, state::AppState, upload::read_upload};
use crate::{error::RemovalError, resample::ResampleFilter};
use axum::extract::{multipart::MultipartRejection, Multipart, State};
use instant::Instant;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument, Span};
use uuid::Uuid;

/// Liveness check
pub async fn ping() -> &'static str {
    "U^2-Net!"
}

/// Replace the background of the uploaded `file`, resizing the mask with `filter`
///
/// Responds with the PNG result as a `data:image/png;base64,` string.
///
/// # Errors
/// - `ApiError::Upload` when validation fails
/// - `ApiError::Internal` when decoding, inference or encoding fails
pub async fn remove_background(
    State(state): State<AppState>,
    filter: ResampleFilter,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<String, ApiError> {
    let start = Instant::now();
    let request_id = Uuid::new_v4();
    let span = info_span!("remove_background", %request_id, route = filter.route());

    async move {
        let upload = read_upload(multipart).await?;
        debug!(
            file_name = %upload.file_name,
            bytes = upload.data.len(),
            "Received upload"
        );

        let expose = state.debug;
        let processor = Arc::clone(&state.processor);
        let worker_span = Span::current();

        let (data_uri, timings) = tokio::task::spawn_blocking(move || {
            let _guard = worker_span.enter();
            let mut processor = processor
                .lock()
                .map_err(|_| RemovalError::internal("Processor lock poisoned"))?;
            let result = processor.process_bytes(&upload.data, filter)?;
            Ok::<_, RemovalError>((result.to_data_uri()?, result.timing_summary()))
        })
        .await
        .map_err(|e| {
            ApiError::internal(
                RemovalError::internal(format!("Processing task failed: {e}")),
                expose,
            )
        })?
        .map_err(|e| ApiError::internal(e, expose))?;

        debug!("Timings: {timings}");
        info!(" Predicted in {:.2} sec", start.elapsed().as_secs_f64());
        Ok(data_uri)
    }
    .instrument(span)
    .await
}
