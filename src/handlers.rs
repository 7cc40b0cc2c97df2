use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classifier::{classify, Classifier};
use crate::error::ServiceError;
use crate::labels::LabelSet;
use crate::models::HealthResponse;
use crate::preprocess::{preprocess, UploadedImage};

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Process-lifetime state, built once before the server starts and never
/// mutated afterwards.
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
    pub labels: LabelSet,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(classifier: impl Classifier + 'static, labels: LabelSet, max_upload_bytes: usize) -> Self {
        Self {
            classifier: Arc::new(classifier),
            labels,
            max_upload_bytes,
        }
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/predict").route(web::post().to(predict)))
        .service(web::resource("/health").route(web::get().to(health)));
}

#[tracing::instrument(name = "predict", skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn predict(state: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse, ServiceError> {
    let upload = read_upload(payload, state.max_upload_bytes).await.map_err(|e| {
        warn!("Failed to read upload: {}", e);
        e
    })?;
    debug!(bytes = upload.len(), content_type = %upload.content_type, "received upload");

    // Decode and forward pass are CPU bound, keep them off the async worker.
    let worker_state = state.clone();
    let prediction = web::block(move || {
        let tensor = preprocess(&upload)?;
        let prediction = classify(
            worker_state.classifier.as_ref(),
            &worker_state.labels,
            &tensor,
        )?;
        Ok::<_, ServiceError>(prediction)
    })
    .await?
    .map_err(|e| {
        warn!("Prediction failed: {}", e);
        e
    })?;

    info!(predicted_class = %prediction.predicted_class, "prediction complete");
    Ok(HttpResponse::Ok().json(prediction))
}

pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        labels: state.labels.to_vec(),
    })
}

/// Collects the `file` part, skipping any other fields.
async fn read_upload(mut payload: Multipart, limit: usize) -> Result<UploadedImage, ServiceError> {
    while let Some(item) = payload.next().await {
        let mut field = item?;
        let is_file = field.content_disposition().get_name() == Some(FILE_FIELD);
        if !is_file {
            while let Some(chunk) = field.next().await {
                chunk?;
            }
            continue;
        }

        let content_type = field.content_type().to_string();
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            if bytes.len() + data.len() > limit {
                return Err(ServiceError::UploadTooLarge { limit });
            }
            bytes.extend_from_slice(&data);
        }
        return Ok(UploadedImage::new(bytes, content_type));
    }

    Err(ServiceError::MissingFile)
}
