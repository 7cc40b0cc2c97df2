use actix_multipart::MultipartError;
use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::path::PathBuf;
use thiserror::Error;

use crate::models::ErrorResponse;

/// Uploaded bytes could not be interpreted as an image.
#[derive(Debug, Error)]
#[error("cannot identify image file: {0}")]
pub struct DecodeError(#[from] pub image::ImageError);

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model inference failed: {0}")]
    Runtime(String),

    #[error("model produced no output tensor")]
    EmptyOutput,

    #[error("model returned a non-finite probability at index {index}")]
    NonFinite { index: usize },

    #[error("model returned {actual} probabilities but {expected} labels are configured")]
    OutputLength { expected: usize, actual: usize },
}

/// Every failure on the `/predict` path.
///
/// All variants answer with status 500 and `{"error": ...}`. Bad input and
/// server faults are not told apart.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("no multipart field named \"file\" in request")]
    MissingFile,

    #[error("upload exceeds the {limit} byte limit")]
    UploadTooLarge { limit: usize },

    #[error("blocking worker pool is unavailable")]
    Worker,
}

impl From<MultipartError> for ServiceError {
    fn from(e: MultipartError) -> Self {
        Self::Upload(e.to_string())
    }
}

impl From<BlockingError> for ServiceError {
    fn from(_: BlockingError) -> Self {
        Self::Worker
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: expected {expected}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("failed to read labels file {path}: {source}")]
    LabelsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("labels file {0} contains no labels")]
    NoLabels(PathBuf),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to load ONNX model from {path}: {reason}")]
    Load { path: PathBuf, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn every_service_error_is_a_500_with_error_field() {
        let errors = vec![
            ServiceError::MissingFile,
            ServiceError::UploadTooLarge { limit: 16 },
            ServiceError::Inference(InferenceError::EmptyOutput),
            ServiceError::Inference(InferenceError::NonFinite { index: 0 }),
            ServiceError::Inference(InferenceError::OutputLength {
                expected: 3,
                actual: 2,
            }),
        ];

        for err in errors {
            let message = err.to_string();
            let resp = err.error_response();
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

            let body = to_bytes(resp.into_body()).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["error"], message);
        }
    }

    #[test]
    fn decode_error_keeps_image_message() {
        let err = image::load_from_memory(b"not an image").unwrap_err();
        let err = ServiceError::from(DecodeError::from(err));
        assert!(err.to_string().starts_with("cannot identify image file"));
    }
}
