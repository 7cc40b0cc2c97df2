//! Image classification over HTTP.
//!
//! The service decodes an uploaded image, normalizes it to the model's fixed
//! `(1, 128, 128, 3)` input, runs an ONNX classifier and answers with the
//! predicted label and the full probability mapping. The `client` module holds
//! the pieces used by the `classify` front-end.

pub mod classifier;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod labels;
pub mod models;
pub mod preprocess;
pub mod telemetry;

pub use classifier::{classify, Classifier, OnnxClassifier};
pub use config::ServerConfig;
pub use error::{DecodeError, InferenceError, ServiceError};
pub use handlers::{routes, AppState};
pub use labels::LabelSet;
pub use models::{Prediction, Probabilities};
pub use preprocess::{preprocess, ByteSource, NormalizedTensor, UploadedImage};
