//! Building blocks for the `classify` front-end.
//!
//! The client only acquires and re-encodes images; every decision is made by
//! the service.

pub mod api;
pub mod canvas;
pub mod chart;

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageOutputFormat};
use thiserror::Error;

use crate::preprocess::resize_to_input;

pub use api::{ApiClient, DEFAULT_API_URL};
pub use canvas::{Canvas, Drawing};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to the server: {0}")]
    Network(#[from] reqwest::Error),

    #[error("cannot build request: {0}")]
    Request(String),

    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("invalid response from server: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("cannot process image: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid drawing: {0}")]
    Drawing(String),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Opens an image file and converts it to RGB.
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage, ClientError> {
    let img = image::open(path)?;
    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}

/// Resizes to the model input size and encodes as PNG, the form the service
/// receives.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ClientError> {
    let resized = DynamicImage::ImageRgb8(resize_to_input(img).to_rgb8());
    let mut buf = Cursor::new(Vec::new());
    resized.write_to(&mut buf, ImageOutputFormat::Png)?;
    Ok(buf.into_inner())
}
