//! Image normalization shared by the service and the client.
//!
//! Both sides must resize with the same filter and target size, otherwise
//! predictions drift silently.

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use ndarray::{Array4, ArrayView4};

use crate::error::DecodeError;

pub const INPUT_WIDTH: u32 = 128;
pub const INPUT_HEIGHT: u32 = 128;
pub const CHANNELS: usize = 3;

/// Bicubic, the decoder default the model was trained against.
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Anything an upload can be read from.
pub trait ByteSource {
    fn bytes(&self) -> &[u8];
}

impl ByteSource for [u8] {
    fn bytes(&self) -> &[u8] {
        self
    }
}

impl ByteSource for Vec<u8> {
    fn bytes(&self) -> &[u8] {
        self
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    fn bytes(&self) -> &[u8] {
        (**self).bytes()
    }
}

/// Raw upload plus its declared MIME type. Lives for a single request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl UploadedImage {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl ByteSource for UploadedImage {
    fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Model input: shape `(1, 128, 128, 3)`, channel-last, values in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor(Array4<f32>);

impl NormalizedTensor {
    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.0.view()
    }
}

/// Decodes any supported format and converts to RGB. Alpha is dropped and
/// grayscale is expanded.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, DecodeError> {
    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgb8())
}

/// Resizes to the model input size without keeping the aspect ratio.
pub fn resize_to_input(img: &DynamicImage) -> DynamicImage {
    img.resize_exact(INPUT_WIDTH, INPUT_HEIGHT, RESIZE_FILTER)
}

pub fn normalize(rgb: &RgbImage) -> NormalizedTensor {
    let resized = image::imageops::resize(rgb, INPUT_WIDTH, INPUT_HEIGHT, RESIZE_FILTER);
    let shape = (1, INPUT_HEIGHT as usize, INPUT_WIDTH as usize, CHANNELS);
    let tensor = Array4::from_shape_fn(shape, |(_, y, x, c)| {
        resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    });
    NormalizedTensor(tensor)
}

pub fn preprocess<S: ByteSource + ?Sized>(source: &S) -> Result<NormalizedTensor, DecodeError> {
    let rgb = decode_rgb(source.bytes())?;
    Ok(normalize(&rgb))
}
