//! Shared fixtures for integration tests.

#![allow(dead_code)]

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use photo_dedup_engine::core::pipeline::CancellationToken;
use photo_dedup_engine::core::source::{encode_data_url, ImageFetcher, PhotoDescriptor};
use photo_dedup_engine::error::FetchError;
use std::collections::HashMap;
use std::io::Cursor;

/// 32x32 grayscale noise; different seeds are far apart in hash space
pub fn noise_image(seed: u64) -> GrayImage {
    let mut state = seed;
    GrayImage::from_fn(32, 32, |_, _| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        Luma([(state >> 56) as u8])
    })
}

/// 128x128 grayscale scene made of low-frequency waves.
///
/// Variants 0 and 1 are unrelated scenes. Unlike noise, these survive JPEG
/// and downscaling the way real photos do.
pub fn smooth_scene(variant: u32) -> GrayImage {
    GrayImage::from_fn(128, 128, |x, y| {
        let (x, y) = (x as f64, y as f64);
        let value = match variant {
            0 => 128.0 + 70.0 * (x * 0.05 + 0.3).sin() * (y * 0.04).cos(),
            _ => 128.0 + 70.0 * (x * 0.09 - y * 0.03).cos() + 30.0 * (y * 0.11).sin(),
        };
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

pub fn brighten(image: &GrayImage, amount: u8) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel[0] = pixel[0].saturating_add(amount);
    }
    out
}

pub fn encode(image: &GrayImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

pub fn png(seed: u64) -> Vec<u8> {
    encode(&noise_image(seed), ImageFormat::Png)
}

/// Inline PNG descriptor for a noise image
pub fn inline_photo(seed: u64, name: &str) -> PhotoDescriptor {
    PhotoDescriptor::new(encode_data_url("png", &png(seed)), name)
}

/// Serves canned bytes per URL; anything else is unreachable
#[derive(Default)]
pub struct StubFetcher {
    responses: HashMap<String, Vec<u8>>,
}

impl StubFetcher {
    pub fn with(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.responses.insert(url.to_string(), bytes);
        self
    }
}

impl ImageFetcher for StubFetcher {
    fn fetch(&self, url: &str, _cancel: &CancellationToken) -> Result<Vec<u8>, FetchError> {
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Transport {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            })
    }
}
