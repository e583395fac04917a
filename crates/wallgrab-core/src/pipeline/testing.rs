//! Test doubles shared by the pipeline unit tests.

use async_trait::async_trait;
use image::{DynamicImage, ImageBuffer, Rgb};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::FetchError;
use crate::types::FetchResult;

use super::fetch::Fetcher;

type Script = Vec<Result<Vec<u8>, FetchError>>;

/// A fetcher that replays a per-URL script of responses.
///
/// The n-th call for a URL returns the n-th scripted entry; once the script is
/// exhausted the last entry repeats. Unknown URLs answer HTTP 404.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: HashMap<String, Script>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, url: &str, responses: Script) -> Self {
        self.scripts.insert(url.to_string(), responses);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    /// Highest number of concurrent `fetch_once` calls observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch_once(&self, url: &str) -> Result<FetchResult, FetchError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(url.to_string()).or_insert(0);
            *count += 1;
            *count - 1
        };

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let response = match self.scripts.get(url) {
            Some(script) if !script.is_empty() => script[index.min(script.len() - 1)].clone(),
            _ => Err(FetchError::Http { status: 404 }),
        };
        response.map(|bytes| FetchResult {
            bytes,
            content_type: None,
            elapsed: Duration::from_millis(1),
        })
    }
}

fn gradient(width: u32, height: u32, seed: u8) -> DynamicImage {
    let buffer = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([
            (x % 251) as u8 ^ seed,
            (y % 241) as u8,
            ((x + y) % 239) as u8,
        ])
    });
    DynamicImage::ImageRgb8(buffer)
}

/// Encode a synthetic PNG of the given size. `seed` varies the pixel content.
pub fn png_bytes(width: u32, height: u32, seed: u8) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    gradient(width, height, seed)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Encode a synthetic JPEG of the given size.
pub fn jpeg_bytes(width: u32, height: u32, seed: u8) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    gradient(width, height, seed)
        .write_to(&mut out, image::ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}

/// Encode a synthetic BMP of the given size.
pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    gradient(width, height, 0)
        .write_to(&mut out, image::ImageFormat::Bmp)
        .unwrap();
    out.into_inner()
}
