//! Tile recorder: wraps any [`RecognitionEngine`] and writes every tile it
//! is asked to recognise to a directory before delegating.
//!
//! Files are named `tile-0001.png`, `tile-0002.png`, … in call order.  A
//! failed write is logged and does not stop recognition.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::ocr::engine::{OcrError, RecognitionEngine};
use crate::ocr::params::{Recognition, RecognizeParams};

pub struct TileRecorder<E: RecognitionEngine> {
    inner: E,
    dir: PathBuf,
    count: AtomicUsize,
}

impl<E: RecognitionEngine> TileRecorder<E> {
    /// Wrap `inner`, saving tiles under `dir` (created on first write).
    pub fn new(inner: E, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            dir: dir.into(),
            count: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of tiles seen so far.
    pub fn recorded(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    fn save(&self, png: &[u8]) -> std::io::Result<PathBuf> {
        let n = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("tile-{n:04}.png"));
        std::fs::write(&path, png)?;
        Ok(path)
    }
}

impl<E: RecognitionEngine> RecognitionEngine for TileRecorder<E> {
    fn recognize(&self, png: &[u8], params: &RecognizeParams) -> Result<Recognition, OcrError> {
        match self.save(png) {
            Ok(path) => log::info!("Saved tile to {}", path.display()),
            Err(e) => log::warn!("Could not save tile in {}: {e}", self.dir.display()),
        }
        self.inner.recognize(png, params)
    }
}
