//! Mock cover source

use async_trait::async_trait;
use komal_core::{CoverSource, Error, Result};
use std::sync::{Arc, Mutex};

/// Mock implementation of `CoverSource` returning fixed bytes
#[derive(Clone)]
pub struct MockCoverSource {
    image: Vec<u8>,
    fails: Arc<Mutex<bool>>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl Default for MockCoverSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCoverSource {
    pub fn new() -> Self {
        Self {
            image: vec![0xFF, 0xD8, 0xFF, 0xE0],
            fails: Arc::new(Mutex::new(false)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_fails(&self, fails: bool) {
        *self.fails.lock().unwrap() = fails;
    }

    /// URLs requested so far
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl CoverSource for MockCoverSource {
    async fn fetch_cover(&self, url: &str) -> Result<Vec<u8>> {
        self.requested.lock().unwrap().push(url.to_string());
        if *self.fails.lock().unwrap() {
            return Err(Error::http_status("mock cover host", url, 404));
        }
        Ok(self.image.clone())
    }
}
