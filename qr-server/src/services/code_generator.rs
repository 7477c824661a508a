//! Unique Code Generator
//!
//! Draws fixed-length codes from a 36-symbol alphabet and verifies each draw
//! against the QR collection's code index before handing it out. A draw that
//! collides is discarded and redrawn, up to a generous attempt cap — the cap
//! exists to turn a pathologically full code space into an explicit error
//! instead of an unbounded loop.
//!
//! Known gap: the check and the eventual insert are separate store calls, so
//! two concurrent requests can both clear the check with the same code.

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;

use crate::core::{AppError, AppResult};
use crate::db::repository::QrRepository;
use crate::store::KeyStore;

pub const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const CODE_LENGTH: usize = 4;

/// At 36^4 possible codes this is far beyond any plausible retry need.
pub const MAX_ATTEMPTS: usize = 50_000;

pub struct CodeGenerator {
    qrs: QrRepository,
    length: usize,
    max_attempts: usize,
}

impl CodeGenerator {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self {
            qrs: QrRepository::new(store),
            length: CODE_LENGTH,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// One fresh code, unique against the collection.
    pub async fn generate(&self) -> AppResult<String> {
        self.generate_excluding(&HashSet::new()).await
    }

    /// `n` fresh codes, unique against the collection *and* against each
    /// other — creation batches insert nothing until every code is drawn, so
    /// the store check alone cannot see codes drawn earlier in the batch.
    pub async fn generate_many(&self, n: usize) -> AppResult<Vec<String>> {
        let mut reserved = HashSet::with_capacity(n);
        let mut codes = Vec::with_capacity(n);
        for _ in 0..n {
            let code = self.generate_excluding(&reserved).await?;
            reserved.insert(code.clone());
            codes.push(code);
        }
        Ok(codes)
    }

    async fn generate_excluding(&self, reserved: &HashSet<String>) -> AppResult<String> {
        for _ in 0..self.max_attempts {
            let code = self.draw();
            if reserved.contains(&code) {
                continue;
            }
            if !self.qrs.code_in_use(&code).await? {
                return Ok(code);
            }
        }
        Err(AppError::CodeSpaceExhausted {
            attempts: self.max_attempts,
        })
    }

    fn draw(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }
}
