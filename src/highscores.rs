//! High score persistence
//!
//! A single durable integer stored under one key. Reads never fail: a missing
//! or unreadable value is reported as 0. Writes report their error to the
//! caller, who decides whether it matters.

use crate::error::StoreError;
use crate::persistence::Storage;

/// Gateway between the game and a `Storage` backend
#[derive(Debug, Clone)]
pub struct HighScoreGateway<S: Storage> {
    storage: S,
}

impl<S: Storage> HighScoreGateway<S> {
    /// Storage key for the high score
    pub const STORAGE_KEY: &'static str = "highScore";

    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Stored high score, or 0 if absent or unreadable
    pub fn get_high_score(&self) -> u64 {
        match self.storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<u64>(raw.trim()) {
                Ok(score) => score,
                Err(e) => {
                    log::warn!("Ignoring unreadable high score {:?}: {}", raw, e);
                    0
                }
            },
            Ok(None) => 0,
            Err(e) => {
                log::warn!("High score read failed, using 0: {}", e);
                0
            }
        }
    }

    pub fn set_high_score(&mut self, score: u64) -> Result<(), StoreError> {
        self.storage
            .set_item(Self::STORAGE_KEY, &serde_json::to_string(&score)?)?;
        log::info!("High score saved ({})", score);
        Ok(())
    }

    /// Overwrite the stored value with 0
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.set_high_score(0)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }
}
