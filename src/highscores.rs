//! Best-run records
//!
//! Persisted to LocalStorage, tracks the top 10 runs by casualty count.

use serde::{Deserialize, Serialize};

/// Maximum number of records to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single record entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Casualties inflicted over the run
    pub casualty: u64,
    /// Lowest central pressure reached (mb)
    pub lowest_pressure: i32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Best-run leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "typhoon_highscores";

    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a run qualifies for the leaderboard
    pub fn qualifies(&self, casualty: u64) -> bool {
        if casualty == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries
            .last()
            .map(|e| casualty > e.casualty)
            .unwrap_or(true)
    }

    /// Add a run to the leaderboard (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(
        &mut self,
        casualty: u64,
        lowest_pressure: i32,
        timestamp: f64,
    ) -> Option<usize> {
        if !self.qualifies(casualty) {
            return None;
        }

        let entry = HighScoreEntry {
            casualty,
            lowest_pressure,
            timestamp,
        };

        // Insertion point, sorted descending by casualties
        let pos = self.entries.iter().position(|e| casualty > e.casualty);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The deadliest run so far (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.casualty)
    }

    /// Load records from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} records", scores.entries.len());
                    return scores;
                }
            }
        }

        log::info!("No records found, starting fresh");
        Self::new()
    }

    /// Save records to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Records saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Format a timestamp as a relative date string
#[cfg(target_arch = "wasm32")]
pub fn format_date(timestamp: f64) -> String {
    let now = js_sys::Date::now();
    let diff_days = (now - timestamp) / 1000.0 / 60.0 / 60.0 / 24.0;

    if diff_days >= 7.0 {
        let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
        format!(
            "{}/{}/{}",
            date.get_month() + 1,
            date.get_date(),
            date.get_full_year() % 100
        )
    } else if diff_days >= 1.0 {
        format!("{} days ago", diff_days.floor() as i32)
    } else {
        "Today".to_string()
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn format_date(_timestamp: f64) -> String {
    "N/A".to_string()
}
