//! Golden scenario files.
//!
//! Each file under `golden/` is a JSON [`Scenario`]: a start time and a list
//! of steps, some of which carry expectations. Amounts are whole tokens and
//! are scaled by [`crate::UNIT`] by whoever runs the scenario.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Weeks after [`crate::GENESIS`] at which the scenario starts.
    #[serde(default)]
    pub start_week: u64,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Fund {
        account: String,
        tokens: u64,
    },
    Advance {
        secs: u64,
    },
    CreateLock {
        account: String,
        tokens: u64,
        /// Unlock time as an offset from now, in seconds.
        duration: u64,
        #[serde(default)]
        expect_error: Option<String>,
    },
    IncreaseAmount {
        account: String,
        tokens: u64,
        #[serde(default)]
        expect_error: Option<String>,
    },
    IncreaseUnlockTime {
        account: String,
        duration: u64,
        #[serde(default)]
        expect_error: Option<String>,
    },
    Withdraw {
        account: String,
        #[serde(default)]
        expect_error: Option<String>,
    },
    AddCategory {
        name: String,
    },
    AddGauge {
        target: String,
        category: u32,
    },
    Vote {
        account: String,
        target: String,
        bps: u16,
        #[serde(default)]
        expect_error: Option<String>,
    },
    Checkpoint,
    /// Balance in tokens, within `tolerance` tokens.
    AssertBalance {
        account: String,
        tokens: f64,
        tolerance: f64,
    },
    AssertTotalSupply {
        tokens: f64,
        tolerance: f64,
    },
    /// Relative weight as a fraction of one.
    AssertRelativeWeight {
        target: String,
        fraction: f64,
        tolerance: f64,
    },
    AssertUsedPower {
        account: String,
        bps: u16,
    },
}

/// Directory holding the golden files.
pub fn golden_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("golden")
}

/// Load and deserialize a scenario by file name.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_scenario(file_name: &str) -> Scenario {
    let path = golden_root().join(file_name);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read scenario {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse scenario {}: {}", path.display(), e))
}

/// All scenario files, sorted by name.
pub fn list_scenarios() -> Vec<PathBuf> {
    let dir = golden_root();
    let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("Failed to read directory {}: {}", dir.display(), e))
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                Some(path)
            } else {
                None
            }
        })
        .collect();
    paths.sort();
    paths
}
