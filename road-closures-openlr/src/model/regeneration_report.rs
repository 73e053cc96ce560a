use serde::{Deserialize, Serialize};

/// tallies of a batch reference regeneration run.
///
/// `successful` only counts closures whose new reference was committed. when
/// a commit fails, `error` is set and that chunk is tallied under `failed`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegenerationReport {
    pub total_processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<String>,
    pub error: Option<String>,
}

impl RegenerationReport {
    pub fn record_failure(&mut self, message: String) {
        self.failed += 1;
        self.errors.push(message);
    }
}
