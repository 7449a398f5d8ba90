//! Caller-owned cache of previous analyses, keyed by account.
//!
//! The engine keeps no state between calls; hosts that want to reuse a scan
//! hand a [`ScanCache`] to [`StorageAnalyzer::analyze_cached`].
//!
//! [`StorageAnalyzer::analyze_cached`]: crate::StorageAnalyzer::analyze_cached

use std::collections::HashMap;

use cloudtrim_core::AnalysisResult;

/// Storage for analysis results keyed by account identifier.
pub trait ScanCache {
    /// Fetch the stored result for an account.
    fn get(&self, account: &str) -> Option<AnalysisResult>;

    /// Store (or replace) the result for an account.
    fn put(&mut self, account: &str, result: AnalysisResult);

    /// Drop the stored result. Returns whether one existed.
    fn invalidate(&mut self, account: &str) -> bool;
}

/// A process-local [`ScanCache`].
#[derive(Debug, Default)]
pub struct InMemoryScanCache {
    entries: HashMap<String, AnalysisResult>,
}

impl InMemoryScanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ScanCache for InMemoryScanCache {
    fn get(&self, account: &str) -> Option<AnalysisResult> {
        self.entries.get(account).cloned()
    }

    fn put(&mut self, account: &str, result: AnalysisResult) {
        self.entries.insert(account.to_owned(), result);
    }

    fn invalidate(&mut self, account: &str) -> bool {
        self.entries.remove(account).is_some()
    }
}
