//! Account storage quota.

use serde_json::Value;

use cloudtrim_core::QuotaUsage;

use crate::normalize::parse_u64;

/// Quota figures reported by the storage provider's account endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageQuota {
    pub used_bytes: u64,
    /// `None` for unlimited accounts.
    pub limit_bytes: Option<u64>,
}

impl StorageQuota {
    pub fn new(used_bytes: u64, limit_bytes: Option<u64>) -> Self {
        Self {
            used_bytes,
            limit_bytes: limit_bytes.filter(|&l| l > 0),
        }
    }

    /// Read `{ "storageQuota": { "usage": .., "limit": .. } }` or the inner
    /// object directly. Values may be numbers or decimal strings; a missing
    /// or zero limit means unlimited. Returns `None` without a usage figure.
    pub fn from_about(about: &Value) -> Option<Self> {
        let quota = about.get("storageQuota").unwrap_or(about);
        let used = quota.get("usage").and_then(parse_u64)?;
        let limit = quota.get("limit").and_then(parse_u64);
        Some(Self::new(used, limit))
    }

    /// Fraction of the limit in use.
    pub fn used_fraction(&self) -> Option<f64> {
        self.limit_bytes.map(|limit| self.used_bytes as f64 / limit as f64)
    }

    pub fn usage(&self) -> QuotaUsage {
        QuotaUsage {
            used_bytes: self.used_bytes,
            limit_bytes: self.limit_bytes,
            used_fraction: self.used_fraction(),
        }
    }
}
