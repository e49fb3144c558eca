// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Attack patterns for security testing.

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Human-readable name for reports
    pub name: &'static str,
    /// Server time the attack runs at
    pub now: i64,
    /// Window configured on the gate
    pub range_secs: u64,
    /// Number of requests to generate
    pub total_requests: usize,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            name: "default",
            now: 1_700_000_000,
            range_secs: 180,
            total_requests: 100,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Replay of captured requests, each older than the window.
    pub fn stale_replay() -> Self {
        Self {
            name: "stale replay",
            total_requests: 200,
            ..Default::default()
        }
    }

    /// Pre-dated requests minted to stay valid for a long time.
    pub fn predated_tokens() -> Self {
        Self {
            name: "pre-dated tokens",
            total_requests: 200,
            ..Default::default()
        }
    }

    /// Legitimate clients with small clock skew.
    pub fn honest_skew() -> Self {
        Self {
            name: "honest skew",
            total_requests: 181,
            ..Default::default()
        }
    }

    /// Offsets (seconds from `now`) used by each pattern.
    pub fn offsets(&self) -> Vec<i64> {
        let range = self.range_secs as i64;
        let n = self.total_requests as i64;
        match self.name {
            "stale replay" => (1..=n).map(|i| -(range + i * 7)).collect(),
            "pre-dated tokens" => (1..=n).map(|i| range + i * 11).collect(),
            _ => (0..n).map(|i| i * 2 - range).collect(),
        }
    }

    /// Whether every request in this pattern should be denied.
    pub fn expect_all_denied(&self) -> bool {
        self.name != "honest skew"
    }
}
