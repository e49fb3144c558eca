// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome tallies for attack simulation results.

use std::collections::HashMap;
use std::time::Duration;
use timestamp_gate::validator::{Decision, TimestampError};

/// Possible outcomes for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Allowed,
    Missing,
    Invalid,
    Future,
    Past,
}

impl From<&Decision> for Outcome {
    fn from(decision: &Decision) -> Self {
        match decision.error() {
            None => Outcome::Allowed,
            Some(TimestampError::MissingKey) => Outcome::Missing,
            Some(TimestampError::EmptyOrInvalidValue) => Outcome::Invalid,
            Some(TimestampError::OutOfRangeFuture { .. }) => Outcome::Future,
            Some(TimestampError::OutOfRangePast { .. }) => Outcome::Past,
        }
    }
}

/// Collects outcomes during an attack simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    outcomes: HashMap<Outcome, usize>,
    /// Latency samples (microseconds)
    latencies: Vec<u64>,
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decision.
    pub fn record(&mut self, decision: &Decision, latency: Duration) {
        *self.outcomes.entry(Outcome::from(decision)).or_insert(0) += 1;
        self.latencies.push(latency.as_micros() as u64);
    }

    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Ratio of denied to total.
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        (total - self.count(Outcome::Allowed)) as f64 / total as f64
    }

    /// Get median latency in microseconds.
    pub fn median_latency_us(&self) -> u64 {
        if self.latencies.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();
        sorted[sorted.len() / 2]
    }
}

impl std::fmt::Display for AttackMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Attack Metrics Report ===")?;
        writeln!(f, "Total Requests:    {}", self.total_requests())?;
        writeln!(f, "Allowed:           {}", self.count(Outcome::Allowed))?;
        writeln!(f, "Missing:           {}", self.count(Outcome::Missing))?;
        writeln!(f, "Invalid:           {}", self.count(Outcome::Invalid))?;
        writeln!(f, "Future:            {}", self.count(Outcome::Future))?;
        writeln!(f, "Past:              {}", self.count(Outcome::Past))?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate() * 100.0)?;
        writeln!(f, "Median Latency:    {} us", self.median_latency_us())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_rate() {
        let mut metrics = AttackMetrics::new();
        for _ in 0..3 {
            metrics.record(&Decision::Allow, Duration::ZERO);
        }
        for _ in 0..7 {
            metrics.record(
                &Decision::DenyMissingOrInvalid(TimestampError::MissingKey),
                Duration::ZERO,
            );
        }

        assert_eq!(metrics.total_requests(), 10);
        assert_eq!(metrics.count(Outcome::Missing), 7);
        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
    }
}
