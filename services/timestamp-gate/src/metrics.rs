// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for gate decisions.

use crate::validator::{Decision, TimestampError};
use prometheus::core::Collector;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Label value recorded for a decision.
pub fn outcome_label(decision: &Decision) -> &'static str {
    match decision.error() {
        None => "allow",
        Some(TimestampError::MissingKey) => "missing",
        Some(TimestampError::EmptyOrInvalidValue) => "invalid",
        Some(TimestampError::OutOfRangeFuture { .. }) => "future",
        Some(TimestampError::OutOfRangePast { .. }) => "past",
    }
}

/// Decision counters on a private registry.
pub struct GateMetrics {
    registry: Registry,
    decisions: IntCounterVec,
}

impl GateMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let decisions = IntCounterVec::new(
            Opts::new(
                "timestamp_gate_decisions_total",
                "Access decisions made by the timestamp gate",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(decisions.clone()))?;

        Ok(Self {
            registry,
            decisions,
        })
    }

    /// Count one decision.
    pub fn record(&self, decision: &Decision) {
        self.decisions
            .with_label_values(&[outcome_label(decision)])
            .inc();
    }

    /// Current count for an outcome label.
    ///
    /// Reads the collected samples, so an outcome never seen stays absent
    /// from the exposition.
    pub fn count(&self, outcome: &str) -> u64 {
        self.decisions
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .find(|metric| {
                metric
                    .get_label()
                    .iter()
                    .any(|label| label.get_name() == "outcome" && label.get_value() == outcome)
            })
            .map(|metric| metric.get_counter().get_value() as u64)
            .unwrap_or(0)
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
