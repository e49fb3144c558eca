// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for timestamp gate attack simulation.
//!
//! This module provides utilities for replaying hostile query strings
//! against the validator to confirm every one of them is denied.

pub mod attacks;
pub mod generators;
pub mod metrics;
