//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Tally.
//! The Tally project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Tally Quality Gate Module
//!
//! The quality gate runs an ordered list of filter rules over the canonical
//! records of one batch and records how many records each rule removed.
//!
//! ## Rule Order
//!
//! 1. `quality.missing_show_id`: drop records without `show_id`
//! 2. `quality.missing_title`: drop records without `title`
//! 3. `quality.invalid_popularity`: drop records with `popularity < 0`
//! 4. `quality.duplicate_show_id`: keep the first record per `show_id`
//!
//! Rules only ever remove records, and every rule preserves the relative
//! order of the records it keeps.
//!
//! ## Pass Rate
//!
//! `failed_count` and `pass_rate` are computed against the `initial_count`
//! passed in by the caller. The orchestrator passes the number of raw records
//! seen, so records dropped during normalization count as failures too.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::record::TlShowBatch;

/// Which counter of the [`TlQualityReport`] a rule feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TlQualityCounter {
    MissingShowId,
    MissingTitle,
    InvalidPopularity,
    Duplicates,
}

/// A single filter step of the quality gate.
///
/// Implementations must not add records and must keep survivors in input order.
pub trait TlQualityRule: std::fmt::Debug {
    /// Unique, human-readable name for the rule.
    fn name(&self) -> &'static str;

    /// Counter that receives the number of records this rule removes.
    fn counter(&self) -> TlQualityCounter;

    fn apply(&self, batch: TlShowBatch) -> TlShowBatch;
}

#[derive(Debug, Default)]
pub struct TlMissingShowIdRule;

impl TlQualityRule for TlMissingShowIdRule {
    fn name(&self) -> &'static str {
        "quality.missing_show_id"
    }

    fn counter(&self) -> TlQualityCounter {
        TlQualityCounter::MissingShowId
    }

    fn apply(&self, batch: TlShowBatch) -> TlShowBatch {
        batch.into_iter().filter(|r| r.show_id.is_some()).collect()
    }
}

#[derive(Debug, Default)]
pub struct TlMissingTitleRule;

impl TlQualityRule for TlMissingTitleRule {
    fn name(&self) -> &'static str {
        "quality.missing_title"
    }

    fn counter(&self) -> TlQualityCounter {
        TlQualityCounter::MissingTitle
    }

    fn apply(&self, batch: TlShowBatch) -> TlShowBatch {
        batch.into_iter().filter(|r| r.title.is_some()).collect()
    }
}

#[derive(Debug, Default)]
pub struct TlInvalidPopularityRule;

impl TlQualityRule for TlInvalidPopularityRule {
    fn name(&self) -> &'static str {
        "quality.invalid_popularity"
    }

    fn counter(&self) -> TlQualityCounter {
        TlQualityCounter::InvalidPopularity
    }

    fn apply(&self, batch: TlShowBatch) -> TlShowBatch {
        batch.into_iter().filter(|r| r.popularity >= 0.0).collect()
    }
}

/// Keeps the first record seen for each `show_id`.
///
/// Records without an id are kept untouched; the missing-id rule runs first
/// in the standard gate so none reach this point.
#[derive(Debug, Default)]
pub struct TlDuplicateShowIdRule;

impl TlQualityRule for TlDuplicateShowIdRule {
    fn name(&self) -> &'static str {
        "quality.duplicate_show_id"
    }

    fn counter(&self) -> TlQualityCounter {
        TlQualityCounter::Duplicates
    }

    fn apply(&self, batch: TlShowBatch) -> TlShowBatch {
        let mut seen = HashSet::with_capacity(batch.len());
        batch
            .into_iter()
            .filter(|r| match r.show_id {
                Some(id) => seen.insert(id),
                None => true,
            })
            .collect()
    }
}

/// Counters produced by one run of the quality gate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TlQualityReport {
    pub initial_count: usize,
    pub missing_show_id: usize,
    pub missing_title: usize,
    pub invalid_popularity: usize,
    pub duplicates: usize,
    pub final_count: usize,
    pub failed_count: usize,
    pub pass_rate: f64,
}

impl TlQualityReport {
    fn record_removed(&mut self, counter: TlQualityCounter, removed: usize) {
        let slot = match counter {
            TlQualityCounter::MissingShowId => &mut self.missing_show_id,
            TlQualityCounter::MissingTitle => &mut self.missing_title,
            TlQualityCounter::InvalidPopularity => &mut self.invalid_popularity,
            TlQualityCounter::Duplicates => &mut self.duplicates,
        };
        *slot += removed;
    }

    fn finish(mut self, final_count: usize) -> Self {
        self.final_count = final_count;
        self.failed_count = self.initial_count.saturating_sub(final_count);
        self.pass_rate = if self.initial_count > 0 {
            (final_count as f64 / self.initial_count as f64).min(1.0)
        } else {
            0.0
        };
        self
    }
}

/// Records that survived the gate together with the completed report.
#[derive(Clone, Debug)]
pub struct TlQualityOutcome {
    pub records: TlShowBatch,
    pub report: TlQualityReport,
}

#[derive(Debug)]
pub struct TlQualityGate {
    rules: Vec<Box<dyn TlQualityRule + Send + Sync>>,
}

impl Default for TlQualityGate {
    fn default() -> Self {
        Self::standard()
    }
}

impl TlQualityGate {
    /// Gate with an explicit rule list, applied in the given order.
    pub fn new(rules: Vec<Box<dyn TlQualityRule + Send + Sync>>) -> Self {
        TlQualityGate { rules }
    }

    /// The four Silver rules in their fixed order.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(TlMissingShowIdRule),
            Box::new(TlMissingTitleRule),
            Box::new(TlInvalidPopularityRule),
            Box::new(TlDuplicateShowIdRule),
        ])
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn apply(&self, mut batch: TlShowBatch, initial_count: usize) -> TlQualityOutcome {
        let mut report = TlQualityReport {
            initial_count,
            ..TlQualityReport::default()
        };

        for rule in &self.rules {
            let before = batch.len();
            batch = rule.apply(batch);
            let after = batch.len();
            debug_assert!(after <= before, "rule {} added records", rule.name());
            report.record_removed(rule.counter(), before.saturating_sub(after));
            log::debug!("{}: {} -> {} records", rule.name(), before, after);
        }

        let report = report.finish(batch.len());
        log::info!(
            "Data quality: {}/{} passed ({:.1}%)",
            report.final_count,
            report.initial_count,
            report.pass_rate * 100.0
        );

        TlQualityOutcome {
            records: batch,
            report,
        }
    }
}
