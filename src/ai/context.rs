//! Retrieval context assembly.
//!
//! Every normalized message in the window is "retrieved"; the only selection
//! is the length budget. When the day's messages do not fit, the oldest units
//! are dropped first so the most recent activity always reaches the model.

use tracing::{info, warn};

use crate::core::models::NormalizedUnit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalContext {
    /// Nothing qualified in the window. Leads to the no-activity notice.
    Empty,
    Assembled(AssembledContext),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContext {
    units: Vec<NormalizedUnit>,
    total_len: usize,
    dropped: usize,
}

impl AssembledContext {
    /// Retained units, chronological.
    #[must_use]
    pub fn units(&self) -> &[NormalizedUnit] {
        &self.units
    }

    /// Cumulative text length of the retained units.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.dropped > 0
    }

    /// Number of older units removed to fit the budget.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl RetrievalContext {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, RetrievalContext::Empty)
    }
}

/// Assemble units (chronological) into a context whose text fits `budget`.
#[must_use]
pub fn build_context(units: Vec<NormalizedUnit>, budget: usize) -> RetrievalContext {
    if units.is_empty() {
        return RetrievalContext::Empty;
    }

    let total = units.len();
    let mut kept_len = 0usize;
    let mut first_kept = total;
    for (idx, unit) in units.iter().enumerate().rev() {
        let next = kept_len + unit.len();
        if next > budget {
            break;
        }
        kept_len = next;
        first_kept = idx;
    }

    let mut units = units;
    let retained = units.split_off(first_kept);
    let dropped = total - retained.len();

    if dropped > 0 {
        warn!(
            "Context budget of {} exceeded; dropped {} oldest of {} messages",
            budget, dropped, total
        );
    }
    info!(
        "Built retrieval context with {} messages ({} chars)",
        retained.len(),
        kept_len
    );

    RetrievalContext::Assembled(AssembledContext {
        units: retained,
        total_len: kept_len,
        dropped,
    })
}
