//! Sliding-window history trimming.
//!
//! Walks the conversation from the newest turn backwards, charging each turn
//! its token count plus a fixed overhead for role markers, and stops at the
//! first turn that would overflow the budget. What remains is always a
//! contiguous suffix of the input, returned as a sub-slice.

use super::tokens::CountTokens;
use crate::config::GeneratorConfig;
use crate::turn::Turn;

/// Keeps the most recent turns that fit a token budget.
#[derive(Debug, Clone, Copy)]
pub struct HistoryTrimmer {
    /// Maximum tokens the kept turns may cost, overhead included.
    pub budget: usize,
    /// Added to every kept turn's token count.
    pub turn_overhead: usize,
}

/// Outcome of a [`HistoryTrimmer::trim_with_report`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimReport {
    pub kept: usize,
    pub dropped: usize,
    /// Cost of the kept turns, overhead included.
    pub tokens: usize,
}

impl HistoryTrimmer {
    pub fn new(budget: usize, turn_overhead: usize) -> Self {
        Self {
            budget,
            turn_overhead,
        }
    }

    /// Budget and overhead taken from a generator config.
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.history_budget(), config.turn_overhead)
    }

    /// Longest suffix of `turns` whose total cost fits the budget.
    ///
    /// A newest turn that alone exceeds the budget yields an empty slice.
    pub fn trim<'a>(&self, turns: &'a [Turn], counter: &dyn CountTokens) -> &'a [Turn] {
        self.trim_with_report(turns, counter).0
    }

    /// Like [`trim`](Self::trim), also reporting what was kept.
    pub fn trim_with_report<'a>(
        &self,
        turns: &'a [Turn],
        counter: &dyn CountTokens,
    ) -> (&'a [Turn], TrimReport) {
        let mut total = 0usize;
        let mut start = turns.len();

        for (idx, turn) in turns.iter().enumerate().rev() {
            let cost = counter.count(&turn.content) + self.turn_overhead;
            match total.checked_add(cost) {
                Some(next) if next <= self.budget => {
                    total = next;
                    start = idx;
                }
                _ => break,
            }
        }

        let kept = &turns[start..];
        let report = TrimReport {
            kept: kept.len(),
            dropped: start,
            tokens: total,
        };
        (kept, report)
    }
}
