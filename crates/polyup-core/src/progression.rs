//! Mutable per-player progression state.
//!
//! Currency may be fractional during accrual and is floored only for
//! display/persistence. The purchased and solved sets grow monotonically;
//! nothing in the engine ever removes an entry.

use crate::fixed::{Fixed64, floor_points};
use crate::id::{QuestionId, UpgradeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Currency balance plus the monotone purchased/solved sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    currency: Fixed64,
    purchased: BTreeSet<UpgradeId>,
    solved_questions: BTreeSet<QuestionId>,
}

impl ProgressionState {
    /// A fresh player: zero currency, nothing purchased or solved.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct from explicit parts when restoring a save.
    pub(crate) fn from_parts(
        currency: Fixed64,
        purchased: BTreeSet<UpgradeId>,
        solved_questions: BTreeSet<QuestionId>,
    ) -> Self {
        Self {
            currency,
            purchased,
            solved_questions,
        }
    }

    pub fn currency(&self) -> Fixed64 {
        self.currency
    }

    /// Whole-point balance for display and persistence.
    pub fn points(&self) -> u64 {
        floor_points(self.currency)
    }

    /// Add accrued currency.
    pub fn deposit(&mut self, amount: Fixed64) {
        self.currency = self.currency.saturating_add(amount);
    }

    /// Deduct currency, flooring at zero. A penalty larger than the balance
    /// leaves the balance at exactly zero, never negative.
    pub fn deduct(&mut self, amount: Fixed64) {
        if amount >= self.currency {
            self.currency = Fixed64::ZERO;
        } else {
            self.currency -= amount;
        }
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        self.currency >= Fixed64::from_num(cost)
    }

    /// Record a purchase. Returns false if the id was already present
    /// (an id is added at most once).
    pub fn mark_purchased(&mut self, id: UpgradeId) -> bool {
        self.purchased.insert(id)
    }

    pub fn is_purchased(&self, id: &UpgradeId) -> bool {
        self.purchased.contains(id)
    }

    /// True iff every prerequisite in the slice has been purchased.
    pub fn prereqs_met(&self, prereqs: &[UpgradeId]) -> bool {
        prereqs.iter().all(|p| self.purchased.contains(p))
    }

    pub fn purchased(&self) -> impl Iterator<Item = &UpgradeId> {
        self.purchased.iter()
    }

    pub fn purchased_count(&self) -> usize {
        self.purchased.len()
    }

    pub fn mark_solved(&mut self, id: QuestionId) -> bool {
        self.solved_questions.insert(id)
    }

    pub fn is_solved(&self, id: &QuestionId) -> bool {
        self.solved_questions.contains(id)
    }

    pub fn solved_questions(&self) -> impl Iterator<Item = &QuestionId> {
        self.solved_questions.iter()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
