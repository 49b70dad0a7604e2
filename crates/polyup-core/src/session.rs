//! The game session: owner of all mutable state and the purchase engine.
//!
//! A [`GameSession`] is an explicit object -- no module-level singletons, no
//! ambient timers. The tick scheduler and the purchase engine both go
//! through `&mut self`, so accrual and spending serialize on the same
//! logical thread and no update of the currency balance can be lost.
//!
//! # Purchase Transactions
//!
//! `attempt_purchase` validates eligibility and either commits immediately
//! (no gating question) or parks a single pending transaction while the
//! player answers. `submit_answer` resolves it: a correct answer commits,
//! a wrong answer charges the cost without granting the upgrade, and
//! `cancel_pending` discards it with zero side effects. Eligibility is
//! re-checked at commit time, never trusted from a stale UI read.

use crate::catalog::{CatalogError, UpgradeCatalog, UpgradeNode};
use crate::event::GameEvent;
use crate::fixed::{Fixed64, Ticks, fixed64_to_f64};
use crate::id::{PlayerId, QuestionId, UpgradeId};
use crate::layout::{Row, visible_rows};
use crate::polynomial::PolynomialState;
use crate::progression::ProgressionState;
use crate::question::{Answer, QuestionBank};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Session-wide configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Highest polynomial degree tracked by the model.
    pub max_degree: usize,

    /// Whether an admin-unlocked session still appears in the leaderboard
    /// projection. A single explicit decision; defaults to excluded.
    pub admin_on_leaderboard: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_degree: crate::polynomial::DEFAULT_MAX_DEGREE,
            admin_on_leaderboard: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction types
// ---------------------------------------------------------------------------

/// The parked state of a question-gated purchase awaiting an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPurchase {
    pub upgrade: UpgradeId,
    pub question: QuestionId,
    pub cost: u32,
}

/// Result of an `attempt_purchase` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// The node had no gating question; the purchase committed.
    Purchased,

    /// A gating question must be answered before the purchase resolves.
    QuestionPending(QuestionId),
}

/// Result of resolving a pending purchase with `submit_answer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The purchase committed: cost deducted, upgrade granted, question
    /// marked solved, effects applied.
    Correct,

    /// Wrong answer: the cost was charged (flooring at zero) and nothing
    /// else changed.
    Incorrect { penalty: u32 },
}

/// Errors from the purchase engine.
///
/// `Ineligible` is a local, silent rejection -- the caller is expected to
/// have already disabled the affordance. It never changes state.
#[derive(Debug, thiserror::Error)]
pub enum PurchaseError {
    #[error("upgrade not found: {0}")]
    UnknownUpgrade(UpgradeId),

    #[error("upgrade {0} is not eligible (owned, missing prerequisites, or unaffordable)")]
    Ineligible(UpgradeId),

    #[error("upgrade {upgrade} references question {question}, which is not in the bank")]
    UnknownQuestion {
        upgrade: UpgradeId,
        question: QuestionId,
    },

    #[error("another purchase is already awaiting an answer")]
    TransactionInFlight,

    #[error("no purchase is awaiting an answer")]
    NoPendingTransaction,
}

// ---------------------------------------------------------------------------
// Leaderboard projection
// ---------------------------------------------------------------------------

/// Read-only projection consumed by the leaderboard collaborator. The
/// engine produces rows for its own player only; it never ranks others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub player: PlayerId,
    pub points: u64,
    pub points_per_second: f64,
    pub purchased_count: usize,
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// All per-player runtime state plus the immutable catalog and bank.
#[derive(Debug, Clone)]
pub struct GameSession {
    catalog: UpgradeCatalog,
    bank: QuestionBank,
    polynomial: PolynomialState,
    progression: ProgressionState,
    pending: Option<PendingPurchase>,
    tick: Ticks,
    admin_unlocked: bool,
    config: SessionConfig,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Start a fresh session. Fails closed if any catalog node references a
    /// question the bank does not contain.
    pub fn new(
        catalog: UpgradeCatalog,
        bank: QuestionBank,
        config: SessionConfig,
    ) -> Result<Self, CatalogError> {
        catalog.validate_questions(&bank)?;
        let polynomial = PolynomialState::new(config.max_degree);
        Ok(Self {
            catalog,
            bank,
            polynomial,
            progression: ProgressionState::new(),
            pending: None,
            tick: 0,
            admin_unlocked: false,
            config,
            events: Vec::new(),
        })
    }

    // -- Queries --

    pub fn catalog(&self) -> &UpgradeCatalog {
        &self.catalog
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn polynomial(&self) -> &PolynomialState {
        &self.polynomial
    }

    pub fn progression(&self) -> &ProgressionState {
        &self.progression
    }

    pub fn tick(&self) -> Ticks {
        self.tick
    }

    pub fn currency(&self) -> Fixed64 {
        self.progression.currency()
    }

    /// Whole-point balance for display.
    pub fn points(&self) -> u64 {
        self.progression.points()
    }

    /// Current passive accrual rate per tick.
    pub fn points_per_second(&self) -> Fixed64 {
        self.polynomial.rate()
    }

    pub fn is_admin_unlocked(&self) -> bool {
        self.admin_unlocked
    }

    /// The question gating the in-flight purchase, if any.
    pub fn pending_purchase(&self) -> Option<&PendingPurchase> {
        self.pending.as_ref()
    }

    /// True iff the node exists, is not owned, has its prerequisites
    /// purchased, and is affordable. Drives the UI affordance; the same
    /// check is re-run inside every commit.
    pub fn can_purchase(&self, id: &UpgradeId) -> bool {
        match self.catalog.get(id) {
            Some(node) => self.is_eligible(node),
            None => false,
        }
    }

    fn is_eligible(&self, node: &UpgradeNode) -> bool {
        !self.progression.is_purchased(&node.id)
            && self.progression.prereqs_met(&node.prereqs)
            && self.progression.can_afford(node.cost)
    }

    /// The ordered visible rows for presentation.
    pub fn visible_rows(&self) -> Vec<Row> {
        visible_rows(&self.catalog, &self.progression)
    }

    /// Leaderboard projection for this player. `None` when the session was
    /// admin-unlocked and the configuration excludes such sessions.
    pub fn leaderboard_row(&self, player: &PlayerId) -> Option<LeaderboardRow> {
        if self.admin_unlocked && !self.config.admin_on_leaderboard {
            return None;
        }
        Some(LeaderboardRow {
            player: player.clone(),
            points: self.progression.points(),
            points_per_second: fixed64_to_f64(self.points_per_second()),
            purchased_count: self.progression.purchased_count(),
        })
    }

    // -- Purchase engine --

    /// Initiate a purchase.
    ///
    /// Question-free nodes commit immediately. Gated nodes park a pending
    /// transaction without touching any state; at most one may be in flight.
    /// A node referencing an unknown question aborts fail-closed.
    pub fn attempt_purchase(&mut self, id: &UpgradeId) -> Result<PurchaseOutcome, PurchaseError> {
        if self.pending.is_some() {
            return Err(PurchaseError::TransactionInFlight);
        }
        let node = self
            .catalog
            .get(id)
            .ok_or_else(|| PurchaseError::UnknownUpgrade(id.clone()))?;
        if !self.is_eligible(node) {
            return Err(PurchaseError::Ineligible(id.clone()));
        }

        match &node.question {
            None => {
                let node = node.clone();
                self.commit(&node);
                Ok(PurchaseOutcome::Purchased)
            }
            Some(question) => {
                if !self.bank.contains(question) {
                    return Err(PurchaseError::UnknownQuestion {
                        upgrade: id.clone(),
                        question: question.clone(),
                    });
                }
                let question = question.clone();
                self.pending = Some(PendingPurchase {
                    upgrade: id.clone(),
                    question: question.clone(),
                    cost: node.cost,
                });
                Ok(PurchaseOutcome::QuestionPending(question))
            }
        }
    }

    /// Resolve the pending purchase against a submitted answer.
    ///
    /// Eligibility is re-checked at commit time; a transaction whose node
    /// became ineligible is dropped without grading. A wrong answer charges
    /// the cost (flooring at zero) and grants nothing.
    pub fn submit_answer(&mut self, answer: &Answer) -> Result<AnswerOutcome, PurchaseError> {
        let pending = self
            .pending
            .take()
            .ok_or(PurchaseError::NoPendingTransaction)?;
        let node = self
            .catalog
            .get(&pending.upgrade)
            .ok_or_else(|| PurchaseError::UnknownUpgrade(pending.upgrade.clone()))?
            .clone();
        if !self.is_eligible(&node) {
            return Err(PurchaseError::Ineligible(node.id));
        }
        let question = self
            .bank
            .get(&pending.question)
            .ok_or_else(|| PurchaseError::UnknownQuestion {
                upgrade: node.id.clone(),
                question: pending.question.clone(),
            })?;

        if question.check(answer) {
            self.commit(&node);
            Ok(AnswerOutcome::Correct)
        } else {
            self.progression.deduct(Fixed64::from_num(node.cost));
            self.events.push(GameEvent::PurchaseFailed {
                upgrade: node.id,
                penalty: node.cost,
                tick: self.tick,
            });
            Ok(AnswerOutcome::Incorrect { penalty: node.cost })
        }
    }

    /// Dismiss the pending purchase without submitting. Returns whether a
    /// transaction was actually in flight. No state changes either way.
    pub fn cancel_pending(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Commit a purchase: deduct, grant, solve, apply effects, emit events.
    /// Callers have already verified eligibility.
    fn commit(&mut self, node: &UpgradeNode) {
        self.progression.deduct(Fixed64::from_num(node.cost));
        self.progression.mark_purchased(node.id.clone());
        if let Some(question) = &node.question {
            self.progression.mark_solved(question.clone());
            self.events.push(GameEvent::QuestionSolved {
                question: question.clone(),
                tick: self.tick,
            });
        }
        for effect in &node.effects {
            self.polynomial = effect.apply(&self.polynomial);
        }
        self.events.push(GameEvent::UpgradePurchased {
            upgrade: node.id.clone(),
            cost: node.cost,
            tick: self.tick,
        });
        self.events.push(GameEvent::RateChanged {
            points_per_second: self.points_per_second(),
            tick: self.tick,
        });
    }

    // -- Admin bypass --

    /// Mark every node purchased and every gating question solved, applying
    /// each node's effects exactly once. Runs outside currency accounting
    /// and is idempotent: already-purchased nodes are skipped, so a second
    /// call changes nothing.
    pub fn unlock_all(&mut self) {
        self.pending = None;
        let fresh: Vec<UpgradeNode> = self
            .catalog
            .all()
            .iter()
            .filter(|n| !self.progression.is_purchased(&n.id))
            .cloned()
            .collect();
        for node in &fresh {
            self.progression.mark_purchased(node.id.clone());
            if let Some(question) = &node.question {
                self.progression.mark_solved(question.clone());
            }
            for effect in &node.effects {
                self.polynomial = effect.apply(&self.polynomial);
            }
        }
        self.admin_unlocked = true;
        if !fresh.is_empty() {
            self.events.push(GameEvent::EverythingUnlocked { tick: self.tick });
            self.events.push(GameEvent::RateChanged {
                points_per_second: self.points_per_second(),
                tick: self.tick,
            });
        }
    }

    // -- Tick scheduler --

    /// Advance one tick: accrue `evaluate() * passive_multiplier` into the
    /// balance. Pure accumulation -- no catch-up for missed ticks. Returns
    /// the amount accrued.
    pub fn step(&mut self) -> Fixed64 {
        self.tick += 1;
        let gain = self.polynomial.rate();
        self.progression.deposit(gain);
        gain
    }

    // -- Events --

    /// Drain all pending events, clearing the internal queue.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only view of the pending events.
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    // -- Persistence plumbing (see crate::persist) --

    pub(crate) fn from_restored_parts(
        catalog: UpgradeCatalog,
        bank: QuestionBank,
        config: SessionConfig,
        polynomial: PolynomialState,
        progression: ProgressionState,
    ) -> Self {
        Self {
            catalog,
            bank,
            polynomial,
            progression,
            pending: None,
            tick: 0,
            admin_unlocked: false,
            config,
            events: Vec::new(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
