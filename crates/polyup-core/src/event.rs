//! Session events, drained in batch by presentation and other collaborators.
//!
//! Events accumulate on the [`crate::session::GameSession`] and are handed
//! over via `drain_events`. They are transient: never serialized into saves.

use crate::fixed::{Fixed64, Ticks};
use crate::id::{QuestionId, UpgradeId};

/// Something observable happened in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// An upgrade was purchased and its effects applied.
    UpgradePurchased {
        upgrade: UpgradeId,
        cost: u32,
        tick: Ticks,
    },

    /// A gated purchase failed on a wrong answer; the cost was charged
    /// anyway (the risk mechanic). `penalty` is the nominal cost, even when
    /// the balance floored at zero.
    PurchaseFailed {
        upgrade: UpgradeId,
        penalty: u32,
        tick: Ticks,
    },

    /// A gating question was answered correctly.
    QuestionSolved { question: QuestionId, tick: Ticks },

    /// The generation rate changed (after a purchase or an admin unlock).
    RateChanged {
        points_per_second: Fixed64,
        tick: Ticks,
    },

    /// Admin bypass marked the whole tree purchased.
    EverythingUnlocked { tick: Ticks },
}
