//! Polyup Core -- the progression engine for the polynomial upgrade tree.
//!
//! Players accumulate points generated by evaluating a polynomial function
//! and spend them on a tree of upgrades. Each upgrade is gated by
//! prerequisites and, for most nodes, a correctly answered math question.
//! Buying an upgrade mutates the polynomial's coefficients or input, which
//! changes the passive point generation rate.
//!
//! # Session Lifecycle
//!
//! A [`session::GameSession`] owns all mutable state: the currency balance,
//! the set of purchased upgrades, the polynomial, and the (at most one)
//! pending question-gated purchase. Game code drives it with:
//!
//! 1. [`session::GameSession::step`] -- advance one tick, accruing
//!    `evaluate() * passive_multiplier` points.
//! 2. [`session::GameSession::attempt_purchase`] -- buy an upgrade. Nodes
//!    without a gating question commit immediately; gated nodes enter a
//!    pending transaction.
//! 3. [`session::GameSession::submit_answer`] -- resolve a pending purchase.
//!    A correct answer commits; a wrong answer charges the cost anyway
//!    without granting the upgrade (the risk mechanic).
//! 4. [`session::GameSession::cancel_pending`] -- dismiss the gate with zero
//!    side effects.
//!
//! # Key Types
//!
//! - [`catalog::UpgradeCatalog`] -- Immutable, ordered upgrade definitions
//!   (frozen at startup, prerequisites validated at registration).
//! - [`polynomial::PolynomialState`] -- Coefficients and input value;
//!   evaluation is total and deterministic via [`fixed::Fixed64`].
//! - [`progression::ProgressionState`] -- Currency plus the monotone sets of
//!   purchased upgrades and solved questions.
//! - [`layout::Row`] -- Visible-row projection for presentation (singletons
//!   and prerequisite-gated row groups).
//! - [`persist::SaveSnapshot`] -- Versioned save shape consumed by the
//!   [`persist::SaveStore`] contract; load failures fall back to a fresh
//!   player, save failures never touch gameplay state.
//! - [`event::GameEvent`] -- Drained event queue for presentation, audio,
//!   and leaderboard collaborators.

pub mod catalog;
pub mod event;
pub mod fixed;
pub mod id;
pub mod layout;
pub mod persist;
pub mod polynomial;
pub mod progression;
pub mod question;
pub mod session;
