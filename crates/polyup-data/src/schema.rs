//! Serde data file structs for game content definitions.
//!
//! These structs define the on-disk format for upgrade trees and question
//! banks. They are deserialized from RON or JSON data files and then
//! resolved into engine types by the loader. Numeric values are plain f64
//! on disk; the loader converts them to the engine's fixed-point type.

use serde::Deserialize;

// ===========================================================================
// Upgrades
// ===========================================================================

/// An upgrade node definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct UpgradeData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub cost: u32,
    #[serde(default)]
    pub prereqs: Vec<String>,
    /// Nodes sharing a group id render on one row.
    #[serde(default)]
    pub row_group: Option<u32>,
    /// Gating question id; absent means the purchase commits immediately.
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub effects: Vec<EffectData>,
}

/// A polynomial effect in a data file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectData {
    /// Set the degree-`degree` coefficient to `value`.
    SetCoefficient { degree: usize, value: f64 },
    /// Multiply the degree-`degree` coefficient by `factor`.
    ScaleCoefficient { degree: usize, factor: f64 },
    /// Set the input variable `x`.
    SetInput { value: f64 },
    /// Multiply the input variable `x` by `factor`.
    ScaleInput { factor: f64 },
    /// Multiply the passive accrual multiplier by `factor`.
    ScaleMultiplier { factor: f64 },
}

// ===========================================================================
// Questions
// ===========================================================================

/// A question definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionData {
    pub id: String,
    pub prompt: String,
    #[serde(default)]
    pub category: Option<String>,
    pub kind: QuestionKindData,
    #[serde(default)]
    pub solution: Option<String>,
}

/// How the question is answered and checked.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKindData {
    /// Pick one option; `correct` is the matching index.
    MultipleChoice { options: Vec<String>, correct: usize },
    /// Typed answer compared by exact string equality.
    FreeResponse { correct: String },
    /// Proof work reviewed offline; the passcode is the oracle.
    Proof { passcode: String },
}
