//! The upgrade catalog: static, ordered definitions of every upgrade node.
//!
//! Nodes are registered at startup and immutable afterwards. Registration
//! order is significant: it is the tie-break order for tree layout. A node's
//! prerequisites must already be registered when it is added, which both
//! catches dangling references and makes the prerequisite relation acyclic
//! by construction (a node cannot reference itself or anything later).

use crate::id::{QuestionId, RowGroupId, UpgradeId};
use crate::polynomial::UpgradeEffect;
use crate::question::QuestionBank;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// UpgradeNode
// ---------------------------------------------------------------------------

/// One purchasable entry in the progression tree. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeNode {
    /// Unique identifier. Opaque string; see [`UpgradeId`].
    pub id: UpgradeId,

    /// Display title. Opaque payload for presentation.
    pub title: String,

    /// Display description. Opaque payload for presentation.
    pub description: String,

    /// Point cost. May be zero (free, informational nodes).
    pub cost: u32,

    /// Upgrades that must be purchased before this one is visible and
    /// purchasable.
    pub prereqs: Vec<UpgradeId>,

    /// Nodes sharing a row group are laid out together, each appearing once
    /// its own prerequisites are met.
    pub row_group: Option<RowGroupId>,

    /// Optional gating question. `None` means the purchase commits
    /// immediately.
    pub question: Option<QuestionId>,

    /// Polynomial mutations applied, in order, on successful purchase.
    pub effects: Vec<UpgradeEffect>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while building or validating a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate upgrade id: {0}")]
    DuplicateId(UpgradeId),

    #[error("upgrade {upgrade} requires {prereq}, which is not registered before it")]
    UnknownPrerequisite {
        upgrade: UpgradeId,
        prereq: UpgradeId,
    },

    #[error("upgrade {upgrade} has an effect on degree {degree}, but the catalog tracks degrees 0..={max}")]
    EffectDegreeOutOfRange {
        upgrade: UpgradeId,
        degree: usize,
        max: usize,
    },

    #[error("upgrade {upgrade} references question {question}, which is not in the bank")]
    UnknownQuestion {
        upgrade: UpgradeId,
        question: QuestionId,
    },
}

// ---------------------------------------------------------------------------
// UpgradeCatalog
// ---------------------------------------------------------------------------

/// The ordered, immutable set of upgrade nodes. Built once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeCatalog {
    nodes: Vec<UpgradeNode>,
    index: HashMap<UpgradeId, usize>,
    max_degree: usize,
}

impl UpgradeCatalog {
    /// Create an empty catalog tracking polynomial degrees `0..=max_degree`.
    pub fn new(max_degree: usize) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            max_degree,
        }
    }

    /// Register an upgrade node. Fails on a duplicate id, on a prerequisite
    /// that has not been registered yet, or on an effect outside the tracked
    /// degree range.
    pub fn register(&mut self, node: UpgradeNode) -> Result<(), CatalogError> {
        if self.index.contains_key(&node.id) {
            return Err(CatalogError::DuplicateId(node.id));
        }
        for prereq in &node.prereqs {
            if !self.index.contains_key(prereq) {
                return Err(CatalogError::UnknownPrerequisite {
                    upgrade: node.id.clone(),
                    prereq: prereq.clone(),
                });
            }
        }
        for effect in &node.effects {
            if let Some(degree) = effect.touched_degree()
                && degree > self.max_degree
            {
                return Err(CatalogError::EffectDegreeOutOfRange {
                    upgrade: node.id.clone(),
                    degree,
                    max: self.max_degree,
                });
            }
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// All nodes in registration order.
    pub fn all(&self) -> &[UpgradeNode] {
        &self.nodes
    }

    /// Look up a node by id.
    pub fn get(&self, id: &UpgradeId) -> Option<&UpgradeNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &UpgradeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Highest polynomial degree effects may touch.
    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// Check that every gating question resolves in the bank. Enforced at
    /// load, not deferred to transaction time (fail closed on configuration
    /// defects).
    pub fn validate_questions(&self, bank: &QuestionBank) -> Result<(), CatalogError> {
        for node in &self.nodes {
            if let Some(question) = &node.question
                && !bank.contains(question)
            {
                return Err(CatalogError::UnknownQuestion {
                    upgrade: node.id.clone(),
                    question: question.clone(),
                });
            }
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
