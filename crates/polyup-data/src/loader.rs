//! Resolution pipeline: reads data files, resolves references, builds the
//! catalog and question bank.
//!
//! Provides format detection (RON/JSON), file discovery, and deserialization
//! helpers. `load_game_data` is the top-level entry point: it reads
//! `upgrades` and `questions` files from a directory and produces validated
//! engine types, failing closed on any broken reference.

use crate::schema::{EffectData, QuestionData, QuestionKindData, UpgradeData};
use polyup_core::catalog::{UpgradeCatalog, UpgradeNode};
use polyup_core::fixed::f64_to_fixed64;
use polyup_core::id::{QuestionId, RowGroupId, UpgradeId};
use polyup_core::polynomial::UpgradeEffect;
use polyup_core::question::{Question, QuestionBank, QuestionKind};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The content failed engine-side validation (duplicate ids, unknown
    /// prerequisites or questions, out-of-range effect degrees).
    #[error("invalid content: {detail}")]
    Invalid { detail: String },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without
/// extension). Returns `Ok(None)` if no file is found, or
/// `Err(ConflictingFormats)` if multiple formats exist for the same base.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let extensions = ["ron", "json"];
    let mut found: Option<PathBuf> = None;

    for ext in &extensions {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Read a file and deserialize it according to its format (detected from
/// extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
        Format::Json => serde_json::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
    }
}

// ===========================================================================
// Resolution
// ===========================================================================

fn resolve_effect(effect: &EffectData) -> UpgradeEffect {
    match *effect {
        EffectData::SetCoefficient { degree, value } => UpgradeEffect::SetCoefficient {
            degree,
            value: f64_to_fixed64(value),
        },
        EffectData::ScaleCoefficient { degree, factor } => UpgradeEffect::ScaleCoefficient {
            degree,
            factor: f64_to_fixed64(factor),
        },
        EffectData::SetInput { value } => UpgradeEffect::SetInput {
            value: f64_to_fixed64(value),
        },
        EffectData::ScaleInput { factor } => UpgradeEffect::ScaleInput {
            factor: f64_to_fixed64(factor),
        },
        EffectData::ScaleMultiplier { factor } => UpgradeEffect::ScaleMultiplier {
            factor: f64_to_fixed64(factor),
        },
    }
}

/// Build a catalog from raw upgrade definitions, in file order. Registration
/// rejects duplicates, unknown prerequisites (prerequisites must be defined
/// earlier in the file), and out-of-range effect degrees.
pub fn build_catalog(
    upgrades: &[UpgradeData],
    max_degree: usize,
) -> Result<UpgradeCatalog, DataLoadError> {
    let mut catalog = UpgradeCatalog::new(max_degree);
    for raw in upgrades {
        let node = UpgradeNode {
            id: UpgradeId::new(raw.id.clone()),
            title: raw.title.clone(),
            description: raw.description.clone(),
            cost: raw.cost,
            prereqs: raw.prereqs.iter().map(|p| UpgradeId::new(p.clone())).collect(),
            row_group: raw.row_group.map(RowGroupId),
            question: raw.question.as_ref().map(|q| QuestionId::new(q.clone())),
            effects: raw.effects.iter().map(resolve_effect).collect(),
        };
        catalog.register(node).map_err(|e| DataLoadError::Invalid {
            detail: e.to_string(),
        })?;
    }
    Ok(catalog)
}

/// Build a question bank from raw question definitions.
pub fn build_bank(questions: &[QuestionData]) -> Result<QuestionBank, DataLoadError> {
    let mut bank = QuestionBank::new();
    for raw in questions {
        let kind = match &raw.kind {
            QuestionKindData::MultipleChoice { options, correct } => {
                if *correct >= options.len() {
                    return Err(DataLoadError::Invalid {
                        detail: format!(
                            "question {}: correct index {} out of range ({} options)",
                            raw.id,
                            correct,
                            options.len()
                        ),
                    });
                }
                QuestionKind::MultipleChoice {
                    options: options.clone(),
                    correct: *correct,
                }
            }
            QuestionKindData::FreeResponse { correct } => QuestionKind::FreeResponse {
                correct: correct.clone(),
            },
            QuestionKindData::Proof { passcode } => QuestionKind::Proof {
                passcode: passcode.clone(),
            },
        };
        bank.insert(Question {
            id: QuestionId::new(raw.id.clone()),
            prompt: raw.prompt.clone(),
            category: raw.category.clone(),
            kind,
            solution: raw.solution.clone(),
        })
        .map_err(|e| DataLoadError::Invalid {
            detail: e.to_string(),
        })?;
    }
    Ok(bank)
}

// ===========================================================================
// Top-level loading
// ===========================================================================

/// Validated game content, ready to hand to a session.
#[derive(Debug, Clone)]
pub struct GameData {
    pub catalog: UpgradeCatalog,
    pub bank: QuestionBank,
}

/// Load `upgrades.{ron,json}` and `questions.{ron,json}` from a directory
/// and resolve them into engine types. Fails closed if any node references
/// a question the bank does not contain.
pub fn load_game_data(dir: &Path, max_degree: usize) -> Result<GameData, DataLoadError> {
    let upgrades_path = require_data_file(dir, "upgrades")?;
    let questions_path = require_data_file(dir, "questions")?;

    let upgrades: Vec<UpgradeData> = deserialize_file(&upgrades_path)?;
    let questions: Vec<QuestionData> = deserialize_file(&questions_path)?;

    let catalog = build_catalog(&upgrades, max_degree)?;
    let bank = build_bank(&questions)?;
    catalog
        .validate_questions(&bank)
        .map_err(|e| DataLoadError::Invalid {
            detail: e.to_string(),
        })?;

    Ok(GameData { catalog, bank })
}

// ===========================================================================
// Tests
// ===========================================================================
