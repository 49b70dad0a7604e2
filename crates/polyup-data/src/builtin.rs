//! The built-in campaign: the polynomial upgrade tree and its question bank.
//!
//! This is the content shipped with the game, defined in code so a session
//! can start without any data files on disk. The tree walks the player from
//! a free constant term through linear-term upgrades, with most nodes gated
//! by a polynomial-functions question. Proof-style questions are reviewed
//! offline and unlocked with a passcode.

use crate::loader::{DataLoadError, GameData};
use polyup_core::catalog::{CatalogError, UpgradeCatalog, UpgradeNode};
use polyup_core::fixed::f64_to_fixed64;
use polyup_core::id::{QuestionId, RowGroupId, UpgradeId};
use polyup_core::polynomial::{DEFAULT_MAX_DEGREE, UpgradeEffect};
use polyup_core::question::{Question, QuestionBank, QuestionBankError, QuestionKind};

// ===========================================================================
// Upgrade tree
// ===========================================================================

struct NodeSpec {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    cost: u32,
    prereqs: &'static [&'static str],
    row_group: Option<u32>,
    question: Option<&'static str>,
    effects: &'static [(EffectSpec, f64)],
}

enum EffectSpec {
    SetCoeff(usize),
    SetInput,
    ScaleInput,
}

const NODES: &[NodeSpec] = &[
    NodeSpec {
        id: "0",
        title: "Welcome to...\nPolynomial Upgrade Tree!",
        description: "Use points, generated by your function, to buy upgrades \
                      and progress through the tree.",
        cost: 0,
        prereqs: &[],
        row_group: None,
        question: None,
        effects: &[],
    },
    NodeSpec {
        id: "1",
        title: "Constant Term",
        description: "Start generating points!\nUnlock degree 0 term: a0, where a0 = 1.",
        cost: 0,
        prereqs: &["0"],
        row_group: None,
        question: None,
        effects: &[(EffectSpec::SetCoeff(0), 1.0)],
    },
    NodeSpec {
        id: "2",
        title: "The First of Many",
        description: "Upgrade a0's value to 2.",
        cost: 3,
        prereqs: &["1"],
        row_group: None,
        question: Some("JK1"),
        effects: &[(EffectSpec::SetCoeff(0), 2.0)],
    },
    NodeSpec {
        id: "3",
        title: "Duplication Glitch?",
        description: "Double a0's value!",
        cost: 10,
        prereqs: &["2"],
        row_group: None,
        question: Some("JK2"),
        effects: &[(EffectSpec::SetCoeff(0), 4.0)],
    },
    NodeSpec {
        id: "4",
        title: "Linear Term",
        description: "Unlock degree 1 term: a1 \u{d7} x, where a1 = 1.",
        cost: 20,
        prereqs: &["3"],
        row_group: None,
        question: None,
        effects: &[(EffectSpec::SetCoeff(1), 1.0)],
    },
    NodeSpec {
        id: "5.1",
        title: "The First x Increase",
        description: "Upgrade x's value to 2.",
        cost: 30,
        prereqs: &["4"],
        row_group: Some(5),
        question: Some("JK5"),
        effects: &[(EffectSpec::SetInput, 2.0)],
    },
    NodeSpec {
        id: "5.2",
        title: "Another Typical Increase",
        description: "Upgrade a0's value to 5.",
        cost: 30,
        prereqs: &["4"],
        row_group: Some(5),
        question: Some("JK6"),
        effects: &[(EffectSpec::SetCoeff(0), 5.0)],
    },
    NodeSpec {
        id: "6",
        title: "Double? No! Let's Triple!",
        description: "Triple a0's value.",
        cost: 100,
        prereqs: &["4"],
        row_group: None,
        question: Some("JA1"),
        effects: &[(EffectSpec::SetCoeff(0), 15.0)],
    },
    NodeSpec {
        id: "7.1",
        title: "Linear: Upgrade Constant",
        description: "Upgrade a0's value to 20.",
        cost: 200,
        prereqs: &["6"],
        row_group: Some(6),
        question: Some("RK1"),
        effects: &[(EffectSpec::SetCoeff(0), 20.0)],
    },
    NodeSpec {
        id: "7.2",
        title: "Linear: Upgrade Slope",
        description: "Upgrade a1's value to 2.",
        cost: 200,
        prereqs: &["6"],
        row_group: Some(6),
        question: Some("JC1"),
        effects: &[(EffectSpec::SetCoeff(1), 2.0)],
    },
    NodeSpec {
        id: "7.3",
        title: "Linear: Upgrade the Input",
        description: "Double x's value.",
        cost: 200,
        prereqs: &["6"],
        row_group: Some(6),
        question: Some("JT1"),
        effects: &[(EffectSpec::ScaleInput, 2.0)],
    },
];

/// Build the built-in upgrade catalog.
pub fn builtin_catalog() -> Result<UpgradeCatalog, CatalogError> {
    let mut catalog = UpgradeCatalog::new(DEFAULT_MAX_DEGREE);
    for spec in NODES {
        catalog.register(UpgradeNode {
            id: UpgradeId::new(spec.id),
            title: spec.title.to_string(),
            description: spec.description.to_string(),
            cost: spec.cost,
            prereqs: spec.prereqs.iter().map(|p| UpgradeId::new(*p)).collect(),
            row_group: spec.row_group.map(RowGroupId),
            question: spec.question.map(QuestionId::new),
            effects: spec
                .effects
                .iter()
                .map(|(kind, value)| match kind {
                    EffectSpec::SetCoeff(degree) => UpgradeEffect::SetCoefficient {
                        degree: *degree,
                        value: f64_to_fixed64(*value),
                    },
                    EffectSpec::SetInput => UpgradeEffect::SetInput {
                        value: f64_to_fixed64(*value),
                    },
                    EffectSpec::ScaleInput => UpgradeEffect::ScaleInput {
                        factor: f64_to_fixed64(*value),
                    },
                })
                .collect(),
        })?;
    }
    Ok(catalog)
}

// ===========================================================================
// Question bank
// ===========================================================================

fn mc(
    id: &str,
    category: &str,
    prompt: &str,
    options: &[&str],
    correct: usize,
    solution: Option<&str>,
) -> Question {
    Question {
        id: QuestionId::new(id),
        prompt: prompt.to_string(),
        category: Some(category.to_string()),
        kind: QuestionKind::MultipleChoice {
            options: options.iter().map(|o| o.to_string()).collect(),
            correct,
        },
        solution: solution.map(str::to_string),
    }
}

fn proof(id: &str, category: &str, prompt: &str, passcode: &str) -> Question {
    Question {
        id: QuestionId::new(id),
        prompt: prompt.to_string(),
        category: Some(category.to_string()),
        kind: QuestionKind::Proof {
            passcode: passcode.to_string(),
        },
        solution: None,
    }
}

/// Build the built-in question bank. Prompts use `$...$` math markup,
/// rendered by the presentation layer.
pub fn builtin_bank() -> Result<QuestionBank, QuestionBankError> {
    let mut bank = QuestionBank::new();

    bank.insert(mc(
        "JK1",
        "Knowledge",
        "The degree of a polynomial function must belong to what type of numbers?",
        &[
            "Natural numbers (\u{2115})",
            "Whole numbers (\u{1d54e})",
            "Integers (\u{2124})",
            "Rational numbers (\u{211a})",
        ],
        1,
        Some(
            "The degree of a polynomial is the highest power of the variable with a \
             non-zero coefficient. Since exponents in polynomials must be whole \
             numbers, the degree belongs to \u{1d54e}.",
        ),
    ))?;

    bank.insert(mc(
        "JK2",
        "Knowledge",
        "State the degree of the polynomial $f(x) = 3x - 2 + x^4 - 10x^2$.",
        &["1", "2", "3", "4"],
        3,
        Some(
            "The degree of a polynomial is the highest degree of all the terms (the \
             exponent of $x$). Here, $x^4$ is the term with the highest degree of 4, \
             so the polynomial has a degree of 4.",
        ),
    ))?;

    bank.insert(mc(
        "JK5",
        "Knowledge",
        "What is the end behaviour of $f(x)=-2x^3+5x-1$?",
        &[
            "As $x \\to -\\infty$, $f(x) \\to -\\infty$.\nAs $x \\to \\infty$, $f(x) \\to \\infty$.",
            "As $x \\to -\\infty$, $f(x) \\to \\infty$.\nAs $x \\to \\infty$, $f(x) \\to -\\infty$.",
            "As $x \\to -\\infty$, $f(x) \\to \\infty$.\nAs $x \\to \\infty$, $f(x) \\to \\infty$.",
            "As $x \\to -\\infty$, $f(x) \\to -\\infty$.\nAs $x \\to \\infty$, $f(x) \\to -\\infty$.",
        ],
        1,
        Some(
            "This is because the degree is odd ($n=3$) and the leading coefficient is \
             negative, so the graph has an end behaviour of Q2 \u{2192} Q4.",
        ),
    ))?;

    bank.insert(mc(
        "JK6",
        "Knowledge",
        "Which option is a polynomial function?",
        &[
            "a) $f(x)=\\sqrt{x}+5$",
            "b) $f(x)=\\frac{3}{x}-1$",
            "c) $f(x)=\\pi$",
            "d) $f(x)=\\sin(x)$",
        ],
        2,
        Some(
            "Option a) has a square root, which is a fractional exponent. Option b) \
             has a variable in the denominator, which is a negative exponent. Option \
             d) is a trigonometric function, not a polynomial. Only option c) \
             satisfies all the conditions of a polynomial.",
        ),
    ))?;

    bank.insert(proof(
        "JA1",
        "Application",
        "Determine the exact equation in factored form for a fifth-degree polynomial \
         function that passes through the points: $\\{(0, -20), (-2, 0), (1, 0), \
         (5, 0)\\}$, where it touches and bounces off the x-axis at $x=1,5$.",
        "123",
    ))?;

    bank.insert(mc(
        "RK1",
        "Knowledge",
        "True or false: $y = 8\\sqrt{8x+9}$ is a polynomial.",
        &["True", "False"],
        1,
        Some(
            "The equation can be written as $y = 8(8x+9)^\\frac{1}{2}$, and since a \
             variable in a polynomial can not have a fractional exponent, the \
             equation is not a polynomial.",
        ),
    ))?;

    bank.insert(proof(
        "JC1",
        "Communication",
        "Is the function $f(x)=2(x-5)^2(x+5)^2(x-2)(x+2)$ even, odd, or neither? \
         Explain both graphically and algebraically.",
        "217",
    ))?;

    bank.insert(proof(
        "JT1",
        "Thinking",
        "Algebraically find and state the transformations that are applied to \
         $f(x)=x^5-x^3+1$ to obtain $g(x)=160(x-3)^5-40(x-3)^3+2$, if you already \
         know two of the transformations: the function is reflected on the x-axis \
         and vertically stretched by a factor of 5.",
        "999",
    ))?;

    Ok(bank)
}

/// The full built-in campaign, validated. An error here is a bug in this
/// file, caught by the tests below.
pub fn builtin_game_data() -> Result<GameData, DataLoadError> {
    let catalog = builtin_catalog().map_err(|e| DataLoadError::Invalid {
        detail: e.to_string(),
    })?;
    let bank = builtin_bank().map_err(|e| DataLoadError::Invalid {
        detail: e.to_string(),
    })?;
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
