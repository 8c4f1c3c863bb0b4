//! Interpretation of a signature.

use friction_core::config::EliteBenchmark;
use serde::Serialize;

use super::signature::L2Signature;

const STRONG_TRIGGER: f64 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PotentialCategory {
    HighPotential,
    ModeratePotential,
    Developing,
    PlateauRisk,
}

impl PotentialCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighPotential => "high_potential",
            Self::ModeratePotential => "moderate_potential",
            Self::Developing => "developing",
            Self::PlateauRisk => "plateau_risk",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::HighPotential => "Strong L2 signature, likely to improve",
            Self::ModeratePotential => "Sandwich present but the trigger is weak",
            Self::Developing => "Trigger present without the sandwich; worth monitoring",
            Self::PlateauRisk => "No L2 signature; improvement may stall",
        }
    }
}

/// Playing style by trigger strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    SpeedMerchant,
    Balanced,
    Deliberate,
}

impl Style {
    pub fn from_trigger(l2: f64) -> Self {
        if l2 >= 2.0 {
            Self::SpeedMerchant
        } else if l2 >= 1.5 {
            Self::Balanced
        } else {
            Self::Deliberate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpeedMerchant => "speed merchant",
            Self::Balanced => "balanced",
            Self::Deliberate => "deliberate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: PotentialCategory,
    pub style: Style,
}

pub fn classify(sig: &L2Signature) -> Classification {
    let category = match (sig.sandwich, sig.l2_trigger) {
        (true, l2) if l2 >= STRONG_TRIGGER => PotentialCategory::HighPotential,
        (true, _) => PotentialCategory::ModeratePotential,
        (false, l2) if l2 > 1.0 => PotentialCategory::Developing,
        _ => PotentialCategory::PlateauRisk,
    };
    Classification {
        category,
        style: Style::from_trigger(sig.l2_trigger),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkComparison {
    pub name: String,
    /// `1 / (1 + distance)`, in (0, 1].
    pub similarity: f64,
    /// Player trigger minus benchmark trigger.
    pub l2_diff: f64,
}

/// Similarity to each benchmark over trigger and the opening and
/// middlegame ratios, most similar first.
pub fn compare_to_benchmarks(sig: &L2Signature, benchmarks: &[EliteBenchmark]) -> Vec<BenchmarkComparison> {
    let mut out: Vec<BenchmarkComparison> = benchmarks
        .iter()
        .map(|b| {
            let distance = (sig.l2_trigger - b.l2_trigger).abs()
                + (sig.opening_ratio - b.opening_ratio).abs()
                + (sig.middlegame_ratio - b.middlegame_ratio).abs();
            BenchmarkComparison {
                name: b.name.clone(),
                similarity: 1.0 / (1.0 + distance),
                l2_diff: sig.l2_trigger - b.l2_trigger,
            }
        })
        .collect();
    out.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    out
}
