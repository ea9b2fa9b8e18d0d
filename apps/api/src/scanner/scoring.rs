//! Score composition: three sub-scores blended with fixed weights.
//!
//! final = round(0.70 × keyword_match + 0.20 × role_relevance + 0.10 × structure)
//!
//! Weights are held as integer percentages so the blend is exact before rounding
//! (17.5 stays 17.5 rather than 17.499…).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::scanner::sections::{SectionPresence, REQUIRED_SECTIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub keyword_match: u32,
    pub role_relevance: u32,
    pub structure: u32,
}

/// 70 / 20 / 10. Fixed policy; changing it breaks score parity.
pub const SCORE_WEIGHTS: ScoreWeights = ScoreWeights {
    keyword_match: 70,
    role_relevance: 20,
    structure: 10,
};

/// Role relevance under this is reported as weak alignment.
pub const WEAK_ROLE_RELEVANCE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub keyword_match: f64,
    pub role_relevance: f64,
    pub structure: f64,
    pub final_score: u8,
}

impl ScoreBreakdown {
    pub fn new(keyword_match: f64, role_relevance: f64, structure: f64) -> Self {
        Self {
            keyword_match,
            role_relevance,
            structure,
            final_score: compose(keyword_match, role_relevance, structure, &SCORE_WEIGHTS),
        }
    }
}

/// Share of job keywords found in the resume. An empty requirement set is vacuously
/// satisfied (100).
pub fn keyword_match_score(matched: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    matched as f64 * 100.0 / total as f64
}

/// Token-overlap ratio between the job title and the resume headline. Zero when the
/// title carries no content tokens.
pub fn role_relevance_score(title_tokens: &[String], resume_tokens: &HashSet<String>) -> f64 {
    if title_tokens.is_empty() {
        return 0.0;
    }
    let overlap = title_tokens
        .iter()
        .filter(|t| resume_tokens.contains(t.as_str()))
        .count();
    overlap as f64 * 100.0 / title_tokens.len() as f64
}

pub fn structure_score(sections: &SectionPresence) -> f64 {
    sections.count() as f64 * 100.0 / REQUIRED_SECTIONS.len() as f64
}

/// Weighted blend, rounded half away from zero and clamped to [0, 100].
pub fn compose(keyword_match: f64, role_relevance: f64, structure: f64, weights: &ScoreWeights) -> u8 {
    let total_weight = weights.keyword_match + weights.role_relevance + weights.structure;
    if total_weight == 0 {
        return 0;
    }
    let blended = (weights.keyword_match as f64 * keyword_match
        + weights.role_relevance as f64 * role_relevance
        + weights.structure as f64 * structure)
        / total_weight as f64;
    blended.round().clamp(0.0, 100.0) as u8
}

// ────────────────────────────────────────────────────────────────────────────
// Score bands
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
    Poor,
}

/// Evaluated top-down; the first threshold the score reaches wins.
pub const SCORE_BANDS: &[(u8, ScoreBand, &str)] = &[
    (80, ScoreBand::Strong, "Strong match: likely to pass an automated keyword screen."),
    (60, ScoreBand::Moderate, "Moderate match: passes some screens, a few gaps to close."),
    (40, ScoreBand::Weak, "Weak match: likely filtered out before a human reads it."),
    (0, ScoreBand::Poor, "Poor match: the resume barely reflects this job's requirements."),
];

pub fn score_band(score: u8) -> (ScoreBand, &'static str) {
    SCORE_BANDS
        .iter()
        .find(|(threshold, _, _)| score >= *threshold)
        .map(|(_, band, message)| (*band, *message))
        .unwrap_or((ScoreBand::Poor, SCORE_BANDS[SCORE_BANDS.len() - 1].2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_match_ratio() {
        assert_eq!(keyword_match_score(1, 4), 25.0);
        assert_eq!(keyword_match_score(0, 3), 0.0);
        assert_eq!(keyword_match_score(3, 3), 100.0);
    }

    #[test]
    fn test_empty_requirements_are_vacuously_satisfied() {
        assert_eq!(keyword_match_score(0, 0), 100.0);
    }

    #[test]
    fn test_role_relevance_overlap() {
        let title = vec!["backend".to_string(), "engineer".to_string()];
        let resume: HashSet<String> = ["backend", "developer"].iter().map(|s| s.to_string()).collect();
        assert_eq!(role_relevance_score(&title, &resume), 50.0);
        assert_eq!(role_relevance_score(&[], &resume), 0.0);
    }

    #[test]
    fn test_structure_score_thirds() {
        let none = SectionPresence::default();
        let two = SectionPresence {
            skills: true,
            experience: true,
            projects: false,
        };
        let all = SectionPresence {
            skills: true,
            experience: true,
            projects: true,
        };
        assert_eq!(structure_score(&none), 0.0);
        assert!((structure_score(&two) - 66.666).abs() < 0.01);
        assert_eq!(structure_score(&all), 100.0);
    }

    #[test]
    fn test_compose_uses_fixed_weights() {
        // 0.7*25 + 0.2*25 + 0.1*0 = 22.5 -> 23
        assert_eq!(compose(25.0, 25.0, 0.0, &SCORE_WEIGHTS), 23);
        // 0.7*100 + 0.2*50 + 0.1*100 = 90
        assert_eq!(compose(100.0, 50.0, 100.0, &SCORE_WEIGHTS), 90);
        // 0.7*(200/3) + 0.2*0 + 0.1*(100/3) = 50
        assert_eq!(compose(200.0 / 3.0, 0.0, 100.0 / 3.0, &SCORE_WEIGHTS), 50);
    }

    #[test]
    fn test_compose_is_clamped() {
        assert_eq!(compose(150.0, 150.0, 150.0, &SCORE_WEIGHTS), 100);
        assert_eq!(compose(-10.0, 0.0, 0.0, &SCORE_WEIGHTS), 0);
    }

    #[test]
    fn test_breakdown_final_score() {
        let breakdown = ScoreBreakdown::new(100.0, 100.0, 100.0);
        assert_eq!(breakdown.final_score, 100);
    }

    #[test]
    fn test_score_bands_top_down() {
        assert_eq!(score_band(100).0, ScoreBand::Strong);
        assert_eq!(score_band(80).0, ScoreBand::Strong);
        assert_eq!(score_band(79).0, ScoreBand::Moderate);
        assert_eq!(score_band(40).0, ScoreBand::Weak);
        assert_eq!(score_band(0).0, ScoreBand::Poor);
    }
}
