//! The scoring engine: `(resume_text, job_input) -> AnalysisResult`.
//!
//! Pipeline: extraction → matching → weighted score → deficiency selection → tip
//! phrasing. Everything up to deficiency selection is synchronous and pure. Only
//! phrasing awaits, and it is bounded by a timeout with a template fallback.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::analysis::AnalysisResult;
use crate::scanner::extraction::{JobRequirement, ResumeProfile};
use crate::scanner::matching::match_keywords;
use crate::scanner::scoring::{
    keyword_match_score, role_relevance_score, score_band, structure_score, ScoreBand,
    ScoreBreakdown,
};
use crate::scanner::sections::SectionDetector;
use crate::scanner::text::{tokenize, truncate_chars};
use crate::scanner::tips::{
    phrase_tips, select_deficiencies, Deficiency, DeficiencySummary, InputField, TipPhraser,
};
use crate::scanner::vocabulary::Vocabulary;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid section pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("scoring failed: {0}")]
    Internal(String),
}

/// Everything the engine decided about one resume/job pair, before phrasing.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub score: u8,
    pub band: ScoreBand,
    pub band_description: &'static str,
    /// `None` when the resume was insufficient or scoring failed.
    pub breakdown: Option<ScoreBreakdown>,
    pub job_title: String,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub deficiencies: Vec<Deficiency>,
}

impl ScoreReport {
    fn zero(job_title: String, missing_keywords: Vec<String>, deficiency: Deficiency) -> Self {
        let (band, band_description) = score_band(0);
        Self {
            score: 0,
            band,
            band_description,
            breakdown: None,
            job_title,
            matched_keywords: Vec::new(),
            missing_keywords,
            deficiencies: vec![deficiency],
        }
    }

    fn failed() -> Self {
        Self::zero(String::new(), Vec::new(), Deficiency::EngineFailure)
    }

    pub fn deficiency_summary(&self) -> DeficiencySummary {
        DeficiencySummary {
            score: self.score,
            band: self.band,
            band_description: self.band_description,
            job_title: self.job_title.clone(),
            matched_keywords: self.matched_keywords.clone(),
            deficiencies: self.deficiencies.clone(),
        }
    }
}

/// Built once at startup and shared behind `Arc`; holds no mutable state.
#[derive(Debug)]
pub struct ScoringEngine {
    vocabulary: Vocabulary,
    sections: SectionDetector,
    max_input_chars: usize,
}

impl ScoringEngine {
    pub fn new(vocabulary: Vocabulary, max_input_chars: usize) -> Result<Self, EngineError> {
        Ok(Self {
            vocabulary,
            sections: SectionDetector::new()?,
            max_input_chars,
        })
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Scores a resume against a job. Never fails: internal errors become a bounded
    /// zero-score report.
    pub fn score(&self, resume_text: &str, job_input: &str) -> ScoreReport {
        match self.evaluate(resume_text, job_input) {
            Ok(report) => report,
            Err(e) => {
                error!("Resume scoring failed: {e}");
                ScoreReport::failed()
            }
        }
    }

    fn evaluate(&self, resume_text: &str, job_input: &str) -> Result<ScoreReport, EngineError> {
        catch_unwind(AssertUnwindSafe(|| self.score_inner(resume_text, job_input))).map_err(
            |panic| {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                EngineError::Internal(message)
            },
        )
    }

    fn score_inner(&self, resume_text: &str, job_input: &str) -> ScoreReport {
        let resume_text = self.bounded(resume_text, "resume_text");
        let job_input = self.bounded(job_input, "job_input");

        if !has_tokens(job_input) {
            let mut report = ScoreReport::zero(
                String::new(),
                Vec::new(),
                Deficiency::InsufficientInput {
                    field: InputField::JobInput,
                },
            );
            // No job keywords is a vacuous full match; the final score stays at the sentinel.
            report.breakdown = Some(ScoreBreakdown {
                keyword_match: 100.0,
                role_relevance: 0.0,
                structure: structure_score(&self.sections.outline(resume_text).presence()),
                final_score: 0,
            });
            return report;
        }

        let job = JobRequirement::extract(job_input, &self.vocabulary);

        if !has_tokens(resume_text) {
            return ScoreReport::zero(
                job.title.clone(),
                job.keywords.iter().map(|k| k.name.clone()).collect(),
                Deficiency::InsufficientInput {
                    field: InputField::ResumeText,
                },
            );
        }

        let resume = ResumeProfile::extract(resume_text, &self.vocabulary, &self.sections);
        let keywords = match_keywords(&job, &resume);

        let breakdown = ScoreBreakdown::new(
            keyword_match_score(keywords.matched.len(), keywords.total()),
            role_relevance_score(&job.title_tokens, &resume.role_tokens),
            structure_score(&resume.sections),
        );
        let (band, band_description) = score_band(breakdown.final_score);
        let deficiencies = select_deficiencies(&job, &keywords, &breakdown, &resume.sections);

        ScoreReport {
            score: breakdown.final_score,
            band,
            band_description,
            breakdown: Some(breakdown),
            job_title: job.title.clone(),
            matched_keywords: keywords.matched_names(),
            missing_keywords: keywords.missing_names(),
            deficiencies,
        }
    }

    fn bounded<'a>(&self, text: &'a str, field: &str) -> &'a str {
        let bounded = truncate_chars(text, self.max_input_chars);
        if bounded.len() < text.len() {
            warn!(
                field,
                max_chars = self.max_input_chars,
                "Input truncated before scoring"
            );
        }
        bounded
    }

    /// Full analysis: score, then phrase tips for the selected deficiencies.
    pub async fn analyze(
        &self,
        resume_text: &str,
        job_input: &str,
        phraser: &dyn TipPhraser,
        tip_timeout: Duration,
    ) -> AnalysisResult {
        let report = self.score(resume_text, job_input);
        let tips = phrase_tips(phraser, &report.deficiency_summary(), tip_timeout).await;

        info!(
            score = report.score,
            band = ?report.band,
            matched = report.matched_keywords.len(),
            missing = report.missing_keywords.len(),
            tips = tips.len(),
            tip_backend = phraser.backend(),
            "Resume analyzed"
        );

        AnalysisResult {
            score: report.score,
            matched_keywords: report.matched_keywords,
            missing_keywords: report.missing_keywords,
            tips,
        }
    }
}

fn has_tokens(text: &str) -> bool {
    !text.trim().is_empty() && !tokenize(text).is_empty()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::scanner::tips::{TemplateTipPhraser, MAX_TIPS};

    const REFERENCE_RESUME: &str = "Python, AWS Lambda, Terraform, FastAPI";
    const REFERENCE_JOB: &str = "Python, Go, Docker, Kubernetes";

    const FULL_RESUME: &str = "Jane Doe\n\
        Frontend Developer\n\
        \n\
        Skills: React, TypeScript, JavaScript, HTML, CSS, Python, SQL\n\
        \n\
        Experience\n\
        - Built dashboards in React and TypeScript for 20k users\n\
        \n\
        Projects\n\
        - Sales forecast notebook in Python with Pandas";

    fn engine() -> ScoringEngine {
        ScoringEngine::new(Vocabulary::builtin(), 50_000).unwrap()
    }

    fn assert_partition(engine: &ScoringEngine, resume: &str, job: &str) {
        let report = engine.score(resume, job);
        let expected = JobRequirement::extract(job, engine.vocabulary()).keywords.len();

        let matched: HashSet<_> = report.matched_keywords.iter().collect();
        let missing: HashSet<_> = report.missing_keywords.iter().collect();
        assert_eq!(matched.len(), report.matched_keywords.len(), "duplicate matched");
        assert_eq!(missing.len(), report.missing_keywords.len(), "duplicate missing");
        assert!(matched.is_disjoint(&missing));
        assert_eq!(matched.len() + missing.len(), expected);
        assert!(report.score <= 100);
    }

    #[test]
    fn test_reference_example() {
        let report = engine().score(REFERENCE_RESUME, REFERENCE_JOB);
        let breakdown = report.breakdown.unwrap();

        assert_eq!(report.matched_keywords, vec!["Python"]);
        assert_eq!(report.missing_keywords, vec!["Go", "Docker", "Kubernetes"]);
        assert_eq!(breakdown.keyword_match, 25.0);
        assert_eq!(breakdown.role_relevance, 25.0);
        assert_eq!(breakdown.structure, 0.0);
        assert_eq!(report.score, 23);
    }

    #[test]
    fn test_matched_and_missing_partition_job_keywords() {
        let engine = engine();
        let jobs = [
            REFERENCE_JOB,
            "Senior Backend Engineer\nWe need Go, PostgreSQL, Docker and k8s. Strong communication.",
            "DevOps Engineer",
            "Data Scientist",
            "Title: Frontend Developer\nReact, TypeScript, React, CSS, teamwork",
        ];
        for job in jobs {
            assert_partition(&engine, FULL_RESUME, job);
            assert_partition(&engine, REFERENCE_RESUME, job);
        }
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let engine = engine();
        let job = "Backend Engineer\nPython, Django, PostgreSQL, Docker, AWS, leadership";
        let first = engine.score(FULL_RESUME, job);
        for _ in 0..5 {
            let again = engine.score(FULL_RESUME, job);
            assert_eq!(again.score, first.score);
            assert_eq!(again.matched_keywords, first.matched_keywords);
            assert_eq!(again.missing_keywords, first.missing_keywords);
            assert_eq!(again.deficiencies, first.deficiencies);
        }
    }

    #[test]
    fn test_job_without_vocabulary_terms_is_vacuously_matched() {
        let report = engine().score(FULL_RESUME, "Barista\nMust enjoy coffee and early mornings.");
        assert!(report.matched_keywords.is_empty());
        assert!(report.missing_keywords.is_empty());
        assert_eq!(report.breakdown.unwrap().keyword_match, 100.0);
    }

    #[test]
    fn test_blank_job_input_returns_sentinel() {
        let report = engine().score(FULL_RESUME, "   \n\t ");
        assert_eq!(report.score, 0);
        let breakdown = report.breakdown.unwrap();
        assert_eq!(breakdown.keyword_match, 100.0);
        assert_eq!(breakdown.role_relevance, 0.0);
        assert_eq!(breakdown.structure, 100.0);
        assert_eq!(breakdown.final_score, 0);
        assert!(report.matched_keywords.is_empty() && report.missing_keywords.is_empty());
        assert_eq!(
            report.deficiencies,
            vec![Deficiency::InsufficientInput {
                field: InputField::JobInput
            }]
        );
    }

    #[test]
    fn test_empty_job_input_is_a_vacuous_keyword_match() {
        let report = engine().score("Skills\nPython", "");
        assert_eq!(report.score, 0);
        assert_eq!(report.breakdown.unwrap().keyword_match, 100.0);
        assert_eq!(report.deficiencies.len(), 1);
    }

    #[test]
    fn test_hiring_sentence_supplies_the_role_after_posting_boilerplate() {
        let job = "About the job\nWe are hiring a Backend Engineer.\nYou will own our Python services.";
        let report = engine().score("Jane Doe\nBackend Engineer\nSkills\nPython", job);

        assert_eq!(report.job_title, "Backend Engineer");
        assert_eq!(report.breakdown.unwrap().role_relevance, 100.0);
        assert!(!report
            .deficiencies
            .iter()
            .any(|d| matches!(d, Deficiency::WeakRoleAlignment { .. })));
    }

    #[test]
    fn test_sentences_and_labelled_details_do_not_count_as_sections() {
        let engine = engine();
        let prose = engine.score(
            "Jane Doe\nBackend Engineer\nExperience and leadership in teams\nSkills and tools I use daily",
            REFERENCE_JOB,
        );
        assert_eq!(prose.breakdown.unwrap().structure, 0.0);

        let projects = engine.score(
            "Jane Doe\nProjects\nInventory API\nTechnologies: Python, Docker\nExperience\nAcme",
            REFERENCE_JOB,
        );
        let structure = projects.breakdown.unwrap().structure;
        assert!((structure - 200.0 / 3.0).abs() < 1e-9, "{structure}");
    }

    #[test]
    fn test_all_caps_job_terms_and_ellipsis_tokens_are_matched() {
        let report = engine().score(
            "...Python, Docker",
            "Data Platform Role\nREQUIREMENTS: GO, DOCKER, PYTHON, SPARK",
        );
        let has = |list: &[String], name: &str| list.iter().any(|k| k == name);
        assert!(has(&report.matched_keywords, "Python"), "{report:?}");
        assert!(has(&report.matched_keywords, "Docker"));
        assert!(has(&report.missing_keywords, "Go"));
        assert!(has(&report.missing_keywords, "Spark"));
    }

    #[test]
    fn test_blank_resume_reports_every_job_keyword_missing() {
        let report = engine().score("", REFERENCE_JOB);
        assert_eq!(report.score, 0);
        assert!(report.matched_keywords.is_empty());
        assert_eq!(
            report.missing_keywords,
            vec!["Python", "Go", "Docker", "Kubernetes"]
        );
        assert_eq!(
            report.deficiencies,
            vec![Deficiency::InsufficientInput {
                field: InputField::ResumeText
            }]
        );
    }

    #[test]
    fn test_punctuation_only_resume_is_insufficient() {
        let report = engine().score("--- ... ***", REFERENCE_JOB);
        assert_eq!(report.score, 0);
        assert!(report.breakdown.is_none());
    }

    #[test]
    fn test_resume_without_headings_has_zero_structure() {
        let report = engine().score(
            "Python developer with Docker and Kubernetes experience.",
            REFERENCE_JOB,
        );
        assert_eq!(report.breakdown.unwrap().structure, 0.0);
    }

    #[test]
    fn test_structured_resume_scores_full_structure() {
        let report = engine().score(FULL_RESUME, "Frontend Developer");
        let breakdown = report.breakdown.unwrap();
        assert_eq!(breakdown.structure, 100.0);
        assert_eq!(breakdown.role_relevance, 100.0);
    }

    #[test]
    fn test_changing_role_changes_classification() {
        let engine = engine();
        let frontend = engine.score(FULL_RESUME, "Frontend Developer");
        let data = engine.score(FULL_RESUME, "Data Scientist");

        assert!(frontend.matched_keywords.contains(&"React".to_string()));
        assert!(!data.matched_keywords.contains(&"React".to_string()));
        assert_ne!(frontend.matched_keywords, data.matched_keywords);
        assert_ne!(frontend.missing_keywords, data.missing_keywords);
    }

    #[test]
    fn test_input_is_truncated_before_scoring() {
        let engine = ScoringEngine::new(Vocabulary::builtin(), 40).unwrap();
        let resume = format!("Python {} Kubernetes", "filler ".repeat(20));
        let report = engine.score(&resume, REFERENCE_JOB);

        assert_eq!(report.matched_keywords, vec!["Python"]);
        assert!(report.missing_keywords.contains(&"Kubernetes".to_string()));
    }

    #[test]
    fn test_deficiencies_never_exceed_tip_limit() {
        let report = engine().score(
            "Some text",
            "Backend Engineer\nGo, Rust, Kafka, Redis, gRPC, Kubernetes, leadership",
        );
        assert_eq!(report.deficiencies.len(), MAX_TIPS);
        assert!(matches!(
            report.deficiencies[0],
            Deficiency::MissingKeywords { .. }
        ));
    }

    #[tokio::test]
    async fn test_analyze_with_template_phraser() {
        let result = engine()
            .analyze(
                REFERENCE_RESUME,
                REFERENCE_JOB,
                &TemplateTipPhraser,
                Duration::from_secs(1),
            )
            .await;

        assert_eq!(result.score, 23);
        assert_eq!(result.matched_keywords, vec!["Python"]);
        assert_eq!(result.tips.len(), MAX_TIPS);
        assert!(result.tips[0].issue.contains("Go"));
    }

    #[tokio::test]
    async fn test_analyze_insufficient_input_returns_single_tip() {
        let result = engine()
            .analyze("", "", &TemplateTipPhraser, Duration::from_secs(1))
            .await;

        assert_eq!(result.score, 0);
        assert_eq!(result.tips.len(), 1);
    }
}
