//! Tip synthesis: decides which deficiencies deserve a tip and in what order, then
//! has them phrased.
//!
//! Selection and ordering are engine logic. Phrasing is pluggable via `TipPhraser`:
//! `LlmTipPhraser` when an API key is configured, `TemplateTipPhraser` otherwise and
//! as the fallback for every failure or timeout.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_INVENTION_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::analysis::Tip;
use crate::scanner::extraction::{JobKeyword, JobRequirement};
use crate::scanner::matching::KeywordMatch;
use crate::scanner::prompts::{TIP_PHRASING_PROMPT_TEMPLATE, TIP_PHRASING_SYSTEM_TEMPLATE};
use crate::scanner::scoring::{ScoreBand, ScoreBreakdown, WEAK_ROLE_RELEVANCE};
use crate::scanner::sections::{Section, SectionPresence};
use crate::scanner::text::truncate_chars;

/// The product always shows this many tips.
pub const MAX_TIPS: usize = 3;
/// Missing keywords named in a single tip.
const MAX_NAMED_KEYWORDS: usize = 5;
const MAX_TITLE_CHARS: usize = 80;

// ────────────────────────────────────────────────────────────────────────────
// Deficiencies
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    ResumeText,
    JobInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneralAdvice {
    KeywordDensity,
    StandardHeadings,
    QuantifiedImpact,
}

const GENERAL_ADVICE: [GeneralAdvice; 3] = [
    GeneralAdvice::KeywordDensity,
    GeneralAdvice::StandardHeadings,
    GeneralAdvice::QuantifiedImpact,
];

/// A detected gap that drives one tip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Deficiency {
    InsufficientInput { field: InputField },
    EngineFailure,
    MissingKeywords { keywords: Vec<String>, total_missing: usize },
    WeakRoleAlignment { job_title: String, relevance: u8 },
    MissingSection { section: Section },
    MissingSoftSkills { skills: Vec<String> },
    General { advice: GeneralAdvice },
}

impl Deficiency {
    /// Deficiencies about the request itself are never sent to the phraser.
    fn is_local(&self) -> bool {
        matches!(
            self,
            Deficiency::InsufficientInput { .. } | Deficiency::EngineFailure
        )
    }
}

/// Everything the phraser gets to see.
#[derive(Debug, Clone, Serialize)]
pub struct DeficiencySummary {
    pub score: u8,
    pub band: ScoreBand,
    pub band_description: &'static str,
    pub job_title: String,
    pub matched_keywords: Vec<String>,
    pub deficiencies: Vec<Deficiency>,
}

/// Picks the deficiencies worth a tip, in priority order:
/// missing technical keywords, weak role alignment, missing sections, missing soft
/// skills. Capped at [`MAX_TIPS`] and padded with general advice.
pub fn select_deficiencies(
    job: &JobRequirement,
    keywords: &KeywordMatch<'_>,
    breakdown: &ScoreBreakdown,
    sections: &SectionPresence,
) -> Vec<Deficiency> {
    let mut selected = Vec::new();

    let mut technical: Vec<&JobKeyword> = keywords
        .missing
        .iter()
        .copied()
        .filter(|k| k.category.is_technical())
        .collect();
    technical.sort_by_key(|k| !k.in_title);
    if !technical.is_empty() {
        selected.push(Deficiency::MissingKeywords {
            keywords: technical
                .iter()
                .take(MAX_NAMED_KEYWORDS)
                .map(|k| k.name.clone())
                .collect(),
            total_missing: technical.len(),
        });
    }

    if !job.title_tokens.is_empty() && breakdown.role_relevance < WEAK_ROLE_RELEVANCE {
        selected.push(Deficiency::WeakRoleAlignment {
            job_title: truncate_chars(&job.title, MAX_TITLE_CHARS).to_string(),
            relevance: breakdown.role_relevance.round() as u8,
        });
    }

    for section in sections.missing() {
        selected.push(Deficiency::MissingSection { section });
    }

    let soft: Vec<String> = keywords
        .missing
        .iter()
        .filter(|k| !k.category.is_technical())
        .take(MAX_NAMED_KEYWORDS)
        .map(|k| k.name.clone())
        .collect();
    if !soft.is_empty() {
        selected.push(Deficiency::MissingSoftSkills { skills: soft });
    }

    selected.truncate(MAX_TIPS);

    let sections_flagged = selected
        .iter()
        .any(|d| matches!(d, Deficiency::MissingSection { .. }));
    for advice in GENERAL_ADVICE {
        if selected.len() >= MAX_TIPS {
            break;
        }
        if advice == GeneralAdvice::StandardHeadings && sections_flagged {
            continue;
        }
        selected.push(Deficiency::General { advice });
    }

    selected
}

// ────────────────────────────────────────────────────────────────────────────
// Deterministic templates
// ────────────────────────────────────────────────────────────────────────────

fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// The templated tip for a deficiency. Always available, never empty.
pub fn template_tip(deficiency: &Deficiency) -> Tip {
    let (issue, why, fix) = match deficiency {
        Deficiency::InsufficientInput {
            field: InputField::ResumeText,
        } => (
            "Resume text is empty or unreadable".to_string(),
            "An ATS can only score text it can extract. An empty or image-only resume scores zero."
                .to_string(),
            "Paste your resume as plain text, or upload a text-based PDF exported from a word processor rather than a scan."
                .to_string(),
        ),
        Deficiency::InsufficientInput {
            field: InputField::JobInput,
        } => (
            "Job description or role is missing".to_string(),
            "Keywords are matched against the job requirements. Without them there is nothing to score against."
                .to_string(),
            "Paste the full job description, or at least the role title, e.g. \"Backend Engineer\"."
                .to_string(),
        ),
        Deficiency::EngineFailure => (
            "Analysis could not be completed".to_string(),
            "The scanner could not process this resume, so no keywords were scored.".to_string(),
            "Submit the resume as plain text without tables or text boxes and try again."
                .to_string(),
        ),
        Deficiency::MissingKeywords {
            keywords,
            total_missing,
        } => {
            let mut issue = format!("Missing job keywords: {}", keywords.join(", "));
            if *total_missing > keywords.len() {
                issue.push_str(&format!(" (+{} more)", total_missing - keywords.len()));
            }
            let example = join_names(&keywords[..keywords.len().min(2)]);
            (
                issue,
                "ATS filters rank resumes by exact keyword overlap with the job description. \
                 These terms never appear in your resume, and keyword match is 70% of the score."
                    .to_string(),
                format!(
                    "If you have this experience, list {} verbatim in your Skills section and name them in the bullet where you used them, e.g. \"Built and deployed services using {}.\"",
                    join_names(keywords),
                    example
                ),
            )
        }
        Deficiency::WeakRoleAlignment {
            job_title,
            relevance,
        } => (
            format!("Resume headline does not reflect the \"{job_title}\" role"),
            format!(
                "ATS ranks candidates higher when the target job title appears near the top of the resume. \
                 Only {relevance}% of the title's terms were found in your header or summary."
            ),
            format!(
                "Add a one-line headline under your name that mirrors the posting, e.g. \"{job_title}\", and open your summary with the same terms."
            ),
        ),
        Deficiency::MissingSection { section } => {
            let heading = section.heading();
            let fix = match section {
                Section::Skills => "Add a \"Skills\" heading listing your tools, languages and frameworks as comma-separated keywords, e.g. \"Skills: Python, Docker, PostgreSQL\".".to_string(),
                Section::Experience => "Add an \"Experience\" heading with each role as \"Job Title, Company, Dates\" followed by achievement bullets.".to_string(),
                Section::Projects => "Add a \"Projects\" heading with two or three projects, each naming the technologies used, e.g. \"Inventory API (FastAPI, PostgreSQL, Docker)\".".to_string(),
                other => format!("Add a \"{}\" heading on its own line.", other.heading()),
            };
            (
                format!("No \"{heading}\" section detected"),
                format!(
                    "ATS parsers map resume content by standard headings. Without a recognizable \"{heading}\" heading, that content may be misfiled or ignored."
                ),
                fix,
            )
        }
        Deficiency::MissingSoftSkills { skills } => (
            format!("Soft skills from the posting are missing: {}", skills.join(", ")),
            "Many ATS configurations also score soft-skill terms named in the posting, usually as a tie-breaker between similar candidates."
                .to_string(),
            format!(
                "Work {} into experience bullets with a concrete outcome, e.g. \"Mentored two junior engineers through their first production release.\"",
                join_names(skills)
            ),
        ),
        Deficiency::General {
            advice: GeneralAdvice::KeywordDensity,
        } => (
            "Review keyword density".to_string(),
            "ATS systems rank resumes by keyword frequency as well as presence.".to_string(),
            "Make sure the key skills from the job description appear more than once, naturally, in both your Skills section and your experience bullets."
                .to_string(),
        ),
        Deficiency::General {
            advice: GeneralAdvice::StandardHeadings,
        } => (
            "Keep standard section headings".to_string(),
            "Creative headings such as \"What I've Built\" are often not recognized by ATS parsers."
                .to_string(),
            "Use plain headings on their own lines: Summary, Skills, Experience, Projects, Education."
                .to_string(),
        ),
        Deficiency::General {
            advice: GeneralAdvice::QuantifiedImpact,
        } => (
            "Quantify your impact".to_string(),
            "Recruiters reviewing an ATS shortlist favor measurable outcomes, and some ATS rank bullets with metrics higher."
                .to_string(),
            "Add numbers to your strongest bullets, e.g. \"Reduced API latency by 40% by introducing Redis caching.\""
                .to_string(),
        ),
    };

    Tip { issue, why, fix }
}

// ────────────────────────────────────────────────────────────────────────────
// Phrasing capability
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TipError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("phraser returned no tips")]
    Empty,
}

/// Turns a deficiency summary into `{issue, why, fix}` tips, one per deficiency in
/// the same order. Carried in `AppState` as `Arc<dyn TipPhraser>`.
#[async_trait]
pub trait TipPhraser: Send + Sync {
    /// Short label for logs and the health endpoint.
    fn backend(&self) -> &'static str;

    async fn phrase(&self, summary: &DeficiencySummary) -> Result<Vec<Tip>, TipError>;
}

/// Deterministic phrasing from fixed templates.
pub struct TemplateTipPhraser;

#[async_trait]
impl TipPhraser for TemplateTipPhraser {
    fn backend(&self) -> &'static str {
        "template"
    }

    async fn phrase(&self, summary: &DeficiencySummary) -> Result<Vec<Tip>, TipError> {
        Ok(summary.deficiencies.iter().map(template_tip).collect())
    }
}

#[derive(Debug, Deserialize)]
struct PhrasedTips {
    tips: Vec<Tip>,
}

/// Phrasing via Claude.
pub struct LlmTipPhraser(pub LlmClient);

impl LlmTipPhraser {
    fn build_prompt(summary: &DeficiencySummary) -> Result<String, TipError> {
        let summary_json = serde_json::to_string_pretty(summary).map_err(LlmError::Parse)?;
        Ok(TIP_PHRASING_PROMPT_TEMPLATE
            .replace("{no_invention}", NO_INVENTION_INSTRUCTION)
            .replace("{tip_count}", &summary.deficiencies.len().to_string())
            .replace("{summary_json}", &summary_json))
    }
}

#[async_trait]
impl TipPhraser for LlmTipPhraser {
    fn backend(&self) -> &'static str {
        "llm"
    }

    async fn phrase(&self, summary: &DeficiencySummary) -> Result<Vec<Tip>, TipError> {
        let prompt = Self::build_prompt(summary)?;
        let system = TIP_PHRASING_SYSTEM_TEMPLATE.replace("{json_only}", JSON_ONLY_SYSTEM);
        let phrased: PhrasedTips = self.0.call_json(&prompt, &system).await?;
        if phrased.tips.is_empty() {
            return Err(TipError::Empty);
        }
        Ok(phrased.tips)
    }
}

/// Phrases the summary's deficiencies, bounded by `timeout`. Any failure, timeout or
/// missing tip falls back to the template for that deficiency.
pub async fn phrase_tips(
    phraser: &dyn TipPhraser,
    summary: &DeficiencySummary,
    timeout: Duration,
) -> Vec<Tip> {
    let templates = || -> Vec<Tip> { summary.deficiencies.iter().map(template_tip).collect() };

    if summary.deficiencies.iter().any(Deficiency::is_local) {
        return templates();
    }

    match tokio::time::timeout(timeout, phraser.phrase(summary)).await {
        Ok(Ok(phrased)) if !phrased.is_empty() => {
            merge_with_templates(&summary.deficiencies, phrased)
        }
        Ok(Ok(_)) => {
            warn!(backend = phraser.backend(), "Tip phraser returned no tips, using templates");
            templates()
        }
        Ok(Err(e)) => {
            warn!(backend = phraser.backend(), "Tip phrasing failed, using templates: {e}");
            templates()
        }
        Err(_) => {
            warn!(
                backend = phraser.backend(),
                timeout_ms = timeout.as_millis() as u64,
                "Tip phrasing timed out, using templates"
            );
            templates()
        }
    }
}

fn merge_with_templates(deficiencies: &[Deficiency], phrased: Vec<Tip>) -> Vec<Tip> {
    let mut phrased = phrased.into_iter();
    deficiencies
        .iter()
        .map(|deficiency| {
            let fallback = template_tip(deficiency);
            match phrased.next() {
                Some(tip) => Tip {
                    issue: non_blank_or(tip.issue, fallback.issue),
                    why: non_blank_or(tip.why, fallback.why),
                    fix: non_blank_or(tip.fix, fallback.fix),
                },
                None => fallback,
            }
        })
        .collect()
}

fn non_blank_or(value: String, fallback: String) -> String {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::scanner::extraction::JobInputKind;
    use crate::scanner::vocabulary::Category;

    fn keyword(name: &str, category: Category, in_title: bool) -> JobKeyword {
        JobKeyword {
            key: name.to_lowercase(),
            name: name.to_string(),
            category,
            in_title,
        }
    }

    fn job(title: &str, keywords: Vec<JobKeyword>) -> JobRequirement {
        JobRequirement {
            kind: JobInputKind::Description,
            title: title.to_string(),
            title_tokens: crate::scanner::text::content_tokens(title),
            keywords,
        }
    }

    fn all_sections() -> SectionPresence {
        SectionPresence {
            skills: true,
            experience: true,
            projects: true,
        }
    }

    fn summary(deficiencies: Vec<Deficiency>) -> DeficiencySummary {
        DeficiencySummary {
            score: 40,
            band: ScoreBand::Weak,
            band_description: "weak",
            job_title: "Backend Engineer".to_string(),
            matched_keywords: vec![],
            deficiencies,
        }
    }

    #[test]
    fn test_priority_order_and_cap() {
        let job = job(
            "Backend Engineer",
            vec![
                keyword("Docker", Category::Tool, false),
                keyword("Leadership", Category::SoftSkill, false),
                keyword("Go", Category::Language, true),
            ],
        );
        let km = KeywordMatch {
            matched: vec![],
            missing: job.keywords.iter().collect(),
        };
        let breakdown = ScoreBreakdown::new(0.0, 0.0, 0.0);
        let selected = select_deficiencies(&job, &km, &breakdown, &SectionPresence::default());

        assert_eq!(selected.len(), MAX_TIPS);
        assert_eq!(
            selected[0],
            Deficiency::MissingKeywords {
                keywords: vec!["Go".to_string(), "Docker".to_string()],
                total_missing: 2,
            }
        );
        assert!(matches!(selected[1], Deficiency::WeakRoleAlignment { relevance: 0, .. }));
        assert_eq!(
            selected[2],
            Deficiency::MissingSection {
                section: Section::Skills
            }
        );
    }

    #[test]
    fn test_strong_resume_is_padded_with_general_advice() {
        let job = job("Backend Engineer", vec![keyword("Go", Category::Language, false)]);
        let km = KeywordMatch {
            matched: job.keywords.iter().collect(),
            missing: vec![],
        };
        let breakdown = ScoreBreakdown::new(100.0, 100.0, 100.0);
        let selected = select_deficiencies(&job, &km, &breakdown, &all_sections());

        assert_eq!(
            selected,
            vec![
                Deficiency::General {
                    advice: GeneralAdvice::KeywordDensity
                },
                Deficiency::General {
                    advice: GeneralAdvice::StandardHeadings
                },
                Deficiency::General {
                    advice: GeneralAdvice::QuantifiedImpact
                },
            ]
        );
    }

    #[test]
    fn test_heading_advice_skipped_when_a_section_tip_exists() {
        let job = job("Backend Engineer", vec![]);
        let km = KeywordMatch {
            matched: vec![],
            missing: vec![],
        };
        let breakdown = ScoreBreakdown::new(100.0, 100.0, 66.0);
        let sections = SectionPresence {
            skills: true,
            experience: true,
            projects: false,
        };
        let selected = select_deficiencies(&job, &km, &breakdown, &sections);

        assert_eq!(selected.len(), MAX_TIPS);
        assert!(!selected.contains(&Deficiency::General {
            advice: GeneralAdvice::StandardHeadings
        }));
    }

    #[test]
    fn test_missing_keyword_count_reports_overflow() {
        let tip = template_tip(&Deficiency::MissingKeywords {
            keywords: vec!["Go".to_string(), "Docker".to_string()],
            total_missing: 7,
        });
        assert!(tip.issue.contains("Go, Docker"));
        assert!(tip.issue.contains("+5 more"));
        assert!(tip.fix.contains("Go and Docker"));
    }

    #[test]
    fn test_every_template_is_complete() {
        let all = vec![
            Deficiency::InsufficientInput {
                field: InputField::ResumeText,
            },
            Deficiency::InsufficientInput {
                field: InputField::JobInput,
            },
            Deficiency::EngineFailure,
            Deficiency::MissingKeywords {
                keywords: vec!["Rust".to_string()],
                total_missing: 1,
            },
            Deficiency::WeakRoleAlignment {
                job_title: "SRE".to_string(),
                relevance: 0,
            },
            Deficiency::MissingSection {
                section: Section::Projects,
            },
            Deficiency::MissingSoftSkills {
                skills: vec!["Leadership".to_string()],
            },
            Deficiency::General {
                advice: GeneralAdvice::QuantifiedImpact,
            },
        ];
        for deficiency in &all {
            let tip = template_tip(deficiency);
            assert!(!tip.issue.is_empty() && !tip.why.is_empty() && !tip.fix.is_empty());
        }
    }

    #[test]
    fn test_deficiency_serializes_with_kind_tag() {
        let value = serde_json::to_value(Deficiency::MissingSection {
            section: Section::Skills,
        })
        .unwrap();
        assert_eq!(value["kind"], "missing_section");
        assert_eq!(value["section"], "skills");
    }

    #[test]
    fn test_prompt_includes_summary_and_count() {
        let summary = summary(vec![Deficiency::MissingKeywords {
            keywords: vec!["Kubernetes".to_string()],
            total_missing: 1,
        }]);
        let prompt = LlmTipPhraser::build_prompt(&summary).unwrap();
        assert!(prompt.contains("Kubernetes"));
        assert!(prompt.contains("Write exactly 1 tips"));
        assert!(!prompt.contains("{summary_json}"));
    }

    struct FailingPhraser;

    #[async_trait]
    impl TipPhraser for FailingPhraser {
        fn backend(&self) -> &'static str {
            "failing"
        }

        async fn phrase(&self, _summary: &DeficiencySummary) -> Result<Vec<Tip>, TipError> {
            Err(TipError::Empty)
        }
    }

    struct SlowPhraser;

    #[async_trait]
    impl TipPhraser for SlowPhraser {
        fn backend(&self) -> &'static str {
            "slow"
        }

        async fn phrase(&self, summary: &DeficiencySummary) -> Result<Vec<Tip>, TipError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            TemplateTipPhraser.phrase(summary).await
        }
    }

    /// Returns one partially blank tip and counts its calls.
    struct PartialPhraser(AtomicUsize);

    #[async_trait]
    impl TipPhraser for PartialPhraser {
        fn backend(&self) -> &'static str {
            "partial"
        }

        async fn phrase(&self, _summary: &DeficiencySummary) -> Result<Vec<Tip>, TipError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Tip {
                issue: "Add Kubernetes".to_string(),
                why: "  ".to_string(),
                fix: "Skills: Kubernetes".to_string(),
            }])
        }
    }

    fn two_deficiencies() -> Vec<Deficiency> {
        vec![
            Deficiency::MissingKeywords {
                keywords: vec!["Kubernetes".to_string()],
                total_missing: 1,
            },
            Deficiency::MissingSection {
                section: Section::Projects,
            },
        ]
    }

    #[tokio::test]
    async fn test_phraser_error_falls_back_to_templates() {
        let summary = summary(two_deficiencies());
        let tips = phrase_tips(&FailingPhraser, &summary, Duration::from_secs(1)).await;
        let expected: Vec<Tip> = summary.deficiencies.iter().map(template_tip).collect();
        assert_eq!(tips, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_phraser_timeout_falls_back_to_templates() {
        let summary = summary(two_deficiencies());
        let tips = phrase_tips(&SlowPhraser, &summary, Duration::from_millis(500)).await;
        assert_eq!(tips.len(), 2);
        assert_eq!(tips[1], template_tip(&summary.deficiencies[1]));
    }

    #[tokio::test]
    async fn test_partial_phrasing_is_completed_from_templates() {
        let summary = summary(two_deficiencies());
        let phraser = PartialPhraser(AtomicUsize::new(0));
        let tips = phrase_tips(&phraser, &summary, Duration::from_secs(1)).await;

        assert_eq!(tips.len(), 2);
        assert_eq!(tips[0].issue, "Add Kubernetes");
        assert_eq!(tips[0].why, template_tip(&summary.deficiencies[0]).why);
        assert_eq!(tips[1], template_tip(&summary.deficiencies[1]));
    }

    #[tokio::test]
    async fn test_local_deficiencies_never_reach_the_phraser() {
        let summary = summary(vec![Deficiency::InsufficientInput {
            field: InputField::JobInput,
        }]);
        let phraser = PartialPhraser(AtomicUsize::new(0));
        let tips = phrase_tips(&phraser, &summary, Duration::from_secs(1)).await;

        assert_eq!(phraser.0.load(Ordering::SeqCst), 0);
        assert_eq!(tips[0].issue, "Job description or role is missing");
    }
}
