use crate::scanner::extraction::{JobKeyword, JobRequirement, ResumeProfile};

/// Every job keyword, classified exactly once, in job-description order.
#[derive(Debug, Clone)]
pub struct KeywordMatch<'a> {
    pub matched: Vec<&'a JobKeyword>,
    pub missing: Vec<&'a JobKeyword>,
}

impl KeywordMatch<'_> {
    pub fn total(&self) -> usize {
        self.matched.len() + self.missing.len()
    }

    pub fn matched_names(&self) -> Vec<String> {
        self.matched.iter().map(|k| k.name.clone()).collect()
    }

    pub fn missing_names(&self) -> Vec<String> {
        self.missing.iter().map(|k| k.name.clone()).collect()
    }
}

/// Splits the job keywords into those the resume covers and those it lacks.
/// Aliases were folded into canonical keys during extraction, so a key lookup is
/// the normalized match.
pub fn match_keywords<'a>(job: &'a JobRequirement, resume: &ResumeProfile) -> KeywordMatch<'a> {
    let (matched, missing): (Vec<_>, Vec<_>) = job
        .keywords
        .iter()
        .partition(|keyword| resume.has_keyword(&keyword.key));

    KeywordMatch { matched, missing }
}
