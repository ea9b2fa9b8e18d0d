//! Keyword extraction for both sides of an analysis: the job requirement and the
//! resume profile.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::scanner::sections::{Section, SectionDetector, SectionPresence};
use crate::scanner::text::{content_tokens, normalize, tokenize};
use crate::scanner::vocabulary::{Category, Vocabulary, GENERIC_ENGINEERING_PROFILE, ROLE_PROFILES};

/// Inputs at or under this many tokens on a single line are treated as a role title.
const ROLE_TITLE_MAX_TOKENS: usize = 8;
/// Cap on job title tokens used for role relevance.
const TITLE_MAX_TOKENS: usize = 12;
/// Cap on resume header lines considered as the stated title.
const HEADER_MAX_LINES: usize = 5;

const TITLE_LABELS: &[&str] = &["job title", "title", "role", "position"];
/// Lines searched for the job title before falling back to the first long one.
const TITLE_SCAN_LINES: usize = 5;
const HIRING_TITLE_MAX_TOKENS: usize = 6;

const BOILERPLATE_LINES: &[&str] = &[
    "about the job", "about the role", "about the position", "about the company", "about us",
    "about", "job description", "description", "overview", "job overview", "role overview",
    "the role", "the opportunity", "position summary", "job summary", "summary", "who we are",
    "company description", "responsibilities", "requirements", "qualifications",
];
const HIRING_CUES: &[&str] = &["hiring", "seeking", "recruiting"];
const TITLE_ARTICLES: &[&str] = &["a", "an", "the", "our", "new"];
/// Words that end a role phrase after a hiring cue.
const TITLE_BREAKS: &[&str] = &[
    "to", "who", "with", "in", "at", "for", "that", "based", "on", "and", "join", "you", "this",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobInputKind {
    /// A pasted job description.
    Description,
    /// A short role title such as "Senior DevOps Engineer".
    RoleTitle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobKeyword {
    pub key: String,
    pub name: String,
    pub category: Category,
    /// Whether the keyword appears in the job title line.
    pub in_title: bool,
}

/// Keywords and title signals extracted from the job input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequirement {
    pub kind: JobInputKind,
    pub title: String,
    pub title_tokens: Vec<String>,
    pub keywords: Vec<JobKeyword>,
}

impl JobRequirement {
    pub fn extract(job_input: &str, vocabulary: &Vocabulary) -> Self {
        let title = job_title(job_input);
        let title_tokens: Vec<String> = content_tokens(&title)
            .into_iter()
            .take(TITLE_MAX_TOKENS)
            .collect();
        let kind = classify(job_input);

        let title_ids = vocabulary.scan(&tokenize(&title));
        let mut ids = vocabulary.scan(&tokenize(job_input));

        if kind == JobInputKind::RoleTitle {
            for id in role_profile_terms(&title_tokens, vocabulary) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }

        let keywords = ids
            .into_iter()
            .map(|id| {
                let term = vocabulary.term(id);
                JobKeyword {
                    key: term.key.clone(),
                    name: term.name.clone(),
                    category: term.category,
                    in_title: title_ids.contains(&id),
                }
            })
            .collect();

        Self {
            kind,
            title,
            title_tokens,
            keywords,
        }
    }
}

fn classify(job_input: &str) -> JobInputKind {
    let mut lines = job_input.lines().filter(|l| !l.trim().is_empty());
    let first = lines.next();
    let single_line = lines.next().is_none();

    match first {
        Some(line) if single_line && tokenize(line).len() <= ROLE_TITLE_MAX_TOKENS => {
            JobInputKind::RoleTitle
        }
        _ => JobInputKind::Description,
    }
}

/// The job title: the first early line that reads like a title, with a
/// "Title:"-style label removed. Boilerplate lines ("About the job") and bare
/// headings are skipped, and a "we are hiring a X" sentence yields X.
fn job_title(job_input: &str) -> String {
    let candidates = job_input
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(TITLE_SCAN_LINES)
        .map(strip_title_label)
        .filter(|l| !l.is_empty() && !is_boilerplate_line(l));

    let mut fallback = None;
    for line in candidates {
        if let Some(title) = hiring_phrase(line) {
            return title;
        }
        if tokenize(line).len() <= ROLE_TITLE_MAX_TOKENS {
            return line.to_string();
        }
        fallback.get_or_insert(line);
    }

    fallback.unwrap_or_default().to_string()
}

fn strip_title_label(line: &str) -> &str {
    for label in TITLE_LABELS {
        let Some(head) = line.get(..label.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(label) {
            continue;
        }
        let rest = line[label.len()..].trim_start();
        if rest.starts_with([':', '-', '–']) {
            return rest.trim_start_matches([':', '-', '–']).trim();
        }
    }
    line
}

/// Section headings and posting chrome that never name the role.
fn is_boilerplate_line(line: &str) -> bool {
    line.ends_with(':') || BOILERPLATE_LINES.contains(&normalize(line).as_str())
}

/// The role named after a hiring cue: "We are hiring a Backend Engineer to ..."
fn hiring_phrase(line: &str) -> Option<String> {
    let clauses = line
        .split(". ")
        .flat_map(|clause| clause.split(['!', '?', ';', ',', '(', ')']));

    for clause in clauses {
        let tokens = tokenize(clause);
        let cue = (0..tokens.len()).find(|&i| {
            HIRING_CUES.contains(&tokens[i].norm.as_str())
                || (tokens[i].norm == "for" && i > 0 && tokens[i - 1].norm == "looking")
        });
        let Some(cue) = cue else {
            continue;
        };

        let title: Vec<&str> = tokens[cue + 1..]
            .iter()
            .skip_while(|t| TITLE_ARTICLES.contains(&t.norm.as_str()))
            .take_while(|t| !TITLE_BREAKS.contains(&t.norm.as_str()))
            .take(HIRING_TITLE_MAX_TOKENS)
            .map(|t| t.raw.as_str())
            .collect();
        if !title.is_empty() {
            return Some(title.join(" "));
        }
    }
    None
}

/// Profile keywords implied by the title. Specific profiles first; the generic
/// engineering profile only when none of them matched.
fn role_profile_terms(title_tokens: &[String], vocabulary: &Vocabulary) -> Vec<usize> {
    let mut matched: Vec<_> = ROLE_PROFILES
        .iter()
        .filter(|profile| profile.matches(title_tokens))
        .collect();
    if matched.is_empty() && GENERIC_ENGINEERING_PROFILE.matches(title_tokens) {
        matched.push(&GENERIC_ENGINEERING_PROFILE);
    }

    let mut ids = Vec::new();
    for profile in matched {
        for name in profile.keywords {
            if let Some(id) = vocabulary.find(name) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
    }
    ids
}

/// Keywords, section flags and headline tokens extracted from resume text.
#[derive(Debug, Clone)]
pub struct ResumeProfile {
    /// Keyword keys in first-seen order, implied parents included.
    pub keywords: Vec<String>,
    keyword_set: HashSet<String>,
    pub sections: SectionPresence,
    /// Tokens of the stated title: header lines plus the summary section.
    pub role_tokens: HashSet<String>,
}

impl ResumeProfile {
    pub fn extract(resume_text: &str, vocabulary: &Vocabulary, detector: &SectionDetector) -> Self {
        let keywords: Vec<String> = vocabulary
            .scan_with_implied(&tokenize(resume_text))
            .into_iter()
            .map(|id| vocabulary.term(id).key.clone())
            .collect();
        let keyword_set = keywords.iter().cloned().collect();

        let outline = detector.outline(resume_text);
        let headline = outline
            .header
            .iter()
            .take(HEADER_MAX_LINES)
            .map(String::as_str)
            .chain(outline.body(Section::Summary))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            keywords,
            keyword_set,
            sections: outline.presence(),
            role_tokens: content_tokens(&headline).into_iter().collect(),
        }
    }

    pub fn has_keyword(&self, key: &str) -> bool {
        self.keyword_set.contains(key)
    }
}
