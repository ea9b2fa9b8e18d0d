//! Skill vocabulary: the dictionary of known tools, languages, frameworks and soft
//! skills that keyword extraction is allowed to report.
//!
//! Built once at startup (built-in table plus an optional JSON file) and shared
//! read-only across requests.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scanner::text::{normalize, tokenize, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Language,
    Framework,
    Tool,
    Cloud,
    Database,
    Practice,
    SoftSkill,
}

impl Category {
    /// Hard skills are weighted ahead of soft skills when ranking gaps.
    pub fn is_technical(self) -> bool {
        !matches!(self, Category::SoftSkill)
    }
}

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("failed to read vocabulary file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid vocabulary file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("vocabulary term {0:?} normalizes to nothing")]
    EmptyTerm(String),

    #[error("vocabulary has no terms")]
    NoTerms,
}

/// A vocabulary entry as written in a `SKILLS_FILE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermSpec {
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub implies: Vec<String>,
    #[serde(default)]
    pub strict_case: bool,
}

/// A resolved vocabulary term.
#[derive(Debug, Clone)]
pub struct Term {
    /// Normalized canonical form, used as the matching key.
    pub key: String,
    /// Display form reported back to the user.
    pub name: String,
    pub category: Category,
    /// Keys of broader terms this one implies on the resume side.
    pub implies: Vec<String>,
    pub strict_case: bool,
}

impl Term {
    /// Canonical casing, or all caps for names longer than one letter
    /// ("GO" and "SPARK" in a shouted requirements line, never a lone "r").
    fn matches_casing(&self, raw: &str) -> bool {
        raw == self.name || (self.name.chars().count() > 1 && raw == self.name.to_uppercase())
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    term: usize,
    is_alias: bool,
}

#[derive(Debug, Clone)]
pub struct Vocabulary {
    terms: Vec<Term>,
    index: HashMap<String, Entry>,
    max_ngram: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in dictionary
// ────────────────────────────────────────────────────────────────────────────

const LANGUAGES: &[&str] = &[
    "Python", "Java", "JavaScript", "TypeScript", "Go", "Rust", "C", "C++", "C#", "Ruby", "PHP",
    "Swift", "Kotlin", "Scala", "R", "MATLAB", "Perl", "Haskell", "Elixir", "Dart", "Bash",
    "SQL", "HTML", "CSS",
];

const FRAMEWORKS: &[&str] = &[
    "React", "React Native", "Angular", "Vue.js", "Svelte", "Next.js", "Node.js", "Express",
    "Django", "Flask", "FastAPI", "Spring", "Spring Boot", "Ruby on Rails", "Laravel", ".NET",
    "TensorFlow", "PyTorch", "scikit-learn", "Pandas", "NumPy", "Tailwind CSS", "Bootstrap",
    "jQuery", "GraphQL", "Flutter",
];

const TOOLS: &[&str] = &[
    "Docker", "Kubernetes", "Terraform", "Ansible", "Jenkins", "Git", "GitHub Actions",
    "GitLab CI", "CI/CD", "Linux", "Nginx", "Kafka", "RabbitMQ", "Airflow", "Spark", "Hadoop",
    "Jira", "Figma", "Prometheus", "Grafana", "Helm", "Webpack", "Selenium", "Cypress", "Jest",
    "Pytest", "JUnit", "Postman", "Tableau", "Power BI", "Excel", "dbt",
];

const CLOUD: &[&str] = &[
    "AWS", "AWS Lambda", "EC2", "S3", "CloudFormation", "Azure", "GCP", "Heroku", "Vercel",
    "Firebase", "Serverless",
];

const DATABASES: &[&str] = &[
    "PostgreSQL", "MySQL", "MongoDB", "Redis", "SQLite", "DynamoDB", "Cassandra",
    "Elasticsearch", "Snowflake", "BigQuery",
];

const PRACTICES: &[&str] = &[
    "Microservices", "REST", "gRPC", "Agile", "Scrum", "DevOps", "Machine Learning",
    "Deep Learning", "NLP", "Computer Vision", "AI", "LLM", "Data Analysis",
    "Data Visualization", "ETL", "Unit Testing", "TDD", "System Design",
    "Distributed Systems", "Object-Oriented Programming", "Data Structures", "Algorithms",
    "Infrastructure as Code",
];

const SOFT_SKILLS: &[&str] = &[
    "Leadership", "Communication", "Teamwork", "Problem Solving", "Collaboration", "Mentoring",
    "Time Management", "Project Management", "Stakeholder Management", "Critical Thinking",
    "Adaptability",
];

/// Terms that collide with ordinary English words: only the canonical casing matches.
const STRICT_CASE: &[&str] = &[
    "Go", "C", "R", "Express", "Spring", "Excel", "Dart", "Swift", "REST", "Spark",
];

const ALIASES: &[(&str, &str)] = &[
    ("golang", "Go"),
    ("js", "JavaScript"),
    ("ts", "TypeScript"),
    ("cpp", "C++"),
    ("csharp", "C#"),
    ("shell scripting", "Bash"),
    ("html5", "HTML"),
    ("css3", "CSS"),
    ("react.js", "React"),
    ("reactjs", "React"),
    ("vue", "Vue.js"),
    ("vuejs", "Vue.js"),
    ("nextjs", "Next.js"),
    ("node", "Node.js"),
    ("nodejs", "Node.js"),
    ("express.js", "Express"),
    ("expressjs", "Express"),
    ("rails", "Ruby on Rails"),
    ("dotnet", ".NET"),
    ("asp.net", ".NET"),
    ("sklearn", "scikit-learn"),
    ("tailwind", "Tailwind CSS"),
    ("k8s", "Kubernetes"),
    ("cicd", "CI/CD"),
    ("continuous integration", "CI/CD"),
    ("apache kafka", "Kafka"),
    ("apache airflow", "Airflow"),
    ("apache spark", "Spark"),
    ("pyspark", "Spark"),
    ("amazon web services", "AWS"),
    ("amazon s3", "S3"),
    ("amazon ec2", "EC2"),
    ("microsoft azure", "Azure"),
    ("google cloud", "GCP"),
    ("google cloud platform", "GCP"),
    ("postgres", "PostgreSQL"),
    ("mongo", "MongoDB"),
    ("elastic search", "Elasticsearch"),
    ("rest api", "REST"),
    ("restful", "REST"),
    ("ml", "Machine Learning"),
    ("natural language processing", "NLP"),
    ("artificial intelligence", "AI"),
    ("large language models", "LLM"),
    ("llms", "LLM"),
    ("oop", "Object-Oriented Programming"),
    ("iac", "Infrastructure as Code"),
    ("team player", "Teamwork"),
    ("problem-solving", "Problem Solving"),
];

const IMPLIES: &[(&str, &str)] = &[
    ("AWS Lambda", "AWS"),
    ("EC2", "AWS"),
    ("S3", "AWS"),
    ("CloudFormation", "AWS"),
    ("DynamoDB", "AWS"),
    ("BigQuery", "GCP"),
    ("Spring Boot", "Spring"),
    ("React Native", "React"),
    ("Next.js", "React"),
    ("GitHub Actions", "CI/CD"),
    ("GitLab CI", "CI/CD"),
    ("Deep Learning", "Machine Learning"),
];

/// Keyword sets implied by short role titles.
pub struct RoleProfile {
    /// Phrases whose tokens must all appear in the title.
    pub triggers: &'static [&'static str],
    pub keywords: &'static [&'static str],
}

pub const ROLE_PROFILES: &[RoleProfile] = &[
    RoleProfile {
        triggers: &["backend", "back end", "api developer", "server side"],
        keywords: &["Python", "Java", "Go", "SQL", "PostgreSQL", "REST", "Docker", "Microservices", "Git"],
    },
    RoleProfile {
        triggers: &["frontend", "front end", "ui developer", "ui engineer", "web developer"],
        keywords: &["JavaScript", "TypeScript", "React", "HTML", "CSS", "REST", "Git"],
    },
    RoleProfile {
        triggers: &["full stack", "fullstack"],
        keywords: &["JavaScript", "TypeScript", "React", "Node.js", "SQL", "REST", "Docker", "Git"],
    },
    RoleProfile {
        triggers: &["devops", "site reliability", "sre", "platform engineer", "infrastructure"],
        keywords: &["Docker", "Kubernetes", "Terraform", "CI/CD", "AWS", "Linux", "Jenkins", "Prometheus", "Bash"],
    },
    RoleProfile {
        triggers: &["cloud"],
        keywords: &["AWS", "Azure", "GCP", "Terraform", "Kubernetes", "Docker", "Serverless"],
    },
    RoleProfile {
        triggers: &["data scientist", "data science"],
        keywords: &["Python", "SQL", "R", "Machine Learning", "Pandas", "NumPy", "scikit-learn", "Data Visualization"],
    },
    RoleProfile {
        triggers: &["data engineer", "data engineering"],
        keywords: &["Python", "SQL", "Spark", "Airflow", "ETL", "Kafka", "AWS", "Snowflake"],
    },
    RoleProfile {
        triggers: &["data analyst", "business analyst", "analytics"],
        keywords: &["SQL", "Excel", "Tableau", "Power BI", "Python", "Data Analysis", "Data Visualization"],
    },
    RoleProfile {
        triggers: &["machine learning", "ml engineer", "ai engineer", "deep learning"],
        keywords: &["Python", "PyTorch", "TensorFlow", "Machine Learning", "Deep Learning", "scikit-learn", "Docker"],
    },
    RoleProfile {
        triggers: &["mobile", "android", "ios"],
        keywords: &["Kotlin", "Swift", "Java", "Flutter", "React Native", "REST", "Git"],
    },
    RoleProfile {
        triggers: &["qa", "quality assurance", "test engineer", "sdet", "automation engineer"],
        keywords: &["Selenium", "Cypress", "Pytest", "JUnit", "Postman", "Unit Testing", "CI/CD"],
    },
    RoleProfile {
        triggers: &["product manager", "project manager", "program manager", "scrum master"],
        keywords: &["Agile", "Scrum", "Jira", "Stakeholder Management", "Communication", "Leadership", "Project Management", "Data Analysis"],
    },
];

/// Used only when no specific profile matches a generic engineering title.
pub const GENERIC_ENGINEERING_PROFILE: RoleProfile = RoleProfile {
    triggers: &["engineer", "developer", "programmer"],
    keywords: &["Git", "Data Structures", "Algorithms", "System Design", "Unit Testing", "Agile"],
};

impl RoleProfile {
    /// True when every token of any trigger phrase is among `title_tokens`.
    pub fn matches(&self, title_tokens: &[String]) -> bool {
        self.triggers.iter().any(|trigger| {
            tokenize(trigger)
                .iter()
                .all(|t| title_tokens.iter().any(|tt| tt == &t.norm))
        })
    }
}

fn builtin_specs() -> Vec<TermSpec> {
    let groups: [(&[&str], Category); 7] = [
        (LANGUAGES, Category::Language),
        (FRAMEWORKS, Category::Framework),
        (TOOLS, Category::Tool),
        (CLOUD, Category::Cloud),
        (DATABASES, Category::Database),
        (PRACTICES, Category::Practice),
        (SOFT_SKILLS, Category::SoftSkill),
    ];

    groups
        .iter()
        .flat_map(|(names, category)| {
            names.iter().map(move |name| TermSpec {
                name: name.to_string(),
                category: *category,
                aliases: ALIASES
                    .iter()
                    .filter(|(_, target)| target == name)
                    .map(|(alias, _)| alias.to_string())
                    .collect(),
                implies: IMPLIES
                    .iter()
                    .filter(|(child, _)| child == name)
                    .map(|(_, parent)| parent.to_string())
                    .collect(),
                strict_case: STRICT_CASE.contains(name),
            })
        })
        .collect()
}

/// Singular/plural variant for concept terms ("microservice" <-> "microservices").
fn number_variant(key: &str) -> Option<String> {
    if key.ends_with("ss") || key.len() < 4 {
        return None;
    }
    match key.strip_suffix('s') {
        Some(singular) => Some(singular.to_string()),
        None => Some(format!("{key}s")),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Vocabulary
// ────────────────────────────────────────────────────────────────────────────

impl Vocabulary {
    /// The built-in dictionary only.
    pub fn builtin() -> Self {
        Self::from_specs(builtin_specs()).expect("built-in vocabulary terms are non-empty")
    }

    /// Built-in dictionary extended with `extra` terms. A term whose name already
    /// exists replaces the built-in definition.
    pub fn with_extra_terms(extra: Vec<TermSpec>) -> Result<Self, VocabularyError> {
        let mut specs = builtin_specs();
        for spec in extra {
            let key = normalize(&spec.name);
            specs.retain(|s| normalize(&s.name) != key);
            specs.push(spec);
        }
        Self::from_specs(specs)
    }

    /// Reads extra terms from a JSON array of [`TermSpec`].
    pub fn load_terms_file(path: &Path) -> Result<Vec<TermSpec>, VocabularyError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn from_specs(specs: Vec<TermSpec>) -> Result<Self, VocabularyError> {
        let mut terms = Vec::with_capacity(specs.len());
        let mut index = HashMap::new();
        let mut max_ngram = 1;

        for spec in &specs {
            let key = normalize(&spec.name);
            if key.is_empty() {
                return Err(VocabularyError::EmptyTerm(spec.name.clone()));
            }
            let id = terms.len();
            max_ngram = max_ngram.max(key.split(' ').count());
            index.insert(key.clone(), Entry { term: id, is_alias: false });

            let mut aliases: Vec<String> = spec.aliases.iter().map(|a| normalize(a)).collect();
            if spec.category == Category::Practice && !spec.strict_case {
                aliases.extend(number_variant(&key));
            }
            for alias in aliases.into_iter().filter(|a| !a.is_empty()) {
                max_ngram = max_ngram.max(alias.split(' ').count());
                // Canonical names win over aliases of other terms.
                index.entry(alias).or_insert(Entry { term: id, is_alias: true });
            }

            terms.push(Term {
                key,
                name: spec.name.clone(),
                category: spec.category,
                implies: spec.implies.iter().map(|p| normalize(p)).collect(),
                strict_case: spec.strict_case,
            });
        }

        // A canonical key always points at its own term, even if an earlier alias claimed it.
        for (id, term) in terms.iter().enumerate() {
            index.insert(term.key.clone(), Entry { term: id, is_alias: false });
        }

        let vocabulary = Self {
            terms,
            index,
            max_ngram,
        };
        if vocabulary.is_empty() {
            return Err(VocabularyError::NoTerms);
        }
        Ok(vocabulary)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term(&self, id: usize) -> &Term {
        &self.terms[id]
    }

    /// Looks up a term by display name or alias.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.index.get(&normalize(name)).map(|e| e.term)
    }

    /// Dictionary scan over `tokens`, longest match first. Returns term ids in
    /// first-seen order without duplicates.
    pub fn scan(&self, tokens: &[Token]) -> Vec<usize> {
        let mut found: Vec<usize> = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let longest = self.max_ngram.min(tokens.len() - i);
            let mut consumed = 1;

            for n in (1..=longest).rev() {
                let window = &tokens[i..i + n];
                let phrase = window
                    .iter()
                    .map(|t| t.norm.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");

                let Some(entry) = self.index.get(&phrase) else {
                    continue;
                };
                let term = &self.terms[entry.term];
                if term.strict_case && !entry.is_alias {
                    let raw = window
                        .iter()
                        .map(|t| t.raw.as_str())
                        .collect::<Vec<_>>()
                        .join(" ");
                    if !term.matches_casing(&raw) {
                        continue;
                    }
                }

                if !found.contains(&entry.term) {
                    found.push(entry.term);
                }
                consumed = n;
                break;
            }

            i += consumed;
        }

        found
    }

    /// Like [`scan`](Self::scan), followed by each hit's implied parent terms.
    pub fn scan_with_implied(&self, tokens: &[Token]) -> Vec<usize> {
        let mut found = self.scan(tokens);
        let mut implied = Vec::new();
        for id in &found {
            for parent in &self.terms[*id].implies {
                if let Some(entry) = self.index.get(parent) {
                    implied.push(entry.term);
                }
            }
        }
        for id in implied {
            if !found.contains(&id) {
                found.push(id);
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(vocab: &Vocabulary, text: &str) -> Vec<String> {
        vocab
            .scan(&tokenize(text))
            .into_iter()
            .map(|id| vocab.term(id).name.clone())
            .collect()
    }

    #[test]
    fn test_builtin_vocabulary_is_populated() {
        let vocab = Vocabulary::builtin();
        assert!(vocab.len() > 100);
        assert!(vocab.find("Kubernetes").is_some());
    }

    #[test]
    fn test_scan_prefers_longest_match() {
        let vocab = Vocabulary::builtin();
        assert_eq!(
            names(&vocab, "Built on AWS Lambda with Spring Boot and React Native"),
            vec!["AWS Lambda", "Spring Boot", "React Native"]
        );
    }

    #[test]
    fn test_scan_preserves_first_seen_order_without_duplicates() {
        let vocab = Vocabulary::builtin();
        assert_eq!(
            names(&vocab, "Docker, Python, docker, PYTHON, Terraform"),
            vec!["Docker", "Python", "Terraform"]
        );
    }

    #[test]
    fn test_aliases_resolve_to_canonical_term() {
        let vocab = Vocabulary::builtin();
        assert_eq!(
            names(&vocab, "golang services on k8s backed by postgres"),
            vec!["Go", "Kubernetes", "PostgreSQL"]
        );
    }

    #[test]
    fn test_strict_case_terms_ignore_english_usage() {
        let vocab = Vocabulary::builtin();
        assert!(names(&vocab, "ready to go and excel in a fast team").is_empty());
        assert_eq!(names(&vocab, "Go, Excel"), vec!["Go", "Excel"]);
    }

    #[test]
    fn test_strict_case_terms_accept_all_caps() {
        let vocab = Vocabulary::builtin();
        assert_eq!(
            names(&vocab, "REQUIREMENTS: GO, DOCKER, PYTHON, SPARK, EXCEL"),
            vec!["Go", "Docker", "Python", "Spark", "Excel"]
        );
        assert!(names(&vocab, "gO, sPARK or spark").is_empty());
    }

    #[test]
    fn test_empty_vocabulary_is_rejected() {
        assert!(matches!(
            Vocabulary::from_specs(Vec::new()),
            Err(VocabularyError::NoTerms)
        ));
    }

    #[test]
    fn test_generic_english_words_are_not_keywords() {
        let vocab = Vocabulary::builtin();
        assert!(names(&vocab, "We are a friendly company that values people").is_empty());
    }

    #[test]
    fn test_concept_terms_match_singular_and_plural() {
        let vocab = Vocabulary::builtin();
        assert_eq!(
            names(&vocab, "a microservice architecture and distributed system design"),
            vec!["Microservices", "Distributed Systems"]
        );
    }

    #[test]
    fn test_scan_with_implied_adds_parent_terms() {
        let vocab = Vocabulary::builtin();
        let ids = vocab.scan_with_implied(&tokenize("AWS Lambda"));
        let found: Vec<&str> = ids.iter().map(|id| vocab.term(*id).name.as_str()).collect();
        assert_eq!(found, vec!["AWS Lambda", "AWS"]);
    }

    #[test]
    fn test_extra_terms_extend_and_override() {
        let vocab = Vocabulary::with_extra_terms(vec![
            TermSpec {
                name: "Bevy".to_string(),
                category: Category::Framework,
                aliases: vec!["bevy engine".to_string()],
                implies: vec!["Rust".to_string()],
                strict_case: false,
            },
            TermSpec {
                name: "Python".to_string(),
                category: Category::Language,
                aliases: vec!["py".to_string()],
                implies: vec![],
                strict_case: false,
            },
        ])
        .unwrap();

        assert_eq!(names(&vocab, "bevy engine, py"), vec!["Bevy", "Python"]);
        assert_eq!(vocab.len(), Vocabulary::builtin().len() + 1);
    }

    #[test]
    fn test_empty_term_is_rejected() {
        let result = Vocabulary::from_specs(vec![TermSpec {
            name: "!!!".to_string(),
            category: Category::Tool,
            aliases: vec![],
            implies: vec![],
            strict_case: false,
        }]);
        assert!(matches!(result, Err(VocabularyError::EmptyTerm(_))));
    }

    #[test]
    fn test_load_terms_file_reads_json_array() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Zig", "category": "language", "aliases": ["ziglang"]}}]"#
        )
        .unwrap();

        let specs = Vocabulary::load_terms_file(file.path()).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "Zig");
        assert_eq!(specs[0].category, Category::Language);
        assert!(!specs[0].strict_case);
    }

    #[test]
    fn test_role_profile_trigger_needs_all_tokens() {
        let title = vec!["senior".to_string(), "data".to_string(), "engineer".to_string()];
        let data_engineer = ROLE_PROFILES
            .iter()
            .find(|p| p.triggers.contains(&"data engineer"))
            .unwrap();
        let data_scientist = ROLE_PROFILES
            .iter()
            .find(|p| p.triggers.contains(&"data scientist"))
            .unwrap();
        assert!(data_engineer.matches(&title));
        assert!(!data_scientist.matches(&title));
    }

    #[test]
    fn test_every_role_profile_keyword_is_in_vocabulary() {
        let vocab = Vocabulary::builtin();
        for profile in ROLE_PROFILES.iter().chain([&GENERIC_ENGINEERING_PROFILE]) {
            for keyword in profile.keywords {
                assert!(vocab.find(keyword).is_some(), "{keyword} missing");
            }
        }
    }
}
