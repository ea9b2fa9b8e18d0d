//! Resume section detection by heading patterns.

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Summary,
    Skills,
    Experience,
    Projects,
    Education,
    Certifications,
}

/// Sections that count toward the structure score, in tip priority order.
pub const REQUIRED_SECTIONS: [Section; 3] = [Section::Skills, Section::Experience, Section::Projects];

impl Section {
    /// Conventional heading text for this section.
    pub fn heading(self) -> &'static str {
        match self {
            Section::Summary => "Summary",
            Section::Skills => "Skills",
            Section::Experience => "Experience",
            Section::Projects => "Projects",
            Section::Education => "Education",
            Section::Certifications => "Certifications",
        }
    }

    /// Heading names that may carry inline content ("Skills: Python, Go").
    fn name_pattern(self) -> &'static str {
        match self {
            Section::Summary => {
                r"(?:professional\s+|career\s+|executive\s+)?(?:summary|profile|objective)"
            }
            Section::Skills => r"(?:technical\s+|core\s+|key\s+|relevant\s+)?skills",
            Section::Experience => {
                r"(?:work\s+|professional\s+|relevant\s+|industry\s+)?experience|employment(?:\s+history)?|work\s+history"
            }
            Section::Projects => {
                r"(?:personal\s+|academic\s+|selected\s+|key\s+|notable\s+|side\s+|relevant\s+)?projects"
            }
            Section::Education => r"education",
            Section::Certifications => r"certifications?|licenses?",
        }
    }

    /// Heading names that only count when nothing follows them on the line.
    /// "Technologies: Python" inside a project is a detail line, not a heading.
    fn bare_pattern(self) -> &'static str {
        match self {
            Section::Summary => r"about(?:\s+me)?",
            Section::Skills => {
                r"core\s+competencies|technical\s+proficienc(?:y|ies)|tech(?:nical)?\s+stack|technologies"
            }
            Section::Experience => r"career\s+history|internships?",
            Section::Projects => r"portfolio",
            Section::Education => r"academic\s+background",
            Section::Certifications => r"awards?|achievements",
        }
    }
}

/// Which of the required sections a resume has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPresence {
    pub skills: bool,
    pub experience: bool,
    pub projects: bool,
}

impl SectionPresence {
    pub fn has(&self, section: Section) -> bool {
        match section {
            Section::Skills => self.skills,
            Section::Experience => self.experience,
            Section::Projects => self.projects,
            _ => false,
        }
    }

    pub fn count(&self) -> usize {
        REQUIRED_SECTIONS.iter().filter(|s| self.has(**s)).count()
    }

    pub fn missing(&self) -> Vec<Section> {
        REQUIRED_SECTIONS
            .iter()
            .copied()
            .filter(|s| !self.has(*s))
            .collect()
    }
}

/// A resume split into its header and its headed sections.
#[derive(Debug, Clone, Default)]
pub struct ResumeOutline {
    /// Non-empty lines before the first recognised heading.
    pub header: Vec<String>,
    pub sections: Vec<(Section, Vec<String>)>,
}

impl ResumeOutline {
    pub fn presence(&self) -> SectionPresence {
        let has = |wanted: Section| self.sections.iter().any(|(s, _)| *s == wanted);
        SectionPresence {
            skills: has(Section::Skills),
            experience: has(Section::Experience),
            projects: has(Section::Projects),
        }
    }

    /// Body lines of every occurrence of `section`.
    pub fn body(&self, section: Section) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|(s, _)| *s == section)
            .flat_map(|(_, lines)| lines.iter().map(String::as_str))
            .collect()
    }
}

/// A recognised heading line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading<'a> {
    /// Every section the heading names, first one leading ("Projects & Experience").
    pub sections: Vec<Section>,
    /// Inline content after a colon.
    pub rest: Option<&'a str>,
}

/// Compiled heading patterns, built once and shared.
#[derive(Debug, Clone)]
pub struct SectionDetector {
    /// (section, whole-name pattern, whether inline content may follow)
    names: Vec<(Section, Regex, bool)>,
    decoration: Regex,
    joiners: Regex,
}

const ALL_SECTIONS: [Section; 6] = [
    Section::Summary,
    Section::Skills,
    Section::Experience,
    Section::Projects,
    Section::Education,
    Section::Certifications,
];

/// Longest heading name, before any colon.
const MAX_HEADING_CHARS: usize = 60;
/// Parts of a combined heading ("Skills, Tools & Platforms").
const MAX_HEADING_PARTS: usize = 4;
/// Words in a non-section part of a combined heading ("Skills & Developer Tools").
const MAX_FILLER_WORDS: usize = 3;

impl SectionDetector {
    pub fn new() -> Result<Self, regex::Error> {
        let mut names = Vec::new();
        for section in ALL_SECTIONS {
            let named = Regex::new(&format!(r"(?i)^(?:{})$", section.name_pattern()))?;
            let bare = Regex::new(&format!(r"(?i)^(?:{})$", section.bare_pattern()))?;
            names.push((section, named, true));
            names.push((section, bare, false));
        }

        Ok(Self {
            names,
            decoration: Regex::new(r"^[#*•>|=\-\s]+")?,
            joiners: Regex::new(r"(?i)\s*(?:&|/|,|\band\b)\s*")?,
        })
    }

    fn name(&self, part: &str) -> Option<(Section, bool)> {
        self.names
            .iter()
            .find(|(_, regex, _)| regex.is_match(part))
            .map(|(section, _, allows_inline)| (*section, *allows_inline))
    }

    /// Classifies a single line as a heading: a section name, optionally bulleted or
    /// markdown-prefixed, optionally joined with further section names or a short
    /// title-cased phrase, optionally followed by ":" and inline content.
    pub fn heading<'a>(&self, line: &'a str) -> Option<Heading<'a>> {
        let line = line.trim_end_matches(['-', '=', '_', ' ', '\t']);
        let line = match self.decoration.find(line) {
            Some(m) => &line[m.end()..],
            None => line,
        };

        let (name, rest) = match line.split_once(':') {
            Some((name, rest)) => (name.trim(), Some(rest.trim()).filter(|r| !r.is_empty())),
            None => (line.trim(), None),
        };
        if name.is_empty() || name.chars().count() > MAX_HEADING_CHARS {
            return None;
        }

        let parts: Vec<&str> = self.joiners.split(name).filter(|p| !p.is_empty()).collect();
        if parts.is_empty() || parts.len() > MAX_HEADING_PARTS {
            return None;
        }

        let (lead, allows_inline) = self.name(parts[0])?;
        if rest.is_some() && !allows_inline {
            return None;
        }

        let mut sections = vec![lead];
        for part in &parts[1..] {
            match self.name(part) {
                Some((section, _)) => {
                    if !sections.contains(&section) {
                        sections.push(section);
                    }
                }
                None if is_title_phrase(part) => {}
                None => return None,
            }
        }

        Some(Heading { sections, rest })
    }

    pub fn outline(&self, text: &str) -> ResumeOutline {
        let mut outline = ResumeOutline::default();

        for line in text.lines() {
            if let Some(heading) = self.heading(line) {
                // Body lines follow the leading section; the others only mark presence.
                for section in &heading.sections[1..] {
                    outline.sections.push((*section, Vec::new()));
                }
                let body = heading.rest.map(|r| vec![r.to_string()]).unwrap_or_default();
                outline.sections.push((heading.sections[0], body));
                continue;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match outline.sections.last_mut() {
                Some((_, body)) => body.push(trimmed.to_string()),
                None => outline.header.push(trimmed.to_string()),
            }
        }

        outline
    }
}

/// A few words, each starting with an uppercase letter ("Tools", "Developer Tools").
fn is_title_phrase(part: &str) -> bool {
    let words: Vec<&str> = part.split_whitespace().collect();
    !words.is_empty()
        && words.len() <= MAX_FILLER_WORDS
        && words
            .iter()
            .all(|w| w.chars().next().is_some_and(char::is_uppercase))
}
