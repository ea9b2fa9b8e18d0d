use serde::{Deserialize, Serialize};

/// One actionable improvement tip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tip {
    pub issue: String,
    pub why: String,
    pub fix: String,
}

/// The engine's response contract, rendered by the presentation layer as a score
/// gauge, two keyword tag lists and a tip list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: u8,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub tips: Vec<Tip>,
}
