// LLM prompt constants for tip phrasing.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for tip phrasing. Replace `{json_only}` before sending.
pub const TIP_PHRASING_SYSTEM_TEMPLATE: &str = "You are a strict ATS (Applicant Tracking System) \
    resume scanner explaining screening results. Act like an ATS, not a career coach: \
    be specific about keyword matching and section parsing. {json_only}";

/// Tip phrasing prompt. Replace: {no_invention}, {tip_count}, {summary_json}
pub const TIP_PHRASING_PROMPT_TEMPLATE: &str = r#"{no_invention}

The scoring engine has already analyzed a resume against a job and selected the
deficiencies below, in priority order. Write exactly {tip_count} tips, one per
deficiency, in the SAME order.

SCORING POLICY (for context):
- 70% weight: technical keyword match (tools, languages, frameworks)
- 20% weight: role relevance (job title terms in the resume headline or summary)
- 10% weight: structure (Skills, Projects, Experience headings)

ANALYSIS SUMMARY:
{summary_json}

Return a JSON object with this EXACT schema:
{
  "tips": [
    {
      "issue": "What specific keyword, title term or section is missing",
      "why": "Why ATS systems penalize this, specific to keyword matching or parsing",
      "fix": "Exact, copy-paste ready wording to add to the resume"
    }
  ]
}

RULES:
1. Exactly {tip_count} tips, one per deficiency, same order
2. Every tip has non-empty issue, why and fix
3. Name the exact keywords from the deficiency; never add new ones"#;
