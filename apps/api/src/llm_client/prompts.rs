// Shared prompt fragments. Each module that calls the LLM keeps its own
// prompts.rs alongside it and reuses these.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps the model from inventing experience the candidate never claimed.
pub const NO_INVENTION_INSTRUCTION: &str = "\
    CRITICAL: Never claim or assume the candidate has a skill. \
    Only suggest adding a keyword if the candidate genuinely has that experience. \
    Do NOT add keywords, sections, or problems that are not in the deficiency list.";
