// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Instruction appended to every CV-writing prompt.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Every entry you output must come from one of the components listed in the \
    context and carry that component's exact `component_id`. Do NOT invent employers, \
    degrees, dates, metrics or skills. You may rewrite wording; you may not add facts.";
