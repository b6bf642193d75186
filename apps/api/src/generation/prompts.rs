// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for component selection. JSON only.
pub const SELECTOR_SYSTEM: &str = "You are an expert CV writer who selects and ranks \
    a candidate's verified CV components for a specific job. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT invent facts not present in the components.";

/// Selection prompt template.
/// Replace: {grounding_instruction}, {focus_json}, {profile_json},
///          {components_json}, {jd_text}, {limits}
pub const SELECTOR_PROMPT_TEMPLATE: &str = r#"{grounding_instruction}

FOCUS for this CV:
{focus_json}

CANDIDATE PROFILE:
{profile_json}

CV COMPONENTS (source of truth, ONLY use facts from these):
{components_json}

JOB DESCRIPTION:
{jd_text}

Select the components that best fit the job, most relevant first, and return a JSON object:
{
  "experiences": [
    {
      "component_id": "the-exact-component_id-uuid",
      "title": "Senior Backend Engineer",
      "organization": "Acme",
      "highlights": ["Cut p99 latency by 40% by introducing a read-through cache"]
    }
  ],
  "education": [
    {"component_id": "uuid", "degree": "BSc Computer Science", "institution": "TU Berlin"}
  ],
  "projects": [
    {"component_id": "uuid", "name": "tomlfmt", "description": "A TOML formatter", "technologies": ["Rust"]}
  ],
  "skills": {
    "technical": ["Rust", "PostgreSQL"],
    "languages": ["English", "German"],
    "interests": ["Open source"]
  },
  "professional_summary": "Two sentences written for this job.",
  "strength_areas": ["Distributed systems"],
  "weakness_areas": ["No Kubernetes experience listed"],
  "reasoning": "Why these components were chosen."
}

HARD RULES:
1. EVERY experience, education and project entry MUST carry the `component_id` of the component it comes from
2. Respect these limits: {limits}
3. Use ONLY facts from the components; rewrite wording for the focus, never add facts
4. Skills must appear in the components; do not list a skill twice
5. Leave out components with nothing relevant for this job"#;
