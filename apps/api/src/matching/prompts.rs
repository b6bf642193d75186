// Prompt constants for job description extraction.
// Cross-cutting fragments live in llm_client::prompts.

/// System prompt for JD parsing.
pub const JD_PARSE_SYSTEM: &str = "You are an expert job description analyst. \
    Parse a job description and extract structured information. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT include explanations or apologies.";

/// JD parsing prompt template. Replace `{jd_text}` before sending.
pub const JD_PARSE_PROMPT_TEMPLATE: &str = r#"Parse the following job description and extract structured information.

Return a JSON object with this EXACT schema (no extra fields):
{
  "title": "Senior Platform Engineer",
  "company": "Acme",
  "location": "Berlin, Germany",
  "requirements": ["5+ years operating Kubernetes in production"],
  "skills": [
    {"name": "Kubernetes", "required": true, "level": "advanced"},
    {"name": "Kafka", "required": false, "level": null}
  ],
  "responsibilities": ["Own the deployment pipeline"],
  "qualifications": ["BSc in Computer Science or equivalent"],
  "grouped_skills": [
    {"category": "Infrastructure", "summary": "Container orchestration", "technologies": ["Kubernetes", "Helm"]}
  ]
}

Rules for parsing:

SKILLS: one entry per concrete technology, language, framework, tool or method.
Use the name as written in the job description. Set "required": true for explicit
must-haves ("required", "must have", "you will need", minimum years). Nice-to-haves
("preferred", "bonus", "a plus") are "required": false.

LEVEL: "beginner", "intermediate", "advanced", "expert", or null when not stated.

REQUIREMENTS / QUALIFICATIONS: copy each line as a short sentence, one per item.

Use an empty string or empty list for anything the job description does not state.
Never invent skills that are not mentioned.

JOB DESCRIPTION:
{jd_text}"#;
