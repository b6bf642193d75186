//! Missing-skill detector: job-description skills the owner has no skill component for.
//!
//! Names are compared on word tokens, so "Go" is not found in "Good" and an owned
//! "Java" does not cover "JavaScript".

use std::fmt;

use crate::models::job::JobDescriptionMetadata;

/// Shortest normalised name allowed to match as a token of a longer name.
const MIN_CONTAINMENT_LEN: usize = 3;

/// A skill the job description asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillRequirement {
    pub name: String,
    /// Explicitly flagged as required, not merely mentioned in a requirement line.
    pub explicit: bool,
}

impl fmt::Display for SkillRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.explicit {
            write!(f, "{} (Required)", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// A skill name as compared: its normalised key and its word tokens.
struct SkillName {
    key: String,
    tokens: Vec<String>,
}

impl SkillName {
    fn new(name: &str) -> Self {
        Self {
            key: normalize_skill(name),
            tokens: tokenize(name),
        }
    }

    /// Same key, or the shorter name is a whole-token run of the longer one
    /// ("AWS" and "AWS Lambda", never "Java" and "JavaScript").
    fn matches(&self, other: &SkillName) -> bool {
        if self.key == other.key {
            return true;
        }
        let (shorter, longer) = if self.key.len() <= other.key.len() {
            (self, other)
        } else {
            (other, self)
        };
        shorter.key.chars().count() >= MIN_CONTAINMENT_LEN
            && contains_run(&longer.tokens, &shorter.tokens)
    }

    /// Appears as whole tokens in a tokenised line.
    fn mentioned_in(&self, line: &[String]) -> bool {
        contains_run(line, &self.tokens) || line.contains(&self.key)
    }
}

/// Skills the job description requires that none of `owned_skills` covers.
///
/// Returns bare names in job-description order, without duplicates.
pub fn detect_missing_skills(
    metadata: &JobDescriptionMetadata,
    owned_skills: &[String],
) -> Vec<String> {
    let owned: Vec<SkillName> = owned_skills
        .iter()
        .map(|s| SkillName::new(s))
        .filter(|s| !s.key.is_empty())
        .collect();

    let mut seen: Vec<String> = Vec::new();
    let mut missing = Vec::new();

    for requirement in considered_skills(metadata) {
        let wanted = SkillName::new(&requirement.name);
        if wanted.key.is_empty() || seen.contains(&wanted.key) {
            continue;
        }
        seen.push(wanted.key.clone());

        if !owned.iter().any(|o| o.matches(&wanted)) {
            missing.push(requirement.name);
        }
    }

    missing
}

/// Required skills, plus skills named in a requirement or qualification line.
pub fn considered_skills(metadata: &JobDescriptionMetadata) -> Vec<SkillRequirement> {
    let lines: Vec<Vec<String>> = metadata
        .requirements
        .iter()
        .chain(metadata.qualifications.iter())
        .map(|l| tokenize(l))
        .collect();

    metadata
        .skills
        .iter()
        .filter_map(|skill| {
            let name = skill.name.trim();
            if name.is_empty() {
                return None;
            }
            if skill.required {
                return Some(SkillRequirement {
                    name: name.to_string(),
                    explicit: true,
                });
            }
            let candidate = SkillName::new(name);
            lines
                .iter()
                .any(|line| candidate.mentioned_in(line))
                .then(|| SkillRequirement {
                    name: name.to_string(),
                    explicit: false,
                })
        })
        .collect()
}

/// Lowercase, keeping alphanumerics plus `+` and `#` (so `C++` and `C#` survive).
pub fn normalize_skill(name: &str) -> String {
    name.chars()
        .filter(|c| is_skill_char(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_skill_char(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !is_skill_char(c))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_run(haystack: &[String], needle: &[String]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}
