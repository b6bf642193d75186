//! Text normalizer: turns a component into the canonical string that gets embedded.
//!
//! Every `ComponentKind` has its own field order. The `match` is exhaustive, so a
//! new sub-type does not compile until it gets a mapping here.

use crate::models::component::{Component, ComponentKind};

const SEPARATOR: &str = ". ";

impl Component {
    pub fn embedding_text(&self) -> String {
        to_embedding_text(self)
    }
}

/// Canonical embedding text. Empty only when every relevant field is empty.
pub fn to_embedding_text(component: &Component) -> String {
    let title = Some(component.title.as_str());
    let organization = component.organization.as_deref();
    let description = component.description.as_deref();
    let highlights = join_list(&component.highlights, SEPARATOR);

    match &component.kind {
        ComponentKind::Experience { location } => join(&[
            title,
            organization,
            location.as_deref(),
            description,
            highlights.as_deref(),
        ]),
        ComponentKind::LinkedinExperience {
            location,
            employment_type,
        } => join(&[
            title,
            organization,
            employment_type.as_deref(),
            location.as_deref(),
            description,
            highlights.as_deref(),
        ]),
        ComponentKind::Education {
            degree,
            field_of_study,
        } => join(&[
            degree.as_deref(),
            field_of_study.as_deref(),
            title,
            organization,
            description,
            highlights.as_deref(),
        ]),
        ComponentKind::LinkedinEducation {
            degree,
            field,
            school,
        } => {
            let text = join(&[
                degree.as_deref(),
                field.as_deref(),
                school.as_deref().or(organization),
                description,
            ]);
            // Imports without structured fields keep everything in the title.
            if text.is_empty() {
                join(&[title])
            } else {
                text
            }
        }
        ComponentKind::Skill {
            level,
            skill_category,
        } => join(&[title, level.as_deref(), skill_category.as_deref(), description]),
        ComponentKind::LinkedinSkill { .. } => join(&[title, description]),
        ComponentKind::Project { technologies, .. } => {
            let technologies = join_list(technologies, ", ").map(|t| format!("Technologies: {t}"));
            join(&[
                title,
                description,
                technologies.as_deref(),
                highlights.as_deref(),
            ])
        }
        ComponentKind::GithubRepository {
            language, topics, ..
        } => {
            let topics = join_list(topics, ", ").map(|t| format!("Topics: {t}"));
            join(&[title, description, language.as_deref(), topics.as_deref()])
        }
        ComponentKind::YoutubeVideo { channel, tags } => {
            let tags = join_list(tags, ", ");
            join(&[title, channel.as_deref(), description, tags.as_deref()])
        }
        ComponentKind::JdSkill {
            name,
            level,
            required,
        } => {
            let name = non_empty(name.as_deref()).or(non_empty(title));
            let base = join_with(&[name, level.as_deref()], ", ");
            match (base.is_empty(), *required) {
                (false, true) => format!("{base} (Required)"),
                _ => base,
            }
        }
        ComponentKind::JdRequirement { requirement } => non_empty(requirement.as_deref())
            .or(non_empty(description))
            .unwrap_or_default()
            .to_string(),
        ComponentKind::JdMetadata { company, location } => join(&[
            title,
            company.as_deref().or(organization),
            location.as_deref(),
            description,
        ]),
    }
}

fn join(parts: &[Option<&str>]) -> String {
    join_with(parts, SEPARATOR)
}

fn join_with(parts: &[Option<&str>], separator: &str) -> String {
    parts
        .iter()
        .filter_map(|p| non_empty(*p))
        .collect::<Vec<_>>()
        .join(separator)
}

fn join_list(items: &[String], separator: &str) -> Option<String> {
    let joined = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator);
    (!joined.is_empty()).then_some(joined)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
