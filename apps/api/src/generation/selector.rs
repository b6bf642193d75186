//! Component Selector: asks the model to select and rank components for a job,
//! then bounds what comes back.
//!
//! The model only chooses and rewords. After parsing:
//! 1. entries citing a component that was not offered (or of the wrong category) are dropped
//! 2. duplicates are removed, first occurrence wins
//! 3. dates and organisations are copied from the source component
//! 4. per-section limits are applied

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::focus::{guidance, FocusArea};
use crate::generation::prompts::{SELECTOR_PROMPT_TEMPLATE, SELECTOR_SYSTEM};
use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::{generate_json, TextGenerator};
use crate::matching::missing_skills::normalize_skill;
use crate::models::component::{Category, Component, ComponentKind};
use crate::models::null_as_default;
use crate::models::profile::Profile;

// ────────────────────────────────────────────────────────────────────────────
// Section limits
// ────────────────────────────────────────────────────────────────────────────

pub const EXPERIENCE_LIMIT: usize = 4;
pub const EDUCATION_LIMIT: usize = 2;
pub const PROJECT_LIMIT: usize = 3;
pub const TECHNICAL_SKILL_LIMIT: usize = 15;
pub const LANGUAGE_LIMIT: usize = 5;
pub const INTEREST_LIMIT: usize = 5;
pub const HIGHLIGHT_LIMIT: usize = 4;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvExperience {
    pub component_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvEducation {
    pub component_id: Uuid,
    pub degree: String,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvProject {
    pub component_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvSkills {
    #[serde(default, deserialize_with = "null_as_default")]
    pub technical: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub interests: Vec<String>,
}

/// Curated CV content, every entry traceable to a source component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvContent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub experiences: Vec<CvExperience>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<CvEducation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: CvSkills,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<CvProject>,
}

impl CvContent {
    pub fn is_empty(&self) -> bool {
        self.experiences.is_empty()
            && self.education.is_empty()
            && self.projects.is_empty()
            && self.skills.technical.is_empty()
            && self.skills.languages.is_empty()
            && self.skills.interests.is_empty()
    }
}

/// The model's commentary on its selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionInsights {
    #[serde(default, deserialize_with = "null_as_default")]
    pub professional_summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub strength_areas: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub weakness_areas: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reasoning: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    pub content: CvContent,
    pub insights: SelectionInsights,
}

/// Raw model answer: content and insights in one object.
#[derive(Debug, Deserialize)]
struct SelectorOutput {
    #[serde(flatten)]
    content: CvContent,
    #[serde(flatten)]
    insights: SelectionInsights,
}

/// A component as shown to the model.
#[derive(Debug, Serialize)]
struct PromptComponent<'a> {
    component_id: Uuid,
    category: Option<&'static str>,
    #[serde(flatten)]
    kind: &'a ComponentKind,
    title: &'a str,
    organization: Option<&'a str>,
    description: Option<&'a str>,
    highlights: &'a [String],
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl<'a> From<&'a Component> for PromptComponent<'a> {
    fn from(c: &'a Component) -> Self {
        Self {
            component_id: c.id,
            category: c.category().map(Category::label),
            kind: &c.kind,
            title: &c.title,
            organization: c.organization.as_deref(),
            description: c.description.as_deref(),
            highlights: &c.highlights,
            start_date: c.start_date,
            end_date: c.end_date,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Selector
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ComponentSelector {
    llm: Arc<dyn TextGenerator>,
}

impl ComponentSelector {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    /// Balanced-focus selection, content only.
    pub async fn select_and_rank_components(
        &self,
        components: &[Component],
        job_description: &str,
        profile: &Profile,
    ) -> Result<CvContent, AppError> {
        Ok(self
            .select(components, job_description, profile, FocusArea::Balanced)
            .await?
            .content)
    }

    /// Selects and ranks components for one focus area.
    ///
    /// No components means an empty selection and no model call.
    pub async fn select(
        &self,
        components: &[Component],
        job_description: &str,
        profile: &Profile,
        focus: FocusArea,
    ) -> Result<Selection, AppError> {
        if components.is_empty() {
            return Ok(Selection::default());
        }

        let prompt = build_selector_prompt(components, job_description, profile, focus)?;
        let output: SelectorOutput =
            generate_json(self.llm.as_ref(), &prompt, SELECTOR_SYSTEM).await?;

        let content = bound_content(output.content, components);
        info!(
            "Selected {} experiences, {} education, {} projects, {} skills ({focus} focus)",
            content.experiences.len(),
            content.education.len(),
            content.projects.len(),
            content.skills.technical.len()
        );

        Ok(Selection {
            content,
            insights: output.insights,
        })
    }
}

fn build_selector_prompt(
    components: &[Component],
    job_description: &str,
    profile: &Profile,
    focus: FocusArea,
) -> Result<String, AppError> {
    let components_json = serde_json::to_string_pretty(
        &components.iter().map(PromptComponent::from).collect::<Vec<_>>(),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize components: {e}")))?;

    let profile_json = serde_json::to_string_pretty(&serde_json::json!({
        "name": profile.display_name(),
        "profession": profile.display_profession(),
        "location": profile.location,
        "summary": profile.summary,
    }))
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize profile: {e}")))?;

    let focus_json = serde_json::to_string_pretty(&serde_json::json!({
        "focus_area": focus,
        "guidance": guidance(focus),
    }))
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize focus: {e}")))?;

    let limits = format!(
        "at most {EXPERIENCE_LIMIT} experiences, {EDUCATION_LIMIT} education entries, \
         {PROJECT_LIMIT} projects, {TECHNICAL_SKILL_LIMIT} technical skills, \
         {LANGUAGE_LIMIT} languages, {INTEREST_LIMIT} interests and \
         {HIGHLIGHT_LIMIT} highlights per entry"
    );

    Ok(SELECTOR_PROMPT_TEMPLATE
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
        .replace("{focus_json}", &focus_json)
        .replace("{profile_json}", &profile_json)
        .replace("{components_json}", &components_json)
        .replace("{limits}", &limits)
        .replace("{jd_text}", job_description.trim()))
}

// ────────────────────────────────────────────────────────────────────────────
// Post-parse bounding
// ────────────────────────────────────────────────────────────────────────────

fn bound_content(raw: CvContent, components: &[Component]) -> CvContent {
    let sources: HashMap<Uuid, &Component> = components.iter().map(|c| (c.id, c)).collect();

    let experiences = keep_grounded(raw.experiences, &sources, Category::Experience, |e| e.component_id)
        .into_iter()
        .take(EXPERIENCE_LIMIT)
        .map(|(mut entry, source)| {
            entry.organization = source.organization.clone().or(entry.organization);
            entry.start_date = source.start_date;
            entry.end_date = source.end_date;
            entry.highlights = bound_list(entry.highlights, HIGHLIGHT_LIMIT);
            entry
        })
        .collect();

    let education = keep_grounded(raw.education, &sources, Category::Education, |e| e.component_id)
        .into_iter()
        .take(EDUCATION_LIMIT)
        .map(|(mut entry, source)| {
            entry.institution = source.organization.clone().or(entry.institution);
            entry.start_date = source.start_date;
            entry.end_date = source.end_date;
            entry
        })
        .collect();

    let projects = keep_grounded(raw.projects, &sources, Category::Project, |p| p.component_id)
        .into_iter()
        .take(PROJECT_LIMIT)
        .map(|(mut entry, _)| {
            entry.highlights = bound_list(entry.highlights, HIGHLIGHT_LIMIT);
            entry.technologies = bound_list(entry.technologies, TECHNICAL_SKILL_LIMIT);
            entry
        })
        .collect();

    CvContent {
        experiences,
        education,
        projects,
        skills: CvSkills {
            technical: bound_list(raw.skills.technical, TECHNICAL_SKILL_LIMIT),
            languages: bound_list(raw.skills.languages, LANGUAGE_LIMIT),
            interests: bound_list(raw.skills.interests, INTEREST_LIMIT),
        },
    }
}

/// Keeps entries that cite an offered component of the expected category, once each.
fn keep_grounded<'a, T>(
    entries: Vec<T>,
    sources: &HashMap<Uuid, &'a Component>,
    category: Category,
    id_of: impl Fn(&T) -> Uuid,
) -> Vec<(T, &'a Component)> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter_map(|entry| {
            let id = id_of(&entry);
            let Some(source) = sources.get(&id).copied() else {
                warn!("Dropping {} entry citing unknown component {id}", category.label());
                return None;
            };
            if source.category() != Some(category) {
                warn!(
                    "Dropping {} entry citing {} component {id}",
                    category.label(),
                    source.kind.type_str()
                );
                return None;
            }
            seen.insert(id).then_some((entry, source))
        })
        .collect()
}

/// Trims, drops blanks and case-insensitive duplicates, then truncates.
fn bound_list(items: Vec<String>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(dedupe_key(s)))
        .take(limit)
        .collect()
}

fn dedupe_key(item: &str) -> String {
    let key = normalize_skill(item);
    if key.is_empty() {
        item.to_lowercase()
    } else {
        key
    }
}
