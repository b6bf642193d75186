use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

/// Dimensionality of every stored component embedding.
pub const EMBEDDING_DIMENSIONS: usize = 768;

/// Scoring category a component contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Experience,
    Education,
    Skill,
    Project,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Experience,
        Category::Skill,
        Category::Education,
        Category::Project,
    ];

    /// Section name used in breakdowns and suggestions.
    pub fn label(self) -> &'static str {
        match self {
            Category::Experience => "experience",
            Category::Education => "education",
            Category::Skill => "skills",
            Category::Project => "projects",
        }
    }

    /// Singular noun for one entry of this category.
    pub fn noun(self) -> &'static str {
        match self {
            Category::Experience => "work experience entry",
            Category::Education => "education entry",
            Category::Skill => "skill",
            Category::Project => "project",
        }
    }
}

/// Component sub-type with its sub-type specific fields.
///
/// Serialized with a `type` tag (`experience`, `linkedin_education`, `jd_skill`, ...).
/// Tags outside this enum are rejected when decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentKind {
    Experience {
        #[serde(default)]
        location: Option<String>,
    },
    Education {
        #[serde(default)]
        degree: Option<String>,
        #[serde(default)]
        field_of_study: Option<String>,
    },
    Skill {
        #[serde(default)]
        level: Option<String>,
        #[serde(default)]
        skill_category: Option<String>,
    },
    Project {
        #[serde(default)]
        technologies: Vec<String>,
        #[serde(default)]
        url: Option<String>,
    },
    LinkedinExperience {
        #[serde(default)]
        location: Option<String>,
        #[serde(default)]
        employment_type: Option<String>,
    },
    LinkedinEducation {
        #[serde(default)]
        degree: Option<String>,
        #[serde(default)]
        field: Option<String>,
        #[serde(default)]
        school: Option<String>,
    },
    LinkedinSkill {
        #[serde(default)]
        endorsements: Option<u32>,
    },
    GithubRepository {
        #[serde(default)]
        language: Option<String>,
        #[serde(default)]
        topics: Vec<String>,
        #[serde(default)]
        stars: Option<u32>,
    },
    YoutubeVideo {
        #[serde(default)]
        channel: Option<String>,
        #[serde(default)]
        tags: Vec<String>,
    },
    JdSkill {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        level: Option<String>,
        #[serde(default)]
        required: bool,
    },
    JdRequirement {
        #[serde(default)]
        requirement: Option<String>,
    },
    JdMetadata {
        #[serde(default)]
        company: Option<String>,
        #[serde(default)]
        location: Option<String>,
    },
}

impl ComponentKind {
    /// The `type` tag as stored.
    pub fn type_str(&self) -> &'static str {
        match self {
            ComponentKind::Experience { .. } => "experience",
            ComponentKind::Education { .. } => "education",
            ComponentKind::Skill { .. } => "skill",
            ComponentKind::Project { .. } => "project",
            ComponentKind::LinkedinExperience { .. } => "linkedin_experience",
            ComponentKind::LinkedinEducation { .. } => "linkedin_education",
            ComponentKind::LinkedinSkill { .. } => "linkedin_skill",
            ComponentKind::GithubRepository { .. } => "github_repository",
            ComponentKind::YoutubeVideo { .. } => "youtube_video",
            ComponentKind::JdSkill { .. } => "jd_skill",
            ComponentKind::JdRequirement { .. } => "jd_requirement",
            ComponentKind::JdMetadata { .. } => "jd_metadata",
        }
    }

    /// Scoring category, or `None` for job-description derived kinds.
    pub fn category(&self) -> Option<Category> {
        match self {
            ComponentKind::Experience { .. } | ComponentKind::LinkedinExperience { .. } => {
                Some(Category::Experience)
            }
            ComponentKind::Education { .. } | ComponentKind::LinkedinEducation { .. } => {
                Some(Category::Education)
            }
            ComponentKind::Skill { .. } | ComponentKind::LinkedinSkill { .. } => {
                Some(Category::Skill)
            }
            ComponentKind::Project { .. }
            | ComponentKind::GithubRepository { .. }
            | ComponentKind::YoutubeVideo { .. } => Some(Category::Project),
            ComponentKind::JdSkill { .. }
            | ComponentKind::JdRequirement { .. }
            | ComponentKind::JdMetadata { .. } => None,
        }
    }
}

/// A reusable CV building block owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[serde(flatten)]
    pub kind: ComponentKind,
    pub title: String,
    pub organization: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Valid only for the text it was computed from; cleared on every text edit.
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
}

impl Component {
    pub fn category(&self) -> Option<Category> {
        self.kind.category()
    }
}

/// A component together with its similarity to a query.
///
/// `similarity` is `None` when the component was returned without a similarity
/// computation (fallback retrieval).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedComponent {
    pub component: Component,
    pub similarity: Option<f32>,
}

impl RankedComponent {
    pub fn unranked(component: Component) -> Self {
        Self {
            component,
            similarity: None,
        }
    }
}

/// Editable text of a component. Writing it invalidates the stored embedding.
#[derive(Debug, Clone, Default)]
pub struct ComponentText {
    pub title: String,
    pub description: Option<String>,
    pub highlights: Vec<String>,
}

/// Raw `components` table row.
#[derive(Debug, Clone, FromRow)]
pub struct ComponentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub component_type: String,
    pub title: String,
    pub organization: Option<String>,
    pub description: Option<String>,
    pub highlights: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub details: Value,
    pub embedding: Option<pgvector::Vector>,
}

impl TryFrom<ComponentRow> for Component {
    type Error = AppError;

    /// Decodes a row. Unknown `component_type` values are an error, never an empty component.
    fn try_from(row: ComponentRow) -> Result<Self, Self::Error> {
        let mut tagged = match row.details {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(AppError::Validation(format!(
                    "component {} has non-object details: {other}",
                    row.id
                )))
            }
        };
        tagged.insert("type".to_string(), Value::String(row.component_type.clone()));

        let kind: ComponentKind = serde_json::from_value(Value::Object(tagged)).map_err(|e| {
            AppError::Validation(format!(
                "component {} has unsupported type '{}': {e}",
                row.id, row.component_type
            ))
        })?;

        Ok(Component {
            id: row.id,
            owner_id: row.user_id,
            kind,
            title: row.title,
            organization: row.organization,
            description: row.description,
            highlights: row.highlights,
            start_date: row.start_date,
            end_date: row.end_date,
            embedding: row.embedding.map(|v| v.to_vec()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(component_type: &str, details: Value) -> ComponentRow {
        ComponentRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            component_type: component_type.to_string(),
            title: "Title".to_string(),
            organization: None,
            description: None,
            highlights: vec![],
            start_date: None,
            end_date: None,
            details,
            embedding: None,
        }
    }

    #[test]
    fn test_row_decodes_provider_subtype() {
        let component = Component::try_from(row(
            "linkedin_education",
            json!({"degree": "BSc", "field": "Physics", "school": "ETH"}),
        ))
        .unwrap();
        assert_eq!(
            component.kind,
            ComponentKind::LinkedinEducation {
                degree: Some("BSc".to_string()),
                field: Some("Physics".to_string()),
                school: Some("ETH".to_string()),
            }
        );
        assert_eq!(component.category(), Some(Category::Education));
    }

    #[test]
    fn test_row_with_null_details_uses_defaults() {
        let component = Component::try_from(row("jd_skill", Value::Null)).unwrap();
        assert_eq!(
            component.kind,
            ComponentKind::JdSkill {
                name: None,
                level: None,
                required: false
            }
        );
        assert_eq!(component.category(), None);
    }

    #[test]
    fn test_unknown_type_fails_loudly() {
        let err = Component::try_from(row("tiktok_post", json!({}))).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("tiktok_post")));
    }

    #[test]
    fn test_type_str_matches_serde_tag() {
        let kind = ComponentKind::GithubRepository {
            language: Some("Rust".to_string()),
            topics: vec![],
            stars: None,
        };
        let value = serde_json::to_value(&kind).unwrap();
        assert_eq!(value["type"], kind.type_str());
    }
}
