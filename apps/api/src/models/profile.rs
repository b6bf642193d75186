use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Placeholder used in prompts and documents when the owner never set a name.
pub const DEFAULT_CANDIDATE_NAME: &str = "Candidate";
const DEFAULT_PROFESSION: &str = "Professional";

/// Owner profile as provided by the profile store. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub full_name: Option<String>,
    pub profession: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        non_blank(self.full_name.as_deref()).unwrap_or(DEFAULT_CANDIDATE_NAME)
    }

    pub fn display_profession(&self) -> &str {
        non_blank(self.profession.as_deref()).unwrap_or(DEFAULT_PROFESSION)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
