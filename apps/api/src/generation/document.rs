//! The hand-off to the external renderer. Nothing here knows about PDF or LaTeX.

use serde::{Deserialize, Serialize};

use crate::generation::selector::{CvContent, CvEducation, CvExperience, CvProject, CvSkills};
use crate::models::profile::Profile;

const DEFAULT_MARGIN_INCHES: f32 = 0.75;

/// Page margins in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: DEFAULT_MARGIN_INCHES,
            right: DEFAULT_MARGIN_INCHES,
            bottom: DEFAULT_MARGIN_INCHES,
            left: DEFAULT_MARGIN_INCHES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentProfile {
    pub name: String,
    pub profession: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub summary: Option<String>,
    pub links: Vec<String>,
}

/// Everything the renderer needs for one CV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvDocument {
    pub profile: DocumentProfile,
    pub experience: Vec<CvExperience>,
    pub education: Vec<CvEducation>,
    pub skills: CvSkills,
    pub projects: Vec<CvProject>,
    pub margins: Margins,
}

pub fn build_document(profile: &Profile, content: CvContent) -> CvDocument {
    CvDocument {
        profile: DocumentProfile {
            name: profile.display_name().to_string(),
            profession: profile.display_profession().to_string(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            location: profile.location.clone(),
            summary: profile
                .summary
                .clone()
                .filter(|s| !s.trim().is_empty()),
            links: profile.links.clone(),
        },
        experience: content.experiences,
        education: content.education,
        skills: content.skills,
        projects: content.projects,
        margins: Margins::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::profile;
    use uuid::Uuid;

    #[test]
    fn test_defaults_for_missing_profile() {
        let document = build_document(&Profile::default(), CvContent::default());
        assert_eq!(document.profile.name, "Candidate");
        assert_eq!(document.profile.profession, "Professional");
        assert_eq!(document.margins, Margins::default());
        assert_eq!(document.margins.left, 0.75);
        assert!(document.experience.is_empty());
    }

    #[test]
    fn test_content_is_carried_over() {
        let id = Uuid::new_v4();
        let content = CvContent {
            experiences: vec![CvExperience {
                component_id: id,
                title: "Backend Engineer".to_string(),
                organization: Some("Acme".to_string()),
                start_date: None,
                end_date: None,
                highlights: vec!["Shipped billing".to_string()],
            }],
            ..CvContent::default()
        };
        let document = build_document(&profile("Ada Lovelace", "Engineer"), content);
        assert_eq!(document.profile.name, "Ada Lovelace");
        assert_eq!(document.experience[0].component_id, id);

        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["margins"]["top"], 0.75);
        assert_eq!(json["experience"][0]["organization"], "Acme");
    }
}
