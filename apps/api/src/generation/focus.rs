//! Focus calibration: maps a CV focus area to emphasis, verbs and phrasing to avoid.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The angle a CV variant is written from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusArea {
    Technical,
    Leadership,
    Impact,
    Innovation,
    #[serde(alias = "default")]
    Balanced,
}

impl FocusArea {
    /// Declaration order; breaks recommendation ties.
    pub const ALL: [FocusArea; 5] = [
        FocusArea::Technical,
        FocusArea::Leadership,
        FocusArea::Impact,
        FocusArea::Innovation,
        FocusArea::Balanced,
    ];

    pub fn rank(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(Self::ALL.len())
    }

    pub fn title(self) -> &'static str {
        match self {
            FocusArea::Technical => "Technical",
            FocusArea::Leadership => "Leadership",
            FocusArea::Impact => "Impact",
            FocusArea::Innovation => "Innovation",
            FocusArea::Balanced => "Balanced",
        }
    }
}

impl fmt::Display for FocusArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Writing guidance for one focus area.
#[derive(Debug, Clone, Serialize)]
pub struct FocusGuidance {
    pub emphasis: &'static str,
    pub preferred_verbs: Vec<&'static str>,
    pub avoid_phrasing: Vec<&'static str>,
}

pub fn guidance(focus: FocusArea) -> FocusGuidance {
    match focus {
        FocusArea::Technical => FocusGuidance {
            emphasis: "technical depth: languages, systems, architecture and tooling",
            preferred_verbs: vec!["Built", "Designed", "Implemented", "Optimized", "Migrated"],
            avoid_phrasing: vec!["people skills", "synergy", "stakeholder alignment"],
        },
        FocusArea::Leadership => FocusGuidance {
            emphasis: "ownership, mentoring and leading people or initiatives",
            preferred_verbs: vec!["Led", "Mentored", "Coordinated", "Hired", "Guided"],
            avoid_phrasing: vec!["assisted", "helped with", "was involved in"],
        },
        FocusArea::Impact => FocusGuidance {
            emphasis: "measurable outcomes: revenue, latency, cost, adoption",
            preferred_verbs: vec!["Increased", "Reduced", "Delivered", "Grew", "Saved"],
            avoid_phrasing: vec!["responsible for", "worked on", "duties included"],
        },
        FocusArea::Innovation => FocusGuidance {
            emphasis: "new products, research, prototypes and first-of-their-kind work",
            preferred_verbs: vec!["Pioneered", "Prototyped", "Launched", "Invented", "Introduced"],
            avoid_phrasing: vec!["maintained", "supported", "routine"],
        },
        FocusArea::Balanced => FocusGuidance {
            emphasis: "an even mix of technical skill, leadership and results",
            preferred_verbs: vec!["Built", "Led", "Delivered", "Improved", "Shipped"],
            avoid_phrasing: vec!["responsible for", "helped with"],
        },
    }
}

/// De-duplicates while keeping the caller's order.
pub fn distinct(focus_areas: &[FocusArea]) -> Vec<FocusArea> {
    let mut seen = Vec::with_capacity(focus_areas.len());
    for focus in focus_areas {
        if !seen.contains(focus) {
            seen.push(*focus);
        }
    }
    seen
}
