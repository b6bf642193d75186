//! Category scorer: four capped category contributions that sum to the match score.
//!
//! Per category:
//! 1. `effective = Σ credit(similarity)`; `credit(s) = 0.5 + 0.5 × min(s / 0.3, 1)`
//!    for a known similarity, `1.0` when the component came without one. Cosine
//!    similarity between a job description and a CV fragment rarely climbs far
//!    above 0.3, so anything at or past it counts as a full component
//! 2. `coverage = min(effective / saturation, 1)`
//! 3. `contribution = weight × (1 − (1 − coverage)²)`, rounded to 2 decimals
//!
//! More components and closer components both raise a category, with diminishing
//! returns, and nothing ever exceeds the category weight.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::component::{Category, RankedComponent};

const NEUTRAL_CREDIT: f64 = 1.0;
const MIN_CREDIT: f64 = 0.5;
/// Similarity at which a component earns full credit.
const STRONG_SIMILARITY: f64 = 0.3;
const TOTAL_POINTS: f64 = 100.0;

/// Maximum points per category. Must sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub experience: f64,
    pub skills: f64,
    pub education: f64,
    pub projects: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            experience: 40.0,
            skills: 30.0,
            education: 20.0,
            projects: 10.0,
        }
    }
}

impl CategoryWeights {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Experience => self.experience,
            Category::Skill => self.skills,
            Category::Education => self.education,
            Category::Project => self.projects,
        }
    }

    /// Parses `experience=40,skills=30,education=20,projects=10`.
    pub fn parse(raw: &str) -> Result<Self> {
        let values = parse_category_values(raw)?;
        let weights = Self {
            experience: values.get(Category::Experience)?,
            skills: values.get(Category::Skill)?,
            education: values.get(Category::Education)?,
            projects: values.get(Category::Project)?,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<()> {
        let all = [self.experience, self.skills, self.education, self.projects];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            bail!("category weights must be non-negative numbers");
        }
        let sum: f64 = all.iter().sum();
        if (sum - TOTAL_POINTS).abs() > 1e-6 {
            bail!("category weights must sum to 100, got {sum}");
        }
        Ok(())
    }
}

/// Count-equivalent at which a category is fully covered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaturationPoints {
    pub experience: f64,
    pub skills: f64,
    pub education: f64,
    pub projects: f64,
}

impl Default for SaturationPoints {
    fn default() -> Self {
        Self {
            experience: 4.0,
            skills: 15.0,
            education: 2.0,
            projects: 3.0,
        }
    }
}

impl SaturationPoints {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Experience => self.experience,
            Category::Skill => self.skills,
            Category::Education => self.education,
            Category::Project => self.projects,
        }
    }

    /// Parses `experience=4,skills=15,education=2,projects=3`.
    pub fn parse(raw: &str) -> Result<Self> {
        let values = parse_category_values(raw)?;
        let points = Self {
            experience: values.get(Category::Experience)?,
            skills: values.get(Category::Skill)?,
            education: values.get(Category::Education)?,
            projects: values.get(Category::Project)?,
        };
        if [points.experience, points.skills, points.education, points.projects]
            .iter()
            .any(|p| !p.is_finite() || *p <= 0.0)
        {
            bail!("saturation points must be positive numbers");
        }
        Ok(points)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: CategoryWeights,
    pub saturation: SaturationPoints,
}

/// Points per category. Each value is at most its weight; the four sum to the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub experience_match: f64,
    pub skills_match: f64,
    pub education_match: f64,
    pub projects_match: f64,
}

impl ScoreBreakdown {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Experience => self.experience_match,
            Category::Skill => self.skills_match,
            Category::Education => self.education_match,
            Category::Project => self.projects_match,
        }
    }

    fn set(&mut self, category: Category, value: f64) {
        match category {
            Category::Experience => self.experience_match = value,
            Category::Skill => self.skills_match = value,
            Category::Education => self.education_match = value,
            Category::Project => self.projects_match = value,
        }
    }

    /// The overall score: the sum of the four capped contributions.
    pub fn total(&self) -> f64 {
        round2(self.experience_match + self.skills_match + self.education_match + self.projects_match)
    }
}

/// Number of components per category in a candidate set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub experience: usize,
    pub skills: usize,
    pub education: usize,
    pub projects: usize,
}

impl CategoryCounts {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Experience => self.experience,
            Category::Skill => self.skills,
            Category::Education => self.education,
            Category::Project => self.projects,
        }
    }

    fn increment(&mut self, category: Category) {
        match category {
            Category::Experience => self.experience += 1,
            Category::Skill => self.skills += 1,
            Category::Education => self.education += 1,
            Category::Project => self.projects += 1,
        }
    }
}

/// Scores a candidate set. Components without a category (job-description kinds) are ignored.
pub fn score_categories(
    candidates: &[RankedComponent],
    config: &ScoringConfig,
) -> (ScoreBreakdown, CategoryCounts) {
    let mut counts = CategoryCounts::default();
    let mut effective = [0.0_f64; 4];

    for ranked in candidates {
        let Some(category) = ranked.component.category() else {
            continue;
        };
        counts.increment(category);
        effective[slot(category)] += relevance_credit(ranked.similarity);
    }

    let mut breakdown = ScoreBreakdown::default();
    for category in Category::ALL {
        let value = category_contribution(
            config.weights.get(category),
            config.saturation.get(category),
            effective[slot(category)],
        );
        breakdown.set(category, value);
    }

    (breakdown, counts)
}

/// Count-equivalent credit of a single component.
fn relevance_credit(similarity: Option<f32>) -> f64 {
    match similarity {
        Some(s) => {
            let strength = (f64::from(s) / STRONG_SIMILARITY).clamp(0.0, 1.0);
            MIN_CREDIT + (NEUTRAL_CREDIT - MIN_CREDIT) * strength
        }
        None => NEUTRAL_CREDIT,
    }
}

fn category_contribution(weight: f64, saturation: f64, effective: f64) -> f64 {
    if weight <= 0.0 || effective <= 0.0 {
        return 0.0;
    }
    let coverage = (effective / saturation.max(f64::EPSILON)).min(1.0);
    let value = weight * (1.0 - (1.0 - coverage).powi(2));
    round2(value).min(weight)
}

fn slot(category: Category) -> usize {
    match category {
        Category::Experience => 0,
        Category::Skill => 1,
        Category::Education => 2,
        Category::Project => 3,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

struct CategoryValues([Option<f64>; 4]);

impl CategoryValues {
    fn get(&self, category: Category) -> Result<f64> {
        self.0[slot(category)].with_context(|| format!("missing value for '{}'", category.label()))
    }
}

fn parse_category_values(raw: &str) -> Result<CategoryValues> {
    let mut values = [None; 4];
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, value) = pair
            .split_once('=')
            .with_context(|| format!("expected name=value, got '{pair}'"))?;
        let category = match name.trim().to_ascii_lowercase().as_str() {
            "experience" => Category::Experience,
            "skills" | "skill" => Category::Skill,
            "education" => Category::Education,
            "projects" | "project" => Category::Project,
            other => bail!("unknown category '{other}'"),
        };
        let value: f64 = value
            .trim()
            .parse()
            .with_context(|| format!("'{value}' is not a number"))?;
        values[slot(category)] = Some(value);
    }
    Ok(CategoryValues(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::component::ComponentKind;
    use crate::testing::{component, education, experience, project, skill};
    use uuid::Uuid;

    fn unranked(components: Vec<crate::models::component::Component>) -> Vec<RankedComponent> {
        components.into_iter().map(RankedComponent::unranked).collect()
    }

    fn assert_invariants(breakdown: &ScoreBreakdown, weights: &CategoryWeights) {
        for category in Category::ALL {
            let value = breakdown.get(category);
            assert!(value >= 0.0, "{} negative: {value}", category.label());
            assert!(
                value <= weights.get(category),
                "{} exceeds weight: {value}",
                category.label()
            );
        }
        let score = breakdown.total();
        assert!((0.0..=100.0).contains(&score));
        let sum = breakdown.experience_match
            + breakdown.skills_match
            + breakdown.education_match
            + breakdown.projects_match;
        assert!((sum - score).abs() < 1e-9);
    }

    #[test]
    fn test_empty_candidates_score_zero() {
        let (breakdown, counts) = score_categories(&[], &ScoringConfig::default());
        assert_eq!(breakdown, ScoreBreakdown::default());
        assert_eq!(breakdown.total(), 0.0);
        assert_eq!(counts, CategoryCounts::default());
    }

    #[test]
    fn test_scenario_three_experience_two_education_five_skills_above_50() {
        let owner = Uuid::new_v4();
        let mut components = vec![
            experience(owner, "Frontend Engineer", "Shopify"),
            experience(owner, "React Developer", "Zalando"),
            experience(owner, "Web Developer", "Agency"),
            education(owner, "BSc Computer Science", "TU Berlin"),
            education(owner, "MSc Software Engineering", "KTH"),
        ];
        for name in ["React", "TypeScript", "Redux", "CSS", "Jest"] {
            components.push(skill(owner, name));
        }
        let config = ScoringConfig::default();
        let (breakdown, counts) = score_categories(&unranked(components), &config);

        assert_eq!(counts.experience, 3);
        assert_eq!(counts.education, 2);
        assert_eq!(counts.skills, 5);
        assert!(breakdown.total() > 50.0, "score was {}", breakdown.total());
        assert_invariants(&breakdown, &config.weights);
    }

    #[test]
    fn test_saturated_categories_hit_their_weight_exactly() {
        let owner = Uuid::new_v4();
        let mut components: Vec<_> = (0..4)
            .map(|i| experience(owner, &format!("Role {i}"), "Org"))
            .collect();
        components.extend((0..2).map(|i| education(owner, &format!("Degree {i}"), "Uni")));
        components.extend((0..15).map(|i| skill(owner, &format!("Skill {i}"))));
        let config = ScoringConfig::default();
        let (breakdown, _) = score_categories(&unranked(components), &config);

        assert_eq!(breakdown.experience_match, 40.0);
        assert_eq!(breakdown.education_match, 20.0);
        assert_eq!(breakdown.skills_match, 30.0);
        assert_eq!(breakdown.projects_match, 0.0);
        assert!(breakdown.total() >= 90.0);
    }

    #[test]
    fn test_maximal_coverage_at_ordinary_similarity_reaches_90() {
        let owner = Uuid::new_v4();
        let mut components: Vec<_> = (0..4)
            .map(|i| experience(owner, &format!("Role {i}"), "Org"))
            .collect();
        components.extend((0..2).map(|i| education(owner, &format!("Degree {i}"), "Uni")));
        components.extend((0..15).map(|i| skill(owner, &format!("Skill {i}"))));
        let candidates: Vec<_> = components
            .into_iter()
            .map(|component| RankedComponent {
                component,
                similarity: Some(0.3),
            })
            .collect();
        let config = ScoringConfig::default();
        let (breakdown, _) = score_categories(&candidates, &config);

        assert_eq!(breakdown.experience_match, 40.0);
        assert_eq!(breakdown.skills_match, 30.0);
        assert_eq!(breakdown.education_match, 20.0);
        assert!(breakdown.total() >= 90.0, "score was {}", breakdown.total());
        assert_invariants(&breakdown, &config.weights);
    }

    #[test]
    fn test_weak_similarity_earns_partial_credit() {
        let owner = Uuid::new_v4();
        let config = ScoringConfig::default();
        let at = |similarity: f32| {
            let candidates: Vec<_> = (0..4)
                .map(|i| RankedComponent {
                    component: experience(owner, &format!("Role {i}"), "Org"),
                    similarity: Some(similarity),
                })
                .collect();
            score_categories(&candidates, &config).0.experience_match
        };
        // 4 × 0.75 credit = coverage 0.75
        assert_eq!(at(0.15), 37.5);
        assert_eq!(at(0.0), 30.0);
        assert_eq!(at(0.9), 40.0);
    }

    #[test]
    fn test_never_exceeds_weight_with_many_high_similarity_components() {
        let owner = Uuid::new_v4();
        let candidates: Vec<_> = (0..40)
            .map(|i| RankedComponent {
                component: experience(owner, &format!("Role {i}"), "Org"),
                similarity: Some(1.0),
            })
            .collect();
        let config = ScoringConfig::default();
        let (breakdown, _) = score_categories(&candidates, &config);
        assert_eq!(breakdown.experience_match, 40.0);
        assert_invariants(&breakdown, &config.weights);
    }

    #[test]
    fn test_monotonic_in_count_with_diminishing_returns() {
        let owner = Uuid::new_v4();
        let config = ScoringConfig::default();
        let mut previous = 0.0;
        let mut previous_gain = f64::MAX;
        for n in 1..=4 {
            let candidates = unranked(
                (0..n)
                    .map(|i| experience(owner, &format!("Role {i}"), "Org"))
                    .collect(),
            );
            let value = score_categories(&candidates, &config).0.experience_match;
            let gain = value - previous;
            assert!(value > previous, "not monotonic at n={n}");
            assert!(gain <= previous_gain + 1e-9, "gain grew at n={n}");
            previous = value;
            previous_gain = gain;
        }
    }

    #[test]
    fn test_higher_similarity_scores_higher() {
        let owner = Uuid::new_v4();
        let config = ScoringConfig::default();
        let low = vec![RankedComponent {
            component: skill(owner, "React"),
            similarity: Some(0.1),
        }];
        let high = vec![RankedComponent {
            component: skill(owner, "React"),
            similarity: Some(0.9),
        }];
        assert!(
            score_categories(&high, &config).0.skills_match
                > score_categories(&low, &config).0.skills_match
        );
    }

    #[test]
    fn test_jd_components_are_not_counted() {
        let owner = Uuid::new_v4();
        let candidates = unranked(vec![component(
            owner,
            ComponentKind::JdSkill {
                name: Some("Rust".to_string()),
                level: None,
                required: true,
            },
            "Rust",
        )]);
        let (breakdown, counts) = score_categories(&candidates, &ScoringConfig::default());
        assert_eq!(breakdown.total(), 0.0);
        assert_eq!(counts, CategoryCounts::default());
    }

    #[test]
    fn test_zero_weight_category_contributes_nothing() {
        let owner = Uuid::new_v4();
        let config = ScoringConfig {
            weights: CategoryWeights {
                experience: 40.0,
                skills: 30.0,
                education: 30.0,
                projects: 0.0,
            },
            ..ScoringConfig::default()
        };
        let candidates = unranked(vec![project(owner, "Compiler"), project(owner, "Game")]);
        let (breakdown, counts) = score_categories(&candidates, &config);
        assert_eq!(counts.projects, 2);
        assert_eq!(breakdown.projects_match, 0.0);
    }

    #[test]
    fn test_parse_weights() {
        let weights =
            CategoryWeights::parse("experience=40, skills=30, education=30, projects=0").unwrap();
        assert_eq!(weights.education, 30.0);
        assert_eq!(weights.projects, 0.0);
    }

    #[test]
    fn test_parse_weights_rejects_bad_sum_and_missing_keys() {
        assert!(CategoryWeights::parse("experience=50,skills=30,education=20,projects=10").is_err());
        assert!(CategoryWeights::parse("experience=70,skills=30").is_err());
        assert!(CategoryWeights::parse("experience=40,skills=30,education=20,hobbies=10").is_err());
    }

    #[test]
    fn test_parse_saturation_requires_positive() {
        assert!(SaturationPoints::parse("experience=4,skills=15,education=2,projects=0").is_err());
        let points = SaturationPoints::parse("experience=3,skills=10,education=1,projects=2").unwrap();
        assert_eq!(points.skills, 10.0);
    }
}
