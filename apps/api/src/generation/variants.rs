//! CV Variant Generator: one selection per focus area, each scored on what it selected.
//!
//! Variants never touch the source components. They only reference them by id
//! (skills by name).

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::focus::{distinct, guidance, FocusArea};
use crate::generation::selector::{ComponentSelector, CvContent, Selection};
use crate::matching::missing_skills::normalize_skill;
use crate::matching::scoring::{score_categories, ScoreBreakdown, ScoringConfig};
use crate::models::component::{Category, Component, RankedComponent};
use crate::models::profile::Profile;

/// Share of a category weight that counts as a strength.
const STRONG_RATIO: f64 = 0.9;
/// Share of a category weight below which the category counts as a weakness.
const WEAK_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectedComponents {
    pub experience: Vec<Uuid>,
    pub education: Vec<Uuid>,
    pub skills: Vec<String>,
    pub projects: Vec<Uuid>,
}

impl SelectedComponents {
    fn from_content(content: &CvContent) -> Self {
        Self {
            experience: content.experiences.iter().map(|e| e.component_id).collect(),
            education: content.education.iter().map(|e| e.component_id).collect(),
            skills: content.skills.technical.clone(),
            projects: content.projects.iter().map(|p| p.component_id).collect(),
        }
    }

    /// Number of selected entries across all sections.
    pub fn breadth(&self) -> usize {
        self.experience.len() + self.education.len() + self.skills.len() + self.projects.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvVariant {
    pub id: Uuid,
    pub title: String,
    pub focus_area: FocusArea,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub selected_components: SelectedComponents,
    pub content: CvContent,
    pub professional_summary: String,
    pub strength_areas: Vec<String>,
    pub weakness_areas: Vec<String>,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantComparison {
    pub variant_id: Uuid,
    pub focus_area: FocusArea,
    pub score: f64,
    /// 1 for the recommended variant.
    pub rank: usize,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantRecommendation {
    pub recommended: Uuid,
    pub recommended_focus: FocusArea,
    /// Every variant, best first.
    pub comparisons: Vec<VariantComparison>,
}

#[derive(Clone)]
pub struct VariantGenerator {
    selector: ComponentSelector,
    scoring: ScoringConfig,
}

impl VariantGenerator {
    pub fn new(selector: ComponentSelector, scoring: ScoringConfig) -> Self {
        Self { selector, scoring }
    }

    /// One variant per distinct focus area, in the order requested.
    pub async fn generate_variants(
        &self,
        candidates: &[RankedComponent],
        job_description: &str,
        profile: &Profile,
        focus_areas: &[FocusArea],
    ) -> Result<Vec<CvVariant>, AppError> {
        let focus_areas = distinct(focus_areas);
        if focus_areas.is_empty() {
            return Err(AppError::Validation(
                "at least one focus area is required".to_string(),
            ));
        }

        let components: Vec<Component> = candidates.iter().map(|r| r.component.clone()).collect();
        let mut variants = Vec::with_capacity(focus_areas.len());

        for focus in focus_areas {
            let selection = self
                .selector
                .select(&components, job_description, profile, focus)
                .await?;
            let variant = self.build_variant(focus, selection, candidates);
            info!(
                "Variant {} scored {:.2} with {} entries",
                focus,
                variant.score,
                variant.selected_components.breadth()
            );
            variants.push(variant);
        }

        Ok(variants)
    }

    fn build_variant(
        &self,
        focus: FocusArea,
        selection: Selection,
        candidates: &[RankedComponent],
    ) -> CvVariant {
        let selected = SelectedComponents::from_content(&selection.content);
        let subset = selected_subset(&selected, candidates);
        let (breakdown, _) = score_categories(&subset, &self.scoring);

        CvVariant {
            id: Uuid::new_v4(),
            title: format!("{focus} CV"),
            focus_area: focus,
            score: breakdown.total(),
            breakdown,
            selected_components: selected,
            content: selection.content,
            professional_summary: selection.insights.professional_summary,
            strength_areas: selection.insights.strength_areas,
            weakness_areas: selection.insights.weakness_areas,
            reasoning: selection.insights.reasoning,
        }
    }

    /// Ranks variants by score, then breadth, then focus-area order.
    pub fn recommend(&self, variants: &[CvVariant]) -> Result<VariantRecommendation, AppError> {
        let mut ranked: Vec<&CvVariant> = variants.iter().collect();
        ranked.sort_by(|a, b| compare_variants(a, b));

        let best = ranked
            .first()
            .copied()
            .ok_or_else(|| AppError::Validation("no variants to compare".to_string()))?;

        let comparisons = ranked
            .iter()
            .enumerate()
            .map(|(i, variant)| VariantComparison {
                variant_id: variant.id,
                focus_area: variant.focus_area,
                score: variant.score,
                rank: i + 1,
                pros: self.pros(variant, best),
                cons: self.cons(variant, best),
            })
            .collect();

        Ok(VariantRecommendation {
            recommended: best.id,
            recommended_focus: best.focus_area,
            comparisons,
        })
    }

    fn pros(&self, variant: &CvVariant, best: &CvVariant) -> Vec<String> {
        let mut pros = vec![format!("Emphasises {}", guidance(variant.focus_area).emphasis)];
        if variant.id == best.id {
            pros.push(format!("Highest overall score ({:.1})", variant.score));
        }
        for category in Category::ALL {
            let weight = self.scoring.weights.get(category);
            let value = variant.breakdown.get(category);
            if weight > 0.0 && value >= weight * STRONG_RATIO {
                pros.push(format!(
                    "Strong {} coverage ({value:.1}/{weight:.0})",
                    category.label()
                ));
            }
        }
        pros
    }

    fn cons(&self, variant: &CvVariant, best: &CvVariant) -> Vec<String> {
        let mut cons = Vec::new();
        if variant.id != best.id {
            cons.push(format!(
                "Scores {:.1} points below the recommended variant",
                best.score - variant.score
            ));
        }
        for category in Category::ALL {
            let weight = self.scoring.weights.get(category);
            let value = variant.breakdown.get(category);
            if weight > 0.0 && value < weight * WEAK_RATIO {
                cons.push(format!(
                    "Weak {} coverage ({value:.1}/{weight:.0})",
                    category.label()
                ));
            }
        }
        cons
    }
}

fn compare_variants(a: &CvVariant, b: &CvVariant) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            b.selected_components
                .breadth()
                .cmp(&a.selected_components.breadth())
        })
        .then_with(|| a.focus_area.rank().cmp(&b.focus_area.rank()))
}

/// Candidates referenced by the selection. Skills match skill components by name;
/// a skill name with no backing component does not count.
fn selected_subset(
    selected: &SelectedComponents,
    candidates: &[RankedComponent],
) -> Vec<RankedComponent> {
    let ids: HashSet<Uuid> = selected
        .experience
        .iter()
        .chain(&selected.education)
        .chain(&selected.projects)
        .copied()
        .collect();
    let mut skill_names: HashSet<String> =
        selected.skills.iter().map(|s| normalize_skill(s)).collect();

    candidates
        .iter()
        .filter(|r| {
            if ids.contains(&r.component.id) {
                return true;
            }
            r.component.category() == Some(Category::Skill)
                && skill_names.remove(&normalize_skill(&r.component.title))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{education, experience, skill, ScriptedGenerator};
    use serde_json::json;
    use std::sync::Arc;

    fn candidates(owner: Uuid) -> Vec<RankedComponent> {
        vec![
            experience(owner, "Engineering Manager", "Acme"),
            experience(owner, "Staff Engineer", "Globex"),
            education(owner, "BSc Computer Science", "TU Berlin"),
            skill(owner, "Rust"),
            skill(owner, "Kubernetes"),
        ]
        .into_iter()
        .map(RankedComponent::unranked)
        .collect()
    }

    /// Technical focus picks everything, leadership only the manager role.
    fn scripted(candidates: &[RankedComponent]) -> Arc<ScriptedGenerator> {
        let manager = candidates[0].component.id;
        let staff = candidates[1].component.id;
        let degree = candidates[2].component.id;
        Arc::new(ScriptedGenerator::from_fn(move |prompt| {
            let body = if prompt.contains("\"leadership\"") {
                json!({
                    "experiences": [{"component_id": manager, "title": "Engineering Manager"}],
                    "professional_summary": "People leader.",
                    "strength_areas": ["Mentoring"]
                })
            } else {
                json!({
                    "experiences": [
                        {"component_id": staff, "title": "Staff Engineer"},
                        {"component_id": manager, "title": "Engineering Manager"}
                    ],
                    "education": [{"component_id": degree, "degree": "BSc Computer Science"}],
                    "skills": {"technical": ["rust", "Kubernetes", "Haskell"]}
                })
            };
            Ok(body.to_string())
        }))
    }

    fn generator(llm: Arc<ScriptedGenerator>) -> VariantGenerator {
        VariantGenerator::new(ComponentSelector::new(llm), ScoringConfig::default())
    }

    #[tokio::test]
    async fn test_one_variant_per_distinct_focus() {
        let owner = Uuid::new_v4();
        let candidates = candidates(owner);
        let llm = scripted(&candidates);
        let generator = generator(llm.clone());

        let variants = generator
            .generate_variants(
                &candidates,
                "Engineering lead",
                &Profile::default(),
                &[FocusArea::Technical, FocusArea::Leadership, FocusArea::Technical],
            )
            .await
            .unwrap();

        assert_eq!(variants.len(), 2);
        assert_eq!(llm.calls(), 2);
        assert_eq!(variants[0].focus_area, FocusArea::Technical);
        assert_eq!(variants[1].focus_area, FocusArea::Leadership);
        assert_eq!(variants[1].title, "Leadership CV");
        assert_eq!(variants[1].professional_summary, "People leader.");
        assert_ne!(variants[0].id, variants[1].id);
    }

    #[tokio::test]
    async fn test_variant_is_scored_on_its_own_selection() {
        let owner = Uuid::new_v4();
        let candidates = candidates(owner);
        let generator = generator(scripted(&candidates));

        let variants = generator
            .generate_variants(
                &candidates,
                "Engineering lead",
                &Profile::default(),
                &[FocusArea::Technical, FocusArea::Leadership],
            )
            .await
            .unwrap();

        let technical = &variants[0];
        let leadership = &variants[1];
        assert!(technical.score > leadership.score);
        assert_eq!(leadership.breakdown.education_match, 0.0);
        assert_eq!(leadership.breakdown.skills_match, 0.0);
        // "Haskell" has no backing component: listed but not scored.
        assert_eq!(technical.selected_components.skills.len(), 3);
        assert_eq!(technical.selected_components.breadth(), 6);
        let (expected, _) = score_categories(&candidates, &ScoringConfig::default());
        assert_eq!(technical.breakdown, expected);
    }

    #[tokio::test]
    async fn test_empty_focus_list_is_rejected() {
        let owner = Uuid::new_v4();
        let candidates = candidates(owner);
        let llm = scripted(&candidates);
        let err = generator(llm.clone())
            .generate_variants(&candidates, "jd", &Profile::default(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_recommend_ranks_and_explains_every_variant() {
        let owner = Uuid::new_v4();
        let candidates = candidates(owner);
        let generator = generator(scripted(&candidates));
        let variants = generator
            .generate_variants(
                &candidates,
                "Engineering lead",
                &Profile::default(),
                &[FocusArea::Leadership, FocusArea::Technical],
            )
            .await
            .unwrap();

        let recommendation = generator.recommend(&variants).unwrap();

        assert_eq!(recommendation.recommended_focus, FocusArea::Technical);
        assert_eq!(recommendation.comparisons.len(), 2);
        assert_eq!(recommendation.comparisons[0].rank, 1);
        assert_eq!(recommendation.comparisons[1].focus_area, FocusArea::Leadership);
        for comparison in &recommendation.comparisons {
            assert!(!comparison.pros.is_empty());
        }
        assert!(recommendation.comparisons[1]
            .cons
            .iter()
            .any(|c| c.contains("below the recommended")));
    }

    fn variant(focus: FocusArea, score: f64, breadth: usize) -> CvVariant {
        CvVariant {
            id: Uuid::new_v4(),
            title: format!("{focus} CV"),
            focus_area: focus,
            score,
            breakdown: ScoreBreakdown::default(),
            selected_components: SelectedComponents {
                skills: (0..breadth).map(|i| format!("Skill{i}")).collect(),
                ..SelectedComponents::default()
            },
            content: CvContent::default(),
            professional_summary: String::new(),
            strength_areas: vec![],
            weakness_areas: vec![],
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_ties_break_on_breadth_then_focus_order() {
        let generator = generator(Arc::new(ScriptedGenerator::always("{}")));

        let narrow = variant(FocusArea::Technical, 70.0, 2);
        let broad = variant(FocusArea::Impact, 70.0, 5);
        let recommendation = generator.recommend(&[narrow, broad.clone()]).unwrap();
        assert_eq!(recommendation.recommended, broad.id);

        let balanced = variant(FocusArea::Balanced, 70.0, 3);
        let leadership = variant(FocusArea::Leadership, 70.0, 3);
        let recommendation = generator
            .recommend(&[balanced, leadership.clone()])
            .unwrap();
        assert_eq!(recommendation.recommended, leadership.id);
    }

    #[test]
    fn test_recommend_needs_variants() {
        let generator = generator(Arc::new(ScriptedGenerator::always("{}")));
        assert!(matches!(
            generator.recommend(&[]),
            Err(AppError::Validation(_))
        ));
    }
}
