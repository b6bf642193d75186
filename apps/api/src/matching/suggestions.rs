//! Suggestion generator: turns score gaps and missing skills into advice.

use crate::matching::scoring::{CategoryCounts, CategoryWeights, ScoreBreakdown};
use crate::models::component::Category;

/// Below this share of the weight a category counts as thin.
const THIN_RATIO: f64 = 0.5;
/// At or above this share of the weight a category needs no advice.
const SATURATED_RATIO: f64 = 0.9;
const MAX_LISTED_SKILLS: usize = 5;

struct CategoryAdvice {
    empty: bool,
    gap: f64,
    text: String,
}

/// Ordered, human-readable improvement suggestions.
///
/// At most one suggestion per category. Empty categories always get one and come
/// first, the rest follow by largest point gap. Missing skills close the list.
pub fn generate_suggestions(
    breakdown: &ScoreBreakdown,
    missing_skills: &[String],
    counts: &CategoryCounts,
    weights: &CategoryWeights,
) -> Vec<String> {
    let mut advice: Vec<CategoryAdvice> = Category::ALL
        .into_iter()
        .filter_map(|category| {
            let weight = weights.get(category);
            let value = breakdown.get(category);
            let gap = (weight - value).max(0.0);

            if counts.get(category) == 0 {
                return Some(CategoryAdvice {
                    empty: true,
                    gap,
                    text: empty_section_advice(category),
                });
            }
            if weight <= 0.0 {
                return None;
            }

            let ratio = value / weight;
            let text = if ratio < THIN_RATIO {
                thin_section_advice(category)
            } else if ratio < SATURATED_RATIO {
                tailor_advice(category)
            } else {
                return None;
            };
            Some(CategoryAdvice {
                empty: false,
                gap,
                text,
            })
        })
        .collect();

    // Stable sort keeps Category::ALL order on ties.
    advice.sort_by(|a, b| {
        b.empty.cmp(&a.empty).then(
            b.gap
                .partial_cmp(&a.gap)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });

    let mut suggestions: Vec<String> = advice.into_iter().map(|a| a.text).collect();
    if let Some(skills) = missing_skills_advice(missing_skills) {
        suggestions.push(skills);
    }
    suggestions
}

fn empty_section_advice(category: Category) -> String {
    match category {
        Category::Experience => {
            "Add your work experience: the experience section has no entries yet.".to_string()
        }
        Category::Skill => {
            "Add the skills you use: the skills section has no entries yet.".to_string()
        }
        Category::Education => {
            "Add your education: the education section has no entries yet.".to_string()
        }
        Category::Project => {
            "Add a project that shows relevant work: the projects section has no entries yet."
                .to_string()
        }
    }
}

fn thin_section_advice(category: Category) -> String {
    format!(
        "Your {} section covers little of this role. Add another relevant {} or expand the ones you have.",
        category.label(),
        category.noun()
    )
}

fn tailor_advice(category: Category) -> String {
    format!(
        "Tailor your {} section to the job description's wording to strengthen the match.",
        category.label()
    )
}

fn missing_skills_advice(missing_skills: &[String]) -> Option<String> {
    if missing_skills.is_empty() {
        return None;
    }
    let listed = missing_skills
        .iter()
        .take(MAX_LISTED_SKILLS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let rest = missing_skills.len().saturating_sub(MAX_LISTED_SKILLS);
    Some(if rest > 0 {
        format!("Consider adding skills the job asks for: {listed} and {rest} more.")
    } else {
        format!("Consider adding skills the job asks for: {listed}.")
    })
}
