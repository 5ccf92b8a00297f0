//! Padded-list rendering of a breakdown for confirmation and receipts.

use crate::points::PointBreakdown;
use crate::rules::{Category, PointRules};

const TITLE_PAD: usize = 26;
const VALUE_PAD: usize = 4;

/// Render every category with its human label, answered quantity (or
/// Yes/No), and the running total, as an aligned monospace list.
pub fn render(rules: &PointRules, breakdown: &PointBreakdown) -> String {
    let mut lines = Vec::with_capacity(Category::ALL.len() + 1);

    let hours = breakdown.exercise / rules.unit_value(Category::Exercise);
    lines.push(format_line(
        Category::Exercise.label(),
        &hours.to_string(),
    ));
    lines.push(format_line(
        Category::SportsTurn.label(),
        &count_or_no(breakdown, rules, Category::SportsTurn),
    ));
    lines.push(format_line(
        Category::TrySport.label(),
        yes_or_no(breakdown.try_sport),
    ));
    lines.push(format_line(
        Category::TryRecipe.label(),
        &count_or_no(breakdown, rules, Category::TryRecipe),
    ));
    lines.push(format_line(
        Category::GoodSleep.label(),
        yes_or_no(breakdown.good_sleep),
    ));
    lines.push(format_line(
        Category::Meditate.label(),
        yes_or_no(breakdown.meditate),
    ));
    lines.push(format_line(
        Category::LessAlc.label(),
        yes_or_no(breakdown.less_alc),
    ));
    lines.push(String::new());
    lines.push(format_line("Total Points:", &breakdown.total.to_string()));

    lines.join("\n")
}

/// Answered quantity for a per-unit category, or "No" when it was skipped.
fn count_or_no(breakdown: &PointBreakdown, rules: &PointRules, category: Category) -> String {
    let points = breakdown.get(category);
    if points > 0 {
        (points / rules.unit_value(category)).to_string()
    } else {
        "No".to_string()
    }
}

fn yes_or_no(points: u32) -> &'static str {
    if points > 0 {
        "Yes"
    } else {
        "No"
    }
}

fn format_line(title: &str, value: &str) -> String {
    format!(
        "{:<title_pad$}{:>value_pad$}",
        title,
        value,
        title_pad = TITLE_PAD,
        value_pad = VALUE_PAD,
    )
}
