//! Per-submission point breakdown.

use serde::{Deserialize, Serialize};

use crate::rules::Category;

/// Point record for one weekly submission, keyed by category.
///
/// `total` tracks the sum of the category fields. Every mutation goes
/// through [`PointBreakdown::set`] or [`PointBreakdown::absorb`], both of
/// which keep the sum in step, so a finalized breakdown always satisfies
/// `total == category_sum()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointBreakdown {
    pub exercise: u32,
    pub sports_turn: u32,
    pub try_sport: u32,
    pub try_recipe: u32,
    pub good_sleep: u32,
    pub meditate: u32,
    pub less_alc: u32,
    pub total: u32,
}

impl PointBreakdown {
    /// All categories at zero.
    pub fn zeroed() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Exercise => self.exercise,
            Category::SportsTurn => self.sports_turn,
            Category::TrySport => self.try_sport,
            Category::TryRecipe => self.try_recipe,
            Category::GoodSleep => self.good_sleep,
            Category::Meditate => self.meditate,
            Category::LessAlc => self.less_alc,
        }
    }

    fn slot_mut(&mut self, category: Category) -> &mut u32 {
        match category {
            Category::Exercise => &mut self.exercise,
            Category::SportsTurn => &mut self.sports_turn,
            Category::TrySport => &mut self.try_sport,
            Category::TryRecipe => &mut self.try_recipe,
            Category::GoodSleep => &mut self.good_sleep,
            Category::Meditate => &mut self.meditate,
            Category::LessAlc => &mut self.less_alc,
        }
    }

    /// Replace a category's value, adjusting `total` by the difference.
    ///
    /// Setting the same value twice is a no-op on the total, which is what
    /// makes toggle steps idempotent.
    pub fn set(&mut self, category: Category, value: u32) {
        let old = self.get(category);
        *self.slot_mut(category) = value;
        self.total = self.total - old + value;
    }

    /// Add another breakdown's values field by field (including `total`).
    ///
    /// Used by the ledger writer to fold a submission into cumulative
    /// user/team records.
    pub fn absorb(&mut self, delta: &PointBreakdown) {
        for category in Category::ALL {
            let combined = self.get(category) + delta.get(category);
            *self.slot_mut(category) = combined;
        }
        self.total += delta.total;
    }

    /// Sum of all category fields, ignoring the stored `total`.
    pub fn category_sum(&self) -> u32 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Whether `total` matches the category sum (the finalized invariant).
    pub fn is_consistent(&self) -> bool {
        self.total == self.category_sum()
    }
}
