//! Points rule table.
//!
//! Maps each activity category to its unit point value and answer bounds.
//! The table is plain data: the scoring session receives it by value, so
//! tests (and themed competition weeks) can substitute alternate rule sets
//! without touching the state machine.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Activity dimension contributing to a weekly point total.
///
/// The set is closed: a breakdown field exists for every variant, so an
/// unknown category is unrepresentable rather than a runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Exercise,
    SportsTurn,
    TrySport,
    TryRecipe,
    GoodSleep,
    Meditate,
    LessAlc,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Exercise,
        Category::SportsTurn,
        Category::TrySport,
        Category::TryRecipe,
        Category::GoodSleep,
        Category::Meditate,
        Category::LessAlc,
    ];

    /// Stable key used in serialized ledgers and config files.
    pub fn key(self) -> &'static str {
        match self {
            Category::Exercise => "exercise",
            Category::SportsTurn => "sportsTurn",
            Category::TrySport => "trySport",
            Category::TryRecipe => "tryRecipe",
            Category::GoodSleep => "goodSleep",
            Category::Meditate => "meditate",
            Category::LessAlc => "lessAlc",
        }
    }

    /// Human label shown in prompts and summaries.
    pub fn label(self) -> &'static str {
        match self {
            Category::Exercise => "Exercise Hours",
            Category::SportsTurn => "Attended Sports Sessions",
            Category::TrySport => "Tried a New Sport",
            Category::TryRecipe => "Tried New Recipes/Foods",
            Category::GoodSleep => "Had Good Sleep",
            Category::Meditate => "Meditated",
            Category::LessAlc => "Limited Alcohol",
        }
    }
}

/// Point values and answer bounds for one competition week.
///
/// Serialized to/from the `[rules]` section of the application config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRules {
    /// Points per reported exercise hour.
    #[serde(default = "default_exercise_per_hour")]
    pub exercise_per_hour: u32,
    /// Points per attended sports session.
    #[serde(default = "default_sports_session")]
    pub sports_session: u32,
    /// Fixed points for trying a new sport.
    #[serde(default = "default_try_sport")]
    pub try_sport: u32,
    /// Points per new recipe or food tried.
    #[serde(default = "default_try_recipe")]
    pub try_recipe: u32,
    /// Fixed points for a week of good sleep.
    #[serde(default = "default_good_sleep")]
    pub good_sleep: u32,
    /// Fixed points for meditating.
    #[serde(default = "default_meditate")]
    pub meditate: u32,
    /// Fixed points for limiting alcohol.
    #[serde(default = "default_less_alc")]
    pub less_alc: u32,
    /// Upper bound for the free-text exercise-hours answer.
    #[serde(default = "default_max_exercise_hours")]
    pub max_exercise_hours: u32,
    /// Upper bound for the sports-session count answer.
    #[serde(default = "default_max_sports_sessions")]
    pub max_sports_sessions: u32,
    /// Upper bound for the recipe count answer.
    #[serde(default = "default_max_recipes")]
    pub max_recipes: u32,
}

fn default_exercise_per_hour() -> u32 {
    1
}
fn default_sports_session() -> u32 {
    5
}
fn default_try_sport() -> u32 {
    5
}
fn default_try_recipe() -> u32 {
    5
}
fn default_good_sleep() -> u32 {
    8
}
fn default_meditate() -> u32 {
    5
}
fn default_less_alc() -> u32 {
    10
}
fn default_max_exercise_hours() -> u32 {
    21
}
fn default_max_sports_sessions() -> u32 {
    8
}
fn default_max_recipes() -> u32 {
    14
}

impl Default for PointRules {
    fn default() -> Self {
        Self::standard()
    }
}

impl PointRules {
    /// The standard rule set.
    pub fn standard() -> Self {
        Self {
            exercise_per_hour: default_exercise_per_hour(),
            sports_session: default_sports_session(),
            try_sport: default_try_sport(),
            try_recipe: default_try_recipe(),
            good_sleep: default_good_sleep(),
            meditate: default_meditate(),
            less_alc: default_less_alc(),
            max_exercise_hours: default_max_exercise_hours(),
            max_sports_sessions: default_max_sports_sessions(),
            max_recipes: default_max_recipes(),
        }
    }

    /// Health-week theme: doubled values for the health categories.
    pub fn health_week() -> Self {
        Self {
            try_recipe: 10,
            good_sleep: 16,
            meditate: 10,
            less_alc: 20,
            ..Self::standard()
        }
    }

    /// Unit point value for a category (per hour, per session, or fixed).
    pub fn unit_value(&self, category: Category) -> u32 {
        match category {
            Category::Exercise => self.exercise_per_hour,
            Category::SportsTurn => self.sports_session,
            Category::TrySport => self.try_sport,
            Category::TryRecipe => self.try_recipe,
            Category::GoodSleep => self.good_sleep,
            Category::Meditate => self.meditate,
            Category::LessAlc => self.less_alc,
        }
    }

    /// Categories offered on the health multi-select step.
    pub fn health_options(&self) -> [Category; 3] {
        [Category::GoodSleep, Category::Meditate, Category::LessAlc]
    }

    /// Check that every unit value is positive and every bound is usable.
    ///
    /// Summaries derive answered quantities from `points / unit_value`, so a
    /// zero unit value would be a division hazard rather than a discount.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for category in Category::ALL {
            if self.unit_value(category) == 0 {
                return Err(ValidationError::InvalidValue {
                    field: category.key().to_string(),
                    message: "unit value must be positive".to_string(),
                });
            }
        }
        let bounds = [
            ("max_exercise_hours", self.max_exercise_hours),
            ("max_sports_sessions", self.max_sports_sessions),
            ("max_recipes", self.max_recipes),
        ];
        for (name, bound) in bounds {
            if bound == 0 {
                return Err(ValidationError::InvalidValue {
                    field: name.to_string(),
                    message: "bound must allow at least one unit".to_string(),
                });
            }
        }
        Ok(())
    }
}
