//! Recipe records and the read-only catalog they are looked up from

use std::{collections::HashSet, path::Path};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::info;

/// A recipe as supplied by the lookup collaborator. Immutable while viewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Opaque locator of the companion video
    #[serde(alias = "videoUrl")]
    pub media_ref: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// Listing entry for a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id.clone(),
            title: recipe.title.clone(),
            description: recipe.description.clone(),
        }
    }
}

/// Ordered, read-only set of recipes keyed by id
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
}

impl RecipeCatalog {
    /// Build a catalog, rejecting duplicate or empty ids
    pub fn new(recipes: Vec<Recipe>) -> anyhow::Result<Self> {
        let mut seen = HashSet::new();
        for recipe in &recipes {
            if recipe.id.trim().is_empty() {
                bail!("recipe '{}' has an empty id", recipe.title);
            }
            if !seen.insert(recipe.id.as_str()) {
                bail!("duplicate recipe id '{}'", recipe.id);
            }
        }
        Ok(Self { recipes })
    }

    /// Parse a JSON array of recipes
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let recipes: Vec<Recipe> =
            serde_json::from_str(json).context("Failed to parse recipe catalog")?;
        Self::new(recipes)
    }

    /// Load a JSON catalog from disk
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe catalog {}", path.display()))?;
        let catalog = Self::from_json_str(&json)
            .with_context(|| format!("Invalid recipe catalog {}", path.display()))?;
        info!("Loaded {} recipes from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// The breakfast recipes bundled with the service
    pub fn builtin() -> Self {
        Self {
            recipes: vec![
                breakfast(
                    "1",
                    "Chia Pudding",
                    "Healthy and delicious chia pudding with your favorite toppings",
                    &["3 tbsp chia seeds", "1 cup almond milk", "1 tsp maple syrup", "Fresh berries"],
                    &[
                        "Whisk the chia seeds into the milk",
                        "Stir in the maple syrup",
                        "Cover and refrigerate overnight",
                        "Top with berries before serving",
                    ],
                ),
                breakfast(
                    "2",
                    "Overnight Oats",
                    "Easy make-ahead breakfast with endless flavor combinations",
                    &["1/2 cup rolled oats", "1/2 cup milk", "1/4 cup yogurt", "1 tbsp honey"],
                    &[
                        "Combine oats, milk and yogurt in a jar",
                        "Sweeten with honey and stir",
                        "Seal and refrigerate overnight",
                    ],
                ),
                breakfast(
                    "3",
                    "Avocado Toast",
                    "Creamy avocado on crispy toast with various toppings",
                    &["2 slices sourdough", "1 ripe avocado", "Lemon juice", "Chili flakes", "Salt"],
                    &[
                        "Toast the bread until crisp",
                        "Mash the avocado with lemon juice and salt",
                        "Spread on the toast and finish with chili flakes",
                    ],
                ),
                breakfast(
                    "4",
                    "Apple Banana Smoothie",
                    "Refreshing and nutritious smoothie with apple and banana",
                    &["1 apple", "1 banana", "1 cup milk", "Ice"],
                    &["Core and chop the apple", "Blend everything until smooth"],
                ),
                breakfast(
                    "5",
                    "Avocado Apple Smoothie",
                    "Creamy and healthy smoothie with avocado and apple",
                    &["1/2 avocado", "1 apple", "1 cup spinach", "1 cup coconut water"],
                    &["Chop the apple and scoop the avocado", "Blend with spinach and coconut water"],
                ),
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id == id)
    }

    pub fn summaries(&self) -> Vec<RecipeSummary> {
        self.recipes.iter().map(RecipeSummary::from).collect()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

fn breakfast(
    id: &str,
    title: &str,
    description: &str,
    ingredients: &[&str],
    instructions: &[&str],
) -> Recipe {
    let slug = title.to_lowercase().replace(' ', "-");
    Recipe {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        media_ref: format!("videos/breakfast-{}.mp4", slug),
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        instructions: instructions.iter().map(|s| s.to_string()).collect(),
    }
}
