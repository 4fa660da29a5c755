//! Recipe lookup module

pub mod catalog;

pub use catalog::{Recipe, RecipeCatalog, RecipeSummary};
