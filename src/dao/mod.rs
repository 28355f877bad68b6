/// Quiz content sources and loading.
pub mod content;
/// Serialized content document definitions.
pub mod models;
