use serde::Serialize;

pub const DEFAULT_PRODUCT: &str = "The Cloud Sofa";

const CHOICE_PHRASES: [&str; 5] =
    ["great choice", "excellent choice", "perfect choice", "good choice", "selected"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CatalogEntry {
    fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductCatalog {
    entries: Vec<CatalogEntry>,
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::new(vec![
            CatalogEntry::new(
                "The Cloud Sofa",
                &["sofa", "couch", "leather", "modern", "seating", "cloud", "cloud one"],
            ),
            CatalogEntry::new(
                "Classic Chesterfield",
                &["sofa", "couch", "leather", "vintage", "classic", "chesterfield"],
            ),
            CatalogEntry::new("Artisan Oak Table", &["table", "dining", "wood", "oak"]),
            CatalogEntry::new("Velvet Armchair", &["chair", "armchair", "velvet", "seat"]),
        ])
    }
}

impl ProductCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    /// Catalog products mentioned by name in `text`, case-insensitively, in
    /// catalog order.
    pub fn mentions_in(&self, text: &str) -> Vec<&str> {
        let haystack = text.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| haystack.contains(&entry.name.to_lowercase()))
            .map(|entry| entry.name.as_str())
            .collect()
    }

    /// The product an assistant reply settled on: exactly one mention, or any
    /// mention alongside a choice phrase ("great choice", "selected", ...).
    pub fn detect_selection(&self, text: &str) -> Option<&str> {
        let mentions = self.mentions_in(text);
        let haystack = text.to_lowercase();
        let has_choice_phrase = CHOICE_PHRASES.iter().any(|phrase| haystack.contains(phrase));

        if mentions.len() == 1 || (!mentions.is_empty() && has_choice_phrase) {
            return mentions.first().copied();
        }
        None
    }

    pub fn search(&self, keyword: &str) -> Vec<&str> {
        let keyword = keyword.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&keyword))
            .map(|entry| entry.name.as_str())
            .collect()
    }

    /// Maps free-form user input onto a catalog name: exact match first, then
    /// partial match either way, falling back to the input unchanged.
    pub fn normalize(&self, user_input: &str) -> String {
        let needle = user_input.to_lowercase();

        if let Some(entry) = self.entries.iter().find(|entry| entry.name.to_lowercase() == needle) {
            return entry.name.clone();
        }

        if let Some(entry) = self.entries.iter().find(|entry| {
            let name = entry.name.to_lowercase();
            name.contains(&needle) || needle.contains(&name)
        }) {
            return entry.name.clone();
        }

        user_input.to_string()
    }
}
