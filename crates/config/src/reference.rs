//! Versioned reference data
//!
//! Category-domain groups and the brand lexicon are hand-curated YAML,
//! loaded at startup and validated against the live catalog taxonomy so
//! that drift shows up in logs instead of in silently-wrong filtering.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One curated group of mutually-substitutable category names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainGroup {
    pub name: String,
    pub categories: Vec<String>,
}

/// Category-domain groups used only to relax category filtering when a
/// brand match has already succeeded.
#[derive(Debug, Clone, Default)]
pub struct CategoryDomains {
    groups: Vec<DomainGroup>,
    /// lowercased category name -> index into `groups`
    index: HashMap<String, usize>,
}

#[derive(Debug, Deserialize)]
struct DomainsFile {
    groups: Vec<DomainGroup>,
}

impl CategoryDomains {
    pub fn from_groups(groups: Vec<DomainGroup>) -> Self {
        let mut index = HashMap::new();
        for (i, group) in groups.iter().enumerate() {
            for category in &group.categories {
                index.insert(category.to_lowercase(), i);
            }
        }
        Self { groups, index }
    }

    /// Built-in groups used when no YAML file is configured.
    pub fn builtin() -> Self {
        Self::from_groups(vec![
            DomainGroup {
                name: "footwear".to_string(),
                categories: [
                    "Running Shoes",
                    "Sneakers",
                    "Trainers",
                    "Sports Shoes",
                    "Walking Shoes",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            },
            DomainGroup {
                name: "mobile-phones".to_string(),
                categories: ["Smartphones", "Mobile Phones", "Feature Phones"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
            DomainGroup {
                name: "televisions".to_string(),
                categories: ["Televisions", "Smart TVs", "LED TVs"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
            DomainGroup {
                name: "laptops".to_string(),
                categories: ["Laptops", "Notebooks", "Gaming Laptops"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
        ])
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: DomainsFile =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Ok(Self::from_groups(file.groups))
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        Self::from_yaml_str(&yaml)
    }

    /// All category names in the group containing `category`, or `None`
    /// when the category belongs to no curated group.
    pub fn group_for(&self, category: &str) -> Option<&[String]> {
        self.index
            .get(&category.to_lowercase())
            .map(|&i| self.groups[i].categories.as_slice())
    }

    pub fn groups(&self) -> &[DomainGroup] {
        &self.groups
    }

    /// Names referenced by the groups but missing from the live taxonomy.
    /// Curated data drifts; callers log these at startup.
    pub fn validate(&self, known_categories: &[String]) -> Vec<String> {
        let known: std::collections::HashSet<String> =
            known_categories.iter().map(|c| c.to_lowercase()).collect();
        let mut unknown: Vec<String> = self
            .groups
            .iter()
            .flat_map(|g| g.categories.iter())
            .filter(|c| !known.contains(&c.to_lowercase()))
            .cloned()
            .collect();
        unknown.sort();
        unknown.dedup();
        unknown
    }
}

/// Fixed lexical lookup from query tokens to brand names.
///
/// Deliberately a narrow allowlist owned by configuration, not derived
/// from the full catalog brand list.
#[derive(Debug, Clone, Default)]
pub struct BrandLexicon {
    /// lowercased token -> canonical brand name
    entries: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct LexiconFile {
    brands: HashMap<String, String>,
}

impl BrandLexicon {
    pub fn from_entries(entries: HashMap<String, String>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(token, brand)| (token.to_lowercase(), brand))
            .collect();
        Self { entries }
    }

    /// Built-in allowlist used when no YAML file is configured.
    pub fn builtin() -> Self {
        let entries = [
            ("samsung", "Samsung"),
            ("apple", "Apple"),
            ("iphone", "Apple"),
            ("sony", "Sony"),
            ("lg", "LG"),
            ("nike", "Nike"),
            ("adidas", "Adidas"),
            ("puma", "Puma"),
            ("dell", "Dell"),
            ("lenovo", "Lenovo"),
        ]
        .iter()
        .map(|(t, b)| (t.to_string(), b.to_string()))
        .collect();
        Self::from_entries(entries)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: LexiconFile =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Ok(Self::from_entries(file.brands))
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        Self::from_yaml_str(&yaml)
    }

    /// First brand implied by the free text, scanning word tokens.
    pub fn infer(&self, text: &str) -> Option<&str> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .find_map(|token| self.entries.get(&token.to_lowercase()))
            .map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_lookup_case_insensitive() {
        let domains = CategoryDomains::builtin();
        let group = domains.group_for("running shoes").unwrap();
        assert!(group.iter().any(|c| c == "Sneakers"));
        assert!(domains.group_for("Yachts").is_none());
    }

    #[test]
    fn test_phone_and_tv_groups_are_disjoint() {
        let domains = CategoryDomains::builtin();
        let phones = domains.group_for("Smartphones").unwrap();
        assert!(!phones.iter().any(|c| c == "Televisions"));
    }

    #[test]
    fn test_domains_from_yaml() {
        let yaml = r#"
groups:
  - name: footwear
    categories: ["Running Shoes", "Sneakers"]
"#;
        let domains = CategoryDomains::from_yaml_str(yaml).unwrap();
        assert_eq!(domains.groups().len(), 1);
        assert!(domains.group_for("sneakers").is_some());
    }

    #[test]
    fn test_validate_reports_unknown_categories() {
        let domains = CategoryDomains::from_yaml_str(
            "groups:\n  - name: g\n    categories: [\"Sneakers\", \"Hoverboards\"]\n",
        )
        .unwrap();
        let unknown = domains.validate(&["Sneakers".to_string()]);
        assert_eq!(unknown, vec!["Hoverboards".to_string()]);
    }

    #[test]
    fn test_lexicon_infers_from_tokens() {
        let lexicon = BrandLexicon::builtin();
        assert_eq!(lexicon.infer("cheap SAMSUNG phones"), Some("Samsung"));
        assert_eq!(lexicon.infer("new iphone deals"), Some("Apple"));
        assert_eq!(lexicon.infer("generic toaster"), None);
    }

    #[test]
    fn test_lexicon_does_not_match_substrings() {
        let lexicon = BrandLexicon::builtin();
        // "pumapunku" must not imply Puma
        assert_eq!(lexicon.infer("pumapunku ruins"), None);
    }
}
