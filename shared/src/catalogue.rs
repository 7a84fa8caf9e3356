use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::river::SelectedRiver;

type Scales = IndexMap<String, Vec<String>>;
type Prefectures = IndexMap<String, Scales>;

/// Available river datasets: `category → prefecture → scale → [river]`.
///
/// Keeps the order of the catalogue document so the sidebar lists entries
/// the way the catalogue authors arranged them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalogue {
    categories: IndexMap<String, Prefectures>,
}

impl Catalogue {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn prefectures<'a>(&'a self, category: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.categories
            .get(category)
            .into_iter()
            .flat_map(|prefectures| prefectures.keys().map(String::as_str))
    }

    pub fn scales<'a>(
        &'a self,
        category: &str,
        prefecture: &str,
    ) -> impl Iterator<Item = &'a str> + use<'a> {
        self.categories
            .get(category)
            .and_then(|prefectures| prefectures.get(prefecture))
            .into_iter()
            .flat_map(|scales| scales.keys().map(String::as_str))
    }

    pub fn rivers(&self, category: &str, prefecture: &str, scale: &str) -> &[String] {
        self.categories
            .get(category)
            .and_then(|prefectures| prefectures.get(prefecture))
            .and_then(|scales| scales.get(scale))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, selected: &SelectedRiver) -> bool {
        self.rivers(&selected.category, &selected.prefecture, &selected.scale)
            .contains(&selected.river)
    }

    /// Every dataset, in document order.
    pub fn entries(&self) -> impl Iterator<Item = SelectedRiver> + '_ {
        self.categories.iter().flat_map(|(category, prefectures)| {
            prefectures.iter().flat_map(move |(prefecture, scales)| {
                scales.iter().flat_map(move |(scale, rivers)| {
                    rivers
                        .iter()
                        .map(move |river| SelectedRiver::new(category, prefecture, scale, river))
                })
            })
        })
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const DOC: &str = r#"{
        "flood": {
            "Tokyo": { "1/50000": ["Tama", "Arakawa"] },
            "Osaka": { "1/25000": ["Yodo"] }
        },
        "inundation": {
            "Aichi": { "1/10000": ["Kiso"], "1/50000": ["Shonai"] }
        }
    }"#;

    fn catalogue() -> Catalogue {
        Catalogue::from_json(DOC).expect("valid catalogue")
    }

    #[test]
    fn entries_follow_document_order() {
        let rivers: Vec<String> = catalogue().entries().map(|s| s.river).collect();
        assert_eq!(rivers, vec!["Tama", "Arakawa", "Yodo", "Kiso", "Shonai"]);
    }

    #[test]
    fn tree_accessors() {
        let catalogue = catalogue();
        assert_eq!(
            catalogue.categories().collect::<Vec<_>>(),
            vec!["flood", "inundation"]
        );
        assert_eq!(
            catalogue.prefectures("flood").collect::<Vec<_>>(),
            vec!["Tokyo", "Osaka"]
        );
        assert_eq!(
            catalogue.scales("inundation", "Aichi").collect::<Vec<_>>(),
            vec!["1/10000", "1/50000"]
        );
        assert_eq!(catalogue.rivers("flood", "Tokyo", "1/50000"), ["Tama", "Arakawa"]);
        assert!(catalogue.rivers("flood", "Kyoto", "1/50000").is_empty());
        assert_eq!(catalogue.prefectures("missing").count(), 0);
        assert_eq!(catalogue.len(), 5);
    }

    #[test]
    fn contains_checks_full_path() {
        let catalogue = catalogue();
        assert!(catalogue.contains(&SelectedRiver::new("flood", "Tokyo", "1/50000", "Tama")));
        assert!(!catalogue.contains(&SelectedRiver::new("flood", "Tokyo", "1/25000", "Tama")));
    }

    #[test]
    fn empty_document_lists_nothing() {
        let catalogue = Catalogue::from_json("{}").expect("valid catalogue");
        assert!(catalogue.is_empty());
        assert_eq!(catalogue.entries().count(), 0);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(Catalogue::from_json(r#"{ "flood": ["Tama"] }"#).is_err());
    }
}
