//! Snapshot of the canonical effect-type table

use mta_common::EffectType;
use std::collections::HashMap;
use uuid::Uuid;

/// Read-only view of `effect_types` used while filtering one extraction run
///
/// Lookups by exact name and by case-insensitive name are both O(1).
#[derive(Debug, Clone, Default)]
pub struct EffectTypeCatalog {
    types: Vec<EffectType>,
    by_name: HashMap<String, usize>,
    by_lower_name: HashMap<String, usize>,
    by_id: HashMap<Uuid, usize>,
}

impl EffectTypeCatalog {
    pub fn new(types: Vec<EffectType>) -> Self {
        let mut catalog = Self::default();
        for effect_type in types {
            catalog.insert(effect_type);
        }
        catalog
    }

    fn insert(&mut self, effect_type: EffectType) {
        let idx = self.types.len();
        self.by_name.entry(effect_type.name.clone()).or_insert(idx);
        self.by_lower_name
            .entry(effect_type.name.to_lowercase())
            .or_insert(idx);
        self.by_id.insert(effect_type.id, idx);
        self.types.push(effect_type);
    }

    /// Exact (case-sensitive) name lookup
    pub fn get_exact(&self, name: &str) -> Option<&EffectType> {
        self.by_name.get(name).map(|&idx| &self.types[idx])
    }

    pub fn find_case_insensitive(&self, name: &str) -> Option<&EffectType> {
        self.by_lower_name
            .get(&name.trim().to_lowercase())
            .map(|&idx| &self.types[idx])
    }

    pub fn get_by_id(&self, id: Uuid) -> Option<&EffectType> {
        self.by_id.get(&id).map(|&idx| &self.types[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(name: &str) -> EffectType {
        EffectType {
            id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_exact_and_case_insensitive_lookup() {
        let catalog = EffectTypeCatalog::new(vec![effect("Card"), effect("Close-Up")]);

        assert!(catalog.get_exact("Card").is_some());
        assert!(catalog.get_exact("card").is_none());
        assert_eq!(
            catalog.find_case_insensitive(" close-up ").map(|e| e.name.as_str()),
            Some("Close-Up")
        );
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_lookup_by_id() {
        let card = effect("Card");
        let id = card.id;
        let catalog = EffectTypeCatalog::new(vec![card]);

        assert_eq!(catalog.get_by_id(id).map(|e| e.name.as_str()), Some("Card"));
        assert!(catalog.get_by_id(Uuid::new_v4()).is_none());
    }
}
