// Authoritative outfit snapshot. Written only by full refresh or whole-document replacement.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::models::{Outfit, OutfitId};

pub type SharedStore = Arc<Mutex<EntityStore>>;

#[derive(Debug, Default)]
pub struct EntityStore {
    outfits: Vec<Outfit>,
    index: HashMap<OutfitId, usize>,
    generations: HashMap<OutfitId, u64>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Outfits in listing order
    pub fn outfits(&self) -> &[Outfit] {
        &self.outfits
    }

    pub fn get(&self, id: &OutfitId) -> Option<&Outfit> {
        self.index.get(id).and_then(|&i| self.outfits.get(i))
    }

    pub fn len(&self) -> usize {
        self.outfits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outfits.is_empty()
    }

    /// Swap in a fresh listing snapshot.
    ///
    /// Outfits missing from the new snapshot have their view generation
    /// bumped, so responses still in flight for them are dropped.
    pub fn replace_all(&mut self, outfits: Vec<Outfit>) {
        for outfit in &outfits {
            report_discrepancies(outfit);
        }
        let index: HashMap<OutfitId, usize> = outfits
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id.clone(), i))
            .collect();
        let dropped: Vec<OutfitId> = self
            .index
            .keys()
            .filter(|id| !index.contains_key(*id))
            .cloned()
            .collect();
        for id in &dropped {
            self.close_view(id);
        }
        self.index = index;
        self.outfits = outfits;
        tracing::info!("Catalog snapshot replaced ({} outfits)", self.outfits.len());
    }

    /// Replace one outfit document wholesale, appending it if unknown.
    pub fn upsert(&mut self, outfit: Outfit) {
        report_discrepancies(&outfit);
        match self.index.get(&outfit.id) {
            Some(&i) => self.outfits[i] = outfit,
            None => {
                self.index.insert(outfit.id.clone(), self.outfits.len());
                self.outfits.push(outfit);
            }
        }
    }

    /// Current view generation for an outfit. Starts at 0.
    pub fn generation(&self, id: &OutfitId) -> u64 {
        self.generations.get(id).copied().unwrap_or(0)
    }

    /// Tear down the view of an outfit so in-flight responses for it are dropped.
    pub fn close_view(&mut self, id: &OutfitId) -> u64 {
        let generation = self.generations.entry(id.clone()).or_insert(0);
        *generation += 1;
        *generation
    }

    /// Replace an outfit already in the snapshot with a server document,
    /// provided the view it was requested for is still open. Never inserts.
    pub fn apply_if_current(&mut self, generation: u64, outfit: Outfit) -> bool {
        if !self.is_current(&outfit.id, generation) {
            return false;
        }
        let Some(&i) = self.index.get(&outfit.id) else {
            tracing::warn!(
                "Discarding response for outfit {}: no longer in the snapshot",
                outfit.id
            );
            return false;
        };
        report_discrepancies(&outfit);
        tracing::info!("Replaced outfit {} with server document", outfit.id);
        self.outfits[i] = outfit;
        true
    }

    /// Drop an outfit the server no longer has, if its view is still open.
    pub fn remove_if_current(&mut self, generation: u64, id: &OutfitId) -> bool {
        if !self.is_current(id, generation) {
            return false;
        }
        let Some(i) = self.index.remove(id) else {
            return false;
        };
        self.outfits.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        self.close_view(id);
        tracing::info!("Removed outfit {} from the snapshot", id);
        true
    }

    fn is_current(&self, id: &OutfitId, generation: u64) -> bool {
        let current = self.generation(id);
        if current != generation {
            tracing::warn!(
                "Discarding stale response for outfit {} (generation {} != {})",
                id,
                generation,
                current
            );
        }
        current == generation
    }
}

fn report_discrepancies(outfit: &Outfit) {
    for discrepancy in outfit.counter_discrepancies() {
        tracing::warn!("Outfit {}: {}", outfit.id, discrepancy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outfit(id: &str, category: &str) -> Outfit {
        Outfit::new(id, category, "Men")
    }

    #[test]
    fn replace_all_keeps_listing_order() {
        let mut store = EntityStore::new();
        store.replace_all(vec![outfit("b", "Casual"), outfit("a", "Formal")]);
        let ids: Vec<&str> = store.outfits().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(store.get(&OutfitId::new("a")).unwrap().category, "Formal");
    }

    #[test]
    fn replace_all_drops_outfits_missing_from_the_snapshot() {
        let mut store = EntityStore::new();
        store.replace_all(vec![outfit("a", "Casual"), outfit("b", "Casual")]);
        store.replace_all(vec![outfit("b", "Casual")]);
        assert!(store.get(&OutfitId::new("a")).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn upsert_replaces_in_place_or_appends() {
        let mut store = EntityStore::new();
        store.replace_all(vec![outfit("a", "Casual"), outfit("b", "Casual")]);

        store.upsert(outfit("a", "Formal"));
        store.upsert(outfit("c", "Sport"));

        let ids: Vec<&str> = store.outfits().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(store.get(&OutfitId::new("a")).unwrap().category, "Formal");
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut store = EntityStore::new();
        store.replace_all(vec![outfit("a", "Casual")]);
        let id = OutfitId::new("a");

        let generation = store.generation(&id);
        store.close_view(&id);

        assert!(!store.apply_if_current(generation, outfit("a", "Formal")));
        assert_eq!(store.get(&id).unwrap().category, "Casual");

        let generation = store.generation(&id);
        assert!(store.apply_if_current(generation, outfit("a", "Formal")));
        assert_eq!(store.get(&id).unwrap().category, "Formal");
    }

    #[test]
    fn late_response_does_not_resurrect_a_dropped_outfit() {
        let mut store = EntityStore::new();
        store.replace_all(vec![outfit("o1", "Casual"), outfit("o2", "Casual")]);
        let id = OutfitId::new("o1");
        let generation = store.generation(&id);

        store.replace_all(vec![outfit("o2", "Casual")]);
        assert!(store.generation(&id) > generation);

        assert!(!store.apply_if_current(generation, outfit("o1", "Formal")));
        let current = store.generation(&id);
        assert!(!store.apply_if_current(current, outfit("o1", "Formal")));
        assert!(store.get(&id).is_none());
        let ids: Vec<&str> = store.outfits().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["o2"]);
    }

    #[test]
    fn remove_if_current_keeps_the_index_consistent() {
        let mut store = EntityStore::new();
        store.replace_all(vec![
            outfit("a", "Casual"),
            outfit("b", "Formal"),
            outfit("c", "Sport"),
        ]);
        let a = OutfitId::new("a");

        let stale = store.generation(&a);
        store.close_view(&a);
        assert!(!store.remove_if_current(stale, &a));
        assert!(store.get(&a).is_some());

        assert!(store.remove_if_current(store.generation(&a), &a));
        assert!(store.get(&a).is_none());
        assert_eq!(store.get(&OutfitId::new("c")).unwrap().category, "Sport");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn counters_are_stored_as_sent() {
        let mut store = EntityStore::new();
        let mut o = outfit("a", "Casual");
        o.number_of_comments = 7;
        store.upsert(o);
        assert_eq!(store.get(&OutfitId::new("a")).unwrap().number_of_comments, 7);
    }
}
