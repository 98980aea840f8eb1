use std::{
    cmp::Reverse,
    collections::HashMap,
};

use serde::{
    ser::SerializeMap,
    Serialize,
    Serializer,
};

/// Number of observations per key, e.g. queries per host.
pub type FrequencyMap = HashMap<String, u64>;

/// The highest ranked entries of a [`FrequencyMap`], in rank order. Serializes
/// as a JSON object whose keys appear in rank order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RankedMap {
    entries: Vec<(String, u64)>,
}

impl RankedMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries.iter().map(|(k, count)| (k.as_str(), *count))
    }

    pub fn into_vec(self) -> Vec<(String, u64)> {
        self.entries
    }
}

impl IntoIterator for RankedMap {
    type IntoIter = std::vec::IntoIter<(String, u64)>;
    type Item = (String, u64);

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for RankedMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

fn ranked_entries(map: &FrequencyMap) -> Vec<(&String, &u64)> {
    let mut entries: Vec<_> = map.iter().collect();
    // Ties are broken by key so rankings don't depend on hash order.
    entries.sort_unstable_by_key(|&(key, count)| (Reverse(*count), key));
    entries
}

/// All keys of `map`, highest count first. Keys with equal counts are in
/// ascending key order.
pub fn sort_by_value(map: &FrequencyMap) -> Vec<&str> {
    ranked_entries(map)
        .into_iter()
        .map(|(key, _)| key.as_str())
        .collect()
}

/// The `top` highest counted entries of `map`. Returns everything when `top`
/// exceeds the number of keys and nothing when it's zero.
pub fn produce_top(map: &FrequencyMap, top: usize) -> RankedMap {
    let entries = ranked_entries(map)
        .into_iter()
        .take(top)
        .map(|(key, count)| (key.clone(), *count))
        .collect();
    RankedMap { entries }
}

#[cfg(test)]
mod tests {
    use maplit::hashmap;

    use super::*;

    fn frequencies() -> FrequencyMap {
        hashmap! {
            "a".to_string() => 3,
            "b".to_string() => 10,
            "c".to_string() => 10,
            "d".to_string() => 1,
        }
    }

    #[test]
    fn test_top_with_ties() {
        let top = produce_top(&frequencies(), 2);
        assert_eq!(top.len(), 2);
        let mut keys: Vec<_> = top.iter().map(|(k, _)| k).collect();
        keys.sort();
        assert_eq!(keys, vec!["b", "c"]);
        assert!(top.iter().all(|(_, count)| count == 10));
    }

    #[test]
    fn test_ties_break_by_key() {
        assert_eq!(sort_by_value(&frequencies()), vec!["b", "c", "a", "d"]);
        assert_eq!(
            produce_top(&frequencies(), 3).into_vec(),
            vec![
                ("b".to_string(), 10),
                ("c".to_string(), 10),
                ("a".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_top_bounds() {
        assert!(produce_top(&frequencies(), 0).is_empty());
        assert_eq!(produce_top(&frequencies(), 100).len(), 4);
        assert!(produce_top(&FrequencyMap::new(), 5).is_empty());
    }

    #[test]
    fn test_input_untouched() {
        let map = frequencies();
        let _ = produce_top(&map, 1);
        assert_eq!(map, frequencies());
    }

    #[test]
    fn test_serializes_in_rank_order() -> anyhow::Result<()> {
        let top = produce_top(&frequencies(), 3);
        assert_eq!(serde_json::to_string(&top)?, r#"{"b":10,"c":10,"a":3}"#);
        assert_eq!(top.get("a"), Some(3));
        assert_eq!(top.get("d"), None);
        Ok(())
    }
}
