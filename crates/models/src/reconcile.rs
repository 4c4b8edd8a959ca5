//! Three-way diff between a desired association set and the persisted one.
//!
//! Entries are `(key, payload)` pairs. Keys are natural keys (a file id, a user id, a grade
//! parameter type), so an entry present on both sides is an update candidate and only becomes an
//! update when the payloads differ. Membership-only sets use `()` as the payload.

use std::collections::BTreeMap;

/// The changes that turn the existing set into the desired set
#[derive(Debug, Clone, PartialEq)]
pub struct Diff<K, P> {
    /// Desired entries whose key is not persisted yet
    pub to_insert: Vec<(K, P)>,
    /// Desired entries whose key is persisted with a different payload
    pub to_update: Vec<(K, P)>,
    /// Persisted entries whose key is no longer desired, with their persisted payload
    pub to_delete: Vec<(K, P)>,
}

impl<K, P> Default for Diff<K, P> {
    fn default() -> Self {
        Self {
            to_insert: Vec::new(),
            to_update: Vec::new(),
            to_delete: Vec::new(),
        }
    }
}

impl<K, P> Diff<K, P> {
    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    pub fn deleted_keys(&self) -> impl Iterator<Item = &K> {
        self.to_delete.iter().map(|(key, _)| key)
    }

    pub fn inserted_keys(&self) -> impl Iterator<Item = &K> {
        self.to_insert.iter().map(|(key, _)| key)
    }

    pub fn updated_keys(&self) -> impl Iterator<Item = &K> {
        self.to_update.iter().map(|(key, _)| key)
    }
}

/// Diffs `desired` against `existing`.
///
/// Results come out in ascending key order. A key repeated in `desired` keeps its last payload.
pub fn diff<K, P>(
    desired: impl IntoIterator<Item = (K, P)>,
    existing: impl IntoIterator<Item = (K, P)>,
) -> Diff<K, P>
where
    K: Ord,
    P: PartialEq,
{
    let mut desired: BTreeMap<K, P> = desired.into_iter().collect();
    let mut result = Diff::default();

    for (key, persisted) in existing {
        match desired.remove(&key) {
            Some(wanted) if wanted != persisted => result.to_update.push((key, wanted)),
            Some(_) => {}
            None => result.to_delete.push((key, persisted)),
        }
    }

    // Whatever was not matched against a persisted key is new
    result.to_insert = desired.into_iter().collect();
    result.to_update.sort_by(|a, b| a.0.cmp(&b.0));
    result.to_delete.sort_by(|a, b| a.0.cmp(&b.0));

    result
}

/// Membership-only variant of [`diff`] for sets without a payload, such as rosters
pub fn diff_keys<K: Ord>(
    desired: impl IntoIterator<Item = K>,
    existing: impl IntoIterator<Item = K>,
) -> Diff<K, ()> {
    diff(
        desired.into_iter().map(|key| (key, ())),
        existing.into_iter().map(|key| (key, ())),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeSet;

    fn keys<K: Ord + Clone, P>(entries: &[(K, P)]) -> BTreeSet<K> {
        entries.iter().map(|(key, _)| key.clone()).collect()
    }

    #[test]
    fn test_assistant_roster_example() {
        let result = diff_keys([102_i64, 103], [101_i64, 102]);
        assert_eq!(result.to_delete, vec![(101, ())]);
        assert_eq!(result.to_insert, vec![(103, ())]);
        assert!(result.to_update.is_empty());
    }

    #[test]
    fn test_empty_desired_deletes_everything() {
        let result = diff(Vec::<(i64, u8)>::new(), vec![(1, 10), (2, 20)]);
        assert_eq!(result.to_delete, vec![(1, 10), (2, 20)]);
        assert!(result.to_insert.is_empty());
        assert!(result.to_update.is_empty());
    }

    #[test]
    fn test_empty_existing_inserts_everything() {
        let result = diff(vec![(2, "b"), (1, "a")], Vec::new());
        assert_eq!(result.to_insert, vec![(1, "a"), (2, "b")]);
        assert!(result.to_delete.is_empty());
    }

    #[test]
    fn test_update_only_when_payload_differs() {
        let result = diff(
            vec![("QUIZ", 20.0), ("MID", 30.0)],
            vec![("QUIZ", 20.0), ("MID", 25.0)],
        );
        assert_eq!(result.to_update, vec![("MID", 30.0)]);
        assert!(result.to_insert.is_empty());
        assert!(result.to_delete.is_empty());
    }

    #[test]
    fn test_deletions_carry_persisted_payload() {
        let result = diff(vec![(1, "new")], vec![(1, "old"), (2, "gone")]);
        assert_eq!(result.to_delete, vec![(2, "gone")]);
        assert_eq!(result.to_update, vec![(1, "new")]);
    }

    #[test]
    fn test_repeated_desired_key_keeps_last_payload() {
        let result = diff(vec![(1, 'a'), (1, 'b')], Vec::new());
        assert_eq!(result.to_insert, vec![(1, 'b')]);
    }

    #[test]
    fn test_second_pass_is_empty() {
        let desired = vec![(1, 1.5), (2, 2.5), (3, 3.5)];
        let first = diff(desired.clone(), vec![(2, 9.0), (4, 4.0)]);
        assert!(!first.is_empty());

        // Apply the first diff, then diff again with the same desired set
        let mut persisted: BTreeMap<i32, f64> = [(2, 9.0), (4, 4.0)].into_iter().collect();
        for (key, _) in &first.to_delete {
            persisted.remove(key);
        }
        for (key, payload) in first.to_update.iter().chain(&first.to_insert) {
            persisted.insert(*key, *payload);
        }

        let second = diff(desired, persisted);
        assert!(second.is_empty());
    }

    #[test]
    fn test_partition_covers_both_sides() {
        let desired: Vec<(u8, ())> = [1, 2, 3, 5, 8].into_iter().map(|k| (k, ())).collect();
        let existing: Vec<(u8, ())> = [2, 3, 4, 8, 9].into_iter().map(|k| (k, ())).collect();
        let result = diff(desired.clone(), existing.clone());

        let desired_keys = keys(&desired);
        let existing_keys = keys(&existing);
        let common: BTreeSet<u8> = desired_keys.intersection(&existing_keys).copied().collect();
        let inserted = keys(&result.to_insert);
        let deleted = keys(&result.to_delete);

        assert_eq!(&inserted | &common, desired_keys);
        assert_eq!(&deleted | &common, existing_keys);
        assert!(inserted.is_disjoint(&deleted));
    }
}
