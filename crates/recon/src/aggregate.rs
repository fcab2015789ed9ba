use std::collections::{BTreeMap, BTreeSet};

use crate::people::Person;

/// People sharing one normalized key.
#[derive(Debug, Clone)]
pub struct KeyGroup<'a> {
    /// First row carrying the key; used for report columns.
    pub first: &'a Person,
    pub count: usize,
}

/// Group people by key, keeping the first row and the row count.
pub fn group_by_key(people: &[Person]) -> BTreeMap<String, KeyGroup<'_>> {
    let mut groups: BTreeMap<String, KeyGroup<'_>> = BTreeMap::new();
    for person in people {
        groups
            .entry(person.key.clone())
            .and_modify(|g| g.count += 1)
            .or_insert(KeyGroup { first: person, count: 1 });
    }
    groups
}

/// Key set of a grouping.
pub fn keys_of(groups: &BTreeMap<String, KeyGroup<'_>>) -> BTreeSet<String> {
    groups.keys().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(key: &str, name: &str) -> Person {
        Person {
            row: 0,
            key: key.into(),
            name: name.into(),
            surname: String::new(),
            email: String::new(),
            company: String::new(),
            group: String::new(),
        }
    }

    #[test]
    fn counts_and_keeps_first() {
        let people = vec![person("2", "a"), person("1", "b"), person("2", "c")];
        let groups = group_by_key(&people);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["2"].count, 2);
        assert_eq!(groups["2"].first.name, "a");
        assert_eq!(groups["1"].count, 1);
        let keys: Vec<_> = keys_of(&groups).into_iter().collect();
        assert_eq!(keys, ["1", "2"]);
    }
}
