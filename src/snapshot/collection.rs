//! Id-keyed record collection that keeps the source key order.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

/// Records keyed by opaque string id, iterated in the order the keys appeared
/// in the source JSON object.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Collection<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert a record. A repeated id keeps its original position and takes the new value.
    pub fn insert(&mut self, id: String, record: T) {
        match self.index.get(&id) {
            Some(&pos) => self.entries[pos].1 = record,
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, record));
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(id, record)| (id.as_str(), record))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(String, T)> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut collection = Collection::new();
        for (id, record) in iter {
            collection.insert(id, record);
        }
        collection
    }
}

impl<'de, T> Deserialize<'de> for Collection<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CollectionVisitor<T>(PhantomData<T>);

        impl<'de, T> Visitor<'de> for CollectionVisitor<T>
        where
            T: Deserialize<'de>,
        {
            type Value = Collection<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object keyed by record id")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut collection = Collection::new();
                while let Some((id, record)) = map.next_entry::<String, T>()? {
                    collection.insert(id, record);
                }
                Ok(collection)
            }
        }

        deserializer.deserialize_map(CollectionVisitor(PhantomData))
    }
}
