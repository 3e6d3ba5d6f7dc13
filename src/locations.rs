use serde::Serialize;
use solana_sdk::{pubkey, pubkey::Pubkey};

/// A physical stop in the hunt. `index` is 1-based and defines visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub index: u32,
    #[serde(serialize_with = "serialize_pubkey")]
    pub key: Pubkey,
}

fn serialize_pubkey<S: serde::Serializer>(key: &Pubkey, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&key.to_string())
}

pub const LOCATIONS: [Location; 6] = [
    Location {
        index: 1,
        key: pubkey!("96ZRzDpGGvqb8HpxqhfocrQGqJaFXKgVqNhCrhxSzTqQ"),
    },
    Location {
        index: 2,
        key: pubkey!("CDYoEjjEaDRPZUh4z2DCH4ydHea2TE3oVdo1zR2EercK"),
    },
    Location {
        index: 3,
        key: pubkey!("8BGem9D3ciu3La4N2nDWfFpF4qsjYh78jdi5EX1aEV91"),
    },
    Location {
        index: 4,
        key: pubkey!("HxQjtg3AFuee8AKjrWzdsJ9CkvFBHMqqr4EsjmqmZvCi"),
    },
    Location {
        index: 5,
        key: pubkey!("HJQ41DSfdLot4w7Bv4KJFsBbP1c4i6fUMyhmxQ4fnQHo"),
    },
    Location {
        index: 6,
        key: pubkey!("AqNHXEVtECobaeBsKLBGPHBVK21e7kSkHwKV5BuhrEBd"),
    },
];

/// Ordered, immutable set of hunt locations.
///
/// Entries are stored by position so that `locations[i].index == i + 1`,
/// which makes lookup by index a bounds check.
#[derive(Debug, Clone)]
pub struct LocationRegistry {
    locations: Vec<Location>,
}

impl LocationRegistry {
    /// Builds a registry from keys in visiting order; indices are assigned from 1.
    pub fn from_keys(keys: impl IntoIterator<Item = Pubkey>) -> Self {
        let locations = keys
            .into_iter()
            .enumerate()
            .map(|(i, key)| Location {
                index: i as u32 + 1,
                key,
            })
            .collect();
        Self { locations }
    }

    pub fn builtin() -> Self {
        Self::from_keys(LOCATIONS.iter().map(|location| location.key))
    }

    pub fn all(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn by_index(&self, index: u32) -> Option<&Location> {
        let position = usize::try_from(index).ok()?.checked_sub(1)?;
        self.locations.get(position)
    }

    pub fn by_key(&self, key: &Pubkey) -> Option<&Location> {
        self.locations.iter().find(|location| location.key == *key)
    }

    /// The location following `current`, or the first one when nothing was visited.
    pub fn next_after(&self, current: Option<&Location>) -> Option<&Location> {
        match current {
            None => self.by_index(1),
            Some(location) => self.by_index(location.index.saturating_add(1)),
        }
    }
}

impl Default for LocationRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
