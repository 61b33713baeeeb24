use hashbrown::HashMap;

use crate::types::EventId;

/// Secondary index from a key to event ids, each list sorted ascending.
pub type VecIndex<K> = HashMap<K, Vec<EventId>>;
