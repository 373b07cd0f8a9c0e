use std::collections::{HashMap, VecDeque};

use rand::Rng;

use mockchat_types::Message;

/// How many messages the most recent window for [`MessageStore::random_recent`]
/// spans.
pub const RECENT_WINDOW: usize = 10;

/// Bounded, insertion-ordered message backlog of one channel.
///
/// `order` and `by_id` always hold the same id set; every method updates both
/// before returning. The store is not synchronised itself: the messenger keeps
/// it behind its mutex.
#[derive(Debug)]
pub struct MessageStore {
    order: VecDeque<u32>,
    by_id: HashMap<u32, Message>,
    capacity: usize,
}

impl MessageStore {
    /// A store keeping at most `2 * backlog` messages.
    pub fn new(backlog: usize) -> Self {
        let capacity = backlog.saturating_mul(2).max(1);
        Self {
            order: VecDeque::with_capacity(capacity),
            by_id: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Append `msg`, first evicting the oldest entries so the store never
    /// holds more than its capacity. Returns the evicted ids.
    ///
    /// Re-appending an id already present replaces it in place.
    pub fn append(&mut self, msg: Message) -> Vec<u32> {
        let id = msg.id();
        if let Some(slot) = self.by_id.get_mut(&id) {
            *slot = msg;
            return Vec::new();
        }

        let overflow = (self.order.len() + 1).saturating_sub(self.capacity);
        let evicted: Vec<u32> = self.order.drain(..overflow).collect();
        for old in &evicted {
            self.by_id.remove(old);
        }

        self.order.push_back(id);
        self.by_id.insert(id, msg);
        evicted
    }

    /// Replace a stored message, keeping its position. Returns false if the
    /// id is unknown, in which case nothing changes.
    pub fn update(&mut self, msg: Message) -> bool {
        match self.by_id.get_mut(&msg.id()) {
            Some(slot) => {
                *slot = msg;
                true
            }
            None => false,
        }
    }

    /// Remove a message. Returns it if it was present.
    pub fn remove(&mut self, id: u32) -> Option<Message> {
        let msg = self.by_id.remove(&id)?;
        if let Some(pos) = self.order.iter().position(|&i| i == id) {
            self.order.remove(pos);
        }
        Some(msg)
    }

    pub fn get(&self, id: u32) -> Option<&Message> {
        self.by_id.get(&id)
    }

    /// The most recently appended message still stored.
    pub fn last(&self) -> Option<&Message> {
        self.order.back().and_then(|id| self.by_id.get(id))
    }

    /// One of the last [`RECENT_WINDOW`] messages, uniformly. `None` when empty.
    pub fn random_recent<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Message> {
        if self.order.is_empty() {
            return None;
        }
        let window = self.order.len().min(RECENT_WINDOW);
        let back = rng.random_range(0..window);
        let id = self.order[self.order.len() - 1 - back];
        self.by_id.get(&id)
    }

    /// Messages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    /// Owned copy of the whole backlog, oldest first.
    pub fn snapshot(&self) -> Vec<Message> {
        self.iter().cloned().collect()
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        use std::collections::HashSet;

        let ordered: HashSet<u32> = self.order.iter().copied().collect();
        ordered.len() == self.order.len()
            && ordered.len() == self.by_id.len()
            && ordered.iter().all(|id| self.by_id.contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockchat_types::{Author, Message};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn msg(id: u32) -> Message {
        Message::echo(id, Author::new("alice".into()), format!("message {id}"), None)
    }

    #[test]
    fn bounded_to_twice_the_backlog() {
        let mut store = MessageStore::new(35);
        for id in 1..=200 {
            store.append(msg(id));
            assert!(store.len() <= 70);
            assert!(store.is_consistent());
        }
        assert_eq!(store.len(), 70);

        let ids: Vec<u32> = store.iter().map(Message::id).collect();
        let expected: Vec<u32> = (131..=200).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn overflow_by_one_trims_exactly_one() {
        let mut store = MessageStore::new(2);
        for id in 1..=4 {
            assert!(store.append(msg(id)).is_empty());
        }
        assert_eq!(store.append(msg(5)), vec![1]);
        assert_eq!(store.len(), 4);
        assert!(store.get(1).is_none());
    }

    #[test]
    fn update_keeps_position_and_ignores_unknown() {
        let mut store = MessageStore::new(5);
        for id in 1..=3 {
            store.append(msg(id));
        }

        let mut edited = msg(2);
        edited.set_content("edited");
        assert!(store.update(edited));
        assert!(!store.update(msg(99)));

        let contents: Vec<&str> = store.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["message 1", "edited", "message 3"]);
        assert!(store.get(99).is_none());
        assert!(store.is_consistent());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = MessageStore::new(5);
        for id in 1..=3 {
            store.append(msg(id));
        }

        assert!(store.remove(2).is_some());
        assert!(store.remove(2).is_none());
        assert_eq!(store.len(), 2);
        assert!(store.is_consistent());

        let ids: Vec<u32> = store.iter().map(Message::id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn random_recent_stays_in_window() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut store = MessageStore::new(35);
        assert!(store.random_recent(&mut rng).is_none());

        for id in 1..=50 {
            store.append(msg(id));
        }
        for _ in 0..500 {
            let picked = store.random_recent(&mut rng).unwrap().id();
            assert!((41..=50).contains(&picked), "picked {picked}");
        }
    }

    #[test]
    fn random_recent_small_store() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut store = MessageStore::new(35);
        store.append(msg(7));
        store.append(msg(8));
        for _ in 0..50 {
            let picked = store.random_recent(&mut rng).unwrap().id();
            assert!(picked == 7 || picked == 8);
        }
    }

    #[test]
    fn mixed_mutations_stay_consistent() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut store = MessageStore::new(4);
        for id in 1..=100u32 {
            store.append(msg(id));
            match rng.random_range(0..3) {
                0 => {
                    store.remove(rng.random_range(1..=id));
                }
                1 => {
                    store.update(msg(rng.random_range(1..=id)));
                }
                _ => {}
            }
            assert!(store.is_consistent());
            assert!(store.len() <= store.capacity());
        }
    }
}
