use std::{
    collections::{HashSet, VecDeque},
    sync::Mutex,
};

#[derive(Default)]
struct Seen {
    ids: HashSet<String>,
    order: VecDeque<String>,
}

/// Bounded record of Slack event ids that were already accepted. Slack
/// retries deliveries it considers unacknowledged, so each id is handled at
/// most once while it is remembered.
pub struct ProcessedEvents {
    capacity: usize,
    seen: Mutex<Seen>,
}

impl ProcessedEvents {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            seen: Mutex::new(Seen::default()),
        }
    }

    /// Records `event_id` and reports whether it was new. The oldest id is
    /// forgotten once the capacity is reached.
    pub fn first_sighting(&self, event_id: &str) -> bool {
        let mut seen = self
            .seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if seen.ids.contains(event_id) {
            return false;
        }

        if seen.order.len() >= self.capacity {
            if let Some(oldest) = seen.order.pop_front() {
                seen.ids.remove(&oldest);
            }
        }

        seen.ids.insert(event_id.to_string());
        seen.order.push_back(event_id.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .order
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
