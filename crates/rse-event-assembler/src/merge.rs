use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rse_domain::Event;

/// Wraps one partition's remaining events (oldest-first) plus a cursor into
/// that slice, so the heap only ever holds one "next" candidate per
/// partition at a time.
struct Cursor {
    partition: usize,
    index: usize,
    timestamp: f64,
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
    }
}
impl Eq for Cursor {}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cursor {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so `BinaryHeap` (a max-heap) pops the smallest timestamp first.
        other.timestamp.partial_cmp(&self.timestamp).unwrap_or(Ordering::Equal)
    }
}

/// k-way merges `streams` (each already sorted ascending by `timestamp`,
/// from a per-partition range query) into one ascending stream.
/// Equal-timestamp order across partitions is undefined.
pub fn k_way_merge(streams: Vec<Vec<Event>>) -> Vec<Event> {
    let mut heap = BinaryHeap::new();
    for (partition, stream) in streams.iter().enumerate() {
        if let Some(first) = stream.first() {
            heap.push(Cursor { partition, index: 0, timestamp: first.timestamp });
        }
    }

    let mut merged = Vec::new();
    while let Some(Cursor { partition, index, .. }) = heap.pop() {
        merged.push(streams[partition][index].clone());
        let next_index = index + 1;
        if let Some(next) = streams[partition].get(next_index) {
            heap.push(Cursor { partition, index: next_index, timestamp: next.timestamp });
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use rse_domain::EventVendor;

    fn event(timestamp: f64) -> Event {
        Event { partition: 0, timestamp, vendor: EventVendor::Aws, events: vec![], ttl: None }
    }

    #[test]
    fn merges_two_partitions_in_timestamp_order() {
        let a = vec![event(10.0), event(15.0)];
        let b = vec![event(12.0), event(20.0)];
        let merged = k_way_merge(vec![a, b]);
        let timestamps: Vec<f64> = merged.iter().map(|e| e.timestamp).collect();
        assert_eq!(timestamps, vec![10.0, 12.0, 15.0, 20.0]);
    }

    #[test]
    fn handles_empty_and_single_partitions() {
        let merged = k_way_merge(vec![vec![], vec![event(1.0)], vec![]]);
        assert_eq!(merged.len(), 1);
    }
}
