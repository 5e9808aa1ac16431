use std::collections::VecDeque;
use vigil_types::{Row, Table};

/// Bounded FIFO buffer of the most recent rows of one dataset.
///
/// Rows are appended first and the oldest are evicted afterwards, so the
/// buffer never holds more than `capacity` rows once `append` returns.
/// Storage grows with the rows actually received, not with `capacity`.
#[derive(Debug, Clone)]
pub struct WindowBuffer {
    rows: VecDeque<Row>,
    capacity: usize,
}

impl WindowBuffer {
    pub fn new(capacity: usize) -> Self {
        WindowBuffer {
            rows: VecDeque::new(),
            capacity,
        }
    }

    /// Appends `new_rows` in arrival order and returns how many old rows were evicted.
    pub fn append(&mut self, new_rows: Vec<Row>) -> usize {
        self.rows.extend(new_rows);

        let excess = self.rows.len().saturating_sub(self.capacity);
        self.rows.drain(..excess);
        excess
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.capacity
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Copy of the current contents, oldest row first.
    pub fn snapshot(&self) -> Table {
        self.rows.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(i: i64) -> Row {
        json!({"id": i}).as_object().cloned().unwrap()
    }

    fn ids(window: &WindowBuffer) -> Vec<i64> {
        window
            .rows()
            .map(|r| r["id"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_grows_until_capacity() {
        let mut window = WindowBuffer::new(3);

        assert_eq!(window.append(vec![row(1)]), 0);
        assert_eq!(window.size(), 1);
        assert!(!window.is_full());

        assert_eq!(window.append(vec![row(2), row(3)]), 0);
        assert_eq!(window.size(), 3);
        assert!(window.is_full());
    }

    #[test]
    fn test_fifo_eviction() {
        let mut window = WindowBuffer::new(4);
        window.append((1..=4).map(row).collect());

        let evicted = window.append(vec![row(5), row(6)]);

        assert_eq!(evicted, 2);
        assert_eq!(ids(&window), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_batch_larger_than_capacity() {
        let mut window = WindowBuffer::new(3);
        window.append(vec![row(0)]);

        let evicted = window.append((1..=5).map(row).collect());

        assert_eq!(evicted, 3);
        assert_eq!(ids(&window), vec![3, 4, 5]);
    }

    #[test]
    fn test_bound_holds_for_any_sequence() {
        let mut window = WindowBuffer::new(7);
        for batch in [0usize, 3, 1, 9, 2, 0, 14, 7] {
            window.append((0..batch as i64).map(row).collect());
            assert!(window.size() <= 7);
        }
    }

    #[test]
    fn test_huge_capacity_allocates_lazily() {
        let mut window = WindowBuffer::new(usize::MAX / 2);
        assert_eq!(window.size(), 0);

        assert_eq!(window.append(vec![row(1), row(2)]), 0);
        assert_eq!(window.capacity(), usize::MAX / 2);
        assert_eq!(ids(&window), vec![1, 2]);
        assert!(!window.is_full());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut window = WindowBuffer::new(2);
        window.append(vec![row(1), row(2)]);

        let snapshot = window.snapshot();
        window.append(vec![row(3)]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.rows()[0]["id"], json!(1));
        assert_eq!(ids(&window), vec![2, 3]);
    }
}
