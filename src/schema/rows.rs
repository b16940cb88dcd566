//! Editable row lists with session-scoped identifiers
//!
//! Every editable list in a schema draft (fields, training sets, extra
//! headers, extra query params) needs a per-row identifier that is stable
//! under edits, so rows can be changed or removed by identity rather than
//! by value or position. Identifiers are local to the editing session and
//! never appear in the wire format.

use serde::{Deserialize, Serialize};

/// A single editable row with its session-scoped identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row<T> {
    pub id: u64,
    pub value: T,
}

/// Ordered list of rows owning a monotonically increasing id counter.
///
/// Ids start at 0 and are never reused within an editing session. A
/// retrieval overwrites the list through [`RowList::reconcile`], which
/// stamps fresh ids offset by the current counter, so ids issued earlier
/// in the session can never collide with re-stamped ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowList<T> {
    rows: Vec<Row<T>>,
    next_id: u64,
}

impl<T> Default for RowList<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> RowList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new row and return its id.
    pub fn add(&mut self, value: T) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.push(Row { id, value });
        id
    }

    /// Remove the row with the given id. Remaining rows keep their ids.
    pub fn remove(&mut self, id: u64) -> Option<T> {
        let pos = self.rows.iter().position(|row| row.id == id)?;
        Some(self.rows.remove(pos).value)
    }

    /// Mutable access to a row's value by id.
    pub fn get_mut(&mut self, id: u64) -> Option<&mut T> {
        self.rows
            .iter_mut()
            .find(|row| row.id == id)
            .map(|row| &mut row.value)
    }

    /// Replace the list contents with rows retrieved from the wire format.
    ///
    /// Incoming row `i` receives `id = next_id + i` and the counter
    /// advances past the batch. Ids are therefore unique within the
    /// session but not stable across repeated retrievals; each retrieval
    /// re-stamps the list.
    pub fn reconcile(&mut self, incoming: Vec<T>) {
        let base = self.next_id;
        self.rows = incoming
            .into_iter()
            .enumerate()
            .map(|(i, value)| Row {
                id: base + i as u64,
                value,
            })
            .collect();
        self.next_id = base + self.rows.len() as u64;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row<T>> {
        self.rows.iter()
    }

    /// Iterate over row values in order, without ids.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().map(|row| &row.value)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_assigns_sequential_ids() {
        let mut list = RowList::new();
        assert_eq!(list.add("a"), 0);
        assert_eq!(list.add("b"), 1);
        assert_eq!(list.add("c"), 2);
    }

    #[test]
    fn remove_does_not_renumber() {
        let mut list = RowList::new();
        list.add("a");
        list.add("b");
        list.add("c");

        assert_eq!(list.remove(1), Some("b"));
        let ids: Vec<u64> = list.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![0, 2]);

        // The freed id is not reused.
        assert_eq!(list.add("d"), 3);
    }

    #[test]
    fn remove_unknown_id_is_a_no_op() {
        let mut list = RowList::new();
        list.add("a");
        assert_eq!(list.remove(42), None);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn get_mut_edits_by_identity() {
        let mut list = RowList::new();
        let id = list.add("old".to_string());
        *list.get_mut(id).unwrap() = "new".to_string();
        assert_eq!(list.values().next().unwrap(), "new");
    }

    #[test]
    fn reconcile_offsets_ids_by_current_counter() {
        let mut list = RowList::new();
        for _ in 0..5 {
            list.add("x");
        }

        list.reconcile(vec!["a", "b", "c"]);
        let ids: Vec<u64> = list.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![5, 6, 7]);

        // Counter advanced past the batch; next add continues from 8.
        assert_eq!(list.add("d"), 8);
    }

    #[test]
    fn reconcile_with_empty_batch_clears_the_list() {
        let mut list = RowList::new();
        list.add("a");
        list.reconcile(Vec::new());
        assert!(list.is_empty());
        // Counter untouched by an empty batch.
        assert_eq!(list.add("b"), 1);
    }

    #[test]
    fn repeated_reconcile_restamps_without_collisions() {
        let mut list = RowList::new();
        list.reconcile(vec!["a", "b"]);
        list.reconcile(vec!["a", "b"]);
        let ids: Vec<u64> = list.iter().map(|row| row.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
