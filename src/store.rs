//! The authoritative list of course rows.
//!
//! State lives in an immutable [`Snapshot`]. Every mutation is an [`Action`]
//! run through the pure [`reduce`] function, and the resulting snapshot
//! replaces the old one in a single step. Subscribers are told about each new
//! snapshot synchronously, before [`RowStore::dispatch`] returns.

use crate::grade::Grade;
use crate::row::{Credits, Row, RowKey, RowPatch, SAMPLE_COURSES};
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// First key handed out by a fresh (or freshly cleared) store.
pub const INITIAL_KEY: u64 = 0;

/// One published state of the table.
///
/// Fields are private so that every snapshot keeps its keys unique and its
/// counter above every key in use.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    rows: Vec<Row>,
    next_key: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("row key {0} appears more than once")]
    DuplicateKey(RowKey),
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            rows: Vec::new(),
            next_key: INITIAL_KEY,
        }
    }
}

impl Snapshot {
    /// Table pre-filled with the sample courses, grades unset.
    pub fn with_sample_courses() -> Self {
        let mut snapshot = Snapshot::default();
        for (course, credits) in SAMPLE_COURSES {
            let key = RowKey(snapshot.next_key);
            snapshot.rows.push(Row {
                key,
                course: course.to_string(),
                credits: Credits::from(credits),
                grade: None,
            });
            snapshot.next_key += 1;
        }
        snapshot
    }

    /// Build a snapshot from rows that already carry keys
    ///
    /// # Arguments
    /// * `rows` - Rows in display order
    ///
    /// # Returns
    /// * `Ok(Snapshot)` whose counter is one past the largest key
    /// * `Err(StoreError::DuplicateKey)` if two rows share a key
    pub fn from_rows(rows: Vec<Row>) -> Result<Self, StoreError> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !seen.insert(row.key) {
                return Err(StoreError::DuplicateKey(row.key));
            }
        }
        let next_key = rows
            .iter()
            .map(|r| r.key.0 + 1)
            .max()
            .unwrap_or(INITIAL_KEY);
        Ok(Snapshot { rows, next_key })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Key the next added row will get.
    pub fn next_key(&self) -> RowKey {
        RowKey(self.next_key)
    }

    pub fn row(&self, key: RowKey) -> Option<&Row> {
        self.rows.iter().find(|r| r.key == key)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    AddRow,
    DeleteRow(RowKey),
    EditRow(RowKey, RowPatch),
    SetGrade(RowKey, Grade),
    ClearAll,
}

/// Apply `action` to `state`, returning the next snapshot.
///
/// Returns `None` when the action names a key that is not in the table; the
/// caller keeps the old snapshot in that case.
pub fn reduce(state: &Snapshot, action: &Action) -> Option<Snapshot> {
    match action {
        Action::AddRow => {
            let mut rows = state.rows.clone();
            rows.push(Row::placeholder(RowKey(state.next_key)));
            Some(Snapshot {
                rows,
                next_key: state.next_key + 1,
            })
        }
        Action::DeleteRow(key) => {
            state.row(*key)?;
            let rows = state.rows.iter().filter(|r| r.key != *key).cloned().collect();
            Some(Snapshot {
                rows,
                next_key: state.next_key,
            })
        }
        Action::EditRow(key, patch) => update_row(state, *key, |row| row.apply(patch)),
        Action::SetGrade(key, grade) => update_row(state, *key, |row| row.grade = Some(*grade)),
        Action::ClearAll => Some(Snapshot::default()),
    }
}

fn update_row(state: &Snapshot, key: RowKey, f: impl FnOnce(&mut Row)) -> Option<Snapshot> {
    let index = state.rows.iter().position(|r| r.key == key)?;
    let mut rows = state.rows.clone();
    f(&mut rows[index]);
    Some(Snapshot {
        rows,
        next_key: state.next_key,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&Snapshot) + Send>;

/// Holder of the current snapshot plus the list of parties watching it.
pub struct RowStore {
    current: Arc<Snapshot>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Default for RowStore {
    fn default() -> Self {
        RowStore::new(Snapshot::default())
    }
}

impl RowStore {
    /// Create a store that starts from `initial`
    ///
    /// # Arguments
    /// * `initial` - Starting snapshot, built by [`Snapshot::default`],
    ///   [`Snapshot::with_sample_courses`] or [`Snapshot::from_rows`]
    pub fn new(initial: Snapshot) -> Self {
        RowStore {
            current: Arc::new(initial),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn with_sample_courses() -> Self {
        RowStore::new(Snapshot::with_sample_courses())
    }

    pub fn rows(&self) -> &[Row] {
        &self.current.rows
    }

    /// Shared handle to the current snapshot; it never changes underneath
    /// the caller.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    /// Run an action against the current snapshot and publish the result
    ///
    /// The new snapshot replaces the old one wholesale, then every subscriber
    /// is called with it in the order they subscribed.
    ///
    /// # Arguments
    /// * `action` - The mutation to apply
    ///
    /// # Returns
    /// * `true` if the table changed, `false` if the action named a key that
    ///   is not in the table (subscribers are not called then)
    pub fn dispatch(&mut self, action: Action) -> bool {
        let Some(next) = reduce(&self.current, &action) else {
            debug!("ignored {:?}: no matching row", action);
            return false;
        };
        self.current = Arc::new(next);
        debug!("applied {:?}, {} rows", action, self.current.rows.len());
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&self.current);
        }
        true
    }

    /// Register a callback for every published snapshot
    ///
    /// # Arguments
    /// * `subscriber` - Called synchronously from [`RowStore::dispatch`]
    ///
    /// # Returns
    /// * `SubscriptionId` - Handle for [`RowStore::unsubscribe`]
    pub fn subscribe(&mut self, subscriber: impl FnMut(&Snapshot) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Append a placeholder row and return its key.
    pub fn add_row(&mut self) -> RowKey {
        let key = self.current.next_key();
        self.dispatch(Action::AddRow);
        key
    }

    pub fn delete_row(&mut self, key: RowKey) -> bool {
        self.dispatch(Action::DeleteRow(key))
    }

    pub fn edit_row(&mut self, key: RowKey, patch: RowPatch) -> bool {
        self.dispatch(Action::EditRow(key, patch))
    }

    pub fn set_grade(&mut self, key: RowKey, grade: Grade) -> bool {
        self.dispatch(Action::SetGrade(key, grade))
    }

    pub fn clear_all(&mut self) {
        self.dispatch(Action::ClearAll);
    }
}

impl std::fmt::Debug for RowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStore")
            .field("current", &self.current)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn add_row_appends_placeholder_with_fresh_key() {
        let mut store = RowStore::default();
        let first = store.add_row();
        let second = store.add_row();
        assert_eq!(first, RowKey(INITIAL_KEY));
        assert_eq!(second, RowKey(INITIAL_KEY + 1));
        assert_eq!(store.rows().len(), 2);
        assert_eq!(store.rows()[1], Row::placeholder(second));
    }

    #[test]
    fn delete_unknown_key_leaves_rows_unchanged() {
        let mut store = RowStore::with_sample_courses();
        let before = store.snapshot();
        assert!(!store.delete_row(RowKey(999)));
        assert_eq!(*store.snapshot(), *before);
    }

    #[test]
    fn add_then_delete_restores_rows_but_not_counter() {
        let mut store = RowStore::with_sample_courses();
        let before = store.rows().to_vec();
        let key = store.add_row();
        assert!(store.delete_row(key));
        assert_eq!(store.rows(), before.as_slice());
        assert_eq!(store.add_row(), RowKey(key.0 + 1));
    }

    #[test]
    fn delete_keeps_survivor_order() {
        let mut store = RowStore::with_sample_courses();
        store.delete_row(RowKey(2));
        let keys: Vec<u64> = store.rows().iter().map(|r| r.key.0).collect();
        assert_eq!(keys, vec![0, 1, 3, 4, 5]);
    }

    #[test]
    fn clear_all_resets_counter() {
        let mut store = RowStore::with_sample_courses();
        store.add_row();
        store.clear_all();
        assert!(store.rows().is_empty());
        assert_eq!(store.add_row(), RowKey(INITIAL_KEY));
    }

    #[test]
    fn sample_keys_do_not_collide_with_added_rows() {
        let mut store = RowStore::with_sample_courses();
        let key = store.add_row();
        let mut keys: Vec<RowKey> = store.rows().iter().map(|r| r.key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), store.rows().len());
        assert_eq!(key, RowKey(SAMPLE_COURSES.len() as u64));
    }

    #[test]
    fn edit_merges_fields_and_ignores_unknown_key() {
        let mut store = RowStore::default();
        let key = store.add_row();
        assert!(store.edit_row(key, RowPatch::course("Networks")));
        assert!(store.edit_row(key, RowPatch::credits("abc")));
        assert!(!store.edit_row(RowKey(42), RowPatch::course("ghost")));

        let row = &store.rows()[0];
        assert_eq!(row.course, "Networks");
        assert_eq!(row.credits.raw(), "abc");
        assert_eq!(row.grade, None);
    }

    #[test]
    fn set_grade_targets_one_row() {
        let mut store = RowStore::with_sample_courses();
        assert!(store.set_grade(RowKey(1), Grade::BPlus));
        assert!(!store.set_grade(RowKey(77), Grade::O));
        let graded: Vec<Option<Grade>> = store.rows().iter().map(|r| r.grade).collect();
        assert_eq!(graded[1], Some(Grade::BPlus));
        assert_eq!(graded.iter().filter(|g| g.is_some()).count(), 1);
    }

    #[test]
    fn reduce_does_not_touch_previous_snapshot() {
        let state = Snapshot::with_sample_courses();
        let next = reduce(&state, &Action::SetGrade(RowKey(0), Grade::O)).unwrap();
        assert_eq!(state.rows()[0].grade, None);
        assert_eq!(next.rows()[0].grade, Some(Grade::O));
        assert!(reduce(&state, &Action::DeleteRow(RowKey(100))).is_none());
    }

    #[test]
    fn subscribers_see_each_applied_change_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut store = RowStore::default();
        let sink = Arc::clone(&seen);
        let id = store.subscribe(move |s| sink.lock().unwrap().push(s.rows().len()));

        let key = store.add_row();
        store.delete_row(RowKey(500));
        store.set_grade(key, Grade::A);
        store.add_row();
        assert!(store.unsubscribe(id));
        store.clear_all();

        assert_eq!(*seen.lock().unwrap(), vec![1, 1, 2]);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn seeded_rows_keep_keys_unique() {
        let mut store = RowStore::new(Snapshot::from_rows(vec![Row::placeholder(RowKey(0))]).unwrap());
        let added = store.add_row();
        assert_eq!(added, RowKey(1));

        assert!(store.delete_row(RowKey(0)));
        assert_eq!(store.rows().len(), 1);
        assert_eq!(store.rows()[0].key, added);
    }

    #[test]
    fn seeded_counter_starts_past_largest_key() {
        let rows = vec![Row::placeholder(RowKey(7)), Row::placeholder(RowKey(2))];
        let snapshot = Snapshot::from_rows(rows).unwrap();
        assert_eq!(snapshot.next_key(), RowKey(8));
        assert_eq!(Snapshot::from_rows(Vec::new()).unwrap(), Snapshot::default());
    }

    #[test]
    fn seeded_duplicate_keys_are_rejected() {
        let rows = vec![
            Row::placeholder(RowKey(3)),
            Row::placeholder(RowKey(4)),
            Row::placeholder(RowKey(3)),
        ];
        assert_eq!(
            Snapshot::from_rows(rows),
            Err(StoreError::DuplicateKey(RowKey(3)))
        );
    }
}
