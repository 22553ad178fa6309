use crate::aggregate::{Cgpa, compute_cgpa};
use crate::row::Row;
use crate::store::{Action, RowStore, Snapshot, SubscriptionId};

/// A row store together with the CGPA of its current snapshot.
///
/// The store is only reachable mutably through [`Calculator::apply`], which
/// recomputes the CGPA before it returns, so the value is never stale.
#[derive(Debug)]
pub struct Calculator {
    store: RowStore,
    cgpa: Cgpa,
}

impl Calculator {
    /// Wrap an existing store, computing its CGPA once up front
    ///
    /// # Arguments
    /// * `store` - Store to take ownership of
    pub fn new(store: RowStore) -> Self {
        let cgpa = compute_cgpa(store.rows());
        Calculator { store, cgpa }
    }

    pub fn empty() -> Self {
        Calculator::new(RowStore::default())
    }

    pub fn with_sample_courses() -> Self {
        Calculator::new(RowStore::with_sample_courses())
    }

    /// Apply one mutation and refresh the CGPA
    ///
    /// # Arguments
    /// * `action` - The row store mutation to run
    ///
    /// # Returns
    /// * `true` if the table changed; the CGPA has already been recomputed
    /// * `false` if the action named an unknown row and nothing changed
    pub fn apply(&mut self, action: Action) -> bool {
        let applied = self.store.dispatch(action);
        if applied {
            self.cgpa = compute_cgpa(self.store.rows());
        }
        applied
    }

    pub fn cgpa(&self) -> Cgpa {
        self.cgpa
    }

    pub fn rows(&self) -> &[Row] {
        self.store.rows()
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    /// Watch the table without being able to change it
    ///
    /// # Arguments
    /// * `subscriber` - Called with each new snapshot applied through
    ///   [`Calculator::apply`]
    ///
    /// # Returns
    /// * `SubscriptionId` - Handle for [`Calculator::unsubscribe`]
    pub fn subscribe(&mut self, subscriber: impl FnMut(&Snapshot) + Send + 'static) -> SubscriptionId {
        self.store.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Calculator::with_sample_courses()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::Grade;
    use crate::row::{RowKey, RowPatch};

    #[test]
    fn sample_table_starts_without_value() {
        let calc = Calculator::with_sample_courses();
        assert_eq!(calc.rows().len(), 6);
        assert_eq!(calc.cgpa(), Cgpa::NoValue);
    }

    #[test]
    fn cgpa_follows_every_mutation() {
        let mut calc = Calculator::empty();
        assert!(calc.apply(Action::AddRow));
        assert!(calc.apply(Action::EditRow(RowKey(0), RowPatch::credits("5"))));
        assert_eq!(calc.cgpa(), Cgpa::NoValue);

        calc.apply(Action::SetGrade(RowKey(0), Grade::A));
        assert_eq!(calc.cgpa().to_string(), "8.00");

        calc.apply(Action::AddRow);
        calc.apply(Action::EditRow(RowKey(1), RowPatch::credits("4")));
        calc.apply(Action::SetGrade(RowKey(1), Grade::O));
        // (40 + 40) / 9
        assert_eq!(calc.cgpa().to_string(), "8.89");

        calc.apply(Action::EditRow(RowKey(1), RowPatch::credits("four")));
        assert_eq!(calc.cgpa().to_string(), "8.00");
        assert_eq!(calc.rows()[1].credits.raw(), "four");

        calc.apply(Action::DeleteRow(RowKey(0)));
        assert_eq!(calc.cgpa(), Cgpa::NoValue);

        calc.apply(Action::ClearAll);
        assert!(calc.rows().is_empty());
        assert_eq!(calc.cgpa(), Cgpa::NoValue);
    }

    #[test]
    fn ignored_action_keeps_value() {
        let mut calc = Calculator::empty();
        calc.apply(Action::AddRow);
        calc.apply(Action::SetGrade(RowKey(0), Grade::B));
        assert!(!calc.apply(Action::SetGrade(RowKey(9), Grade::F)));
        assert_eq!(calc.cgpa(), Cgpa::NoValue);

        calc.apply(Action::EditRow(RowKey(0), RowPatch::credits("2")));
        assert!(!calc.apply(Action::DeleteRow(RowKey(9))));
        assert_eq!(calc.cgpa().to_string(), "6.00");
    }

    #[test]
    fn cgpa_is_fresh_after_every_path() {
        let mut calc = Calculator::empty();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(0usize));
        let sink = std::sync::Arc::clone(&seen);
        let id = calc.subscribe(move |s| *sink.lock().unwrap() = s.rows().len());

        let actions = vec![
            Action::AddRow,
            Action::EditRow(RowKey(0), RowPatch::credits("5")),
            Action::SetGrade(RowKey(0), Grade::A),
            Action::AddRow,
            Action::EditRow(RowKey(1), RowPatch::credits("4")),
            Action::SetGrade(RowKey(1), Grade::O),
            Action::EditRow(RowKey(1), RowPatch::course("Networks")),
            Action::SetGrade(RowKey(40), Grade::F),
            Action::DeleteRow(RowKey(0)),
            Action::ClearAll,
            Action::AddRow,
        ];
        for action in actions {
            calc.apply(action);
            assert_eq!(calc.cgpa(), compute_cgpa(calc.rows()));
            assert_eq!(*seen.lock().unwrap(), calc.rows().len());
        }
        assert!(calc.unsubscribe(id));
    }
}
