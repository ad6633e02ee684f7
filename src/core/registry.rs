//! # Handler registry - per-event ordered subscription records.
//!
//! Maps an event name to the records subscribed to it, in registration order
//! (registration order = delivery order).
//!
//! ## Architecture
//! ```text
//! register(name, handler, subscriber) ──► push Record { disabled: false }
//! mark_disabled(name?, filter)        ──► record.disabled = true   (no removal)
//! compact()                           ──► drop disabled records, drop empty names
//! snapshot(name)                      ──► Vec<Rc<Record>> for iteration
//! ```
//!
//! ## Rules
//! - No deduplication: registering the same handler twice yields two deliveries.
//! - Unsubscribe never removes records; removal happens only in `compact`, which
//!   the dispatcher defers to a frame so a handler may unsubscribe itself or a
//!   sibling mid-delivery.
//! - A name is present iff it has at least one record (possibly disabled) since
//!   the last compaction.
//! - Delivery iterates a snapshot of `Rc<Record>`s; the `disabled` flag is shared,
//!   so a record disabled mid-delivery is skipped by that same delivery.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::subscribers::{Filter, Handler, Subscriber};

/// One subscription.
pub(crate) struct Record<P> {
    pub(crate) handler: Handler<P>,
    pub(crate) subscriber: Option<Subscriber>,
    disabled: Cell<bool>,
}

impl<P> Record<P> {
    fn new(handler: Handler<P>, subscriber: Option<Subscriber>) -> Self {
        Self {
            handler,
            subscriber,
            disabled: Cell::new(false),
        }
    }

    #[inline]
    pub(crate) fn is_enabled(&self) -> bool {
        !self.disabled.get()
    }

    /// Disables the record if `filter` selects it; returns true if it changed.
    fn disable_if(&self, filter: &Filter<P>) -> bool {
        if self.disabled.get() || !filter.matches(&self.handler, self.subscriber.as_ref()) {
            return false;
        }
        self.disabled.set(true);
        true
    }
}

/// Ordered subscription lists keyed by event name.
pub(crate) struct Registry<P> {
    records: RefCell<HashMap<Arc<str>, Vec<Rc<Record<P>>>>>,
}

impl<P> Registry<P> {
    /// Creates an empty registry.
    pub(crate) fn new() -> Self {
        Self {
            records: RefCell::new(HashMap::new()),
        }
    }

    /// Appends an enabled record for `name`, creating the list if absent.
    pub(crate) fn register(&self, name: &str, handler: Handler<P>, subscriber: Option<Subscriber>) {
        let record = Rc::new(Record::new(handler, subscriber));
        let mut records = self.records.borrow_mut();
        match records.get_mut(name) {
            Some(list) => list.push(record),
            None => {
                records.insert(Arc::from(name), vec![record]);
            }
        }
    }

    /// Disables records selected by `filter`.
    ///
    /// If `name` is given and present, only that event's records are scanned;
    /// otherwise every event's records are. Returns how many records changed.
    pub(crate) fn mark_disabled(&self, name: Option<&str>, filter: &Filter<P>) -> usize {
        let records = self.records.borrow();
        match name.and_then(|n| records.get(n)) {
            Some(list) => list.iter().filter(|r| r.disable_if(filter)).count(),
            None => records
                .values()
                .flatten()
                .filter(|r| r.disable_if(filter))
                .count(),
        }
    }

    /// Drops disabled records and empty names. Returns how many records were removed.
    pub(crate) fn compact(&self) -> usize {
        let mut records = self.records.borrow_mut();
        let mut removed = 0;
        records.retain(|_, list| {
            let before = list.len();
            list.retain(|r| r.is_enabled());
            removed += before - list.len();
            !list.is_empty()
        });
        removed
    }

    /// Records of `name` at call time.
    pub(crate) fn snapshot(&self, name: &str) -> Vec<Rc<Record<P>>> {
        self.records
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// True if `name` has at least one stored record.
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.records.borrow().contains_key(name)
    }

    /// Number of stored records for `name`, including disabled ones.
    pub(crate) fn len(&self, name: &str) -> usize {
        self.records.borrow().get(name).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Handler<()> {
        Handler::new(|_| {})
    }

    #[test]
    fn test_register_appends_without_dedup() {
        let reg = Registry::new();
        let h = noop();
        reg.register("e", h.clone(), None);
        reg.register("e", h.clone(), None);
        assert_eq!(reg.len("e"), 2);
        assert_eq!(reg.snapshot("e").len(), 2);
    }

    #[test]
    fn test_mark_disabled_by_handler_hits_all_copies() {
        let reg = Registry::new();
        let h = noop();
        let other = noop();
        reg.register("e", h.clone(), None);
        reg.register("e", other.clone(), None);
        reg.register("e", h.clone(), None);

        assert_eq!(reg.mark_disabled(Some("e"), &Filter::handler(&h)), 2);
        let enabled: Vec<bool> = reg.snapshot("e").iter().map(|r| r.is_enabled()).collect();
        assert_eq!(enabled, [false, true, false]);

        // Already disabled records are left alone.
        assert_eq!(reg.mark_disabled(Some("e"), &Filter::handler(&h)), 0);
    }

    #[test]
    fn test_mark_disabled_unknown_name_scans_everything() {
        let reg = Registry::new();
        let s = Subscriber::anonymous();
        reg.register("a", noop(), Some(s.clone()));
        reg.register("b", noop(), Some(s.clone()));
        reg.register("b", noop(), None);

        assert_eq!(reg.mark_disabled(Some("missing"), &Filter::subscriber(&s)), 2);
        assert_eq!(reg.mark_disabled(None, &Filter::subscriber(&s)), 0);
    }

    #[test]
    fn test_compact_drops_disabled_and_empty_names() {
        let reg = Registry::new();
        let h = noop();
        let keep = noop();
        reg.register("a", h.clone(), None);
        reg.register("b", h.clone(), None);
        reg.register("b", keep.clone(), None);

        reg.mark_disabled(None, &Filter::handler(&h));
        assert!(reg.contains("a"));

        assert_eq!(reg.compact(), 2);
        assert!(!reg.contains("a"));
        assert_eq!(reg.len("b"), 1);

        // Idempotent.
        assert_eq!(reg.compact(), 0);
        assert_eq!(reg.len("b"), 1);
    }

    #[test]
    fn test_snapshot_shares_disabled_flag() {
        let reg = Registry::new();
        let h = noop();
        reg.register("e", h.clone(), None);

        let snap = reg.snapshot("e");
        reg.mark_disabled(Some("e"), &Filter::handler(&h));
        assert!(!snap[0].is_enabled());
    }
}
