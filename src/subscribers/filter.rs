//! # Unsubscribe filters
//!
//! A [`Filter`] selects which registrations an unsubscribe call disables:
//! - handler only → every registration of that handler;
//! - subscriber only → every registration made with that subscriber;
//! - both → only registrations equal on **both**.
//!
//! An empty filter matches nothing. The dispatcher reports it as a usage
//! warning: it guards against "unsubscribe everything for this event" by accident.

use std::fmt;

use crate::subscribers::{Handler, Subscriber};

/// Selector for [`Dispatcher::unsubscribe`](crate::Dispatcher::unsubscribe).
pub struct Filter<P> {
    handler: Option<Handler<P>>,
    subscriber: Option<Subscriber>,
}

impl<P> Filter<P> {
    /// Matches registrations of `handler`.
    pub fn handler(handler: &Handler<P>) -> Self {
        Self {
            handler: Some(handler.clone()),
            subscriber: None,
        }
    }

    /// Matches registrations made with `subscriber`.
    pub fn subscriber(subscriber: &Subscriber) -> Self {
        Self {
            handler: None,
            subscriber: Some(subscriber.clone()),
        }
    }

    /// Matches registrations of `handler` made with `subscriber`.
    pub fn both(handler: &Handler<P>, subscriber: &Subscriber) -> Self {
        Self {
            handler: Some(handler.clone()),
            subscriber: Some(subscriber.clone()),
        }
    }

    /// True if the filter names neither a handler nor a subscriber.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handler.is_none() && self.subscriber.is_none()
    }

    /// True if a registration of `handler` with `subscriber` is selected.
    pub fn matches(&self, handler: &Handler<P>, subscriber: Option<&Subscriber>) -> bool {
        match (&self.handler, &self.subscriber) {
            (Some(h), Some(s)) => h.same(handler) && subscriber == Some(s),
            (Some(h), None) => h.same(handler),
            (None, Some(s)) => subscriber == Some(s),
            (None, None) => false,
        }
    }
}

impl<P> Default for Filter<P> {
    fn default() -> Self {
        Self {
            handler: None,
            subscriber: None,
        }
    }
}

impl<P> fmt::Debug for Filter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("handler", &self.handler)
            .field("subscriber", &self.subscriber)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_requires_both() {
        let h: Handler<()> = Handler::new(|_| {});
        let other: Handler<()> = Handler::new(|_| {});
        let s = Subscriber::anonymous();

        let f = Filter::both(&h, &s);
        assert!(f.matches(&h, Some(&s)));
        assert!(!f.matches(&h, None));
        assert!(!f.matches(&other, Some(&s)));
    }

    #[test]
    fn test_single_key_filters() {
        let h: Handler<()> = Handler::new(|_| {});
        let s = Subscriber::anonymous();

        assert!(Filter::handler(&h).matches(&h.clone(), Some(&s)));
        assert!(Filter::<()>::subscriber(&s).matches(&h, Some(&s)));
        assert!(!Filter::<()>::subscriber(&s).matches(&h, None));
    }

    #[test]
    fn test_empty_filter_matches_nothing() {
        let h: Handler<()> = Handler::new(|_| {});
        let f = Filter::default();
        assert!(f.is_empty());
        assert!(!f.matches(&h, None));
    }
}
