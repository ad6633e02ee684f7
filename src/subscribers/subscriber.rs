//! # Subscriber identity
//!
//! A [`Subscriber`] is an optional identity attached to a registration. It is
//! used two ways:
//! - as **invocation context**: handlers read it through
//!   [`Delivery::context`](crate::Delivery::context);
//! - as **unsubscribe key**: [`Filter::subscriber`](crate::Filter::subscriber)
//!   disables every registration made with that identity.
//!
//! Equality is identity (same allocation), never value equality.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// Opaque, cloneable identity wrapping any `'static` value.
#[derive(Clone)]
pub struct Subscriber {
    value: Rc<dyn Any>,
}

impl Subscriber {
    /// Creates a new identity carrying `value`.
    pub fn new<T: 'static>(value: T) -> Self {
        Self {
            value: Rc::new(value),
        }
    }

    /// Creates a new identity with no associated value.
    pub fn anonymous() -> Self {
        Self::new(())
    }

    /// The carried value, if it is a `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl PartialEq for Subscriber {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.value, &other.value)
    }
}

impl Eq for Subscriber {}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &Rc::as_ptr(&self.value).cast::<()>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_not_value_equality() {
        let a = Subscriber::new(7_u32);
        let b = Subscriber::new(7_u32);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_downcast_checks_type() {
        let s = Subscriber::new(String::from("panel"));
        assert_eq!(s.downcast_ref::<String>().map(String::as_str), Some("panel"));
        assert!(s.downcast_ref::<u32>().is_none());
    }
}
