//! Environment values threaded through scopes.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// An opaque value handed from a scope to every scope nested inside it.
///
/// [`Scope::with_env`](super::Scope::with_env) replaces it for one subtree.
#[derive(Clone, Default)]
pub struct Env {
    value: Option<Rc<dyn Any>>,
}

impl Env {
    pub fn new<T: 'static>(value: T) -> Self {
        Self {
            value: Some(Rc::new(value)),
        }
    }

    /// Empty environment.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Borrow the value if it has type `T`.
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.value.as_ref().and_then(|v| v.downcast_ref::<T>())
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("set", &self.value.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_lookup() {
        let env = Env::new(42u32);
        assert_eq!(env.get::<u32>(), Some(&42));
        assert_eq!(env.get::<i64>(), None);
        assert!(!env.is_empty());
        assert!(Env::empty().get::<u32>().is_none());
    }
}
