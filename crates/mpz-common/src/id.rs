use core::fmt;
use std::sync::Arc;

/// A logical thread identifier.
///
/// Both parties of a thread use the same identifier, which is how ideal
/// functionalities pair up their calls.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(Arc<[u8]>);

impl Default for ThreadId {
    fn default() -> Self {
        Self(vec![0].into())
    }
}

impl ThreadId {
    /// Creates a new thread ID with the provided ID.
    #[inline]
    pub fn new(id: u8) -> Self {
        Self(vec![id].into())
    }

    /// Returns the thread ID as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for ThreadId {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids = self.0.iter();
        if let Some(id) = ids.next() {
            write!(f, "{id}")?;
        }
        for id in ids {
            write!(f, "/{id}")?;
        }
        Ok(())
    }
}
