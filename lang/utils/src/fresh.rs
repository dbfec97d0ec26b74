//! Identifiers that are unique for the lifetime of the process.

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonic counter; an identifier handed out once is never handed out again.
#[derive(Debug)]
pub struct Fresh(AtomicU64);

impl Fresh {
    pub const fn new() -> Self {
        Fresh(AtomicU64::new(0))
    }
    pub fn alloc(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for Fresh {
    fn default() -> Self {
        Self::new()
    }
}

/// Declares identifier newtypes, each backed by its own [`Fresh`] counter.
///
/// Identifiers are compared by equality only; their numeric value carries no meaning
/// beyond allocation order.
#[macro_export]
macro_rules! fresh_key_type {
    ( $(#[$outer:meta])* $vis:vis struct $name:ident ; $($rest:tt)* ) => {
        $(#[$outer])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        $vis struct $name(u64);

        impl $name {
            pub fn fresh() -> Self {
                static FRESH: $crate::fresh::Fresh = $crate::fresh::Fresh::new();
                Self(FRESH.alloc())
            }
            pub fn index(&self) -> u64 {
                self.0
            }
            pub fn concise(&self) -> String {
                format!("#{}", self.0)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        $crate::fresh_key_type!($($rest)*);
    };

    () => {}
}
