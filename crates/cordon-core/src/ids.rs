//! Strongly typed, zero-cost identifier wrappers.
//!
//! Both IDs are `Copy + Ord + Hash` so they can be used as map keys and
//! sort-merge keys without ceremony.  The inner integer is `pub` to allow
//! direct indexing into parallel `Vec`s, but callers should prefer the
//! `.index()` helper for clarity.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl From<usize> for $name {
            /// Panics in debug mode if `n` does not fit the inner integer.
            #[inline(always)]
            fn from(n: usize) -> $name {
                debug_assert!(n <= <$inner>::MAX as usize);
                $name(n as $inner)
            }
        }
    };
}

typed_id! {
    /// A person's position in the scenario's population list.
    ///
    /// Ids are assigned sequentially by insertion order and are the sort key
    /// for every cross-patch merge, so they must never be reassigned.
    pub struct PersonId(u32);
}

typed_id! {
    /// A patch's position in the partition, row-major (top-left patch is 0).
    pub struct PatchId(u32);
}
