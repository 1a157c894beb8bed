//! # Decode Nesting Limits
//!
//! Bounds recursion while deserializing recursive types. Each recursive
//! field is decoded through [`bounded`], which counts the levels currently
//! open on this thread and fails the decode once `max` is exceeded, before
//! descending further.

use serde::de::{Deserialize, Deserializer, Error};
use std::cell::Cell;
use std::thread::LocalKey;

thread_local! {
    /// Open key lists and threshold key lists.
    pub(crate) static KEY_LISTS: Cell<usize> = const { Cell::new(0) };
    /// Open scheduled operations.
    pub(crate) static SCHEDULED_TXNS: Cell<usize> = const { Cell::new(0) };
}

/// One open level; closes on drop, including on decode errors.
struct Level {
    counter: &'static LocalKey<Cell<usize>>,
}

impl Level {
    fn open(counter: &'static LocalKey<Cell<usize>>) -> (Self, usize) {
        let depth = counter.with(|open| {
            let depth = open.get() + 1;
            open.set(depth);
            depth
        });
        (Self { counter }, depth)
    }
}

impl Drop for Level {
    fn drop(&mut self) {
        self.counter.with(|open| open.set(open.get().saturating_sub(1)));
    }
}

/// Deserialize one more level of `what`, failing past `max` open levels.
pub(crate) fn bounded<'de, D, T>(
    deserializer: D,
    counter: &'static LocalKey<Cell<usize>>,
    max: usize,
    what: &str,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let (_level, depth) = Level::open(counter);
    if depth > max {
        return Err(D::Error::custom(format_args!(
            "{what} nesting exceeds {max} levels"
        )));
    }
    T::deserialize(deserializer)
}
