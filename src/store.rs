use crate::template::Template;
use crate::value::{FromValue, Value};

use std::iter::FromIterator;
use std::{fmt, iter, mem, slice};

/// The captured segment of a single parameter, and its converted value once
/// the parameter has been evaluated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entry<'v> {
    raw: &'v str,
    value: Option<Value<'v>>,
}

impl<'v> Entry<'v> {
    /// Creates an entry holding only the raw capture.
    pub fn new(raw: &'v str) -> Self {
        Self { raw, value: None }
    }

    /// Returns the raw captured segment.
    pub fn raw(&self) -> &'v str {
        self.raw
    }

    /// Returns the converted value, if the parameter was evaluated.
    pub fn value(&self) -> Option<Value<'v>> {
        self.value
    }

    /// Records the converted value. Called by evaluators on success.
    pub fn set(&mut self, value: Value<'v>) {
        self.value = Some(value);
    }

    // Drops the converted value of a capture that failed its checks.
    pub(crate) fn clear(&mut self) {
        self.value = None;
    }
}

/// The per-request parameter store.
///
/// Entries are addressed by the index of their parameter in the template,
/// never by name: two templates may use the same name for differently typed
/// parameters, and only the index is guaranteed to line up with the
/// matcher's captures.
///
/// ```rust
/// use pathmacro::{Store, Value};
///
/// // The route matcher pushes captures in declaration order.
/// let mut store = Store::new();
/// store.push("alice");
/// store.push("42");
///
/// assert_eq!(store.raw(1), Some("42"));
/// assert!(store.set_typed(1, Value::Uint(42)));
/// assert_eq!(store.get::<u64>(1), Some(42));
/// assert_eq!(store.get::<u64>(2), None);
/// ```
#[derive(PartialEq, Clone)]
pub struct Store<'v> {
    kind: StoreKind<'v>,
}

// Most routes have a small number of dynamic parameters, so we can avoid
// heap allocations in the common case.
const SMALL: usize = 3;

// Upper bound on parameter indices accepted by `set_raw` in debug builds.
const MAX_INDEX: usize = u16::MAX as usize;

// A list of slots, optimized to avoid allocations when possible. A slot is
// vacant when `set_raw` skipped over it.
#[derive(PartialEq, Clone)]
enum StoreKind<'v> {
    Small([Option<Entry<'v>>; SMALL], usize),
    Large(Vec<Option<Entry<'v>>>),
}

impl<'v> Store<'v> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            kind: StoreKind::Small([None; SMALL], 0),
        }
    }

    /// Returns the number of slots, vacant ones included.
    pub fn len(&self) -> usize {
        match self.kind {
            StoreKind::Small(_, len) => len,
            StoreKind::Large(ref vec) => vec.len(),
        }
    }

    /// Returns `true` if the store holds no slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slots(&self) -> &[Option<Entry<'v>>] {
        match &self.kind {
            StoreKind::Small(arr, len) => &arr[..*len],
            StoreKind::Large(vec) => vec,
        }
    }

    fn slots_mut(&mut self) -> &mut [Option<Entry<'v>>] {
        match &mut self.kind {
            StoreKind::Small(arr, len) => &mut arr[..*len],
            StoreKind::Large(vec) => vec,
        }
    }

    // Appends a slot.
    fn push_slot(&mut self, slot: Option<Entry<'v>>) {
        #[cold]
        fn drain_to_vec<T: Default>(len: usize, elem: T, arr: &mut [T; SMALL]) -> Vec<T> {
            let mut vec = Vec::with_capacity(len + 1);
            vec.extend(arr.iter_mut().map(mem::take));
            vec.push(elem);
            vec
        }

        match &mut self.kind {
            StoreKind::Small(arr, len) => {
                if *len == SMALL {
                    self.kind = StoreKind::Large(drain_to_vec(*len, slot, arr));
                    return;
                }

                arr[*len] = slot;
                *len += 1;
            }
            StoreKind::Large(vec) => vec.push(slot),
        }
    }

    /// Appends the raw capture of the next parameter.
    pub fn push(&mut self, raw: &'v str) {
        self.push_slot(Some(Entry::new(raw)));
    }

    /// Stores the raw capture of the parameter at `index`.
    ///
    /// Any slots skipped over stay vacant. A typed value previously held at
    /// `index` is discarded.
    ///
    /// `index` must be the index of a parameter of the template the store
    /// is evaluated against. Every slot up to `index` is allocated, so
    /// indices beyond the template's parameters only waste memory, and debug
    /// builds panic on indices no template could produce.
    pub fn set_raw(&mut self, index: usize, raw: &'v str) {
        debug_assert!(
            index < MAX_INDEX,
            "parameter index {index} is out of range for any route"
        );

        while self.len() <= index {
            self.push_slot(None);
        }

        self.slots_mut()[index] = Some(Entry::new(raw));
    }

    /// Returns the entry at `index`.
    pub fn entry(&self, index: usize) -> Option<&Entry<'v>> {
        self.slots().get(index)?.as_ref()
    }

    /// Returns a mutable reference to the entry at `index`.
    pub fn entry_mut(&mut self, index: usize) -> Option<&mut Entry<'v>> {
        self.slots_mut().get_mut(index)?.as_mut()
    }

    /// Returns the raw capture at `index`.
    pub fn raw(&self, index: usize) -> Option<&'v str> {
        self.entry(index).map(Entry::raw)
    }

    /// Records the converted value at `index`.
    ///
    /// Returns `false` if there is no entry at `index`.
    pub fn set_typed(&mut self, index: usize, value: Value<'v>) -> bool {
        match self.entry_mut(index) {
            Some(entry) => {
                entry.set(value);
                true
            }
            None => false,
        }
    }

    /// Returns the converted value at `index`, if it has been evaluated.
    pub fn typed(&self, index: usize) -> Option<Value<'v>> {
        self.entry(index)?.value()
    }

    /// Reads the parameter at `index` as `T`.
    ///
    /// Text reads (`&str`, `String`) return the raw capture and work for
    /// every entry; all other types need a converted value of a compatible
    /// kind.
    pub fn get<T: FromValue<'v>>(&self, index: usize) -> Option<T> {
        T::from_entry(self.entry(index)?)
    }

    /// Reads the parameter named `name` in `template` as `T`.
    ///
    /// This is a convenience over [`Store::get`]; the name is resolved to an
    /// index through the template this store was evaluated against.
    pub fn get_by_name<T: FromValue<'v>>(&self, template: &Template, name: &str) -> Option<T> {
        self.get(template.index_of(name)?)
    }

    /// Returns an iterator over the occupied entries and their indices.
    pub fn iter(&self) -> StoreIter<'_, 'v> {
        StoreIter {
            inner: self.slots().iter().enumerate(),
        }
    }
}

impl Default for Store<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'v> FromIterator<&'v str> for Store<'v> {
    fn from_iter<I: IntoIterator<Item = &'v str>>(iter: I) -> Self {
        let mut store = Store::new();
        for raw in iter {
            store.push(raw);
        }
        store
    }
}

impl fmt::Debug for Store<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// An iterator over the occupied entries of a [store](crate::Store).
pub struct StoreIter<'s, 'v> {
    inner: iter::Enumerate<slice::Iter<'s, Option<Entry<'v>>>>,
}

impl<'s, 'v> Iterator for StoreIter<'s, 'v> {
    type Item = (usize, &'s Entry<'v>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .by_ref()
            .find_map(|(index, slot)| slot.as_ref().map(|entry| (index, entry)))
    }
}
