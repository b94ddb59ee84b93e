use crate::store::Entry;

/// The converted value of a parameter, written by its type's evaluator.
///
/// Text values borrow from the request path, so converting a parameter never
/// allocates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value<'v> {
    /// Text, e.g. from `string`, `alphabetical`, `file` or `path`.
    Str(&'v str),
    /// A signed integer, from any of the `int` types.
    Int(i64),
    /// An unsigned integer, from any of the `uint` types.
    Uint(u64),
    /// A finite float, from `float64`.
    Float(f64),
    /// A boolean, from `bool`.
    Bool(bool),
}

impl<'v> Value<'v> {
    /// Returns the text of a `Str` value.
    pub fn as_str(&self) -> Option<&'v str> {
        match *self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Types that can be read out of a store entry.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use pathmacro::{Filter, Registry, Store, Template};
/// use std::sync::Arc;
///
/// let template = Arc::new(Template::parse("/users/{id:uint64}", &Registry::new())?);
/// let filter = Filter::new(template).unwrap();
///
/// let mut store: Store<'_> = ["42"].into_iter().collect();
/// assert!(filter.evaluate(&mut store).is_continue());
///
/// assert_eq!(store.get::<u64>(0), Some(42));
/// assert_eq!(store.get::<u8>(0), Some(42));
/// assert_eq!(store.get::<&str>(0), Some("42"));
/// assert_eq!(store.get::<bool>(0), None);
/// # Ok(())
/// # }
/// ```
pub trait FromValue<'v>: Sized {
    /// Reads `Self` from the entry, or returns `None` if the entry holds
    /// something else.
    fn from_entry(entry: &Entry<'v>) -> Option<Self>;
}

// Text reads always see the raw capture, typed or not.
impl<'v> FromValue<'v> for &'v str {
    fn from_entry(entry: &Entry<'v>) -> Option<Self> {
        Some(entry.raw())
    }
}

impl<'v> FromValue<'v> for String {
    fn from_entry(entry: &Entry<'v>) -> Option<Self> {
        Some(entry.raw().to_owned())
    }
}

impl<'v> FromValue<'v> for bool {
    fn from_entry(entry: &Entry<'v>) -> Option<Self> {
        match entry.value()? {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl<'v> FromValue<'v> for f64 {
    fn from_entry(entry: &Entry<'v>) -> Option<Self> {
        match entry.value()? {
            Value::Float(f) => Some(f),
            _ => None,
        }
    }
}

macro_rules! integer_from_value {
    ($($ty:ty),+) => {$(
        impl<'v> FromValue<'v> for $ty {
            fn from_entry(entry: &Entry<'v>) -> Option<Self> {
                match entry.value()? {
                    Value::Int(n) => <$ty>::try_from(n).ok(),
                    Value::Uint(n) => <$ty>::try_from(n).ok(),
                    _ => None,
                }
            }
        }
    )+};
}

integer_from_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
