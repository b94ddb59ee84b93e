use crate::error::TemplateError;
use crate::funcs::{self, FuncBuilder, Predicate};
use crate::store::Entry;
use crate::value::Value;

use http::StatusCode;
use std::collections::hash_map::{Entry as Slot, HashMap};
use std::fmt;

/// Validates a raw capture and, on success, writes the converted value into
/// the entry.
pub type Evaluator = for<'v> fn(&'v str, &mut Entry<'v>) -> bool;

/// The token of the untyped string type, also used for `{name}`.
pub const STRING: &str = "string";

/// A parameter type: how to validate and convert a capture, the status code
/// reported when that fails, and the functions placeholders of this type may
/// use.
#[derive(Clone)]
pub struct ParamType {
    token: String,
    evaluator: Evaluator,
    status: StatusCode,
    pass_through: bool,
    greedy: bool,
    funcs: HashMap<String, FuncBuilder>,
}

impl ParamType {
    fn new(token: String, evaluator: Evaluator, status: StatusCode) -> Self {
        Self {
            token,
            evaluator,
            status,
            pass_through: false,
            greedy: false,
            funcs: HashMap::new(),
        }
    }

    /// Returns the type token, e.g. `uint64`.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the evaluator.
    pub fn evaluator(&self) -> Evaluator {
        self.evaluator
    }

    /// Returns the default status code for failed evaluations.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns `true` if the type accepts any capture, so placeholders
    /// without functions need no runtime check.
    pub fn is_pass_through(&self) -> bool {
        self.pass_through
    }

    /// Returns `true` if the type captures the remainder of the path.
    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    /// Marks the type as accepting any capture.
    pub fn pass_through(&mut self) -> &mut Self {
        self.pass_through = true;
        self
    }

    /// Marks the type as capturing the remainder of the path. Greedy
    /// placeholders must end their route.
    pub fn greedy(&mut self) -> &mut Self {
        self.greedy = true;
        self
    }

    /// Registers a parameter function for this type.
    pub fn func(&mut self, name: impl Into<String>, builder: FuncBuilder) -> &mut Self {
        self.funcs.insert(name.into(), builder);
        self
    }

    /// Returns `true` if the type has a function named `name`.
    pub fn has_func(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    // Compiles a function call found in a placeholder.
    pub(crate) fn build_func(&self, name: &str, args: &str) -> Result<Predicate, TemplateError> {
        let builder = self
            .funcs
            .get(name)
            .ok_or_else(|| TemplateError::UnknownFunc {
                token: self.token.clone(),
                func: name.to_owned(),
            })?;

        builder(args).map_err(|reason| TemplateError::InvalidFuncArgs {
            func: name.to_owned(),
            reason,
        })
    }

    fn numeric_funcs(&mut self) -> &mut Self {
        self.func("min", funcs::number_min)
            .func("max", funcs::number_max)
            .func("range", funcs::number_range)
    }

    fn text_funcs(&mut self) -> &mut Self {
        self.func("min", funcs::text_min)
            .func("max", funcs::text_max)
            .func("regexp", funcs::regexp)
            .func("prefix", funcs::prefix)
            .func("suffix", funcs::suffix)
            .func("contains", funcs::contains)
    }
}

impl fmt::Debug for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut funcs: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        funcs.sort_unstable();

        f.debug_struct("ParamType")
            .field("token", &self.token)
            .field("status", &self.status)
            .field("pass_through", &self.pass_through)
            .field("greedy", &self.greedy)
            .field("funcs", &funcs)
            .finish()
    }
}

/// The table of parameter types templates are parsed against.
///
/// [`Registry::new`] holds the built-in types:
///
/// ```ignore
///  Token                      Accepts                                  Value
///  string                     anything                                 Str
///  int, int64                 i64                                      Int
///  int8, int16, int32         range checked signed integers            Int
///  uint, uint64               u64, no sign, overflow rejected          Uint
///  uint8, uint16, uint32      range checked unsigned integers          Uint
///  float64                    finite f64                               Float
///  bool                       1, t, T, TRUE, true, True and negations  Bool
///  alphabetical               ASCII letters                            Str
///  file                       ASCII alphanumerics, '_', '.', '-'       Str
///  path                       the remainder of the path                Str
/// ```
///
/// Every built-in type fails with `404 Not Found` unless a placeholder says
/// otherwise with `else <code>`.
///
/// Custom types are registered with [`Registry::register`]:
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use pathmacro::{Entry, Registry, Template, Value};
/// use http::StatusCode;
///
/// fn hex<'v>(raw: &'v str, entry: &mut Entry<'v>) -> bool {
///     match u64::from_str_radix(raw, 16) {
///         Ok(n) => {
///             entry.set(Value::Uint(n));
///             true
///         }
///         Err(_) => false,
///     }
/// }
///
/// let mut registry = Registry::new();
/// registry.register("hex", hex, StatusCode::BAD_REQUEST);
///
/// let template = Template::parse("/colors/{rgb:hex}", &registry)?;
/// assert_eq!(template.params()[0].status(), StatusCode::BAD_REQUEST);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Registry {
    types: HashMap<String, ParamType>,
}

impl Registry {
    /// Creates a registry holding the built-in types.
    pub fn new() -> Self {
        let mut registry = Self {
            types: HashMap::new(),
        };

        let status = StatusCode::NOT_FOUND;

        registry
            .register(STRING, eval_str, status)
            .pass_through()
            .text_funcs();

        registry.register("int", eval_i64, status).numeric_funcs();
        registry.register("int64", eval_i64, status).numeric_funcs();
        registry.register("int8", eval_i8, status).numeric_funcs();
        registry.register("int16", eval_i16, status).numeric_funcs();
        registry.register("int32", eval_i32, status).numeric_funcs();

        registry.register("uint", eval_u64, status).numeric_funcs();
        registry.register("uint64", eval_u64, status).numeric_funcs();
        registry.register("uint8", eval_u8, status).numeric_funcs();
        registry.register("uint16", eval_u16, status).numeric_funcs();
        registry.register("uint32", eval_u32, status).numeric_funcs();

        registry.register("float64", eval_f64, status).numeric_funcs();
        registry.register("bool", eval_bool, status);

        registry
            .register("alphabetical", eval_alphabetical, status)
            .text_funcs();
        registry.register("file", eval_file, status).text_funcs();
        registry
            .register("path", eval_str, status)
            .pass_through()
            .greedy()
            .text_funcs();

        registry
    }

    /// Registers a parameter type, replacing any type with the same token.
    ///
    /// Returns the new type so it can be given functions or flags.
    pub fn register(
        &mut self,
        token: impl Into<String>,
        evaluator: Evaluator,
        status: StatusCode,
    ) -> &mut ParamType {
        let token = token.into();
        let ty = ParamType::new(token.clone(), evaluator, status);

        match self.types.entry(token) {
            Slot::Occupied(mut slot) => {
                slot.insert(ty);
                slot.into_mut()
            }
            Slot::Vacant(slot) => slot.insert(ty),
        }
    }

    /// Looks up the type registered under `token`.
    pub fn resolve(&self, token: &str) -> Option<&ParamType> {
        self.types.get(token)
    }

    /// Returns a mutable reference to the type registered under `token`, to
    /// add functions to a built-in type.
    pub fn resolve_mut(&mut self, token: &str) -> Option<&mut ParamType> {
        self.types.get_mut(token)
    }

    /// Returns an iterator over the registered type tokens.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn eval_str<'v>(raw: &'v str, entry: &mut Entry<'v>) -> bool {
    entry.set(Value::Str(raw));
    true
}

macro_rules! signed_evaluators {
    ($($name:ident => $ty:ty),+ $(,)?) => {$(
        fn $name<'v>(raw: &'v str, entry: &mut Entry<'v>) -> bool {
            match raw.parse::<$ty>() {
                Ok(n) => {
                    entry.set(Value::Int(n.into()));
                    true
                }
                Err(_) => false,
            }
        }
    )+};
}

macro_rules! unsigned_evaluators {
    ($($name:ident => $ty:ty),+ $(,)?) => {$(
        fn $name<'v>(raw: &'v str, entry: &mut Entry<'v>) -> bool {
            // `str::parse` accepts a leading '+', a path segment should not
            if raw.starts_with('+') {
                return false;
            }

            match raw.parse::<$ty>() {
                Ok(n) => {
                    entry.set(Value::Uint(n.into()));
                    true
                }
                Err(_) => false,
            }
        }
    )+};
}

signed_evaluators! {
    eval_i8 => i8,
    eval_i16 => i16,
    eval_i32 => i32,
    eval_i64 => i64,
}

unsigned_evaluators! {
    eval_u8 => u8,
    eval_u16 => u16,
    eval_u32 => u32,
    eval_u64 => u64,
}

fn eval_f64<'v>(raw: &'v str, entry: &mut Entry<'v>) -> bool {
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() => {
            entry.set(Value::Float(f));
            true
        }
        _ => false,
    }
}

fn eval_bool<'v>(raw: &'v str, entry: &mut Entry<'v>) -> bool {
    let value = match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => true,
        "0" | "f" | "F" | "FALSE" | "false" | "False" => false,
        _ => return false,
    };

    entry.set(Value::Bool(value));
    true
}

fn eval_alphabetical<'v>(raw: &'v str, entry: &mut Entry<'v>) -> bool {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_alphabetic()) {
        return false;
    }

    entry.set(Value::Str(raw));
    true
}

fn eval_file<'v>(raw: &'v str, entry: &mut Entry<'v>) -> bool {
    let valid = |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-');
    if raw.is_empty() || !raw.bytes().all(valid) {
        return false;
    }

    entry.set(Value::Str(raw));
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(registry: &Registry, token: &str, raw: &str) -> Option<Value<'static>> {
        let raw: &'static str = Box::leak(raw.to_owned().into_boxed_str());
        let mut entry = Entry::new(raw);
        let ty = registry.resolve(token).unwrap();
        (ty.evaluator())(raw, &mut entry).then(|| entry.value().unwrap())
    }

    #[test]
    fn integers() {
        let registry = Registry::new();

        assert_eq!(eval(&registry, "uint64", "42"), Some(Value::Uint(42)));
        assert_eq!(eval(&registry, "uint64", "-1"), None);
        assert_eq!(eval(&registry, "uint64", "+1"), None);
        assert_eq!(eval(&registry, "uint64", "99999999999999999999"), None);
        assert_eq!(
            eval(&registry, "uint64", "18446744073709551615"),
            Some(Value::Uint(u64::MAX))
        );
        assert_eq!(eval(&registry, "uint8", "255"), Some(Value::Uint(255)));
        assert_eq!(eval(&registry, "uint8", "256"), None);

        assert_eq!(eval(&registry, "int", "-1"), Some(Value::Int(-1)));
        assert_eq!(eval(&registry, "int8", "-129"), None);
        assert_eq!(eval(&registry, "int32", "12a"), None);
        assert_eq!(eval(&registry, "int64", ""), None);
    }

    #[test]
    fn floats_and_bools() {
        let registry = Registry::new();

        assert_eq!(eval(&registry, "float64", "1.5"), Some(Value::Float(1.5)));
        assert_eq!(eval(&registry, "float64", "inf"), None);
        assert_eq!(eval(&registry, "float64", "NaN"), None);

        assert_eq!(eval(&registry, "bool", "True"), Some(Value::Bool(true)));
        assert_eq!(eval(&registry, "bool", "0"), Some(Value::Bool(false)));
        assert_eq!(eval(&registry, "bool", "yes"), None);
    }

    #[test]
    fn text() {
        let registry = Registry::new();

        assert_eq!(eval(&registry, "alphabetical", "abc"), Some(Value::Str("abc")));
        assert_eq!(eval(&registry, "alphabetical", "abc1"), None);
        assert_eq!(eval(&registry, "alphabetical", ""), None);

        assert_eq!(
            eval(&registry, "file", "report-2024_v1.pdf"),
            Some(Value::Str("report-2024_v1.pdf"))
        );
        assert_eq!(eval(&registry, "file", "a/b"), None);

        assert_eq!(eval(&registry, "path", "a/b/c"), Some(Value::Str("a/b/c")));
        assert_eq!(eval(&registry, "string", "anything at all"), Some(Value::Str("anything at all")));
    }

    #[test]
    fn flags_and_funcs() {
        let registry = Registry::new();

        let path = registry.resolve("path").unwrap();
        assert!(path.is_greedy() && path.is_pass_through());
        assert!(path.has_func("regexp"));

        let uint = registry.resolve("uint64").unwrap();
        assert!(!uint.is_greedy() && !uint.is_pass_through());
        assert!(uint.has_func("range"));
        assert!(!uint.has_func("regexp"));
        assert_eq!(uint.status(), StatusCode::NOT_FOUND);

        assert!(registry.resolve("bool").unwrap().build_func("min", "1").is_err());
        assert!(registry.resolve("long").is_none());
    }

    #[test]
    fn register_replaces() {
        let mut registry = Registry::new();
        registry.register("uint64", eval_str, StatusCode::BAD_REQUEST);

        let ty = registry.resolve("uint64").unwrap();
        assert_eq!(ty.status(), StatusCode::BAD_REQUEST);
        assert!(!ty.has_func("min"));
    }
}
