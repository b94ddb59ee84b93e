use crate::error::TemplateError;
use crate::funcs::Predicate;
use crate::parser;
use crate::registry::{Evaluator, Registry};
use crate::store::Entry;

use http::StatusCode;
use std::fmt;

/// The parsed dynamic structure of a route pattern.
///
/// A template is built once, when its route is registered, and is read-only
/// afterwards. It is shared by every request matching the route.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use pathmacro::{Registry, Template};
/// use http::StatusCode;
///
/// let registry = Registry::new();
/// let template = Template::parse("/users/{name}/posts/{id:uint64 else 400}", &registry)?;
///
/// let params = template.params();
/// assert_eq!(params.len(), 2);
/// assert_eq!((params[0].index(), params[0].name()), (0, "name"));
/// assert_eq!((params[1].index(), params[1].type_token()), (1, "uint64"));
/// assert_eq!(params[1].status(), StatusCode::BAD_REQUEST);
///
/// // the pattern as a trie matcher understands it
/// assert_eq!(template.route(), "/users/{name}/posts/{id}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    pub(crate) source: String,
    pub(crate) params: Vec<Param>,
    pub(crate) segments: Vec<Segment>,
}

impl Template {
    /// Parses a route pattern against the types of `registry`.
    pub fn parse(pattern: &str, registry: &Registry) -> Result<Template, TemplateError> {
        parser::parse(pattern, registry)
    }

    /// Returns the pattern this template was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the parameters in declaration order.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Returns the literal text and parameters of the pattern, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if the pattern has no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the index of the parameter named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.params
            .iter()
            .find(|param| param.name == name)
            .map(|param| param.index)
    }

    /// Returns `true` if at least one parameter has to be evaluated at
    /// request time.
    pub fn needs_runtime_check(&self) -> bool {
        self.params.iter().any(Param::needs_eval)
    }

    /// Renders the pattern in the syntax of a trie matcher: `{name}` for a
    /// single segment, `{*name}` for a greedy parameter, and `{{`/`}}` for
    /// literal braces.
    ///
    /// Templates hold at most one parameter per path segment, as such
    /// matchers require. Literal text after a parameter in the same segment,
    /// e.g. `{name}.json`, needs a matcher that supports suffixes.
    pub fn route(&self) -> String {
        let mut route = String::with_capacity(self.source.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => {
                    for c in text.chars() {
                        match c {
                            '{' => route.push_str("{{"),
                            '}' => route.push_str("}}"),
                            c => route.push(c),
                        }
                    }
                }
                Segment::Param(index) => {
                    let param = &self.params[*index];
                    route.push('{');
                    if param.greedy {
                        route.push('*');
                    }
                    route.push_str(&param.name);
                    route.push('}');
                }
            }
        }

        route
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A piece of a route pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, with escaped braces already unescaped.
    Literal(String),
    /// The parameter at this index of the template.
    Param(usize),
}

/// A function call written after a parameter's type, e.g. `min(1)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncCall {
    pub(crate) name: String,
    pub(crate) args: String,
}

impl FuncCall {
    /// Returns the function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw text between the parentheses.
    pub fn args(&self) -> &str {
        &self.args
    }
}

#[derive(Clone)]
pub(crate) struct Func {
    pub(crate) call: FuncCall,
    pub(crate) predicate: Predicate,
}

/// A single parameter of a [`Template`].
#[derive(Clone)]
pub struct Param {
    pub(crate) index: usize,
    pub(crate) name: String,
    pub(crate) token: String,
    pub(crate) typed: bool,
    pub(crate) evaluator: Evaluator,
    pub(crate) status: StatusCode,
    pub(crate) pass_through: bool,
    pub(crate) greedy: bool,
    pub(crate) funcs: Vec<Func>,
}

impl Param {
    /// Returns the position of the parameter in its template, which is also
    /// the index of its capture in the store.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type token, `string` for untyped parameters.
    pub fn type_token(&self) -> &str {
        &self.token
    }

    /// Returns `true` if the pattern spelled out a type.
    pub fn is_typed(&self) -> bool {
        self.typed
    }

    /// Returns the status code reported when evaluation fails.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns `true` if the parameter captures the remainder of the path.
    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    /// Returns the function calls of this parameter, in order.
    pub fn funcs(&self) -> impl ExactSizeIterator<Item = &FuncCall> {
        self.funcs.iter().map(|func| &func.call)
    }

    /// Returns `false` if any capture is accepted as is: untyped parameters
    /// and pass-through types without functions need no runtime check.
    pub fn needs_eval(&self) -> bool {
        !self.funcs.is_empty() || (self.typed && !self.pass_through)
    }

    /// Validates and converts the capture held by `entry`.
    ///
    /// On success the entry holds the converted value, on failure it holds
    /// none.
    pub fn eval<'v>(&self, entry: &mut Entry<'v>) -> bool {
        let raw = entry.raw();
        if !(self.evaluator)(raw, entry) {
            entry.clear();
            return false;
        }

        let valid = match entry.value() {
            Some(value) => self.funcs.iter().all(|func| (func.predicate)(&value)),
            None => self.funcs.is_empty(),
        };

        if !valid {
            entry.clear();
        }
        valid
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.name == other.name
            && self.token == other.token
            && self.typed == other.typed
            && self.status == other.status
            && self.pass_through == other.pass_through
            && self.greedy == other.greedy
            && self.funcs().eq(other.funcs())
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Param")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("type", &self.token)
            .field("typed", &self.typed)
            .field("status", &self.status)
            .field("greedy", &self.greedy)
            .field("funcs", &self.funcs().collect::<Vec<_>>())
            .finish()
    }
}
