use thiserror::Error;

/// Represents errors that can occur when parsing a route template.
///
/// These are configuration mistakes: they are reported once, when the route
/// is registered, and never at request time.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Hash, PartialEq, Error)]
pub enum TemplateError {
    /// A `{` was opened but never closed.
    #[error("unclosed parameter starting at byte {at}")]
    UnclosedParam {
        /// Byte offset of the opening brace.
        at: usize,
    },
    /// A lone `}` outside of a parameter, or a `{` inside one.
    #[error("unexpected brace at byte {at}, use '{{{{' or '}}}}' for literal braces")]
    UnexpectedBrace {
        /// Byte offset of the brace.
        at: usize,
    },
    /// Parameters must be registered with a name.
    #[error("parameters must be registered with a name")]
    UnnamedParam,
    /// Parameter names may only contain ASCII alphanumerics and `_`.
    #[error("invalid parameter name '{name}'")]
    InvalidName {
        /// The rejected name.
        name: String,
    },
    /// The parameter type is not known to the registry.
    #[error("unknown type '{token}' for parameter '{name}'")]
    UnknownType {
        /// The parameter using the type.
        name: String,
        /// The unresolved type token.
        token: String,
    },
    /// The parameter type has no function with this name.
    #[error("type '{token}' has no function '{func}'")]
    UnknownFunc {
        /// The parameter's type token.
        token: String,
        /// The unresolved function name.
        func: String,
    },
    /// A parameter function rejected its arguments.
    #[error("invalid arguments for '{func}': {reason}")]
    InvalidFuncArgs {
        /// The function name.
        func: String,
        /// Why the arguments were rejected.
        reason: String,
    },
    /// The `else` clause is not followed by a valid status code.
    #[error("invalid status code '{code}' in else clause")]
    InvalidStatus {
        /// The text following `else`.
        code: String,
    },
    /// Two parameters of the same template share a name.
    #[error("parameter name '{name}' is used more than once")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },
    /// Greedy parameters are only allowed at the end of a route.
    #[error("greedy parameter '{name}' is only allowed at the end of a route")]
    InvalidCatchAll {
        /// The greedy parameter.
        name: String,
    },
    /// Two parameters follow each other without any literal text in between.
    #[error("parameter '{name}' directly follows another parameter")]
    AdjacentParams {
        /// The second parameter.
        name: String,
    },
    /// A path segment holds more than one parameter.
    #[error("parameter '{name}' shares a path segment with another parameter")]
    InvalidParamSegment {
        /// The second parameter of the segment.
        name: String,
    },
    /// The parameter body could not be understood.
    #[error("malformed parameter '{param}': {reason}")]
    Malformed {
        /// The raw parameter body.
        param: String,
        /// What went wrong.
        reason: &'static str,
    },
}
