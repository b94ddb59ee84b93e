//! Builders for the parameter functions a placeholder may chain after its
//! type, e.g. `{id:uint64 range(1, 100)}` or `{slug:string regexp(^[a-z-]+$)}`.
//!
//! A builder receives the raw text between the parentheses when the template
//! is parsed and returns a [`Predicate`] over the converted value, or the
//! reason the arguments are invalid.

use crate::value::Value;

use regex::Regex;
use std::cmp::Ordering;
use std::sync::Arc;

/// A compiled parameter function, run against a parameter's converted value.
pub type Predicate = Arc<dyn Fn(&Value<'_>) -> bool + Send + Sync>;

/// Builds a [`Predicate`] from the raw arguments of a function call.
pub type FuncBuilder = fn(&str) -> Result<Predicate, String>;

/// Boxes a closure as a [`Predicate`].
pub fn predicate<F>(f: F) -> Predicate
where
    F: Fn(&Value<'_>) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

// Splits comma separated arguments, rejecting empty ones.
fn split_args(args: &str) -> Result<Vec<&str>, String> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.iter().any(|part| part.is_empty()) {
        return Err(format!("empty argument in '{}'", args));
    }
    Ok(parts)
}

fn single_arg(args: &str) -> Result<&str, String> {
    match split_args(args)?.as_slice() {
        [arg] => Ok(*arg),
        parts => Err(format!("expected 1 argument, found {}", parts.len())),
    }
}

// Text arguments are taken whole, commas included.
fn text_arg(args: &str) -> Result<String, String> {
    let arg = args.trim();
    if arg.is_empty() {
        return Err("expected an argument".to_owned());
    }
    Ok(arg.to_owned())
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    fn parse(arg: &str) -> Result<Number, String> {
        if let Ok(n) = arg.parse::<i128>() {
            return Ok(Number::Int(n));
        }

        match arg.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Number::Float(f)),
            _ => Err(format!("'{}' is not a number", arg)),
        }
    }

    fn of(value: &Value<'_>) -> Option<Number> {
        match *value {
            Value::Int(n) => Some(Number::Int(n.into())),
            Value::Uint(n) => Some(Number::Int(n.into())),
            Value::Float(f) => Some(Number::Float(f)),
            _ => None,
        }
    }

    fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }
}

fn compare(value: &Value<'_>, bound: Number) -> Option<Ordering> {
    Number::of(value)?.compare(bound)
}

/// `min(n)` for numeric types: the value must be at least `n`.
pub fn number_min(args: &str) -> Result<Predicate, String> {
    let bound = Number::parse(single_arg(args)?)?;
    Ok(predicate(move |value| {
        matches!(compare(value, bound), Some(Ordering::Greater | Ordering::Equal))
    }))
}

/// `max(n)` for numeric types: the value must be at most `n`.
pub fn number_max(args: &str) -> Result<Predicate, String> {
    let bound = Number::parse(single_arg(args)?)?;
    Ok(predicate(move |value| {
        matches!(compare(value, bound), Some(Ordering::Less | Ordering::Equal))
    }))
}

/// `range(low, high)` for numeric types, inclusive on both ends.
pub fn number_range(args: &str) -> Result<Predicate, String> {
    let (low, high) = match split_args(args)?.as_slice() {
        [low, high] => (Number::parse(low)?, Number::parse(high)?),
        parts => return Err(format!("expected 2 arguments, found {}", parts.len())),
    };

    if low.compare(high) == Some(Ordering::Greater) {
        return Err("range start is greater than its end".to_owned());
    }

    Ok(predicate(move |value| {
        matches!(compare(value, low), Some(Ordering::Greater | Ordering::Equal))
            && matches!(compare(value, high), Some(Ordering::Less | Ordering::Equal))
    }))
}

fn parse_len(args: &str) -> Result<usize, String> {
    let arg = single_arg(args)?;
    arg.parse()
        .map_err(|_| format!("'{}' is not a valid length", arg))
}

/// `min(n)` for text types: at least `n` characters.
pub fn text_min(args: &str) -> Result<Predicate, String> {
    let len = parse_len(args)?;
    Ok(predicate(move |value| {
        value.as_str().is_some_and(|s| s.chars().count() >= len)
    }))
}

/// `max(n)` for text types: at most `n` characters.
pub fn text_max(args: &str) -> Result<Predicate, String> {
    let len = parse_len(args)?;
    Ok(predicate(move |value| {
        value.as_str().is_some_and(|s| s.chars().count() <= len)
    }))
}

/// `regexp(expr)`: the value must contain a match of `expr`. Anchor the
/// expression with `^` and `$` to match the whole value.
pub fn regexp(args: &str) -> Result<Predicate, String> {
    let re = Regex::new(args.trim()).map_err(|err| err.to_string())?;
    Ok(predicate(move |value| {
        value.as_str().is_some_and(|s| re.is_match(s))
    }))
}

/// `prefix(s)`: the value must start with `s`.
pub fn prefix(args: &str) -> Result<Predicate, String> {
    let prefix = text_arg(args)?;
    Ok(predicate(move |value| {
        value.as_str().is_some_and(|s| s.starts_with(prefix.as_str()))
    }))
}

/// `suffix(s)`: the value must end with `s`.
pub fn suffix(args: &str) -> Result<Predicate, String> {
    let suffix = text_arg(args)?;
    Ok(predicate(move |value| {
        value.as_str().is_some_and(|s| s.ends_with(suffix.as_str()))
    }))
}

/// `contains(s)`: the value must contain `s`.
pub fn contains(args: &str) -> Result<Predicate, String> {
    let needle = text_arg(args)?;
    Ok(predicate(move |value| {
        value.as_str().is_some_and(|s| s.contains(needle.as_str()))
    }))
}
