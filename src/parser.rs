//! Parsing of route patterns into [`Template`]s.
//!
//! A pattern is literal text interleaved with parameters:
//!
//! ```ignore
//!  Syntax                          Meaning
//!  {name}                          untyped capture, accepted as is
//!  {name:type}                     typed capture, type's default status on failure
//!  {name:type func(args) ...}      typed capture with extra checks
//!  {name:type ... else 400}        explicit status on failure
//!  {{ and }}                       literal braces
//! ```
//!
//! Function arguments run until the matching parenthesis, so they may
//! themselves hold braces and parentheses. Inside arguments a backslash
//! escapes the next character, and parentheses within `[...]` classes are
//! literal:
//!
//! ```ignore
//!  /posts/{slug:string regexp(^[a-z0-9-]{3,64}$) else 400}
//!  /calls/{expr:string regexp(^\w+\([)(]*\)$)}
//! ```
//!
//! A path segment holds at most one parameter.

use crate::error::TemplateError;
use crate::registry::{self, Registry, STRING};
use crate::template::{Func, FuncCall, Param, Segment, Template};

use http::StatusCode;
use std::mem;

pub(crate) fn parse(pattern: &str, registry: &Registry) -> Result<Template, TemplateError> {
    let bytes = pattern.as_bytes();

    let mut params: Vec<Param> = Vec::new();
    let mut segments = Vec::new();
    let mut literal = String::new();

    // start of the literal text not yet copied into `literal`
    let mut start = 0;
    let mut i = 0;
    // whether the current path segment already holds a parameter
    let mut in_segment = false;

    while i < bytes.len() {
        match bytes[i] {
            c @ (b'{' | b'}') if bytes.get(i + 1) == Some(&c) => {
                literal.push_str(&pattern[start..i]);
                literal.push(c as char);
                i += 2;
                start = i;
            }
            b'}' => return Err(TemplateError::UnexpectedBrace { at: i }),
            b'{' => {
                literal.push_str(&pattern[start..i]);

                let end = find_close(bytes, i)?;
                let param = parse_param(&pattern[i + 1..end], params.len(), registry)?;

                if literal.is_empty() {
                    if let Some(Segment::Param(_)) = segments.last() {
                        return Err(TemplateError::AdjacentParams { name: param.name });
                    }
                } else {
                    segments.push(Segment::Literal(mem::take(&mut literal)));
                }

                if in_segment {
                    return Err(TemplateError::InvalidParamSegment { name: param.name });
                }

                if params.iter().any(|p| p.name == param.name) {
                    return Err(TemplateError::DuplicateName { name: param.name });
                }

                if param.greedy && end + 1 != bytes.len() {
                    return Err(TemplateError::InvalidCatchAll { name: param.name });
                }

                segments.push(Segment::Param(param.index));
                params.push(param);
                in_segment = true;

                i = end + 1;
                start = i;
            }
            c => {
                if c == b'/' {
                    in_segment = false;
                }
                i += 1;
            }
        }
    }

    literal.push_str(&pattern[start..]);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    tracing::debug!(pattern, params = params.len(), "parsed route template");

    Ok(Template {
        source: pattern.to_owned(),
        params,
        segments,
    })
}

// Tracks the parts of function arguments where parentheses are literal:
// the character after a backslash, and regex character classes.
#[derive(Default)]
struct ArgText {
    escaped: bool,
    // nesting of `[...]` classes
    class: usize,
    // 1 right after `[`, 2 right after `[^`, where a `]` is literal
    class_start: u8,
}

impl ArgText {
    // Returns `true` if `c` is plain argument text.
    fn literal(&mut self, c: u8) -> bool {
        if self.escaped {
            self.escaped = false;
            self.class_start = 0;
            return true;
        }

        if c == b'\\' {
            self.escaped = true;
            return true;
        }

        if self.class == 0 {
            if c == b'[' {
                self.class = 1;
                self.class_start = 1;
                return true;
            }
            return false;
        }

        match (self.class_start, c) {
            (1, b'^') => self.class_start = 2,
            (_, b'[') => {
                self.class += 1;
                self.class_start = 1;
            }
            (1 | 2, _) => self.class_start = 0,
            (_, b']') => self.class -= 1,
            _ => {}
        }

        true
    }
}

// Returns the position of the brace closing the parameter opened at `open`.
fn find_close(bytes: &[u8], open: usize) -> Result<usize, TemplateError> {
    // braces inside function arguments belong to the arguments
    let mut depth = 0usize;
    let mut args = ArgText::default();

    for (i, &c) in bytes.iter().enumerate().skip(open + 1) {
        if depth > 0 && args.literal(c) {
            continue;
        }

        match c {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b'{' if depth == 0 => return Err(TemplateError::UnexpectedBrace { at: i }),
            b'}' if depth == 0 => return Ok(i),
            _ => {}
        }
    }

    Err(TemplateError::UnclosedParam { at: open })
}

// Returns the position of the parenthesis closing the one at `open`.
fn find_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut args = ArgText::default();

    for (i, c) in s.bytes().enumerate().skip(open) {
        if depth > 0 && args.literal(c) {
            continue;
        }

        match c {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

fn is_ident(s: &str) -> bool {
    let mut bytes = s.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

// Parses the body of a parameter, without its braces.
fn parse_param(body: &str, index: usize, registry: &Registry) -> Result<Param, TemplateError> {
    let malformed = |reason| TemplateError::Malformed {
        param: body.to_owned(),
        reason,
    };

    let trimmed = body.trim();
    let (head, mut rest) = match trimmed.find(char::is_whitespace) {
        Some(at) => (&trimmed[..at], trimmed[at..].trim_start()),
        None => (trimmed, ""),
    };

    let (name, token) = match head.split_once(':') {
        Some((name, token)) => (name, Some(token)),
        None => (head, None),
    };

    if name.is_empty() {
        return Err(TemplateError::UnnamedParam);
    }

    if !is_ident(name) {
        return Err(TemplateError::InvalidName {
            name: name.to_owned(),
        });
    }

    let ty = match token {
        Some("") => return Err(malformed("missing type after ':'")),
        Some(token) => Some(registry.resolve(token).ok_or_else(|| {
            TemplateError::UnknownType {
                name: name.to_owned(),
                token: token.to_owned(),
            }
        })?),
        None => None,
    };

    // functions of untyped parameters are the string type's
    let func_ty = ty.or_else(|| registry.resolve(STRING));

    let mut funcs = Vec::new();
    let mut status = None;

    while !rest.is_empty() {
        if let Some(code) = strip_else(rest) {
            status = Some(parse_status(code)?);
            break;
        }

        let open = rest.find('(').ok_or_else(|| malformed("expected a function call"))?;
        let func = &rest[..open];
        if !is_ident(func) {
            return Err(malformed("invalid function name"));
        }

        let close = find_paren(rest, open).ok_or_else(|| malformed("unclosed function call"))?;
        let args = &rest[open + 1..close];

        let predicate = match func_ty {
            Some(ty) => ty.build_func(func, args)?,
            None => {
                return Err(TemplateError::UnknownFunc {
                    token: STRING.to_owned(),
                    func: func.to_owned(),
                })
            }
        };

        funcs.push(Func {
            call: FuncCall {
                name: func.to_owned(),
                args: args.to_owned(),
            },
            predicate,
        });

        let after = &rest[close + 1..];
        if !after.is_empty() && !after.starts_with(char::is_whitespace) {
            return Err(malformed("expected whitespace after a function call"));
        }
        rest = after.trim_start();
    }

    let param = match ty {
        Some(ty) => Param {
            index,
            name: name.to_owned(),
            token: ty.token().to_owned(),
            typed: true,
            evaluator: ty.evaluator(),
            status: status.unwrap_or_else(|| ty.status()),
            pass_through: ty.is_pass_through(),
            greedy: ty.is_greedy(),
            funcs,
        },
        None => Param {
            index,
            name: name.to_owned(),
            token: STRING.to_owned(),
            typed: false,
            evaluator: registry::eval_str,
            status: status.unwrap_or_else(|| {
                registry
                    .resolve(STRING)
                    .map_or(StatusCode::NOT_FOUND, |ty| ty.status())
            }),
            pass_through: true,
            greedy: false,
            funcs,
        },
    };

    Ok(param)
}

// Returns the text following a leading `else` keyword.
fn strip_else(s: &str) -> Option<&str> {
    let rest = s.strip_prefix("else")?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        return Some(rest.trim());
    }
    None
}

fn parse_status(code: &str) -> Result<StatusCode, TemplateError> {
    code.parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| TemplateError::InvalidStatus {
            code: code.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_brace_skips_function_args() {
        let bytes = b"{a:string regexp(^x{2}$)}/";
        assert_eq!(find_close(bytes, 0), Ok(24));
        assert_eq!(
            find_close(b"{a{b}", 0),
            Err(TemplateError::UnexpectedBrace { at: 2 })
        );
        assert_eq!(
            find_close(b"/{abc", 1),
            Err(TemplateError::UnclosedParam { at: 1 })
        );
    }

    #[test]
    fn nested_parens() {
        assert_eq!(find_paren("regexp(^(a|b)$) x", 6), Some(14));
        assert_eq!(find_paren("min(1", 3), None);
    }

    #[test]
    fn literal_parens_in_args() {
        assert_eq!(find_paren(r"regexp(^\(x\)$) x", 6), Some(14));
        assert_eq!(find_paren("regexp(^[(]+$) x", 6), Some(13));
        assert_eq!(find_paren("regexp(^[)a]+$)", 6), Some(14));
        assert_eq!(find_paren("regexp([^)]) x", 6), Some(11));
        assert_eq!(find_paren("regexp([]()]) x", 6), Some(12));
        assert_eq!(find_paren("regexp([[:alpha:])]) x", 6), Some(19));
        assert_eq!(find_paren("regexp([)", 6), None);

        let bytes = br"{a:string regexp(^[{(]\)$)}/";
        assert_eq!(find_close(bytes, 0), Ok(26));
        assert_eq!(find_close(b"(x) {a}", 4), Ok(6));
    }

    #[test]
    fn else_keyword() {
        assert_eq!(strip_else("else 404"), Some("404"));
        assert_eq!(strip_else("else"), Some(""));
        assert_eq!(strip_else("elsewhere(1)"), None);
        assert_eq!(strip_else("min(1)"), None);
    }

    #[test]
    fn status_codes() {
        assert_eq!(parse_status("404"), Ok(StatusCode::NOT_FOUND));
        assert!(parse_status("").is_err());
        assert!(parse_status("4o4").is_err());
        assert!(parse_status("42").is_err());
        assert!(parse_status("70000").is_err());
    }

    #[test]
    fn identifiers() {
        assert!(is_ident("id"));
        assert!(is_ident("_user_id2"));
        assert!(!is_ident("2id"));
        assert!(!is_ident("user-id"));
        assert!(!is_ident(""));
    }
}
