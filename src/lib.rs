//! Typed path-parameter macros for HTTP routers.
//!
//! A route pattern may declare the type of each of its parameters, and the
//! status code to respond with when a request's path does not fit:
//!
//! ```ignore
//!  Syntax                       Meaning
//!  {name}                       any segment, accepted as is
//!  {id:uint64}                  an unsigned integer, 404 otherwise
//!  {id:uint64 else 400}         an unsigned integer, 400 otherwise
//!  {id:uint64 range(1, 99)}     an unsigned integer between 1 and 99
//!  {rest:path}                  the remainder of the path
//! ```
//!
//! Patterns are parsed once, when routes are registered, into a
//! [`Template`]. A template whose parameters all accept anything needs no
//! runtime check; otherwise it is compiled into a [`Filter`] which runs
//! before the route's handler, converts each captured segment, and either
//! lets the request through or stops it with a status code:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use pathmacro::{Filter, Registry, Store, Template, Verdict};
//! use http::StatusCode;
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//! let template = Arc::new(Template::parse("/blog/{year:uint16}/{slug:string max(64)}", &registry)?);
//! let filter = Filter::new(template.clone()).expect("typed parameters need a filter");
//!
//! // the route matcher stores one capture per parameter, in order
//! let mut store: Store<'_> = ["2024", "hello-world"].into_iter().collect();
//! assert_eq!(filter.evaluate(&mut store), Verdict::Continue);
//! assert_eq!(store.get::<u16>(0), Some(2024));
//! assert_eq!(store.get_by_name::<&str>(&template, "slug"), Some("hello-world"));
//!
//! let mut store: Store<'_> = ["last-year", "hello-world"].into_iter().collect();
//! assert_eq!(filter.evaluate(&mut store).status(), Some(StatusCode::NOT_FOUND));
//! # Ok(())
//! # }
//! ```
//!
//! Captured values are stored by the index of their parameter, never by
//! name. Two routes may give differently typed parameters the same name,
//! but the names within one pattern must be unique.
//!
//! Matching request paths against patterns is left to a trie router;
//! [`Template::route`] renders a pattern in the syntax such routers, e.g.
//! `matchit`, expect.

#![deny(clippy::all)]
#![forbid(unsafe_code)]

mod error;
mod filter;
pub mod funcs;
mod parser;
mod registry;
mod route;
mod store;
mod template;
mod value;

pub use error::TemplateError;
pub use filter::{needs_runtime_check, Filter, Verdict};
pub use registry::{Evaluator, ParamType, Registry, STRING};
pub use route::{Dispatch, Route};
pub use store::{Entry, Store, StoreIter};
pub use template::{FuncCall, Param, Segment, Template};
pub use value::{FromValue, Value};
