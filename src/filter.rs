use crate::store::Store;
use crate::template::Template;

use http::StatusCode;
use std::sync::Arc;

/// Reports whether `template` needs a [`Filter`] to validate its parameters
/// before the route's handler runs.
///
/// Routes without parameters, or with only untyped and pass-through ones,
/// are served without any per-request work from this crate.
pub fn needs_runtime_check(template: &Template) -> bool {
    template.needs_runtime_check()
}

/// The outcome of evaluating a request's parameters.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Every parameter is valid, continue to the next handler.
    Continue,
    /// The parameter at `index` failed its check. Stop the chain and respond
    /// with `status`.
    Reject {
        /// The index of the failing parameter.
        index: usize,
        /// The parameter's status code.
        status: StatusCode,
    },
    /// No capture was stored for the parameter at `index`, so the matcher
    /// and the template disagree. Stop the chain.
    Fault {
        /// The index of the parameter without capture.
        index: usize,
    },
}

impl Verdict {
    /// Returns `true` for [`Verdict::Continue`].
    pub fn is_continue(&self) -> bool {
        matches!(self, Verdict::Continue)
    }

    /// Returns the status code to respond with, or `None` if the chain
    /// continues. Faults respond with `500 Internal Server Error`.
    pub fn status(&self) -> Option<StatusCode> {
        match *self {
            Verdict::Continue => None,
            Verdict::Reject { status, .. } => Some(status),
            Verdict::Fault { .. } => Some(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

/// A compiled, reusable check of a template's parameters.
///
/// A filter is built once per route and evaluated for every matching
/// request. It holds no per-request state, so one filter can serve any
/// number of concurrent requests, each with its own [`Store`].
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use pathmacro::{Filter, Registry, Store, Template, Verdict};
/// use http::StatusCode;
/// use std::sync::Arc;
///
/// let registry = Registry::new();
///
/// // nothing to check, no filter
/// let template = Template::parse("/users/{name}", &registry)?;
/// assert!(Filter::new(Arc::new(template)).is_none());
///
/// let template = Template::parse("/users/{id:uint64 else 400}", &registry)?;
/// let filter = Filter::new(Arc::new(template)).unwrap();
///
/// let mut store: Store<'_> = ["42"].into_iter().collect();
/// assert_eq!(filter.evaluate(&mut store), Verdict::Continue);
/// assert_eq!(store.get::<u64>(0), Some(42));
///
/// let mut store: Store<'_> = ["alice"].into_iter().collect();
/// let verdict = filter.evaluate(&mut store);
/// assert_eq!(verdict.status(), Some(StatusCode::BAD_REQUEST));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Filter {
    template: Arc<Template>,
}

impl Filter {
    /// Compiles a filter for `template`, or returns `None` if none of its
    /// parameters needs a runtime check.
    pub fn new(template: Arc<Template>) -> Option<Filter> {
        if !template.needs_runtime_check() {
            tracing::debug!(route = template.source(), "static route, no filter");
            return None;
        }

        tracing::debug!(
            route = template.source(),
            params = template.len(),
            "compiled route filter"
        );

        Some(Filter { template })
    }

    /// Returns the template this filter checks.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Evaluates the parameters in declaration order, stopping at the first
    /// failure.
    ///
    /// Captures are looked up by index, and converted values are written
    /// back to the store for the handler to read.
    pub fn evaluate(&self, store: &mut Store<'_>) -> Verdict {
        for param in self.template.params() {
            if !param.needs_eval() {
                continue;
            }

            let Some(entry) = store.entry_mut(param.index()) else {
                tracing::error!(
                    route = self.template.source(),
                    index = param.index(),
                    param = param.name(),
                    "no capture stored for parameter"
                );
                return Verdict::Fault {
                    index: param.index(),
                };
            };

            if !param.eval(entry) {
                tracing::trace!(
                    route = self.template.source(),
                    param = param.name(),
                    status = param.status().as_u16(),
                    "parameter rejected"
                );
                return Verdict::Reject {
                    index: param.index(),
                    status: param.status(),
                };
            }
        }

        Verdict::Continue
    }
}
