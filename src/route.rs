use crate::error::TemplateError;
use crate::filter::{Filter, Verdict};
use crate::registry::Registry;
use crate::store::Store;
use crate::template::Template;

use http::StatusCode;
use std::sync::Arc;

/// A route's template, its compiled filter, and the handler it guards.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use pathmacro::{Dispatch, Registry, Route, Store};
/// use http::StatusCode;
///
/// let registry = Registry::new();
/// let route = Route::new("/users/{id:uint64 else 400}", &registry, |params: &Store<'_>| {
///     format!("user {}", params.get::<u64>(0).unwrap_or_default())
/// })?;
///
/// let mut store: Store<'_> = ["7"].into_iter().collect();
/// assert_eq!(route.dispatch(&mut store).handled(), Some("user 7".to_owned()));
///
/// let mut store: Store<'_> = ["seven"].into_iter().collect();
/// assert_eq!(route.dispatch(&mut store).status(), Some(StatusCode::BAD_REQUEST));
/// # Ok(())
/// # }
/// ```
pub struct Route<H> {
    template: Arc<Template>,
    filter: Option<Filter>,
    handler: H,
}

impl<H> Route<H> {
    /// Parses `pattern` and compiles its filter.
    pub fn new(pattern: &str, registry: &Registry, handler: H) -> Result<Self, TemplateError> {
        let template = Template::parse(pattern, registry)?;
        Ok(Self::from_template(template, handler))
    }

    /// Compiles the filter of an already parsed template.
    pub fn from_template(template: Template, handler: H) -> Self {
        let template = Arc::new(template);
        let filter = Filter::new(Arc::clone(&template));

        Self {
            template,
            filter,
            handler,
        }
    }

    /// Returns the route's template.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Returns the compiled filter, if the route needs one.
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// Returns `true` if requests go straight to the handler.
    pub fn is_static(&self) -> bool {
        self.filter.is_none()
    }

    /// Returns the handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Runs the filter, then the handler if every parameter passed.
    ///
    /// A rejected request never reaches the handler.
    pub fn dispatch<'v, R>(&self, store: &mut Store<'v>) -> Dispatch<R>
    where
        H: Fn(&Store<'v>) -> R,
    {
        if let Some(filter) = &self.filter {
            let verdict = filter.evaluate(store);
            if !verdict.is_continue() {
                return Dispatch::Stopped(verdict);
            }
        }

        Dispatch::Handled((self.handler)(store))
    }
}

/// The result of [`Route::dispatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch<R> {
    /// The handler ran and returned this.
    Handled(R),
    /// The filter stopped the chain.
    Stopped(Verdict),
}

impl<R> Dispatch<R> {
    /// Returns the handler's output, if it ran.
    pub fn handled(self) -> Option<R> {
        match self {
            Dispatch::Handled(res) => Some(res),
            Dispatch::Stopped(_) => None,
        }
    }

    /// Returns the status code set by the filter, if it stopped the chain.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Dispatch::Handled(_) => None,
            Dispatch::Stopped(verdict) => verdict.status(),
        }
    }
}
