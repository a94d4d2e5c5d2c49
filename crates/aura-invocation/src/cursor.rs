//! Per-invocation cursor over a chain's links
//!
//! A [`CursorContext`] is created for every top-level call of an
//! [`InterceptorChain`](crate::InterceptorChain) and dropped when that call
//! returns. It owns the only mutable traversal state, so the chain itself can
//! stay immutable and be shared across threads and re-entrant calls.

use crate::context::{ContextData, InvocationContext, MethodDescriptor};
use crate::errors::{FailureClass, InvocationError, InvocationResult};
use crate::interceptor::Interceptor;
use serde_json::Value;
use std::sync::Arc;
use tracing::{trace, warn};

/// Wraps the caller's context and turns `proceed` into "run the next link"
pub(crate) struct CursorContext<'a, 'c> {
    links: &'a [Arc<dyn Interceptor>],
    inner: &'a mut (dyn InvocationContext + 'c),
    cursor: usize,
    trace_links: bool,
}

impl<'a, 'c> CursorContext<'a, 'c> {
    pub(crate) fn new(
        links: &'a [Arc<dyn Interceptor>],
        inner: &'a mut (dyn InvocationContext + 'c),
        trace_links: bool,
    ) -> Self {
        Self {
            links,
            inner,
            cursor: 0,
            trace_links,
        }
    }

    /// Index of the next link `proceed` will dispatch to
    #[cfg(test)]
    pub(crate) fn position(&self) -> usize {
        self.cursor
    }
}

/// Re-raise a link's failure, unwrapping one standard invocation failure layer
fn unwrap_link_failure(index: usize, link: &str, error: InvocationError) -> InvocationError {
    let InvocationError::Invocation { cause } = error else {
        return error;
    };

    match cause.class() {
        FailureClass::Application | FailureClass::Fatal => *cause,
        FailureClass::Unrecognized => {
            warn!(index, link, cause = %cause, "link produced an undeclared failure");
            InvocationError::undeclared(*cause)
        }
    }
}

impl InvocationContext for CursorContext<'_, '_> {
    fn proceed(&mut self) -> InvocationResult<Value> {
        let links = self.links;
        let index = self.cursor;

        let Some(link) = links.get(index) else {
            if self.trace_links {
                trace!(links = links.len(), "chain exhausted, delegating to wrapped context");
            }
            return self.inner.proceed();
        };

        if self.trace_links {
            trace!(index, link = link.name(), "dispatching to link");
        }

        self.cursor = index + 1;
        let outcome = link.intercept(self);
        self.cursor = index;

        outcome.map_err(|error| unwrap_link_failure(index, link.name(), error))
    }

    fn target(&self) -> Option<&str> {
        self.inner.target()
    }

    fn method(&self) -> &MethodDescriptor {
        self.inner.method()
    }

    fn parameters(&self) -> &[Value] {
        self.inner.parameters()
    }

    fn set_parameters(&mut self, parameters: Vec<Value>) -> InvocationResult<()> {
        self.inner.set_parameters(parameters)
    }

    fn context_data(&self) -> &ContextData {
        self.inner.context_data()
    }

    fn context_data_mut(&mut self) -> &mut ContextData {
        self.inner.context_data_mut()
    }
}
