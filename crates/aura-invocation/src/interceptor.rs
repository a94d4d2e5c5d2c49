//! Interceptor unit contract and small reusable units

use crate::chain::LinkDescriptor;
use crate::context::InvocationContext;
use crate::errors::InvocationResult;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A single interception step.
///
/// An interceptor may inspect or modify the invocation, then call
/// [`InvocationContext::proceed`] to hand control to the next step. Not
/// proceeding short-circuits everything beneath it; proceeding more than once
/// re-runs the downstream steps.
pub trait Interceptor: Send + Sync {
    /// Process one invocation
    fn intercept(&self, context: &mut dyn InvocationContext) -> InvocationResult<Value>;

    /// Name used in logs and chain descriptors
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Describe this unit for inspection or transport
    fn describe(&self) -> LinkDescriptor {
        LinkDescriptor::Leaf {
            name: self.name().to_string(),
        }
    }
}

impl<T: Interceptor + ?Sized> Interceptor for Arc<T> {
    fn intercept(&self, context: &mut dyn InvocationContext) -> InvocationResult<Value> {
        (**self).intercept(context)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn describe(&self) -> LinkDescriptor {
        (**self).describe()
    }
}

impl<T: Interceptor + ?Sized> Interceptor for Box<T> {
    fn intercept(&self, context: &mut dyn InvocationContext) -> InvocationResult<Value> {
        (**self).intercept(context)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn describe(&self) -> LinkDescriptor {
        (**self).describe()
    }
}

/// Interceptor backed by a closure
pub struct FnInterceptor<F> {
    name: String,
    f: F,
}

impl<F> Interceptor for FnInterceptor<F>
where
    F: Fn(&mut dyn InvocationContext) -> InvocationResult<Value> + Send + Sync,
{
    fn intercept(&self, context: &mut dyn InvocationContext) -> InvocationResult<Value> {
        (self.f)(context)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FnInterceptor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInterceptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Build an interceptor from a closure
pub fn interceptor_fn<F>(name: impl Into<String>, f: F) -> FnInterceptor<F>
where
    F: Fn(&mut dyn InvocationContext) -> InvocationResult<Value> + Send + Sync,
{
    FnInterceptor {
        name: name.into(),
        f,
    }
}

/// Proceeds without touching the invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughInterceptor;

impl Interceptor for PassThroughInterceptor {
    fn intercept(&self, context: &mut dyn InvocationContext) -> InvocationResult<Value> {
        context.proceed()
    }

    fn name(&self) -> &str {
        "pass-through"
    }
}

/// Terminal unit returning a fixed value without proceeding
#[derive(Debug, Clone, PartialEq)]
pub struct ReturningInterceptor {
    value: Value,
}

impl ReturningInterceptor {
    /// Create a terminal unit that always yields `value`
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl Interceptor for ReturningInterceptor {
    fn intercept(&self, _context: &mut dyn InvocationContext) -> InvocationResult<Value> {
        Ok(self.value.clone())
    }

    fn name(&self) -> &str {
        "returning"
    }
}
