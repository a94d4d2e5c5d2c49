//! # Aura Invocation - Interceptor Chains
//!
//! Composes an ordered sequence of interceptors into a single interceptor.
//! Each call to an [`InterceptorChain`] gets its own cursor over the links, so
//! one chain can be shared across threads, invoked re-entrantly, and nested
//! inside other chains.
//!
//! Failures crossing a link boundary are re-classified by [`FailureClass`]:
//! the chain boundary produces a single [`InvocationError::Invocation`] whose
//! cause chain leads to the original condition, while fatal failures always
//! escape unchanged.

pub mod chain;
pub mod config;
pub mod context;
mod cursor;
pub mod errors;
pub mod interceptor;
pub mod prelude;

pub use chain::{ChainDescriptor, InterceptorChain, InterceptorChainBuilder, LinkDescriptor};
pub use config::ChainConfig;
pub use context::{BasicInvocationContext, ContextData, InvocationContext, MethodDescriptor};
pub use errors::{Causes, FailureClass, InvocationError, InvocationResult};
pub use interceptor::{
    interceptor_fn, FnInterceptor, Interceptor, PassThroughInterceptor, ReturningInterceptor,
};
