//! Aura Invocation prelude.
//!
//! Curated re-exports for writing interceptors and assembling chains.

pub use crate::chain::{InterceptorChain, InterceptorChainBuilder};
pub use crate::config::ChainConfig;
pub use crate::context::{BasicInvocationContext, InvocationContext, MethodDescriptor};
pub use crate::errors::{InvocationError, InvocationResult};
pub use crate::interceptor::{interceptor_fn, Interceptor};
