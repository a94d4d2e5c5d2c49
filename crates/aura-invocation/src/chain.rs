//! Interceptor chain composition
//!
//! An [`InterceptorChain`] turns an ordered list of interceptors into a single
//! [`Interceptor`]. Each call builds a fresh cursor context around the caller's
//! context, so links run in construction order, unwind in reverse, and a
//! chain may itself be a link of another chain.

use crate::config::ChainConfig;
use crate::context::InvocationContext;
use crate::cursor::CursorContext;
use crate::errors::{FailureClass, InvocationError, InvocationResult};
use crate::interceptor::Interceptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Immutable ordered sequence of interceptors acting as one interceptor
#[derive(Clone)]
pub struct InterceptorChain {
    /// Links in dispatch order
    interceptors: Arc<[Arc<dyn Interceptor>]>,
    /// Observability settings
    config: ChainConfig,
}

impl InterceptorChain {
    /// Create a chain from an ordered interceptor sequence
    pub fn new(interceptors: impl IntoIterator<Item = Arc<dyn Interceptor>>) -> Self {
        Self {
            interceptors: interceptors.into_iter().collect(),
            config: ChainConfig::default(),
        }
    }

    /// Create a chain from an interceptor sequence that may be absent.
    ///
    /// An absent sequence fails with [`InvocationError::InvalidConstruction`]
    /// naming `interceptors`; an empty one is a valid pass-through chain.
    pub fn try_new(interceptors: Option<Vec<Arc<dyn Interceptor>>>) -> InvocationResult<Self> {
        let interceptors =
            interceptors.ok_or_else(|| InvocationError::invalid_construction("interceptors"))?;
        Ok(Self::new(interceptors))
    }

    /// Start building a chain
    pub fn builder() -> InterceptorChainBuilder {
        InterceptorChainBuilder::new()
    }

    /// Replace the chain configuration
    pub fn with_config(mut self, config: ChainConfig) -> Self {
        self.config = config;
        self
    }

    /// Chain configuration
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Number of links
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Whether the chain is a pure pass-through
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Names of the links in dispatch order
    pub fn link_names(&self) -> Vec<String> {
        self.interceptors
            .iter()
            .map(|link| link.name().to_string())
            .collect()
    }

    /// Serializable description of this chain and any nested chains
    pub fn descriptor(&self) -> ChainDescriptor {
        ChainDescriptor {
            label: self.config.label.clone(),
            links: self.interceptors.iter().map(|link| link.describe()).collect(),
        }
    }

    /// Convert whatever escaped the links into the chain's outward failure
    fn translate_failure(error: InvocationError) -> InvocationError {
        match error.class() {
            FailureClass::Fatal => error,
            FailureClass::Unrecognized => {
                InvocationError::invocation(InvocationError::undeclared(error))
            }
            FailureClass::Application if error.is_invocation_failure() => error,
            FailureClass::Application => InvocationError::invocation(error),
        }
    }
}

impl Interceptor for InterceptorChain {
    fn intercept(&self, context: &mut dyn InvocationContext) -> InvocationResult<Value> {
        let label = self.config.label.as_deref().unwrap_or("chain");
        debug!(
            chain = label,
            links = self.interceptors.len(),
            method = %context.method(),
            "invoking interceptor chain"
        );

        let mut cursor = CursorContext::new(&self.interceptors, context, self.config.trace_links);
        cursor.proceed().map_err(|error| {
            debug!(chain = label, error = %error, "interceptor chain failed");
            Self::translate_failure(error)
        })
    }

    fn name(&self) -> &str {
        self.config.label.as_deref().unwrap_or("chain")
    }

    fn describe(&self) -> LinkDescriptor {
        LinkDescriptor::Chain(self.descriptor())
    }
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("links", &self.link_names())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for constructing interceptor chains
#[derive(Default)]
pub struct InterceptorChainBuilder {
    interceptors: Option<Vec<Arc<dyn Interceptor>>>,
    config: ChainConfig,
}

impl InterceptorChainBuilder {
    /// Create new chain builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the full interceptor sequence, replacing any links added so far
    pub fn with_interceptors(
        mut self,
        interceptors: impl IntoIterator<Item = Arc<dyn Interceptor>>,
    ) -> Self {
        self.interceptors = Some(interceptors.into_iter().collect());
        self
    }

    /// Append one interceptor to the sequence
    pub fn with_interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors
            .get_or_insert_with(Vec::new)
            .push(Arc::new(interceptor));
        self
    }

    /// Set the chain configuration
    pub fn with_config(mut self, config: ChainConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the chain
    pub fn build(self) -> InvocationResult<InterceptorChain> {
        let interceptors = self
            .interceptors
            .ok_or_else(|| InvocationError::invalid_construction("interceptors"))?;
        self.config.validate()?;

        Ok(InterceptorChain::new(interceptors).with_config(self.config))
    }
}

/// Serializable shape of a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDescriptor {
    /// Configured chain label
    pub label: Option<String>,
    /// Links in dispatch order
    pub links: Vec<LinkDescriptor>,
}

/// Serializable shape of a single link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkDescriptor {
    /// An opaque interceptor unit
    Leaf {
        /// Interceptor name
        name: String,
    },
    /// A nested chain
    Chain(ChainDescriptor),
}
