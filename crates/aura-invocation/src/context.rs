//! Invocation context abstraction
//!
//! The context carries everything an interceptor may inspect about a call and
//! exposes [`InvocationContext::proceed`], the hand-off to whatever lies
//! beneath the current interceptor.

use crate::errors::{InvocationError, InvocationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Free-form data shared by every interceptor of one invocation
pub type ContextData = HashMap<String, Value>;

/// Identifies the method being invoked
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Type that declares the method
    pub target_type: String,
    /// Method name
    pub name: String,
}

impl MethodDescriptor {
    /// Create a new method descriptor
    pub fn new(target_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            target_type: target_type.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.target_type, self.name)
    }
}

/// A single in-flight invocation as seen by an interceptor
pub trait InvocationContext {
    /// Continue the invocation and return its result
    fn proceed(&mut self) -> InvocationResult<Value>;

    /// Name of the target instance, if the invocation has one
    fn target(&self) -> Option<&str>;

    /// Method being invoked
    fn method(&self) -> &MethodDescriptor;

    /// Current invocation arguments
    fn parameters(&self) -> &[Value];

    /// Replace the invocation arguments
    fn set_parameters(&mut self, parameters: Vec<Value>) -> InvocationResult<()>;

    /// Data shared between interceptors of this invocation
    fn context_data(&self) -> &ContextData;

    /// Mutable access to the shared context data
    fn context_data_mut(&mut self) -> &mut ContextData;
}

type Invoker<'a> = Box<dyn FnMut(&[Value]) -> InvocationResult<Value> + 'a>;

/// Context whose `proceed` calls a terminal invoker with the current arguments
pub struct BasicInvocationContext<'a> {
    target: Option<String>,
    method: MethodDescriptor,
    parameters: Vec<Value>,
    context_data: ContextData,
    invoker: Invoker<'a>,
}

impl<'a> BasicInvocationContext<'a> {
    /// Create a context that invokes `invoker` once all interceptors have proceeded
    pub fn new<F>(method: MethodDescriptor, parameters: Vec<Value>, invoker: F) -> Self
    where
        F: FnMut(&[Value]) -> InvocationResult<Value> + 'a,
    {
        Self {
            target: None,
            method,
            parameters,
            context_data: ContextData::new(),
            invoker: Box::new(invoker),
        }
    }

    /// Set the target name
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Seed a context data entry
    pub fn with_context_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context_data.insert(key.into(), value);
        self
    }
}

impl InvocationContext for BasicInvocationContext<'_> {
    fn proceed(&mut self) -> InvocationResult<Value> {
        (self.invoker)(&self.parameters)
    }

    fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    fn method(&self) -> &MethodDescriptor {
        &self.method
    }

    fn parameters(&self) -> &[Value] {
        &self.parameters
    }

    fn set_parameters(&mut self, parameters: Vec<Value>) -> InvocationResult<()> {
        if parameters.len() != self.parameters.len() {
            return Err(InvocationError::application(
                "IllegalArgument",
                format!(
                    "{} expects {} parameters, got {}",
                    self.method,
                    self.parameters.len(),
                    parameters.len()
                ),
            ));
        }
        self.parameters = parameters;
        Ok(())
    }

    fn context_data(&self) -> &ContextData {
        &self.context_data
    }

    fn context_data_mut(&mut self) -> &mut ContextData {
        &mut self.context_data
    }
}

impl fmt::Debug for BasicInvocationContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicInvocationContext")
            .field("target", &self.target)
            .field("method", &self.method)
            .field("parameters", &self.parameters)
            .field("context_data", &self.context_data)
            .finish_non_exhaustive()
    }
}
