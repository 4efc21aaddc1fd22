//! Change handler trait and types.

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::EventError;
use crate::event::ChangeEvent;

/// Boxed future returned by function handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), EventError>> + Send>>;

/// Trait for consumers of normalized change events.
#[async_trait]
pub trait ChangeHandler: Send + Sync {
    /// Returns a unique identifier for this handler.
    fn id(&self) -> &str {
        "anonymous"
    }

    /// Handles a change event.
    async fn handle(&self, event: &ChangeEvent) -> Result<(), EventError>;
}

/// A shared change handler.
pub type SharedHandler = Arc<dyn ChangeHandler>;

/// Wrapper for function-based handlers.
pub struct FnHandler<F>
where
    F: Fn(&ChangeEvent) -> HandlerFuture + Send + Sync,
{
    id: String,
    handler: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&ChangeEvent) -> HandlerFuture + Send + Sync,
{
    /// Creates a new function handler.
    pub fn new(id: impl Into<String>, handler: F) -> Self {
        Self {
            id: id.into(),
            handler,
        }
    }
}

#[async_trait]
impl<F> ChangeHandler for FnHandler<F>
where
    F: Fn(&ChangeEvent) -> HandlerFuture + Send + Sync,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn handle(&self, event: &ChangeEvent) -> Result<(), EventError> {
        (self.handler)(event).await
    }
}
