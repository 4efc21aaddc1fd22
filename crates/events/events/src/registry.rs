//! Trigger registry: one trigger function per (source, collection) pair.

use std::collections::HashMap;

use crate::collection::CollectionSpec;
use crate::error::{EventError, EventResult};
use crate::event::{ChangeEvent, Operation};
use crate::handler::SharedHandler;
use crate::snapshot::{DocumentChange, TriggerContext};

/// Builds the function name for a source and collection (e.g., "auburnBookings").
pub fn function_name(source_id: &str, collection: &str) -> String {
    let mut chars = collection.chars();
    match chars.next() {
        Some(first) => format!("{}{}{}", source_id, first.to_uppercase(), chars.as_str()),
        None => source_id.to_string(),
    }
}

/// A write trigger bound to one collection of one source.
pub struct TriggerFunction {
    name: String,
    source_id: String,
    collection: CollectionSpec,
    handler: SharedHandler,
}

impl TriggerFunction {
    /// Creates a trigger function.
    pub fn new(source_id: impl Into<String>, collection: CollectionSpec, handler: SharedHandler) -> Self {
        let source_id = source_id.into();
        Self {
            name: function_name(&source_id, collection.name()),
            source_id,
            collection,
            handler,
        }
    }

    /// Function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source the trigger listens on.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Collection the trigger listens on.
    pub fn collection(&self) -> &CollectionSpec {
        &self.collection
    }

    /// Full subscription path, e.g. `auburn/bookings/{bookingId}`.
    pub fn document_path(&self) -> String {
        format!("{}/{}", self.source_id, self.collection.document_path())
    }

    /// Handles one document write.
    ///
    /// Returns the relayed operation, or `None` when the write was a no-op.
    pub async fn on_write(
        &self,
        change: &DocumentChange,
        context: &TriggerContext,
    ) -> EventResult<Option<Operation>> {
        let Some(event) = ChangeEvent::from_change(&self.source_id, &self.collection, change, context)?
        else {
            tracing::warn!(
                source_id = %self.source_id,
                collection = %self.collection.name(),
                document_id = context.param(self.collection.route_param()).unwrap_or_default(),
                event_id = context.event_id.as_deref(),
                "[{}] Unknown operation for {}",
                self.source_id.to_uppercase(),
                self.collection.name()
            );
            return Ok(None);
        };

        tracing::info!(
            source_id = %event.source_id,
            collection = %event.collection,
            document_id = %event.document_id,
            event_id = context.event_id.as_deref(),
            "[{}] {} {}: {}",
            event.source_id.to_uppercase(),
            event.collection,
            event.operation.past_tense(),
            event.document_id
        );

        self.handler.handle(&event).await?;

        tracing::info!(
            function = %self.name,
            handler = self.handler.id(),
            "[{}] {} completed for: {}",
            event.source_id.to_uppercase(),
            event.operation,
            event.document_id
        );

        Ok(Some(event.operation))
    }
}

impl std::fmt::Debug for TriggerFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerFunction")
            .field("name", &self.name)
            .field("source_id", &self.source_id)
            .field("collection", &self.collection)
            .field("handler", &self.handler.id())
            .finish()
    }
}

/// Registry of trigger functions, built once from the sources × collections product.
#[derive(Debug, Default)]
pub struct TriggerRegistry {
    functions: Vec<TriggerFunction>,
    by_name: HashMap<String, usize>,
}

impl TriggerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a trigger for every (source, collection) pair, all sharing one handler.
    pub fn build<S: AsRef<str>>(
        sources: &[S],
        collections: &[CollectionSpec],
        handler: SharedHandler,
    ) -> EventResult<Self> {
        let mut registry = Self::new();
        for source in sources {
            for collection in collections {
                registry.register(TriggerFunction::new(
                    source.as_ref(),
                    collection.clone(),
                    handler.clone(),
                ))?;
            }
        }
        Ok(registry)
    }

    /// Registers a trigger function. Names must be unique.
    pub fn register(&mut self, function: TriggerFunction) -> EventResult<()> {
        if self.by_name.contains_key(function.name()) {
            return Err(EventError::DuplicateFunction(function.name().to_string()));
        }

        tracing::debug!(
            function = %function.name(),
            path = %function.document_path(),
            "Creating function: {} -> {}",
            function.name(),
            function.document_path()
        );

        self.by_name.insert(function.name().to_string(), self.functions.len());
        self.functions.push(function);
        Ok(())
    }

    /// Gets a trigger by function name.
    pub fn get(&self, name: &str) -> Option<&TriggerFunction> {
        self.by_name.get(name).map(|&idx| &self.functions[idx])
    }

    /// Finds the trigger for a source and collection.
    pub fn find(&self, source_id: &str, collection: &str) -> Option<&TriggerFunction> {
        self.functions
            .iter()
            .find(|f| f.source_id() == source_id && f.collection().name() == collection)
    }

    /// Function names in registration order.
    pub fn function_names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name()).collect()
    }

    /// Number of registered triggers.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Routes a write to the named trigger.
    pub async fn invoke(
        &self,
        name: &str,
        change: &DocumentChange,
        context: &TriggerContext,
    ) -> EventResult<Option<Operation>> {
        let function = self
            .get(name)
            .ok_or_else(|| EventError::UnknownFunction(name.to_string()))?;
        function.on_write(change, context).await
    }
}
