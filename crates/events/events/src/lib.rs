//! # docrelay Events
//!
//! Document change normalization for docrelay:
//! - Classification of before/after snapshots into CREATE / UPDATE / DELETE
//! - Canonical change events with the relayed payload
//! - Route parameter keys per collection
//! - Trigger registry over the sources × collections product
//!
//! ## Example
//!
//! ```rust,ignore
//! use docrelay_events::{CollectionSpec, TriggerRegistry, TriggerContext};
//!
//! let registry = TriggerRegistry::build(
//!     &["auburn", "oxford"],
//!     &[CollectionSpec::new("bookings")],
//!     handler,
//! )?;
//!
//! let context = TriggerContext::new().with_param("bookingId", "abc123");
//! registry.invoke("auburnBookings", &change, &context).await?;
//! ```

mod classify;
mod collection;
mod error;
mod event;
mod handler;
mod registry;
mod snapshot;

pub use classify::{Classification, classify};
pub use collection::{CollectionSpec, default_route_param};
pub use error::{EventError, EventResult};
pub use event::{ChangeEvent, Operation, Payload};
pub use handler::{ChangeHandler, FnHandler, HandlerFuture, SharedHandler};
pub use registry::{TriggerFunction, TriggerRegistry, function_name};
pub use snapshot::{DocumentChange, DocumentSnapshot, TriggerContext};
