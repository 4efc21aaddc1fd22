//! Collection routing: route parameter keys and document path patterns.

use serde::{Deserialize, Serialize};

/// A tracked collection and the route parameter carrying its document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSpec {
    name: String,
    param: String,
}

impl CollectionSpec {
    /// Creates a collection with the default route parameter key.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let param = default_route_param(&name);
        Self { name, param }
    }

    /// Overrides the route parameter key (e.g. `staffMemberId` for `staff`).
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Route parameter key holding the document id.
    pub fn route_param(&self) -> &str {
        &self.param
    }

    /// Document path pattern the trigger subscribes to, e.g. `bookings/{bookingId}`.
    pub fn document_path(&self) -> String {
        format!("{}/{{{}}}", self.name, self.param)
    }
}

/// Derives the default route parameter key for a collection name.
///
/// A single trailing `s` is stripped and `Id` appended:
/// `bookingDrafts` becomes `bookingDraftId`. Names without a trailing `s`
/// are kept whole (`staff` becomes `staffId`).
pub fn default_route_param(collection: &str) -> String {
    let singular = collection.strip_suffix('s').unwrap_or(collection);
    format!("{singular}Id")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_route_param() {
        assert_eq!(default_route_param("bookings"), "bookingId");
        assert_eq!(default_route_param("bookingDrafts"), "bookingDraftId");
        assert_eq!(default_route_param("archivedBookings"), "archivedBookingId");
        assert_eq!(default_route_param("bookingQuotes"), "bookingQuoteId");
        assert_eq!(default_route_param("contactMessages"), "contactMessageId");
    }

    #[test]
    fn test_route_param_without_plural_suffix() {
        assert_eq!(default_route_param("staff"), "staffId");
        assert_eq!(default_route_param("inventory"), "inventoryId");
        // Only one trailing character is considered.
        assert_eq!(default_route_param("addresses"), "addresseId");
    }

    #[test]
    fn test_param_override() {
        let spec = CollectionSpec::new("addresses").with_param("addressId");
        assert_eq!(spec.route_param(), "addressId");
        assert_eq!(spec.document_path(), "addresses/{addressId}");
    }

    #[test]
    fn test_document_path() {
        let spec = CollectionSpec::new("bookings");
        assert_eq!(spec.name(), "bookings");
        assert_eq!(spec.document_path(), "bookings/{bookingId}");
    }
}
