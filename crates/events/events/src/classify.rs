//! Mutation classification from before/after existence.

use crate::event::{Operation, Payload};

/// Outcome of classifying a before/after pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// A real mutation with the payload that should be relayed.
    Change {
        /// The classified operation.
        operation: Operation,
        /// Selected document fields.
        payload: Payload,
    },
    /// Neither snapshot exists; nothing to relay.
    NoOp,
}

impl Classification {
    /// Returns the operation, if any.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Classification::Change { operation, .. } => Some(*operation),
            Classification::NoOp => None,
        }
    }
}

/// Classifies a mutation from the existence of its before and after snapshots.
///
/// | before | after | result |
/// |--------|-------|--------|
/// | no     | yes   | CREATE with `after_data` |
/// | yes    | yes   | UPDATE with `after_data` |
/// | yes    | no    | DELETE with `before_data` |
/// | no     | no    | NoOp |
///
/// A snapshot that exists without data yields an empty payload.
pub fn classify(
    before_exists: bool,
    after_exists: bool,
    before_data: Option<&Payload>,
    after_data: Option<&Payload>,
) -> Classification {
    let (operation, source) = match (before_exists, after_exists) {
        (false, true) => (Operation::Create, after_data),
        (true, true) => (Operation::Update, after_data),
        (true, false) => (Operation::Delete, before_data),
        (false, false) => return Classification::NoOp,
    };

    Classification::Change {
        operation,
        payload: source.cloned().unwrap_or_default(),
    }
}
