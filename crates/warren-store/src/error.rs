use warren_protocol::{Coordinate, EntityKind, ProtocolError, ZoneId};

/// Errors that can occur in the entity store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No entity of this kind has the given id.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: u64 },

    /// Names must contain something other than whitespace.
    #[error("{kind} name must not be empty")]
    EmptyName { kind: EntityKind },

    /// Another entity of the same kind already uses this name.
    #[error("a {kind} named {name:?} already exists")]
    NameTaken { kind: EntityKind, name: String },

    /// Another room already occupies this spot.
    #[error("a room already exists at {location} in {}", zone_label(.zone))]
    LocationTaken {
        zone: Option<ZoneId>,
        location: Coordinate,
    },

    /// Tried to remove more cash than the container holds.
    #[error("insufficient cash: have {have}, need {need}")]
    InsufficientCash { have: u64, need: u64 },

    /// A persisted record could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] ProtocolError),

    /// The persistence backend failed.
    #[error("persistence I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

fn zone_label(zone: &Option<ZoneId>) -> String {
    match zone {
        Some(id) => id.to_string(),
        None => "the null zone".to_string(),
    }
}
