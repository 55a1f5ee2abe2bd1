//! Entity storage for Warren.
//!
//! - [`Guarded`]: one entity behind its own read/write lock; every write
//!   persists before the lock is released
//! - [`EntityStore`]: the indexed registry of all live entities
//! - [`Persistence`]: where records go ([`MemoryPersistence`],
//!   [`JsonFilePersistence`])
//! - [`Container`]: cash and capacity on characters

mod container;
mod error;
mod guarded;
mod model;
mod persistence;
mod store;

pub use container::Container;
pub use error::StoreError;
pub use guarded::Guarded;
pub use model::{
    Character, ColorMode, Entity, Exit, Item, Named, Room, User, Zone,
    DEFAULT_CAPACITY, DEFAULT_HITPOINTS, DEFAULT_ITEM_WEIGHT, DEFAULT_ROOM_DESCRIPTION,
    DEFAULT_ROOM_TITLE,
};
pub use persistence::{JsonFilePersistence, MemoryPersistence, Persistence};
pub use store::EntityStore;
