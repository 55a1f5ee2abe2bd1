//! Event bus for Warren.
//!
//! Every connected session registers a [`Subscription`] and gets a copy
//! of every [`Event`] broadcast afterwards. The bus is a plain value you
//! construct and clone, not a global: tests build one per scenario, the
//! server builds one per world.
//!
//! ## Delivery guarantees
//!
//! - **Non-blocking publish.** [`EventBus::broadcast`] pushes into each
//!   subscription's unbounded queue and returns; it never waits on a slow
//!   session.
//! - **Per-subscription order.** Broadcasts are serialized by the
//!   registry lock, so every subscription sees events in the same order
//!   they were published.
//! - **Gone means gone.** Once a subscription is unregistered (or
//!   dropped), nothing more is queued for it and whatever was still
//!   queued is discarded.

mod bus;

pub use bus::{EventBus, Subscription, SubscriptionId};
