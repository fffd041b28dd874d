#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `xpath` implements the subscription-routing layer of the backend-adapter
//! protocol: a longest-match glob engine over path-shaped patterns
//! ([`matcher`]), the closed set of backend client identities
//! ([`ClientId`]), the per-subscription capability bits clients can hold
//! ([`CapabilityTriple`]), the compiled-in static pattern registry
//! ([`seed`]), and the [`SubscriptionMap`] that ties them together into a
//! `resolve` operation.
//!
//! # Design
//!
//! [`SubscriptionMap`] is intentionally a pure, read-only structure: it is
//! built once from [`seed::SEED_REGISTRY`] and consulted on every inbound
//! `CFG_DATA`/`TXN`/`GET` message to determine which backend clients care
//! about a given xpath. The specification excludes dynamic subscription
//! rediscovery, so there is no mutation API.
//!
//! # Invariants
//!
//! - [`SubscriptionMap::resolve`] returns the empty map for an xpath matched
//!   by no registered pattern.
//! - Root-scope xpaths (`"/"`, `"/*"`) resolve to the union of every
//!   registered pattern's subscribers.
//! - When more than one pattern matches an xpath at the same (maximal)
//!   length, a client reachable through more than one of them gets the
//!   OR-merge of its capability bits across those patterns.

mod capability;
mod client_id;
mod error;
mod matcher;
mod seed;
mod subscr;

pub use capability::CapabilityTriple;
pub use client_id::ClientId;
pub use error::PatternError;
pub use matcher::{is_root_scope, match_len};
pub use seed::{SeedRow, SEED_REGISTRY};
pub use subscr::{SubscriptionEntry, SubscriptionMap, DEFAULT_MAX_PATTERNS};
