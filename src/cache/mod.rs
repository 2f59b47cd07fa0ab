//! In-memory response cache subsystem.
//!
//! # Data Flow
//! ```text
//! FetchClient (GET/HEAD only)
//!     → shared.rs (lock around the store, poisoning tolerated)
//!     → lru.rs (arena of slots + intrusive recency list)
//!     → hit: stored entry, promoted to most-recently-used
//!     → miss: caller fetches, then inserts (may evict the LRU slot)
//! ```
//!
//! # Design Decisions
//! - Capacity is fixed at construction; entries never expire on their own
//! - Eviction is purely capacity driven (least-recently-used first)
//! - The store knows nothing about HTTP; keys and values are generic
//! - Recency links are slot indices into a backing `Vec`, not pointers

pub mod lru;
pub mod shared;

pub use lru::BoundedCache;
pub use shared::SharedCache;
