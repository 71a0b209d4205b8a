//! Session state for the agent execution engine.
//!
//! A session is an append-only entry log plus a small scratchpad map, owned by a
//! `SessionStore`. The in-memory reference store defines the concurrency contract
//! (linearizable per-id reads/writes, clone-on-read) that any durable backend must
//! also satisfy.

pub mod session;
pub mod store;

pub use session::{CreateOptions, Session};
pub use store::{InMemorySessionStore, SessionFilter, SessionStore, StoreError};
