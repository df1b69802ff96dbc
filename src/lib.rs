//! Async client for the ORR admin-portal REST API.
//!
//! The portal backend (`/admin-portal/v1/`) owns clients, meetings,
//! tickets, notifications, content, billing, and analytics. This crate
//! gives front ends and tools one typed way in:
//!
//! - [`Portal`]: configured entry point, one per process. Base URL and
//!   deadline come from [`PortalConfig`], the bearer token from a
//!   [`auth::TokenProvider`].
//! - [`api::ResourceClient`] and the typed per-resource clients:
//!   CRUD plus named actions (meeting confirm/decline/reschedule,
//!   ticket add-message, notification mark-read).
//! - [`FetchHandle`] / [`MutationHandle`]: the `{data, loading, error}`
//!   state adapters list pages and form modals render from, with
//!   last-request-wins semantics on the read side.
//! - [`envelope`]: normalization for the backend's inconsistent list
//!   envelopes. [`listing`]: pure pagination/search helpers.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use orr_client::auth::FileTokenStore;
//! use orr_client::{config, Portal};
//!
//! # async fn demo() -> Result<(), orr_client::PortalError> {
//! let config = config::load_config()?;
//! let portal = Portal::new(config, Arc::new(FileTokenStore::open_default()))?;
//!
//! let open = portal
//!     .tickets()
//!     .list(&orr_client::api::tickets::TicketFilters {
//!         status: Some("open".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("{} open tickets", open.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fetch;
pub mod listing;
pub mod mutation;
pub mod query;
pub mod transport;

pub use api::Portal;
pub use config::PortalConfig;
pub use error::{friendly_message, PortalError};
pub use fetch::{Fetch, FetchHandle, FetchState};
pub use mutation::{Mutate, MutationHandle, MutationState};
pub use query::Filters;
