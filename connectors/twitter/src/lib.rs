//! Twitter/X follow-graph client.
//!
//! Wraps the platform's REST API behind [`followsync_core::SocialGraph`] on
//! two API surfaces:
//!
//! - Legacy v1.1: `friends/ids` and `followers/ids` walked by cursor,
//!   `friendships/create` and `friendships/destroy` for mutations
//! - v2: `/2/users/:id/followers` and `/2/users/:id/following` walked by
//!   `pagination_token`, `/2/users/:id/following` for mutations
//!
//! Every user-context request is OAuth 1.0a signed. Listing pages and
//! mutations are paced against separate budgets, and `x-rate-limit-*`
//! headers feed back into the pacers.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod client;
mod config;
mod error;
mod graph;
mod oauth;
pub mod types;

pub use client::TwitterApiClient;
pub use config::{PacingConfig, RetryConfig, TwitterConfig, DEFAULT_CONFIG_PATH};
pub use error::{ConfigError, TwitterError, TwitterResult};
pub use graph::{normalize_username, ApiSurface, GraphV2, LegacyGraph};
pub use oauth::OAuthSigner;
