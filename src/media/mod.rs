//! Media API clients
//!
//! This module provides the abstraction over the third-party media API that issues
//! access tokens, plus the RedGifs implementation used in production.

mod media_api;
mod redgifs;

pub use media_api::{AccessToken, MediaApi, MediaApiError, StreamUrl};
pub use redgifs::RedGifsClient;

/// Type alias for media API trait object
pub type MediaApiInstance = Box<dyn MediaApi>;
