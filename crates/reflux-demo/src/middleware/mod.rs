//! Middlewares subscribed to the demo store
//!
//! Middleware runs inside the store actor after each action is reduced, so
//! it must never block; slow work goes through an effect runner.

pub mod feed_middleware;
pub mod settings_middleware;

pub use feed_middleware::{FeedEnvironment, FeedMiddleware};
pub use settings_middleware::{open_settings, Settings, SettingsMiddleware};
