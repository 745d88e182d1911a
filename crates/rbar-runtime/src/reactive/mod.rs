#![forbid(unsafe_code)]

//! Reactive values for overlay settings.
//!
//! [`Observable`] holds a shared value and notifies subscribers
//! synchronously when it changes. Subscribers are held weakly and removed
//! when their [`Subscription`] guard drops.

pub mod observable;

pub use observable::{Observable, Subscription};
