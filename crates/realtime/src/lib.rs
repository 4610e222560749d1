//! Real-time fan-out layer for the order tracking system.
//!
//! This crate provides:
//! - Topic keys for per-user and per-order subscriptions
//! - A session hub that registers connections and fans out pushes
//! - The wire message envelope delivered to clients

pub mod hub;
pub mod message;

pub use hub::{Hub, SessionHandle, Topic};
pub use message::{NotificationPayload, PushMessage, StatusChangePayload};
