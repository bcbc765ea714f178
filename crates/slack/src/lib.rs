//! Slack slash-command interface for nebo
//!
//! - **Commands** (`commands`) - payload parsing, alias table and the `CommandRouter`
//! - **Replies** (`blocks`) - reply model, wire rendering and usage texts
//! - **Verification** (`verify`) - shared-secret token check
//! - **Notifications** (`notify`) - channel posts and `response_url` callbacks
//! - **Meet / Fire** (`meet`, `fire`) - commands answered without a backend
//!
//! # Architecture
//!
//! ```text
//! Slash command → CommandRouter → config check → token check → alias table
//!                                                                  ↓
//!                  Reply ← gateway lookup | checklist | meet link | feature notify
//! ```

pub mod blocks;
pub mod commands;
pub mod fire;
pub mod meet;
pub mod notify;
pub mod verify;

pub use blocks::{Reply, ResponseType};
pub use commands::{CommandRouter, InboundRequest, RouterSettings, SlashCommandPayload};
pub use notify::{Notifier, SlackNotifier};
