//! Slack integration for the start/continue/stop feedback bot.
//!
//! - **Block Kit** (`blocks`) - modal and message builders plus the feedback templates
//! - **Web API** (`client`) - `views.open` / `chat.postMessage` behind the `ChatClient` trait
//! - **OAuth** (`oauth`) - workspace installation and bot token exchange
//! - **Interactions** (`interactions`) - classification of modal submissions and button clicks
//! - **Slash commands** (`commands`) - `/feedback request`, `/feedback give`, `/feedback help`
//!
//! # Architecture
//!
//! ```text
//! Slack payload → classify → SlackPlatform → FeedbackService → SQLite
//!                                  ↓
//!                     ChatClient (modals, DMs) ← Block Kit templates
//! ```

pub mod blocks;
pub mod client;
pub mod commands;
pub mod interactions;
pub mod oauth;
pub mod platform;

pub use client::{ChatClient, RecordingChatClient, WebApiClient};
pub use oauth::{OAuthExchange, SlackOAuthService};
pub use platform::{InteractionOutcome, PlatformError, SlackPlatform};
