//! Domain model, error taxonomy and configuration for the start/continue/stop
//! feedback bot.

pub mod config;
pub mod domain;
pub mod errors;

pub use domain::feedback::{Feedback, FeedbackBody, FeedbackId, NewFeedback};
pub use domain::request::{Request, RequestId};
pub use domain::team::{Team, TeamId};
pub use domain::user::{User, UserId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
