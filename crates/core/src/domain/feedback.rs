use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::request::RequestId;
use crate::domain::user::User;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeedbackId(pub i64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackBody {
    pub start_doing: String,
    pub continue_doing: String,
    pub stop_doing: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: FeedbackId,
    pub author: User,
    pub recipient: User,
    pub request_id: Option<RequestId>,
    pub body: FeedbackBody,
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    pub fn is_solicited(&self) -> bool {
        self.request_id.is_some()
    }
}

/// Input for persisting a feedback entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewFeedback {
    pub author: User,
    pub recipient: User,
    pub request_id: Option<RequestId>,
    pub body: FeedbackBody,
}
