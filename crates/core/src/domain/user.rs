use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// A Slack member scoped to the workspace that installed the bot.
///
/// The platform only guarantees `user_id` to be unique within a team, so the
/// natural key is the `(team_id, user_id)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub team_id: String,
    pub user_id: String,
}

impl User {
    pub fn mention(&self) -> String {
        format!("<@{}>", self.user_id)
    }
}
