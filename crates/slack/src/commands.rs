use serde::Deserialize;

/// Form body Slack posts for a slash command invocation.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SlashCommandPayload {
    pub command: String,
    #[serde(default)]
    pub text: String,
    pub team_id: String,
    pub user_id: String,
    pub trigger_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedbackCommand {
    Request,
    Give,
    Help,
    Unknown { verb: String },
}

pub fn parse_feedback_command(input: &str) -> FeedbackCommand {
    let verb = input.split_whitespace().next().unwrap_or_default().to_ascii_lowercase();

    match verb.as_str() {
        "" | "give" => FeedbackCommand::Give,
        "request" | "ask" => FeedbackCommand::Request,
        "help" | "?" => FeedbackCommand::Help,
        _ => FeedbackCommand::Unknown { verb },
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_feedback_command, FeedbackCommand, SlashCommandPayload};

    #[test]
    fn empty_text_opens_give_modal() {
        assert_eq!(parse_feedback_command(""), FeedbackCommand::Give);
        assert_eq!(parse_feedback_command("   "), FeedbackCommand::Give);
    }

    #[test]
    fn verbs_are_case_insensitive_and_ignore_trailing_words() {
        assert_eq!(parse_feedback_command("REQUEST please"), FeedbackCommand::Request);
        assert_eq!(parse_feedback_command(" give @someone"), FeedbackCommand::Give);
        assert_eq!(parse_feedback_command("Help"), FeedbackCommand::Help);
    }

    #[test]
    fn unknown_verbs_keep_normalized_verb() {
        assert_eq!(
            parse_feedback_command("Delete everything"),
            FeedbackCommand::Unknown { verb: "delete".to_owned() }
        );
    }

    #[test]
    fn payload_text_defaults_to_empty() {
        let payload: SlashCommandPayload = serde_json::from_value(serde_json::json!({
            "command": "/feedback",
            "team_id": "T1",
            "user_id": "U1",
            "trigger_id": "trigger-1"
        }))
        .expect("decode");

        assert_eq!(payload.text, "");
    }
}
