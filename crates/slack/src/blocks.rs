use serde::Serialize;

use scs_core::domain::feedback::Feedback;
use scs_core::domain::request::Request;

pub const MODAL_TITLE: &str = "Start/Continue/Stop";

pub const REQUEST_FROM_BLOCK: &str = "requestFrom";
pub const REQUEST_FROM_ACTION: &str = "actionFrom";
pub const GIVE_TO_BLOCK: &str = "giveTo";
pub const GIVE_TO_ACTION: &str = "actionTo";
pub const GIVE_START_BLOCK: &str = "giveStart";
pub const GIVE_START_ACTION: &str = "actionStart";
pub const GIVE_CONTINUE_BLOCK: &str = "giveContinue";
pub const GIVE_CONTINUE_ACTION: &str = "actionContinue";
pub const GIVE_STOP_BLOCK: &str = "giveStop";
pub const GIVE_STOP_ACTION: &str = "actionStop";

pub const GIVE_ACTION: &str = "give";
pub const IGNORE_ACTION: &str = "ignore";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    #[serde(rename = "plain_text")]
    Plain { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Plain { text } | Self::Mrkdwn { text } => text,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Danger,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "button")]
pub struct ButtonElement {
    pub action_id: String,
    pub text: TextObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ButtonElement {
    pub fn new(action_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            text: TextObject::plain(label),
            style: None,
            value: None,
        }
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Interactive element hosted by an input block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputElement {
    MultiUsersSelect { action_id: String, placeholder: TextObject },
    UsersSelect { action_id: String, placeholder: TextObject },
    PlainTextInput { action_id: String, multiline: bool },
}

impl InputElement {
    pub fn multi_users_select(
        action_id: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self::MultiUsersSelect {
            action_id: action_id.into(),
            placeholder: TextObject::plain(placeholder),
        }
    }

    pub fn users_select(action_id: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self::UsersSelect {
            action_id: action_id.into(),
            placeholder: TextObject::plain(placeholder),
        }
    }

    pub fn multiline_text(action_id: impl Into<String>) -> Self {
        Self::PlainTextInput { action_id: action_id.into(), multiline: true }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
        text: TextObject,
    },
    Divider,
    Actions {
        #[serde(skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
        elements: Vec<ButtonElement>,
    },
    Context {
        #[serde(skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
        elements: Vec<TextObject>,
    },
    Input {
        block_id: String,
        label: TextObject,
        element: InputElement,
    },
}

impl Block {
    pub fn block_id(&self) -> Option<&str> {
        match self {
            Self::Section { block_id, .. }
            | Self::Actions { block_id, .. }
            | Self::Context { block_id, .. } => block_id.as_deref(),
            Self::Input { block_id, .. } => Some(block_id),
            Self::Divider => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageTemplate {
    pub fallback_text: String,
    pub blocks: Vec<Block>,
}

pub struct MessageBuilder {
    fallback_text: String,
    blocks: Vec<Block>,
}

impl MessageBuilder {
    pub fn new(fallback_text: impl Into<String>) -> Self {
        Self { fallback_text: fallback_text.into(), blocks: Vec::new() }
    }

    pub fn section<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut SectionBuilder),
    {
        self.blocks.push(section_block(Some(block_id.into()), build));
        self
    }

    pub fn divider(mut self) -> Self {
        self.blocks.push(Block::Divider);
        self
    }

    pub fn actions<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ActionsBuilder),
    {
        let mut builder = ActionsBuilder::default();
        build(&mut builder);
        self.blocks
            .push(Block::Actions { block_id: Some(block_id.into()), elements: builder.build() });
        self
    }

    pub fn context<F>(mut self, block_id: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&mut ContextBuilder),
    {
        let mut builder = ContextBuilder::default();
        build(&mut builder);
        self.blocks
            .push(Block::Context { block_id: Some(block_id.into()), elements: builder.build() });
        self
    }

    pub fn build(self) -> MessageTemplate {
        MessageTemplate { fallback_text: self.fallback_text, blocks: self.blocks }
    }
}

/// A modal surface as accepted by `views.open`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "modal")]
pub struct View {
    pub title: TextObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit: Option<TextObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<TextObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    pub blocks: Vec<Block>,
}

impl View {
    pub fn has_block(&self, block_id: &str) -> bool {
        self.blocks.iter().any(|block| block.block_id() == Some(block_id))
    }
}

pub struct ModalBuilder {
    view: View,
}

impl ModalBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            view: View {
                title: TextObject::plain(title),
                submit: None,
                close: None,
                callback_id: None,
                blocks: Vec::new(),
            },
        }
    }

    pub fn submit(mut self, label: impl Into<String>) -> Self {
        self.view.submit = Some(TextObject::plain(label));
        self
    }

    pub fn close(mut self, label: impl Into<String>) -> Self {
        self.view.close = Some(TextObject::plain(label));
        self
    }

    pub fn callback_id(mut self, callback_id: impl Into<String>) -> Self {
        self.view.callback_id = Some(callback_id.into());
        self
    }

    pub fn input(
        mut self,
        block_id: impl Into<String>,
        label: impl Into<String>,
        element: InputElement,
    ) -> Self {
        self.view.blocks.push(Block::Input {
            block_id: block_id.into(),
            label: TextObject::plain(label),
            element,
        });
        self
    }

    pub fn section<F>(mut self, build: F) -> Self
    where
        F: FnOnce(&mut SectionBuilder),
    {
        self.view.blocks.push(section_block(None, build));
        self
    }

    pub fn divider(mut self) -> Self {
        self.view.blocks.push(Block::Divider);
        self
    }

    pub fn build(self) -> View {
        self.view
    }
}

fn section_block<F>(block_id: Option<String>, build: F) -> Block
where
    F: FnOnce(&mut SectionBuilder),
{
    let mut builder = SectionBuilder::default();
    build(&mut builder);
    Block::Section { block_id, text: builder.build() }
}

#[derive(Default)]
pub struct SectionBuilder {
    text: Option<TextObject>,
}

impl SectionBuilder {
    pub fn mrkdwn(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(TextObject::mrkdwn(text));
        self
    }

    fn build(self) -> TextObject {
        self.text.unwrap_or_else(|| TextObject::plain(""))
    }
}

#[derive(Default)]
pub struct ActionsBuilder {
    elements: Vec<ButtonElement>,
}

impl ActionsBuilder {
    pub fn button(&mut self, button: ButtonElement) -> &mut Self {
        self.elements.push(button);
        self
    }

    fn build(self) -> Vec<ButtonElement> {
        self.elements
    }
}

#[derive(Default)]
pub struct ContextBuilder {
    elements: Vec<TextObject>,
}

impl ContextBuilder {
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.elements.push(TextObject::plain(text));
        self
    }

    fn build(self) -> Vec<TextObject> {
        self.elements
    }
}

fn standard_modal() -> ModalBuilder {
    ModalBuilder::new(MODAL_TITLE).submit("Submit").close("Close")
}

pub fn request_feedback_modal() -> View {
    standard_modal()
        .input(
            REQUEST_FROM_BLOCK,
            "Request feedback from:",
            InputElement::multi_users_select(REQUEST_FROM_ACTION, "Select users"),
        )
        .build()
}

pub fn ask_feedback_message(request: &Request) -> MessageTemplate {
    let text = format!("{} requested your feedback", request.sender.mention());

    MessageBuilder::new(text.clone())
        .section("feedback.ask.summary.v1", |section| {
            section.mrkdwn(text);
        })
        .actions("feedback.ask.actions.v1", |actions| {
            actions
                .button(
                    ButtonElement::new(GIVE_ACTION, "Give now")
                        .style(ButtonStyle::Primary)
                        .value(request.id.to_string()),
                )
                .button(ButtonElement::new(IGNORE_ACTION, "Ignore").style(ButtonStyle::Danger));
        })
        .build()
}

/// Modal collecting the three feedback sections.
///
/// Answering a request swaps the user picker for a read-only line naming the
/// requester and stamps the request id into `callback_id`, which is how the
/// submission finds its way back to the request.
pub fn give_feedback_modal(request: Option<&Request>) -> View {
    let modal = match request {
        Some(request) => standard_modal().callback_id(request.id.to_string()).section(|section| {
            section.mrkdwn(format!("You are giving feedback to {}", request.sender.mention()));
        }),
        None => standard_modal().input(
            GIVE_TO_BLOCK,
            "Give feedback to:",
            InputElement::users_select(GIVE_TO_ACTION, "Select user"),
        ),
    };

    modal
        .divider()
        .input(GIVE_START_BLOCK, "Start doing", InputElement::multiline_text(GIVE_START_ACTION))
        .input(
            GIVE_CONTINUE_BLOCK,
            "Continue doing",
            InputElement::multiline_text(GIVE_CONTINUE_ACTION),
        )
        .input(GIVE_STOP_BLOCK, "Stop doing", InputElement::multiline_text(GIVE_STOP_ACTION))
        .build()
}

pub fn feedback_message(feedback: &Feedback) -> MessageTemplate {
    let header = format!("New feedback from {}", feedback.author.mention());

    MessageBuilder::new(header.clone())
        .section("feedback.delivery.header.v1", |section| {
            section.mrkdwn(header);
        })
        .divider()
        .section("feedback.delivery.start.v1", |section| {
            section.mrkdwn(format!("*Start doing:*\n{}", feedback.body.start_doing));
        })
        .divider()
        .section("feedback.delivery.continue.v1", |section| {
            section.mrkdwn(format!("*Continue doing:*\n{}", feedback.body.continue_doing));
        })
        .divider()
        .section("feedback.delivery.stop.v1", |section| {
            section.mrkdwn(format!("*Stop doing:*\n{}", feedback.body.stop_doing));
        })
        .build()
}

pub fn help_message(command: &str) -> MessageTemplate {
    MessageBuilder::new("Feedback command help")
        .section("feedback.help.summary.v1", |section| {
            section.mrkdwn(format!(
                "*Available commands*\n• `{command} request` ask teammates for feedback\n• `{command} give` give feedback to a teammate\n• `{command} help`"
            ));
        })
        .context("feedback.help.context.v1", |context| {
            context.plain("Feedback follows the start / continue / stop format.");
        })
        .build()
}

pub fn unsupported_command_message(command: &str, verb: &str) -> MessageTemplate {
    let summary = format!("Unsupported command `{command} {verb}`. Try `{command} help`.");
    MessageBuilder::new(summary.clone())
        .section("feedback.error.summary.v1", |section| {
            section.mrkdwn(format!(":warning: {summary}"));
        })
        .build()
}
