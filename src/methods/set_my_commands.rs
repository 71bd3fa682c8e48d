use super::base::{Request, TelegramMethod};

use crate::{client::Bot, types::BotCommand};

use serde::Serialize;

/// Use this method to change the list of the bot's commands.
/// See [`this manual`](https://core.telegram.org/bots/features#commands) for more details about bot commands.
/// # Documentation
/// <https://core.telegram.org/bots/api#setmycommands>
/// # Returns
/// Returns `true` on success
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SetMyCommands {
    /// A list of bot commands to be set as the list of the bot's commands. At most 100 commands can be specified.
    pub commands: Vec<BotCommand>,
}

impl SetMyCommands {
    #[must_use]
    pub fn new(commands: impl IntoIterator<Item = BotCommand>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
        }
    }
}

impl TelegramMethod for SetMyCommands {
    type Method = Self;
    type Return = bool;

    fn build_request<Client>(&self, _bot: &Bot<Client>) -> Request<'_, Self::Method> {
        Request::new("setMyCommands", self)
    }
}

impl AsRef<SetMyCommands> for SetMyCommands {
    fn as_ref(&self) -> &Self {
        self
    }
}
