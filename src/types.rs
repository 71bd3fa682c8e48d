//! Wire types of the Telegram Bot API, reduced to the subset the hub consumes and produces.

pub mod bot_command;
pub mod callback_query;
pub mod chat;
pub mod input_media;
pub mod message;
pub mod reply_markup;
pub mod response_parameters;
pub mod update;
pub mod user;

pub use bot_command::BotCommand;
pub use callback_query::CallbackQuery;
pub use chat::Chat;
pub use input_media::InputMedia;
pub use message::Message;
pub use reply_markup::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, ReplyKeyboardMarkup, ReplyMarkup,
};
pub use response_parameters::ResponseParameters;
pub use update::{Update, UpdateKind};
pub use user::User;
