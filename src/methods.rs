//! Telegram Bot API methods the hub calls, one module per method.
//!
//! Every method implements [`TelegramMethod`], which describes how to build a request
//! and which type the API returns on success.

pub mod base;

pub mod delete_message;
pub mod delete_messages;
pub mod delete_webhook;
pub mod get_me;
pub mod send_audio;
pub mod send_document;
pub mod send_media_group;
pub mod send_message;
pub mod send_photo;
pub mod send_video;
pub mod set_my_commands;
pub mod set_webhook;

pub use base::{Request, Response, TelegramMethod};

pub use delete_message::DeleteMessage;
pub use delete_messages::DeleteMessages;
pub use delete_webhook::DeleteWebhook;
pub use get_me::GetMe;
pub use send_audio::SendAudio;
pub use send_document::SendDocument;
pub use send_media_group::SendMediaGroup;
pub use send_message::SendMessage;
pub use send_photo::SendPhoto;
pub use send_video::SendVideo;
pub use set_my_commands::SetMyCommands;
pub use set_webhook::SetWebhook;
