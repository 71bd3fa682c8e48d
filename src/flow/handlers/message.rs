//! Message nodes compose and send one logical reply: expanded text, designer-hosted
//! media packed by the media planner, and an optional keyboard.

use super::HandlerResult;

use crate::{
    designer::{
        enums::MessageKeyboardType,
        models::{Message as MessageNode, MessageKeyboard, MessageMedia},
    },
    errors::FlowErrorKind,
    flow::{
        media::{plan, Dispatch, Media, MediaKind},
        variables::{replace_text_variables, Variables},
        FlowContext,
    },
    methods::{
        DeleteMessage, DeleteMessages, SendAudio, SendDocument, SendMediaGroup, SendMessage,
        SendPhoto, SendVideo,
    },
    storage::Storage,
    types::{
        InlineKeyboardButton, InlineKeyboardMarkup, InputMedia, KeyboardButton, Message,
        ReplyKeyboardMarkup, ReplyMarkup,
    },
    utils::clean_html,
};

use percent_encoding::percent_decode_str;
use serde_json::json;
use tracing::{event, instrument, Level};
use url::Url;

const PARSE_MODE: &str = "HTML";
/// Chat-scratch key tracking the ids of the previous reply's messages
pub const LAST_BOT_MESSAGE_IDS_KEY: &str = "last_bot_message_ids";

/// Resolves designer-hosted files into absolute URLs, ordered by their position
fn prepare_media(service_url: &Url, files: &[MessageMedia]) -> Vec<String> {
    let mut files: Vec<_> = files.iter().collect();
    files.sort_by_key(|file| file.position);

    files
        .into_iter()
        .filter_map(MessageMedia::any_url)
        .filter_map(|url| {
            let decoded = percent_decode_str(url.trim_start_matches('/')).decode_utf8_lossy();

            service_url.join(&decoded).ok().map(String::from)
        })
        .collect()
}

/// Lays the buttons out by `(row, position)` and builds the platform markup
fn build_keyboard(keyboard: &MessageKeyboard) -> ReplyMarkup {
    let mut buttons: Vec<_> = keyboard.buttons.iter().collect();
    buttons.sort_by_key(|button| (button.row, button.position));

    let mut rows: Vec<Vec<&crate::designer::models::MessageKeyboardButton>> = vec![];

    for button in buttons {
        let row = usize::try_from(button.row).unwrap_or(0);

        while rows.len() <= row {
            rows.push(vec![]);
        }

        rows[row].push(button);
    }

    match keyboard.keyboard_type {
        MessageKeyboardType::Default => ReplyKeyboardMarkup::new(
            rows.into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|button| KeyboardButton::new(&button.text))
                        .collect()
                })
                .collect::<Vec<_>>(),
        )
        .resize_keyboard(true)
        .into(),
        MessageKeyboardType::Inline | MessageKeyboardType::Payment => InlineKeyboardMarkup::new(
            rows.into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|button| match &button.url {
                            Some(url) => InlineKeyboardButton::new(&button.text).url(url),
                            None => InlineKeyboardButton::new(&button.text)
                                .callback_data(button.id.to_string()),
                        })
                        .collect()
                })
                .collect::<Vec<_>>(),
        )
        .into(),
    }
}

/// Deletes the previous reply's messages; failures are logged and ignored
async fn delete_last_bot_messages(ctx: &FlowContext, chat_id: i64, chat_storage: &Storage) {
    let last_bot_message_ids = match chat_storage.pop(LAST_BOT_MESSAGE_IDS_KEY).await {
        Ok(value) => value,
        Err(err) => {
            event!(Level::WARN, error = %err, "Cannot pop last bot message ids");

            return;
        }
    };

    let message_ids: Vec<i64> = last_bot_message_ids
        .as_ref()
        .and_then(|value| value.as_array())
        .map(|items| items.iter().filter_map(serde_json::Value::as_i64).collect())
        .unwrap_or_default();

    if message_ids.is_empty() {
        return;
    }

    if let Err(err) = ctx
        .client
        .send(DeleteMessages::new(chat_id, message_ids))
        .await
    {
        event!(Level::WARN, error = %err, "Cannot delete last bot messages");
    }
}

fn input_media(kind: MediaKind, media: Vec<String>) -> Vec<InputMedia> {
    media
        .into_iter()
        .map(|media| match kind {
            MediaKind::Photo => InputMedia::Photo { media },
            MediaKind::Document => InputMedia::Document { media },
            MediaKind::Video => InputMedia::Video { media },
            MediaKind::Audio => InputMedia::Audio { media },
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
async fn send_single(
    ctx: &FlowContext,
    chat_id: i64,
    reply_to_message_id: Option<i64>,
    kind: MediaKind,
    media: String,
    caption: Option<&str>,
    keyboard: Option<&ReplyMarkup>,
) -> Result<Message, FlowErrorKind> {
    let caption = caption.map(ToOwned::to_owned);
    let keyboard = keyboard.cloned();

    let message = match kind {
        MediaKind::Photo => {
            ctx.client
                .send(
                    SendPhoto::new(chat_id, media)
                        .parse_mode(PARSE_MODE)
                        .caption_option(caption)
                        .reply_to_message_id_option(reply_to_message_id)
                        .reply_markup_option(keyboard),
                )
                .await?
        }
        MediaKind::Document => {
            ctx.client
                .send(
                    SendDocument::new(chat_id, media)
                        .parse_mode(PARSE_MODE)
                        .caption_option(caption)
                        .reply_to_message_id_option(reply_to_message_id)
                        .reply_markup_option(keyboard),
                )
                .await?
        }
        MediaKind::Video => {
            ctx.client
                .send(
                    SendVideo::new(chat_id, media)
                        .parse_mode(PARSE_MODE)
                        .caption_option(caption)
                        .reply_to_message_id_option(reply_to_message_id)
                        .reply_markup_option(keyboard),
                )
                .await?
        }
        MediaKind::Audio => {
            ctx.client
                .send(
                    SendAudio::new(chat_id, media)
                        .parse_mode(PARSE_MODE)
                        .caption_option(caption)
                        .reply_to_message_id_option(reply_to_message_id)
                        .reply_markup_option(keyboard),
                )
                .await?
        }
    };

    Ok(message)
}

/// Executes the planned dispatches in order and returns every message they produced
async fn send_planned(
    ctx: &FlowContext,
    chat_id: i64,
    reply_to_message_id: Option<i64>,
    media: Media,
    text: Option<&str>,
    keyboard: Option<&ReplyMarkup>,
) -> Result<Vec<Message>, FlowErrorKind> {
    let mut new_bot_messages = vec![];

    for dispatch in plan(&media, text.is_some()) {
        match dispatch {
            Dispatch::Text => {
                new_bot_messages.push(
                    ctx.client
                        .send(
                            SendMessage::new(chat_id, text.unwrap_or_default())
                                .parse_mode(PARSE_MODE)
                                .reply_to_message_id_option(reply_to_message_id)
                                .reply_markup_option(keyboard.cloned()),
                        )
                        .await?,
                );
            }
            Dispatch::Single {
                kind,
                media,
                with_extras,
            } => {
                new_bot_messages.push(
                    send_single(
                        ctx,
                        chat_id,
                        reply_to_message_id,
                        kind,
                        media,
                        with_extras.then_some(text.unwrap_or_default()),
                        with_extras.then_some(keyboard).flatten(),
                    )
                    .await?,
                );
            }
            Dispatch::Group { kind, media } => {
                new_bot_messages.extend(
                    ctx.client
                        .send(
                            SendMediaGroup::new(chat_id, input_media(kind, media))
                                .reply_to_message_id_option(reply_to_message_id),
                        )
                        .await?,
                );
            }
        }
    }

    Ok(new_bot_messages)
}

#[instrument(skip(ctx, message, variables), fields(message_id = message.id))]
pub async fn handle(
    ctx: &FlowContext,
    message: &MessageNode,
    variables: &Variables,
) -> HandlerResult {
    let (Some(chat), Some(user), Some(chat_storage)) =
        (ctx.update.chat(), ctx.update.user(), ctx.storage.chat.as_ref())
    else {
        return Ok(None);
    };

    let chat_id = chat.id;
    let event_message_id = ctx.update.message().map(|event_message| event_message.id);
    let reply_to_message_id = message
        .settings
        .reply_to_user_message
        .then_some(event_message_id)
        .flatten();

    let text = if message.text.is_empty() {
        None
    } else {
        let expanded = replace_text_variables(&message.text, variables).await;
        let cleaned = clean_html(&expanded);

        (!cleaned.is_empty()).then_some(cleaned)
    };
    let keyboard = message.keyboard.as_ref().map(build_keyboard);
    let media = Media {
        photo: prepare_media(&ctx.service_url, &message.images),
        document: prepare_media(&ctx.service_url, &message.documents),
        ..Media::default()
    };

    if !message.settings.send_as_new_message {
        delete_last_bot_messages(ctx, chat_id, chat_storage).await;
    }

    let new_bot_messages = send_planned(
        ctx,
        chat_id,
        reply_to_message_id,
        media,
        text.as_deref(),
        keyboard.as_ref(),
    )
    .await?;

    let new_bot_message_ids: Vec<_> = new_bot_messages
        .iter()
        .map(|new_bot_message| new_bot_message.id)
        .collect();

    chat_storage
        .set(LAST_BOT_MESSAGE_IDS_KEY, json!(new_bot_message_ids))
        .await?;

    if message.settings.delete_user_message && !user.is_bot {
        if let Some(event_message_id) = event_message_id {
            ctx.client
                .send(DeleteMessage::new(chat_id, event_message_id))
                .await?;
        }
    }

    Ok(Some(message.source_connections.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::designer::models::MessageKeyboardButton;

    fn media_file(position: i64, url: Option<&str>, from_url: Option<&str>) -> MessageMedia {
        MessageMedia {
            id: position,
            position,
            name: None,
            size: None,
            url: url.map(ToOwned::to_owned),
            from_url: from_url.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn media_urls_are_ordered_and_absolute() {
        let service_url = Url::parse("https://designer.test").unwrap();
        let files = [
            media_file(1, Some("/media/second%20file.png"), None),
            media_file(0, None, Some("/media/first.png")),
            media_file(2, None, None),
        ];

        let urls = prepare_media(&service_url, &files);

        assert_eq!(
            urls,
            vec![
                "https://designer.test/media/first.png",
                "https://designer.test/media/second%20file.png",
            ]
        );
    }

    #[test]
    fn keyboard_layout_follows_row_and_position() {
        fn button(id: i64, row: i64, position: i64, url: Option<&str>) -> MessageKeyboardButton {
            MessageKeyboardButton {
                id,
                row,
                position,
                text: format!("button-{id}"),
                url: url.map(ToOwned::to_owned),
                source_connections: vec![],
            }
        }

        let keyboard = MessageKeyboard {
            keyboard_type: MessageKeyboardType::Inline,
            buttons: vec![
                button(3, 1, 0, Some("https://example.test")),
                button(2, 0, 1, None),
                button(1, 0, 0, None),
            ],
        };

        let ReplyMarkup::Inline(markup) = build_keyboard(&keyboard) else {
            panic!("Unexpected markup kind");
        };

        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0][0].text, "button-1");
        assert_eq!(
            markup.inline_keyboard[0][1].callback_data.as_deref(),
            Some("2")
        );
        assert_eq!(
            markup.inline_keyboard[1][0].url.as_deref(),
            Some("https://example.test")
        );
    }

    #[test]
    fn default_keyboard_is_resizable() {
        let keyboard = MessageKeyboard {
            keyboard_type: MessageKeyboardType::Default,
            buttons: vec![MessageKeyboardButton {
                id: 1,
                row: 0,
                position: 0,
                text: "tap".to_owned(),
                url: None,
                source_connections: vec![],
            }],
        };

        let ReplyMarkup::Reply(markup) = build_keyboard(&keyboard) else {
            panic!("Unexpected markup kind");
        };

        assert_eq!(markup.resize_keyboard, Some(true));
        assert_eq!(markup.keyboard[0][0].text, "tap");
    }
}
