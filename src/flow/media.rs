//! Plans how text and media of one logical reply are split into platform calls.
//!
//! The platform accepts media groups of [`MIN_MEDIA_LENGTH`]..=[`MAX_MEDIA_LENGTH`] items.
//! Anything below the minimum goes out as per-type single-file sends; the message text
//! (with the keyboard) is attached as the caption of the last such singleton, or as a
//! trailing text message when no singleton can carry it.

/// Smallest batch the platform accepts as a media group
pub const MIN_MEDIA_LENGTH: usize = 2;
/// Largest batch the platform accepts as a media group
pub const MAX_MEDIA_LENGTH: usize = 10;

/// Per-type media kind, in the declaration order the planner walks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Document,
    Video,
    Audio,
}

/// URLs of one reply's media, grouped by type and already ordered
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Media {
    pub photo: Vec<String>,
    pub document: Vec<String>,
    pub video: Vec<String>,
    pub audio: Vec<String>,
}

impl Media {
    fn lists(&self) -> [(MediaKind, &[String]); 4] {
        [
            (MediaKind::Photo, &self.photo),
            (MediaKind::Document, &self.document),
            (MediaKind::Video, &self.video),
            (MediaKind::Audio, &self.audio),
        ]
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists().iter().all(|(_, files)| files.is_empty())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lists().iter().map(|(_, files)| files.len()).sum()
    }
}

/// One planned platform call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A text message carrying the keyboard
    Text,
    /// A single-file send; `with_extras` attaches the caption and keyboard
    Single {
        kind: MediaKind,
        media: String,
        with_extras: bool,
    },
    /// A media group of at most [`MAX_MEDIA_LENGTH`] items
    Group { kind: MediaKind, media: Vec<String> },
}

/// Packs the media lists into platform-legal sends.
/// # Notes
/// An empty plan means the reply carried neither text nor media.
#[must_use]
pub fn plan(media: &Media, has_text: bool) -> Vec<Dispatch> {
    if media.is_empty() {
        return if has_text { vec![Dispatch::Text] } else { vec![] };
    }

    let mut dispatches = vec![];
    let mut extras_attached = false;

    let lists = media.lists();

    for (index, (kind, files)) in lists.iter().enumerate() {
        if files.is_empty() {
            continue;
        }

        if files.len() < MIN_MEDIA_LENGTH {
            let is_last_non_empty = lists[index + 1..].iter().all(|(_, rest)| rest.is_empty());

            for file in *files {
                let with_extras = has_text && is_last_non_empty && !extras_attached;

                extras_attached |= with_extras;
                dispatches.push(Dispatch::Single {
                    kind: *kind,
                    media: file.clone(),
                    with_extras,
                });
            }
            continue;
        }

        for chunk in files.chunks(MAX_MEDIA_LENGTH) {
            dispatches.push(Dispatch::Group {
                kind: *kind,
                media: chunk.to_vec(),
            });
        }
    }

    if has_text && !extras_attached {
        dispatches.push(Dispatch::Text);
    }

    dispatches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(kind: &str, count: usize) -> Vec<String> {
        (0..count).map(|index| format!("{kind}-{index}")).collect()
    }

    #[test]
    fn text_only() {
        assert_eq!(plan(&Media::default(), true), vec![Dispatch::Text]);
        assert_eq!(plan(&Media::default(), false), vec![]);
    }

    #[test]
    fn group_then_captioned_singleton() {
        let media = Media {
            photo: urls("photo", 3),
            document: urls("doc", 1),
            ..Media::default()
        };

        assert_eq!(
            plan(&media, true),
            vec![
                Dispatch::Group {
                    kind: MediaKind::Photo,
                    media: urls("photo", 3),
                },
                Dispatch::Single {
                    kind: MediaKind::Document,
                    media: "doc-0".to_owned(),
                    with_extras: true,
                },
            ]
        );
    }

    #[test]
    fn trailing_text_after_groups() {
        let media = Media {
            photo: urls("photo", 2),
            ..Media::default()
        };

        assert_eq!(
            plan(&media, true),
            vec![
                Dispatch::Group {
                    kind: MediaKind::Photo,
                    media: urls("photo", 2),
                },
                Dispatch::Text,
            ]
        );
    }

    #[test]
    fn early_singleton_does_not_take_the_caption() {
        let media = Media {
            photo: urls("photo", 1),
            document: urls("doc", 2),
            ..Media::default()
        };

        assert_eq!(
            plan(&media, true),
            vec![
                Dispatch::Single {
                    kind: MediaKind::Photo,
                    media: "photo-0".to_owned(),
                    with_extras: false,
                },
                Dispatch::Group {
                    kind: MediaKind::Document,
                    media: urls("doc", 2),
                },
                Dispatch::Text,
            ]
        );
    }

    #[test]
    fn oversized_lists_are_chunked() {
        let media = Media {
            photo: urls("photo", 23),
            ..Media::default()
        };

        let dispatches = plan(&media, false);

        assert_eq!(dispatches.len(), 3);

        let sizes: Vec<_> = dispatches
            .iter()
            .map(|dispatch| match dispatch {
                Dispatch::Group { media, .. } => media.len(),
                _ => panic!("Unexpected dispatch"),
            })
            .collect();

        assert_eq!(sizes, vec![10, 10, 3]);
    }

    #[test]
    fn every_item_is_sent_exactly_once() {
        let media = Media {
            photo: urls("photo", 11),
            document: urls("doc", 1),
            video: urls("video", 2),
            audio: urls("audio", 1),
        };

        let dispatches = plan(&media, true);
        let mut sent = 0;
        let mut extras = 0;
        let mut texts = 0;

        for dispatch in &dispatches {
            match dispatch {
                Dispatch::Text => texts += 1,
                Dispatch::Single { with_extras, .. } => {
                    sent += 1;
                    extras += usize::from(*with_extras);
                }
                Dispatch::Group { media, .. } => {
                    assert!((MIN_MEDIA_LENGTH..=MAX_MEDIA_LENGTH).contains(&media.len()));
                    sent += media.len();
                }
            }
        }

        assert_eq!(sent, media.len());
        // The audio singleton is the last non-empty list, so it carries the caption
        assert_eq!(extras, 1);
        assert_eq!(texts, 0);
    }
}
