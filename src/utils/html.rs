//! Restricts author-written HTML to the subset the platform accepts for message text.
//!
//! The cleaner is a single-pass stream parser. Recognized tags are re-emitted in normalized
//! form, unknown tags are dropped while their content is preserved, and data text is
//! HTML-escaped. Openers that are never closed are rolled back using the byte offsets
//! recorded when they were emitted, so no dangling markup reaches the platform.

/// Inline and block tags that are passed through to the platform
const ALLOWED_TAGS: [&str; 14] = [
    "b",
    "strong",
    "i",
    "em",
    "u",
    "ins",
    "s",
    "strike",
    "del",
    "tg-spoiler",
    "a",
    "code",
    "pre",
    "blockquote",
];
/// Void tags that produce no output
const SELF_CLOSING_TAGS: [&str; 1] = ["br"];
/// Tags whose matched closer appends a newline
const NEWLINE_AFTER_TAGS: [&str; 3] = ["p", "blockquote", "pre"];

fn is_allowed(tag: &str) -> bool {
    ALLOWED_TAGS.contains(&tag)
}

/// An opener that was seen but not yet closed.
/// `start..end` is the byte range of the markup it wrote into the result.
struct OpenTag {
    tag: String,
    start: usize,
    end: usize,
}

#[derive(Default)]
struct Cleaner {
    result: String,
    stack: Vec<OpenTag>,
}

impl Cleaner {
    fn handle_start_tag(&mut self, tag: &str, attrs: &[(String, String)]) {
        if SELF_CLOSING_TAGS.contains(&tag) {
            return;
        }

        let old_result_length = self.result.len();

        if tag == "a" {
            let Some((_, href)) = attrs
                .iter()
                .find(|(name, value)| name == "href" && !value.is_empty())
            else {
                return;
            };

            self.result.push_str("<a href=\"");
            self.result
                .push_str(&href.replace('&', "&amp;").replace('"', "&quot;"));
            self.result.push_str("\">");
        } else if is_allowed(tag) {
            self.result.push('<');
            self.result.push_str(tag);
            self.result.push('>');
        }

        self.stack.push(OpenTag {
            tag: tag.to_owned(),
            start: old_result_length,
            end: self.result.len(),
        });
    }

    fn handle_end_tag(&mut self, tag: &str) {
        let matches_opener = self
            .stack
            .last()
            .is_some_and(|open_tag| open_tag.tag == tag);

        if !matches_opener {
            return;
        }

        self.stack.pop();

        if is_allowed(tag) {
            self.result.push_str("</");
            self.result.push_str(tag);
            self.result.push('>');
        }

        if NEWLINE_AFTER_TAGS.contains(&tag) {
            self.result.push('\n');
        }
    }

    fn handle_data(&mut self, data: &str) {
        self.result.push_str(&escape(&unescape(data)));
    }

    /// Discards the markup written by openers that were never closed.
    /// The stack is unwound from the most recent opener, so earlier recorded
    /// offsets stay valid while later ranges are removed.
    fn finish(mut self) -> String {
        while let Some(OpenTag { start, end, .. }) = self.stack.pop() {
            self.result.replace_range(start..end, "");
        }

        if self.result.ends_with('\n') {
            self.result.truncate(self.result.len() - 1);
        }

        self.result
    }
}

/// Cleans author-written HTML down to the platform-safe subset.
///
/// `&nbsp;` entities are replaced with plain spaces before parsing.
#[must_use]
pub fn clean_html(text: &str) -> String {
    let text = text.replace("&nbsp;", " ");

    let mut cleaner = Cleaner::default();
    let mut rest = text.as_str();

    while let Some(lt_index) = rest.find('<') {
        let (data, tail) = rest.split_at(lt_index);

        if !data.is_empty() {
            cleaner.handle_data(data);
        }

        match parse_markup(tail) {
            Some((markup, consumed)) => {
                match markup {
                    Markup::Start { tag, attrs, self_closing } => {
                        cleaner.handle_start_tag(&tag, &attrs);
                        if self_closing {
                            cleaner.handle_end_tag(&tag);
                        }
                    }
                    Markup::End { tag } => cleaner.handle_end_tag(&tag),
                    Markup::Skip => {}
                }
                rest = &tail[consumed..];
            }
            None => {
                // Bare `<` that doesn't open any markup is ordinary text
                cleaner.handle_data("<");
                rest = &tail[1..];
            }
        }
    }

    if !rest.is_empty() {
        cleaner.handle_data(rest);
    }

    cleaner.finish()
}

enum Markup {
    Start {
        tag: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End {
        tag: String,
    },
    /// Comments and declarations are consumed without output
    Skip,
}

fn is_tag_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-'
}

/// Parses one markup construct at the start of `input` (which begins with `<`).
/// # Returns
/// The construct and the number of bytes consumed, or `None` if `input` doesn't
/// start a valid construct and the `<` should be treated as data.
fn parse_markup(input: &str) -> Option<(Markup, usize)> {
    let after_lt = &input[1..];

    if let Some(comment) = after_lt.strip_prefix("!--") {
        let end = comment.find("-->").map_or(input.len(), |index| index + 7);
        return Some((Markup::Skip, end.min(input.len())));
    }

    if after_lt.starts_with('!') || after_lt.starts_with('?') {
        let end = input.find('>').map_or(input.len(), |index| index + 1);
        return Some((Markup::Skip, end));
    }

    if let Some(close) = after_lt.strip_prefix('/') {
        if !close.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
            return None;
        }

        let name_end = close
            .find(|ch: char| !is_tag_name_char(ch))
            .unwrap_or(close.len());
        let tag = close[..name_end].to_ascii_lowercase();
        let gt_index = close.find('>')?;

        return Some((Markup::End { tag }, 2 + gt_index + 1));
    }

    if !after_lt.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
        return None;
    }

    let name_end = after_lt
        .find(|ch: char| !is_tag_name_char(ch))
        .unwrap_or(after_lt.len());
    let tag = after_lt[..name_end].to_ascii_lowercase();

    let (attrs, attrs_len, self_closing) = parse_attrs(&after_lt[name_end..])?;

    Some((
        Markup::Start {
            tag,
            attrs,
            self_closing,
        },
        1 + name_end + attrs_len,
    ))
}

/// Parses the attribute list up to and including the closing `>`.
/// # Returns
/// The attributes, the number of bytes consumed and whether the tag was self-closing,
/// or `None` when the tag is never closed.
fn parse_attrs(input: &str) -> Option<(Vec<(String, String)>, usize, bool)> {
    let mut attrs = vec![];
    let mut rest = input;

    loop {
        rest = rest.trim_start();

        if rest.starts_with('>') {
            return Some((attrs, input.len() - rest.len() + 1, false));
        }
        if rest.starts_with("/>") {
            return Some((attrs, input.len() - rest.len() + 2, true));
        }
        if rest.is_empty() {
            return None;
        }

        let name_end = rest
            .find(|ch: char| ch.is_whitespace() || ch == '=' || ch == '>' || ch == '/')
            .unwrap_or(rest.len());
        if name_end == 0 {
            // Stray punctuation inside the tag, skip it
            rest = &rest[1..];
            continue;
        }

        let name = rest[..name_end].to_ascii_lowercase();
        rest = rest[name_end..].trim_start();

        let value = if let Some(tail) = rest.strip_prefix('=') {
            let tail = tail.trim_start();

            match tail.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let quoted = &tail[1..];
                    let value_end = quoted.find(quote)?;

                    rest = &quoted[value_end + 1..];
                    quoted[..value_end].to_owned()
                }
                _ => {
                    let value_end = tail
                        .find(|ch: char| ch.is_whitespace() || ch == '>')
                        .unwrap_or(tail.len());

                    rest = &tail[value_end..];
                    tail[..value_end].to_owned()
                }
            }
        } else {
            String::new()
        };

        attrs.push((name, unescape(&value)));
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(ch),
        }
    }

    escaped
}

/// Resolves the character references the designer editor produces,
/// so escaping afterwards doesn't double-encode them
fn unescape(text: &str) -> String {
    let mut unescaped = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp_index) = rest.find('&') {
        let (head, tail) = rest.split_at(amp_index);
        unescaped.push_str(head);

        let Some(semi_index) = tail.find(';').filter(|index| *index <= 12) else {
            unescaped.push('&');
            rest = &tail[1..];
            continue;
        };

        let entity = &tail[1..semi_index];
        let replacement = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity.strip_prefix('#').and_then(|code| {
                let code = match code.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                    None => code.parse().ok()?,
                };
                char::from_u32(code)
            }),
        };

        match replacement {
            Some(ch) => {
                unescaped.push(ch);
                rest = &tail[semi_index + 1..];
            }
            None => {
                unescaped.push('&');
                rest = &tail[1..];
            }
        }
    }

    unescaped.push_str(rest);
    unescaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_tags_pass_through() {
        assert_eq!(clean_html("<b>bold</b> and <i>italic</i>"), "<b>bold</b> and <i>italic</i>");
        assert_eq!(clean_html("<tg-spoiler>secret</tg-spoiler>"), "<tg-spoiler>secret</tg-spoiler>");
    }

    #[test]
    fn unknown_tags_dropped_content_kept() {
        assert_eq!(clean_html("<div><span>text</span></div>"), "text");
    }

    #[test]
    fn paragraph_close_appends_newline() {
        assert_eq!(clean_html("<p>first</p><p>second</p>"), "first\nsecond");
        assert_eq!(
            clean_html("<blockquote>quote</blockquote>tail"),
            "<blockquote>quote</blockquote>\ntail"
        );
    }

    #[test]
    fn anchor_requires_href() {
        assert_eq!(
            clean_html("<a href=\"https://example.com\">link</a>"),
            "<a href=\"https://example.com\">link</a>"
        );
        assert_eq!(clean_html("<a>link</a>"), "link");
    }

    #[test]
    fn orphan_openers_rolled_back() {
        assert_eq!(clean_html("<b><i>text"), "text");
        assert_eq!(clean_html("<b>bold</b><i>tail"), "<b>bold</b>tail");
    }

    #[test]
    fn mismatched_closer_ignored() {
        assert_eq!(clean_html("<b>text</i>"), "text");
    }

    #[test]
    fn void_tags_produce_no_output() {
        assert_eq!(clean_html("line<br>break"), "linebreak");
    }

    #[test]
    fn data_is_escaped() {
        assert_eq!(clean_html("1 < 2 & 3 > 2"), "1 &lt; 2 &amp; 3 &gt; 2");
        assert_eq!(clean_html("a &amp; b"), "a &amp; b");
    }

    #[test]
    fn nbsp_becomes_space() {
        assert_eq!(clean_html("a&nbsp;b"), "a b");
    }
}
