//! Helpers for working with bot tokens.
//!
//! A bot token has the form `{bot_id}:{secret}`. The hub extracts the bot id for logging and
//! storage scoping, and hides the secret part in all diagnostic output.

/// Extracts the bot id from a token
/// # Returns
/// `None` if the token doesn't contain `:` or the part before it isn't a number
#[must_use]
pub fn extract_bot_id(token: &str) -> Option<i64> {
    let (bot_id, _) = token.split_once(':')?;

    bot_id.parse().ok()
}

/// Replaces the secret part of the token with `*`, keeping the bot id visible
#[must_use]
pub fn hide(token: &str) -> String {
    match token.split_once(':') {
        Some((bot_id, secret)) => format!("{bot_id}:{}", "*".repeat(secret.len())),
        None => "*".repeat(token.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract() {
        assert_eq!(extract_bot_id("123456:ABC-DEF"), Some(123_456));
        assert_eq!(extract_bot_id("not_a_token"), None);
        assert_eq!(extract_bot_id("abc:def"), None);
    }

    #[test]
    fn hide_keeps_bot_id() {
        assert_eq!(hide("123:secret"), "123:******");
        assert_eq!(hide("oops"), "****");
    }
}
