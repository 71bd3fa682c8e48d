//! The user validity gate applied before any traversal starts.

use crate::{
    designer::{self, schemas::CreateUser},
    errors::DesignerErrorKind,
    types::User,
};

/// A user may drive the flow iff they aren't blocked and, for private bots, are allowed
#[must_use]
pub const fn is_valid_user(bot: &designer::models::Bot, user: &designer::models::User) -> bool {
    !(user.is_blocked || bot.is_private && !user.is_allowed)
}

/// Upserts the platform user into the Designer Service and applies [`is_valid_user`].
/// # Errors
/// If the service cannot be reached or answers with an error status
pub async fn validate_platform_user(
    api: &designer::Api,
    user: &User,
) -> Result<bool, DesignerErrorKind> {
    let create_user = CreateUser::new(user.id, user.full_name());
    let (bot, service_user) = tokio::try_join!(api.get_bot(), api.create_user(&create_user))?;

    Ok(is_valid_user(&bot, &service_user))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot(is_private: bool) -> designer::models::Bot {
        designer::models::Bot { id: 1, is_private }
    }

    fn user(is_allowed: bool, is_blocked: bool) -> designer::models::User {
        designer::models::User {
            id: 1,
            telegram_id: 1,
            full_name: "Test".to_owned(),
            is_allowed,
            is_blocked,
        }
    }

    #[test]
    fn truth_table() {
        // (private, allowed, blocked) -> valid
        let cases = [
            (false, false, false, true),
            (false, false, true, false),
            (false, true, false, true),
            (false, true, true, false),
            (true, false, false, false),
            (true, false, true, false),
            (true, true, false, true),
            (true, true, true, false),
        ];

        for (is_private, is_allowed, is_blocked, expected) in cases {
            assert_eq!(
                is_valid_user(&bot(is_private), &user(is_allowed, is_blocked)),
                expected,
                "private={is_private} allowed={is_allowed} blocked={is_blocked}",
            );
        }
    }
}
