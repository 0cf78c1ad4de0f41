// Notifications — formatting reaction announcements and delivering them.
//
// The Notifier trait defines the interface. DiscordNotifier implements it
// using the Discord bot REST API.

pub mod discord;
pub mod traits;

pub use traits::Notifier;

use crate::linkedin::Reaction;

/// Discord rejects message content longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Build the announcement text for a newly seen reaction.
pub fn format_reaction_message(reaction: &Reaction) -> String {
    let message = format!(
        "New reaction on post {}:\n- User: {}\n- Reaction: {}",
        reaction.post_id, reaction.actor_name, reaction.kind
    );
    // Leave room for the "..." suffix
    truncate_chars(&message, MAX_MESSAGE_CHARS - 3)
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Unlike byte slicing (`&text[..120]`), this respects UTF-8 character boundaries
/// and will never panic on multi-byte characters like emoji or accented letters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reaction(actor: &str) -> Reaction {
        Reaction {
            id: "R1".to_string(),
            post_id: "P100".to_string(),
            actor_name: actor.to_string(),
            kind: "LIKE".to_string(),
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_message_format() {
        assert_eq!(
            format_reaction_message(&reaction("Alice")),
            "New reaction on post P100:\n- User: Alice\n- Reaction: LIKE"
        );
    }

    #[test]
    fn test_message_capped_at_discord_limit() {
        let message = format_reaction_message(&reaction(&"é".repeat(5000)));
        assert_eq!(message.chars().count(), MAX_MESSAGE_CHARS);
        assert!(message.ends_with("..."));
    }

    #[test]
    fn test_truncate_chars_short_text_untouched() {
        assert_eq!(truncate_chars("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("🎉🎉🎉🎉", 2), "🎉🎉...");
    }
}
