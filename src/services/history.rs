// src/services/history.rs
//
// The chat completion API rejects conversations whose turns do not strictly
// alternate user/model starting with a user turn. Replay enforces that by
// truncation: a turn out of order ends the replay, it is never reordered.

use crate::message::{Message, Sender};
use crate::services::gemini::{Role, Turn};

/// Convert prior UI messages into a strictly alternating turn sequence.
/// Leading bot turns are skipped until a user turn can open the replay;
/// after that, the first turn with an unexpected role stops it.
pub fn replay(history: &[Message]) -> Vec<Turn> {
    let mut turns: Vec<Turn> = Vec::new();
    let mut expected = Role::User;

    for msg in history {
        let role = match msg.sender {
            Sender::User => Role::User,
            Sender::Bot => Role::Model,
        };
        if turns.is_empty() && role == Role::Model {
            continue;
        }
        if role != expected {
            break;
        }
        turns.push(Turn {
            role,
            text: msg.content.clone(),
        });
        expected = match expected {
            Role::User => Role::Model,
            Role::Model => Role::User,
        };
    }

    turns
}

/// Replayed history with the live user message appended. A replay that ends
/// on a user turn would put two user turns back to back, so that trailing
/// turn is dropped in favor of the live message.
pub fn forwarded_turns(history: &[Message], message: &str) -> Vec<Turn> {
    let mut turns = replay(history);
    if turns.last().is_some_and(|t| t.role == Role::User) {
        turns.pop();
    }
    turns.push(Turn::user(message));
    turns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(sender: Sender, content: &str) -> Message {
        Message {
            id: String::new(),
            content: content.to_string(),
            sender,
            timestamp: String::new(),
        }
    }

    #[test]
    fn empty_history_replays_empty() {
        assert!(replay(&[]).is_empty());
    }

    #[test]
    fn leading_bot_turns_are_skipped() {
        let history = vec![
            msg(Sender::Bot, "welcome"),
            msg(Sender::Bot, "still me"),
            msg(Sender::User, "hi"),
            msg(Sender::Bot, "hello"),
        ];
        let turns = replay(&history);
        assert_eq!(
            turns,
            vec![Turn::user("hi"), Turn::model("hello")]
        );
    }

    #[test]
    fn replay_stops_at_first_violation() {
        let history = vec![
            msg(Sender::User, "one"),
            msg(Sender::Bot, "two"),
            msg(Sender::Bot, "dup"),
            msg(Sender::User, "never reached"),
        ];
        let turns = replay(&history);
        assert_eq!(turns, vec![Turn::user("one"), Turn::model("two")]);
    }

    #[test]
    fn consecutive_user_turns_truncate() {
        let history = vec![msg(Sender::User, "a"), msg(Sender::User, "b")];
        assert_eq!(replay(&history), vec![Turn::user("a")]);
    }

    #[test]
    fn bot_user_bot_yields_two_turns() {
        let history = vec![
            msg(Sender::Bot, "greeting"),
            msg(Sender::User, "question"),
            msg(Sender::Bot, "answer"),
        ];
        let turns = replay(&history);
        assert_eq!(
            turns,
            vec![Turn::user("question"), Turn::model("answer")]
        );
    }

    #[test]
    fn live_message_is_appended_after_history() {
        let history = vec![msg(Sender::User, "q"), msg(Sender::Bot, "a")];
        let turns = forwarded_turns(&history, "next");
        assert_eq!(
            turns,
            vec![Turn::user("q"), Turn::model("a"), Turn::user("next")]
        );
    }

    #[test]
    fn trailing_user_turn_yields_to_live_message() {
        let history = vec![
            msg(Sender::User, "q"),
            msg(Sender::Bot, "a"),
            msg(Sender::User, "unanswered"),
        ];
        let turns = forwarded_turns(&history, "next");
        assert_eq!(
            turns,
            vec![Turn::user("q"), Turn::model("a"), Turn::user("next")]
        );
    }

    #[test]
    fn empty_history_forwards_only_live_message() {
        assert_eq!(forwarded_turns(&[], "hello"), vec![Turn::user("hello")]);
    }
}
