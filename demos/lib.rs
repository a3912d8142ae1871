//! Terminal rendering shared by the demo binaries.

use symptom_flow::{Message, MessageContent, MessageKind};

/// Formats bot replies and option lists, one line each. User echoes are skipped.
pub fn format_messages(messages: &[Message]) -> String {
    let mut out = String::new();
    for message in messages {
        match (&message.kind, &message.content) {
            (MessageKind::User, _) => {}
            (_, MessageContent::Text(text)) => {
                out.push_str("Bot: ");
                out.push_str(text);
                out.push('\n');
            }
            (_, MessageContent::Options(options)) => {
                for option in options {
                    out.push_str("   - ");
                    out.push_str(option);
                    out.push('\n');
                }
            }
        }
    }
    out
}

pub fn render(messages: &[Message]) {
    print!("{}", format_messages(messages));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_text_and_options() {
        let messages = vec![
            Message::user("itch"),
            Message::options(vec!["itching".into(), "internal_itching".into()]),
            Message::bot("For how many days?"),
        ];
        assert_eq!(
            format_messages(&messages),
            "   - itching\n   - internal_itching\nBot: For how many days?\n"
        );
    }
}
