use ac_context::Fragment;
use ac_domain::tool::{Message, Role};

use crate::section::{Section, Template};

fn role_from_str(s: &str) -> Role {
    match s {
        "system" => Role::System,
        "assistant" => Role::Assistant,
        "tool" => Role::Tool,
        _ => Role::User,
    }
}

fn join_separator(type_tag: &str) -> &'static str {
    if type_tag == "system" {
        "\n\n"
    } else {
        "\n"
    }
}

/// Render a parsed template into an ordered message list.
///
/// `fragments` is the full, already-gathered set from every context provider
/// (see `ac_context::gather`); `user_input` is the turn's raw input text.
pub fn render(template: &Template, fragments: &[Fragment], user_input: &str) -> Vec<Message> {
    let mut messages = Vec::new();

    for section in &template.sections {
        match section {
            Section::Literal(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    messages.push(Message::system(trimmed.to_string()));
                }
            }
            Section::Variable { type_tag, name: None } if type_tag == "user_input" => {
                if !user_input.is_empty() {
                    messages.push(Message::user(user_input.to_string()));
                }
            }
            Section::Variable { type_tag, name: None } if type_tag == "history" => {
                for fragment in fragments.iter().filter(|f| f.type_tag == "history") {
                    if fragment.is_empty() {
                        continue;
                    }
                    let role = fragment
                        .metadata
                        .get("original_role")
                        .and_then(|v| v.as_str())
                        .unwrap_or("user");
                    messages.push(Message::with_role(role_from_str(role), fragment.content.clone()));
                }
            }
            Section::Variable { type_tag, name } => {
                let matching = fragments.iter().filter(|f| {
                    f.type_tag == *type_tag
                        && match name {
                            Some(n) => {
                                f.metadata.get("provider_name").and_then(|v| v.as_str()) == Some(n.as_str())
                            }
                            None => true,
                        }
                });
                let joined = matching
                    .map(|f| f.content.as_str())
                    .filter(|c| !c.trim().is_empty())
                    .collect::<Vec<_>>()
                    .join(join_separator(type_tag));
                if !joined.is_empty() {
                    messages.push(Message::system(joined));
                }
            }
        }
    }

    messages
}
