//! Message composing — pure text templating, no I/O.
//!
//! The templates are the ones the ward has been receiving all along, so
//! the wording (including the Portuguese) is load-bearing: recipients
//! pattern-match on it.

use wardpost_store::{Announcement, TaskItem};

/// Render the group announcement text.
///
/// The link line is omitted when the link is absent, blank, or the literal
/// string "none" in any casing. The dashboard historically stored the
/// stringified Python `None` for "no link", so that sentinel is part of
/// the data contract, not a semantic null.
pub fn group_message(announcement: &Announcement) -> String {
    let mut text = format!(
        "⛪ *PORTAL DA ALA - COMUNICADO*\n\n📌 *{}*\n\n{}\n",
        announcement.title.to_uppercase(),
        announcement.body
    );
    if let Some(link) = announcement.link.as_deref() {
        if !link_is_absent(link) {
            text.push_str(&format!("\n🔗 Saiba mais: {link}"));
        }
    }
    text
}

/// Render one recipient's reminder block: greeting, the priority-tagged
/// task bullets in the order given, and the closing call to action.
///
/// Tasks arrive pre-grouped by the dispatcher; this function never
/// re-sorts them, so the message order matches the store order.
pub fn reminder_message(recipient: &str, tasks: &[TaskItem]) -> String {
    let mut msg = format!(
        "Olá *{recipient}*, você tem as seguintes tarefas pendentes no *Portal da Ala*:\n\n"
    );
    let lines: Vec<String> = tasks
        .iter()
        .map(|t| format!("• *[{}]* {}", t.priority, t.description))
        .collect();
    msg.push_str(&lines.join("\n"));
    msg.push_str("\n\n📌 _Por favor, verifique o painel do Bispado no App._");
    msg
}

fn link_is_absent(link: &str) -> bool {
    let trimmed = link.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none")
}
