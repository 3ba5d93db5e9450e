use chrono::NaiveDate;
use rusqlite::Connection;

use crate::chat::{self, ChatContext, ChatGenerator, ChatReply, ChildAge};
use crate::dates::age_in_months;
use crate::db;
use crate::pregnancy::pregnancy_week;

use super::ServiceError;

/// Assemble the assistant's view of the user from stored records.
pub fn build_chat_context(
    conn: &Connection,
    user_name: Option<&str>,
    today: NaiveDate,
) -> Result<ChatContext, ServiceError> {
    let pregnancy_week = db::get_active_pregnancy(conn)?.map(|p| pregnancy_week(p.due_date, today));
    let children = db::get_active_children(conn)?
        .into_iter()
        .map(|c| ChildAge {
            age_months: age_in_months(c.birth_date, today),
            name: c.name,
        })
        .collect();

    Ok(ChatContext {
        user_name: user_name.map(str::to_string),
        pregnancy_week,
        children,
    })
}

pub fn ask(
    conn: &Connection,
    user_name: Option<&str>,
    query: &str,
    generator: Option<&dyn ChatGenerator>,
    today: NaiveDate,
) -> Result<ChatReply, ServiceError> {
    let ctx = build_chat_context(conn, user_name, today)?;
    let reply = chat::respond(query, &ctx, generator);
    tracing::info!(topic = %reply.topic, generated = reply.generated, "Chat reply");
    Ok(reply)
}
