//! Chat session: conversation log and per-query state machine
//!
//! Each submitted query appends a user entry and a transient "Thinking..."
//! placeholder, sends the query plus the loaded wire schema through the
//! [`QueryBackend`] seam, and replaces the placeholder with the classified
//! reply. The log therefore always ends in a deterministic bot entry,
//! whatever the backend did.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::{BackendClient, BackendError};
use crate::schema::WireSchema;

use super::reply::{classify, MessageBody, TableRow};

pub const THINKING: &str = "Thinking...";
pub const NO_RESULTS: &str = "No results found for your query.";

/// Who produced a conversation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One entry in the append-only conversation log. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEntry {
    pub sender: Sender,
    pub body: MessageBody,
    pub at: DateTime<Utc>,
}

impl ConversationEntry {
    fn new(sender: Sender, body: MessageBody) -> Self {
        Self {
            sender,
            body,
            at: Utc::now(),
        }
    }
}

/// The chat-query operation, abstracted so sessions are testable without
/// a live backend.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn chat_query(
        &self,
        query: &str,
        schema: &WireSchema,
    ) -> Result<Value, BackendError>;
}

#[async_trait]
impl QueryBackend for BackendClient {
    async fn chat_query(
        &self,
        query: &str,
        schema: &WireSchema,
    ) -> Result<Value, BackendError> {
        BackendClient::chat_query(self, query, schema).await
    }
}

/// A single chat session against a loaded schema.
pub struct ChatSession {
    id: Uuid,
    schema: WireSchema,
    entries: Vec<ConversationEntry>,
}

impl ChatSession {
    pub fn new(schema: WireSchema) -> Self {
        let id = Uuid::new_v4();
        info!("Starting chat session {} for schema '{}'", id, schema.name);
        Self {
            id,
            schema,
            entries: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn schema(&self) -> &WireSchema {
        &self.schema
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&ConversationEntry> {
        self.entries.last()
    }

    /// Step 1 and 2 of the per-query state machine: append the verbatim
    /// user entry and the optimistic bot placeholder. The caller renders
    /// the placeholder while the request is in flight.
    pub fn begin(&mut self, query: &str) {
        self.entries
            .push(ConversationEntry::new(Sender::User, MessageBody::Text(query.to_string())));
        self.entries
            .push(ConversationEntry::new(Sender::Bot, MessageBody::Text(THINKING.to_string())));
    }

    /// Final step: replace the placeholder with the outcome, either the
    /// classified reply on success or an error text on transport failure.
    pub fn resolve(&mut self, outcome: Result<Value, BackendError>) {
        let body = match outcome {
            Ok(reply) => classify(&reply),
            Err(err) => MessageBody::Text(format!("Error: {}", err)),
        };
        self.entries.pop();
        self.entries.push(ConversationEntry::new(Sender::Bot, body));
    }

    /// Run a whole query through the state machine and return the final
    /// bot entry. One outstanding request at a time; the sequential caller
    /// enforces that by construction.
    pub async fn submit(
        &mut self,
        backend: &impl QueryBackend,
        query: &str,
    ) -> &ConversationEntry {
        debug!("Session {} query: {}", self.id, query);
        self.begin(query);
        let outcome = backend.chat_query(query, &self.schema).await;
        self.resolve(outcome);
        self.entries.last().expect("resolve always leaves a bot entry")
    }
}

/// Render a message body as terminal text.
///
/// Tables derive their column set from the first row's key order and hold
/// every row to it: missing values and nulls render blank, so a ragged
/// row never shifts the layout. An empty table renders an explicit
/// no-results notice rather than a bare header.
pub fn render_body(body: &MessageBody) -> String {
    match body {
        MessageBody::Text(text) => text.clone(),
        MessageBody::Table(rows) => render_table(rows),
    }
}

fn render_table(rows: &[TableRow]) -> String {
    let Some(first) = rows.first() else {
        return NO_RESULTS.to_string();
    };

    let columns: Vec<&String> = first.keys().collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| row.get(*col).map(cell_text).unwrap_or_default())
                .collect()
        })
        .collect();

    // Char counts, not byte lengths: format! pads by chars, and accented
    // cell values would otherwise over-widen their column.
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .max()
                .unwrap_or(0)
                .max(col.chars().count())
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(col, w)| format!("{:<width$}", col, width = *w))
        .collect();
    out.push_str(&header.join(" | "));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    for row in &cells {
        out.push('\n');
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect();
        out.push_str(line.join(" | ").trim_end());
    }
    out
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
