//! Canonical byte encoding of task-board events
//!
//! An encoded event is a header, the event kind and its fields in a fixed
//! order, separated by the unit separator `0x1F`. Lists are written as their
//! item count followed by each item prefixed with the record separator
//! `0x1E`; optional values are lists of zero or one item; maps are the
//! entry count followed by each key and value prefixed with `0x1E`, in key
//! order. Text may not contain either separator, which makes the encoding
//! injective: two distinct events never produce the same bytes.
//!
//! Changed files and card extra fields are sets, so their input order does
//! not reach the bytes. Commits keep their order.

use crate::core::error::{ChainsealError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const HEADER: &str = "chainseal-event/v1";
const FIELD_SEP: u8 = 0x1F;
const ITEM_SEP: u8 = 0x1E;

/// Pull request state as reported by the PR pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub pr_number: u64,
    pub title: String,
    pub branch: String,
    pub status: String,
    /// Changed paths; encoded sorted, so the order supplied does not matter
    pub files_changed: Vec<String>,
    /// Commit identifiers, oldest first
    pub commits: Vec<String>,
}

/// Kanban card creation or full update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEvent {
    pub card_id: String,
    pub title: String,
    pub status: String,
    pub assignee: Option<String>,
    pub priority: Option<String>,
    /// Board-specific fields beyond the fixed ones
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_fields: BTreeMap<String, String>,
}

/// Event appended to the chain on behalf of a collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    PullRequest(PullRequestEvent),
    Card(CardEvent),
    CardTransition {
        card_id: String,
        from: String,
        to: String,
    },
    EndpointState {
        endpoint: String,
        status: String,
        response_code: u16,
        response_digest: String,
    },
}

impl LedgerEvent {
    /// Stable name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::PullRequest(_) => "pull_request",
            LedgerEvent::Card(_) => "kanban_card",
            LedgerEvent::CardTransition { .. } => "card_transition",
            LedgerEvent::EndpointState { .. } => "endpoint_state",
        }
    }

    /// Canonical bytes, or `SerializationAmbiguity` if a field cannot be encoded
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = CanonicalWriter::new(self.kind());
        match self {
            LedgerEvent::PullRequest(pr) => {
                writer.number(pr.pr_number);
                writer.text("title", &pr.title)?;
                writer.text("branch", &pr.branch)?;
                writer.text("status", &pr.status)?;
                let mut files = pr.files_changed.clone();
                files.sort();
                writer.list("files_changed", &files)?;
                writer.list("commits", &pr.commits)?;
            }
            LedgerEvent::Card(card) => {
                writer.text("card_id", &card.card_id)?;
                writer.text("title", &card.title)?;
                writer.text("status", &card.status)?;
                writer.optional("assignee", card.assignee.as_deref())?;
                writer.optional("priority", card.priority.as_deref())?;
                writer.map("extra_fields", &card.extra_fields)?;
            }
            LedgerEvent::CardTransition { card_id, from, to } => {
                writer.text("card_id", card_id)?;
                writer.text("from", from)?;
                writer.text("to", to)?;
            }
            LedgerEvent::EndpointState {
                endpoint,
                status,
                response_code,
                response_digest,
            } => {
                writer.text("endpoint", endpoint)?;
                writer.text("status", status)?;
                writer.number(u64::from(*response_code));
                writer.text("response_digest", response_digest)?;
            }
        }
        Ok(writer.finish())
    }
}

struct CanonicalWriter {
    buf: Vec<u8>,
}

impl CanonicalWriter {
    fn new(kind: &str) -> Self {
        let mut buf = Vec::with_capacity(128);
        buf.extend_from_slice(HEADER.as_bytes());
        buf.push(FIELD_SEP);
        buf.extend_from_slice(kind.as_bytes());
        Self { buf }
    }

    fn number(&mut self, value: u64) {
        self.buf.push(FIELD_SEP);
        self.buf.extend_from_slice(value.to_string().as_bytes());
    }

    fn text(&mut self, field: &str, value: &str) -> Result<()> {
        check_text(field, value)?;
        self.buf.push(FIELD_SEP);
        self.buf.extend_from_slice(value.as_bytes());
        Ok(())
    }

    fn list<S: AsRef<str>>(&mut self, field: &str, items: &[S]) -> Result<()> {
        self.number(items.len() as u64);
        for item in items {
            let item = item.as_ref();
            check_text(field, item)?;
            self.buf.push(ITEM_SEP);
            self.buf.extend_from_slice(item.as_bytes());
        }
        Ok(())
    }

    fn optional(&mut self, field: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(v) => self.list(field, &[v]),
            None => self.list::<&str>(field, &[]),
        }
    }

    fn map(&mut self, field: &str, entries: &BTreeMap<String, String>) -> Result<()> {
        self.number(entries.len() as u64);
        for (key, value) in entries {
            for text in [key, value] {
                check_text(field, text)?;
                self.buf.push(ITEM_SEP);
                self.buf.extend_from_slice(text.as_bytes());
            }
        }
        Ok(())
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}

fn check_text(field: &str, value: &str) -> Result<()> {
    if let Some(byte) = value
        .bytes()
        .find(|b| *b == FIELD_SEP || *b == ITEM_SEP)
    {
        return Err(ChainsealError::serialization_ambiguity(
            field,
            format!("contains reserved separator byte 0x{:02X}", byte),
        ));
    }
    Ok(())
}
