//! Conversation state: an append-only sequence of chat turns
//!
//! `Conversation::append` never mutates the receiver. It returns a new
//! sequence, so snapshots handed to the preview server or the terminal
//! stay valid while the builder keeps appending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use ulid::Ulid;

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the person building the site
    User,
    /// Summary returned by the generation service, or the apology text
    Assistant,
}

impl Role {
    /// Lowercase name used on the wire and in JSON snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Stable identifier, assigned when the turn is created
    pub id: Ulid,
    /// Who wrote the turn
    pub role: Role,
    /// Free text
    pub content: String,
    /// Informational timestamp; sequence order is authoritative
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Creates a turn stamped with the current time
    ///
    /// # Examples
    ///
    /// ```
    /// use sitewright::session::conversation::{Role, Turn};
    /// use ulid::Ulid;
    ///
    /// let turn = Turn::new(Ulid::new(), Role::User, "a red button");
    /// assert_eq!(turn.role, Role::User);
    /// assert_eq!(turn.content, "a red button");
    /// ```
    pub fn new(id: Ulid, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Produces turn identifiers that strictly increase within a session
///
/// Identifiers are ULIDs: the leading 48 bits are the creation timestamp and
/// turns created in the same millisecond still sort in creation order.
pub struct TurnIdGenerator {
    inner: ulid::Generator,
}

impl Default for TurnIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnIdGenerator {
    /// Create a new generator
    pub fn new() -> Self {
        Self {
            inner: ulid::Generator::new(),
        }
    }

    /// Next identifier
    pub fn next_id(&mut self) -> Ulid {
        match self.inner.generate() {
            Ok(id) => id,
            Err(e) => {
                // Random component exhausted within one millisecond
                tracing::warn!("Monotonic turn id overflow ({}), using a fresh id", e);
                Ulid::new()
            }
        }
    }
}

/// Ordered, append-only list of turns
///
/// Cloning is cheap: clones share the same buffer.
///
/// # Examples
///
/// ```
/// use sitewright::session::conversation::{Conversation, Role, Turn};
/// use ulid::Ulid;
///
/// let empty = Conversation::new();
/// let one = empty.append(Turn::new(Ulid::new(), Role::User, "hello"));
/// assert!(empty.is_empty());
/// assert_eq!(one.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Arc<[Turn]>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Creates an empty conversation
    pub fn new() -> Self {
        Self {
            turns: Arc::from(Vec::new()),
        }
    }

    /// Returns a new conversation with `turn` at the end
    pub fn append(&self, turn: Turn) -> Self {
        let mut turns = Vec::with_capacity(self.turns.len() + 1);
        turns.extend(self.turns.iter().cloned());
        turns.push(turn);
        Self {
            turns: Arc::from(turns),
        }
    }

    /// All turns in conversational order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when no turn has been appended yet
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Most recent turn
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// The last `n` turns, oldest first
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }
}

impl Serialize for Conversation {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.turns.iter())
    }
}
