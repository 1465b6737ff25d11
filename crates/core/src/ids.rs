//! Identifier helpers.

use uuid::Uuid;

/// Length of short job and file identifiers.
pub const SHORT_ID_LEN: usize = 8;

/// First eight hex characters of a random UUID.
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHORT_ID_LEN);
    id
}

/// Full hyphenated random UUID, used for conversation ids.
pub fn long_id() -> String {
    Uuid::new_v4().to_string()
}
