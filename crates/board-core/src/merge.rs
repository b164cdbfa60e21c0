//! Message collection merging.
//!
//! Every path that ingests a message collection (REST fetch, process-message
//! fallback, realtime finalization) converges through [`merge_messages`], so
//! de-duplication policy is uniform no matter which source delivered a
//! message first. The function is pure: repeated delivery of the same
//! identifier converges to the same result regardless of arrival order,
//! which is what makes at-least-once delivery from the realtime channel safe.

use crate::conversation::Message;
use std::collections::HashMap;

/// Merges `incoming` messages into `existing`, keyed by message identifier.
///
/// Rules:
/// - An incoming message whose identifier already exists overwrites the
///   existing entry in place (last write wins, position preserved).
/// - An incoming message with a new identifier is appended.
/// - A message without an identifier is always appended; it can neither
///   overwrite nor be overwritten, so degraded payloads are never silently
///   dropped or fused with an unrelated message.
///
/// The result contains every identified input message exactly once, holding
/// the most recently applied version of its content.
pub fn merge_messages(existing: Vec<Message>, incoming: Vec<Message>) -> Vec<Message> {
    let mut merged = existing;
    let mut index: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .filter_map(|(pos, message)| message.id.clone().map(|id| (id, pos)))
        .collect();

    for message in incoming {
        match message.id.clone() {
            Some(id) => {
                if let Some(&pos) = index.get(&id) {
                    merged[pos] = message;
                } else {
                    index.insert(id, merged.len());
                    merged.push(message);
                }
            }
            None => merged.push(message),
        }
    }

    merged
}
