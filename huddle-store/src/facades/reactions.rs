//! Reaction group aggregation shared by channel and group messages.
//!
//! Reactions are stored as `{symbol, participants[]}` groups. Adding a
//! reaction appends the participant to the symbol's group or creates the
//! group; removing strips the participant and deletes an emptied group.
//! Both operations report whether they changed anything so callers can
//! skip the write on a no-op.

use huddle_core::Reaction;

/// Add `participant` to the group for `symbol`. Idempotent: a participant
/// already in the group leaves the list untouched.
pub(crate) fn add(reactions: &mut Vec<Reaction>, symbol: &str, participant: &str) -> bool {
    if let Some(group) = reactions.iter_mut().find(|r| r.symbol == symbol) {
        if group.participants.iter().any(|p| p == participant) {
            return false;
        }
        group.participants.push(participant.to_string());
    } else {
        reactions.push(Reaction {
            symbol: symbol.to_string(),
            participants: vec![participant.to_string()],
        });
    }
    true
}

/// Remove `participant` from the group for `symbol`, dropping the group
/// entirely if it empties. Returns false when there was nothing to remove.
pub(crate) fn remove(reactions: &mut Vec<Reaction>, symbol: &str, participant: &str) -> bool {
    let Some(index) = reactions.iter().position(|r| r.symbol == symbol) else {
        return false;
    };
    let group = &mut reactions[index];
    let before = group.participants.len();
    group.participants.retain(|p| p != participant);
    if group.participants.len() == before {
        return false;
    }
    if group.participants.is_empty() {
        reactions.remove(index);
    }
    true
}

// ============================================================================
// TESTS
// ============================================================================
