use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Elder,
    Young,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Elder => "elder",
            Role::Young => "young",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A participant identity, parsed once at the boundary from the
/// `{role}_{pair_id}` wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub role: Role,
    pub pair_id: String,
}

impl Participant {
    pub fn parse(id: &str) -> Result<Self, Reject> {
        let (role, pair_id) = if let Some(rest) = id.strip_prefix("elder_") {
            (Role::Elder, rest)
        } else if let Some(rest) = id.strip_prefix("young_") {
            (Role::Young, rest)
        } else {
            return Err(Reject::MalformedIdentifier);
        };

        if pair_id.is_empty() {
            return Err(Reject::MalformedIdentifier);
        }

        Ok(Participant {
            role,
            pair_id: pair_id.to_owned(),
        })
    }

    pub fn id(&self) -> String {
        format!("{}_{}", self.role, self.pair_id)
    }
}

/// Why a frame was refused before persistence or routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Reject {
    #[error("frame is missing a required field")]
    MissingField,
    #[error("sender and recipient are the same participant")]
    SelfAddressed,
    #[error("malformed participant identifier")]
    MalformedIdentifier,
    #[error("participant does not belong to the declared pair")]
    PairMismatch,
}

/// Structural check that `from`, `to` and `pair_id` agree, run before any
/// message is stored or forwarded. Whether the recipient is online is not
/// this check's business.
pub fn authorize(from: &str, to: &str, pair_id: &str) -> Result<(), Reject> {
    if from == to {
        return Err(Reject::SelfAddressed);
    }

    let sender = Participant::parse(from)?;
    let recipient = Participant::parse(to)?;

    if sender.pair_id != pair_id || recipient.pair_id != pair_id {
        return Err(Reject::PairMismatch);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_canonical_identifiers() {
        let elder = Participant::parse("elder_7").unwrap();
        assert_eq!(elder.role, Role::Elder);
        assert_eq!(elder.pair_id, "7");
        assert_eq!(elder.id(), "elder_7");

        let young = Participant::parse("young_abc-123").unwrap();
        assert_eq!(young.role, Role::Young);
        assert_eq!(young.pair_id, "abc-123");
    }

    #[test]
    fn parse_rejects_malformed_identifiers() {
        for id in ["", "elder", "elder_", "young_", "boss_7", "elder7", "_7"] {
            assert_eq!(Participant::parse(id), Err(Reject::MalformedIdentifier), "{id:?}");
        }
    }

    #[test]
    fn authorize_accepts_both_directions_of_a_pair() {
        assert_eq!(authorize("elder_7", "young_7", "7"), Ok(()));
        assert_eq!(authorize("young_7", "elder_7", "7"), Ok(()));
    }

    #[test]
    fn authorize_rejects_self_addressed() {
        assert_eq!(authorize("elder_7", "elder_7", "7"), Err(Reject::SelfAddressed));
    }

    #[test]
    fn authorize_rejects_recipient_outside_pair() {
        assert_eq!(authorize("elder_7", "young_9", "7"), Err(Reject::PairMismatch));
    }

    #[test]
    fn authorize_rejects_sender_outside_pair() {
        assert_eq!(authorize("elder_9", "young_7", "7"), Err(Reject::PairMismatch));
    }

    #[test]
    fn authorize_rejects_same_role_in_pair() {
        // elder_7 -> elder_7 is self-addressed; a same-role recipient can only
        // differ via the pair, which then mismatches.
        assert_eq!(authorize("elder_7", "elder_9", "7"), Err(Reject::PairMismatch));
    }

    #[test]
    fn authorize_rejects_malformed_parties() {
        assert_eq!(authorize("elder_7", "nobody", "7"), Err(Reject::MalformedIdentifier));
        assert_eq!(authorize("nobody", "young_7", "7"), Err(Reject::MalformedIdentifier));
    }
}
