use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cards::Attribute;

/// Room lifecycle status, as stored by the data service.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Ended,
}

/// Game phase within a room.
///
/// `Ended` is not a phase: a finished game is signalled through
/// `RoomStatus::Ended`, whatever phase the room was in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomPhase {
    Waiting,
    Triunfo,
    Bidding,
    Playing,
    Scoring,
}

impl RoomPhase {
    /// Whether `next` is a legal phase transition from `self`.
    ///
    /// The playing self-edge is the round-to-round rotation within a set.
    pub fn can_transition(self, next: RoomPhase) -> bool {
        use RoomPhase::*;
        matches!(
            (self, next),
            (Waiting, Triunfo)
                | (Triunfo, Bidding)
                | (Bidding, Playing)
                | (Playing, Playing)
                | (Playing, Scoring)
                | (Scoring, Waiting)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomPhase::Waiting => "waiting",
            RoomPhase::Triunfo => "triunfo",
            RoomPhase::Bidding => "bidding",
            RoomPhase::Playing => "playing",
            RoomPhase::Scoring => "scoring",
        }
    }
}

impl std::fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One match instance. The single source of truth for game state; every
/// client mirrors it and reconciles on each change event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub code: String,
    pub host_id: Uuid,
    pub status: RoomStatus,
    pub phase: RoomPhase,
    pub current_set: i32,
    pub current_round: i32,
    pub triunfo_card_id: Option<Uuid>,
    pub current_attribute: Option<Attribute>,
    pub round_starter_position: i32,
    pub ended_reason: Option<String>,
}

/// Partial update for a room row. `None` fields are left untouched; the
/// double-`Option` fields distinguish "set to null" from "leave alone".
#[derive(Clone, Debug, Default)]
pub struct RoomPatch {
    pub status: Option<RoomStatus>,
    pub phase: Option<RoomPhase>,
    pub current_set: Option<i32>,
    pub current_round: Option<i32>,
    pub triunfo_card_id: Option<Option<Uuid>>,
    pub current_attribute: Option<Option<Attribute>>,
    pub round_starter_position: Option<i32>,
    pub ended_reason: Option<Option<String>>,
}

impl RoomPatch {
    pub fn apply(&self, room: &mut Room) {
        if let Some(status) = self.status {
            room.status = status;
        }
        if let Some(phase) = self.phase {
            room.phase = phase;
        }
        if let Some(set) = self.current_set {
            room.current_set = set;
        }
        if let Some(round) = self.current_round {
            room.current_round = round;
        }
        if let Some(card_id) = self.triunfo_card_id {
            room.triunfo_card_id = card_id;
        }
        if let Some(attribute) = self.current_attribute {
            room.current_attribute = attribute;
        }
        if let Some(position) = self.round_starter_position {
            room.round_starter_position = position;
        }
        if let Some(ref reason) = self.ended_reason {
            room.ended_reason = reason.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_listed_phase_edges_are_legal() {
        use RoomPhase::*;
        let all = [Waiting, Triunfo, Bidding, Playing, Scoring];
        let legal = [
            (Waiting, Triunfo),
            (Triunfo, Bidding),
            (Bidding, Playing),
            (Playing, Playing),
            (Playing, Scoring),
            (Scoring, Waiting),
        ];

        for from in all {
            for to in all {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition(to),
                    expected,
                    "edge {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_room_parses_from_service_row() {
        let row = serde_json::json!({
            "id": "1f4a9c2e-5b6d-4e7f-8a9b-0c1d2e3f4a5b",
            "code": "XQ7P",
            "host_id": "2a3b4c5d-6e7f-4a9b-8c1d-2e3f4a5b6c7d",
            "status": "playing",
            "phase": "bidding",
            "current_set": 1,
            "current_round": 0,
            "triunfo_card_id": null,
            "current_attribute": "tet",
            "round_starter_position": 0,
            "ended_reason": null
        });
        let room: Room = serde_json::from_value(row).unwrap();
        assert_eq!(room.status, RoomStatus::Playing);
        assert_eq!(room.phase, RoomPhase::Bidding);
        assert_eq!(room.current_attribute, Some(Attribute::Tet));
    }

    #[test]
    fn test_patch_distinguishes_null_from_untouched() {
        let mut room: Room = serde_json::from_value(serde_json::json!({
            "id": "1f4a9c2e-5b6d-4e7f-8a9b-0c1d2e3f4a5b",
            "code": "XQ7P",
            "host_id": "2a3b4c5d-6e7f-4a9b-8c1d-2e3f4a5b6c7d",
            "status": "playing",
            "phase": "playing",
            "current_set": 1,
            "current_round": 3,
            "triunfo_card_id": null,
            "current_attribute": "fis",
            "round_starter_position": 2,
            "ended_reason": null
        }))
        .unwrap();

        // Clearing the attribute between rounds must not disturb the rest.
        RoomPatch {
            current_attribute: Some(None),
            current_round: Some(4),
            ..Default::default()
        }
        .apply(&mut room);

        assert_eq!(room.current_attribute, None);
        assert_eq!(room.current_round, 4);
        assert_eq!(room.round_starter_position, 2);
        assert_eq!(room.phase, RoomPhase::Playing);
    }
}
