//! Domain enums: record status, movement kind, professional specialty

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Review status of an authorization record
///
/// Stored as its integer code. There is no transition graph; any status may
/// follow any status (see [`TransitionPolicy`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum AihStatus {
    DirectApproval = 1,
    IndirectApprovalActive = 2,
    InDiscussionActive = 3,
    FinalizedAfterDiscussion = 4,
}

impl AihStatus {
    pub const ALL: [AihStatus; 4] = [
        AihStatus::DirectApproval,
        AihStatus::IndirectApprovalActive,
        AihStatus::InDiscussionActive,
        AihStatus::FinalizedAfterDiscussion,
    ];

    /// Parse a stored status code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(AihStatus::DirectApproval),
            2 => Some(AihStatus::IndirectApprovalActive),
            3 => Some(AihStatus::InDiscussionActive),
            4 => Some(AihStatus::FinalizedAfterDiscussion),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn description(self) -> &'static str {
        status_description(self.code())
    }

    /// Statuses 1 and 4 close the review
    pub fn is_finalized(self) -> bool {
        matches!(
            self,
            AihStatus::DirectApproval | AihStatus::FinalizedAfterDiscussion
        )
    }
}

impl TryFrom<i64> for AihStatus {
    type Error = Error;

    fn try_from(code: i64) -> Result<Self> {
        AihStatus::from_code(code)
            .ok_or_else(|| Error::Validation(format!("Status must be 1-4, got {}", code)))
    }
}

impl From<AihStatus> for i64 {
    fn from(status: AihStatus) -> i64 {
        status.code()
    }
}

/// Human-readable description of a status code
///
/// Unknown codes yield "Unknown" instead of failing.
pub fn status_description(code: i64) -> &'static str {
    match code {
        1 => "Finalized direct approval",
        2 => "Active indirect approval",
        3 => "Active in discussion",
        4 => "Finalized after discussion",
        _ => "Unknown",
    }
}

/// Validates a status change before a movement is appended
///
/// Receives the current status and the requested one. Returning
/// `Error::ConflictingState` rejects the movement.
pub type TransitionPolicy = fn(AihStatus, AihStatus) -> Result<()>;

/// Any status may follow any status
pub fn permissive_policy(_from: AihStatus, _to: AihStatus) -> Result<()> {
    Ok(())
}

/// Kind of movement recorded against a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementKind {
    #[serde(rename = "entrada_sus")]
    IntakeBySus,
    #[serde(rename = "saida_hospital")]
    DischargeFromHospital,
}

impl MovementKind {
    /// Stored column value
    pub fn as_str(self) -> &'static str {
        match self {
            MovementKind::IntakeBySus => "entrada_sus",
            MovementKind::DischargeFromHospital => "saida_hospital",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "entrada_sus" => Some(MovementKind::IntakeBySus),
            "saida_hospital" => Some(MovementKind::DischargeFromHospital),
            _ => None,
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reviewing specialty of a professional
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    Medicine,
    Nursing,
    Physiotherapy,
    Maxillofacial,
}

impl Specialty {
    /// Attribution priority used by per-professional reporting
    pub const PRIORITY: [Specialty; 4] = [
        Specialty::Medicine,
        Specialty::Nursing,
        Specialty::Physiotherapy,
        Specialty::Maxillofacial,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Specialty::Medicine => "medicine",
            Specialty::Nursing => "nursing",
            Specialty::Physiotherapy => "physiotherapy",
            Specialty::Maxillofacial => "maxillofacial",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "medicine" => Some(Specialty::Medicine),
            "nursing" => Some(Specialty::Nursing),
            "physiotherapy" => Some(Specialty::Physiotherapy),
            "maxillofacial" => Some(Specialty::Maxillofacial),
            _ => None,
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_descriptions() {
        assert_eq!(status_description(1), "Finalized direct approval");
        assert_eq!(status_description(2), "Active indirect approval");
        assert_eq!(status_description(3), "Active in discussion");
        assert_eq!(status_description(4), "Finalized after discussion");
        assert_eq!(status_description(0), "Unknown");
        assert_eq!(status_description(9), "Unknown");
    }

    #[test]
    fn test_status_rejects_unknown_code() {
        assert!(AihStatus::try_from(5).is_err());
        assert_eq!(AihStatus::try_from(4).unwrap(), AihStatus::FinalizedAfterDiscussion);
    }

    #[test]
    fn test_finalized_statuses() {
        let finalized: Vec<_> = AihStatus::ALL.iter().filter(|s| s.is_finalized()).collect();
        assert_eq!(
            finalized,
            vec![&AihStatus::DirectApproval, &AihStatus::FinalizedAfterDiscussion]
        );
    }

    #[test]
    fn test_status_serializes_as_code() {
        let json = serde_json::to_string(&AihStatus::InDiscussionActive).unwrap();
        assert_eq!(json, "3");
        let parsed: AihStatus = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, AihStatus::IndirectApprovalActive);
        assert!(serde_json::from_str::<AihStatus>("7").is_err());
    }

    #[test]
    fn test_movement_kind_wire_names() {
        let json = serde_json::to_string(&MovementKind::DischargeFromHospital).unwrap();
        assert_eq!(json, "\"saida_hospital\"");
        assert_eq!(MovementKind::from_str("entrada_sus"), Some(MovementKind::IntakeBySus));
        assert_eq!(MovementKind::from_str("other"), None);
    }

    #[test]
    fn test_specialty_round_trip_names() {
        for specialty in Specialty::PRIORITY {
            assert_eq!(Specialty::from_str(specialty.as_str()), Some(specialty));
        }
    }

    #[test]
    fn test_permissive_policy_allows_reopening() {
        assert!(permissive_policy(AihStatus::DirectApproval, AihStatus::InDiscussionActive).is_ok());
    }
}
