//! Data disclosure agreement lifecycle: status state machine, signature
//! state derivation, and the consent opt-in toggle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a DDA template revision.
///
/// `Archived` is terminal for active queries: archived rows are kept for
/// history but never surfaced by listings, search, or transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DdaStatus {
    #[serde(rename = "unlisted")]
    Unlisted,
    #[serde(rename = "awaitingForApproval")]
    AwaitingForApproval,
    #[serde(rename = "approved")]
    Approved,
    #[serde(rename = "rejected")]
    Rejected,
    #[serde(rename = "listed")]
    Listed,
    #[serde(rename = "archived")]
    Archived,
}

impl DdaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DdaStatus::Unlisted => "unlisted",
            DdaStatus::AwaitingForApproval => "awaitingForApproval",
            DdaStatus::Approved => "approved",
            DdaStatus::Rejected => "rejected",
            DdaStatus::Listed => "listed",
            DdaStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for DdaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DdaStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unlisted" => Ok(DdaStatus::Unlisted),
            "awaitingForApproval" => Ok(DdaStatus::AwaitingForApproval),
            "approved" => Ok(DdaStatus::Approved),
            "rejected" => Ok(DdaStatus::Rejected),
            "listed" => Ok(DdaStatus::Listed),
            "archived" => Ok(DdaStatus::Archived),
            other => Err(format!("unknown DDA status '{other}'")),
        }
    }
}

/// The fixed status transition table.
///
/// | current  | requested           |
/// |----------|---------------------|
/// | unlisted | awaitingForApproval |
/// | approved | listed              |
/// | rejected | awaitingForApproval |
/// | listed   | unlisted            |
///
/// Everything else is illegal. `archived` is never a legal target through
/// this path; archival only happens via the notification delete event.
pub fn is_legal_transition(current: DdaStatus, requested: DdaStatus) -> bool {
    matches!(
        (current, requested),
        (DdaStatus::Unlisted, DdaStatus::AwaitingForApproval)
            | (DdaStatus::Approved, DdaStatus::Listed)
            | (DdaStatus::Rejected, DdaStatus::AwaitingForApproval)
            | (DdaStatus::Listed, DdaStatus::Unlisted)
    )
}

/// Signature state of a consent record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordState {
    #[serde(rename = "unsigned")]
    Unsigned,
    #[serde(rename = "signed")]
    Signed,
}

impl RecordState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordState::Unsigned => "unsigned",
            RecordState::Signed => "signed",
        }
    }
}

impl FromStr for RecordState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unsigned" => Ok(RecordState::Unsigned),
            "signed" => Ok(RecordState::Signed),
            other => Err(format!("unknown record state '{other}'")),
        }
    }
}

/// Derive the signature state from a record payload.
///
/// A record is `signed` iff both `dataSourceSignature.signature` and
/// `dataUsingServiceSignature.signature` are present and truthy. State is
/// never settable independently of the payload.
pub fn derive_record_state(record: &serde_json::Value) -> RecordState {
    let signed = |party: &str| -> bool {
        match record.get(party).and_then(|s| s.get("signature")) {
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            Some(serde_json::Value::Null) | None => false,
            Some(serde_json::Value::Bool(b)) => *b,
            Some(_) => true,
        }
    };
    if signed("dataSourceSignature") && signed("dataUsingServiceSignature") {
        RecordState::Signed
    } else {
        RecordState::Unsigned
    }
}

/// Compute the opt-in value to forward with a verification request.
///
/// - No prior record: first-time consent defaults to opt-in.
/// - Prior record still unsigned: keep the stored value, the previous
///   request is still pending.
/// - Prior record signed: a second interaction is a toggle/revocation
///   request, so the stored value is negated.
pub fn next_opt_in(existing: Option<(RecordState, bool)>) -> bool {
    match existing {
        None => true,
        Some((RecordState::Unsigned, stored)) => stored,
        Some((RecordState::Signed, stored)) => !stored,
    }
}
