// ********* County status data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The position of a county in the server-side audit state machine.
///
/// These values are owned by the server; the client only ever receives
/// them in dashboard snapshots and renders them.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum CountyAsmState {
    CountyInitialState,
    BallotManifestOk,
    CvrsImporting,
    CvrsOk,
    BallotManifestOkAndCvrsImporting,
    BallotManifestAndCvrsOk,
    CountyAuditUnderway,
    CountyAuditComplete,
    DeadlineMissed,
}

impl CountyAsmState {
    pub const ALL: [CountyAsmState; 9] = [
        CountyAsmState::CountyInitialState,
        CountyAsmState::BallotManifestOk,
        CountyAsmState::CvrsImporting,
        CountyAsmState::CvrsOk,
        CountyAsmState::BallotManifestOkAndCvrsImporting,
        CountyAsmState::BallotManifestAndCvrsOk,
        CountyAsmState::CountyAuditUnderway,
        CountyAsmState::CountyAuditComplete,
        CountyAsmState::DeadlineMissed,
    ];

    /// Parses the wire representation used by the server.
    pub fn from_wire(s: &str) -> Result<CountyAsmState, AuditError> {
        match s {
            "COUNTY_INITIAL_STATE" => Ok(CountyAsmState::CountyInitialState),
            "BALLOT_MANIFEST_OK" => Ok(CountyAsmState::BallotManifestOk),
            "CVRS_IMPORTING" => Ok(CountyAsmState::CvrsImporting),
            "CVRS_OK" => Ok(CountyAsmState::CvrsOk),
            "BALLOT_MANIFEST_OK_AND_CVRS_IMPORTING" => {
                Ok(CountyAsmState::BallotManifestOkAndCvrsImporting)
            }
            "BALLOT_MANIFEST_AND_CVRS_OK" => Ok(CountyAsmState::BallotManifestAndCvrsOk),
            "COUNTY_AUDIT_UNDERWAY" => Ok(CountyAsmState::CountyAuditUnderway),
            "COUNTY_AUDIT_COMPLETE" => Ok(CountyAsmState::CountyAuditComplete),
            "DEADLINE_MISSED" => Ok(CountyAsmState::DeadlineMissed),
            _ => Err(AuditError::UnknownCountyState(s.to_string())),
        }
    }
}

/// The position of a county's audit board in the server-side state machine.
///
/// The `NoAuditBoard` variants are emitted by the server when a round is
/// open but no board has signed in yet.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum AuditBoardAsmState {
    AuditInitialState,
    WaitingForRoundStart,
    WaitingForRoundStartNoAuditBoard,
    RoundInProgress,
    RoundInProgressNoAuditBoard,
    WaitingForRoundSignOff,
    WaitingForRoundSignOffNoAuditBoard,
    AuditComplete,
    UnableToAudit,
    AuditAborted,
}

impl AuditBoardAsmState {
    pub const ALL: [AuditBoardAsmState; 10] = [
        AuditBoardAsmState::AuditInitialState,
        AuditBoardAsmState::WaitingForRoundStart,
        AuditBoardAsmState::WaitingForRoundStartNoAuditBoard,
        AuditBoardAsmState::RoundInProgress,
        AuditBoardAsmState::RoundInProgressNoAuditBoard,
        AuditBoardAsmState::WaitingForRoundSignOff,
        AuditBoardAsmState::WaitingForRoundSignOffNoAuditBoard,
        AuditBoardAsmState::AuditComplete,
        AuditBoardAsmState::UnableToAudit,
        AuditBoardAsmState::AuditAborted,
    ];

    /// Parses the wire representation used by the server.
    pub fn from_wire(s: &str) -> Result<AuditBoardAsmState, AuditError> {
        match s {
            "AUDIT_INITIAL_STATE" => Ok(AuditBoardAsmState::AuditInitialState),
            "WAITING_FOR_ROUND_START" => Ok(AuditBoardAsmState::WaitingForRoundStart),
            "WAITING_FOR_ROUND_START_NO_AUDIT_BOARD" => {
                Ok(AuditBoardAsmState::WaitingForRoundStartNoAuditBoard)
            }
            "ROUND_IN_PROGRESS" => Ok(AuditBoardAsmState::RoundInProgress),
            "ROUND_IN_PROGRESS_NO_AUDIT_BOARD" => {
                Ok(AuditBoardAsmState::RoundInProgressNoAuditBoard)
            }
            "WAITING_FOR_ROUND_SIGN_OFF" => Ok(AuditBoardAsmState::WaitingForRoundSignOff),
            "WAITING_FOR_ROUND_SIGN_OFF_NO_AUDIT_BOARD" => {
                Ok(AuditBoardAsmState::WaitingForRoundSignOffNoAuditBoard)
            }
            "AUDIT_COMPLETE" => Ok(AuditBoardAsmState::AuditComplete),
            "UNABLE_TO_AUDIT" => Ok(AuditBoardAsmState::UnableToAudit),
            "AUDIT_ABORTED" => Ok(AuditBoardAsmState::AuditAborted),
            _ => Err(AuditError::UnknownAuditBoardState(s.to_string())),
        }
    }
}

/// The outcome of a file upload (ballot manifest or CVR export), as
/// reported by the server.
///
/// The server uses `success: false` both for "failed" and for "not yet
/// known": a pending import has no error message, a failed one does. The
/// presence of `error_message` is the only reliable discriminator.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct UploadResult {
    pub success: bool,
    pub imported_count: Option<u64>,
    pub error_message: Option<String>,
    pub error_row_num: Option<u64>,
    pub error_row_content: Option<String>,
}

/// One member of an audit board.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AuditBoardMember {
    pub first_name: String,
    pub last_name: String,
    pub political_party: String,
}

/// A signed-in audit board.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AuditBoard {
    pub members: Vec<AuditBoardMember>,
    pub sign_in_time: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct DiscrepancyCount {
    pub audited: u64,
    pub unaudited: u64,
}

/// A snapshot of one county's audit progress, as delivered by the
/// dashboard polling endpoint. Owned and mutated entirely by the server;
/// the client treats it as an immutable read.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CountyStatus {
    pub id: u64,
    pub asm_state: CountyAsmState,
    pub audit_board_asm_state: AuditBoardAsmState,
    pub audit_board_count: Option<u32>,
    pub audit_boards: Vec<AuditBoard>,
    pub ballot_manifest: Option<UploadResult>,
    pub cvr_export: Option<UploadResult>,
    pub audited_ballot_count: u64,
    pub ballots_remaining_in_round: u64,
    pub estimated_ballots_to_audit: i64,
    pub disagreement_count: u64,
    pub discrepancy_count: DiscrepancyCount,
}

impl CountyStatus {
    /// A snapshot with nothing uploaded and no boards, in the given states.
    /// Counters start at zero.
    pub fn bare(
        id: u64,
        asm_state: CountyAsmState,
        audit_board_asm_state: AuditBoardAsmState,
    ) -> CountyStatus {
        CountyStatus {
            id,
            asm_state,
            audit_board_asm_state,
            audit_board_count: None,
            audit_boards: Vec::new(),
            ballot_manifest: None,
            cvr_export: None,
            audited_ballot_count: 0,
            ballots_remaining_in_round: 0,
            estimated_ballots_to_audit: 0,
            disagreement_count: 0,
            discrepancy_count: DiscrepancyCount::default(),
        }
    }

    /// True when a non-zero board count has been chosen for this county.
    ///
    /// A count of zero is treated as unset, matching the dashboard
    /// behavior that only distinguishes "a board count was picked".
    pub fn board_count_set(&self) -> bool {
        self.audit_board_count.map_or(false, |n| n > 0)
    }
}

/// Errors raised when validating data received from the server.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AuditError {
    UnknownCountyState(String),
    UnknownAuditBoardState(String),
    /// Two ballot sequence assignments claim the same ballots.
    AssignmentOverlap(u32),
    /// A gap between consecutive ballot sequence assignments, or the
    /// assignments do not cover the whole round.
    AssignmentGap(u32),
    InvalidTransitionTable(String),
}

impl Error for AuditError {}

impl Display for AuditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditError::UnknownCountyState(s) => write!(f, "unknown county ASM state {:?}", s),
            AuditError::UnknownAuditBoardState(s) => {
                write!(f, "unknown audit board ASM state {:?}", s)
            }
            AuditError::AssignmentOverlap(idx) => {
                write!(f, "ballot sequence assignment overlap at board {}", idx)
            }
            AuditError::AssignmentGap(idx) => {
                write!(f, "ballot sequence assignment gap at board {}", idx)
            }
            AuditError::InvalidTransitionTable(msg) => {
                write!(f, "invalid wizard transition table: {}", msg)
            }
        }
    }
}
