//! Ballots (CVRs), audit board interpretations and ballot sequence
//! assignments.

use std::fmt;

use crate::model::AuditError;

/// Newtype for the server-side CVR identifier, to avoid mixing it up
/// with other numeric ids.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct CvrId(pub u64);

impl fmt::Display for CvrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for a contest identifier.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct ContestId(pub u64);

impl fmt::Display for ContestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the audit board reached consensus on a contest.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Consensus {
    Yes,
    No,
}

impl Consensus {
    /// The wire representation expected by the server.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Consensus::Yes => "YES",
            Consensus::No => "NO",
        }
    }
}

/// The marks recorded for a single contest on a ballot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ContestMarks {
    pub choices: Vec<String>,
    pub consensus: Consensus,
    pub comment: String,
}

/// The interpretation an audit board enters for one ballot.
///
/// Created fresh each time a ballot is opened for audit; cleared on
/// successful submission or navigation away from the audit stage.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BallotInterpretation {
    pub cvr_id: CvrId,
    pub audit_board_index: u32,
    pub re_audit: bool,
    pub comment: String,
    /// In contest order, as presented on the ballot.
    pub marks: Vec<(ContestId, ContestMarks)>,
}

/// A cast vote record: the unit of audit work. Created server-side at
/// CVR import time and read-only from the client's perspective, except
/// for the interpretation it collects.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Cvr {
    pub id: CvrId,
    pub county_id: u64,
    pub cvr_number: u64,
    pub storage_location: String,
    pub scanner_id: u64,
    pub batch_id: u64,
    pub record_id: u64,
    pub imprinted_id: String,
    pub ballot_type: String,
    pub previously_audited: bool,
    /// The prior interpretation, present when re-auditing.
    pub prior_interpretation: Option<BallotInterpretation>,
}

/// A builder for assembling a ballot interpretation contest by contest.
///
/// ```
/// use audit_core::ballot::{Consensus, ContestId, CvrId, InterpretationBuilder};
///
/// let mut builder = InterpretationBuilder::new(CvrId(201), 0);
/// builder.contest(ContestId(7), &["Alice".to_string()], Consensus::Yes, "");
/// let interpretation = builder.build();
/// assert_eq!(interpretation.marks.len(), 1);
/// ```
pub struct InterpretationBuilder {
    cvr_id: CvrId,
    audit_board_index: u32,
    re_audit: bool,
    comment: String,
    marks: Vec<(ContestId, ContestMarks)>,
}

impl InterpretationBuilder {
    pub fn new(cvr_id: CvrId, audit_board_index: u32) -> InterpretationBuilder {
        InterpretationBuilder {
            cvr_id,
            audit_board_index,
            re_audit: false,
            comment: String::new(),
            marks: Vec::new(),
        }
    }

    /// Marks this interpretation as a re-audit of a previously audited
    /// ballot, with the mandatory explanation.
    pub fn re_audit(mut self, comment: &str) -> InterpretationBuilder {
        self.re_audit = true;
        self.comment = comment.to_string();
        self
    }

    /// Records the marks for one contest. Recording the same contest
    /// again replaces the earlier entry, as the review stage allows the
    /// board to go back and change its answer.
    pub fn contest(
        &mut self,
        contest: ContestId,
        choices: &[String],
        consensus: Consensus,
        comment: &str,
    ) {
        let marks = ContestMarks {
            choices: choices.to_vec(),
            consensus,
            comment: comment.to_string(),
        };
        if let Some(entry) = self.marks.iter_mut().find(|(cid, _)| *cid == contest) {
            entry.1 = marks;
        } else {
            self.marks.push((contest, marks));
        }
    }

    pub fn build(self) -> BallotInterpretation {
        BallotInterpretation {
            cvr_id: self.cvr_id,
            audit_board_index: self.audit_board_index,
            re_audit: self.re_audit,
            comment: self.comment,
            marks: self.marks,
        }
    }
}

/// How many ballots, and which ones, are assigned to a given audit board
/// index within a round. The assignments for a round partition the
/// round's ballot sequence without overlap or gap.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct AuditBoardAssignment {
    pub audit_board_index: u32,
    pub start_index: u32,
    pub count: u32,
}

/// The number of ballots assigned to the given board, or `None` when the
/// board index is not covered by the assignments.
///
/// Assignments are indexed positionally: the entry for board `i` is the
/// `i`-th element of the slice.
pub fn total_ballots_for_board(
    assignments: &[AuditBoardAssignment],
    board_index: u32,
) -> Option<u32> {
    assignments.get(board_index as usize).map(|a| a.count)
}

/// Checks that the assignments partition a round of `round_len` ballots:
/// contiguous, non-overlapping, and covering the whole sequence.
pub fn check_partition(
    assignments: &[AuditBoardAssignment],
    round_len: u32,
) -> Result<(), AuditError> {
    let mut next_start: u32 = 0;
    for a in assignments.iter() {
        if a.start_index < next_start {
            return Err(AuditError::AssignmentOverlap(a.audit_board_index));
        }
        if a.start_index > next_start {
            return Err(AuditError::AssignmentGap(a.audit_board_index));
        }
        next_start += a.count;
    }
    if next_start != round_len {
        let last = assignments.last().map(|a| a.audit_board_index).unwrap_or(0);
        return Err(AuditError::AssignmentGap(last));
    }
    Ok(())
}
