mod model;
pub mod ballot;
pub mod manual;
pub mod wizard;

use log::debug;

pub use crate::model::*;

// **** Status label derivation ****
//
// Maps the combination of county ASM state, audit board ASM state and
// file upload results reported by the server to the single line shown in
// the state dashboard's county table. All functions here are pure and
// total: server states we do not expect to see fall through to "—"
// rather than panicking.

/// The label for a county ASM state alone, used whenever no audit-board
/// or upload-specific rule applies.
pub fn county_state_label(state: CountyAsmState) -> &'static str {
    match state {
        CountyAsmState::CountyInitialState => "Not started",
        CountyAsmState::BallotManifestOk => "Ballot manifest imported",
        CountyAsmState::CvrsImporting => "Importing CVRs",
        CountyAsmState::CvrsOk => "CVRs imported",
        CountyAsmState::BallotManifestOkAndCvrsImporting => {
            "Ballot manifest imported, importing CVRs"
        }
        CountyAsmState::BallotManifestAndCvrsOk => "Ballot manifest and CVRs imported",
        CountyAsmState::CountyAuditUnderway => "Audit underway",
        CountyAsmState::CountyAuditComplete => "Audit complete",
        CountyAsmState::DeadlineMissed => "File upload deadline missed",
    }
}

// Either upload explicitly reported failure. A result that has not come
// back yet is also encoded with success == false, so this is "failed or
// pending", disambiguated below by the error message.
fn upload_reported_failure(status: &CountyStatus) -> bool {
    let failed = |r: &Option<UploadResult>| matches!(r, Some(r) if !r.success);
    failed(&status.ballot_manifest) || failed(&status.cvr_export)
}

fn upload_error_defined(status: &CountyStatus) -> bool {
    let has_error =
        |r: &Option<UploadResult>| matches!(r, Some(r) if r.error_message.is_some());
    has_error(&status.ballot_manifest) || has_error(&status.cvr_export)
}

// Here we are either really failed or pending: the error message is the
// only discriminator the server gives us.
fn file_upload_status_label(status: &CountyStatus) -> &'static str {
    if upload_error_defined(status) {
        "File upload failed"
    } else {
        "File upload in progress"
    }
}

/// The status line for a county row on the state dashboard, derived from
/// the county state, the audit board state and the upload results.
pub fn county_and_board_label(status: &CountyStatus) -> &'static str {
    debug!(
        "county_and_board_label: county {} in {:?}/{:?}",
        status.id, status.asm_state, status.audit_board_asm_state
    );

    match status.asm_state {
        CountyAsmState::CountyAuditComplete => match status.audit_board_asm_state {
            AuditBoardAsmState::WaitingForRoundSignOff => "Waiting for round start",
            _ => {
                if upload_reported_failure(status) {
                    file_upload_status_label(status)
                } else {
                    county_state_label(status.asm_state)
                }
            }
        },
        CountyAsmState::CountyAuditUnderway => match status.audit_board_asm_state {
            // Not reachable given the county state.
            AuditBoardAsmState::AuditInitialState => "—",
            AuditBoardAsmState::WaitingForRoundStart
            | AuditBoardAsmState::WaitingForRoundStartNoAuditBoard => {
                if status.board_count_set() {
                    "Audit board # is set"
                } else {
                    "Waiting for round start"
                }
            }
            AuditBoardAsmState::RoundInProgress
            | AuditBoardAsmState::RoundInProgressNoAuditBoard => {
                // Counterintuitive, but on rounds past the first the
                // server reports the round as in progress before any
                // board has signed in again.
                if !status.board_count_set() && status.audit_boards.is_empty() {
                    "Waiting for round start"
                } else if status.audit_boards.is_empty() {
                    "Audit board # is set"
                } else {
                    "Round in progress"
                }
            }
            AuditBoardAsmState::WaitingForRoundSignOff
            | AuditBoardAsmState::WaitingForRoundSignOffNoAuditBoard => {
                "Waiting for round sign-off"
            }
            // Not reachable given the county state.
            AuditBoardAsmState::AuditComplete => "Audit complete",
            // Not reachable given the county state.
            AuditBoardAsmState::UnableToAudit => "Unable to audit",
            // Not reachable given the county state.
            AuditBoardAsmState::AuditAborted => "—",
        },
        _ => {
            if upload_reported_failure(status) {
                file_upload_status_label(status)
            } else {
                county_state_label(status.asm_state)
            }
        }
    }
}

/// The CSS indicator class to display next to the status line, or the
/// empty string for no indicator.
///
/// Note the asymmetry with [`county_and_board_label`]: the label rule
/// keys off an explicit `success == false` while the indicator keys off
/// the presence of an error message. The two encodings are not
/// equivalent on the wire and are kept as observed.
pub fn status_indicator(status: &CountyStatus) -> &'static str {
    match status.asm_state {
        CountyAsmState::CountyAuditUnderway => match status.audit_board_asm_state {
            AuditBoardAsmState::RoundInProgress if !status.audit_boards.is_empty() => {
                "status-indicator-in-progress"
            }
            _ => "",
        },
        _ => {
            if upload_error_defined(status) {
                "status-indicator-error"
            } else {
                ""
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> AuditBoard {
        AuditBoard {
            members: vec![AuditBoardMember {
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                political_party: "Unaffiliated".to_string(),
            }],
            sign_in_time: "2019-06-17T09:00:00Z".to_string(),
        }
    }

    fn failed_upload(error_message: Option<&str>) -> UploadResult {
        UploadResult {
            success: false,
            error_message: error_message.map(|s| s.to_string()),
            ..UploadResult::default()
        }
    }

    #[test]
    fn resolver_is_total() {
        // Every (county, board) pair crossed with every upload shape
        // must produce a label, and the defaults never leak a panic.
        let uploads: [Option<UploadResult>; 4] = [
            None,
            Some(UploadResult {
                success: true,
                ..UploadResult::default()
            }),
            Some(failed_upload(None)),
            Some(failed_upload(Some("malformed CSV"))),
        ];
        for county in CountyAsmState::ALL {
            for board in AuditBoardAsmState::ALL {
                for manifest in uploads.iter() {
                    for export in uploads.iter() {
                        let mut status = CountyStatus::bare(1, county, board);
                        status.ballot_manifest = manifest.clone();
                        status.cvr_export = export.clone();
                        assert!(!county_and_board_label(&status).is_empty());
                        // The indicator may be empty but must resolve.
                        let _ = status_indicator(&status);
                    }
                }
            }
        }
    }

    #[test]
    fn underway_no_count_no_boards_waits_for_round_start() {
        let status = CountyStatus::bare(
            1,
            CountyAsmState::CountyAuditUnderway,
            AuditBoardAsmState::RoundInProgress,
        );
        assert_eq!(county_and_board_label(&status), "Waiting for round start");
        assert_eq!(status_indicator(&status), "");
    }

    #[test]
    fn underway_count_set_but_no_boards() {
        let mut status = CountyStatus::bare(
            1,
            CountyAsmState::CountyAuditUnderway,
            AuditBoardAsmState::RoundInProgress,
        );
        status.audit_board_count = Some(2);
        assert_eq!(county_and_board_label(&status), "Audit board # is set");
        assert_eq!(status_indicator(&status), "");
    }

    #[test]
    fn underway_signed_in_board_is_in_progress() {
        let mut status = CountyStatus::bare(
            1,
            CountyAsmState::CountyAuditUnderway,
            AuditBoardAsmState::RoundInProgress,
        );
        status.audit_board_count = Some(2);
        status.audit_boards = vec![board()];
        assert_eq!(county_and_board_label(&status), "Round in progress");
        assert_eq!(status_indicator(&status), "status-indicator-in-progress");
    }

    #[test]
    fn board_count_of_zero_counts_as_unset() {
        let mut status = CountyStatus::bare(
            1,
            CountyAsmState::CountyAuditUnderway,
            AuditBoardAsmState::WaitingForRoundStart,
        );
        status.audit_board_count = Some(0);
        assert_eq!(county_and_board_label(&status), "Waiting for round start");
    }

    #[test]
    fn no_board_round_variant_does_not_light_indicator() {
        let mut status = CountyStatus::bare(
            1,
            CountyAsmState::CountyAuditUnderway,
            AuditBoardAsmState::RoundInProgressNoAuditBoard,
        );
        status.audit_boards = vec![board()];
        assert_eq!(county_and_board_label(&status), "Round in progress");
        // Only the exact ROUND_IN_PROGRESS state lights the indicator.
        assert_eq!(status_indicator(&status), "");
    }

    #[test]
    fn complete_county_waiting_for_sign_off_reads_round_start() {
        let mut status = CountyStatus::bare(
            1,
            CountyAsmState::CountyAuditComplete,
            AuditBoardAsmState::WaitingForRoundSignOff,
        );
        // Upload contents must not matter on this branch.
        status.ballot_manifest = Some(failed_upload(Some("bad header row")));
        assert_eq!(county_and_board_label(&status), "Waiting for round start");
    }

    #[test]
    fn complete_county_with_failed_upload_reports_upload() {
        let mut status = CountyStatus::bare(
            1,
            CountyAsmState::CountyAuditComplete,
            AuditBoardAsmState::AuditComplete,
        );
        status.cvr_export = Some(failed_upload(Some("bad header row")));
        assert_eq!(county_and_board_label(&status), "File upload failed");

        status.cvr_export = Some(failed_upload(None));
        assert_eq!(county_and_board_label(&status), "File upload in progress");
    }

    #[test]
    fn importing_with_failed_manifest_reports_upload_failure() {
        let mut status = CountyStatus::bare(
            1,
            CountyAsmState::CvrsImporting,
            AuditBoardAsmState::AuditInitialState,
        );
        status.ballot_manifest = Some(failed_upload(Some("malformed CSV")));
        assert_eq!(county_and_board_label(&status), "File upload failed");
        assert_eq!(status_indicator(&status), "status-indicator-error");
    }

    #[test]
    fn pending_upload_reads_in_progress_without_error_indicator() {
        let mut status = CountyStatus::bare(
            1,
            CountyAsmState::CvrsImporting,
            AuditBoardAsmState::AuditInitialState,
        );
        status.ballot_manifest = Some(failed_upload(None));
        assert_eq!(county_and_board_label(&status), "File upload in progress");
        // No error message defined, so no error indicator either.
        assert_eq!(status_indicator(&status), "");
    }

    #[test]
    fn plain_county_labels() {
        let cases = [
            (CountyAsmState::CountyInitialState, "Not started"),
            (CountyAsmState::BallotManifestOk, "Ballot manifest imported"),
            (CountyAsmState::CvrsImporting, "Importing CVRs"),
            (CountyAsmState::CvrsOk, "CVRs imported"),
            (
                CountyAsmState::BallotManifestOkAndCvrsImporting,
                "Ballot manifest imported, importing CVRs",
            ),
            (
                CountyAsmState::BallotManifestAndCvrsOk,
                "Ballot manifest and CVRs imported",
            ),
            (CountyAsmState::DeadlineMissed, "File upload deadline missed"),
        ];
        for (state, expected) in cases {
            let status =
                CountyStatus::bare(1, state, AuditBoardAsmState::AuditInitialState);
            assert_eq!(county_and_board_label(&status), expected);
        }
    }

    #[test]
    fn underway_defensive_arms() {
        let cases = [
            (AuditBoardAsmState::AuditInitialState, "—"),
            (AuditBoardAsmState::AuditComplete, "Audit complete"),
            (AuditBoardAsmState::UnableToAudit, "Unable to audit"),
            (AuditBoardAsmState::AuditAborted, "—"),
            (
                AuditBoardAsmState::WaitingForRoundSignOffNoAuditBoard,
                "Waiting for round sign-off",
            ),
        ];
        for (board_state, expected) in cases {
            let status =
                CountyStatus::bare(1, CountyAsmState::CountyAuditUnderway, board_state);
            assert_eq!(county_and_board_label(&status), expected);
        }
    }

    #[test]
    fn wire_parsers_round_trip_known_values() {
        assert_eq!(
            CountyAsmState::from_wire("COUNTY_AUDIT_UNDERWAY"),
            Ok(CountyAsmState::CountyAuditUnderway)
        );
        assert_eq!(
            AuditBoardAsmState::from_wire("WAITING_FOR_ROUND_SIGN_OFF_NO_AUDIT_BOARD"),
            Ok(AuditBoardAsmState::WaitingForRoundSignOffNoAuditBoard)
        );
        assert_eq!(
            CountyAsmState::from_wire("NOT_A_STATE"),
            Err(AuditError::UnknownCountyState("NOT_A_STATE".to_string()))
        );
        assert_eq!(
            AuditBoardAsmState::from_wire(""),
            Err(AuditError::UnknownAuditBoardState("".to_string()))
        );
    }
}
