//! Writer for the audited-CVR payload accepted by the server's
//! `upload-audit-cvr` endpoint.
//!
//! The submission itself is one-way: the wizard fires it from the review
//! stage and moves on without waiting; the outcome is reconciled through
//! the next dashboard snapshot. `run_format` turns an interpretation file
//! into the exact payload that would be submitted, for inspection.

use audit_core::ballot::{BallotInterpretation, Consensus, ContestId, Cvr, CvrId,
    InterpretationBuilder};
use serde_json::json;
use serde_json::Value as JSValue;

use snafu::prelude::*;

use crate::dashboard::{OpeningSnapshotSnafu, ParsingJsonSnafu, ReportResult};

/// Serializes a completed interpretation of `cvr` into the wire payload.
pub fn format_acvr(interpretation: &BallotInterpretation, cvr: &Cvr) -> JSValue {
    let contest_info: Vec<JSValue> = interpretation
        .marks
        .iter()
        .map(|(contest, marks)| {
            json!({
                "contest": contest.0,
                "choices": marks.choices,
                "consensus": marks.consensus.as_wire(),
                "comment": marks.comment,
            })
        })
        .collect();

    json!({
        "cvr_id": cvr.id.0,
        "reaudit": interpretation.re_audit,
        "comment": interpretation.comment,
        "auditBoardIndex": interpretation.audit_board_index,
        "audit_cvr": {
            "id": cvr.id.0,
            "county_id": cvr.county_id,
            "cvr_number": cvr.cvr_number,
            "scanner_id": cvr.scanner_id,
            "batch_id": cvr.batch_id,
            "record_id": cvr.record_id,
            "imprinted_id": cvr.imprinted_id,
            "ballot_type": cvr.ballot_type,
            "storage_location": cvr.storage_location,
            "record_type": "AUDITOR_ENTERED",
            "contest_info": contest_info,
        },
    })
}

pub mod interpretation_reader {
    use crate::acvr::*;
    use serde::{Deserialize, Serialize};
    use std::fs;

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct CvrJson {
        pub id: u64,
        pub county_id: u64,
        pub cvr_number: u64,
        pub scanner_id: u64,
        pub batch_id: u64,
        pub record_id: u64,
        pub imprinted_id: String,
        pub ballot_type: String,
        pub storage_location: Option<String>,
        pub previously_audited: Option<bool>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct ContestInfoJson {
        pub contest: u64,
        pub choices: Vec<String>,
        pub consensus: String,
        pub comment: Option<String>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct InterpretationJson {
        pub cvr: CvrJson,
        pub audit_board_index: u32,
        pub reaudit: Option<bool>,
        pub comment: Option<String>,
        pub contest_info: Vec<ContestInfoJson>,
    }

    pub fn read_interpretation(path: String) -> ReportResult<InterpretationJson> {
        let contents =
            fs::read_to_string(path.clone()).context(OpeningSnapshotSnafu { path })?;
        let js: InterpretationJson =
            serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
        Ok(js)
    }

    pub fn validate(j: &InterpretationJson) -> ReportResult<(BallotInterpretation, Cvr)> {
        let cvr = Cvr {
            id: CvrId(j.cvr.id),
            county_id: j.cvr.county_id,
            cvr_number: j.cvr.cvr_number,
            storage_location: j.cvr.storage_location.clone().unwrap_or_default(),
            scanner_id: j.cvr.scanner_id,
            batch_id: j.cvr.batch_id,
            record_id: j.cvr.record_id,
            imprinted_id: j.cvr.imprinted_id.clone(),
            ballot_type: j.cvr.ballot_type.clone(),
            previously_audited: j.cvr.previously_audited.unwrap_or(false),
            prior_interpretation: None,
        };

        let mut builder = InterpretationBuilder::new(cvr.id, j.audit_board_index);
        if j.reaudit.unwrap_or(false) {
            builder = builder.re_audit(j.comment.as_deref().unwrap_or(""));
        }
        for info in j.contest_info.iter() {
            let consensus = match info.consensus.as_str() {
                "YES" => Consensus::Yes,
                "NO" => Consensus::No,
                x => {
                    whatever!("cannot understand consensus value {:?}", x)
                }
            };
            builder.contest(
                ContestId(info.contest),
                &info.choices,
                consensus,
                info.comment.as_deref().unwrap_or(""),
            );
        }
        Ok((builder.build(), cvr))
    }
}

/// Reads an interpretation file and prints the upload payload.
pub fn run_format(path: String) -> ReportResult<()> {
    let parsed = interpretation_reader::read_interpretation(path)?;
    let (interpretation, cvr) = interpretation_reader::validate(&parsed)?;
    let payload = format_acvr(&interpretation, &cvr);
    let pretty = serde_json::to_string_pretty(&payload).context(ParsingJsonSnafu {})?;
    println!("{}", pretty);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::interpretation_reader::*;
    use super::*;

    fn cvr() -> Cvr {
        Cvr {
            id: CvrId(4215),
            county_id: 7,
            cvr_number: 83,
            storage_location: "Shelf 3, Box 12".to_string(),
            scanner_id: 2,
            batch_id: 19,
            record_id: 41,
            imprinted_id: "2-19-41".to_string(),
            ballot_type: "Ballot 1 - Type 1".to_string(),
            previously_audited: false,
            prior_interpretation: None,
        }
    }

    #[test]
    fn payload_carries_cvr_identity_and_marks() {
        let mut builder = InterpretationBuilder::new(CvrId(4215), 1);
        builder.contest(
            ContestId(12),
            &["Alice".to_string(), "Bob".to_string()],
            Consensus::Yes,
            "",
        );
        builder.contest(ContestId(13), &[], Consensus::No, "board split 1-1");
        let interpretation = builder.build();

        let js = format_acvr(&interpretation, &cvr());

        assert_eq!(js["cvr_id"], json!(4215));
        assert_eq!(js["reaudit"], json!(false));
        assert_eq!(js["auditBoardIndex"], json!(1));
        assert_eq!(js["audit_cvr"]["record_type"], json!("AUDITOR_ENTERED"));
        assert_eq!(js["audit_cvr"]["imprinted_id"], json!("2-19-41"));

        let contests = js["audit_cvr"]["contest_info"].as_array().unwrap();
        assert_eq!(contests.len(), 2);
        assert_eq!(contests[0]["contest"], json!(12));
        assert_eq!(contests[0]["consensus"], json!("YES"));
        assert_eq!(contests[0]["choices"], json!(["Alice", "Bob"]));
        assert_eq!(contests[1]["consensus"], json!("NO"));
        assert_eq!(contests[1]["comment"], json!("board split 1-1"));
    }

    #[test]
    fn re_audit_payload_sets_flag_and_comment() {
        let interpretation = InterpretationBuilder::new(CvrId(4215), 0)
            .re_audit("original entry used the wrong ballot")
            .build();

        let js = format_acvr(&interpretation, &cvr());

        assert_eq!(js["reaudit"], json!(true));
        assert_eq!(js["comment"], json!("original entry used the wrong ballot"));
        assert_eq!(js["audit_cvr"]["contest_info"], json!([]));
    }

    #[test]
    fn interpretation_file_round_trips_to_payload() {
        let raw = r#"{
            "cvr": {
                "id": 4215,
                "county_id": 7,
                "cvr_number": 83,
                "scanner_id": 2,
                "batch_id": 19,
                "record_id": 41,
                "imprinted_id": "2-19-41",
                "ballot_type": "Ballot 1 - Type 1"
            },
            "audit_board_index": 0,
            "contest_info": [
                { "contest": 12, "choices": ["Alice"], "consensus": "YES" }
            ]
        }"#;
        let parsed: InterpretationJson = serde_json::from_str(raw).unwrap();
        let (interpretation, cvr) = validate(&parsed).unwrap();
        assert_eq!(interpretation.marks.len(), 1);
        assert!(!cvr.previously_audited);

        let js = format_acvr(&interpretation, &cvr);
        assert_eq!(js["audit_cvr"]["storage_location"], json!(""));
        assert_eq!(js["audit_cvr"]["contest_info"][0]["choices"], json!(["Alice"]));
    }

    #[test]
    fn unknown_consensus_is_rejected() {
        let raw = r#"{
            "cvr": {
                "id": 1, "county_id": 1, "cvr_number": 1, "scanner_id": 1,
                "batch_id": 1, "record_id": 1, "imprinted_id": "1-1-1",
                "ballot_type": "Ballot 1"
            },
            "audit_board_index": 0,
            "contest_info": [
                { "contest": 12, "choices": [], "consensus": "MAYBE" }
            ]
        }"#;
        let parsed: InterpretationJson = serde_json::from_str(raw).unwrap();
        assert!(validate(&parsed).is_err());
    }
}
