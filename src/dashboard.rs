use log::{debug, info, warn};

use audit_core::*;
use snafu::{prelude::*, Snafu};

use std::cmp::Ordering;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::dashboard::snapshot_reader::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ReportError {
    #[snafu(display("Error opening snapshot {path}"))]
    OpeningSnapshot {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display(""))]
    InvalidSnapshot { source: audit_core::AuditError },
    #[snafu(display("Unknown sort column {column}"))]
    UnknownSortColumn { column: String },
    #[snafu(display("Unknown sort order {order}"))]
    UnknownSortOrder { order: String },
    #[snafu(display("Error writing summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ReportResult<T> = Result<T, ReportError>;

pub mod snapshot_reader {
    use crate::dashboard::*;
    use std::collections::BTreeMap;

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct MemberJson {
        pub first_name: String,
        pub last_name: String,
        pub political_party: String,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct AuditBoardJson {
        pub members: Vec<MemberJson>,
        pub sign_in_time: String,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct UploadResultJson {
        pub success: bool,
        #[serde(rename = "importedCount")]
        pub imported_count: Option<u64>,
        #[serde(rename = "errorMessage")]
        pub error_message: Option<String>,
        #[serde(rename = "errorRowNum")]
        pub error_row_num: Option<u64>,
        #[serde(rename = "errorRowContent")]
        pub error_row_content: Option<String>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct UploadedFileJson {
        #[serde(rename = "fileName")]
        pub file_name: Option<String>,
        pub result: Option<UploadResultJson>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct DiscrepancyCountJson {
        pub audited: Option<u64>,
        pub unaudited: Option<u64>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct CountyStatusJson {
        pub id: u64,
        pub name: Option<String>,
        pub asm_state: String,
        pub audit_board_asm_state: String,
        pub audit_board_count: Option<u32>,
        // Indexed object on the wire, keyed by the board index.
        #[serde(default)]
        pub audit_boards: BTreeMap<String, AuditBoardJson>,
        pub ballot_manifest: Option<UploadedFileJson>,
        pub cvr_export: Option<UploadedFileJson>,
        pub audited_ballot_count: Option<u64>,
        pub ballots_remaining_in_round: Option<u64>,
        pub estimated_ballots_to_audit: Option<i64>,
        pub disagreement_count: Option<u64>,
        pub discrepancy_count: Option<DiscrepancyCountJson>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct SnapshotJson {
        /// The Department of State ASM state at snapshot time.
        pub asm_state: String,
        pub county_status: Vec<CountyStatusJson>,
    }

    pub fn read_snapshot(path: String) -> ReportResult<SnapshotJson> {
        let contents =
            fs::read_to_string(path.clone()).context(OpeningSnapshotSnafu { path })?;
        debug!("read snapshot: {:?}", contents);
        let js: SnapshotJson =
            serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
        Ok(js)
    }

    pub fn read_summary(path: String) -> ReportResult<JSValue> {
        let contents =
            fs::read_to_string(path.clone()).context(OpeningSnapshotSnafu { path })?;
        let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
        Ok(js)
    }

    fn upload_result(file: &Option<UploadedFileJson>) -> Option<UploadResult> {
        file.as_ref()?.result.as_ref().map(|r| UploadResult {
            success: r.success,
            imported_count: r.imported_count,
            error_message: r.error_message.clone(),
            error_row_num: r.error_row_num,
            error_row_content: r.error_row_content.clone(),
        })
    }

    /// Validates one county entry of the snapshot into the core model.
    pub fn county_status(j: &CountyStatusJson) -> ReportResult<CountyStatus> {
        let asm_state =
            CountyAsmState::from_wire(j.asm_state.as_str()).context(InvalidSnapshotSnafu {})?;
        let audit_board_asm_state = AuditBoardAsmState::from_wire(j.audit_board_asm_state.as_str())
            .context(InvalidSnapshotSnafu {})?;

        let mut indexed_boards: Vec<(u32, &AuditBoardJson)> = Vec::new();
        for (key, board) in j.audit_boards.iter() {
            match key.parse::<u32>() {
                Ok(idx) => indexed_boards.push((idx, board)),
                Err(_) => {
                    whatever!("audit board index {:?} is not a number", key)
                }
            }
        }
        indexed_boards.sort_by_key(|(idx, _)| *idx);
        let audit_boards: Vec<AuditBoard> = indexed_boards
            .iter()
            .map(|(_, b)| AuditBoard {
                members: b
                    .members
                    .iter()
                    .map(|m| AuditBoardMember {
                        first_name: m.first_name.clone(),
                        last_name: m.last_name.clone(),
                        political_party: m.political_party.clone(),
                    })
                    .collect(),
                sign_in_time: b.sign_in_time.clone(),
            })
            .collect();

        let discrepancy_count = j
            .discrepancy_count
            .as_ref()
            .map(|d| DiscrepancyCount {
                audited: d.audited.unwrap_or(0),
                unaudited: d.unaudited.unwrap_or(0),
            })
            .unwrap_or_default();

        Ok(CountyStatus {
            id: j.id,
            asm_state,
            audit_board_asm_state,
            audit_board_count: j.audit_board_count,
            audit_boards,
            ballot_manifest: upload_result(&j.ballot_manifest),
            cvr_export: upload_result(&j.cvr_export),
            audited_ballot_count: j.audited_ballot_count.unwrap_or(0),
            ballots_remaining_in_round: j.ballots_remaining_in_round.unwrap_or(0),
            estimated_ballots_to_audit: j.estimated_ballots_to_audit.unwrap_or(0),
            disagreement_count: j.disagreement_count.unwrap_or(0),
            discrepancy_count,
        })
    }
}

/// The state-wide audit has started once the Department of State machine
/// has moved past the setup phase.
pub fn audit_started(dos_asm_state: &str) -> bool {
    matches!(
        dos_asm_state,
        "DOS_AUDIT_ONGOING" | "DOS_ROUND_COMPLETE" | "DOS_AUDIT_COMPLETE" | "AUDIT_RESULTS_PUBLISHED"
    )
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SortColumn {
    Name,
    Status,
    Submitted,
    AuditedDisc,
    OppDisc,
    Disagreements,
    RemRound,
    RemTotal,
}

impl SortColumn {
    pub fn from_arg(s: &str) -> ReportResult<SortColumn> {
        match s {
            "name" => Ok(SortColumn::Name),
            "status" => Ok(SortColumn::Status),
            "submitted" => Ok(SortColumn::Submitted),
            "audited-disc" => Ok(SortColumn::AuditedDisc),
            "opp-disc" => Ok(SortColumn::OppDisc),
            "disagreements" => Ok(SortColumn::Disagreements),
            "rem-round" => Ok(SortColumn::RemRound),
            "rem-total" => Ok(SortColumn::RemTotal),
            _ => UnknownSortColumnSnafu { column: s }.fail(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_arg(s: &str) -> ReportResult<SortOrder> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => UnknownSortOrderSnafu { order: s }.fail(),
        }
    }
}

/// A cell of the county table. Counties with nothing to report yet show
/// the placeholder dash in every numeric column.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ColumnValue {
    Placeholder,
    Number(i64),
    Text(String),
}

impl ColumnValue {
    fn is_placeholder(&self) -> bool {
        matches!(self, ColumnValue::Placeholder)
    }

    fn to_json(&self) -> JSValue {
        match self {
            ColumnValue::Placeholder => json!("—"),
            ColumnValue::Number(n) => json!(n),
            ColumnValue::Text(s) => json!(s),
        }
    }

    fn natural_cmp(&self, other: &ColumnValue) -> Ordering {
        match (self, other) {
            (ColumnValue::Placeholder, ColumnValue::Placeholder) => Ordering::Equal,
            (ColumnValue::Placeholder, _) => Ordering::Less,
            (_, ColumnValue::Placeholder) => Ordering::Greater,
            (ColumnValue::Number(a), ColumnValue::Number(b)) => a.cmp(b),
            (ColumnValue::Number(_), ColumnValue::Text(_)) => Ordering::Less,
            (ColumnValue::Text(_), ColumnValue::Number(_)) => Ordering::Greater,
            (ColumnValue::Text(a), ColumnValue::Text(b)) => natural_cmp(a, b),
        }
    }
}

/// Compares strings the way a person reads them: runs of digits compare
/// by numeric value, so "board 2" sorts before "board 11".
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    fn read_number(it: &mut std::iter::Peekable<std::str::Chars>) -> u64 {
        let mut n: u64 = 0;
        while let Some(d) = it.peek().and_then(|c| c.to_digit(10)) {
            n = n.saturating_mul(10).saturating_add(d as u64);
            it.next();
        }
        n
    }

    let mut ac = a.chars().peekable();
    let mut bc = b.chars().peekable();
    loop {
        match (ac.peek().copied(), bc.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let xn = read_number(&mut ac);
                let yn = read_number(&mut bc);
                match xn.cmp(&yn) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            (Some(x), Some(y)) => match x.cmp(&y) {
                Ordering::Equal => {
                    ac.next();
                    bc.next();
                }
                other => return other,
            },
        }
    }
}

/// One row of the county updates table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RowData {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub status_indicator: String,
    pub submitted: ColumnValue,
    pub audited_disc: ColumnValue,
    pub opp_disc: ColumnValue,
    pub disagreements: ColumnValue,
    pub rem_round: ColumnValue,
    pub rem_total: ColumnValue,
}

impl RowData {
    fn column(&self, col: SortColumn) -> ColumnValue {
        match col {
            SortColumn::Name => ColumnValue::Text(self.name.clone()),
            SortColumn::Status => ColumnValue::Text(self.status.clone()),
            SortColumn::Submitted => self.submitted.clone(),
            SortColumn::AuditedDisc => self.audited_disc.clone(),
            SortColumn::OppDisc => self.opp_disc.clone(),
            SortColumn::Disagreements => self.disagreements.clone(),
            SortColumn::RemRound => self.rem_round.clone(),
            SortColumn::RemTotal => self.rem_total.clone(),
        }
    }
}

pub fn build_row(county: &CountyStatus, name: String, started: bool) -> RowData {
    let status = county_and_board_label(county).to_string();
    let indicator = status_indicator(county).to_string();
    let missed_deadline = county.asm_state == CountyAsmState::DeadlineMissed;

    // Counties that missed the upload deadline are not participating;
    // before the audit starts nobody has numbers to show.
    if !started || missed_deadline {
        return RowData {
            id: county.id,
            name,
            status,
            status_indicator: indicator,
            submitted: ColumnValue::Placeholder,
            audited_disc: ColumnValue::Placeholder,
            opp_disc: ColumnValue::Placeholder,
            disagreements: ColumnValue::Placeholder,
            rem_round: ColumnValue::Placeholder,
            rem_total: ColumnValue::Placeholder,
        };
    }

    RowData {
        id: county.id,
        name,
        status,
        status_indicator: indicator,
        submitted: ColumnValue::Number(county.audited_ballot_count as i64),
        audited_disc: ColumnValue::Number(county.discrepancy_count.audited as i64),
        opp_disc: ColumnValue::Number(county.discrepancy_count.unaudited as i64),
        disagreements: ColumnValue::Number(county.disagreement_count as i64),
        rem_round: ColumnValue::Number(county.ballots_remaining_in_round as i64),
        rem_total: ColumnValue::Number(county.estimated_ballots_to_audit.max(0)),
    }
}

/// Sorts the table. Placeholder rows sort below all participating rows
/// in either order; ties are broken by county name, ascending.
pub fn sort_rows(rows: &mut [RowData], sort: SortColumn, order: SortOrder) {
    rows.sort_by(|a, b| {
        let av = a.column(sort);
        let bv = b.column(sort);
        let primary = match (av.is_placeholder(), bv.is_placeholder()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let o = av.natural_cmp(&bv);
                match order {
                    SortOrder::Asc => o,
                    SortOrder::Desc => o.reverse(),
                }
            }
        };
        primary.then_with(|| natural_cmp(a.name.as_str(), b.name.as_str()))
    });
}

fn row_to_json(row: &RowData) -> JSValue {
    json!({
        "id": row.id,
        "name": row.name,
        "status": row.status,
        "statusIndicator": row.status_indicator,
        "auditedDisc": row.audited_disc.to_json(),
        "oppDisc": row.opp_disc.to_json(),
        "disagreements": row.disagreements.to_json(),
        "submitted": row.submitted.to_json(),
        "remRound": row.rem_round.to_json(),
        "remTotal": row.rem_total.to_json(),
    })
}

fn build_summary_js(started: bool, rows: &[RowData]) -> JSValue {
    let county_rows: Vec<JSValue> = rows.iter().map(row_to_json).collect();
    json!({
        "auditStarted": started,
        "counties": county_rows,
    })
}

pub fn run_report(args: &Args) -> ReportResult<()> {
    let status_path = match args.status.clone() {
        Some(p) => p,
        None => {
            whatever!("no county status snapshot specified, use --status")
        }
    };
    let snapshot = read_snapshot(status_path)?;
    info!(
        "snapshot: DOS state {:?}, {} counties",
        snapshot.asm_state,
        snapshot.county_status.len()
    );

    let started = audit_started(snapshot.asm_state.as_str());
    let sort = match args.sort.as_deref() {
        Some(s) => SortColumn::from_arg(s)?,
        None => SortColumn::Name,
    };
    let order = match args.order.as_deref() {
        Some(s) => SortOrder::from_arg(s)?,
        None => SortOrder::Asc,
    };

    let mut rows: Vec<RowData> = Vec::new();
    for cj in snapshot.county_status.iter() {
        let county = county_status(cj)?;
        let name = cj
            .name
            .clone()
            .unwrap_or_else(|| format!("County {}", cj.id));
        rows.push(build_row(&county, name, started));
    }
    sort_rows(&mut rows, sort, order);

    let summary = build_summary_js(started, &rows);
    let pretty = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;
    match args.out.as_deref() {
        None | Some("stdout") => println!("{}", pretty),
        Some(path) => fs::write(path, &pretty).context(WritingSummarySnafu { path })?,
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = args.reference.clone() {
        let reference = read_summary(reference_path)?;
        let pretty_reference =
            serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
        if pretty_reference != pretty {
            warn!("Found differences with the reference summary");
            print_diff(pretty_reference.as_str(), pretty.as_ref(), "\n");
            whatever!("Difference detected between generated summary and reference summary")
        }
    }

    Ok(())
}
