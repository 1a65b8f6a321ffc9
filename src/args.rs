use clap::Parser;

/// This is a status reporting tool for risk-limiting election audits.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The county status snapshot to report on, in the JSON format
    /// delivered by the dashboard polling endpoint.
    #[clap(short, long, value_parser)]
    pub status: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, rlastat will
    /// check that the generated summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the dashboard will
    /// be written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (default name) The column to sort the county table by: name, status,
    /// submitted, audited-disc, opp-disc, disagreements, rem-round or rem-total.
    #[clap(long, value_parser)]
    pub sort: Option<String>,

    /// (default asc) The sort order: asc or desc. Counties without numbers to
    /// report sort below all others in either order.
    #[clap(long, value_parser)]
    pub order: Option<String>,

    /// (file path) An audit board interpretation of one ballot. If specified,
    /// rlastat formats the upload-audit-cvr payload for it instead of producing
    /// a dashboard report.
    #[clap(long, value_parser)]
    pub acvr: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
