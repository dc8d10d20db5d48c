use clap::Parser;

/// This program builds faculty selection sheets from course schedule exports.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, may be repeated) A schedule export in Excel format (.xlsx or .xls).
    /// The files are processed in order. A file given twice is only reported once,
    /// with the result of its last processing.
    #[clap(short, long, value_parser)]
    pub input: Vec<String>,

    /// (file path, optional) A JSON rules file, to change the thresholds and course tables
    /// or to list the input files. See the manual of the course_bundles crate for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the processing will be written
    /// in JSON format to the given location. Setting this option overrides the path that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing a summary in JSON format. If provided, selsheet
    /// will check that the produced summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, the rows are first split by campus and a selection sheet is
    /// laid out for each campus.
    #[clap(long, takes_value = false)]
    pub campus_sort: bool,

    /// (default: the first worksheet) The name of the worksheet to read in each input file.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
