use crate::loader::LoadOptions;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "data_tdb.xlsx";
pub const LOG_ENV: &str = "GRADEBOARD_LOG";

/// Grade dashboard engine. Without `--snapshot` it serves line-delimited JSON
/// requests on stdin and answers on stdout; logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "gradeboard", version)]
pub struct Cli {
    /// Grade spreadsheet (.xlsx, or delimited text) with Nom, Prenom, Matière, Note and UE columns.
    #[arg(env = "GRADEBOARD_DATA", default_value = DEFAULT_DATA_PATH)]
    pub path: PathBuf,

    /// CSV field delimiter. Sniffed from the header line when omitted.
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Print the dashboard for one student ("First Last") as JSON and exit.
    #[arg(long, value_name = "NAME")]
    pub snapshot: Option<String>,

    /// Restrict the snapshot's subject comparison to one unit.
    #[arg(long, value_name = "UE", requires = "snapshot")]
    pub unit: Option<String>,
}

impl Cli {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            delimiter: self.delimiter,
        }
    }
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(format!("delimiter must be a single ASCII character, got {:?}", s)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_the_dashboard_workbook() {
        let cli = Cli::try_parse_from(["gradeboard"]).expect("parse");
        if std::env::var_os("GRADEBOARD_DATA").is_none() {
            assert_eq!(cli.path, PathBuf::from(DEFAULT_DATA_PATH));
        }
        assert!(cli.snapshot.is_none());
        assert!(cli.load_options().delimiter.is_none());
    }

    #[test]
    fn snapshot_flags() {
        let cli = Cli::try_parse_from([
            "gradeboard",
            "notes.csv",
            "--delimiter",
            ";",
            "--snapshot",
            "Jean Dupont",
            "--unit",
            "UE1",
        ])
        .expect("parse");
        assert_eq!(cli.path, PathBuf::from("notes.csv"));
        assert_eq!(cli.delimiter, Some(b';'));
        assert_eq!(cli.snapshot.as_deref(), Some("Jean Dupont"));
        assert_eq!(cli.unit.as_deref(), Some("UE1"));
    }

    #[test]
    fn unit_requires_snapshot() {
        assert!(Cli::try_parse_from(["gradeboard", "--unit", "UE1"]).is_err());
    }

    #[test]
    fn delimiter_parsing() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("|"), Ok(b'|'));
        assert!(parse_delimiter(";;").is_err());
        assert!(parse_delimiter("é").is_err());
    }
}
