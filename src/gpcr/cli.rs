use getopts::{Matches, Options};
use itertools::Itertools;
use tracing_subscriber::EnvFilter;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{GpcrError, Result};
use crate::export::Delimiter;

pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Log to stderr, keeping stdout for results.  RUST_LOG overrides the
// default level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("gpcr=warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// the options every program accepts
pub fn common_options() -> Options {
    let mut opts = Options::new();

    opts.optflag("h", "help", "print this help message");
    opts.optopt("c", "config", "JSON configuration file", "FILE");
    opts.optopt("", "catalog", "receptor catalog, overrides the configuration", "FILE");
    opts.optopt("", "alignment-dir",
                "directory of the per-class human alignments, overrides the configuration",
                "DIR");

    opts
}

pub fn add_delimiter_option(opts: &mut Options) {
    opts.optopt("", "delimiter", "table delimiter: comma or tab (default tab)", "DELIM");
}

pub fn print_usage(program: &str, opts: &Options, brief_args: &str) {
    let brief = format!("Usage: {} [options] {}", program, brief_args);
    print!("{}", opts.usage(&brief));
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub config: Config,
    pub catalog_file: String,
    pub alignment_dir: String,
}

impl Settings {
    pub fn from_matches(matches: &Matches) -> Result<Settings> {
        let config =
            match matches.opt_str("config") {
                Some(config_file_name) => Config::read(&config_file_name)?,
                None => Config::default(),
            };

        let catalog_file = matches.opt_str("catalog")
            .unwrap_or_else(|| config.catalog_file.to_string());
        let alignment_dir = matches.opt_str("alignment-dir")
            .unwrap_or_else(|| config.alignment_dir.to_string());

        Ok(Settings {
            config,
            catalog_file,
            alignment_dir,
        })
    }

    pub fn read_catalog(&self) -> Result<Catalog> {
        Catalog::read(&self.catalog_file)
    }
}

pub fn delimiter_from_matches(matches: &Matches) -> std::result::Result<Delimiter, String> {
    match matches.opt_str("delimiter") {
        Some(delimiter) => delimiter.parse(),
        None => Ok(Delimiter::Tab),
    }
}

// split a comma separated list of names, eg. "HTR1A, HTR1B"
pub fn split_names(arg: &str) -> Vec<&str> {
    arg.split(',')
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .collect()
}

// For an unknown receptor, list the catalog names that start with what
// was typed, eg. "HTR1" -> "HTR1A, HTR1B".  Other errors pass through.
pub fn add_receptor_hint(catalog: &Catalog, err: GpcrError) -> anyhow::Error {
    if let GpcrError::ReceptorNotFound(ref name) = err {
        let candidates = catalog.names_with_prefix(name);

        if !candidates.is_empty() {
            return anyhow::anyhow!("{}, did you mean: {}", err, candidates.iter().join(", "));
        }
    }

    err.into()
}

#[test]
fn test_settings_from_matches() {
    let mut opts = common_options();
    add_delimiter_option(&mut opts);

    let matches = opts.parse(["--alignment-dir", "msa", "HTR1A"]).unwrap();
    let settings = Settings::from_matches(&matches).unwrap();

    assert_eq!(settings.alignment_dir, "msa");
    assert_eq!(settings.catalog_file, "receptors.json");
    assert_eq!(settings.config.default_threshold, 50.0);
    assert_eq!(matches.free, vec!["HTR1A"]);
    assert_eq!(delimiter_from_matches(&matches).unwrap(), Delimiter::Tab);

    let matches = opts.parse(["--delimiter", "comma", "-c", "/nonexistent/config.json"]).unwrap();
    assert_eq!(delimiter_from_matches(&matches).unwrap(), Delimiter::Comma);
    assert!(Settings::from_matches(&matches).is_err());
}

#[test]
fn test_split_names() {
    assert_eq!(split_names("HTR1A, HTR1B,,ADRB2 "), vec!["HTR1A", "HTR1B", "ADRB2"]);
    assert!(split_names(" , ").is_empty());
}

#[test]
fn test_add_receptor_hint() {
    let catalog = Catalog::from_json(r#"[
      {"geneName": "HTR1A", "class": "A", "alignment": "a.fasta", "conservationFile": "a.txt"},
      {"geneName": "HTR1B", "class": "A", "alignment": "b.fasta", "conservationFile": "b.txt"},
      {"geneName": "ADRB2", "class": "A", "alignment": "c.fasta", "conservationFile": "c.txt"}
    ]"#).unwrap();

    let hinted = add_receptor_hint(&catalog, GpcrError::ReceptorNotFound("htr1".to_owned()));
    assert_eq!(hinted.to_string(), "receptor not found: htr1, did you mean: HTR1A, HTR1B");

    let plain = add_receptor_hint(&catalog, GpcrError::ReceptorNotFound("XYZ".to_owned()));
    assert_eq!(plain.to_string(), "receptor not found: XYZ");

    let other = add_receptor_hint(&catalog, GpcrError::NoSequences);
    assert!(matches!(other.downcast_ref::<GpcrError>(), Some(GpcrError::NoSequences)));
}
