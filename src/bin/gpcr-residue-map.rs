use std::env;
use std::io;
use std::process;

use gpcr::analysis::residue_map::{filter_reference_residues, load_residue_map,
                                  parse_residue_numbers, residue_table};
use gpcr::cli::{add_delimiter_option, add_receptor_hint, common_options, delimiter_from_matches,
                init_logging, print_usage, split_names, Settings};
use gpcr::export::write_delimited;

const BRIEF_ARGS: &str = "REFERENCE TARGET[,TARGET...]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let mut opts = common_options();
    add_delimiter_option(&mut opts);

    opts.optopt("r", "residues",
                "only show these reference residue numbers, eg. 3,50,121", "N,N...");
    opts.optflag("", "conservation",
                 "include conservation data, and region and GPCRdb numbers of the reference");

    let program = args[0].clone();

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(e) => {
            print_usage(&program, &opts, BRIEF_ARGS);
            eprintln!("\nerror: {}", e);
            process::exit(1);
        }
    };

    if matches.opt_present("help") {
        print_usage(&program, &opts, BRIEF_ARGS);
        process::exit(0);
    }

    if matches.free.len() < 2 {
        eprintln!("needs a reference receptor and at least one target receptor");
        print_usage(&program, &opts, BRIEF_ARGS);
        process::exit(1);
    }

    let delimiter = match delimiter_from_matches(&matches) {
        Ok(delimiter) => delimiter,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let residue_numbers =
        match parse_residue_numbers(&matches.opt_str("residues").unwrap_or_default()) {
            Ok(numbers) => numbers,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        };

    let include_conservation = matches.opt_present("conservation");

    let reference = matches.free[0].as_str();
    let targets: Vec<&str> = matches.free[1..].iter()
        .flat_map(|arg| split_names(arg))
        .collect();

    let settings = Settings::from_matches(&matches)?;
    let catalog = settings.read_catalog()?;

    let residue_map =
        load_residue_map(&catalog, &settings.alignment_dir, reference, &targets,
                         include_conservation).await
            .map_err(|err| add_receptor_hint(&catalog, err))?;

    let rows = filter_reference_residues(residue_map.rows, &residue_numbers);

    if rows.is_empty() {
        eprintln!("no residues matched the requested residue numbers");
        process::exit(1);
    }

    let table = residue_table(&rows, &residue_map.gene_names, include_conservation);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_delimited(&mut out, &table, delimiter)?;

    Ok(())
}
