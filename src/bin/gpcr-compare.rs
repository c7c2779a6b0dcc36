use std::env;
use std::io::{self, Write};
use std::process;

use anyhow::Context;

use gpcr::analysis::comparison::{comparison_table, load_comparison, validate_threshold};
use gpcr::bio::snake::{category_fill_table, category_fills, conservation_fill_table, Side};
use gpcr::cli::{add_delimiter_option, add_receptor_hint, common_options, delimiter_from_matches,
                init_logging, print_usage, Settings, PKG_NAME, VERSION};
use gpcr::export::write_delimited;

const BRIEF_ARGS: &str = "GENE1 GENE2";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let mut opts = common_options();
    add_delimiter_option(&mut opts);

    opts.optopt("t", "threshold",
                "conservation threshold percentage, 0-100 (default from the configuration)",
                "THRESHOLD");
    opts.optopt("", "snake",
                "also print the snake plot fills for receptor 1 or 2", "1|2");
    opts.optopt("", "snake-conservation",
                "also print the snake plot conservation gradient for receptor 1 or 2", "1|2");
    opts.optflag("V", "version", "print the version and exit");

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

    if matches.opt_present("version") {
        println!("{} v{}", PKG_NAME, VERSION);
        process::exit(0);
    }

    if matches.free.len() != 2 {
        eprintln!("needs two receptor gene names");
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

    let snake_side: Option<Side> = matches.opt_str("snake")
        .map(|side| side.parse())
        .transpose()?;
    let conservation_side: Option<Side> = matches.opt_str("snake-conservation")
        .map(|side| side.parse())
        .transpose()?;

    let settings = Settings::from_matches(&matches)?;

    let threshold =
        match matches.opt_str("threshold") {
            Some(threshold) => threshold.parse::<f64>()
                .with_context(|| format!("failed to parse threshold: {}", threshold))?,
            None => settings.config.default_threshold,
        };
    let threshold = validate_threshold(threshold)?;

    let catalog = settings.read_catalog()?;

    let comparison =
        load_comparison(&catalog, &settings.alignment_dir, &matches.free[0],
                        &matches.free[1]).await
            .map_err(|err| add_receptor_hint(&catalog, err))?;

    let entries = comparison.recompute(threshold)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if entries.is_empty() {
        eprintln!("no residues meet the conservation threshold of {}", threshold);
    } else {
        let table = comparison_table(&entries, &comparison.gene1, &comparison.gene2);
        write_delimited(&mut out, &table, delimiter)?;
    }

    if let Some(side) = snake_side {
        let fills = category_fills(&entries, side, &settings.config.category_colours);

        writeln!(out)?;
        write_delimited(&mut out, &category_fill_table(&fills), delimiter)?;
    }

    if let Some(side) = conservation_side {
        let colour = &settings.config.conservation_fill_colour;
        let fills = comparison.conservation_fills(side, colour);

        writeln!(out)?;
        write_delimited(&mut out, &conservation_fill_table(&fills), delimiter)?;
    }

    Ok(())
}
