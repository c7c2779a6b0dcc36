use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;

use anyhow::Context;

use gpcr::analysis::orthologs::load_combined_orthologs;
use gpcr::bio::reproject::ReprojectionMode;
use gpcr::cli::{add_receptor_hint, common_options, init_logging, print_usage, split_names,
                Settings};
use gpcr::export::format_fasta_records;

const BRIEF_ARGS: &str = "GENE[,GENE...]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let mut opts = common_options();

    opts.optopt("m", "mode",
                "how orthologs are placed on the trimmed reference: sequential (default) or overlay",
                "MODE");
    opts.optopt("o", "output",
                "output file, \"-\" for stdout (default GENE1-GENE2..._orthologs_combined.fasta)",
                "FILE");

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

    let names: Vec<&str> = matches.free.iter()
        .flat_map(|arg| split_names(arg))
        .collect();

    if names.is_empty() {
        eprintln!("please give at least one receptor name");
        print_usage(&program, &opts, BRIEF_ARGS);
        process::exit(1);
    }

    let mode: ReprojectionMode =
        match matches.opt_str("mode") {
            Some(mode) => mode.parse()?,
            None => ReprojectionMode::Sequential,
        };

    let settings = Settings::from_matches(&matches)?;
    let catalog = settings.read_catalog()?;

    let combined =
        load_combined_orthologs(&catalog, &settings.alignment_dir, &names, mode).await
            .map_err(|err| add_receptor_hint(&catalog, err))?;

    if combined.records.is_empty() {
        eprintln!("no ortholog sequences could be combined for {}", names.join(", "));
        process::exit(1);
    }

    let fasta = format_fasta_records(&combined.records);

    let output_file_name = matches.opt_str("output")
        .unwrap_or_else(|| combined.file_name.clone());

    if output_file_name == "-" {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "{}", fasta)?;
    } else {
        let file = File::create(&output_file_name)
            .with_context(|| format!("failed to create {}", output_file_name))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", fasta)?;
        writer.flush()?;

        eprintln!("wrote {} sequences to {}", combined.records.len(), output_file_name);
    }

    Ok(())
}
