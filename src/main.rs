use anyhow::anyhow;
use ashp_defrost::output::FileOutput;
use ashp_defrost::run_project;
use clap::Parser;
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct AshpArgs {
    input_file: String,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
    #[clap(
        long,
        short,
        default_value_t = false,
        help = "Log intermediate values from the defrost and part load calculations"
    )]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = AshpArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let max_level = if args.verbose {
            tracing::Level::TRACE
        } else {
            tracing::Level::INFO
        };
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(max_level);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let input_file = args.input_file.as_str();
    let input_file_ext = Path::new(input_file).extension().and_then(OsStr::to_str);
    let input_file_stem = match input_file_ext {
        Some(ext) => &input_file[..(input_file.len() - ext.len() - 1)],
        None => input_file,
    };

    let output_path = PathBuf::from(format!("{input_file_stem}__results"));
    fs::create_dir_all(&output_path)?;
    let input_file_name = Path::new(input_file_stem)
        .file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(|| anyhow!("Could not determine a file name from {input_file}"))?;
    let file_output = FileOutput::new(output_path, format!("{input_file_name}__{{}}.{{}}"));

    let results = run_project(BufReader::new(File::open(input_file)?), &file_output)?;

    info!(
        operating_points = results.len(),
        heating_energy = results.iter().map(|r| r.heating_energy).sum::<f64>(),
        defrost_energy = results.iter().map(|r| r.defrost_energy).sum::<f64>(),
        "run complete"
    );

    Ok(())
}
