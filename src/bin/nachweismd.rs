//! nachweismd コマンドラインツール

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use nachweismd::{BatchConverter, BatchOptions, ConverterBuilder, NachweisError};

#[derive(Parser, Debug)]
#[command(name = "nachweismd")]
#[command(about = "Convert Ausbildungsnachweis spreadsheets to Markdown", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Directory containing the workbooks
    #[arg(value_name = "INPUT_DIR", default_value = "input")]
    input: PathBuf,

    /// Directory for the Markdown files and the archive
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Year used when neither the sheet nor the filename carries one
    #[arg(long, default_value = "2025")]
    year: String,

    /// Skip creating the ZIP archive
    #[arg(long)]
    no_archive: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a single workbook
    File {
        /// Workbook to convert
        path: PathBuf,

        /// Directory for the Markdown file
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Year used when neither the sheet nor the filename carries one
        #[arg(long, default_value = "2025")]
        year: String,

        /// Increase log verbosity (-v info, -vv debug)
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
    },
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    // RUST_LOG が設定されていればそちらを優先
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> Result<(), NachweisError> {
    match cli.command {
        Some(Commands::File {
            path,
            output,
            year,
            verbose,
        }) => {
            init_logging(verbose);
            convert_single(&path, &output, &year)
        }
        None => {
            init_logging(cli.verbose);
            convert_directory(&cli)
        }
    }
}

fn convert_single(path: &Path, output_dir: &Path, year: &str) -> Result<(), NachweisError> {
    let converter = ConverterBuilder::new().with_default_year(year).build()?;
    let report = converter.convert_file(path)?;

    std::fs::create_dir_all(output_dir)?;
    let target = output_dir.join(&report.filename);
    std::fs::write(&target, &report.content)?;

    println!("[OK] {} -> {}", path.display(), target.display());
    Ok(())
}

fn convert_directory(cli: &Cli) -> Result<(), NachweisError> {
    let converter = ConverterBuilder::new()
        .with_default_year(cli.year.as_str())
        .build()?;
    let options = BatchOptions {
        archive: !cli.no_archive,
        ..BatchOptions::default()
    };
    let batch = BatchConverter::new(converter, options);

    let summary = batch.run(&cli.input, &cli.output)?;

    if cli.json {
        println!("{}", summary.to_json()?);
        return Ok(());
    }

    if summary.files.is_empty() {
        println!("No Excel files found in '{}' directory.", cli.input.display());
        return Ok(());
    }

    summary.write_report(&mut std::io::stdout().lock())?;
    Ok(())
}
