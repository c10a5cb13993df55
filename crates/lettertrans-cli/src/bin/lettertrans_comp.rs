// lettertrans-comp: compile a dictionary into a letter transducer artifact.
//
// The dictionary is either a markup dictionary or a flat transition list;
// the format is detected from the content.
//
// Usage:
//   lettertrans-comp [OPTIONS] <DIRECTION> <DICTIONARY> <OUTPUT> [RESTRICTION]

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use lettertrans_cli::fatal;
use lettertrans_compile::{CompileOptions, Direction, compile_file};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionArg {
    /// Left side is input (analysis).
    #[value(alias = "lr")]
    Forward,
    /// Right side is input (generation).
    #[value(alias = "rl")]
    Reverse,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Forward => Direction::Forward,
            DirectionArg::Reverse => Direction::Reverse,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "lettertrans-comp", about = "Build a letter transducer from a dictionary")]
struct Args {
    /// Compile direction.
    direction: DirectionArg,

    /// Markup dictionary or flat transition list.
    dictionary: PathBuf,

    /// Output artifact.
    output: PathBuf,

    /// Analysis-chars file (markup dictionaries, forward direction only).
    restriction: Option<PathBuf>,

    /// Keep morpheme boundaries.
    #[arg(short = 'm', long)]
    keep_boundaries: bool,

    /// Language variant.
    #[arg(short = 'v', long = "var")]
    variant: Option<String>,

    /// Alternative.
    #[arg(short = 'a', long)]
    alt: Option<String>,

    /// Left-side variant.
    #[arg(short = 'l', long = "var-left")]
    variant_left: Option<String>,

    /// Right-side variant.
    #[arg(short = 'r', long = "var-right")]
    variant_right: Option<String>,

    /// Accept multi-character symbols without angle brackets in flat sources.
    #[arg(short = 'H', long = "hfst")]
    extended_symbols: bool,

    /// Report progress.
    #[arg(short = 'V', long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> CompileOptions {
        CompileOptions {
            direction: self.direction.into(),
            keep_boundaries: self.keep_boundaries,
            variant: self.variant.clone(),
            alt: self.alt.clone(),
            variant_left: self.variant_left.clone(),
            variant_right: self.variant_right.clone(),
            restriction: self.restriction.clone(),
            extended_symbols: self.extended_symbols,
            verbose: self.verbose,
        }
    }
}

fn main() {
    let args = Args::parse();
    lettertrans_cli::init_logging(args.verbose);

    let options = args.options();
    if let Err(e) = options.validate() {
        fatal(&e.to_string());
    }

    let compiled =
        compile_file(&args.dictionary, &options).unwrap_or_else(|e| fatal(&e.to_string()));
    lettertrans_cli::write_artifact(&args.output, &compiled.artifact)
        .unwrap_or_else(|e| fatal(&e));
    log::info!("wrote {}", args.output.display());
}
