// lettertrans-print: print a compiled artifact as tab-separated text.
//
// Usage:
//   lettertrans-print [-H] <ARTIFACT> [OUTPUT]

use std::path::PathBuf;

use clap::Parser;
use lettertrans_cli::fatal;
use lettertrans_fst::Escaping;

#[derive(Parser, Debug)]
#[command(name = "lettertrans-print", about = "Print a letter transducer artifact as text")]
struct Args {
    /// Compiled artifact.
    artifact: PathBuf,

    /// Output file (standard output when omitted).
    output: Option<PathBuf>,

    /// Write epsilon as @0@ and spaces as @_SPACE_@.
    #[arg(short = 'H', long = "hfst")]
    extended: bool,
}

fn main() {
    let args = Args::parse();
    lettertrans_cli::init_logging(false);

    let artifact = lettertrans_cli::read_artifact(&args.artifact).unwrap_or_else(|e| fatal(&e));
    let escaping = Escaping::from_extended(args.extended);

    lettertrans_cli::export_text(&artifact, escaping, args.output.as_deref())
        .unwrap_or_else(|e| fatal(&e));
}
