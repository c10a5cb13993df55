// lettertrans-cli: shared utilities for CLI tools.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::process;

use lettertrans_fst::print::print_artifact;
use lettertrans_fst::{Artifact, Escaping};

/// Initialise `env_logger`.
///
/// Level `warn` by default and `info` with `verbose`. A `RUST_LOG` setting
/// takes precedence over both.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Read an artifact file.
pub fn read_artifact(path: &Path) -> Result<Artifact, String> {
    let file = File::open(path)
        .map_err(|e| format!("cannot open file '{}': {e}", path.display()))?;
    let mut reader = BufReader::new(file);
    Artifact::read(&mut reader).map_err(|e| format!("{}: {e}", path.display()))
}

/// Write `artifact` to `path`, creating or truncating the file.
///
/// A partially written file is removed on failure.
pub fn write_artifact(path: &Path, artifact: &Artifact) -> Result<(), String> {
    let file = File::create(path)
        .map_err(|e| format!("cannot create file '{}': {e}", path.display()))?;
    let mut out = BufWriter::new(file);
    let result = artifact
        .write(&mut out)
        .map_err(|e| e.to_string())
        .and_then(|()| out.flush().map_err(|e| e.to_string()));
    if let Err(e) = result {
        drop(out);
        let _ = fs::remove_file(path);
        return Err(format!("{}: {e}", path.display()));
    }
    Ok(())
}

/// Print `artifact` as text to `output`, or to standard output.
///
/// The text is rendered in full before the output file is created.
pub fn export_text(
    artifact: &Artifact,
    escaping: Escaping,
    output: Option<&Path>,
) -> Result<(), String> {
    let mut text = Vec::new();
    print_artifact(&mut text, artifact, escaping).map_err(|e| e.to_string())?;
    match output {
        Some(path) => fs::write(path, &text)
            .map_err(|e| format!("cannot write file '{}': {e}", path.display())),
        None => {
            let mut out = io::stdout().lock();
            out.write_all(&text)
                .and_then(|()| out.flush())
                .map_err(|e| e.to_string())
        }
    }
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use lettertrans_fst::Transducer;
    use tempfile::TempDir;

    #[test]
    fn write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.bin");
        let mut artifact = Artifact::new();
        artifact.automata.insert("main@standard".to_string(), Transducer::new());
        write_artifact(&path, &artifact).unwrap();
        assert_eq!(read_artifact(&path).unwrap(), artifact);
    }

    #[test]
    fn failed_export_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.att");
        let mut t = Transducer::new();
        let s = t.add_state();
        // Label 7 has no entry in the empty pair table.
        t.add_transition(0, 7, s, 0.0);
        let mut artifact = Artifact::new();
        artifact.automata.insert("main@standard".to_string(), t);

        let err = export_text(&artifact, Escaping::Plain, Some(&path)).unwrap_err();
        assert!(err.contains("unknown label 7"));
        assert!(!path.exists());
    }

    #[test]
    fn export_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.att");
        let mut t = Transducer::new();
        t.set_final(0, 0.0);
        let mut artifact = Artifact::new();
        artifact.automata.insert("main@standard".to_string(), t);

        export_text(&artifact, Escaping::Plain, Some(&path)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "0\t0.000000\n");
    }

    #[test]
    fn read_errors_name_the_file() {
        let err = read_artifact(Path::new("/nonexistent/a.bin")).unwrap_err();
        assert!(err.starts_with("cannot open file '/nonexistent/a.bin'"));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.bin");
        fs::write(&path, b"LTTB\x01").unwrap();
        let err = read_artifact(&path).unwrap_err();
        assert!(err.contains("short.bin"));
    }
}
