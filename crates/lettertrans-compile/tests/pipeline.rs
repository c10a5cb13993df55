//! End-to-end tests: dictionary file to artifact file to text export.

use std::fs::{self, File};
use std::io::BufReader;

use lettertrans_compile::{CompileOptions, Direction, SourceFormat, compile_file, compile_source};
use lettertrans_fst::print::print_artifact;
use lettertrans_fst::{Artifact, Escaping};
use tempfile::TempDir;

const DIX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<dictionary>
  <alphabet>abcdefghijklmnopqrstuvwxyz</alphabet>
  <sdefs>
    <sdef n="n"/>
    <sdef n="sg"/>
    <sdef n="pl"/>
  </sdefs>
  <pardefs>
    <pardef n="house__n">
      <e><p><l></l><r><s n="n"/><s n="sg"/></r></p></e>
      <e><p><l>s</l><r><s n="n"/><s n="pl"/></r></p></e>
    </pardef>
  </pardefs>
  <section id="main" type="standard">
    <e><i>house</i><par n="house__n"/></e>
    <e><i>mouse</i><par n="house__n"/></e>
  </section>
</dictionary>
"#;

fn render(artifact: &Artifact, escaping: Escaping) -> String {
    let mut out = Vec::new();
    print_artifact(&mut out, artifact, escaping).unwrap();
    String::from_utf8(out).unwrap()
}

fn write_and_reload(dir: &TempDir, artifact: &Artifact) -> Artifact {
    let path = dir.path().join("out.bin");
    let mut file = File::create(&path).unwrap();
    artifact.write(&mut file).unwrap();
    drop(file);
    let mut reader = BufReader::new(File::open(&path).unwrap());
    Artifact::read(&mut reader).unwrap()
}

#[test]
fn markup_dictionary_round_trip() {
    let dir = TempDir::new().unwrap();
    let dix_path = dir.path().join("en.dix");
    fs::write(&dix_path, DIX).unwrap();

    let compiled = compile_file(&dix_path, &CompileOptions::new(Direction::Forward)).unwrap();
    assert_eq!(compiled.format, SourceFormat::Markup);

    let reloaded = write_and_reload(&dir, &compiled.artifact);
    assert_eq!(reloaded.alphabet, compiled.artifact.alphabet);
    assert_eq!(
        reloaded.automata.keys().collect::<Vec<_>>(),
        vec!["main@standard"]
    );
    assert_eq!(
        render(&reloaded, Escaping::Plain),
        render(&compiled.artifact, Escaping::Plain)
    );

    let text = render(&reloaded, Escaping::Plain);
    // house, mouse: each with a singular and a plural ending.
    assert_eq!(text.lines().filter(|l| l.split('\t').count() == 2).count(), 4);
    assert!(text.contains("\t\u{03b5}\t<n>\t"));
}

#[test]
fn restriction_file_applies_forward_only() {
    let dir = TempDir::new().unwrap();
    let acx_path = dir.path().join("en.acx");
    fs::write(
        &acx_path,
        "<analysis-chars><char value=\"o\"><equiv-char value=\"\u{00f6}\"/></char></analysis-chars>",
    )
    .unwrap();

    let mut options = CompileOptions::new(Direction::Forward);
    options.restriction = Some(acx_path.clone());
    let forward = compile_source(DIX, &options).unwrap();
    assert!(render(&forward.artifact, Escaping::Plain).contains("\t\u{00f6}\to\t"));
    assert!(forward.artifact.alphabet.letters().contains(&'\u{00f6}'));

    let mut options = CompileOptions::new(Direction::Reverse);
    options.restriction = Some(acx_path);
    let reverse = compile_source(DIX, &options).unwrap();
    assert!(!render(&reverse.artifact, Escaping::Plain).contains('\u{00f6}'));
}

#[test]
fn flat_export_recompiles_to_same_text() {
    let source = "0\t1\tc\tc\n1\t2\ta\ta\n2\t3\tt\tt\n3\t4\t@0@\t<n>\t0.5\n4\t1.25\n";
    let options = CompileOptions::new(Direction::Forward);
    let first = compile_source(source, &options).unwrap();
    assert_eq!(first.format, SourceFormat::Flat);

    let text = render(&first.artifact, Escaping::Plain);
    assert_eq!(
        text,
        "0\t1\tc\tc\t0.000000\n\
         1\t2\ta\ta\t0.000000\n\
         2\t3\tt\tt\t0.000000\n\
         3\t4\t\u{03b5}\t<n>\t0.500000\n\
         4\t1.250000\n"
    );

    let second = compile_source(&text, &options).unwrap();
    assert_eq!(second.format, SourceFormat::Flat);
    assert_eq!(render(&second.artifact, Escaping::Plain), text);
}

#[test]
fn unreachable_finals_survive_export() {
    let source = "0\t1\ta\ta\n1\n2\t3\tb\tb\n3\n";
    let options = CompileOptions::new(Direction::Forward);
    let first = compile_source(source, &options).unwrap().artifact;
    assert_eq!(first.automata["main@standard"].finals().len(), 2);

    let text = render(&first, Escaping::Plain);
    assert_eq!(
        text,
        "0\t1\ta\ta\t0.000000\n\
         2\t3\tb\tb\t0.000000\n\
         1\t0.000000\n\
         3\t0.000000\n"
    );

    let second = compile_source(&text, &options).unwrap().artifact;
    assert_eq!(second.automata["main@standard"].finals().len(), 2);
    assert_eq!(render(&second, Escaping::Plain), text);
}

#[test]
fn epsilon_letter_round_trips_with_extended_escaping() {
    let dix = "<dictionary><section id=\"main\"><e><i>\u{03b5}</i></e></section></dictionary>";
    let first = compile_source(dix, &CompileOptions::new(Direction::Forward))
        .unwrap()
        .artifact;
    let text = render(&first, Escaping::Extended);
    assert_eq!(text, "0\t1\t\u{03b5}\t\u{03b5}\t0.000000\n1\t0.000000\n");

    let mut options = CompileOptions::new(Direction::Forward);
    options.extended_symbols = true;
    let second = compile_source(&text, &options).unwrap();
    assert_eq!(second.format, SourceFormat::Flat);
    assert_eq!(render(&second.artifact, Escaping::Extended), text);
}

#[test]
fn extended_escaping_recompiles() {
    let source = "0\t1\t@_SPACE_@\t@_TAB_@\n1\n";
    let options = CompileOptions::new(Direction::Forward);
    let artifact = compile_source(source, &options).unwrap().artifact;
    let text = render(&artifact, Escaping::Extended);
    assert_eq!(text, "0\t1\t@_SPACE_@\t@_TAB_@\t0.000000\n1\t0.000000\n");
    let again = compile_source(&text, &options).unwrap().artifact;
    assert_eq!(render(&again, Escaping::Extended), text);
}

#[test]
fn compile_errors_name_the_problem() {
    let options = CompileOptions::new(Direction::Forward);

    let err = compile_source(
        "<dictionary><section id=\"m\"><e><i>a<s n=\"x\"/></i></e></section></dictionary>",
        &options,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "undefined tag <x>");

    let err = compile_source("0\t1\ta\n", &options).unwrap_err();
    assert!(err.to_string().starts_with("line 1:"));
}
