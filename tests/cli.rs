mod common;

use common::{sil, TempScript};
use std::io::Write;
use std::process::Stdio;

#[test]
fn test_version_flag() {
    let output = sil().arg("--version").output().expect("failed to execute sil");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sil"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_script_is_a_usage_error() {
    let output = sil().output().expect("failed to execute sil");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No script file provided"));
}

#[test]
fn test_missing_script_file() {
    let output = sil()
        .arg("/no/such/script.sil")
        .output()
        .expect("failed to execute sil");
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("file with path '/no/such/script.sil' doesn't exist."));
}

#[test]
fn test_script_arguments_reach_arg_builtin() {
    let script = TempScript::new("print arg(1); print \" \"; print arg(2); print arg(9);");
    let output = sil()
        .arg(&script.path)
        .arg("one")
        .arg("two")
        .output()
        .expect("failed to execute sil");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "one twonovalue");
}

#[test]
fn test_arg_zero_is_the_script_path() {
    let script = TempScript::new("print arg(0);");
    let output = sil()
        .arg(&script.path)
        .output()
        .expect("failed to execute sil");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        script.path_str()
    );
}

#[test]
fn test_input_reads_a_line_from_stdin() {
    let script = TempScript::new("var name = input \"? \"; print name;");
    let mut child = sil()
        .arg(&script.path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn sil");

    child
        .stdin
        .as_mut()
        .expect("missing stdin")
        .write_all(b"world\n")
        .expect("failed to write stdin");

    let output = child.wait_with_output().expect("failed to wait for sil");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "? world");
}

#[test]
fn test_dump_tokens_writes_the_token_stream() {
    let script = TempScript::new("print 1;");
    let dump = std::env::temp_dir().join(format!("sil-dump-{}.txt", std::process::id()));

    // options go before the script; everything after it belongs to the script
    let output = sil()
        .arg("--dump-tokens")
        .arg(&dump)
        .arg(&script.path)
        .output()
        .expect("failed to execute sil");
    assert!(output.status.success());

    let dumped = std::fs::read_to_string(&dump).expect("dump file missing");
    let _ = std::fs::remove_file(&dump);

    let lines: Vec<&str> = dumped.lines().collect();
    assert_eq!(lines[0], "keyword print");
    assert_eq!(lines[1], "num 1");
    assert_eq!(lines[2], "; ");
    assert_eq!(lines[3], "eof ");
}

#[test]
fn test_complete_subcommand_emits_a_script() {
    let output = sil()
        .arg("complete")
        .arg("bash")
        .output()
        .expect("failed to execute sil");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("sil"));
}

#[test]
fn test_color_never_yields_plain_diagnostics() {
    let script = TempScript::new("print missing;");
    let output = sil()
        .arg("--color")
        .arg("never")
        .arg(&script.path)
        .output()
        .expect("failed to execute sil");
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains('\u{1b}'), "no ANSI escapes expected");
}
