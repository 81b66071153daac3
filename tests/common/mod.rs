// Not every suite uses every helper.
#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A script written to a unique temp path, removed again on drop.
pub struct TempScript {
    pub path: PathBuf,
}

impl TempScript {
    pub fn new(source: &str) -> Self {
        Self::named(source, "script")
    }

    pub fn named(source: &str, tag: &str) -> Self {
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "sil-test-{}-{}-{}.sil",
            std::process::id(),
            id,
            tag
        ));
        std::fs::write(&path, source).expect("failed to write temp script");
        Self { path }
    }

    pub fn path_str(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

impl Drop for TempScript {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

pub fn sil() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sil"))
}

pub fn run_script(source: &str) -> Output {
    let script = TempScript::new(source);
    sil()
        .arg(&script.path)
        .output()
        .expect("failed to execute sil")
}

/// Run a script that must succeed and return its stdout.
pub fn stdout_of(source: &str) -> String {
    let output = run_script(source);
    assert!(
        output.status.success(),
        "script failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run a script that must fail and return its stderr.
pub fn stderr_of(source: &str) -> String {
    let output = run_script(source);
    assert!(
        !output.status.success(),
        "script unexpectedly succeeded:\n{}",
        String::from_utf8_lossy(&output.stdout)
    );
    String::from_utf8_lossy(&output.stderr).to_string()
}
