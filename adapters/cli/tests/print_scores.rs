use std::{fs, path::PathBuf, process::Command};

fn scores_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("snake-cli-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create temp dir");
    dir.join("highscores.log")
}

fn print_scores(path: &PathBuf, count: &str) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_snake"))
        .arg("--scores")
        .arg(path)
        .args(["--print-scores", count])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run snake binary");

    assert!(output.status.success(), "snake --print-scores should succeed");
    String::from_utf8(output.stdout).expect("utf-8 output")
}

#[test]
fn prints_most_recent_scores_and_skips_damaged_lines() {
    let path = scores_path("recent");
    fs::write(
        &path,
        "Ann,2024-11-02 08:00:00,4\n\
         garbage\n\
         Bob,2024-11-02 08:01:00,9\n\
         Cy,2024-11-02 08:02:00,12\n",
    )
    .expect("seed score log");

    let stdout = print_scores(&path, "2");

    assert_eq!(
        stdout,
        "Bob - 9 - 2024-11-02 08:01:00\nCy - 12 - 2024-11-02 08:02:00\n"
    );
    let _ = fs::remove_dir_all(path.parent().expect("has parent"));
}

#[test]
fn missing_score_log_prints_placeholder() {
    let path = scores_path("missing");

    let stdout = print_scores(&path, "5");

    assert_eq!(stdout, "No high scores yet.\n");
    let _ = fs::remove_dir_all(path.parent().expect("has parent"));
}
