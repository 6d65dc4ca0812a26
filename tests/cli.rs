use assert_cmd::Command;
use predicates::prelude::*;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_program(dir: &TempDir, name: &str, source: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.path().join(name);
    fs::write(&path, source)?;
    Ok(path)
}

#[test]
fn test_run_echoes_input() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let program = write_program(&temp_dir, "echo.txt", "3,0,4,0,99\n")?;

    let mut cmd = Command::cargo_bin("intcode-vm")?;
    cmd.arg("run")
        .arg("--program")
        .arg(&program)
        .arg("--input")
        .arg("-17");

    cmd.assert().success().stdout("-17\n");

    Ok(())
}

#[test]
fn test_run_json_output() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let program = write_program(&temp_dir, "quine.txt", "104,1,104,2,99")?;

    let mut cmd = Command::cargo_bin("intcode-vm")?;
    cmd.arg("--json").arg("run").arg("--program").arg(&program);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#"{"outputs":[1,2]}"#));

    Ok(())
}

#[test]
fn test_alarm_patches_noun_and_verb() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let program = write_program(&temp_dir, "alarm.txt", "1,0,0,0,99,30,40")?;

    let mut cmd = Command::cargo_bin("intcode-vm")?;
    cmd.arg("alarm")
        .arg("--program")
        .arg(&program)
        .arg("--noun")
        .arg("5")
        .arg("--verb")
        .arg("6");

    cmd.assert().success().stdout("70\n");

    Ok(())
}

#[test]
fn test_amplify_finds_best_ordering() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let program = write_program(
        &temp_dir,
        "amp.txt",
        "3,15,3,16,1002,16,10,16,1,16,15,15,4,15,99,0,0",
    )?;

    let mut cmd = Command::cargo_bin("intcode-vm")?;
    cmd.arg("amplify").arg("--program").arg(&program).arg("--json");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""signal":43210"#))
        .stdout(predicate::str::contains(r#""phases":[4,3,2,1,0]"#));

    Ok(())
}

#[test]
fn test_fault_exits_with_error() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let program = write_program(&temp_dir, "bad.txt", "1101,1,1,5,42")?;

    let mut cmd = Command::cargo_bin("intcode-vm")?;
    cmd.arg("run").arg("--program").arg(&program);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown opcode"));

    Ok(())
}

#[test]
fn test_run_without_enough_input_fails() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let program = write_program(&temp_dir, "twice.txt", "3,0,3,0,99")?;

    let mut cmd = Command::cargo_bin("intcode-vm")?;
    cmd.arg("run")
        .arg("--program")
        .arg(&program)
        .arg("--input")
        .arg("1")
        .timeout(std::time::Duration::from_secs(30));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no input left"));

    Ok(())
}

#[test]
fn test_invalid_program_text() -> Result<(), Box<dyn Error>> {
    let temp_dir = TempDir::new()?;
    let program = write_program(&temp_dir, "junk.txt", "1,2,three")?;

    let mut cmd = Command::cargo_bin("intcode-vm")?;
    cmd.arg("run").arg("--program").arg(&program);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("three"));

    Ok(())
}

#[test]
fn test_missing_program_file() -> Result<(), Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("intcode-vm")?;
    cmd.arg("run").arg("--program").arg("does-not-exist.txt");

    cmd.assert().failure();

    Ok(())
}
