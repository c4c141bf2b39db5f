
use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::tempdir;

use support_distributed::{
    ChildGuard, parse_summary_metric, pick_port, read_child_output, spawn_http_server,
    spawn_webswarm, spawn_webswarm_quiet, wait_for_exit, wait_for_listener,
};

const RUN_TIMEOUT: Duration = Duration::from_secs(30);

fn write_file(path: &Path, content: &str) -> Result<(), String> {
    fs::write(path, content).map_err(|err| format!("write {} failed: {}", path.display(), err))
}

fn slave_config(master: &str, listen: &str, targets: Option<&str>) -> String {
    let targets_line = targets.map_or_else(String::new, |path| {
        format!("targets_path = \"{}\"\n", path)
    });
    format!(
        "[slave]\nlisten = \"{}\"\nmaster = \"{}\"\nerror_log_path = \"err.log\"\n{}",
        listen, master, targets_line
    )
}

fn master_config(listen: &str, slaves: &[String], total: u64, targets: Option<&str>) -> String {
    let slaves = slaves
        .iter()
        .map(|addr| format!("\"{}\"", addr))
        .collect::<Vec<_>>()
        .join(", ");
    let targets_line = targets.map_or_else(String::new, |path| {
        format!("targets_path = \"{}\"\n", path)
    });
    format!(
        "[master]\nlisten = \"{}\"\nslaves = [{}]\nreport_path = \"results.log\"\n{}\n[master.dispatch]\nrate_per_second = 100\ntotal_attempts = {}\nmax_concurrency = 4\ntimeout_seconds = 2\n",
        listen, slaves, targets_line, total
    )
}

/// Starts one slave process in its own directory and waits for its listener.
fn start_slave(
    root: &Path,
    name: &str,
    master: &str,
    targets: Option<&str>,
) -> Result<(String, ChildGuard), String> {
    let dir = root.join(name);
    fs::create_dir_all(&dir).map_err(|err| format!("create slave dir failed: {}", err))?;
    let listen = format!("127.0.0.1:{}", pick_port()?);
    write_file(&dir.join("webswarm.toml"), &slave_config(master, &listen, targets))?;
    let child = ChildGuard(spawn_webswarm_quiet(&dir, ["-c", "webswarm.toml"])?);
    wait_for_listener(&listen, Duration::from_secs(10))?;
    Ok((listen, child))
}

#[test]
fn help_flag_exits_zero() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let mut child = spawn_webswarm(dir.path(), ["--help"])?;
    let status = wait_for_exit(&mut child, RUN_TIMEOUT)?;
    let (stdout, _stderr) = read_child_output(&mut child)?;
    if !status.success() {
        return Err(format!("--help exited with {}", status));
    }
    if !stdout.contains("--master") {
        return Err(format!("Help text missing --master: {}", stdout));
    }
    Ok(())
}

#[test]
fn no_arguments_without_config_prints_help() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let mut child = spawn_webswarm(dir.path(), Vec::<String>::new())?;
    let status = wait_for_exit(&mut child, RUN_TIMEOUT)?;
    let (stdout, _stderr) = read_child_output(&mut child)?;
    if !status.success() || !stdout.contains("Usage") {
        return Err(format!("Expected help, got {}: {}", status, stdout));
    }
    Ok(())
}

#[test]
fn invalid_dispatch_config_fails_at_startup() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let listen = format!("127.0.0.1:{}", pick_port()?);
    let config = master_config(&listen, &[], 10, None).replace(
        "rate_per_second = 100",
        "rate_per_second = 0",
    );
    write_file(&dir.path().join("webswarm.toml"), &config)?;

    let mut child = spawn_webswarm(dir.path(), ["-m"])?;
    let status = wait_for_exit(&mut child, RUN_TIMEOUT)?;
    let (_stdout, stderr) = read_child_output(&mut child)?;
    if status.success() {
        return Err("Zero rate should fail".to_owned());
    }
    if !stderr.contains("ratePerSecond") {
        return Err(format!("Expected a clear diagnostic, got: {}", stderr));
    }
    Ok(())
}

#[test]
fn master_without_slaves_writes_empty_report() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let listen = format!("127.0.0.1:{}", pick_port()?);
    write_file(
        &dir.path().join("webswarm.toml"),
        &master_config(&listen, &[], 10, None),
    )?;

    let mut child = spawn_webswarm(dir.path(), ["-m"])?;
    let status = wait_for_exit(&mut child, RUN_TIMEOUT)?;
    let (stdout, stderr) = read_child_output(&mut child)?;
    if !status.success() {
        return Err(format!("Master failed. stdout: {} stderr: {}", stdout, stderr));
    }
    if parse_summary_metric(&stdout, "Total Requests:")? != 0 {
        return Err(format!("Expected empty run: {}", stdout));
    }
    let report = fs::read_to_string(dir.path().join("results.log"))
        .map_err(|err| format!("read report failed: {}", err))?;
    if !report.is_empty() {
        return Err("Report should be empty".to_owned());
    }
    Ok(())
}

#[test]
fn two_slaves_report_to_master() -> Result<(), String> {
    let (url, _server) = spawn_http_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let targets_path = dir.path().join("urls.txt");
    write_file(&targets_path, &format!("{}/a\r\n{}/b\r\n\r\n", url, url))?;
    let targets = targets_path.to_string_lossy().into_owned();

    let master_listen = format!("127.0.0.1:{}", pick_port()?);
    let (slave_a, _guard_a) = start_slave(dir.path(), "a", &master_listen, Some(&targets))?;
    let (slave_b, _guard_b) = start_slave(dir.path(), "b", &master_listen, Some(&targets))?;

    let master_dir = dir.path().join("master");
    fs::create_dir_all(&master_dir).map_err(|err| format!("create dir failed: {}", err))?;
    write_file(
        &master_dir.join("webswarm.toml"),
        &master_config(&master_listen, &[slave_a, slave_b], 20, None),
    )?;

    let mut master = spawn_webswarm(&master_dir, ["--master"])?;
    let status = wait_for_exit(&mut master, RUN_TIMEOUT)?;
    let (stdout, stderr) = read_child_output(&mut master)?;
    if !status.success() {
        return Err(format!("Master failed. stdout: {} stderr: {}", stdout, stderr));
    }

    let total = parse_summary_metric(&stdout, "Total Requests:")?;
    let ok = parse_summary_metric(&stdout, "Successful:")?;
    if total != 40 || ok != 40 {
        return Err(format!("Expected 40/40, got {}/{}: {}", ok, total, stdout));
    }
    let report = fs::read_to_string(master_dir.join("results.log"))
        .map_err(|err| format!("read report failed: {}", err))?;
    if report.lines().count() != 40 {
        return Err(format!("Expected 40 report lines, got {}", report.lines().count()));
    }
    Ok(())
}

#[test]
fn master_pushes_targets_with_send_urls() -> Result<(), String> {
    let (url, _server) = spawn_http_server()?;
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let targets_path = dir.path().join("urls.txt");
    write_file(&targets_path, &format!("{}/\n", url))?;
    let targets = targets_path.to_string_lossy().into_owned();

    let master_listen = format!("127.0.0.1:{}", pick_port()?);
    let (slave, _guard) = start_slave(dir.path(), "a", &master_listen, None)?;

    let master_dir = dir.path().join("master");
    fs::create_dir_all(&master_dir).map_err(|err| format!("create dir failed: {}", err))?;
    write_file(
        &master_dir.join("webswarm.toml"),
        &master_config(&master_listen, &[slave], 10, Some(&targets)),
    )?;

    let mut master = spawn_webswarm(&master_dir, ["-m", "-s"])?;
    let status = wait_for_exit(&mut master, RUN_TIMEOUT)?;
    let (stdout, stderr) = read_child_output(&mut master)?;
    if !status.success() {
        return Err(format!("Master failed. stdout: {} stderr: {}", stdout, stderr));
    }
    if parse_summary_metric(&stdout, "Successful:")? != 10 {
        return Err(format!("Expected 10 successes: {}", stdout));
    }
    Ok(())
}
