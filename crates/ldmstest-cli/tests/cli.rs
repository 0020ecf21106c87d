use assert_cmd::Command;
use predicates::prelude::*;
use ldmstest_test_utils::{temp_file, SAMPLE_CLUSTER_SPEC, SAMPLE_LDMS_LS};

fn ldmstest() -> Command {
    let mut cmd = Command::cargo_bin("ldmstest").unwrap();
    cmd.env_remove("LDMSTEST_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn resolve_prints_concrete_spec() {
    let (_dir, path) = temp_file("cluster.json", SAMPLE_CLUSTER_SPEC);
    ldmstest()
        .arg("resolve")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"instance=node-2/meminfo\""))
        .stdout(predicate::str::contains("\"!extends\": \"compute-node\"").not());
}

#[test]
fn resolve_reports_undefined_variable() {
    let (_dir, path) = temp_file("bad.json", r#"{"nodes": [{"hostname": "%HOST%"}]}"#);
    ldmstest()
        .arg("resolve")
        .arg(&path)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("undefined variable `%HOST%`"));
}

#[test]
fn parse_ls_from_stdin() {
    ldmstest()
        .arg("parse-ls")
        .write_stdin(SAMPLE_LDMS_LS)
        .assert()
        .success()
        .stdout(predicate::str::contains("node-1/meminfo: 6 metrics, schema meminfo, flags CL"))
        .stdout(predicate::str::contains("node-1/vmstat: 5 metrics"));
}

#[test]
fn parse_ls_rejects_bad_listing() {
    ldmstest()
        .arg("parse-ls")
        .write_stdin("D u64 orphan 1\n")
        .assert()
        .code(5);
}

#[test]
fn render_config_for_host() {
    let (_dir, path) = temp_file("cluster.json", SAMPLE_CLUSTER_SPEC);
    ldmstest()
        .args(["render-config", "--host", "node-1", "--ldmsd-version", "4.3.11"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "# ldmsd -x sock:10000 -a none -c /etc/ldmsd.conf",
        ))
        .stdout(predicate::str::contains("start name=meminfo interval=1000000 offset=0"));
}

#[test]
fn render_config_json() {
    let (_dir, path) = temp_file("cluster.json", SAMPLE_CLUSTER_SPEC);
    ldmstest()
        .args(["--format", "json", "render-config", "--host", "agg-1"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\": \"4.100.0\""));
}
