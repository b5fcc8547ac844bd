//! End-to-end runs against a scripted `juju` on `PATH`.

#![allow(clippy::expect_used)]

use std::fs::File;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use flate2::read::GzDecoder;
use predicates::prelude::*;

/// `etcd/1` fails its action; `juju storage` exits non-zero.
const FAKE_JUJU: &str = r#"#!/bin/sh
sub="$1"; shift
if [ "$1" = "-m" ]; then shift 2; fi
case "$sub" in
status)
    if [ "$2" = "json" ]; then
        cat <<'JSON'
{"model": {"name": "k8s"},
 "applications": {
   "etcd": {"units": {"etcd/0": {}, "etcd/1": {}}},
   "flannel": {"subordinate-to": ["kubernetes-master"]},
   "kubernetes-master": {"units": {"kubernetes-master/0": {"subordinates": {"flannel/0": {}}}}}
 }}
JSON
    else
        echo "model: k8s"
    fi
    ;;
run-action)
    id=$(echo "$1" | tr '/' '-')
    echo "{\"Action queued with id\": \"id-$id\"}"
    ;;
show-action-output)
    if [ "$1" = "id-etcd-1" ]; then
        echo '{"status": "failed", "message": "exit status 1"}'
    else
        echo "{\"status\": \"completed\", \"results\": {\"path\": \"/home/ubuntu/debug-$1.tar.gz\"}}"
    fi
    ;;
scp)
    name=$(basename "${1#*:}")
    echo "debug bundle" > "$2/$name"
    ;;
storage)
    echo "ERROR no storage provider" >&2
    exit 1
    ;;
*)
    echo "$sub $*"
    ;;
esac
"#;

struct FakeCluster {
    bin: tempfile::TempDir,
    out: tempfile::TempDir,
}

impl FakeCluster {
    fn new() -> Self {
        let bin = tempfile::tempdir().expect("tempdir");
        let script = bin.path().join("juju");
        std::fs::write(&script, FAKE_JUJU).expect("write script");
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
            .expect("chmod");
        Self {
            bin,
            out: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("collect-debug"));
        cmd.env("NO_COLOR", "1")
            .env("COLLECT_DEBUG_CONFIG", "/nonexistent/collect-debug.yaml")
            .env("PATH", format!("{}:/usr/bin:/bin", self.bin.path().display()))
            .args(["--poll-interval-ms", "10", "-a", "etcd,kubernetes-master", "-o"])
            .arg(self.out.path());
        cmd
    }

    fn archive(&self) -> PathBuf {
        let archives: Vec<PathBuf> = std::fs::read_dir(self.out.path())
            .expect("read_dir")
            .map(|e| e.expect("entry").path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("results-") && n.ends_with(".tar.gz"))
            })
            .collect();
        assert_eq!(archives.len(), 1, "exactly one archive expected: {archives:?}");
        archives[0].clone()
    }
}

fn entries(archive: &Path) -> Vec<String> {
    let mut tar = tar::Archive::new(GzDecoder::new(File::open(archive).expect("open")));
    tar.entries()
        .expect("entries")
        .map(|e| {
            e.expect("entry")
                .path()
                .expect("path")
                .to_string_lossy()
                .trim_end_matches('/')
                .to_string()
        })
        .collect()
}

fn summary(archive: &Path) -> serde_json::Value {
    let mut tar = tar::Archive::new(GzDecoder::new(File::open(archive).expect("open")));
    for entry in tar.entries().expect("entries") {
        let entry = entry.expect("entry");
        if entry.path().expect("path").to_string_lossy() == "results/summary.json" {
            return serde_json::from_reader(entry).expect("summary json");
        }
    }
    panic!("summary.json not archived");
}

#[test]
fn test_full_run_archives_everything_but_the_failed_unit() {
    let cluster = FakeCluster::new();

    cluster
        .command()
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Failed debug action on unit etcd/1, status failed",
        ))
        .stdout(predicate::str::contains("Results stored in"));

    let archive = cluster.archive();
    let names = entries(&archive);
    for expected in [
        "results/status.out",
        "results/debug-log.out",
        "results/controller-debug-log.out",
        "results/storage.err",
        "results/status-log-etcd-1.out",
        "results/debug/etcd/0/debug-id-etcd-0.tar.gz",
        "results/debug/kubernetes-master/0/debug-id-kubernetes-master-0.tar.gz",
        "results/debug/flannel/0/debug-id-flannel-0.tar.gz",
        "results/summary.json",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {expected} in {names:?}");
    }
    assert!(!names.iter().any(|n| n.starts_with("results/debug/etcd/1")));

    let summary = summary(&archive);
    assert_eq!(summary["deadline_expired"], false);
    let actions = summary["actions"].as_array().expect("actions");
    assert_eq!(actions.len(), 4);
    let failed: Vec<&serde_json::Value> = actions
        .iter()
        .filter(|a| a["outcome"] == "failed")
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["unit"], "etcd/1");
    let storage = summary["commands"]
        .as_array()
        .expect("commands")
        .iter()
        .find(|c| c["slug"] == "storage")
        .expect("storage command");
    assert_eq!(storage["exit_code"], 1);
}

#[test]
fn test_quiet_run_prints_only_the_archive_path() {
    let cluster = FakeCluster::new();

    let assert = cluster.command().arg("--quiet").assert().success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let archive = cluster.archive();
    assert_eq!(stdout.trim(), archive.display().to_string());
}
