/*!
 * End-to-end tests for init, add, push, pull, list and mirror
 *
 * Remote operations run against the in-process fakes in `common`, with a
 * temporary directory standing in for the remote host.
 */

mod common;

use common::{default_profiles, transport, FakeCopy, FakeShell};
use dss::error::DssError;
use dss::remote::{Direction, RemoteTransport};
use dss::sync::{Orchestrator, OutcomeKind, Workspace};
use dss_core_manifest::{Manifest, RemoteProfile};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const LEGACY_MANIFEST: &str = r#"version: '1.0'
datasets:
  old_run.csv:
    sha256: e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855
    size_bytes: 0
    size_human: 0B
    uploaded: '2023-01-01T00:00:00Z'
    description: First calibration run
    uuid: 5b1f0a7e-legacy-entry
remote@1:
  uname: archivist
  url: archive.example.org
  base_path: /srv/archive
  port: 22
"#;

fn init_workspace() -> (TempDir, Workspace) {
    dss::logging::init_test_logging();
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    workspace.init(&default_profiles(), None).unwrap();
    (dir, workspace)
}

fn manifest_text(workspace: &Workspace) -> String {
    fs::read_to_string(workspace.manifest_path()).unwrap()
}

fn remote_file(root: &Path, manifest: &Manifest, name: &str) -> std::path::PathBuf {
    let base = manifest.remotes["remote@1"].base_path.clone().unwrap();
    root.join(base.trim_start_matches('/'))
        .join(manifest.id().unwrap())
        .join(name)
}

#[test]
fn test_add_is_idempotent_and_detects_changes() {
    let (dir, workspace) = init_workspace();
    let file = dir.path().join("file1.txt");
    fs::write(&file, "X").unwrap();

    let first = workspace.add(&["file1.txt"]).unwrap();
    assert_eq!(first.added, vec!["file1.txt"]);
    assert!(first.saved);

    let mut manifest = workspace.load().unwrap();
    manifest.datasets["file1.txt"].description = "hand written note".to_string();
    workspace.save(&manifest).unwrap();
    let before = manifest_text(&workspace);
    let original = manifest.datasets["file1.txt"].clone();

    let second = workspace.add(&["file1.txt"]).unwrap();
    assert_eq!(second.unchanged, vec!["file1.txt"]);
    assert!(!second.saved);
    assert_eq!(manifest_text(&workspace), before);

    std::thread::sleep(std::time::Duration::from_millis(5));
    fs::write(&file, "Y and more").unwrap();
    let third = workspace.add(&["file1.txt"]).unwrap();
    assert_eq!(third.updated, vec!["file1.txt"]);

    let entry = &workspace.load().unwrap().datasets["file1.txt"];
    assert_ne!(entry.digest, original.digest);
    assert_ne!(entry.recorded_at, original.recorded_at);
    assert_eq!(entry.size_bytes, 10);
    assert_eq!(entry.description, "hand written note");
}

#[test]
fn test_add_rejections_are_reported() {
    let (dir, workspace) = init_workspace();
    fs::write(dir.path().join("data.bin"), [0u8, 1, 2]).unwrap();
    fs::write(dir.path().join(".env"), "SECRET=1").unwrap();
    fs::create_dir(dir.path().join("raw")).unwrap();

    let report = workspace
        .add(&["data.bin", ".env", "raw", "manifest.yml", "ghost.bin"])
        .unwrap();

    assert_eq!(report.added, vec!["data.bin"]);
    let reasons: Vec<_> = report
        .rejected
        .iter()
        .map(|r| r.reason.as_str())
        .collect();
    assert_eq!(reasons, vec!["hidden", "is_directory", "is_manifest", "not_found"]);
}

#[test]
fn test_legacy_manifest_gets_id_exactly_once() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    fs::write(workspace.manifest_path(), LEGACY_MANIFEST).unwrap();
    fs::write(dir.path().join("new_run.csv"), "t,v\n0,1\n").unwrap();

    let report = workspace.add(&["new_run.csv"]).unwrap();
    assert!(report.id_generated);

    let manifest = workspace.load().unwrap();
    let id = manifest.id().unwrap().to_string();
    let legacy = &manifest.datasets["old_run.csv"];
    assert_eq!(
        legacy.fields.get("uuid").and_then(|v| v.as_str()),
        Some("5b1f0a7e-legacy-entry")
    );
    assert_eq!(legacy.description, "First calibration run");

    let text = manifest_text(&workspace);
    assert!(text.contains("manifest_id:"));
    assert!(text.contains("digest: e3b0c442"));
    assert!(!text.contains("manifest_uuid"));

    let again = workspace.add(&["new_run.csv"]).unwrap();
    assert!(!again.id_generated);
    assert!(!again.saved);
    assert_eq!(workspace.load().unwrap().id(), Some(id.as_str()));
}

#[test]
fn test_push_records_remote_paths() {
    let (dir, workspace) = init_workspace();
    let remote_root = TempDir::new().unwrap();
    fs::write(dir.path().join("a.csv"), "a").unwrap();
    fs::write(dir.path().join("b.csv"), "b").unwrap();
    workspace.add(&["a.csv", "b.csv"]).unwrap();

    let transport = transport(remote_root.path());
    let report = Orchestrator::new(&workspace, &transport)
        .push("1", &[])
        .unwrap();

    assert_eq!(report.summary().transferred, 2);
    assert!(report.saved);

    let manifest = workspace.load().unwrap();
    let id = manifest.id().unwrap().to_string();
    for name in ["a.csv", "b.csv"] {
        assert_eq!(
            manifest.datasets[name].remote_path("remote@1"),
            Some(format!("{}/{}", id, name).as_str())
        );
        assert!(remote_file(remote_root.path(), &manifest, name).exists());
    }
    assert!(transport.shell().commands.borrow()[0].starts_with("mkdir -p '/srv/archive/"));
}

#[test]
fn test_push_directory_failure_is_per_file() {
    let (dir, workspace) = init_workspace();
    let remote_root = TempDir::new().unwrap();
    fs::write(dir.path().join("first.bin"), "1").unwrap();
    fs::write(dir.path().join("second.bin"), "2").unwrap();
    workspace.add(&["first.bin", "second.bin"]).unwrap();

    let transport = RemoteTransport::new(
        FakeShell::failing_mkdir(remote_root.path(), 1),
        FakeCopy::new(remote_root.path()),
    );
    let report = Orchestrator::new(&workspace, &transport)
        .push("1", &[])
        .unwrap();

    let kinds: Vec<_> = report.outcomes.iter().map(|o| o.kind).collect();
    assert_eq!(kinds, vec![OutcomeKind::RemoteDirFailed, OutcomeKind::Pushed]);
    assert!(report.outcomes[0]
        .detail
        .as_deref()
        .unwrap()
        .contains("Network is unreachable"));
    assert_eq!(report.summary().failed, 1);
    assert_eq!(transport.copier().requests.borrow().len(), 1);

    let manifest = workspace.load().unwrap();
    assert_eq!(manifest.datasets["first.bin"].remote_path("remote@1"), None);
    assert!(manifest.datasets["second.bin"].remote_path("remote@1").is_some());
}

#[test]
fn test_push_local_missing_and_transfer_failure() {
    let (dir, workspace) = init_workspace();
    let remote_root = TempDir::new().unwrap();
    fs::write(dir.path().join("kept.bin"), "k").unwrap();
    fs::write(dir.path().join("gone.bin"), "g").unwrap();
    fs::write(dir.path().join("flaky.bin"), "f").unwrap();
    workspace.add(&["kept.bin", "gone.bin", "flaky.bin"]).unwrap();
    fs::remove_file(dir.path().join("gone.bin")).unwrap();

    let mut copier = FakeCopy::new(remote_root.path());
    copier.failing.push("flaky.bin".to_string());
    let transport = RemoteTransport::new(FakeShell::new(remote_root.path()), copier);

    let names = vec![
        "kept.bin".to_string(),
        "gone.bin".to_string(),
        "flaky.bin".to_string(),
        "untracked.bin".to_string(),
    ];
    let report = Orchestrator::new(&workspace, &transport)
        .push("1", &names)
        .unwrap();

    let kinds: Vec<_> = report.outcomes.iter().map(|o| o.kind).collect();
    assert_eq!(
        kinds,
        vec![
            OutcomeKind::Pushed,
            OutcomeKind::LocalMissing,
            OutcomeKind::TransferFailed,
        ]
    );
    assert_eq!(report.warnings, vec!["untracked.bin"]);
    assert!(report.outcomes[2].detail.as_deref().unwrap().contains("code 23"));
}

#[test]
fn test_pull_verifies_and_flags_mismatch() {
    let (dir, workspace) = init_workspace();
    let remote_root = TempDir::new().unwrap();
    fs::write(dir.path().join("good.dat"), "good bytes").unwrap();
    fs::write(dir.path().join("bad.dat"), "original bytes").unwrap();
    workspace.add(&["good.dat", "bad.dat"]).unwrap();

    let transport = transport(remote_root.path());
    let orchestrator = Orchestrator::new(&workspace, &transport);
    orchestrator.push("1", &[]).unwrap();

    let mut manifest = workspace.load().unwrap();
    fs::write(remote_file(remote_root.path(), &manifest, "bad.dat"), "tampered").unwrap();
    fs::remove_file(dir.path().join("good.dat")).unwrap();
    fs::remove_file(dir.path().join("bad.dat")).unwrap();
    for entry in manifest.datasets.values_mut() {
        entry.fields.shift_remove("remote@1");
    }
    workspace.save(&manifest).unwrap();

    let report = orchestrator.pull("1", &[]).unwrap();

    let kinds: Vec<_> = report.outcomes.iter().map(|o| o.kind).collect();
    assert_eq!(kinds, vec![OutcomeKind::Verified, OutcomeKind::IntegrityMismatch]);
    assert_eq!(fs::read_to_string(dir.path().join("bad.dat")).unwrap(), "tampered");

    let manifest = workspace.load().unwrap();
    let id = manifest.id().unwrap();
    assert_eq!(
        manifest.datasets["bad.dat"].remote_path("remote@1"),
        Some(format!("{}/bad.dat", id).as_str())
    );
    assert!(manifest.datasets["good.dat"].remote_path("remote@1").is_some());
    assert_eq!(report.summary().integrity_mismatch, 1);
}

#[test]
fn test_pull_missing_and_unknown_remote_state() {
    let (dir, workspace) = init_workspace();
    let remote_root = TempDir::new().unwrap();
    fs::write(dir.path().join("never_pushed.dat"), "n").unwrap();
    workspace.add(&["never_pushed.dat"]).unwrap();
    let before = manifest_text(&workspace);

    let transport = transport(remote_root.path());
    let report = Orchestrator::new(&workspace, &transport)
        .pull("1", &[])
        .unwrap();
    assert_eq!(report.outcomes[0].kind, OutcomeKind::RemoteMissing);
    assert!(!report.saved);
    assert_eq!(manifest_text(&workspace), before);

    let mut shell = FakeShell::new(remote_root.path());
    shell.probe_status = Some(255);
    let transport = RemoteTransport::new(shell, FakeCopy::new(remote_root.path()));
    let report = Orchestrator::new(&workspace, &transport)
        .pull("1", &[])
        .unwrap();
    assert_eq!(report.outcomes[0].kind, OutcomeKind::RemoteCheckFailed);
    assert!(report.outcomes[0]
        .detail
        .as_deref()
        .unwrap()
        .contains("Permission denied"));
    assert!(transport.copier().requests.borrow().is_empty());
}

#[test]
fn test_structural_failures_leave_manifest_untouched() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    let remote_root = TempDir::new().unwrap();
    let transport = transport(remote_root.path());
    let orchestrator = Orchestrator::new(&workspace, &transport);

    assert!(matches!(
        orchestrator.push("1", &[]),
        Err(DssError::ManifestNotFound(_))
    ));

    fs::write(workspace.manifest_path(), LEGACY_MANIFEST).unwrap();
    assert!(matches!(
        orchestrator.push("2", &[]),
        Err(DssError::RemoteNotConfigured(key)) if key == "remote@2"
    ));
    assert!(matches!(
        orchestrator.pull("1", &[]),
        Err(DssError::MissingManifestId)
    ));
    assert!(matches!(orchestrator.list("1"), Err(DssError::MissingManifestId)));
    assert!(matches!(
        orchestrator.push("1", &["nothing.csv".to_string()]),
        Err(DssError::NoFilesSelected)
    ));

    let mut manifest = Manifest::from_yaml(LEGACY_MANIFEST).unwrap();
    manifest.remotes.insert(
        "remote@3".to_string(),
        RemoteProfile {
            user: Some("archivist".to_string()),
            host: Some("archive.example.org".to_string()),
            ..Default::default()
        },
    );
    workspace.save(&manifest).unwrap();
    let before = manifest_text(&workspace);
    assert!(matches!(
        orchestrator.push("3", &[]),
        Err(DssError::RemoteIncomplete { field, .. }) if field == "base_path"
    ));
    assert_eq!(manifest_text(&workspace), before);
    assert!(transport.shell().commands.borrow().is_empty());
}

#[test]
fn test_push_backfills_legacy_id() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    fs::write(workspace.manifest_path(), LEGACY_MANIFEST).unwrap();
    fs::write(dir.path().join("old_run.csv"), "").unwrap();
    let remote_root = TempDir::new().unwrap();
    let transport = transport(remote_root.path());

    let report = Orchestrator::new(&workspace, &transport)
        .push("1", &[])
        .unwrap();
    assert!(report.id_generated);
    assert_eq!(report.outcomes[0].kind, OutcomeKind::Pushed);

    let manifest = workspace.load().unwrap();
    assert_eq!(manifest.id(), Some(report.manifest_id.as_str()));
    assert!(remote_root
        .path()
        .join("srv/archive")
        .join(&report.manifest_id)
        .join("old_run.csv")
        .exists());
}

#[test]
fn test_list_shows_remote_directory() {
    let (dir, workspace) = init_workspace();
    let remote_root = TempDir::new().unwrap();
    fs::write(dir.path().join("a.csv"), "a").unwrap();
    workspace.add(&["a.csv"]).unwrap();
    let transport = transport(remote_root.path());
    let orchestrator = Orchestrator::new(&workspace, &transport);

    assert!(matches!(
        orchestrator.list("1"),
        Err(DssError::Remote { stderr, .. }) if stderr.contains("No such file")
    ));

    orchestrator.push("1", &[]).unwrap();
    let output = orchestrator.list("1").unwrap();
    assert_eq!(output.stdout, "a.csv\n");
}

#[test]
fn test_mirror_round_trip_and_gitignore() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    workspace.init(&default_profiles(), Some("raw")).unwrap();
    let staging = dir.path().join("raw");
    fs::create_dir(&staging).unwrap();
    fs::write(staging.join("scan_01.tif"), "pixels").unwrap();
    fs::write(staging.join(".DS_Store"), "junk").unwrap();
    let before = manifest_text(&workspace);

    let remote_root = TempDir::new().unwrap();
    let transport = transport(remote_root.path());
    let orchestrator = Orchestrator::new(&workspace, &transport);
    orchestrator.mirror("1", Direction::Push, None).unwrap();

    let manifest = workspace.load().unwrap();
    let base = manifest.remotes["remote@1"].base_path.clone().unwrap();
    let remote_dir = remote_root.path().join(base.trim_start_matches('/'));
    assert!(remote_dir.join("scan_01.tif").exists());
    assert!(!remote_dir.join(".DS_Store").exists());
    assert_eq!(
        fs::read_to_string(dir.path().join(".gitignore")).unwrap(),
        "raw\n"
    );

    fs::remove_dir_all(&staging).unwrap();
    orchestrator.mirror("1", Direction::Pull, None).unwrap();
    assert_eq!(fs::read_to_string(staging.join("scan_01.tif")).unwrap(), "pixels");
    assert_eq!(manifest_text(&workspace), before);
}

#[test]
fn test_mirror_requires_staging_path() {
    let (_dir, workspace) = init_workspace();
    let remote_root = TempDir::new().unwrap();
    let transport = transport(remote_root.path());

    assert!(matches!(
        Orchestrator::new(&workspace, &transport).mirror("1", Direction::Push, None),
        Err(DssError::NoStagingPath(key)) if key == "remote@1"
    ));
}

#[test]
fn test_push_ignores_staging_path() {
    let dir = TempDir::new().unwrap();
    let workspace = Workspace::new(dir.path());
    workspace.init(&default_profiles(), Some("staging")).unwrap();
    fs::write(dir.path().join(".gitignore"), "target/\n").unwrap();
    fs::write(dir.path().join("x.bin"), "x").unwrap();
    workspace.add(&["x.bin"]).unwrap();

    let remote_root = TempDir::new().unwrap();
    let transport = transport(remote_root.path());
    Orchestrator::new(&workspace, &transport)
        .push("1", &[])
        .unwrap();

    assert_eq!(
        fs::read_to_string(dir.path().join(".gitignore")).unwrap(),
        "target/\nstaging\n"
    );
}

#[test]
fn test_status_is_read_only() {
    let (dir, workspace) = init_workspace();
    fs::write(dir.path().join("a.csv"), "a").unwrap();
    fs::write(dir.path().join("b.csv"), "b").unwrap();
    workspace.add(&["a.csv", "b.csv"]).unwrap();
    fs::write(dir.path().join("b.csv"), "b changed").unwrap();
    let before = manifest_text(&workspace);

    let report = workspace.status().unwrap();
    let states: Vec<_> = report
        .datasets
        .iter()
        .map(|d| d.state.to_string())
        .collect();
    assert_eq!(states, vec!["unchanged", "modified"]);
    assert_eq!(report.remotes, vec!["remote@1"]);
    assert_eq!(manifest_text(&workspace), before);
}

#[test]
fn test_pull_skips_names_that_leave_the_directory() {
    let outer = TempDir::new().unwrap();
    let tracked = outer.path().join("tracked");
    fs::create_dir(&tracked).unwrap();
    let workspace = Workspace::new(&tracked);
    workspace.init(&default_profiles(), None).unwrap();
    fs::write(tracked.join("good.csv"), "g").unwrap();
    workspace.add(&["good.csv"]).unwrap();

    let remote_root = TempDir::new().unwrap();
    let transport = transport(remote_root.path());
    let orchestrator = Orchestrator::new(&workspace, &transport);
    orchestrator.push("1", &[]).unwrap();

    let mut manifest = workspace.load().unwrap();
    let entry = manifest.datasets["good.csv"].clone();
    manifest
        .datasets
        .insert("../escaped.txt".to_string(), entry.clone());
    manifest.datasets.insert("sub/nested.txt".to_string(), entry);
    workspace.save(&manifest).unwrap();

    let remote_dir = remote_file(remote_root.path(), &manifest, "good.csv")
        .parent()
        .unwrap()
        .to_path_buf();
    fs::write(remote_dir.join("../escaped.txt"), "g").unwrap();

    let report = orchestrator.pull("1", &[]).unwrap();
    let names: Vec<_> = report.outcomes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["good.csv"]);
    assert_eq!(report.outcomes[0].kind, OutcomeKind::Verified);
    assert_eq!(report.warnings, vec!["../escaped.txt", "sub/nested.txt"]);
    assert!(!outer.path().join("escaped.txt").exists());

    let report = orchestrator.push("1", &[]).unwrap();
    assert_eq!(report.outcomes.len(), 1);
    assert!(transport
        .copier()
        .requests
        .borrow()
        .iter()
        .all(|r| !r.remote_path.contains("..")));
}

#[test]
fn test_push_treats_directory_as_missing() {
    let (dir, workspace) = init_workspace();
    let remote_root = TempDir::new().unwrap();
    fs::write(dir.path().join("scan.dat"), "s").unwrap();
    fs::write(dir.path().join("keep.dat"), "k").unwrap();
    workspace.add(&["scan.dat", "keep.dat"]).unwrap();
    fs::remove_file(dir.path().join("scan.dat")).unwrap();
    fs::create_dir(dir.path().join("scan.dat")).unwrap();
    fs::write(dir.path().join("scan.dat").join("inner.bin"), "i").unwrap();

    let transport = transport(remote_root.path());
    let report = Orchestrator::new(&workspace, &transport)
        .push("1", &[])
        .unwrap();

    let kinds: Vec<_> = report.outcomes.iter().map(|o| o.kind).collect();
    assert_eq!(kinds, vec![OutcomeKind::LocalMissing, OutcomeKind::Pushed]);
    assert_eq!(transport.copier().requests.borrow().len(), 1);
    let manifest = workspace.load().unwrap();
    assert_eq!(manifest.datasets["scan.dat"].remote_path("remote@1"), None);
}
