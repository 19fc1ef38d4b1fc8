//! Integration tests for memorizer

mod store_tests {
    use memorizer::{FnIdentity, MemoStore};
    use serial_test::serial;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn add_scenario_across_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let calls = AtomicUsize::new(0);
        let add = |(a, b): (i64, i64)| {
            calls.fetch_add(1, Ordering::SeqCst);
            a + b
        };

        let store = Arc::new(MemoStore::load(&path));
        let memo = store.memoize(FnIdentity::with_source("add", "a + b"), &add);
        assert_eq!(memo.call((1, 2)).unwrap(), 3);
        assert_eq!(memo.call((1, 2)).unwrap(), 3);
        assert_eq!(memo.call((1, 3)).unwrap(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        store.save().unwrap();

        let store = Arc::new(MemoStore::load(&path));
        assert_eq!(store.len(), 2);
        let memo = store.memoize(FnIdentity::with_source("add", "a + b"), &add);
        assert_eq!(memo.call((1, 3)).unwrap(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn corrupt_state_starts_empty_and_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{\"truncated\": ").unwrap();

        let store = Arc::new(MemoStore::load(&path));
        assert!(store.is_empty());

        let memo = store.memoize(FnIdentity::opaque("len"), |s: String| s.len());
        assert_eq!(memo.call("four".to_string()).unwrap(), 4);
        store.save().unwrap();

        assert_eq!(MemoStore::load(&path).len(), 1);
    }

    #[test]
    #[serial]
    fn default_state_file_in_working_directory() {
        let dir = TempDir::new().unwrap();
        let previous = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();

        let store = Arc::new(MemoStore::from_config(&Default::default()));
        let memo = store.memoize(FnIdentity::opaque("neg"), |x: i32| -x);
        memo.call(5).unwrap();
        let saved = store.save();

        std::env::set_current_dir(previous).unwrap();
        saved.unwrap();

        let content = std::fs::read_to_string(dir.path().join("state.json")).unwrap();
        assert!(content.contains("-5"));
    }
}

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use memorizer::{FnIdentity, MemoStore};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn memorizer(dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("memorizer");
        cmd.current_dir(dir)
            .env_remove("MEMORIZER_CONFIG")
            .args(["--no-local", "--config"])
            .arg(dir.join("config.toml"));
        cmd
    }

    /// Write a state file holding add(1, 2) and add(1, 3)
    fn seeded_state(dir: &Path) -> (PathBuf, String) {
        let path = dir.join("state.json");
        let store = Arc::new(MemoStore::load(&path));
        let add = store.memoize(
            FnIdentity::with_source("add", "a + b"),
            |(a, b): (i64, i64)| a + b,
        );
        add.call((1, 2)).unwrap();
        add.call((1, 3)).unwrap();
        store.save().unwrap();

        let first = store.entries().into_keys().next().unwrap();
        (path, first)
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        memorizer(dir.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("memoization"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        memorizer(dir.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("memorizer"));
    }

    #[test]
    fn stats_without_state_file() {
        let dir = TempDir::new().unwrap();
        memorizer(dir.path())
            .arg("stats")
            .assert()
            .success()
            .stdout(predicate::str::contains("No state file yet"));
    }

    #[test]
    fn stats_counts_entries() {
        let dir = TempDir::new().unwrap();
        seeded_state(dir.path());

        memorizer(dir.path())
            .arg("stats")
            .assert()
            .success()
            .stdout(predicate::str::contains("Entries: 2"))
            .stdout(predicate::str::contains("2 number"));
    }

    #[test]
    fn list_empty() {
        let dir = TempDir::new().unwrap();
        memorizer(dir.path())
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached entries"));
    }

    #[test]
    fn list_plain_prints_fingerprints() {
        let dir = TempDir::new().unwrap();
        let (_, first) = seeded_state(dir.path());

        memorizer(dir.path())
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains(first));
    }

    #[test]
    fn list_json_is_parseable() {
        let dir = TempDir::new().unwrap();
        seeded_state(dir.path());

        let output = memorizer(dir.path())
            .args(["list", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["kind"], "number");
    }

    #[test]
    fn show_by_prefix() {
        let dir = TempDir::new().unwrap();
        let (path, first) = seeded_state(dir.path());
        let expected = MemoStore::load(&path).entries()[&first].to_string();

        memorizer(dir.path())
            .args(["show", &first[..10]])
            .assert()
            .success()
            .stdout(predicate::str::contains(expected));
    }

    #[test]
    fn show_missing_entry() {
        let dir = TempDir::new().unwrap();
        seeded_state(dir.path());

        memorizer(dir.path())
            .args(["show", "zzzz"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No cache entry matches"));
    }

    #[test]
    fn verify_valid_state() {
        let dir = TempDir::new().unwrap();
        seeded_state(dir.path());

        memorizer(dir.path())
            .arg("verify")
            .assert()
            .success()
            .stdout(predicate::str::contains("State file is valid"));
    }

    #[test]
    fn verify_corrupt_state() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("state.json"), "not json").unwrap();

        memorizer(dir.path())
            .arg("verify")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid state file"));
    }

    #[test]
    fn state_flag_overrides_path() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("elsewhere");
        std::fs::create_dir(&nested).unwrap();
        seeded_state(&nested);

        memorizer(dir.path())
            .args(["stats", "--state"])
            .arg(nested.join("state.json"))
            .assert()
            .success()
            .stdout(predicate::str::contains("Entries: 2"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        memorizer(dir.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let dir = TempDir::new().unwrap();
        memorizer(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[store]"));
    }

    #[test]
    fn config_init_writes_file() {
        let dir = TempDir::new().unwrap();
        memorizer(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));

        assert!(dir.path().join("config.toml").exists());
    }
}
