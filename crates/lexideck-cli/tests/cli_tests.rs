//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn lexideck() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("lexideck").unwrap()
}

/// A scratch directory with its own database and no user config.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = lexideck();
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("LEXIDECK_DB", self.dir.path().join("test.db"))
            .env_remove("LEXIDECK_SEED")
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> String {
        let output = self.cmd().args(args).output().unwrap();
        assert!(output.status.success(), "{args:?} failed: {output:?}");
        String::from_utf8(output.stdout).unwrap()
    }

    /// Deck 1 with two cards.
    fn seeded(self) -> Self {
        self.run(&["deck", "create", "Spanish"]);
        self.run(&["card", "add", "1", "perro", "dog"]);
        self.run(&["card", "add", "1", "gato", "cat"]);
        self
    }
}

#[test]
fn help_output() {
    lexideck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vocabulary flashcard trainer"));
}

#[test]
fn version_output() {
    lexideck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lexideck"));
}

#[test]
fn init_creates_config() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created lexideck.toml"));

    assert!(sandbox.dir.path().join("lexideck.toml").exists());
}

#[test]
fn init_skips_existing() {
    let sandbox = Sandbox::new();
    sandbox.cmd().arg("init").assert().success();

    sandbox
        .cmd()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn deck_list_shows_counts() {
    let sandbox = Sandbox::new().seeded();

    sandbox
        .cmd()
        .args(["deck", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Spanish"))
        .stdout(predicate::str::contains("2"));
}

#[test]
fn deck_rename_and_delete() {
    let sandbox = Sandbox::new().seeded();

    sandbox
        .cmd()
        .args(["deck", "rename", "1", "Español"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed deck 1 to Español"));

    sandbox.run(&["deck", "delete", "1"]);

    sandbox
        .cmd()
        .args(["deck", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No decks yet"));
}

#[test]
fn blank_deck_name_is_rejected() {
    Sandbox::new()
        .cmd()
        .args(["deck", "create", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("must not be blank"));
}

#[test]
fn card_list_and_edit() {
    let sandbox = Sandbox::new().seeded();

    sandbox
        .cmd()
        .args(["card", "edit", "2", "gata", "cat (female)"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["card", "list", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("perro"))
        .stdout(predicate::str::contains("gata"))
        .stdout(predicate::str::contains("never"));
}

#[test]
fn card_add_without_translation_fails() {
    let sandbox = Sandbox::new().seeded();

    sandbox
        .cmd()
        .args(["card", "add", "1", "casa"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing translation"));
}

#[test]
fn card_add_to_missing_deck_fails() {
    Sandbox::new()
        .cmd()
        .args(["card", "add", "9", "casa", "house"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("deck 9 not found"));
}

#[test]
fn lookup_failure_is_reported() {
    let sandbox = Sandbox::new().seeded();
    let config = sandbox.dir.path().join("offline.toml");
    std::fs::write(
        &config,
        "dictionary_base_url = \"http://127.0.0.1:9\"\ndictionary_timeout_secs = 2\n",
    )
    .unwrap();

    sandbox
        .cmd()
        .arg("--config")
        .arg(&config)
        .args(["card", "add", "1", "casa", "--lookup"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not look up 'casa'"));
}

#[test]
fn study_session_updates_stats() {
    let sandbox = Sandbox::new().seeded();

    sandbox
        .cmd()
        .env("LEXIDECK_SEED", "1")
        .args(["study", "1"])
        .write_stdin("\ny\n\nn\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Studied 2 card(s): 1 known, 50% accuracy"));

    let json = sandbox.run(&["stats", "1", "--format", "json"]);
    let stats: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(stats["total_cards"], 2);
    assert_eq!(stats["known_cards"], 1);
    assert_eq!(stats["buckets"]["today"], 2);
}

#[test]
fn study_missing_deck_fails() {
    Sandbox::new()
        .cmd()
        .args(["study", "99"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("deck 99 not found"));
}

#[test]
fn quiz_single_card_deck() {
    let sandbox = Sandbox::new();
    sandbox.run(&["deck", "create", "Tiny"]);
    sandbox.run(&["card", "add", "1", "uno", "one"]);

    sandbox
        .cmd()
        .args(["quiz", "1"])
        .write_stdin("1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. one"))
        .stdout(predicate::str::contains("Score: 1/1 (100%)"));
}

#[test]
fn quiz_on_empty_deck_fails() {
    let sandbox = Sandbox::new();
    sandbox.run(&["deck", "create", "Empty"]);

    sandbox
        .cmd()
        .args(["quiz", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("quiz unavailable"))
        .stderr(predicate::str::contains("no cards available for quiz"));
}

#[test]
fn stats_table_for_fresh_deck() {
    let sandbox = Sandbox::new().seeded();

    sandbox
        .cmd()
        .args(["stats", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Spanish (2 cards)"))
        .stdout(predicate::str::contains("Accuracy"))
        .stdout(predicate::str::contains("0.0%"));
}

#[test]
fn stats_rejects_unknown_format() {
    let sandbox = Sandbox::new().seeded();

    sandbox
        .cmd()
        .args(["stats", "1", "--format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format: yaml"));
}

#[test]
fn stats_markdown_report() {
    let sandbox = Sandbox::new().seeded();

    sandbox
        .cmd()
        .args(["stats", "1", "--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Spanish"))
        .stdout(predicate::str::contains("2 total, 0 known"));
}

#[test]
fn missing_config_file_fails() {
    Sandbox::new()
        .cmd()
        .args(["--config", "nope.toml", "deck", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}
