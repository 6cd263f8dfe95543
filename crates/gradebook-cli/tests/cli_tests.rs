//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const DATA: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/donnees_eleves.csv");
const ALIAS_DATA: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../data/donnees_eleves_alias.csv"
);

/// A scratch directory holding a config, a copy of the data file, and room
/// for users, exports and the cache.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self::with_data(DATA, ",")
    }

    fn with_data(source: &str, delimiter: &str) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::copy(source, dir.path().join("eleves.csv")).unwrap();
        let config = format!(
            r#"data_path = "eleves.csv"
delimiter = "{delimiter}"
users_file = "utilisateurs.json"
output_dir = "sortie"

[cache]
backend = "file"
dir = "cache"
ttl_secs = 600
"#
        );
        std::fs::write(dir.path().join("gradebook.toml"), config).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = gradebook();
        cmd.current_dir(self.path())
            .env_remove("GRADEBOOK_CACHE_TTL")
            .env_remove("GRADEBOOK_USERS_FILE")
            .env_remove("GRADEBOOK_CACHE_BACKEND");
        cmd
    }

    fn add_user(&self, name: &str, role: &str, login: Option<(&str, &str)>) {
        let mut cmd = self.cmd();
        if let Some((user, password)) = login {
            cmd.args(["--user", user, "--password", password]);
        }
        cmd.args(["users", "add", "--username", name, "--new-password", "pw", "--role", role])
            .assert()
            .success();
    }

    /// Creates `admin` first, then `prof` (teacher) and `eleve` (user).
    fn with_users(self) -> Self {
        self.add_user("admin", "admin", None);
        self.add_user("prof", "teacher", Some(("admin", "pw")));
        self.add_user("eleve", "user", Some(("admin", "pw")));
        self
    }
}

fn gradebook() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("gradebook").unwrap()
}

#[test]
fn help_output() {
    gradebook()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Validate, normalize and query student records"));
}

#[test]
fn version_output() {
    gradebook()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gradebook"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    gradebook()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created gradebook.toml"))
        .stdout(predicate::str::contains("Created donnees_eleves.csv"));

    assert!(dir.path().join("gradebook.toml").exists());
    assert!(dir.path().join("donnees_eleves.csv").exists());

    // The starter files work together.
    gradebook()
        .current_dir(dir.path())
        .env("GRADEBOOK_CACHE_BACKEND", "none")
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 rows, 2 accepted, 2 rejected"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    gradebook().current_dir(dir.path()).arg("init").assert().success();

    gradebook()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_splits_rows() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("8 rows, 4 accepted, 4 rejected"))
        .stdout(predicate::str::contains("Date invalide"))
        .stdout(predicate::str::contains("Numero invalide"))
        .stdout(predicate::str::contains("Notes invalides"))
        .stdout(predicate::str::contains("Prenom invalide"));
}

#[test]
fn validate_show_valid_prints_normalized_rows() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["validate", "--show-valid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("15/04/2002"))
        .stdout(predicate::str::contains("3emB"))
        .stdout(predicate::str::contains("4iemA").not());
}

#[test]
fn validate_alias_headers_and_delimiter() {
    let ws = Workspace::with_data(ALIAS_DATA, ";");
    ws.cmd()
        .args(["validate", "--show-valid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 rows, 1 accepted, 1 rejected"))
        .stdout(predicate::str::contains("03/09/2004"))
        .stdout(predicate::str::contains("5emB"));
}

#[test]
fn validate_nonexistent_file() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["validate", "--input", "absent.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("failed to open data file"));
}

#[test]
fn show_reports_status() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["show", "--numero", "AB12345"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: accepted"))
        .stdout(predicate::str::contains("4emA"));

    ws.cmd()
        .args(["show", "--numero", "AB12348"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: rejected (Date invalide)"));

    ws.cmd()
        .args(["show", "--numero", "ZZ99999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no row with numero 'ZZ99999'"));
}

#[test]
fn add_places_new_rows() {
    let ws = Workspace::new();
    ws.cmd()
        .args([
            "add", "--numero", "AB20000", "--nom", "Kane", "--prenom", "Binta", "--date",
            "2004-02-29", "--classe", "6 iem b", "--note", "Math[12:14]",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Accepted."))
        .stdout(predicate::str::contains("29/02/2004"))
        .stdout(predicate::str::contains("5 accepted, 4 rejected"));

    ws.cmd()
        .args([
            "add", "--numero", "AB20001", "--nom", "Kane", "--prenom", "Binta", "--date",
            "2003-02-29", "--classe", "7emA", "--note", "Math[12:14]",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rejected: Date invalide, Classe invalide"))
        .stdout(predicate::str::contains("4 accepted, 5 rejected"));
}

#[test]
fn search_by_name_and_class() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["search", "--name", "diallo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AB12345"))
        .stdout(predicate::str::contains("AB12351"))
        .stdout(predicate::str::contains("AB12347").not());

    ws.cmd()
        .args(["search", "--class", "4ema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AB12345"))
        .stdout(predicate::str::contains("AB12347"))
        .stdout(predicate::str::contains("AB12350").not());
}

#[test]
fn search_requires_a_query() {
    let ws = Workspace::new();
    ws.cmd().arg("search").assert().failure();
}

#[test]
fn sort_by_average_defaults_to_best_first() {
    let ws = Workspace::new();
    let output = ws.cmd().args(["sort", "--by", "average"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let order: Vec<usize> = ["AB12347", "AB12346", "AB12345", "AB12351"]
        .iter()
        .map(|numero| stdout.find(numero).unwrap())
        .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]), "{stdout}");
    assert!(stdout.contains("17.25"));
}

#[test]
fn sort_by_name_with_limit() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["sort", "--by", "name", "--order", "desc", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sow"))
        .stdout(predicate::str::contains("Diallo").not());
}

#[test]
fn stats_summarizes_registry() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total students: 8"))
        .stdout(predicate::str::contains("Valid: 4"))
        .stdout(predicate::str::contains("Invalid: 4"))
        .stdout(predicate::str::contains("3emB"))
        .stdout(predicate::str::contains("Francais"));
}

#[test]
fn stats_uses_file_cache() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("stats")
        .assert()
        .success()
        .stderr(predicate::str::contains("cache miss"));

    let cached = std::fs::read_dir(ws.join("cache")).unwrap().count();
    assert_eq!(cached, 1);

    ws.cmd()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total students: 8"))
        .stderr(predicate::str::contains("cache hit"));
}

#[test]
fn correct_requires_login() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["correct", "--numero", "AB12348", "--date", "28/02/2003"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs --user and --password"));
}

#[test]
fn correct_promotes_fixed_row() {
    let ws = Workspace::new().with_users();
    let accepted_out = ws.join("valides.csv");

    ws.cmd()
        .args(["--user", "prof", "--password", "pw"])
        .args(["correct", "--numero", "AB12348", "--date", "28/02/2003", "--accepted-out"])
        .arg(&accepted_out)
        .assert()
        .success()
        .stdout(predicate::str::contains("AB12348: corrected and accepted."))
        .stdout(predicate::str::contains("5 accepted, 3 rejected"));

    let content = std::fs::read_to_string(&accepted_out).unwrap();
    assert!(content.contains("AB12348,Ndiaye,Moussa,28/02/2003,6emB"));
}

#[test]
fn correct_reports_remaining_errors() {
    let ws = Workspace::new().with_users();
    let rejected_out = ws.join("rejets.csv");

    ws.cmd()
        .args(["--user", "admin", "--password", "pw"])
        .args(["correct", "--numero", "ab12349", "--classe", "9emZ", "--rejected-out"])
        .arg(&rejected_out)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ab12349: still rejected (Numero invalide, Classe invalide)",
        ));

    let content = std::fs::read_to_string(&rejected_out).unwrap();
    assert!(content.contains("Erreurs"));
    assert_eq!(content.lines().count(), 5);
}

#[test]
fn correct_unknown_numero_fails() {
    let ws = Workspace::new().with_users();
    ws.cmd()
        .args(["--user", "admin", "--password", "pw"])
        .args(["correct", "--numero", "ZZ99999", "--nom", "Ba"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ZZ99999"));
}

#[test]
fn plain_user_cannot_correct() {
    let ws = Workspace::new().with_users();
    ws.cmd()
        .args(["--user", "eleve", "--password", "pw"])
        .args(["correct", "--numero", "AB12348", "--date", "28/02/2003"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lacks the 'write' permission"));
}

#[test]
fn wrong_password_is_rejected() {
    let ws = Workspace::new().with_users();
    ws.cmd()
        .args(["--user", "admin", "--password", "nope"])
        .args(["export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wrong password"));
}

#[test]
fn users_add_and_list() {
    let ws = Workspace::new();
    ws.add_user("admin", "admin", None);

    // Only the first account may be created without logging in.
    ws.cmd()
        .args(["users", "add", "--username", "x", "--new-password", "pw"])
        .assert()
        .failure();

    ws.add_user("prof", "enseignant", Some(("admin", "pw")));

    ws.cmd()
        .args(["users", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("admin"))
        .stdout(predicate::str::contains("teacher"));

    let stored = std::fs::read_to_string(ws.join("utilisateurs.json")).unwrap();
    assert!(!stored.contains("\"pw\""));
}

#[test]
fn teacher_cannot_add_users() {
    let ws = Workspace::new().with_users();
    ws.cmd()
        .args(["--user", "prof", "--password", "pw"])
        .args(["users", "add", "--username", "x", "--new-password", "pw"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only an admin"));
}

#[test]
fn export_then_import() {
    let ws = Workspace::new().with_users();
    ws.cmd()
        .args(["--user", "admin", "--password", "pw", "export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("eleves_valides.csv (4 students)"))
        .stdout(predicate::str::contains("eleves_rejetes.csv (4 students)"));

    let json_path = ws.join("sortie/eleves_valides.json");
    let students: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(students.as_array().unwrap().len(), 4);

    let rejected = std::fs::read_to_string(ws.join("sortie/eleves_rejetes.csv")).unwrap();
    assert!(rejected.contains("Date invalide"));

    ws.cmd()
        .args(["--user", "admin", "--password", "pw", "import", "--json"])
        .arg(&json_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 4 students"))
        .stdout(predicate::str::contains("Valid: 4"));
}

#[test]
fn rejected_export_keeps_source_cells_across_cache_hits() {
    let ws = Workspace::new().with_users();
    for _ in 0..2 {
        ws.cmd()
            .args(["--user", "admin", "--password", "pw", "export", "--format", "csv"])
            .assert()
            .success()
            .stdout(predicate::str::contains("eleves_rejetes.csv (4 students)"));

        let rejected = std::fs::read_to_string(ws.join("sortie/eleves_rejetes.csv")).unwrap();
        assert!(rejected.contains("Math[10:11"));
        assert!(rejected.contains("31/02/2003"));
        assert!(rejected.contains("ab12349"));
    }
}

#[test]
fn export_single_format_to_custom_dir() {
    let ws = Workspace::new().with_users();
    ws.cmd()
        .args(["--user", "admin", "--password", "pw", "export", "--format", "json", "--output"])
        .arg(ws.join("ailleurs"))
        .assert()
        .success();

    assert!(ws.join("ailleurs/eleves_valides.json").exists());
    assert!(!ws.join("ailleurs/eleves_valides.csv").exists());
}

#[test]
fn teacher_cannot_export() {
    let ws = Workspace::new().with_users();
    ws.cmd()
        .args(["--user", "prof", "--password", "pw", "export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lacks the 'export' permission"));
}

#[test]
fn report_for_student_and_class() {
    let ws = Workspace::new();
    let student_page = ws.join("rapports/eleve.html");
    ws.cmd()
        .args(["report", "--numero", "AB12345", "--out"])
        .arg(&student_page)
        .assert()
        .success();
    let html = std::fs::read_to_string(&student_page).unwrap();
    assert!(html.contains("Diallo Awa"));
    assert!(html.contains("Overall average: <strong>12.04</strong>"));

    let class_page = ws.join("rapports/classe.html");
    ws.cmd()
        .args(["report", "--class", "4emA", "--out"])
        .arg(&class_page)
        .assert()
        .success();
    let html = std::fs::read_to_string(&class_page).unwrap();
    assert!(html.contains("Class 4emA"));
    assert!(html.contains("Sow"));
}

#[test]
fn report_for_rejected_student_fails() {
    let ws = Workspace::new();
    let page = ws.join("rapports/rejete.html");
    ws.cmd()
        .args(["report", "--numero", "AB12348", "--out"])
        .arg(&page)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no accepted student with numero 'AB12348'"));
    assert!(!page.exists());
}

#[test]
fn report_for_empty_class_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["report", "--class", "6emB", "--out"])
        .arg(ws.join("vide.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no accepted students in class 6emB"));
}

#[test]
fn cache_clear_needs_delete_permission() {
    let ws = Workspace::new().with_users();
    ws.cmd().arg("stats").assert().success();

    ws.cmd()
        .args(["--user", "prof", "--password", "pw", "cache", "clear"])
        .assert()
        .failure();

    ws.cmd()
        .args(["--user", "admin", "--password", "pw", "cache", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 cache entry."));
}

#[test]
fn cache_clear_when_disabled() {
    let ws = Workspace::new().with_users();
    ws.cmd()
        .env("GRADEBOOK_CACHE_BACKEND", "none")
        .args(["--user", "admin", "--password", "pw", "cache", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache is disabled."));
}
