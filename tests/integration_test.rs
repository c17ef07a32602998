// tests/integration_test.rs
use git2::Repository;
use release_flow::cli::{InvocationOptions, Orchestrator, RunOutcome};
use release_flow::config::Config;
use release_flow::context::ReleaseContext;
use release_flow::git::{Git2Repository, VersionControl};
use release_flow::manifest::PackageJson;
use release_flow::ui::StaticPrompter;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const MANIFEST: &str = "{\n  \"name\": \"widget\",\n  \"version\": \"0.4.2\"\n}\n";

fn init_project(origin: Option<&str>) -> (TempDir, Git2Repository) {
    let dir = TempDir::new().unwrap();
    let raw = Repository::init(dir.path()).unwrap();
    let mut config = raw.config().unwrap();
    config.set_str("user.name", "Release Bot").unwrap();
    config.set_str("user.email", "bot@example.com").unwrap();
    if let Some(url) = origin {
        raw.remote("origin", url).unwrap();
    }
    let repo = Git2Repository::from_git2(raw);

    fs::write(dir.path().join("package.json"), MANIFEST).unwrap();
    repo.stage_all().unwrap();
    repo.commit("chore: init").unwrap();
    repo.create_annotated_tag("v0.4.2", "Release 0.4.2").unwrap();

    fs::write(dir.path().join("lib.txt"), "fixed").unwrap();
    repo.stage_all().unwrap();
    repo.commit("fix(core): handle empty input").unwrap();
    (dir, repo)
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[tokio::test]
async fn test_linear_dry_run_on_real_repository() {
    let (dir, repo) = init_project(None);
    let mut config = Config::default();
    config.git.require_remote = false;
    let options = InvocationOptions {
        dry_run: true,
        ci: true,
        ..InvocationOptions::default()
    };
    let ctx = ReleaseContext::new(dir.path(), config, options);
    let prompter = StaticPrompter::declining();

    let outcome = Orchestrator::new(&repo, &PackageJson, &prompter)
        .run(&ctx)
        .await
        .unwrap();
    let RunOutcome::Released(summary) = outcome else {
        panic!("expected a release");
    };
    assert_eq!(summary.version, "0.4.3");
    assert_eq!(ctx.changelog(), Some("- fix(core): handle empty input"));
    assert!(ctx.repository().is_none());

    assert_eq!(fs::read_to_string(dir.path().join("package.json")).unwrap(), MANIFEST);
    assert!(!dir.path().join("CHANGELOG.md").exists());
    assert!(!repo.tag_exists_locally("v0.4.3").unwrap());
    assert_eq!(repo.latest_tag().unwrap(), Some("v0.4.2".to_string()));
}

#[tokio::test]
async fn test_linear_release_to_local_remote() {
    if !git_available() {
        eprintln!("git CLI not available, skipping");
        return;
    }
    let remote_dir = TempDir::new().unwrap();
    Repository::init_bare(remote_dir.path()).unwrap();
    let (dir, repo) = init_project(remote_dir.path().to_str());

    let options = InvocationOptions {
        ci: true,
        ..InvocationOptions::default()
    };
    let ctx = ReleaseContext::new(dir.path(), Config::default(), options);
    let prompter = StaticPrompter::declining();

    let outcome = Orchestrator::new(&repo, &PackageJson, &prompter)
        .run(&ctx)
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Released(_)));

    assert!(repo.tag_exists_locally("v0.4.3").unwrap());
    assert!(repo.tag_exists_remotely("origin", "v0.4.3").unwrap());
    assert_eq!(
        repo.commits_since(Some("v0.4.2")).unwrap().last().map(String::as_str),
        Some("chore: release 0.4.3")
    );
    repo.ensure_clean_working_tree().unwrap();

    let manifest = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(manifest.contains("\"version\": \"0.4.3\""));
    let changelog = fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
    assert!(changelog.starts_with("## 0.4.3 ("));
}
