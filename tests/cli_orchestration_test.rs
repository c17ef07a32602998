// tests/cli_orchestration_test.rs
use release_flow::cli::{Args, InvocationOptions, Orchestrator, RunOutcome};
use release_flow::config::{Config, PluginRef, Resolver};
use release_flow::context::ReleaseContext;
use release_flow::git::{MockRepository, RecordedCall};
use release_flow::manifest::{ManifestStore, PackageJson};
use release_flow::plugins::PluginRegistry;
use release_flow::ui::StaticPrompter;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

const MANIFEST: &str = "{\n  \"name\": \"widget\",\n  \"version\": \"1.0.0\",\n  \"license\": \"MIT\"\n}\n";

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("package.json"), MANIFEST).unwrap();
    fs::write(dir.path().join("CHANGELOG.md"), "## 1.0.0\n\n- initial release\n").unwrap();
    dir
}

fn repo() -> MockRepository {
    MockRepository::new()
        .with_tag("v1.0.0")
        .with_commits(&["fix: a bug", "feat: new thing"])
}

fn linear() -> InvocationOptions {
    InvocationOptions {
        git_flow: false,
        ..InvocationOptions::default()
    }
}

#[tokio::test]
async fn test_suggested_minor_release_end_to_end() {
    let dir = project();
    let repo = repo();
    let prompter = StaticPrompter::accepting();
    let ctx = ReleaseContext::new(dir.path(), Config::default(), linear());

    let outcome = Orchestrator::new(&repo, &PackageJson, &prompter)
        .run(&ctx)
        .await
        .unwrap();

    let RunOutcome::Released(summary) = outcome else {
        panic!("expected a release, got {:?}", outcome);
    };
    assert_eq!(summary.version, "1.1.0");
    assert_eq!(summary.tag_name, "v1.1.0");
    assert_eq!(prompter.confirmations(), 1);

    assert!(repo.calls().contains(&RecordedCall::CreateTag {
        name: "v1.1.0".to_string(),
        message: "Release 1.1.0".to_string(),
    }));
    assert_eq!(repo.remote_tags(), vec!["v1.1.0"]);

    let manifest = PackageJson.read(dir.path()).unwrap().unwrap();
    assert_eq!(manifest.version.as_deref(), Some("1.1.0"));
    let raw = fs::read_to_string(dir.path().join("package.json")).unwrap();
    assert!(raw.contains("\"license\": \"MIT\""));

    let changelog = fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
    let newest = changelog.find("## 1.1.0").unwrap();
    let previous = changelog.find("## 1.0.0").unwrap();
    assert!(newest < previous);
    assert!(changelog.contains("- fix: a bug\n- feat: new thing"));
}

#[tokio::test]
async fn test_dry_run_leaves_everything_untouched() {
    let dir = project();
    let repo = repo();
    let prompter = StaticPrompter::accepting();
    let options = InvocationOptions {
        dry_run: true,
        ..linear()
    };
    let ctx = ReleaseContext::new(dir.path(), Config::default(), options);

    let outcome = Orchestrator::new(&repo, &PackageJson, &prompter)
        .run(&ctx)
        .await
        .unwrap();

    // Same decisions as a real run
    let RunOutcome::Released(summary) = outcome else {
        panic!("expected a release");
    };
    assert_eq!(summary.version, "1.1.0");
    assert_eq!(summary.tag_name, "v1.1.0");

    assert!(repo.calls().is_empty());
    assert_eq!(repo.local_tags(), vec!["v1.0.0"]);
    assert_eq!(fs::read_to_string(dir.path().join("package.json")).unwrap(), MANIFEST);
    assert_eq!(
        fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap(),
        "## 1.0.0\n\n- initial release\n"
    );
}

#[tokio::test]
async fn test_ci_mode_never_prompts() {
    let dir = project();
    let repo = repo();
    let prompter = StaticPrompter::declining();
    let options = InvocationOptions {
        ci: true,
        ..linear()
    };
    let ctx = ReleaseContext::new(dir.path(), Config::default(), options);

    let outcome = Orchestrator::new(&repo, &PackageJson, &prompter)
        .run(&ctx)
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Released(_)));
    assert_eq!(prompter.confirmations(), 0);
}

#[tokio::test]
async fn test_print_changelog_is_info_only() {
    let dir = project();
    let repo = repo().dirty();
    let prompter = StaticPrompter::declining();
    let mut config = Config::default();
    config.changelog.group_by_type = true;
    let options = InvocationOptions {
        print_changelog: true,
        ..linear()
    };
    let ctx = ReleaseContext::new(dir.path(), config, options);

    let outcome = Orchestrator::new(&repo, &PackageJson, &prompter)
        .run(&ctx)
        .await
        .unwrap();

    // A dirty tree does not matter: preconditions are skipped
    let RunOutcome::Printed(changelog) = outcome else {
        panic!("expected printed output");
    };
    assert_eq!(changelog, "### Bug Fixes\n\n- a bug\n\n### Features\n\n- new thing");
    assert!(repo.calls().is_empty());
    assert_eq!(fs::read_to_string(dir.path().join("package.json")).unwrap(), MANIFEST);
}

#[tokio::test]
async fn test_branching_release_with_plugins() {
    let dir = project();
    let repo = repo().on_branch("develop");
    let prompter = StaticPrompter::accepting();
    let mut config = Config::default();
    config.plugins = vec![
        PluginRef::Name("version-file".to_string()),
        PluginRef::Name("release-summary".to_string()),
    ];
    let plugins = PluginRegistry::with_builtins().load(&config.plugins);
    let options = InvocationOptions {
        git_flow: true,
        yes: true,
        ..InvocationOptions::default()
    };
    let ctx = ReleaseContext::new(dir.path(), config, options);

    let outcome = Orchestrator::new(&repo, &PackageJson, &prompter)
        .with_plugins(plugins)
        .run(&ctx)
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Released(_)));
    assert_eq!(prompter.confirmations(), 0);

    assert!(repo.calls().contains(&RecordedCall::FlowFinish {
        version: "1.1.0".to_string(),
        tag: "v1.1.0".to_string(),
        message: "Release 1.1.0".to_string(),
    }));
    assert_eq!(repo.remote_tags(), vec!["v1.1.0"]);

    assert_eq!(fs::read_to_string(dir.path().join("VERSION")).unwrap(), "1.1.0\n");
    // Written after the last push: the file stays out of the release commit
    let calls = repo.calls();
    let last_push = calls
        .iter()
        .rposition(|c| matches!(c, RecordedCall::PushTag { .. }))
        .unwrap();
    assert_eq!(last_push, calls.len() - 1);
    let summary = fs::read_to_string(dir.path().join("release-summary.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(json["name"], "widget");
    assert_eq!(json["tag"], "v1.1.0");
}

#[cfg(unix)]
#[tokio::test]
async fn test_failing_hook_aborts_before_workflow() {
    let dir = project();
    let repo = repo();
    let prompter = StaticPrompter::accepting();
    let mut config = Config::default();
    config.hooks.pre_workflow = vec!["exit 3".to_string()];
    let ctx = ReleaseContext::new(dir.path(), config, linear());

    let err = Orchestrator::new(&repo, &PackageJson, &prompter)
        .run(&ctx)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("exit 3"));
    assert!(repo.calls().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_changelog_command_replaces_built_in_entry() {
    let dir = project();
    let repo = repo();
    let prompter = StaticPrompter::accepting();
    let mut config = Config::default();
    config.changelog.command = Some("echo 'Notes for ${version} since ${from}'".to_string());
    // Ignored when a command is configured
    config.changelog.group_by_type = true;
    let ctx = ReleaseContext::new(dir.path(), config, linear());

    let outcome = Orchestrator::new(&repo, &PackageJson, &prompter)
        .run(&ctx)
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Released(_)));
    assert_eq!(ctx.changelog(), Some("Notes for 1.1.0 since v1.0.0"));

    let changelog = fs::read_to_string(dir.path().join("CHANGELOG.md")).unwrap();
    assert!(changelog.starts_with("## 1.1.0 ("));
    assert!(changelog.contains("\n\nNotes for 1.1.0 since v1.0.0\n"));
    assert!(!changelog.contains("a bug"));
    assert!(!changelog.contains("### Features"));
    assert!(changelog.contains("## 1.0.0\n\n- initial release"));
}

#[tokio::test]
async fn test_preid_from_environment_is_normalized() {
    let dir = project();
    let repo = repo();
    let prompter = StaticPrompter::accepting();
    let env = HashMap::from([("RELEASE_FLOW_PREID".to_string(), " RC ".to_string())]);
    let args = Args {
        release_version: true,
        no_git_flow: true,
        ..Args::default()
    };
    let resolved = Resolver::new(dir.path()).with_env(env).resolve(&args).unwrap();
    let ctx = ReleaseContext::new(dir.path(), resolved.config, resolved.options);

    let outcome = Orchestrator::new(&repo, &PackageJson, &prompter)
        .run(&ctx)
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Printed(ref v) if v == "1.1.0-rc.0"));
    assert_eq!(ctx.preid(), Some("rc"));
    assert_eq!(ctx.tag_name(), Some("v1.1.0-rc.0"));
    assert!(ctx.is_prerelease());
}
