use crate::error::{ReleaseError, Result};
use crate::git::{PushOutcome, VersionControl};
use git2::{
    build::CheckoutBuilder, BranchType, Cred, CredentialType, Direction, ErrorCode,
    IndexAddOption, Oid, RemoteCallbacks, Repository as Git2Repo, StatusOptions,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// `git2` repository behind the [VersionControl] trait.
///
/// Reads and local writes use libgit2; pushes, rebases and `git flow` shell
/// out to the `git` CLI so user push arguments and hooks apply.
pub struct Git2Repository {
    repo: Mutex<Git2Repo>,
    workdir: PathBuf,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path.as_ref())?;
        Ok(Self::from_git2(repo))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| repo.path().to_path_buf());
        Git2Repository {
            repo: Mutex::new(repo),
            workdir,
        }
    }

    fn repo(&self) -> MutexGuard<'_, Git2Repo> {
        self.repo.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn git(&self, args: &[&str]) -> Result<Output> {
        debug!(args = ?args, "running git");
        Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .env("GIT_MERGE_AUTOEDIT", "no")
            .output()
            .map_err(|e| ReleaseError::workflow(format!("Cannot run git: {}", e)))
    }

    fn git_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.git(args)?;
        if !output.status.success() {
            return Err(ReleaseError::workflow(format!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn head_oid(repo: &Git2Repo) -> Result<Option<Oid>> {
        match repo.head() {
            Ok(head) => Ok(head.target()),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Credentials for libgit2 network operations: SSH keys from `~/.ssh`, the
/// SSH agent, then the default credential helper.
fn remote_callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");
        if allowed_types.contains(CredentialType::SSH_KEY) {
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }
            if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }
        Cred::default()
    });
    callbacks
}

fn is_non_fast_forward(stderr: &str) -> bool {
    stderr.contains("non-fast-forward")
        || stderr.contains("[rejected]")
        || stderr.contains("fetch first")
}

impl VersionControl for Git2Repository {
    fn current_branch(&self) -> Result<String> {
        let repo = self.repo();
        let result = match repo.head() {
            Ok(head) if head.is_branch() => head
                .shorthand()
                .map(str::to_string)
                .ok_or_else(|| ReleaseError::precondition("Branch name is not valid UTF-8")),
            Ok(_) => Err(ReleaseError::precondition("HEAD is detached")),
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                // No commits yet: read the symbolic target of HEAD
                let head = repo.find_reference("HEAD")?;
                head.symbolic_target()
                    .and_then(|t| t.strip_prefix("refs/heads/"))
                    .map(str::to_string)
                    .ok_or_else(|| ReleaseError::precondition("HEAD is detached"))
            }
            Err(e) => Err(e.into()),
        };
        result
    }

    fn latest_tag(&self) -> Result<Option<String>> {
        let repo = self.repo();
        let Some(head) = Self::head_oid(&repo)? else {
            return Ok(None);
        };

        // Commit id -> tag name, for lightweight and annotated tags
        let mut tagged: HashMap<Oid, String> = HashMap::new();
        for name in repo.tag_names(None)?.iter().flatten() {
            let Ok(reference) = repo.find_reference(&format!("refs/tags/{}", name)) else {
                continue;
            };
            if let Ok(commit) = reference.peel_to_commit() {
                tagged
                    .entry(commit.id())
                    .and_modify(|existing| {
                        if name > existing.as_str() {
                            *existing = name.to_string();
                        }
                    })
                    .or_insert_with(|| name.to_string());
            }
        }

        let mut revwalk = repo.revwalk()?;
        revwalk.push(head)?;
        for oid in revwalk {
            if let Some(name) = tagged.get(&oid?) {
                return Ok(Some(name.clone()));
            }
        }
        Ok(None)
    }

    fn commits_since(&self, reference: Option<&str>) -> Result<Vec<String>> {
        let repo = self.repo();
        let Some(head) = Self::head_oid(&repo)? else {
            return Ok(Vec::new());
        };

        let mut revwalk = repo.revwalk()?;
        revwalk.push(head)?;
        if let Some(reference) = reference {
            let since = repo.revparse_single(reference)?.peel_to_commit()?;
            revwalk.hide(since.id())?;
        }

        let mut subjects = Vec::new();
        for oid in revwalk {
            let commit = repo.find_commit(oid?)?;
            subjects.push(commit.summary().unwrap_or_default().to_string());
        }
        subjects.reverse();
        Ok(subjects)
    }

    fn ensure_clean_working_tree(&self) -> Result<()> {
        let repo = self.repo();
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);
        let statuses = repo.statuses(Some(&mut options))?;

        let changed: Vec<String> = statuses
            .iter()
            .filter(|entry| !entry.status().is_empty())
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect();
        if !changed.is_empty() {
            return Err(ReleaseError::precondition(format!(
                "Working tree has uncommitted changes: {}",
                changed.join(", ")
            )));
        }
        Ok(())
    }

    fn ensure_remote_reachable(&self, remote: &str) -> Result<()> {
        let repo = self.repo();
        let mut handle = repo.find_remote(remote).map_err(|_| {
            ReleaseError::precondition(format!("Remote '{}' is not configured", remote))
        })?;
        handle
            .connect_auth(Direction::Fetch, Some(remote_callbacks()), None)
            .map_err(|e| {
                ReleaseError::precondition(format!("Remote '{}' is not reachable: {}", remote, e))
            })?;
        Ok(())
    }

    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        let repo = self.repo();
        let result = match repo.find_remote(remote) {
            Ok(handle) => Ok(handle.url().map(str::to_string)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        };
        result
    }

    fn stage_all(&self) -> Result<()> {
        let repo = self.repo();
        let mut index = repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        let repo = self.repo();
        let mut index = repo.index()?;
        let tree = repo.find_tree(index.write_tree()?)?;
        let signature = repo.signature()?;

        let parent = match Self::head_oid(&repo)? {
            Some(oid) => Some(repo.find_commit(oid)?),
            None => None,
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .map_err(|e| ReleaseError::workflow(format!("Cannot commit: {}", e)))?;
        Ok(())
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        let repo = self.repo();
        let head = repo.head()?.peel_to_commit()?;
        let signature = repo.signature()?;
        repo.tag(name, head.as_object(), &signature, message, false)
            .map_err(|e| ReleaseError::workflow(format!("Cannot create tag '{}': {}", name, e)))?;
        Ok(())
    }

    fn push_branch(&self, remote: &str, branch: &str, extra_args: &[String]) -> Result<PushOutcome> {
        let mut args = vec!["push", remote, branch];
        args.extend(extra_args.iter().map(String::as_str));

        let output = self.git(&args)?;
        if output.status.success() {
            return Ok(PushOutcome::Pushed);
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if is_non_fast_forward(&stderr) {
            return Ok(PushOutcome::Rejected(stderr));
        }
        Err(ReleaseError::workflow(format!(
            "Push of '{}' to '{}' failed: {}",
            branch, remote, stderr
        )))
    }

    fn push_tag(&self, remote: &str, tag: &str, extra_args: &[String]) -> Result<()> {
        let refspec = format!("refs/tags/{}", tag);
        let mut args = vec!["push", remote, refspec.as_str()];
        args.extend(extra_args.iter().map(String::as_str));
        self.git_checked(&args)?;
        Ok(())
    }

    fn tag_exists_locally(&self, tag: &str) -> Result<bool> {
        let repo = self.repo();
        let result = match repo.find_reference(&format!("refs/tags/{}", tag)) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        };
        result
    }

    fn tag_exists_remotely(&self, remote: &str, tag: &str) -> Result<bool> {
        let repo = self.repo();
        let mut handle = repo.find_remote(remote)?;
        let connection = handle.connect_auth(Direction::Fetch, Some(remote_callbacks()), None)?;
        let wanted = format!("refs/tags/{}", tag);
        let exists = connection.list()?.iter().any(|head| head.name() == wanted);
        Ok(exists)
    }

    fn delete_local_tag(&self, tag: &str) -> Result<()> {
        self.repo()
            .tag_delete(tag)
            .map_err(|e| ReleaseError::workflow(format!("Cannot delete tag '{}': {}", tag, e)))
    }

    fn delete_remote_tag(&self, remote: &str, tag: &str) -> Result<()> {
        let refspec = format!(":refs/tags/{}", tag);
        self.git_checked(&["push", remote, refspec.as_str()])?;
        Ok(())
    }

    fn branch_exists(&self, branch: &str) -> Result<bool> {
        let repo = self.repo();
        let result = match repo.find_branch(branch, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        };
        result
    }

    fn checkout(&self, branch: &str, start_point: Option<&str>) -> Result<()> {
        let repo = self.repo();
        if let Some(start) = start_point {
            let commit = repo.revparse_single(start)?.peel_to_commit()?;
            repo.branch(branch, &commit, false).map_err(|e| {
                ReleaseError::workflow(format!("Cannot create branch '{}': {}", branch, e))
            })?;
        }

        let refname = format!("refs/heads/{}", branch);
        let target = repo
            .revparse_single(&refname)
            .map_err(|e| ReleaseError::workflow(format!("Branch '{}' not found: {}", branch, e)))?;
        repo.checkout_tree(&target, Some(CheckoutBuilder::new().safe()))?;
        repo.set_head(&refname)?;
        Ok(())
    }

    fn pull_rebase(&self, remote: &str, branch: &str) -> Result<()> {
        self.git_checked(&["pull", "--rebase", remote, branch])?;
        Ok(())
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        let repo = self.repo();
        let mut handle = repo
            .find_remote(remote)
            .map_err(|_| ReleaseError::workflow(format!("Remote '{}' not found", remote)))?;

        let mut options = git2::FetchOptions::new();
        options.remote_callbacks(remote_callbacks());
        let heads = format!("+refs/heads/*:refs/remotes/{}/*", remote);
        handle
            .fetch(&[heads.as_str(), "+refs/tags/*:refs/tags/*"], Some(&mut options), None)
            .map_err(|e| ReleaseError::workflow(format!("Fetch from '{}' failed: {}", remote, e)))?;
        Ok(())
    }

    fn reset_branch_to_remote(&self, remote: &str, branch: &str) -> Result<()> {
        let repo = self.repo();
        let tracking = format!("refs/remotes/{}/{}", remote, branch);
        let Some(target) = repo.find_reference(&tracking).ok().and_then(|r| r.target()) else {
            debug!(branch, remote, "no remote-tracking branch, nothing to sync");
            return Ok(());
        };
        repo.reference(
            &format!("refs/heads/{}", branch),
            target,
            true,
            &format!("sync from {}", tracking),
        )?;
        Ok(())
    }

    fn flow_installed(&self) -> Result<bool> {
        Ok(self
            .git(&["flow", "version"])
            .map(|output| output.status.success())
            .unwrap_or(false))
    }

    fn flow_release_finish(&self, version: &str, tag: &str, tag_message: &str) -> Result<()> {
        self.git_checked(&[
            "flow", "release", "finish", "-m", tag_message, "-T", tag, version,
        ])?;
        Ok(())
    }
}
