//! `git2`-backed [`Vcs`] implementation

use std::path::{Path, PathBuf};

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    BranchType, Commit, DiffOptions, Direction, ErrorCode, IndexAddOption, Oid, Remote,
    Repository, ResetType, Signature, StatusOptions,
};

use crate::auth;
use crate::commits::CommitStamp;
use crate::vcs::{BOT_EMAIL, BOT_NAME, Vcs};
use crate::{Error, Result};

/// A repository with a working tree.
pub struct GitRepo {
    root: PathBuf,
    repo: Repository,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo").field("root", &self.root).finish()
    }
}

impl GitRepo {
    /// Open the repository whose working tree is `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| Error::NotARepository {
            path: path.to_path_buf(),
        })?;
        Ok(Self::from_repo(repo, path))
    }

    /// Open the repository containing `path`, searching parent directories.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|_| Error::NotARepository {
            path: path.to_path_buf(),
        })?;
        Ok(Self::from_repo(repo, path))
    }

    /// Clone `url` into `path`.
    pub fn clone_from(url: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(url = %url, path = %path.display(), "Cloning repository");
        let mut builder = RepoBuilder::new();
        builder.fetch_options(auth::fetch_options());
        let repo = builder.clone(url, path).map_err(|e| Error::CloneFailed {
            url: url.to_string(),
            message: e.message().to_string(),
        })?;
        Ok(Self::from_repo(repo, path))
    }

    fn from_repo(repo: Repository, fallback: &Path) -> Self {
        let root = repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| fallback.to_path_buf());
        Self { root, repo }
    }

    fn head_commit_opt(&self) -> Result<Option<Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn signature(&self) -> Result<Signature<'static>> {
        if let Ok(signature) = self.repo.signature() {
            return Ok(signature);
        }
        tracing::debug!(path = %self.root.display(), "Configuring bot commit identity");
        let mut config = self.repo.config()?;
        config.set_str("user.name", BOT_NAME)?;
        config.set_str("user.email", BOT_EMAIL)?;
        Ok(Signature::now(BOT_NAME, BOT_EMAIL)?)
    }

    fn find_remote(&self, remote: &str) -> Result<Remote<'_>> {
        self.repo
            .find_remote(remote)
            .map_err(|_| Error::RemoteNotFound {
                name: remote.to_string(),
            })
    }

    /// Commit the remote currently has for `branch`, asked over the wire
    /// so a stale tracking ref cannot answer.
    fn ls_remote_branch(&self, remote: &str, branch: &str) -> Result<Option<Oid>> {
        let mut found = self.find_remote(remote)?;
        let connection = found
            .connect_auth(Direction::Fetch, Some(auth::remote_callbacks()), None)
            .map_err(|e| Error::FetchFailed {
                message: e.message().to_string(),
            })?;
        let wanted = format!("refs/heads/{branch}");
        let oid = connection
            .list()?
            .iter()
            .find(|head| head.name() == wanted)
            .map(|head| head.oid());
        Ok(oid)
    }

    fn resolve(&self, reference: &str) -> Result<git2::Object<'_>> {
        self.repo
            .revparse_single(reference)
            .map_err(|_| Error::RefNotFound {
                reference: reference.to_string(),
            })
    }
}

impl Vcs for GitRepo {
    fn root(&self) -> &Path {
        &self.root
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        if head.is_branch() {
            Ok(head.shorthand().map(str::to_string))
        } else {
            Ok(None)
        }
    }

    fn head_commit(&self) -> Result<CommitStamp> {
        let commit = self.repo.head()?.peel_to_commit()?;
        CommitStamp::from_commit(&commit)
    }

    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        match self.repo.find_remote(remote) {
            Ok(found) => Ok(found.url().map(str::to_string)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        let mut found = self.find_remote(remote)?;
        let mut options = auth::fetch_options();
        found
            .fetch(&[] as &[&str], Some(&mut options), None)
            .map_err(|e| Error::FetchFailed {
                message: e.message().to_string(),
            })?;
        Ok(())
    }

    fn branch_exists(&self, branch: &str) -> Result<bool> {
        match self.repo.find_branch(branch, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        let refname = format!("refs/heads/{branch}");
        let target = self
            .repo
            .revparse_single(&refname)
            .map_err(|_| Error::BranchNotFound {
                name: branch.to_string(),
            })?;
        self.repo
            .checkout_tree(&target, Some(CheckoutBuilder::new().safe()))?;
        self.repo.set_head(&refname)?;
        Ok(())
    }

    fn create_branch(&self, branch: &str, start: Option<&str>) -> Result<()> {
        let commit = match start {
            Some(reference) => self.resolve(reference)?.peel_to_commit()?,
            None => self.repo.head()?.peel_to_commit()?,
        };
        self.repo.branch(branch, &commit, false)?;
        self.checkout(branch)
    }

    fn delete_branch(&self, branch: &str) -> Result<bool> {
        match self.repo.find_branch(branch, BranchType::Local) {
            Ok(mut found) => {
                found.delete()?;
                Ok(true)
            }
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn reset_hard(&self, reference: &str) -> Result<()> {
        let target = self.resolve(reference)?;
        self.repo.reset(&target, ResetType::Hard, None)?;
        Ok(())
    }

    fn is_dirty(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);
        Ok(!self.repo.statuses(Some(&mut options))?.is_empty())
    }

    fn stage_all(&self) -> Result<()> {
        let mut index = self.repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        index.write()?;
        Ok(())
    }

    fn stage_paths(&self, specs: &[String]) -> Result<()> {
        let (excludes, includes): (Vec<&str>, Vec<&str>) =
            specs.iter().map(String::as_str).partition(|s| s.starts_with('!'));
        let includes: Vec<&str> = includes
            .into_iter()
            .map(|s| if s == "." { "*" } else { s })
            .collect();
        let excludes: Vec<&str> = excludes
            .into_iter()
            .map(|s| s.trim_start_matches('!'))
            .collect();

        let mut index = self.repo.index()?;
        if !includes.is_empty() {
            index.add_all(includes.iter().copied(), IndexAddOption::DEFAULT, None)?;
            index.update_all(includes.iter().copied(), None)?;
            index.write()?;
        }

        if !excludes.is_empty() {
            match self.head_commit_opt()? {
                Some(commit) => self
                    .repo
                    .reset_default(Some(commit.as_object()), excludes.iter().copied())?,
                None => {
                    index.remove_all(excludes.iter().copied(), None)?;
                    index.write()?;
                }
            }
        }
        Ok(())
    }

    fn has_staged_changes(&self) -> Result<bool> {
        let index = self.repo.index()?;
        let head_tree = match self.head_commit_opt()? {
            Some(commit) => Some(commit.tree()?),
            None => None,
        };
        let diff = self
            .repo
            .diff_tree_to_index(head_tree.as_ref(), Some(&index), None)?;
        Ok(diff.deltas().len() > 0)
    }

    fn commit(&self, message: &str) -> Result<Option<String>> {
        if !self.has_staged_changes()? {
            return Ok(None);
        }
        let signature = self.signature()?;
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let parents: Vec<Commit<'_>> = self.head_commit_opt()?.into_iter().collect();
        let parent_refs: Vec<&Commit<'_>> = parents.iter().collect();
        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parent_refs,
        )?;
        tracing::debug!(sha = %oid, message = %message, "Committed");
        Ok(Some(oid.to_string()))
    }

    fn push(&self, remote: &str, branch: &str, force: bool) -> Result<()> {
        let mut found = self.find_remote(remote)?;
        let plus = if force { "+" } else { "" };
        let refspec = format!("{plus}refs/heads/{branch}:refs/heads/{branch}");
        let mut options = auth::push_options();
        found
            .push(&[refspec.as_str()], Some(&mut options))
            .map_err(|e| Error::PushFailed {
                message: e.message().to_string(),
            })?;
        Ok(())
    }

    fn remote_branch_matches_head(&self, remote: &str, branch: &str) -> Result<bool> {
        let tracking = format!("refs/remotes/{remote}/{branch}");
        let Some(remote_oid) = self.ls_remote_branch(remote, branch)? else {
            if let Ok(mut stale) = self.repo.find_reference(&tracking) {
                stale.delete()?;
            }
            return Ok(false);
        };

        let head = self.repo.head()?.peel_to_commit()?;
        if head.id() == remote_oid {
            return Ok(true);
        }
        let mut found = self.find_remote(remote)?;
        let refspec = format!("+refs/heads/{branch}:{tracking}");
        found
            .fetch(&[refspec.as_str()], Some(&mut auth::fetch_options()), None)
            .map_err(|e| Error::FetchFailed {
                message: e.message().to_string(),
            })?;
        let remote_tree = self.repo.find_commit(remote_oid)?.tree_id();
        Ok(remote_tree == head.tree_id())
    }

    fn changed_paths(&self, base: &str) -> Result<Vec<PathBuf>> {
        let tree = self.resolve(base)?.peel_to_tree()?;
        let mut options = DiffOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true);
        let diff = self
            .repo
            .diff_tree_to_workdir_with_index(Some(&tree), Some(&mut options))?;
        Ok(diff
            .deltas()
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .map(Path::to_path_buf)
            })
            .collect())
    }

    fn file_at_ref(&self, path: &Path, reference: &str) -> Result<Option<String>> {
        let tree = self.resolve(reference)?.peel_to_tree()?;
        let entry = match tree.get_path(path) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let blob = self.repo.find_blob(entry.id())?;
        Ok(String::from_utf8(blob.content().to_vec()).ok())
    }
}
