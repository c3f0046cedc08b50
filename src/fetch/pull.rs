//! Fast-forward update of an existing working copy

use crate::error::AccessError;
use git2::build::CheckoutBuilder;
use git2::{FetchOptions, Repository};
use std::path::Path;

/// What an update did to the working copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    UpToDate,
    FastForwarded,
}

/// Fetch the checked-out branch from `origin` and fast-forward to it.
///
/// A working copy whose branch has diverged from the remote, or whose
/// uncommitted edits would be overwritten, is reported as an error and left
/// untouched.
pub fn pull_repository(path: &Path) -> Result<PullOutcome, AccessError> {
    let repo = Repository::open(path).map_err(|e| pull_error(path, e.message()))?;
    let head = repo.head().map_err(|e| pull_error(path, e.message()))?;
    if !head.is_branch() {
        return Err(pull_error(path, "HEAD is detached"));
    }
    let branch = head
        .shorthand()
        .map(str::to_string)
        .ok_or_else(|| pull_error(path, "branch name is not valid UTF-8"))?;
    drop(head);

    fast_forward(&repo, &branch).map_err(|e| pull_error(path, e.message()))
}

fn fast_forward(repo: &Repository, branch: &str) -> Result<PullOutcome, git2::Error> {
    let mut remote = repo.find_remote("origin")?;
    let mut fo = FetchOptions::new();
    remote.fetch(&[branch], Some(&mut fo), None)?;

    let fetch_head = repo.find_reference("FETCH_HEAD")?;
    let fetch_commit = repo.reference_to_annotated_commit(&fetch_head)?;
    let (analysis, _) = repo.merge_analysis(&[&fetch_commit])?;

    if analysis.is_up_to_date() {
        return Ok(PullOutcome::UpToDate);
    }
    if !analysis.is_fast_forward() {
        return Err(git2::Error::from_str("local branch has diverged from origin"));
    }

    // Update the working tree first; local edits in the way fail the checkout
    // and leave the branch where it was.
    let target = repo.find_object(fetch_commit.id(), None)?;
    repo.checkout_tree(&target, Some(CheckoutBuilder::new().safe()))?;

    let refname = format!("refs/heads/{branch}");
    let mut reference = repo.find_reference(&refname)?;
    reference.set_target(fetch_commit.id(), "code-assistant: fast-forward")?;
    repo.set_head(&refname)?;
    Ok(PullOutcome::FastForwarded)
}

fn pull_error(path: &Path, message: &str) -> AccessError {
    AccessError::Pull { path: path.to_path_buf(), message: message.to_string() }
}
