//! Shallow cloning

use crate::domain::CloneOptions;
use crate::error::AccessError;
use git2::build::RepoBuilder;
use git2::{FetchOptions, Repository};
use std::path::Path;

/// Clone `url` into `dest` honoring depth, branch and single-branch options.
///
/// A shallow clone rejected by a transport without shallow support (the local
/// `file://` transport, some dumb servers) is retried once with full history.
/// Every other failure is returned as is. On failure nothing is left at `dest`.
pub fn clone_repository(
    url: &str,
    dest: &Path,
    options: &CloneOptions,
) -> Result<Repository, AccessError> {
    let first = repo_builder(options, options.depth).clone(url, dest);
    let result = match first {
        Ok(repo) => Ok(repo),
        Err(err) if options.depth > 0 && shallow_unsupported(&err) => {
            tracing::warn!("{url} does not support shallow clones ({err}); cloning full history");
            remove_partial(dest);
            repo_builder(options, 0).clone(url, dest)
        }
        Err(err) => Err(err),
    };

    result.map_err(|err| {
        remove_partial(dest);
        AccessError::Clone { locator: url.to_string(), message: err.message().to_string() }
    })
}

fn repo_builder<'cb>(options: &CloneOptions, depth: u32) -> RepoBuilder<'cb> {
    let mut fo = FetchOptions::new();
    if depth > 0 {
        fo.depth(depth.min(i32::MAX as u32) as i32);
    }

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fo);

    match &options.branch {
        Some(branch) => {
            builder.branch(branch);
            if options.single_branch {
                let refspec = format!("+refs/heads/{branch}:refs/remotes/origin/{branch}");
                builder.remote_create(move |repo, name, url| {
                    repo.remote_with_fetch(name, url, &refspec)
                });
            }
        }
        None if options.single_branch => {
            tracing::debug!("single-branch requested without a branch; fetching remote default");
        }
        None => {}
    }

    builder
}

fn shallow_unsupported(err: &git2::Error) -> bool {
    err.message().to_ascii_lowercase().contains("shallow")
}

fn remove_partial(dest: &Path) {
    if dest.exists() {
        if let Err(e) = std::fs::remove_dir_all(dest) {
            tracing::warn!("Failed removing partial clone {}: {}", dest.display(), e);
        }
    }
}
