//! Repository enumeration from the model catalog

use std::path::{Component, Path, PathBuf};

use rustc_hash::FxHashSet;

/// Maps a model path under the download directory to its repository.
///
/// Downloads are laid out as `<download_dir>/<owner>/<repo>/<file>`.
#[derive(Debug, Clone)]
pub struct RepoLayout {
    download_dir: PathBuf,
}

impl RepoLayout {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: without_cur_dir(&download_dir.into()),
        }
    }

    /// `owner/repo` for a model path, or `None` outside the layout.
    pub fn repository(&self, model_path: &str) -> Option<String> {
        let model_path = without_cur_dir(Path::new(model_path));
        let rest = model_path.strip_prefix(&self.download_dir).ok()?;
        let mut parts = rest.components().map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        });
        let owner = parts.next()??;
        let repo = parts.next()??;
        // The file itself must follow
        parts.next()??;
        Some(format!("{owner}/{repo}"))
    }
}

/// `./results/downloads` and `results/downloads` name the same tree.
fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Distinct repositories of `model_paths`, in first-seen order.
///
/// Paths outside the layout are logged and skipped.
pub fn distinct_repositories<'a, I>(layout: &'a RepoLayout, model_paths: I) -> impl Iterator<Item = String> + 'a
where
    I: IntoIterator<Item = String>,
    I::IntoIter: 'a,
{
    let mut seen = FxHashSet::default();
    model_paths.into_iter().filter_map(move |path| {
        let Some(repo) = layout.repository(&path) else {
            log::warn!("Cannot derive repository from {path}");
            return None;
        };
        if seen.insert(repo.clone()) {
            Some(repo)
        } else {
            log::debug!("{repo}: already seen in this run");
            None
        }
    })
}
