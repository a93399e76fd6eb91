//! Path utilities shared by the preview server and the studio.
//!
//! Every client-supplied file path goes through [`join_relative`] before
//! touching the filesystem.

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to joining with the current directory if relative.
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Join a client-supplied relative path onto `root`.
///
/// Returns `None` for empty, absolute or parent-escaping paths. `.` segments
/// and a leading `/` are tolerated (`/src/App.tsx` is treated as relative)
/// since browsers and editors commonly produce them.
pub fn join_relative(root: &Path, relative: &str) -> Option<PathBuf> {
    let trimmed = relative.trim().trim_start_matches(['/', '\\']);
    if trimmed.is_empty() {
        return None;
    }

    let mut out = root.to_path_buf();
    let mut pushed = false;
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => {
                out.push(part);
                pushed = true;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    pushed.then_some(out)
}
