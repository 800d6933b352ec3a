use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Join `relative` onto `root` and make sure the result stays inside it.
///
/// Both sides are normalized lexically first, so `..` segments and absolute
/// overrides smuggled through a `pathname` record are caught before anything
/// touches the filesystem. The root itself is not a valid target.
pub fn safe_join<B: AsRef<Path>, P: AsRef<Path>>(root: B, relative: P) -> Result<PathBuf> {
    let root = normalize_path(root.as_ref());
    let resolved = normalize_path(&root.join(relative.as_ref()));

    if resolved == root || !resolved.starts_with(&root) {
        return Err(Error::PathEscape { path: resolved, root });
    }

    Ok(resolved)
}

/// Normalize path separators and resolve relative components.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(part) => result.push(part),
            Component::RootDir => result.push(component.as_os_str()),
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
            Component::CurDir => {}
        }
    }

    result
}
