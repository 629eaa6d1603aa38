//! Lexical path arithmetic for references written in stylesheets.
//!
//! Nothing here touches the file system. Results always use `/` separators
//! because they end up inside `url(...)` values.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use url::Url;

/// What kind of location a `url()` or `@import` reference names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReferenceKind {
    /// A path relative to the stylesheet, or root-absolute.
    Local,
    /// A `package:` URL.
    Package,
    /// Anything with a host or another scheme (`http:`, `data:`, `//cdn`).
    External,
}

pub(crate) fn classify(reference: &str) -> ReferenceKind {
    if reference.starts_with("//") {
        return ReferenceKind::External;
    }
    match Url::parse(reference) {
        Ok(url) if url.scheme() == "package" => ReferenceKind::Package,
        Ok(_) => ReferenceKind::External,
        Err(_) => ReferenceKind::Local,
    }
}

/// Removes `.` segments and folds `..` into the preceding segment.
///
/// Leading `..` segments of a relative path are kept.
pub fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut parts: Vec<Utf8Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match parts.last() {
                Some(Utf8Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                Some(Utf8Component::ParentDir | Utf8Component::CurDir) | None => {
                    parts.push(component);
                }
            },
            other => parts.push(other),
        }
    }
    parts.into_iter().collect()
}

/// The path that leads from directory `from` to directory `to`.
///
/// Both are normalized first. When one is absolute and the other is not,
/// there is no lexical answer and `to` is returned as is.
pub(crate) fn relative(from: &Utf8Path, to: &Utf8Path) -> Utf8PathBuf {
    if from.has_root() != to.has_root() {
        return to.to_path_buf();
    }
    let from = normalize(from);
    let to = normalize(to);
    let common = from
        .components()
        .zip(to.components())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = Utf8PathBuf::new();
    for _ in from.components().skip(common) {
        result.push("..");
    }
    for component in to.components().skip(common) {
        result.push(component);
    }
    result
}

/// Renders a path with `/` separators.
pub(crate) fn to_slash(path: &Utf8Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Utf8Component::RootDir => out.push('/'),
            other => {
                if !out.is_empty() && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(other.as_str());
            }
        }
    }
    out
}

/// The directory containing `file`, or the empty path for a bare file name.
pub(crate) fn parent_dir(file: &Utf8Path) -> &Utf8Path {
    file.parent().unwrap_or(Utf8Path::new(""))
}
