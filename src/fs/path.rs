//! Canonical explorer paths.
//!
//! Explorer paths are plain strings with a single leading slash, `/` as the
//! only separator, no empty segments and no trailing slash. The root is `"/"`.

/// Root of every explorer path.
pub const ROOT: &str = "/";

/// Fallback display name for an entry whose path has no usable basename.
pub const PLACEHOLDER_NAME: &str = "untitled";

/// Normalize a directory path into canonical form.
///
/// Blank input maps to the root. Backslashes become forward slashes and
/// repeated separators collapse. Spaces inside names are kept. Idempotent.
pub fn normalize_dir_path(path: &str) -> String {
    if path.trim().is_empty() {
        return ROOT.to_string();
    }

    let converted = path.replace('\\', "/");
    let segments: Vec<&str> = converted.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return ROOT.to_string();
    }

    let mut out = String::with_capacity(converted.len() + 1);
    for segment in segments {
        out.push('/');
        out.push_str(segment);
    }
    out
}

/// Remove every slash character from a display name.
pub fn sanitize_name(name: &str) -> String {
    name.chars().filter(|c| *c != '/' && *c != '\\').collect()
}

/// Join a child name onto a directory.
///
/// Slashes are stripped from `name` first so a crafted display name cannot
/// address a different directory.
pub fn join_path_segments(dir: &str, name: &str) -> String {
    let dir = normalize_dir_path(dir);
    let name = sanitize_name(name);
    if name.is_empty() {
        return dir;
    }
    if dir == ROOT {
        format!("/{}", name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Parent directory of `path`; the root is its own parent.
pub fn get_parent_directory_path(path: &str) -> String {
    let path = normalize_dir_path(path);
    match path.rfind('/') {
        Some(0) | None => ROOT.to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Last segment of `path`, empty for the root.
pub fn base_name(path: &str) -> String {
    let path = normalize_dir_path(path);
    path.rsplit('/').next().unwrap_or_default().to_string()
}

/// Number of non-empty segments in `path`.
pub fn path_depth(path: &str) -> usize {
    path.split(['/', '\\']).filter(|s| !s.is_empty()).count()
}

/// Whether `descendant` is strictly nested under `ancestor`.
///
/// Segment-aware: `/ab` is not under `/a`. Never true for equal paths.
pub fn is_descendant_path(ancestor: &str, descendant: &str) -> bool {
    let ancestor = normalize_dir_path(ancestor);
    let descendant = normalize_dir_path(descendant);
    if ancestor == descendant {
        return false;
    }
    if ancestor == ROOT {
        return true;
    }
    descendant
        .strip_prefix(ancestor.as_str())
        .is_some_and(|rest| rest.starts_with('/'))
}
