/// Canonicalizes a raw path into a forward-slash, relative form.
///
/// Backslashes become forward slashes, empty and `.` segments are dropped,
/// and any path containing a `..` segment is rejected outright. When the
/// first segment is one of the configured wrapper directory names and more
/// than two segments are present, that wrapper is stripped so archives that
/// nest the real project one level deep flatten out. Returns `None` when
/// nothing remains.
pub fn clean_path(raw: &str, wrapper_dirs: &[String]) -> Option<String> {
    let normalized = raw.replace('\\', "/");
    let mut segments: Vec<&str> = normalized
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    if segments.iter().any(|s| *s == "..") {
        return None;
    }

    if segments.len() > 2 {
        let first = segments[0];
        if wrapper_dirs.iter().any(|w| w.eq_ignore_ascii_case(first)) {
            segments.remove(0);
        }
    }

    if segments.is_empty() {
        return None;
    }

    Some(segments.join("/"))
}

/// Drops a shared top-level directory from every path in the set.
///
/// The root is stripped only when it is the sole first segment across the
/// whole set (no root-level files) and at least one path keeps two or more
/// segments afterwards. Export tools wrap projects in a synthetic folder;
/// a lone two-segment path like `app/page.tsx` is left alone.
pub fn strip_shared_root(paths: Vec<String>) -> Vec<String> {
    let mut root: Option<String> = None;
    let mut uniform = true;
    for path in &paths {
        match path.split_once('/') {
            Some((first, _)) => match root.as_deref() {
                None => root = Some(first.to_string()),
                Some(existing) if existing == first => {}
                Some(_) => {
                    uniform = false;
                    break;
                }
            },
            // A file at the root means there is no wrapper to strip.
            None => {
                uniform = false;
                break;
            }
        }
    }

    let Some(root) = root else {
        return paths;
    };
    if !uniform {
        return paths;
    }

    if !paths.iter().any(|p| p.split('/').count() >= 3) {
        return paths;
    }

    let prefix = format!("{}/", root);
    paths
        .into_iter()
        .filter_map(|p| p.strip_prefix(&prefix).map(ToString::to_string))
        .filter(|p| !p.is_empty())
        .collect()
}
