// Download status file-type classifier
// Matches downloads against catalog file types and user-entered custom types (MIME, extension or glob).

use globset::{GlobBuilder, GlobMatcher};

use crate::types::download::DownloadItem;
use crate::types::file_type::{FileType, FILE_TYPE_CATALOG};

/// Looks up a catalog file type by its display name.
pub fn lookup_by_name(name: &str) -> Option<&'static FileType> {
    FILE_TYPE_CATALOG
        .iter()
        .flat_map(|category| category.file_types.iter())
        .find(|file_type| file_type.name == name)
}

/// Last path segment, splitting on both `/` and `\`.
pub fn base_name(path: &str) -> &str {
    path.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(path)
}

/// Text after the last `.` of the last path segment, if any.
pub fn file_extension(path: &str) -> Option<&str> {
    let name = base_name(path);
    let (_, extension) = name.rsplit_once('.')?;
    if extension.is_empty() {
        None
    } else {
        Some(extension)
    }
}

/// True if the download's MIME or extension belongs to any of the file types.
pub fn matches_file_types(item: &DownloadItem, file_types: &[FileType]) -> bool {
    let extension = file_extension(&item.filename);

    file_types.iter().any(|file_type| {
        if !item.mime.is_empty() && file_type.mimes.iter().any(|m| *m == item.mime) {
            return true;
        }
        match extension {
            Some(ext) => file_type.extensions.iter().any(|e| e == ext),
            None => false,
        }
    })
}

/// True if the download's MIME or extension is listed verbatim, or its path
/// matches one of the entries as a glob pattern.
pub fn matches_custom_types(item: &DownloadItem, custom_types: &[String]) -> bool {
    if custom_types.is_empty() {
        return false;
    }

    if !item.mime.is_empty() && custom_types.iter().any(|t| *t == item.mime) {
        return true;
    }

    if let Some(ext) = file_extension(&item.filename) {
        if custom_types.iter().any(|t| t == ext) {
            return true;
        }
    }

    let path = item.filename.replace('\\', "/");
    custom_types.iter().any(|pattern| glob_matches(pattern, &path))
}

/// Glob match with base-name semantics: patterns without a `/` are matched
/// against the final path segment only.
pub fn glob_matches(pattern: &str, path: &str) -> bool {
    let matcher = match compile(pattern) {
        Some(m) => m,
        None => return false,
    };

    if pattern.contains('/') {
        matcher.is_match(path)
    } else {
        matcher.is_match(base_name(path))
    }
}

fn compile(pattern: &str) -> Option<GlobMatcher> {
    if pattern.is_empty() {
        return None;
    }
    // `*` and `?` stop at `/`; only `**` crosses directories.
    match GlobBuilder::new(pattern).literal_separator(true).build() {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(e) => {
            tracing::debug!(pattern, error = %e, "ignoring invalid custom type pattern");
            None
        }
    }
}
