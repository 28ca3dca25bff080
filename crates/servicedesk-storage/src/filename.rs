//! Filename sanitization and stored-name generation.

use uuid::Uuid;

/// Sanitize a user-supplied filename for use in a stored-location
/// reference.
///
/// Keeps only the final path component, replaces anything outside
/// `[A-Za-z0-9._-]` with `_`, and strips leading dots so the result can
/// never traverse out of the ticket's storage area or hide itself. Falls
/// back to `"file"` when nothing safe remains.
pub fn sanitize_filename(original: &str) -> String {
    let leaf = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);

    let cleaned: String = leaf
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_start_matches(['.', '_']).trim_end_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Generate a collision-free stored name for a sanitized filename.
///
/// The random token prefix keeps two uploads with the identical original
/// name distinct, and keeps stored names unguessable from the filename
/// alone.
pub fn unique_stored_name(safe_name: &str) -> String {
    format!("{}__{}", Uuid::new_v4().simple(), safe_name)
}

/// Guess MIME type from a filename extension.
pub fn mime_from_path(path: &str) -> Option<String> {
    let ext = path.rsplit('.').next()?.to_lowercase();
    let mime = match ext.as_str() {
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "csv" => "text/csv",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => return None,
    };
    Some(mime.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_passes_through() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("My Report (v2).pdf"), "My_Report__v2_.pdf");
    }

    #[test]
    fn test_path_components_are_stripped() {
        assert_eq!(sanitize_filename("/etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_filename("a/b/../c.txt"), "c.txt");
    }

    #[test]
    fn test_traversal_only_names_fall_back() {
        assert_eq!(sanitize_filename(".."), "file");
        assert_eq!(sanitize_filename("..."), "file");
        assert_eq!(sanitize_filename(""), "file");
    }

    #[test]
    fn test_leading_dots_are_stripped() {
        assert_eq!(sanitize_filename(".bashrc"), "bashrc");
        assert_eq!(sanitize_filename("..secret.txt"), "secret.txt");
    }

    #[test]
    fn test_unique_stored_names_differ() {
        let a = unique_stored_name("report.pdf");
        let b = unique_stored_name("report.pdf");
        assert_ne!(a, b);
        assert!(a.ends_with("__report.pdf"));
    }

    #[test]
    fn test_mime_detection() {
        assert_eq!(mime_from_path("file.pdf"), Some("application/pdf".into()));
        assert_eq!(mime_from_path("img.PNG"), Some("image/png".into()));
        assert_eq!(mime_from_path("noext"), None);
    }
}
