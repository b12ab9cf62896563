//! Mime types by file extension.

use std::path::Path;

/// HTML pages.
pub const HTML: &str = "text/html;charset=utf-8";
/// Stylesheets.
pub const CSS: &str = "text/css";
/// Scripts.
pub const JS: &str = "application/javascript";
/// XML documents, including the sitemap.
pub const XML: &str = "application/xml";
/// Anything without a better guess.
pub const BYTES: &str = "application/octet-stream";

/// Mime type for a lowercase extension without the dot.
#[must_use]
pub fn for_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension {
        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "gif" => "image/gif",

        // Fonts
        "eot" => "application/vnd.ms-fontobject",
        "ttf" => "application/x-font-ttf",
        "woff" => "application/x-font-woff",
        "woff2" => "font/woff2",

        // Documents
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "doc" => "application/msword",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "apk" => "application/vnd.android.package-archive",
        "json" => "application/json",

        // Web content
        "css" => CSS,
        "js" => JS,
        "html" => HTML,
        "xml" => XML,
        _ => return None,
    };
    Some(mime)
}

/// Lowercase extension of a path, without the dot. Empty when there is none.
#[must_use]
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Mime type of a file path, falling back to [`BYTES`].
#[must_use]
pub fn for_path(path: &Path) -> &'static str {
    for_extension(&extension_of(path)).unwrap_or(BYTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(for_extension("png"), Some("image/png"));
        assert_eq!(for_extension("jpeg"), Some("image/jpeg"));
        assert_eq!(for_extension("css"), Some("text/css"));
        assert_eq!(for_extension("woff2"), Some("font/woff2"));
        assert_eq!(for_extension("rs"), None);
    }

    #[test]
    fn test_for_path_is_case_insensitive() {
        assert_eq!(for_path(Path::new("/site/img/CAT.PNG")), "image/png");
        assert_eq!(for_path(Path::new("/site/font/Lato.ttf")), "application/x-font-ttf");
        assert_eq!(for_path(Path::new("/site/README")), BYTES);
    }
}
