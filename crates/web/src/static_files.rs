//! Static-file fallback for requests no route claims.

use std::path::{Path, PathBuf};

use backed_http::protocol::ResponseMessage;
use mime::Mime;
use tracing::debug;

const INDEX_FILE: &str = "index.html";

/// Serves files below a root directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Looks up `<root>/<path>`, answering `index.html` for directories.
    ///
    /// Returns `None` when the file does not exist, can't be read, or `path` tries to leave the
    /// root with a `..` segment.
    pub async fn lookup(&self, path: &str) -> Option<ResponseMessage> {
        let mut response = ResponseMessage::default();
        self.fill(path, &mut response).await.then_some(response)
    }

    /// Loads `<root>/<path>` into `response`; returns false on a miss and leaves it untouched.
    pub async fn fill(&self, path: &str, response: &mut ResponseMessage) -> bool {
        if path.split(['/', '\\']).any(|segment| segment == "..") {
            debug!(path, "reject path escaping the static root");
            return false;
        }

        let mut file = self.root.join(path.trim_start_matches('/'));
        if tokio::fs::metadata(&file).await.is_ok_and(|metadata| metadata.is_dir()) {
            file.push(INDEX_FILE);
        }
        fill_from_file(&file, response).await
    }
}

/// Loads `file` into the body of `response` with a guessed `Content-Type`.
///
/// Returns false, leaving `response` untouched, when the file can't be read.
pub async fn fill_from_file(file: &Path, response: &mut ResponseMessage) -> bool {
    match tokio::fs::read(file).await {
        Ok(content) => {
            response.headers_mut().insert("Content-Type", content_type(file).to_string());
            response.set_body(content);
            true
        }
        Err(e) => {
            debug!(file = %file.display(), cause = %e, "static file not readable");
            false
        }
    }
}

/// Guesses the content type from the file extension.
fn content_type(file: &Path) -> Mime {
    let extension = file.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("html" | "htm") => mime::TEXT_HTML_UTF_8,
        Some("css") => mime::TEXT_CSS_UTF_8,
        Some("js" | "mjs") => mime::APPLICATION_JAVASCRIPT_UTF_8,
        Some("json") => mime::APPLICATION_JSON,
        Some("txt") => mime::TEXT_PLAIN_UTF_8,
        Some("xml") => mime::TEXT_XML,
        Some("csv") => mime::TEXT_CSV_UTF_8,
        Some("png") => mime::IMAGE_PNG,
        Some("jpg" | "jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        Some("svg") => mime::IMAGE_SVG,
        Some("bmp") => mime::IMAGE_BMP,
        Some("pdf") => mime::APPLICATION_PDF,
        Some("woff") => mime::FONT_WOFF,
        Some("woff2") => mime::FONT_WOFF2,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    async fn fixture(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("backed-static-{name}-{}", std::process::id()));
        tokio::fs::create_dir_all(root.join("docs")).await.unwrap();
        tokio::fs::write(root.join("hello.txt"), "hello").await.unwrap();
        tokio::fs::write(root.join("docs").join("index.html"), "<h1>docs</h1>").await.unwrap();
        root
    }

    #[tokio::test]
    async fn serves_file_with_content_type() {
        let root = fixture("file").await;
        let response = StaticFiles::new(&root).lookup("/hello.txt").await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("Content-Type"), Some("text/plain; charset=utf-8"));
        assert_eq!(response.body().as_bytes(), b"hello");
    }

    #[tokio::test]
    async fn directory_serves_index() {
        let root = fixture("dir").await;
        let response = StaticFiles::new(&root).lookup("/docs").await.unwrap();
        assert_eq!(response.body().as_bytes(), b"<h1>docs</h1>");
        assert_eq!(response.headers().get("Content-Type"), Some("text/html; charset=utf-8"));
    }

    #[tokio::test]
    async fn misses_and_escapes() {
        let root = fixture("miss").await;
        let files = StaticFiles::new(&root);
        assert!(files.lookup("/missing.txt").await.is_none());
        assert!(files.lookup("/../hello.txt").await.is_none());
        assert!(files.lookup("/docs/../hello.txt").await.is_none());
        // a directory without index.html
        tokio::fs::create_dir_all(root.join("empty")).await.unwrap();
        assert!(files.lookup("/empty/").await.is_none());
    }

    #[tokio::test]
    async fn fill_keeps_handler_headers() {
        let root = fixture("fill").await;
        let files = StaticFiles::new(&root);

        let mut response = ResponseMessage::default();
        response.add_header("Cache-Control", "no-cache");
        assert!(files.fill("hello.txt", &mut response).await);
        assert_eq!(response.headers().get("Cache-Control"), Some("no-cache"));
        assert_eq!(response.body().as_bytes(), b"hello");

        let mut response = ResponseMessage::default();
        response.write("untouched");
        assert!(!files.fill("nope.txt", &mut response).await);
        assert!(!fill_from_file(&root.join("nope.txt"), &mut response).await);
        assert_eq!(response.body().as_bytes(), b"untouched");
    }

    #[test]
    fn guesses_content_types() {
        assert_eq!(content_type(Path::new("a/b.PNG")), mime::IMAGE_PNG);
        assert_eq!(content_type(Path::new("style.css")), mime::TEXT_CSS_UTF_8);
        assert_eq!(content_type(Path::new("noext")), mime::APPLICATION_OCTET_STREAM);
    }
}
