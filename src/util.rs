//! Shared filesystem helpers.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Write `content` to `path`, creating parent directories as needed.
pub fn output_file(content: &str, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)
}

/// Remove everything inside `dir`, leaving the directory itself in place.
/// A missing directory is fine; the build creates it on first write.
pub fn clear_directory(dir: &Path) -> std::io::Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(entry.path())?;
        } else {
            std::fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

/// Recursively copy `src` into `dst`, preserving relative paths.
/// Returns the number of files copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<usize> {
    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(std::io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(std::io::Error::other)?;
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Map a content file to its output file path: the path relative to the
/// content root, mirrored under the output root with a `.html` extension.
pub fn output_path(content_dir: &Path, output_dir: &Path, target: &Path) -> PathBuf {
    let mut relative = target
        .strip_prefix(content_dir)
        .unwrap_or(target)
        .to_path_buf();
    relative.set_extension("html");
    output_dir.join(relative)
}

/// Map a content file to its site URL: the base URL joined with the
/// slash-separated relative path, extension rewritten to `.html`.
pub fn output_url(content_dir: &Path, url_base: &str, target: &Path) -> String {
    let mut relative = target
        .strip_prefix(content_dir)
        .unwrap_or(target)
        .to_path_buf();
    relative.set_extension("html");

    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");

    format!("{}/{}", url_base.trim_end_matches('/'), joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_rewrites_extension() {
        let path = output_path(
            Path::new("/site/content"),
            Path::new("/site/output"),
            Path::new("/site/content/posts/hello.md"),
        );
        assert_eq!(path, Path::new("/site/output/posts/hello.html"));
    }

    #[test]
    fn test_output_url_uses_forward_slashes() {
        let url = output_url(
            Path::new("/site/content"),
            "https://example.com/",
            Path::new("/site/content/posts/hello.md"),
        );
        assert_eq!(url, "https://example.com/posts/hello.html");
    }

    #[test]
    fn test_output_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.html");
        output_file("hello", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_clear_directory_keeps_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("nested/deep")).unwrap();
        std::fs::write(dir.path().join("file.txt"), "x").unwrap();
        clear_directory(dir.path()).unwrap();
        assert!(dir.path().is_dir());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_copy_dir_recursive() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("css")).unwrap();
        std::fs::write(src.path().join("css/main.css"), "body {}").unwrap();
        std::fs::write(src.path().join("logo.svg"), "<svg/>").unwrap();

        let copied = copy_dir_recursive(src.path(), dst.path()).unwrap();
        assert_eq!(copied, 2);
        assert!(dst.path().join("css/main.css").is_file());
        assert!(dst.path().join("logo.svg").is_file());
    }
}
