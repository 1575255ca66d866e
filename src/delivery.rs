//! Rendered artifacts and how they leave the process

use crate::error::Result;
use crate::html_renderer::escape_html;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::path::{Path, PathBuf};

pub const HTML_FILE_NAME: &str = "labels.html";
pub const PDF_FILE_NAME: &str = "material_labels.pdf";

/// A finished, downloadable label document.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn html(document: String) -> Self {
        Self {
            file_name: HTML_FILE_NAME.to_string(),
            content_type: "text/html".to_string(),
            bytes: document.into_bytes(),
        }
    }

    pub fn pdf(document: Vec<u8>) -> Self {
        Self {
            file_name: PDF_FILE_NAME.to_string(),
            content_type: "application/pdf".to_string(),
            bytes: document,
        }
    }

    /// Where [`Artifact::write_to`] puts the file for a given target.
    pub fn resolve_target(&self, target: &Path) -> PathBuf {
        if target.is_dir() {
            target.join(&self.file_name)
        } else {
            target.to_path_buf()
        }
    }

    /// Write the artifact to `target`; a directory receives the fixed file name.
    pub fn write_to<P: AsRef<Path>>(&self, target: P) -> Result<PathBuf> {
        let path = self.resolve_target(target.as_ref());
        fs::write(&path, &self.bytes)?;
        log::info!("Wrote {} ({} bytes) to {}", self.file_name, self.bytes.len(), path.display());
        Ok(path)
    }

    /// The artifact inlined as a base64 `data:` URI.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }

    /// An anchor that downloads the artifact under its fixed file name.
    pub fn download_link(&self, text: &str) -> String {
        format!(
            "<a href=\"{}\" download=\"{}\">{}</a>",
            self.data_uri(),
            escape_html(&self.file_name),
            escape_html(text)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_names_and_types() {
        let html = Artifact::html("<html></html>".into());
        assert_eq!(html.file_name, "labels.html");
        assert_eq!(html.content_type, "text/html");
        let pdf = Artifact::pdf(b"%PDF-1.4".to_vec());
        assert_eq!(pdf.file_name, "material_labels.pdf");
        assert_eq!(pdf.content_type, "application/pdf");
    }

    #[test]
    fn test_data_uri() {
        let artifact = Artifact::html("hi".into());
        assert_eq!(artifact.data_uri(), "data:text/html;base64,aGk=");
    }

    #[test]
    fn test_download_link() {
        let link = Artifact::html("hi".into()).download_link("点击下载标签文件");
        assert_eq!(
            link,
            "<a href=\"data:text/html;base64,aGk=\" download=\"labels.html\">点击下载标签文件</a>"
        );
    }

    #[test]
    fn test_write_into_directory_uses_fixed_name() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = Artifact::pdf(b"%PDF-1.4\n".to_vec());
        let path = artifact.write_to(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("material_labels.pdf"));
        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.4\n");

        let explicit = dir.path().join("batch-7.pdf");
        assert_eq!(artifact.write_to(&explicit).unwrap(), explicit);
    }
}
