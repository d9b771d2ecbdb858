//! Writing generated documents to disk

use std::path::{Path, PathBuf};

use super::imaging::{compress_image, export_qr_png};
use super::ServiceError;

/// Work behind a tool's export action
#[derive(Debug, Clone, PartialEq)]
pub enum ExportJob {
    /// Write a text document
    Text {
        file: &'static str,
        contents: String,
    },
    /// Render the payload as a PNG symbol `size` pixels wide
    QrCode {
        file: &'static str,
        payload: String,
        size: u32,
    },
    /// Re-encode `source` under a new name
    Compress {
        source: PathBuf,
        file: String,
        quality: u8,
    },
}

impl ExportJob {
    /// Run the job into `dir`, returning the message shown on success
    pub async fn run(self, dir: &Path) -> Result<String, ServiceError> {
        match self {
            ExportJob::Text { file, contents } => export_text(dir, file, &contents)
                .await
                .map(|path| format!("Exported to {}", path.display())),
            ExportJob::QrCode {
                file,
                payload,
                size,
            } => export_qr_png(dir, file, payload, size)
                .await
                .map(|path| format!("QR code saved to {}", path.display())),
            ExportJob::Compress {
                source,
                file,
                quality,
            } => compress_image(source, dir.join(file), quality)
                .await
                .map(|compressed| compressed.to_string()),
        }
    }
}

/// Write `contents` to `dir/name`, creating `dir` if needed.
/// Returns the path written.
pub async fn export_text(dir: &Path, name: &str, contents: &str) -> Result<PathBuf, ServiceError> {
    let path = dir.join(name);
    let failed = |source: std::io::Error| ServiceError::Export {
        path: path.clone(),
        source,
    };
    tokio::fs::create_dir_all(dir).await.map_err(failed)?;
    tokio::fs::write(&path, contents).await.map_err(failed)?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "exported file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_export_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let path = export_text(&target, "resume.md", "# Me\n").await.unwrap();
        assert_eq!(path, target.join("resume.md"));
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "# Me\n");
    }

    #[tokio::test]
    async fn test_text_job_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let job = ExportJob::Text {
            file: "resume.md",
            contents: "# Me\n".to_string(),
        };
        let message = job.run(dir.path()).await.unwrap();
        assert_eq!(
            message,
            format!("Exported to {}", dir.path().join("resume.md").display())
        );
    }

    #[tokio::test]
    async fn test_export_into_a_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        tokio::fs::write(&blocker, "x").await.unwrap();
        let err = export_text(&blocker, "resume.md", "x").await.unwrap_err();
        assert!(matches!(err, ServiceError::Export { .. }));
    }
}
