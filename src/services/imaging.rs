//! QR symbol export and image re-encoding
//!
//! Decoding and encoding are CPU bound, so both run on the blocking pool.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{ImageFormat, Luma};
use qrcode::QrCode;

use super::ServiceError;

/// Largest source image accepted for compression
pub const MAX_SOURCE_BYTES: u64 = 10 * 1024 * 1024;

/// Outcome of a compression run
#[derive(Debug, Clone, PartialEq)]
pub struct Compressed {
    pub path: PathBuf,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
}

impl Compressed {
    /// Percentage saved against the source; negative when the output grew
    pub fn reduction(&self) -> f64 {
        if self.original_bytes == 0 {
            return 0.0;
        }
        (self.original_bytes as f64 - self.compressed_bytes as f64) / self.original_bytes as f64
            * 100.0
    }
}

impl fmt::Display for Compressed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Saved {} ({} → {}, {:.2}% smaller)",
            self.path.display(),
            file_size(self.original_bytes),
            file_size(self.compressed_bytes),
            self.reduction()
        )
    }
}

/// Render `payload` as a PNG at least `size` pixels wide into `dir/name`
pub async fn export_qr_png(
    dir: &Path,
    name: &str,
    payload: String,
    size: u32,
) -> Result<PathBuf, ServiceError> {
    let dir = dir.to_path_buf();
    let path = dir.join(name);
    let target = path.clone();
    tokio::task::spawn_blocking(move || -> Result<(), ServiceError> {
        let code = QrCode::new(payload.as_bytes())?;
        let symbol = code
            .render::<Luma<u8>>()
            .min_dimensions(size, size)
            .build();
        fs::create_dir_all(&dir).map_err(|source| ServiceError::Export {
            path: target.clone(),
            source,
        })?;
        symbol.save_with_format(&target, ImageFormat::Png)?;
        Ok(())
    })
    .await??;
    tracing::info!(path = %path.display(), size, "exported qr code");
    Ok(path)
}

/// Re-encode the image at `source` into `target`, keeping its format.
///
/// JPEG honours `quality` (1-100); PNG and WebP are re-encoded losslessly.
pub async fn compress_image(
    source: PathBuf,
    target: PathBuf,
    quality: u8,
) -> Result<Compressed, ServiceError> {
    tokio::task::spawn_blocking(move || compress_blocking(&source, &target, quality)).await?
}

fn compress_blocking(source: &Path, target: &Path, quality: u8) -> Result<Compressed, ServiceError> {
    let unreadable =
        |err: std::io::Error| ServiceError::Image(format!("cannot read {}: {err}", source.display()));
    let original_bytes = fs::metadata(source).map_err(unreadable)?.len();
    if original_bytes > MAX_SOURCE_BYTES {
        return Err(ServiceError::Image(
            "file size must be less than 10MB".to_string(),
        ));
    }
    let format = ImageFormat::from_path(source)?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP) {
        return Err(ServiceError::Image(format!(
            "unsupported format {}",
            format.extensions_str().first().copied().unwrap_or("unknown")
        )));
    }
    let decoded = image::open(source)?;

    let failed = |source: std::io::Error| ServiceError::Export {
        path: target.to_path_buf(),
        source,
    };
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(failed)?;
    }
    let mut writer = BufWriter::new(File::create(target).map_err(failed)?);
    match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
            encoder.encode_image(&decoded.to_rgb8())?;
        }
        ImageFormat::Png => decoded.write_with_encoder(PngEncoder::new_with_quality(
            &mut writer,
            CompressionType::Best,
            FilterType::Adaptive,
        ))?,
        _ => decoded.write_with_encoder(WebPEncoder::new_lossless(&mut writer))?,
    }
    writer.flush().map_err(failed)?;
    drop(writer);

    let compressed = Compressed {
        path: target.to_path_buf(),
        original_bytes,
        compressed_bytes: fs::metadata(target).map_err(failed)?.len(),
    };
    tracing::info!(
        path = %compressed.path.display(),
        original = compressed.original_bytes,
        compressed = compressed.compressed_bytes,
        "compressed image"
    );
    Ok(compressed)
}

/// Human-readable byte count, e.g. `1.5 KB`
fn file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = ((bytes as f64).log(1024.0).floor() as usize).min(UNITS.len() - 1);
    let scaled = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[exponent])
}
