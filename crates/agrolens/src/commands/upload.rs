use crate::settings;
use agrolens_telemetry::Paths;
use std::path::Path;

/// MIME type guessed from the file extension
fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("heic") => "image/heic",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

pub fn run(path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let paths = Paths::new()?;
    let coordinator = settings::coordinator(&paths)?;
    let session = coordinator.upload(&bytes, &file_name, guess_mime(path))?;
    let key = session.key();

    println!("Uploaded {} ({} bytes)", session.file_name, session.size_bytes);
    println!("Key: {}", key);
    if coordinator.is_cached(&key) {
        println!("A cached diagnosis exists; `agrolens analyze` will not call the service.");
    }
    Ok(())
}
