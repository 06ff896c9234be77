use std::fs::{self, FileTimes, OpenOptions};
use std::io;
use std::path::Path;

/// Copy `src` to `dst`, overwriting, and carry over permissions plus
/// access/modification times. Returns the number of bytes copied.
///
/// Every handle opened here is dropped before returning, on success or error.
pub fn copy_with_metadata(src: &Path, dst: &Path) -> io::Result<u64> {
    let meta = fs::metadata(src)?;

    // a read-only copy from an earlier run cannot be truncated in place
    if let Ok(existing) = fs::symlink_metadata(dst) {
        if existing.is_file() && existing.permissions().readonly() {
            fs::remove_file(dst)?;
        }
    }

    // fs::copy truncates an existing destination and copies permission bits
    let bytes = fs::copy(src, dst)?;

    let mut times = FileTimes::new();
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }

    // the bytes are in place at this point, so a timestamp failure must not
    // turn the row into an error
    if let Err(e) = preserve_times(dst, times) {
        tracing::warn!("copied {} but could not preserve its timestamps: {}", dst.display(), e);
    }
    Ok(bytes)
}

fn preserve_times(dst: &Path, times: FileTimes) -> io::Result<()> {
    // a read-only copy cannot be opened for write
    let file = OpenOptions::new().write(true).open(dst)?;
    file.set_times(times)
}

/// Return true if the given path's extension matches any of the configured
/// file_extensions patterns ("*.wav", "wav", ".wav"), case-insensitive.
pub fn path_matches_extensions(path: &Path, exts: &[String]) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(s) => s.to_ascii_lowercase(),
        None => return false,
    };
    exts.iter().any(|pat| {
        let p = pat.trim();
        let p = p.strip_prefix("*.").or_else(|| p.strip_prefix('.')).unwrap_or(p);
        !p.is_empty() && ext == p.to_ascii_lowercase()
    })
}
