use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::container::EXTENSION;

const TEMP_EXT: &str = "tmp"; // For atomic writes

/// Read entire file into a Vec<u8>
pub fn read_file(path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
}

/// Write `data` through a temp file and rename it into place.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn write_file_atomic(path: &Path, data: &[u8], force: bool) -> io::Result<()> {
    if path.exists() && !force {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists (use --force to overwrite)", path.display()),
        ));
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".");
    temp_name.push(TEMP_EXT);
    let temp_path = PathBuf::from(temp_name);

    let result = fs::write(&temp_path, data).and_then(|()| fs::rename(&temp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// `video.mp4` -> `video.mp4.hfp`
pub fn compressed_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(EXTENSION);
    PathBuf::from(name)
}

/// `video.mp4.hfp` -> `video.mp4`; anything else gets `.out` appended.
pub fn decompressed_path(input: &Path) -> PathBuf {
    if input.extension().is_some_and(|ext| ext == EXTENSION) {
        input.with_extension("")
    } else {
        let mut name = input.as_os_str().to_owned();
        name.push(".out");
        PathBuf::from(name)
    }
}

/// Format bytes into human-readable string (e.g. 1024 -> "1.00 KB")
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

/// Lowercase hex rendering of a digest.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
