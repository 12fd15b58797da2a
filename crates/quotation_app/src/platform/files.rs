use std::fs;
use std::io;
use std::path::Path;

use app_logging::app_warn;
use quotation_core::SelectedFile;

/// Builds an upload candidate from a path on disk. The MIME type is guessed
/// from the extension; unknown extensions become `application/octet-stream`.
pub fn candidate_from_path(path: &Path) -> io::Result<SelectedFile> {
    let meta = fs::metadata(path)?;
    if !meta.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    Ok(SelectedFile::new(name, meta.len(), mime_type, path))
}

/// Candidates for every readable path. Unreadable paths are logged and
/// returned separately so the caller can report them.
pub fn collect_candidates<P: AsRef<Path>>(paths: &[P]) -> (Vec<SelectedFile>, Vec<String>) {
    let mut candidates = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for path in paths {
        let path = path.as_ref();
        match candidate_from_path(path) {
            Ok(candidate) => candidates.push(candidate),
            Err(err) => {
                app_warn!("Skipping {:?}: {}", path, err);
                unreadable.push(format!("{}: {}", path.display(), err));
            }
        }
    }
    (candidates, unreadable)
}
