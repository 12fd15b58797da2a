use crate::SelectedFile;

/// Extensions accepted regardless of the reported MIME type.
pub const ALLOWED_EXTENSIONS: [&str; 7] = [".pdf", ".jpg", ".jpeg", ".png", ".heic", ".heif", ".webp"];

/// PDFs and raster images pass. Either the MIME type or the extension may qualify a file.
pub fn is_allowed(file: &SelectedFile) -> bool {
    let mime = file.mime_type.as_str();
    let type_ok = mime == "application/pdf"
        || mime == "application/octet-stream"
        || mime.starts_with("image/");
    if type_ok {
        return true;
    }
    let lower_name = file.name.to_lowercase();
    ALLOWED_EXTENSIONS
        .iter()
        .any(|ext| lower_name.ends_with(ext))
}

/// Keeps the allowed candidates in their original order.
pub fn accept_files(candidates: Vec<SelectedFile>) -> Vec<SelectedFile> {
    candidates.into_iter().filter(is_allowed).collect()
}
