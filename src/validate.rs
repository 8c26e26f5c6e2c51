//! File acceptance checks for incoming selections.
//!
//! Declared MIME types are unreliable across platforms, so a file is accepted
//! when EITHER the declared type or the file extension matches the allow-list.

/// MIME strings browsers and pickers report for the supported containers.
const ACCEPTED_MIME_TYPES: [&str; 11] = [
    "video/mp4",
    "video/avi",
    "video/mov",
    "video/quicktime",
    "video/mkv",
    "video/webm",
    "video/ogg",
    "video/flv",
    "video/wmv",
    "video/3gp",
    "video/m4v",
];

const ACCEPTED_EXTENSIONS: [&str; 10] = [
    "mp4", "avi", "mov", "mkv", "webm", "ogg", "flv", "wmv", "3gp", "m4v",
];

/// Lowercased final extension of a file name, if any.
pub fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Inclusive OR: a recognized declared type alone or a recognized extension
/// alone is sufficient. Never errors; callers decide how to surface rejection.
pub fn is_acceptable(name: &str, declared_type: &str) -> bool {
    if ACCEPTED_MIME_TYPES.contains(&declared_type) {
        return true;
    }
    extension_of(name).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mp4_with_declared_type_accepted() {
        assert!(is_acceptable("clip.mp4", "video/mp4"));
    }

    #[test]
    fn mkv_with_empty_type_accepted_by_extension() {
        assert!(is_acceptable("clip.mkv", ""));
    }

    #[test]
    fn quicktime_type_with_odd_extension_accepted_by_type() {
        assert!(is_acceptable("export.qtmov", "video/quicktime"));
    }

    #[test]
    fn image_rejected() {
        assert!(!is_acceptable("photo.jpg", "image/jpeg"));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert!(is_acceptable("CLIP.MP4", ""));
        assert!(is_acceptable("movie.WebM", ""));
    }

    #[test]
    fn no_extension_no_type_rejected() {
        assert!(!is_acceptable("clip", ""));
        assert!(!is_acceptable(".mp4", ""));
    }

    #[test]
    fn extension_of_basics() {
        assert_eq!(extension_of("clip.mp4").as_deref(), Some("mp4"));
        assert_eq!(extension_of("a.b.MKV").as_deref(), Some("mkv"));
        assert_eq!(extension_of("noext"), None);
        assert_eq!(extension_of(".hidden"), None);
    }
}
