/// File categorization by extension for download sorting.
///
/// This module maps file extensions to one of six sorting categories
/// (images, videos, documents, music, applications, archives) using a
/// fixed lookup table.
///
/// # Examples
///
/// ```
/// use downsort::file_category::{Category, ExtensionMap};
/// use std::path::Path;
///
/// let map = ExtensionMap::default();
/// assert_eq!(map.classify_path(Path::new("photo.png")), Some(Category::Images));
/// assert_eq!(map.classify_path(Path::new("notes.xyz")), None);
/// ```
use std::collections::HashMap;
use std::path::Path;

/// One of the six sorting buckets a file can be moved into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Image files (JPG, PNG, GIF, etc.)
    Images,
    /// Video files (MP4, MKV, MOV, etc.)
    Videos,
    /// Document files (PDF, DOCX, TXT, etc.)
    Documents,
    /// Audio files (MP3, FLAC, OGG, etc.)
    Music,
    /// Installers and executables (EXE, DMG, DEB, etc.)
    Applications,
    /// Archive files (ZIP, RAR, 7Z, etc.)
    Archives,
}

impl Category {
    /// All categories, in destination-folder creation order.
    pub const ALL: [Category; 6] = [
        Category::Images,
        Category::Videos,
        Category::Documents,
        Category::Music,
        Category::Applications,
        Category::Archives,
    ];

    /// Returns the destination folder name for this category.
    ///
    /// Destination folders are immediate children of the watched folder,
    /// named by capitalized category.
    ///
    /// # Examples
    ///
    /// ```
    /// use downsort::file_category::Category;
    ///
    /// assert_eq!(Category::Images.folder_name(), "Images");
    /// assert_eq!(Category::Archives.folder_name(), "Archives");
    /// ```
    pub fn folder_name(&self) -> &'static str {
        match self {
            Category::Images => "Images",
            Category::Videos => "Videos",
            Category::Documents => "Documents",
            Category::Music => "Music",
            Category::Applications => "Applications",
            Category::Archives => "Archives",
        }
    }
}

/// Maps file extensions to categories.
///
/// The table is fixed and lookups are exact: the extension is the text
/// after the last '.', lower-cased. There is no partial matching and no
/// content sniffing; files whose extension is absent from the table are
/// classified as unrecognized and left untouched.
#[derive(Debug, Clone)]
pub struct ExtensionMap {
    extensions: HashMap<&'static str, Category>,
}

/// The fixed extension table. Keys are stored without the leading dot.
const EXTENSION_TABLE: &[(&str, Category)] = &[
    ("jpg", Category::Images),
    ("jpeg", Category::Images),
    ("png", Category::Images),
    ("gif", Category::Images),
    ("bmp", Category::Images),
    ("tiff", Category::Images),
    ("webp", Category::Images),
    ("mp4", Category::Videos),
    ("mov", Category::Videos),
    ("avi", Category::Videos),
    ("mkv", Category::Videos),
    ("wmv", Category::Videos),
    ("flv", Category::Videos),
    ("webm", Category::Videos),
    ("pdf", Category::Documents),
    ("doc", Category::Documents),
    ("docx", Category::Documents),
    ("xls", Category::Documents),
    ("xlsx", Category::Documents),
    ("ppt", Category::Documents),
    ("pptx", Category::Documents),
    ("txt", Category::Documents),
    ("rtf", Category::Documents),
    ("odt", Category::Documents),
    ("mp3", Category::Music),
    ("wav", Category::Music),
    ("flac", Category::Music),
    ("aac", Category::Music),
    ("ogg", Category::Music),
    ("m4a", Category::Music),
    ("exe", Category::Applications),
    ("msi", Category::Applications),
    ("app", Category::Applications),
    ("dmg", Category::Applications),
    ("deb", Category::Applications),
    ("rpm", Category::Applications),
    ("zip", Category::Archives),
    ("rar", Category::Archives),
    ("7z", Category::Archives),
    ("tar", Category::Archives),
    ("gz", Category::Archives),
    ("bz2", Category::Archives),
];

impl ExtensionMap {
    /// Creates a new `ExtensionMap` with the standard table.
    pub fn new() -> Self {
        Self {
            extensions: EXTENSION_TABLE.iter().copied().collect(),
        }
    }

    /// Maps a file extension (without the leading dot) to a category.
    ///
    /// # Examples
    ///
    /// ```
    /// use downsort::file_category::{Category, ExtensionMap};
    ///
    /// let map = ExtensionMap::default();
    /// assert_eq!(map.classify_extension("pdf"), Some(Category::Documents));
    /// assert_eq!(map.classify_extension("PNG"), Some(Category::Images));
    /// assert_eq!(map.classify_extension("xyz"), None);
    /// ```
    pub fn classify_extension(&self, ext: &str) -> Option<Category> {
        self.extensions.get(ext.to_lowercase().as_str()).copied()
    }

    /// Classifies a file path by its extension.
    ///
    /// The extension is the text after the last '.' of the filename,
    /// matched case-insensitively. Returns `None` for files without an
    /// extension or with an extension absent from the table.
    pub fn classify_path(&self, path: &Path) -> Option<Category> {
        let ext = path.extension()?.to_str()?;
        self.classify_extension(ext)
    }
}

impl Default for ExtensionMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_names_are_capitalized() {
        assert_eq!(Category::Images.folder_name(), "Images");
        assert_eq!(Category::Videos.folder_name(), "Videos");
        assert_eq!(Category::Documents.folder_name(), "Documents");
        assert_eq!(Category::Music.folder_name(), "Music");
        assert_eq!(Category::Applications.folder_name(), "Applications");
        assert_eq!(Category::Archives.folder_name(), "Archives");
    }

    #[test]
    fn test_folder_names_are_distinct() {
        let mut names: Vec<_> = Category::ALL.iter().map(|c| c.folder_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Category::ALL.len());
    }

    #[test]
    fn test_classify_extension_per_category() {
        let map = ExtensionMap::default();
        assert_eq!(map.classify_extension("jpg"), Some(Category::Images));
        assert_eq!(map.classify_extension("webp"), Some(Category::Images));
        assert_eq!(map.classify_extension("mkv"), Some(Category::Videos));
        assert_eq!(map.classify_extension("odt"), Some(Category::Documents));
        assert_eq!(map.classify_extension("xlsx"), Some(Category::Documents));
        assert_eq!(map.classify_extension("flac"), Some(Category::Music));
        assert_eq!(map.classify_extension("dmg"), Some(Category::Applications));
        assert_eq!(map.classify_extension("7z"), Some(Category::Archives));
    }

    #[test]
    fn test_classify_extension_case_insensitive() {
        let map = ExtensionMap::default();
        assert_eq!(map.classify_extension("JPG"), Some(Category::Images));
        assert_eq!(map.classify_extension("Mp3"), Some(Category::Music));
        assert_eq!(map.classify_extension("ZIP"), Some(Category::Archives));
    }

    #[test]
    fn test_classify_extension_unknown() {
        let map = ExtensionMap::default();
        assert_eq!(map.classify_extension("xyz"), None);
        assert_eq!(map.classify_extension(""), None);
        // No partial matches: "jpg2" is not "jpg".
        assert_eq!(map.classify_extension("jpg2"), None);
    }

    #[test]
    fn test_classify_path_uses_last_dot() {
        let map = ExtensionMap::default();
        assert_eq!(
            map.classify_path(Path::new("archive.tar.gz")),
            Some(Category::Archives)
        );
        assert_eq!(
            map.classify_path(Path::new("IMG.JPG")),
            Some(Category::Images)
        );
        assert_eq!(map.classify_path(Path::new("Makefile")), None);
        assert_eq!(map.classify_path(Path::new("report.xyz")), None);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let map = ExtensionMap::default();
        for _ in 0..3 {
            assert_eq!(
                map.classify_path(Path::new("song.ogg")),
                Some(Category::Music)
            );
        }
    }
}
