//! Output directory layout.

use std::path::{Component, Path, PathBuf};

/// Folder receiving censored copies
pub const CENSORED_DIR_NAME: &str = "CENSORED";
/// Folder receiving optimized, watermarked copies
pub const WATERMARK_DIR_NAME: &str = "WATERMARK_DEMO";

/// Where a run reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Directory the censor stage reads
    pub input: PathBuf,
    /// Censor stage output, a sibling of `input`
    pub censored: PathBuf,
    /// Watermark stage output, a sibling of `input`
    pub watermarked: PathBuf,
}

impl OutputLayout {
    pub fn for_input(input: &Path) -> Self {
        let input = normalize(input);
        Self {
            censored: censored_dir(&input),
            watermarked: watermark_dir(&input),
            input,
        }
    }
}

/// `CENSORED` next to the processed folder
pub fn censored_dir(input: &Path) -> PathBuf {
    sibling(input, CENSORED_DIR_NAME)
}

/// `WATERMARK_DEMO` next to the processed folder
pub fn watermark_dir(input: &Path) -> PathBuf {
    sibling(input, WATERMARK_DIR_NAME)
}

/// `{folder}_{index}.jpg`, with a 1-based index
pub fn watermark_file_name(folder: &str, index: usize) -> String {
    format!("{}_{}.jpg", folder, index)
}

/// Final component of a directory path as a string
pub fn folder_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn sibling(input: &Path, name: &str) -> PathBuf {
    let input = normalize(input);
    match input.parent() {
        Some(parent) => parent.join(name),
        None => input.join(name),
    }
}

/// Make a path absolute and resolve `.` and `..` without touching the
/// filesystem, so trailing separators and `..` cannot move the siblings.
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_are_siblings_of_input() {
        let layout = OutputLayout::for_input(Path::new("/shoots/beach"));
        assert_eq!(layout.input, PathBuf::from("/shoots/beach"));
        assert_eq!(layout.censored, PathBuf::from("/shoots/CENSORED"));
        assert_eq!(layout.watermarked, PathBuf::from("/shoots/WATERMARK_DEMO"));
    }

    #[test]
    fn trailing_separator_and_dots_are_ignored() {
        assert_eq!(
            censored_dir(Path::new("/shoots/beach/")),
            PathBuf::from("/shoots/CENSORED")
        );
        assert_eq!(
            censored_dir(Path::new("/shoots/./other/../beach")),
            PathBuf::from("/shoots/CENSORED")
        );
    }

    #[test]
    fn relative_input_is_resolved() {
        let cwd = std::env::current_dir().unwrap();
        let expected = cwd.join("CENSORED");
        assert_eq!(censored_dir(Path::new("photos")), expected);
    }

    #[test]
    fn watermark_names_are_one_based() {
        assert_eq!(watermark_file_name("CENSORED", 1), "CENSORED_1.jpg");
        assert_eq!(watermark_file_name("CENSORED", 12), "CENSORED_12.jpg");
        assert_eq!(folder_name(Path::new("/shoots/CENSORED")), "CENSORED");
    }
}
