use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageListError {
    #[error("failed to read image list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image list {0} contains no references")]
    Empty(PathBuf),
}

/// Reads one image reference per line. Trailing whitespace is stripped and
/// blank lines are skipped; order is preserved.
pub fn read_image_list(path: &Path) -> Result<Vec<String>, ImageListError> {
    let text = fs::read_to_string(path).map_err(|source| ImageListError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let references = parse_image_list(&text);
    if references.is_empty() {
        return Err(ImageListError::Empty(path.to_path_buf()));
    }
    Ok(references)
}

fn parse_image_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
