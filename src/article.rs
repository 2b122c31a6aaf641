use std::path::Path;

use crate::error::{NewsreelError, NewsreelResult};
use crate::model::{Article, ImageRef};

/// Default filename prefix for article images (`imagen0.jpg`, `imagen1.jpg`, ...).
pub const DEFAULT_IMAGE_PREFIX: &str = "imagen";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Read the article text and discover its images: files named
/// `<prefix><number>.<ext>` in `image_dir`, ordered by number. Every
/// discovered file must decode as an image.
pub fn load_article(
    text_path: &Path,
    image_dir: &Path,
    image_prefix: &str,
) -> NewsreelResult<Article> {
    let text = std::fs::read_to_string(text_path).map_err(|e| {
        NewsreelError::input(format!(
            "failed to read article text '{}': {e}",
            text_path.display()
        ))
    })?;
    if text.trim().is_empty() {
        return Err(NewsreelError::input(format!(
            "article text '{}' is empty",
            text_path.display()
        )));
    }

    let mut numbered = Vec::new();
    let entries = std::fs::read_dir(image_dir).map_err(|e| {
        NewsreelError::input(format!(
            "failed to read image directory '{}': {e}",
            image_dir.display()
        ))
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| {
            NewsreelError::input(format!(
                "failed to read image directory '{}': {e}",
                image_dir.display()
            ))
        })?;
        let path = entry.path();
        let Some(number) = image_number(&path, image_prefix) else {
            continue;
        };

        image::image_dimensions(&path).map_err(|e| {
            NewsreelError::input(format!("'{}' is not a readable image: {e}", path.display()))
        })?;
        numbered.push((number, path));
    }

    if numbered.is_empty() {
        return Err(NewsreelError::input(format!(
            "no images matching '{image_prefix}<number>' found in '{}'",
            image_dir.display()
        )));
    }

    numbered.sort_by_key(|(number, _)| *number);
    let images = numbered
        .into_iter()
        .enumerate()
        .map(|(index, (_, path))| ImageRef { path, index })
        .collect();

    Ok(Article { text, images })
}

fn image_number(path: &Path, prefix: &str) -> Option<u32> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix(prefix)?.parse().ok()
}
