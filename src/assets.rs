use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Profiles,
    Posters,
    Photos,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 3] = [Self::Profiles, Self::Posters, Self::Photos];

    /// Subdirectory of the assets root holding this category.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Profiles => "profile_pictures",
            Self::Posters => "event_posters",
            Self::Photos => "photos",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    pub filename: String,
    /// Human-readable name derived from the filename.
    pub name: String,
    /// Path relative to the public root, e.g. `assets/photos/2022_1.png`.
    pub path: String,
    pub category: AssetCategory,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetSummary {
    pub profiles: usize,
    pub posters: usize,
    pub photos: usize,
}

/// Lists the images of `category` under `assets_dir`, sorted by filename.
///
/// A missing category directory is not an error and yields no assets.
pub fn discover(
    assets_dir: &Path,
    category: AssetCategory,
) -> anyhow::Result<Vec<AssetDescriptor>> {
    let dir = assets_dir.join(category.dir_name());
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(&dir)
        .with_context(|| format!("read asset dir: {}", dir.display()))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("list asset dir: {}", dir.display()))?;

    let mut assets = Vec::new();
    for entry in entries {
        let file_type = entry.file_type().context("read asset entry type")?;
        if !file_type.is_file() {
            continue;
        }
        let Some(filename) = entry.file_name().to_str().map(str::to_owned) else {
            tracing::debug!(path = %entry.path().display(), "skipping non-utf8 asset name");
            continue;
        };
        if !is_image_filename(&filename) {
            continue;
        }

        let stem = Path::new(&filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&filename);
        assets.push(AssetDescriptor {
            name: display_name(stem),
            path: format!("assets/{}/{filename}", category.dir_name()),
            filename,
            category,
        });
    }

    assets.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(assets)
}

pub fn summary(assets_dir: &Path) -> anyhow::Result<AssetSummary> {
    Ok(AssetSummary {
        profiles: discover(assets_dir, AssetCategory::Profiles)?.len(),
        posters: discover(assets_dir, AssetCategory::Posters)?.len(),
        photos: discover(assets_dir, AssetCategory::Photos)?.len(),
    })
}

fn is_image_filename(filename: &str) -> bool {
    if filename.starts_with('.') {
        return false;
    }
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

/// `2022_1` → `Event Photo 1`, `john-doe` → `John Doe`.
pub fn display_name(stem: &str) -> String {
    if let Some(number) = event_photo_number(stem) {
        return format!("Event Photo {number}");
    }

    let mut out = String::with_capacity(stem.len());
    let mut prev_is_word = false;
    for c in stem.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        let is_word = c.is_ascii_alphanumeric();
        if is_word && !prev_is_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out
}

/// Matches `NNNN_N+` and returns the part after the underscore.
fn event_photo_number(stem: &str) -> Option<&str> {
    let (year, number) = stem.split_once('_')?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if year.len() == 4 && all_digits(year) && all_digits(number) {
        Some(number)
    } else {
        None
    }
}

/// Reads `<name>-config.json` from `content_dir`; an absent file is an empty map.
pub fn load_config<T>(content_dir: &Path, name: &str) -> anyhow::Result<BTreeMap<String, T>>
where
    T: DeserializeOwned,
{
    let path = content_dir.join(format!("{name}-config.json"));
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("read asset config: {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parse asset config: {}", path.display()))
}
