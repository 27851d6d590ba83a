use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::assets::AssetCategory;

/// How a section combines its markdown with auto-generated markup.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Rendered markdown only.
    #[default]
    Manual,
    /// Generated table replaces the first hand-authored table, or is appended.
    Auto,
    /// A hand-authored table wins; otherwise the generated table is appended.
    AutoWithOverride,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Generator {
    PhotoGallery,
    EventsTable,
    OfficersTable,
}

impl Generator {
    pub fn category(self) -> AssetCategory {
        match self {
            Self::PhotoGallery => AssetCategory::Photos,
            Self::EventsTable => AssetCategory::Posters,
            Self::OfficersTable => AssetCategory::Profiles,
        }
    }

    /// Stem of the optional `<name>-config.json` in the content directory.
    pub fn config_name(self) -> &'static str {
        match self {
            Self::PhotoGallery => "photos",
            Self::EventsTable => "events",
            Self::OfficersTable => "officers",
        }
    }
}

/// Class attached to `<img>` tags whose `src` contains `needle`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageClass {
    pub needle: String,
    pub class: String,
}

impl ImageClass {
    pub fn new(needle: &str, class: &str) -> Self {
        Self {
            needle: needle.to_owned(),
            class: class.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionSpec {
    /// Content file stem: `content/<key>.md`.
    pub key: String,
    /// Placeholder ID used in the template comment.
    pub placeholder: String,
    #[serde(default)]
    pub mode: GenerationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<Generator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_class: Option<ImageClass>,
}

impl SectionSpec {
    fn new(key: &str, placeholder: &str) -> Self {
        Self {
            key: key.to_owned(),
            placeholder: placeholder.to_owned(),
            mode: GenerationMode::Manual,
            generator: None,
            image_class: None,
        }
    }

    fn generated(mut self, mode: GenerationMode, generator: Generator) -> Self {
        self.mode = mode;
        self.generator = Some(generator);
        self
    }

    fn tag_images(mut self, needle: &str, class: &str) -> Self {
        self.image_class = Some(ImageClass::new(needle, class));
        self
    }

    /// The generator to run for this section, if its mode asks for one.
    pub fn active_generator(&self) -> Option<Generator> {
        match self.mode {
            GenerationMode::Manual => None,
            GenerationMode::Auto | GenerationMode::AutoWithOverride => self.generator,
        }
    }
}

pub fn default_sections() -> Vec<SectionSpec> {
    vec![
        SectionSpec::new("chaplain", "OUR-CHAPLAIN").tag_images("tyagananda", "chaplain-photo"),
        SectionSpec::new("mit-hsc", "MIT-HSC"),
        SectionSpec::new("events", "EVENTS")
            .generated(GenerationMode::AutoWithOverride, Generator::EventsTable)
            .tag_images("event_posters", "event-poster"),
        SectionSpec::new("photos", "PHOTOS")
            .generated(GenerationMode::Auto, Generator::PhotoGallery)
            .tag_images("photos", "gallery-photo"),
        SectionSpec::new("officers", "OFFICERS")
            .generated(GenerationMode::AutoWithOverride, Generator::OfficersTable)
            .tag_images("profile_pictures", "profile-picture"),
    ]
}

/// Immutable site layout handed to the build, watcher and server.
///
/// Directory fields are relative to the site root until [`SiteConfig::rooted`]
/// resolves them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub content_dir: PathBuf,
    pub public_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub template_file: String,
    pub backup_file: String,
    pub sections: Vec<SectionSpec>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            public_dir: PathBuf::from("public"),
            assets_dir: PathBuf::from("public").join("assets"),
            template_file: "index.html".to_owned(),
            backup_file: "index.backup.html".to_owned(),
            sections: default_sections(),
        }
    }
}

impl SiteConfig {
    /// Defaults, or the YAML file at `config_path`, resolved against `root`.
    pub fn load(root: &Path, config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => {
                let yaml = std::fs::read_to_string(path)
                    .with_context(|| format!("read site config: {}", path.display()))?;
                serde_yaml::from_str::<SiteConfig>(&yaml)
                    .with_context(|| format!("parse site config: {}", path.display()))?
            }
            None => SiteConfig::default(),
        };
        config.validate()?;
        Ok(config.rooted(root))
    }

    pub fn rooted(mut self, root: &Path) -> Self {
        self.content_dir = root.join(&self.content_dir);
        self.public_dir = root.join(&self.public_dir);
        self.assets_dir = root.join(&self.assets_dir);
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sections.is_empty() {
            anyhow::bail!("site config must define at least one section");
        }

        let mut keys = HashSet::new();
        let mut placeholders = HashSet::new();
        for section in &self.sections {
            if section.key.trim().is_empty() || section.placeholder.trim().is_empty() {
                anyhow::bail!("section key and placeholder must not be empty");
            }
            if !keys.insert(section.key.as_str()) {
                anyhow::bail!("duplicate section key: {}", section.key);
            }
            if !placeholders.insert(section.placeholder.as_str()) {
                anyhow::bail!("duplicate section placeholder: {}", section.placeholder);
            }
        }
        Ok(())
    }

    pub fn template_path(&self) -> PathBuf {
        self.public_dir.join(&self.template_file)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.public_dir.join(&self.backup_file)
    }

    pub fn content_path(&self, section: &SectionSpec) -> PathBuf {
        self.content_dir.join(format!("{}.md", section.key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_five_unique_sections() -> anyhow::Result<()> {
        let config = SiteConfig::default();
        config.validate()?;

        let placeholders: Vec<_> = config
            .sections
            .iter()
            .map(|s| s.placeholder.as_str())
            .collect();
        assert_eq!(
            placeholders,
            vec!["OUR-CHAPLAIN", "MIT-HSC", "EVENTS", "PHOTOS", "OFFICERS"]
        );
        Ok(())
    }

    #[test]
    fn manual_mode_disables_generator() {
        let mut section = SiteConfig::default().sections.remove(4);
        assert_eq!(section.active_generator(), Some(Generator::OfficersTable));

        section.mode = GenerationMode::Manual;
        assert_eq!(section.active_generator(), None);
    }

    #[test]
    fn yaml_overrides_sections_and_keeps_path_defaults() -> anyhow::Result<()> {
        let yaml = r#"
sections:
  - key: events
    placeholder: EVENTS
    mode: manual
    generator: events_table
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;

        assert_eq!(config.template_file, "index.html");
        assert_eq!(config.sections.len(), 1);
        assert_eq!(config.sections[0].mode, GenerationMode::Manual);
        assert_eq!(config.sections[0].active_generator(), None);
        Ok(())
    }

    #[test]
    fn validate_rejects_duplicate_placeholders() {
        let mut config = SiteConfig::default();
        config.sections[1].placeholder = "OUR-CHAPLAIN".to_owned();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate section placeholder"));
    }

    #[test]
    fn rooted_resolves_paths() {
        let config = SiteConfig::default().rooted(Path::new("/site"));
        assert_eq!(config.template_path(), PathBuf::from("/site/public/index.html"));
        assert_eq!(
            config.backup_path(),
            PathBuf::from("/site/public/index.backup.html")
        );
        assert_eq!(config.assets_dir, PathBuf::from("/site/public/assets"));
    }
}
