use anyhow::Context as _;

use crate::assets::{self, AssetSummary};
use crate::cli::BuildArgs;
use crate::config::{GenerationMode, Generator, SectionSpec, SiteConfig};
use crate::formats::{EventRecord, OfficerRecord};
use crate::gallery;
use crate::inject::Template;
use crate::markdown;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Start from the pristine backup instead of the (possibly already
    /// injected) template, so a rebuild finds every placeholder again.
    pub from_backup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionOutcome {
    Updated,
    Skipped { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionReport {
    pub key: String,
    pub placeholder: String,
    pub outcome: SectionOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub sections: Vec<SectionReport>,
    pub assets: AssetSummary,
}

impl BuildReport {
    pub fn updated(&self) -> usize {
        self.sections
            .iter()
            .filter(|s| s.outcome == SectionOutcome::Updated)
            .count()
    }

    pub fn total(&self) -> usize {
        self.sections.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.updated() == self.total()
    }

    pub fn section(&self, key: &str) -> Option<&SectionReport> {
        self.sections.iter().find(|s| s.key == key)
    }
}

pub fn run(args: BuildArgs) -> anyhow::Result<BuildReport> {
    let config = args.site.load()?;
    build_site(
        &config,
        &BuildOptions {
            from_backup: args.from_backup,
        },
    )
}

/// Renders every configured section into the template and writes it once.
///
/// Missing content files, unreadable asset configs and missing placeholders
/// are recorded per section; filesystem failures on the template abort the
/// build.
pub fn build_site(config: &SiteConfig, options: &BuildOptions) -> anyhow::Result<BuildReport> {
    let template_path = config.template_path();
    tracing::info!(template = %template_path.display(), "building site");

    ensure_backup(config)?;
    let mut template = if options.from_backup {
        Template::load(&config.backup_path()).context("load template backup")?
    } else {
        Template::load(&template_path)?
    };

    let mut sections = Vec::with_capacity(config.sections.len());
    for section in &config.sections {
        let outcome = build_section(config, section, &mut template)?;
        match &outcome {
            SectionOutcome::Updated => {
                tracing::info!(section = %section.placeholder, "updated section");
            }
            SectionOutcome::Skipped { reason } => {
                tracing::warn!(section = %section.placeholder, %reason, "skipped section");
            }
            SectionOutcome::Failed { reason } => {
                tracing::error!(section = %section.placeholder, %reason, "failed section");
            }
        }
        sections.push(SectionReport {
            key: section.key.clone(),
            placeholder: section.placeholder.clone(),
            outcome,
        });
    }

    let assets = assets::summary(&config.assets_dir)?;
    let report = BuildReport { sections, assets };

    if report.updated() > 0 {
        template.write(&template_path)?;
    }

    tracing::info!(
        profiles = assets.profiles,
        posters = assets.posters,
        photos = assets.photos,
        "discovered assets"
    );
    tracing::info!(
        "build complete: {}/{} sections updated",
        report.updated(),
        report.total()
    );

    Ok(report)
}

fn ensure_backup(config: &SiteConfig) -> anyhow::Result<()> {
    let backup_path = config.backup_path();
    if backup_path.exists() {
        return Ok(());
    }
    let template_path = config.template_path();
    std::fs::copy(&template_path, &backup_path).with_context(|| {
        format!(
            "back up template {} to {}",
            template_path.display(),
            backup_path.display()
        )
    })?;
    tracing::info!(backup = %backup_path.display(), "created template backup");
    Ok(())
}

fn build_section(
    config: &SiteConfig,
    section: &SectionSpec,
    template: &mut Template,
) -> anyhow::Result<SectionOutcome> {
    let content_path = config.content_path(section);
    if !content_path.exists() {
        return Ok(SectionOutcome::Skipped {
            reason: format!("missing content file {}", content_path.display()),
        });
    }

    let md = std::fs::read_to_string(&content_path)
        .with_context(|| format!("read content: {}", content_path.display()))?;
    let mut html = markdown::render(&md);

    if let Some(generator) = section.active_generator() {
        let table = match generate_table(config, generator)? {
            Ok(table) => table,
            Err(err) => {
                return Ok(SectionOutcome::Skipped {
                    reason: format!("{err:#}"),
                });
            }
        };
        html = combine(html, &table, section.mode);
    }

    match template.inject(&section.placeholder, &html, section.image_class.as_ref()) {
        Ok(()) => Ok(SectionOutcome::Updated),
        Err(err) => Ok(SectionOutcome::Failed {
            reason: err.to_string(),
        }),
    }
}

/// The outer error is a discovery failure; the inner one an unusable asset config.
fn generate_table(
    config: &SiteConfig,
    generator: Generator,
) -> anyhow::Result<anyhow::Result<String>> {
    let found = assets::discover(&config.assets_dir, generator.category())?;
    let name = generator.config_name();
    let table = match generator {
        Generator::PhotoGallery => assets::load_config::<String>(&config.content_dir, name)
            .map(|captions| gallery::photo_gallery(&found, &captions)),
        Generator::EventsTable => assets::load_config::<EventRecord>(&config.content_dir, name)
            .map(|events| gallery::events_table(&found, &events)),
        Generator::OfficersTable => {
            assets::load_config::<OfficerRecord>(&config.content_dir, name)
                .map(|officers| gallery::officers_table(&found, &officers))
        }
    };
    Ok(table)
}

fn combine(html: String, table: &str, mode: GenerationMode) -> String {
    let authored = find_table(&html);
    match (mode, authored) {
        (GenerationMode::Manual, _) => html,
        (GenerationMode::Auto, Some(range)) => {
            let mut html = html;
            html.replace_range(range, table);
            html
        }
        (GenerationMode::AutoWithOverride, Some(_)) => {
            tracing::debug!("hand-authored table overrides generated table");
            html
        }
        (GenerationMode::Auto | GenerationMode::AutoWithOverride, None) => {
            format!("{html}\n{table}")
        }
    }
}

/// Byte range of the first `<table ...>...</table>` in `html`.
fn find_table(html: &str) -> Option<std::ops::Range<usize>> {
    let start = html.match_indices("<table").find_map(|(idx, _)| {
        let next = html[idx + "<table".len()..].chars().next()?;
        (next == '>' || next.is_ascii_whitespace()).then_some(idx)
    })?;
    let close = "</table>";
    let end = html[start..].find(close)? + start + close.len();
    Some(start..end)
}
