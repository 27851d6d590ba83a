use crate::assets::AssetDescriptor;
use crate::formats::{EventsConfig, OfficersConfig, PhotosConfig};

const GALLERY_COLUMNS: usize = 3;

pub const DEFAULT_EVENT_DATE: &str = "TBD";
pub const DEFAULT_EVENT_DESCRIPTION: &str = "Event details coming soon!";
pub const DEFAULT_OFFICER_POSITION: &str = "Member";
pub const DEFAULT_OFFICER_EMAIL: &str = "member";

/// Lays photos out row-major, three per row, padding the last row with empty cells.
pub fn photo_gallery(photos: &[AssetDescriptor], captions: &PhotosConfig) -> String {
    let mut html = table_head(&["Photo"; GALLERY_COLUMNS]);

    for row in photos.chunks(GALLERY_COLUMNS) {
        html.push_str("<tr>\n");
        for photo in row {
            let title = non_blank(captions.get(&photo.filename).map(String::as_str))
                .unwrap_or(&photo.name);
            let path = escape_attr(&photo.path);
            html.push_str(&format!(
                "<td><div class=\"circular--portrait\"><a href=\"{path}\" target=\"_blank\" rel=\"noopener noreferrer\"><img src=\"{path}\" alt=\"{}\"></a></div></td>\n",
                escape_attr(title)
            ));
        }
        for _ in row.len()..GALLERY_COLUMNS {
            html.push_str("<td></td>\n");
        }
        html.push_str("</tr>\n");
    }

    html.push_str(TABLE_TAIL);
    html
}

pub fn events_table(posters: &[AssetDescriptor], config: &EventsConfig) -> String {
    let mut html = table_head(&["Image", "Event", "Date", "Description"]);

    for poster in posters {
        let record = config.get(&poster.filename);
        let configured_name = record.and_then(|r| non_blank(r.name.as_deref()));
        let date = record
            .and_then(|r| non_blank(r.date.as_deref()))
            .unwrap_or(DEFAULT_EVENT_DATE);
        let description = record
            .and_then(|r| non_blank(r.description.as_deref()))
            .unwrap_or(DEFAULT_EVENT_DESCRIPTION);

        html.push_str(&format!(
            "<tr>\n<td><img src=\"{}\" alt=\"{}\" style=\"max-width: 120px; height: auto;\"></td>\n",
            escape_attr(&poster.path),
            escape_attr(configured_name.unwrap_or(&poster.name))
        ));
        let name = cell_text(configured_name, &poster.name);
        html.push_str(&format!(
            "<td>{name}</td>\n<td>{date}</td>\n<td>{description}</td>\n</tr>\n"
        ));
    }

    html.push_str(TABLE_TAIL);
    html
}

pub fn officers_table(profiles: &[AssetDescriptor], config: &OfficersConfig) -> String {
    let mut html = table_head(&["Officer", "Position", "Name", "Email"]);

    for profile in profiles {
        let record = config.get(&profile.filename);
        let configured_name = record.and_then(|r| non_blank(r.name.as_deref()));
        let position = record
            .and_then(|r| non_blank(r.position.as_deref()))
            .unwrap_or(DEFAULT_OFFICER_POSITION);
        let email = record
            .and_then(|r| non_blank(r.email.as_deref()))
            .unwrap_or(DEFAULT_OFFICER_EMAIL);

        html.push_str(&format!(
            "<tr>\n<td><div class=\"circular--portrait\"><img src=\"{}\" alt=\"{}\"></div></td>\n",
            escape_attr(&profile.path),
            escape_attr(configured_name.unwrap_or(&profile.name))
        ));
        let name = cell_text(configured_name, &profile.name);
        html.push_str(&format!(
            "<td>{position}</td>\n<td>{name}</td>\n<td><code>{email}</code></td>\n</tr>\n"
        ));
    }

    html.push_str(TABLE_TAIL);
    html
}

const TABLE_TAIL: &str = "</tbody>\n</table>";

fn table_head(columns: &[&str]) -> String {
    let mut html = String::from("<table>\n<thead>\n<tr>\n");
    for column in columns {
        html.push_str(&format!("<th>{column}</th>\n"));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");
    html
}

/// An empty config value counts as absent.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Configured text is trusted markup; a name derived from a filename is escaped.
fn cell_text(configured: Option<&str>, derived: &str) -> String {
    configured.map_or_else(|| escape_attr(derived), str::to_owned)
}

fn escape_attr(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
