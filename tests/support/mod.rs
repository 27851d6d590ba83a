#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const ASSET_BYTES: &[u8] = b"fake-image-bytes";

pub const SECTION_IDS: [&str; 5] = ["OUR-CHAPLAIN", "MIT-HSC", "EVENTS", "PHOTOS", "OFFICERS"];

pub fn placeholder(id: &str) -> String {
    format!("<!-- {id} section content will be injected here -->")
}

pub fn template_html() -> String {
    let mut html = String::from(
        "<!doctype html>\n<html>\n<head><title>Club</title></head>\n<body>\n",
    );
    for id in SECTION_IDS {
        html.push_str(&format!(
            "<section id=\"{}\">\n{}\n</section>\n",
            id.to_ascii_lowercase(),
            placeholder(id)
        ));
    }
    html.push_str("</body>\n</html>\n");
    html
}

pub struct Site {
    pub root: PathBuf,
}

impl Site {
    pub fn content(&self, name: &str) -> PathBuf {
        self.root.join("content").join(name)
    }

    pub fn template(&self) -> PathBuf {
        self.root.join("public").join("index.html")
    }

    pub fn backup(&self) -> PathBuf {
        self.root.join("public").join("index.backup.html")
    }

    pub fn read_template(&self) -> String {
        fs::read_to_string(self.template()).expect("read template")
    }

    pub fn write_content(&self, name: &str, body: &str) {
        fs::write(self.content(name), body).expect("write content");
    }

    pub fn add_asset(&self, dir: &str, name: &str) {
        let dir = self.root.join("public").join("assets").join(dir);
        fs::create_dir_all(&dir).expect("create asset dir");
        fs::write(dir.join(name), ASSET_BYTES).expect("write asset");
    }
}

/// A site with all five content files, a pristine template and a few assets.
pub fn create_site(root: &Path) -> Site {
    let site = Site {
        root: root.to_path_buf(),
    };
    fs::create_dir_all(root.join("content")).expect("create content dir");
    fs::create_dir_all(root.join("public")).expect("create public dir");
    fs::write(site.template(), template_html()).expect("write template");

    site.write_content(
        "chaplain.md",
        "## Our Chaplain\n\n![Swami](/assets/images/tyagananda.jpg)\n\nThe chaplain leads **weekly** talks.\n",
    );
    site.write_content("mit-hsc.md", "## About\n\nWe are a *student* club.\n");
    site.write_content("events.md", "## Events\n\nJoin us this term.\n");
    site.write_content("photos.md", "## Photos\n\n| Photo |\n|---|\n| placeholder |\n");
    site.write_content("officers.md", "## Officers\n\nMeet the board.\n");

    for name in ["2022_1.png", "2022_2.png", "2022_3.png", "2022_4.png"] {
        site.add_asset("photos", name);
    }
    site.add_asset("event_posters", "diwali-night.png");
    site.add_asset("profile_pictures", "john-doe.jpg");
    site.add_asset("profile_pictures", "priya_shah.png");

    site
}
