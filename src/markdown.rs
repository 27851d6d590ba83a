use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd};

/// Absolute asset prefix authors use in content; pages reference assets relatively.
pub const ASSET_ROOT_PREFIX: &str = "/assets/";

const PARAGRAPH_OPEN: &str = "<p align=\"justify\">";
const PARAGRAPH_CLOSE: &str = "</p>\n";

/// Renders a section's markdown into an HTML fragment.
///
/// Paragraphs are justified, headings carry no ids or classes, and image
/// sources under [`ASSET_ROOT_PREFIX`] become relative.
pub fn render(md: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(md, options).map(rewrite_event);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

fn rewrite_event(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Start(Tag::Paragraph) => Event::Html(CowStr::Borrowed(PARAGRAPH_OPEN)),
        Event::End(TagEnd::Paragraph) => Event::Html(CowStr::Borrowed(PARAGRAPH_CLOSE)),
        Event::Start(Tag::Heading { level, .. }) => Event::Start(Tag::Heading {
            level,
            id: None,
            classes: Vec::new(),
            attrs: Vec::new(),
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: relative_asset_url(dest_url),
            title,
            id,
        }),
        event => event,
    }
}

fn relative_asset_url(url: CowStr<'_>) -> CowStr<'_> {
    if url.starts_with(ASSET_ROOT_PREFIX) {
        CowStr::from(url[1..].to_owned())
    } else {
        url
    }
}
