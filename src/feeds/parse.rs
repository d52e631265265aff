//! Streaming RSS / Atom parser.
//!
//! Reads a feed document with `quick-xml` and produces a [`Feed`] whose
//! entries keep document order. Supported layouts:
//!
//! | Format | Entry element | Body fields | Date fields | Snippet from |
//! |--------|---------------|-------------|-------------|--------------|
//! | RSS 2.0 / 1.0 | `<item>` | `description`, `content:encoded` | `pubDate`, `dc:date` | `description`, else `content:encoded` |
//! | Atom | `<entry>` | `summary`, `content` | `published`, `updated` | `content`, else `summary` |
//!
//! Only direct children of an entry are read; nested blocks such as an Atom
//! `<source>` are skipped whole.

use crate::models::{Feed, RawEntry};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use scraper::Html;
use std::error::Error;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Published,
    Updated,
    Description,
    Content,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Field::Title),
            b"link" => Some(Field::Link),
            b"pubDate" | b"published" | b"dc:date" => Some(Field::Published),
            b"updated" => Some(Field::Updated),
            b"description" | b"summary" => Some(Field::Description),
            b"content:encoded" | b"content" => Some(Field::Content),
            _ => None,
        }
    }
}

/// Entry fields as they accumulate while the reader walks an `<item>`/`<entry>`.
#[derive(Debug, Default)]
struct EntryDraft {
    atom: bool,
    title: String,
    link: String,
    published: Option<String>,
    updated: Option<String>,
    description: Option<String>,
    content: Option<String>,
}

impl EntryDraft {
    fn new(atom: bool) -> Self {
        Self {
            atom,
            ..Default::default()
        }
    }

    fn set(&mut self, field: Field, text: String) {
        let text = text.trim().to_string();
        match field {
            Field::Title => self.title = text,
            Field::Link if self.link.is_empty() => self.link = text,
            Field::Link => {}
            Field::Published => {
                self.published.get_or_insert(text);
            }
            Field::Updated => {
                self.updated.get_or_insert(text);
            }
            Field::Description => {
                self.description.get_or_insert(text);
            }
            Field::Content => {
                self.content.get_or_insert(text);
            }
        }
    }

    fn finish(self) -> RawEntry {
        let (primary, secondary) = if self.atom {
            (&self.content, &self.description)
        } else {
            (&self.description, &self.content)
        };
        let snippet = primary
            .as_deref()
            .filter(|body| !body.is_empty())
            .or(secondary.as_deref())
            .and_then(snippet_of);
        RawEntry {
            title: self.title,
            link: self.link,
            publish_date: self.published.or(self.updated).filter(|d| !d.is_empty()),
            snippet,
            description: self.description,
            rich_content: self.content,
        }
    }
}

/// Plain-text rendering of an HTML body: tags removed, HTML entities decoded, trimmed.
fn snippet_of(html: &str) -> Option<String> {
    let fragment = Html::parse_fragment(html);
    let text = fragment.root_element().text().collect::<String>();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Read an Atom `<link>` element into the draft.
///
/// `rel="alternate"` (or no `rel`) wins over other relations.
fn apply_atom_link(draft: &mut EntryDraft, e: &BytesStart) -> Result<(), Box<dyn Error>> {
    let Some(href) = e.try_get_attribute("href")? else {
        return Ok(());
    };
    let href = href.unescape_value()?.trim().to_string();
    let rel = match e.try_get_attribute("rel")? {
        Some(rel) => rel.unescape_value()?.into_owned(),
        None => String::new(),
    };
    let preferred = rel.is_empty() || rel == "alternate";
    if preferred || draft.link.is_empty() {
        draft.link = href;
    }
    Ok(())
}

/// Parse an RSS or Atom document.
///
/// # Errors
///
/// Returns an error if the XML is malformed or the root element is not
/// `<rss>`, `<rdf:RDF>`, or `<feed>`.
#[instrument(level = "debug", skip_all, fields(bytes = xml.len()))]
pub fn parse_feed(xml: &str) -> Result<Feed, Box<dyn Error>> {
    // Text is kept untrimmed so whitespace between text and CDATA survives;
    // field values are trimmed once they are complete.
    let mut reader = Reader::from_str(xml);

    let mut feed = Feed::default();
    let mut root: Option<bool> = None;
    let mut draft: Option<EntryDraft> = None;
    // Depth inside a skipped (non-field) child of the current entry.
    let mut skip_depth = 0usize;
    // Field currently capturing text, with the nesting depth below it.
    let mut capture: Option<(Field, usize)> = None;
    let mut text = String::new();
    let mut in_feed_title = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.name();
                let name = name.as_ref();
                if let Some(atom) = root {
                    if let Some((_, depth)) = capture.as_mut() {
                        *depth += 1;
                    } else if let Some(d) = draft.as_mut() {
                        match Field::from_name(name) {
                            Some(field) if skip_depth == 0 => {
                                if field == Field::Link {
                                    apply_atom_link(d, &e)?;
                                }
                                capture = Some((field, 0));
                                text.clear();
                            }
                            _ => skip_depth += 1,
                        }
                    } else if matches!(name, b"item" | b"entry") {
                        draft = Some(EntryDraft::new(atom));
                        skip_depth = 0;
                    } else if name == b"title" && feed.title.is_none() {
                        in_feed_title = true;
                        text.clear();
                    }
                } else {
                    match name {
                        b"rss" | b"rdf:RDF" => root = Some(false),
                        b"feed" => root = Some(true),
                        other => {
                            return Err(format!(
                                "not a feed document (root <{}>)",
                                String::from_utf8_lossy(other)
                            )
                            .into());
                        }
                    }
                }
            }
            Event::Empty(e) => {
                if let (Some(d), None, 0) = (draft.as_mut(), capture, skip_depth) {
                    if e.name().as_ref() == b"link" {
                        apply_atom_link(d, &e)?;
                    }
                }
            }
            Event::Text(e) => {
                if capture.is_some() || in_feed_title {
                    let chunk = e
                        .unescape()
                        .map(|s| s.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                    text.push_str(&chunk);
                }
            }
            Event::CData(e) => {
                if capture.is_some() || in_feed_title {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                let name = e.name();
                let name = name.as_ref();
                match capture {
                    Some((field, depth)) if depth > 0 => {
                        capture = Some((field, depth - 1));
                    }
                    Some((field, _)) => {
                        if let Some(d) = draft.as_mut() {
                            d.set(field, std::mem::take(&mut text));
                        }
                        capture = None;
                    }
                    None if in_feed_title => {
                        let title = std::mem::take(&mut text).trim().to_string();
                        feed.title = Some(title).filter(|t| !t.is_empty());
                        in_feed_title = false;
                    }
                    None if draft.is_some() && skip_depth > 0 => skip_depth -= 1,
                    None if matches!(name, b"item" | b"entry") => {
                        if let Some(d) = draft.take() {
                            feed.entries.push(d.finish());
                        }
                    }
                    None => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if root.is_none() {
        return Err("empty document: no feed root element".into());
    }

    debug!(entries = feed.entries.len(), title = ?feed.title, "Parsed feed");
    Ok(feed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>airism.log</title>
    <link>https://velog.io/@airism</link>
    <description>AEO notes</description>
    <item>
      <title><![CDATA[[공지] AEO 트렌드 리포트]]></title>
      <link>https://velog.io/@airism/aeo-trend</link>
      <pubDate>Mon, 13 Oct 2025 10:00:00 GMT</pubDate>
      <description><![CDATA[<p>최신 동향을 분석합니다</p>]]></description>
    </item>
    <item>
      <title>두 번째 글</title>
      <link>https://velog.io/@airism/second</link>
      <description>&lt;b&gt;굵게&lt;/b&gt; 설명 &amp; 요약</description>
      <content:encoded><![CDATA[<h2>본문</h2><p>전체 내용</p>]]></content:encoded>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Atom</title>
  <link href="https://example.com/"/>
  <entry>
    <title>Schema 구현 노트</title>
    <link rel="edit" href="https://example.com/edit/1"/>
    <link rel="alternate" href="https://example.com/posts/1"/>
    <updated>2025-09-02T08:00:00Z</updated>
    <published>2025-09-01T08:00:00Z</published>
    <summary>Short summary</summary>
    <content type="html">&lt;p&gt;Full &lt;em&gt;body&lt;/em&gt;&lt;/p&gt;</content>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_entries_in_order() {
        let feed = parse_feed(RSS).unwrap();
        assert_eq!(feed.title.as_deref(), Some("airism.log"));
        assert_eq!(feed.entries.len(), 2);
        assert_eq!(feed.entries[0].title, "[공지] AEO 트렌드 리포트");
        assert_eq!(feed.entries[1].title, "두 번째 글");
    }

    #[test]
    fn test_parse_rss_first_item_fields() {
        let feed = parse_feed(RSS).unwrap();
        let first = &feed.entries[0];
        assert_eq!(first.link, "https://velog.io/@airism/aeo-trend");
        assert_eq!(first.publish_date.as_deref(), Some("Mon, 13 Oct 2025 10:00:00 GMT"));
        assert_eq!(first.description.as_deref(), Some("<p>최신 동향을 분석합니다</p>"));
        assert_eq!(first.rich_content, None);
        assert_eq!(first.snippet.as_deref(), Some("최신 동향을 분석합니다"));
    }

    #[test]
    fn test_parse_rss_description_drives_snippet() {
        let feed = parse_feed(RSS).unwrap();
        let second = &feed.entries[1];
        assert_eq!(second.publish_date, None);
        assert_eq!(second.description.as_deref(), Some("<b>굵게</b> 설명 & 요약"));
        assert_eq!(second.rich_content.as_deref(), Some("<h2>본문</h2><p>전체 내용</p>"));
        assert_eq!(second.snippet.as_deref(), Some("굵게 설명 & 요약"));
    }

    #[test]
    fn test_rss_summary_reaches_post_instead_of_body() {
        let xml = r#"<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
            <channel><item>
                <title>AEO 기술 노트</title>
                <link>https://velog.io/@airism/note</link>
                <description>짧은 요약</description>
                <content:encoded><![CDATA[<p>전체 본문 내용</p>]]></content:encoded>
            </item></channel>
        </rss>"#;
        let feed = parse_feed(xml).unwrap();
        let entry = &feed.entries[0];
        assert_eq!(entry.snippet.as_deref(), Some("짧은 요약"));

        let source = crate::sources::default_sources().remove(1);
        let post = crate::normalize::normalize(entry, &source, chrono::Utc::now());
        assert_eq!(post.description, "짧은 요약");
    }

    #[test]
    fn test_parse_rss_content_only_drives_snippet() {
        let xml = r#"<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
            <channel><item>
                <title>본문만</title>
                <content:encoded><![CDATA[<h2>본문</h2><p>전체 내용</p>]]></content:encoded>
            </item></channel>
        </rss>"#;
        let feed = parse_feed(xml).unwrap();
        assert_eq!(feed.entries[0].description, None);
        assert_eq!(feed.entries[0].snippet.as_deref(), Some("본문전체 내용"));
    }

    #[test]
    fn test_parse_decodes_html_entities_in_snippet() {
        let xml = r#"<rss version="2.0"><channel><item>
            <title>entities</title>
            <description><![CDATA[<p>Tom&rsquo;s R&amp;D&hellip; &lt;ok&gt;</p>]]></description>
        </item></channel></rss>"#;
        let feed = parse_feed(xml).unwrap();
        let entry = &feed.entries[0];
        assert_eq!(entry.snippet.as_deref(), Some("Tom\u{2019}s R&D\u{2026} <ok>"));

        let source = crate::sources::default_sources().remove(0);
        let post = crate::normalize::normalize(entry, &source, chrono::Utc::now());
        assert_eq!(post.description, "Tom\u{2019}s R&D\u{2026}");
    }

    #[test]
    fn test_parse_atom_source_title_does_not_replace_entry_title() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
            <entry>
                <title>진짜 제목</title>
                <source>
                    <title>원본 피드 트렌드</title>
                    <link rel="alternate" href="https://origin.example.com/"/>
                </source>
                <link rel="alternate" href="https://example.com/real"/>
            </entry>
        </feed>"#;
        let feed = parse_feed(xml).unwrap();
        assert_eq!(feed.entries.len(), 1);
        assert_eq!(feed.entries[0].title, "진짜 제목");
        assert_eq!(feed.entries[0].link, "https://example.com/real");
    }

    #[test]
    fn test_parse_keeps_spaces_around_cdata() {
        let xml = r#"<rss version="2.0"><channel><item>
            <title>mixed</title>
            <description>Intro <![CDATA[<b>bold</b>]]> tail</description>
        </item></channel></rss>"#;
        let feed = parse_feed(xml).unwrap();
        let entry = &feed.entries[0];
        assert_eq!(entry.description.as_deref(), Some("Intro <b>bold</b> tail"));
        assert_eq!(entry.snippet.as_deref(), Some("Intro bold tail"));
    }

    #[test]
    fn test_parse_atom_entry() {
        let feed = parse_feed(ATOM).unwrap();
        assert_eq!(feed.title.as_deref(), Some("Example Atom"));
        assert_eq!(feed.entries.len(), 1);

        let entry = &feed.entries[0];
        assert_eq!(entry.title, "Schema 구현 노트");
        assert_eq!(entry.link, "https://example.com/posts/1");
        assert_eq!(entry.publish_date.as_deref(), Some("2025-09-01T08:00:00Z"));
        assert_eq!(entry.description.as_deref(), Some("Short summary"));
        assert_eq!(entry.rich_content.as_deref(), Some("<p>Full <em>body</em></p>"));
        assert_eq!(entry.snippet.as_deref(), Some("Full body"));
    }

    #[test]
    fn test_parse_atom_updated_when_unpublished() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
            <entry><title>t</title><updated>2025-01-02T00:00:00Z</updated></entry>
        </feed>"#;
        let feed = parse_feed(xml).unwrap();
        assert_eq!(feed.entries[0].publish_date.as_deref(), Some("2025-01-02T00:00:00Z"));
    }

    #[test]
    fn test_parse_empty_channel() {
        let xml = r#"<rss version="2.0"><channel><title>empty</title></channel></rss>"#;
        let feed = parse_feed(xml).unwrap();
        assert!(feed.entries.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_feed_root() {
        let html = "<html><body><p>Not found</p></body></html>";
        assert!(parse_feed(html).is_err());
    }

    #[test]
    fn test_parse_rejects_empty_document() {
        assert!(parse_feed("").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_xml() {
        let xml = "<rss><channel><item><title>oops</item></channel></rss>";
        assert!(parse_feed(xml).is_err());
    }

    #[test]
    fn test_snippet_of_blank_markup() {
        assert_eq!(snippet_of("<p> </p>"), None);
        assert_eq!(snippet_of("a &amp; b"), Some("a & b".to_string()));
        assert_eq!(snippet_of("x&nbsp;y"), Some("x\u{a0}y".to_string()));
    }
}
