use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Two trailing spaces before the newline force a hard line break in
/// Markdown renderers; plain `\n` would be collapsed.
pub const HARD_BREAK: &str = "  \n";

const NO_CONTENT: &str = "（内容なし）";
const MISSING_DATA_ERROR: &str = "エラー: JSONデータに'data'キーが見つかりません";
const MISSING_LIFELOGS_ERROR: &str = "エラー: データに'lifelogs'キーが見つかりません";

/// Block discriminator carried in a content block's `type` field.
///
/// The upstream set is open-ended; anything unrecognized lands on
/// `Other` and renders nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum BlockType {
    Heading1,
    Heading2,
    Heading3,
    Blockquote,
    #[default]
    Other,
}

impl From<String> for BlockType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "heading1" => BlockType::Heading1,
            "heading2" => BlockType::Heading2,
            "heading3" => BlockType::Heading3,
            "blockquote" => BlockType::Blockquote,
            _ => BlockType::Other,
        }
    }
}

/// One typed unit within an entry's content tree.
///
/// Blocks also carry a `startTime` on the wire; it never appears in
/// rendered output and is not modeled here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    #[serde(rename = "type", default)]
    pub kind: BlockType,
    pub content: Option<String>,
    pub speaker_name: Option<String>,
}

/// One lifelog record as returned by the Limitless API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifelog {
    pub title: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_starred: Option<bool>,
    #[serde(default)]
    pub contents: Vec<ContentBlock>,
}

impl Lifelog {
    /// Decode one entry from the response array, degrading to an
    /// all-defaults record when the value does not match the expected
    /// shape.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            log::warn!("lifelog entry did not match the expected shape: {}", e);
            Lifelog::default()
        })
    }
}

/// Reformat an ISO-8601 timestamp as `YYYY/MM/DD HH:MM:SS`, treating a
/// literal `Z` suffix as the UTC offset. The offset is consumed but not
/// displayed. Anything unparseable is returned unchanged; this never
/// fails.
pub fn format_timestamp(raw: &str) -> String {
    const DISPLAY: &str = "%Y/%m/%d %H:%M:%S";

    let normalized = raw.replace('Z', "+00:00");

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return dt.format(DISPLAY).to_string();
    }
    if let Ok(dt) = DateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return dt.format(DISPLAY).to_string();
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, format) {
            return dt.format(DISPLAY).to_string();
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return dt.format(DISPLAY).to_string();
        }
    }

    raw.to_string()
}

/// Render an entry's content blocks as Markdown, one line per
/// recognized block, joined with hard line breaks.
///
/// Blocks with empty content emit nothing, headings included; input
/// order is preserved. Returns an empty string when no block produced
/// a line; substituting a placeholder is the caller's concern.
pub fn render_contents(blocks: &[ContentBlock]) -> String {
    let mut lines: Vec<String> = Vec::new();

    for block in blocks {
        let text = block.content.as_deref().unwrap_or("");
        if text.is_empty() {
            continue;
        }

        let line = match block.kind {
            BlockType::Heading1 => format!("# {}", text),
            BlockType::Heading2 => format!("## {}", text),
            // four hashes, not three; deliberate.
            BlockType::Heading3 => format!("#### {}", text),
            BlockType::Blockquote => {
                let speaker = block.speaker_name.as_deref().unwrap_or("Unknown");
                format!("**{}**: {}", speaker, text)
            }
            BlockType::Other => continue,
        };

        lines.push(line);
    }

    lines.join(HARD_BREAK)
}

/// Render one lifelog entry as a bordered Markdown section: title,
/// `<metadata>` envelope, a rule, then the content (or the no-content
/// placeholder).
pub fn render_lifelog(lifelog: &Lifelog) -> String {
    let title = lifelog.title.as_deref().unwrap_or("Untitled");
    let started = format_timestamp(lifelog.start_time.as_deref().unwrap_or(""));
    let ended = format_timestamp(lifelog.end_time.as_deref().unwrap_or(""));

    let mut parts: Vec<String> = Vec::new();

    parts.push(format!("# {}", title));
    parts.push("<metadata>".to_string());
    parts.push(format!("Started: {} To: {}", started, ended));
    if lifelog.is_starred.unwrap_or(false) {
        parts.push("Starred: ⭐".to_string());
    }
    parts.push("</metadata>".to_string());

    parts.push(String::new());
    parts.push("---".to_string());

    let contents = render_contents(&lifelog.contents);
    if contents.trim().is_empty() {
        parts.push(NO_CONTENT.to_string());
    } else {
        parts.push(contents);
    }

    parts.join(HARD_BREAK)
}

/// Render a full API response as one Markdown document.
///
/// A response missing its `data` or `data.lifelogs` key yields a
/// human-readable error string as the output itself; callers detect
/// that case by inspecting content, not through an error channel.
pub fn render_response(response: &Value) -> String {
    let data = match response.get("data") {
        Some(data) => data,
        None => return MISSING_DATA_ERROR.to_string(),
    };
    let lifelogs = match data.get("lifelogs") {
        Some(lifelogs) => lifelogs,
        None => return MISSING_LIFELOGS_ERROR.to_string(),
    };

    let entries: Vec<Lifelog> = lifelogs
        .as_array()
        .map(|items| items.iter().map(Lifelog::from_value).collect())
        .unwrap_or_default();

    let mut parts: Vec<String> = Vec::new();

    for (index, lifelog) in entries.iter().enumerate() {
        if index > 0 {
            parts.push("\n---\n".to_string());
        }
        parts.push(render_lifelog(lifelog));
    }

    parts.push("\n---\n".to_string());
    parts.push("<metadata>".to_string());
    let meta = response
        .get("meta")
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()));
    parts.push(serialize_meta(&meta));
    parts.push("</metadata>".to_string());

    parts.join(HARD_BREAK)
}

/// Serialize the envelope metadata on a single line with a space after
/// `:` and `,` separators, keeping non-ASCII characters literal.
fn serialize_meta(meta: &Value) -> String {
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, SpacedFormatter);

    match meta.serialize(&mut serializer) {
        Ok(()) => String::from_utf8(buffer).unwrap_or_default(),
        Err(e) => {
            log::warn!("failed to serialize response metadata: {}", e);
            String::new()
        }
    }
}

struct SpacedFormatter;

impl serde_json::ser::Formatter for SpacedFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> std::io::Result<()>
    where
        W: ?Sized + std::io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> std::io::Result<()>
    where
        W: ?Sized + std::io::Write,
    {
        writer.write_all(b": ")
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> std::io::Result<()>
    where
        W: ?Sized + std::io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }
}
