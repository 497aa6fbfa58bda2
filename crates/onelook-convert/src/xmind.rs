//! XMind workbooks (XMind 8+/Zen): a ZIP archive holding `content.json`.
//!
//! Only the first sheet is imported. Detached (floating) topics, images and relationships are
//! ignored.

use crate::{APP_NAME, Converter, Error, Format, ImportOptions, Result};
use onelook_core::validate::{MAX_IMPORT_DEPTH, read_json_value};
use onelook_core::{FontWeight, MindMapDocument, MindMapNode, NodeData, NodeShape, NodeStyle};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::io::{Cursor, Read, Write};

pub const CREATOR_VERSION: &str = "0.2.0";
const ROOT_STRUCTURE: &str = "org.xmind.ui.map.unbalanced";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Sheet {
    #[serde(default)]
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class: Option<String>,
    #[serde(default)]
    title: String,
    root_topic: Topic,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Topic {
    #[serde(default)]
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    structure_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    style: Option<TopicStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<Notes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    href: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    markers: Vec<Marker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Children>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Children {
    #[serde(default)]
    attached: Vec<Topic>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Notes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    plain: Option<NoteContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    html: Option<NoteContent>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct NoteContent {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Marker {
    marker_id: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TopicStyle {
    #[serde(default)]
    properties: StyleProperties,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct StyleProperties {
    #[serde(rename = "svg:fill", default, skip_serializing_if = "Option::is_none")]
    fill: Option<String>,
    #[serde(rename = "fo:color", default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(rename = "fo:font-size", default, skip_serializing_if = "Option::is_none")]
    font_size: Option<String>,
    #[serde(rename = "fo:font-weight", default, skip_serializing_if = "Option::is_none")]
    font_weight: Option<String>,
    #[serde(rename = "border-line-color", default, skip_serializing_if = "Option::is_none")]
    border_color: Option<String>,
    #[serde(rename = "border-line-width", default, skip_serializing_if = "Option::is_none")]
    border_width: Option<String>,
    #[serde(rename = "shape-class", default, skip_serializing_if = "Option::is_none")]
    shape: Option<String>,
}

const SHAPES: [(NodeShape, &str); 4] = [
    (NodeShape::Round, "org.xmind.topicShape.roundedRect"),
    (NodeShape::Rect, "org.xmind.topicShape.rect"),
    (NodeShape::Diamond, "org.xmind.topicShape.diamond"),
    (NodeShape::Ellipse, "org.xmind.topicShape.ellipse"),
];

const PROGRESS_MARKERS: [(u8, &str); 5] = [
    (0, "task-start"),
    (25, "task-quarter"),
    (50, "task-half"),
    (75, "task-3quar"),
    (100, "task-done"),
];

fn html_tag_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid regex"))
}

fn html_break_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>|</(?:p|div|li)>").expect("valid regex"))
}

fn html_entity_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z]+);").expect("valid regex"))
}

/// Plain text of an HTML note: block ends become newlines, tags are dropped and character
/// references are decoded. Unknown named entities are kept verbatim.
fn html_to_text(html: &str) -> String {
    let text = html_break_regex().replace_all(html, "\n");
    let text = html_tag_regex().replace_all(&text, "");
    let text = html_entity_regex().replace_all(&text, |caps: &regex::Captures<'_>| {
        let entity = &caps[1];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => entity.strip_prefix('#').and_then(|num| {
                let code = match num.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => num.parse::<u32>().ok(),
                };
                code.and_then(char::from_u32)
            }),
        };
        decoded.map_or_else(|| caps[0].to_string(), String::from)
    });
    text.trim_end_matches('\n').to_string()
}

pub struct XmindConverter;

impl Converter for XmindConverter {
    fn format(&self) -> Format {
        Format::Xmind
    }

    fn import(&self, bytes: &[u8], options: &ImportOptions) -> Result<MindMapDocument> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut content = String::new();
        match archive.by_name("content.json") {
            Ok(mut file) => {
                file.read_to_string(&mut content)?;
            }
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(Error::invalid(Format::Xmind, "content.json not found"));
            }
            Err(e) => return Err(e.into()),
        }

        let sheet = first_sheet(read_json_value(content.as_bytes())?)?;
        let root = topic_to_node(sheet.root_topic, 0)?;
        let name = Some(sheet.title)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| options.fallback_title());
        Ok(MindMapDocument::with_root(
            name,
            root,
            onelook_core::model::now_millis(),
        ))
    }

    fn export(&self, document: &MindMapDocument) -> Result<Vec<u8>> {
        let sheets = [Sheet {
            id: uuid::Uuid::new_v4().to_string(),
            class: Some("sheet".to_string()),
            title: document.name.clone(),
            root_topic: node_to_topic(&document.root, true),
        }];
        let metadata = json!({ "creator": { "name": APP_NAME, "version": CREATOR_VERSION } });
        let manifest = json!({ "file-entries": { "content.json": {}, "metadata.json": {} } });

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, body) in [
            ("content.json", serde_json::to_vec_pretty(&sheets)?),
            ("metadata.json", serde_json::to_vec_pretty(&metadata)?),
            ("manifest.json", serde_json::to_vec_pretty(&manifest)?),
        ] {
            zip.start_file(name, options)?;
            zip.write_all(&body)?;
        }
        Ok(zip.finish()?.into_inner())
    }
}

/// Accepts an array of sheets, `{ "sheets": [...] }`, or a bare `{ "rootTopic": ... }`.
fn first_sheet(content: Value) -> Result<Sheet> {
    let sheet = match content {
        Value::Array(mut sheets) => {
            if sheets.is_empty() {
                return Err(Error::invalid(Format::Xmind, "workbook has no sheets"));
            }
            sheets.swap_remove(0)
        }
        Value::Object(mut obj) => match obj.remove("sheets") {
            Some(Value::Array(mut sheets)) if !sheets.is_empty() => sheets.swap_remove(0),
            _ if obj.contains_key("rootTopic") => Value::Object(obj),
            _ => return Err(Error::invalid(Format::Xmind, "unrecognised content.json layout")),
        },
        _ => return Err(Error::invalid(Format::Xmind, "unrecognised content.json layout")),
    };
    Ok(Sheet::deserialize(sheet)?)
}

fn topic_to_node(topic: Topic, depth: usize) -> Result<MindMapNode> {
    if depth > MAX_IMPORT_DEPTH {
        return Err(Error::too_deep("rootTopic"));
    }
    let children = topic
        .children
        .map(|c| c.attached)
        .unwrap_or_default()
        .into_iter()
        .map(|t| topic_to_node(t, depth + 1))
        .collect::<Result<Vec<_>>>()?;

    let mut node = MindMapNode::new(topic.title).with_children(children);
    if let Some(props) = topic.style.map(|s| s.properties) {
        let style = NodeStyle {
            background: props.fill,
            color: props.color,
            font_size: props.font_size.as_deref().and_then(leading_number),
            font_weight: (props.font_weight.as_deref() == Some("bold")).then_some(FontWeight::Bold),
            border_color: props.border_color,
            border_width: props.border_width.as_deref().and_then(leading_number),
            shape: props.shape.map(|class| {
                SHAPES
                    .iter()
                    .find(|(_, c)| *c == class)
                    .map_or(NodeShape::Round, |(shape, _)| *shape)
            }),
        };
        node.style = Some(style).filter(|s| !s.is_empty());
    }

    let mut data = NodeData {
        hyperlink: topic.href.filter(|h| !h.is_empty()),
        tags: Some(topic.labels).filter(|l| !l.is_empty()),
        ..NodeData::default()
    };
    if let Some(notes) = topic.notes {
        data.note = match (notes.plain, notes.html) {
            (Some(plain), _) if !plain.content.is_empty() => Some(plain.content),
            (_, Some(html)) if !html.content.is_empty() => Some(html_to_text(&html.content)),
            _ => None,
        };
    }
    for marker in &topic.markers {
        let id = marker.marker_id.as_str();
        if let Some(n) = id.strip_prefix("priority-") {
            if let Some(p) = n.parse::<u8>().ok().filter(|p| (1..=9).contains(p)) {
                data.priority = Some(p);
            }
        } else if let Some(&(progress, _)) = PROGRESS_MARKERS.iter().find(|(_, m)| *m == id) {
            data.progress = Some(progress);
        }
    }
    node.data = Some(data).filter(|d| !d.is_empty());
    Ok(node)
}

fn node_to_topic(node: &MindMapNode, is_root: bool) -> Topic {
    let mut topic = Topic {
        id: uuid::Uuid::new_v4().to_string(),
        title: node.text.clone(),
        ..Topic::default()
    };
    if is_root {
        topic.class = Some("topic".to_string());
        topic.structure_class = Some(ROOT_STRUCTURE.to_string());
    }

    if let Some(style) = &node.style {
        let properties = StyleProperties {
            fill: style.background.clone(),
            color: style.color.clone(),
            font_size: style.font_size.map(|s| format!("{s}pt")),
            font_weight: (style.font_weight == Some(FontWeight::Bold)).then(|| "bold".to_string()),
            border_color: style.border_color.clone(),
            border_width: style.border_width.map(|w| format!("{w}pt")),
            shape: style.shape.and_then(|shape| {
                SHAPES
                    .iter()
                    .find(|(s, _)| *s == shape)
                    .map(|(_, class)| class.to_string())
            }),
        };
        if properties != StyleProperties::default() {
            topic.style = Some(TopicStyle { properties });
        }
    }

    if let Some(data) = &node.data {
        topic.notes = data.note.as_ref().filter(|n| !n.is_empty()).map(|n| Notes {
            plain: Some(NoteContent { content: n.clone() }),
            html: None,
        });
        topic.href = data.hyperlink.clone().filter(|h| !h.is_empty());
        topic.labels = data.tags.clone().unwrap_or_default();
        if let Some(p) = data.priority.filter(|p| (1..=9).contains(p)) {
            topic.markers.push(Marker {
                marker_id: format!("priority-{p}"),
            });
        }
        if let Some(progress) = data.progress {
            topic.markers.push(Marker {
                marker_id: nearest_progress_marker(progress).to_string(),
            });
        }
    }

    if !node.children.is_empty() {
        topic.children = Some(Children {
            attached: node
                .children
                .iter()
                .map(|c| node_to_topic(c, false))
                .collect(),
        });
    }
    topic
}

/// Marker of the progress bucket closest to `progress`; ties go to the lower bucket.
fn nearest_progress_marker(progress: u8) -> &'static str {
    let mut best = PROGRESS_MARKERS[0];
    for candidate in PROGRESS_MARKERS {
        if candidate.0.abs_diff(progress) < best.0.abs_diff(progress) {
            best = candidate;
        }
    }
    best.1
}

/// Parses the numeric prefix of values like `14pt` or `2.5`.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive(content: &str) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("content.json", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(content.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    fn import(content: &str) -> MindMapDocument {
        XmindConverter
            .import(&archive(content), &ImportOptions::with_file_name("plan.xmind"))
            .unwrap()
    }

    #[test]
    fn reads_topics_markers_and_styles() {
        let doc = import(
            r##"[{"id":"s","title":"Sheet","rootTopic":{"id":"r","title":"Root",
                "style":{"properties":{"fo:font-size":"18pt","fo:font-weight":"bold",
                  "shape-class":"org.xmind.topicShape.diamond","svg:fill":"#fff"}},
                "children":{"attached":[
                  {"id":"a","title":"A","markers":[{"markerId":"priority-2"},{"markerId":"task-half"}],
                   "labels":["x","y"],"href":"https://x.test",
                   "notes":{"html":{"content":"<p>Hello <b>there</b></p>"}}},
                  {"id":"b","title":"B","markers":[{"markerId":"priority-12"}],
                   "style":{"properties":{"shape-class":"unknown"}}}
                ]}}}]"##,
        );
        assert_eq!(doc.name, "Sheet");
        let style = doc.root.style.as_ref().unwrap();
        assert_eq!(style.font_size, Some(18.0));
        assert_eq!(style.font_weight, Some(FontWeight::Bold));
        assert_eq!(style.shape, Some(NodeShape::Diamond));
        assert_eq!(style.background.as_deref(), Some("#fff"));

        let a = doc.root.children[0].data.as_ref().unwrap();
        assert_eq!(a.priority, Some(2));
        assert_eq!(a.progress, Some(50));
        assert_eq!(a.tags.as_deref(), Some(&["x".to_string(), "y".to_string()][..]));
        assert_eq!(a.hyperlink.as_deref(), Some("https://x.test"));
        assert_eq!(a.note.as_deref(), Some("Hello there"));

        let b = &doc.root.children[1];
        assert!(b.data.is_none());
        assert_eq!(b.style.as_ref().unwrap().shape, Some(NodeShape::Round));
    }

    #[test]
    fn html_notes_decode_entities_and_breaks() {
        assert_eq!(
            html_to_text("<p>Tom &amp; Jerry &lt;3</p><p>&quot;hi&quot; &#39;x&#x27; &copy;</p>"),
            "Tom & Jerry <3\n\"hi\" 'x' &copy;"
        );
        assert_eq!(html_to_text("a<br/>b<BR>c&nbsp;d"), "a\nb\nc\u{a0}d");
        assert_eq!(html_to_text("&#xZZ; &#99999999;"), "&#xZZ; &#99999999;");

        let doc = import(
            r#"{"rootTopic":{"title":"R","notes":{"html":{"content":"<div>1 &lt; 2 &amp;&amp; 3 &gt; 2</div>"}}}}"#,
        );
        assert_eq!(
            doc.root.data.as_ref().and_then(|d| d.note.as_deref()),
            Some("1 < 2 && 3 > 2")
        );
    }

    #[test]
    fn accepts_sheets_object_and_bare_root_topic() {
        let doc = import(r#"{"sheets":[{"title":"S","rootTopic":{"title":"R"}}]}"#);
        assert_eq!((doc.name.as_str(), doc.root.text.as_str()), ("S", "R"));

        let doc = import(r#"{"rootTopic":{"title":"R"}}"#);
        assert_eq!(doc.name, "plan");
    }

    #[test]
    fn rejects_archives_without_content() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("content.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        let bytes = zip.finish().unwrap().into_inner();
        let err = XmindConverter
            .import(&bytes, &ImportOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidFile { format: Format::Xmind, .. }), "{err}");

        assert!(XmindConverter.import(b"not a zip", &ImportOptions::default()).is_err());
        assert!(
            XmindConverter
                .import(&archive("[]"), &ImportOptions::default())
                .is_err()
        );
    }

    #[test]
    fn progress_snaps_to_nearest_marker() {
        assert_eq!(nearest_progress_marker(0), "task-start");
        assert_eq!(nearest_progress_marker(12), "task-start");
        assert_eq!(nearest_progress_marker(13), "task-quarter");
        assert_eq!(nearest_progress_marker(80), "task-3quar");
        assert_eq!(nearest_progress_marker(100), "task-done");
    }

    #[test]
    fn export_writes_all_entries_and_marks_root() {
        let mut child = MindMapNode::new("Child");
        child.data = Some(NodeData {
            priority: Some(1),
            progress: Some(60),
            ..NodeData::default()
        });
        let doc = MindMapDocument::with_root("Map", MindMapNode::new("Root").with_children([child]), 0);
        let bytes = XmindConverter.export(&doc).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for name in ["content.json", "metadata.json", "manifest.json"] {
            assert!(archive.by_name(name).is_ok(), "{name}");
        }
        let mut content = String::new();
        archive
            .by_name("content.json")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        let value: Value = serde_json::from_str(&content).unwrap();
        let root = &value[0]["rootTopic"];
        assert_eq!(value[0]["class"], "sheet");
        assert_eq!(root["class"], "topic");
        assert_eq!(root["structureClass"], ROOT_STRUCTURE);
        let markers = &root["children"]["attached"][0]["markers"];
        assert_eq!(markers[0]["markerId"], "priority-1");
        assert_eq!(markers[1]["markerId"], "task-half");
        assert!(root["children"]["attached"][0].get("class").is_none());
    }
}
