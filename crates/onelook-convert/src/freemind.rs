//! FreeMind / Freeplane `.mm` maps.

use crate::xml::{escape_xml_attr_into, push_attr, push_indent};
use crate::{Converter, Error, Format, ImportOptions, Result, document_from_root};
use onelook_core::validate::MAX_IMPORT_DEPTH;
use onelook_core::{FontWeight, MindMapDocument, MindMapNode, NodeData, NodeStyle};
use roxmltree::Node;

pub const MAP_VERSION: &str = "1.0.1";

pub struct FreemindConverter;

impl Converter for FreemindConverter {
    fn format(&self) -> Format {
        Format::Freemind
    }

    fn import(&self, bytes: &[u8], _options: &ImportOptions) -> Result<MindMapDocument> {
        let text = std::str::from_utf8(bytes)?;
        let xml = roxmltree::Document::parse(text)?;
        let map = xml.root_element();
        if !map.has_tag_name("map") {
            return Err(Error::invalid(Format::Freemind, "missing <map> element"));
        }
        let Some(top) = map.children().find(|n| n.has_tag_name("node")) else {
            return Err(Error::invalid(Format::Freemind, "map has no root node"));
        };
        Ok(document_from_root(read_node(top, 0)?))
    }

    fn export(&self, document: &MindMapDocument) -> Result<Vec<u8>> {
        let mut out = String::with_capacity(1024);
        out.push_str("<map version=\"");
        out.push_str(MAP_VERSION);
        out.push_str("\">\n");
        write_node(&mut out, &document.root, 0);
        out.push_str("</map>\n");
        Ok(out.into_bytes())
    }
}

fn read_node(node: Node<'_, '_>, depth: usize) -> Result<MindMapNode> {
    if depth > MAX_IMPORT_DEPTH {
        return Err(Error::too_deep("map/node"));
    }
    let mut style = NodeStyle {
        color: node.attribute("COLOR").map(str::to_string),
        background: node.attribute("BACKGROUND_COLOR").map(str::to_string),
        ..NodeStyle::default()
    };
    let mut data = NodeData {
        hyperlink: node.attribute("LINK").map(str::to_string),
        ..NodeData::default()
    };
    let mut text = node.attribute("TEXT").map(str::to_string);
    let mut children = Vec::new();

    for el in node.children().filter(Node::is_element) {
        match el.tag_name().name() {
            "node" => children.push(read_node(el, depth + 1)?),
            "font" => {
                style.font_size = el.attribute("SIZE").and_then(|s| s.trim().parse().ok());
                if el.attribute("BOLD") == Some("true") {
                    style.font_weight = Some(FontWeight::Bold);
                }
            }
            "icon" => {
                let Some(builtin) = el.attribute("BUILTIN") else {
                    continue;
                };
                match priority_icon(builtin) {
                    Some(p) => data.priority = data.priority.or(Some(p)),
                    None if data.icon.is_none() => data.icon = Some(builtin.to_string()),
                    None => {}
                }
            }
            "richcontent" => match el.attribute("TYPE") {
                Some("NOTE") => data.note = Some(plain_text(el)).filter(|n| !n.is_empty()),
                Some("NODE") if text.is_none() => text = Some(plain_text(el)),
                _ => {}
            },
            _ => {}
        }
    }

    let mut out = MindMapNode::new(text.unwrap_or_default()).with_children(children);
    out.is_expanded = node.attribute("FOLDED") != Some("true");
    out.style = Some(style).filter(|s| !s.is_empty());
    out.data = Some(data).filter(|d| !d.is_empty());
    Ok(out)
}

/// `full-N` icons carry a priority from 1 to 9.
fn priority_icon(builtin: &str) -> Option<u8> {
    builtin
        .strip_prefix("full-")
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| (1..=9).contains(n))
}

/// Text of an HTML fragment, one line per `<p>`; a blank paragraph is a blank line.
///
/// Paragraphs spread over several source lines (pretty-printed maps) are trimmed. Fragments
/// without paragraphs fall back to their non-blank text runs.
fn plain_text(el: Node<'_, '_>) -> String {
    let paragraphs: Vec<String> = el
        .descendants()
        .filter(|n| n.has_tag_name("p"))
        .map(|p| {
            let text: String = p
                .descendants()
                .filter(Node::is_text)
                .filter_map(|n| n.text())
                .collect();
            if text.contains('\n') {
                text.trim().to_string()
            } else {
                text
            }
        })
        .collect();
    if !paragraphs.is_empty() {
        return paragraphs.join("\n");
    }
    el.descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_node(out: &mut String, node: &MindMapNode, level: usize) {
    push_indent(out, level);
    out.push_str("<node");
    push_attr(out, "TEXT", &node.text);
    if !node.is_expanded && !node.children.is_empty() {
        push_attr(out, "FOLDED", "true");
    }
    let style = node.style.as_ref();
    if let Some(color) = style.and_then(|s| s.color.as_deref()) {
        push_attr(out, "COLOR", color);
    }
    if let Some(bg) = style.and_then(|s| s.background.as_deref()) {
        push_attr(out, "BACKGROUND_COLOR", bg);
    }
    let data = node.data.as_ref();
    if let Some(link) = data.and_then(|d| d.hyperlink.as_deref()) {
        push_attr(out, "LINK", link);
    }

    let font_size = style.and_then(|s| s.font_size);
    let bold = style.and_then(|s| s.font_weight) == Some(FontWeight::Bold);
    let priority = data.and_then(|d| d.priority);
    let icon = data.and_then(|d| d.icon.as_deref());
    let note = data.and_then(|d| d.note.as_deref()).filter(|n| !n.is_empty());

    if font_size.is_none()
        && !bold
        && priority.is_none()
        && icon.is_none()
        && note.is_none()
        && node.children.is_empty()
    {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");

    if font_size.is_some() || bold {
        push_indent(out, level + 1);
        out.push_str("<font NAME=\"SansSerif\"");
        if let Some(size) = font_size {
            push_attr(out, "SIZE", &size.to_string());
        }
        if bold {
            push_attr(out, "BOLD", "true");
        }
        out.push_str("/>\n");
    }
    if let Some(p) = priority {
        push_indent(out, level + 1);
        out.push_str("<icon");
        push_attr(out, "BUILTIN", &format!("full-{p}"));
        out.push_str("/>\n");
    }
    if let Some(icon) = icon {
        push_indent(out, level + 1);
        out.push_str("<icon");
        push_attr(out, "BUILTIN", icon);
        out.push_str("/>\n");
    }
    if let Some(note) = note {
        push_indent(out, level + 1);
        out.push_str("<richcontent TYPE=\"NOTE\"><html><head/><body>");
        for line in note.split('\n') {
            out.push_str("<p>");
            escape_xml_attr_into(out, line);
            out.push_str("</p>");
        }
        out.push_str("</body></html></richcontent>\n");
    }
    for child in &node.children {
        write_node(out, child, level + 1);
    }
    push_indent(out, level);
    out.push_str("</node>\n");
}
