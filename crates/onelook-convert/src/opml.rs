//! OPML 2.0 outlines.

use crate::xml::{push_attr, push_indent, push_text_element};
use crate::{
    APP_NAME, Converter, Error, Format, ImportOptions, Result, document_from_root,
    promote_single_child,
};
use onelook_core::validate::MAX_IMPORT_DEPTH;
use onelook_core::{MindMapDocument, MindMapNode, NodeData};
use roxmltree::Node;

pub struct OpmlConverter;

impl Converter for OpmlConverter {
    fn format(&self) -> Format {
        Format::Opml
    }

    fn import(&self, bytes: &[u8], options: &ImportOptions) -> Result<MindMapDocument> {
        let text = std::str::from_utf8(bytes)?;
        let xml = roxmltree::Document::parse(text)?;
        let opml = xml.root_element();
        if !opml.has_tag_name("opml") {
            return Err(Error::invalid(Format::Opml, "missing <opml> element"));
        }
        let Some(body) = child_element(opml, "body") else {
            return Err(Error::invalid(Format::Opml, "missing <body> element"));
        };
        let title = child_element(opml, "head")
            .and_then(|head| child_element(head, "title"))
            .and_then(|t| t.text())
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let outlines = body
            .children()
            .filter(|n| n.has_tag_name("outline"))
            .map(|n| outline_to_node(n, 1))
            .collect::<Result<Vec<_>>>()?;
        // A lone outline is the real root when the head has no title or repeats its text.
        let promote = match (title, outlines.as_slice()) {
            (None, [_]) => true,
            (Some(title), [only]) => only.text == title,
            _ => false,
        };
        let wrapper =
            MindMapNode::new(title.map_or_else(|| options.fallback_title(), str::to_string))
                .with_children(outlines);
        let root = if promote {
            promote_single_child(wrapper)
        } else {
            wrapper
        };
        let mut document = document_from_root(root);
        if let Some(title) = title {
            document.name = title.to_string();
        }
        Ok(document)
    }

    fn export(&self, document: &MindMapDocument) -> Result<Vec<u8>> {
        let mut out = String::with_capacity(1024);
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str("<opml version=\"2.0\">\n");
        out.push_str("  <head>\n");
        push_text_element(&mut out, 2, "title", &document.name);
        push_text_element(&mut out, 2, "dateCreated", &rfc2822(document.created_at));
        push_text_element(&mut out, 2, "dateModified", &rfc2822(document.updated_at));
        push_text_element(&mut out, 2, "ownerName", APP_NAME);
        out.push_str("  </head>\n");
        out.push_str("  <body>\n");
        write_outline(&mut out, &document.root, 2);
        out.push_str("  </body>\n");
        out.push_str("</opml>\n");
        Ok(out.into_bytes())
    }
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn outline_to_node(outline: Node<'_, '_>, depth: usize) -> Result<MindMapNode> {
    if depth > MAX_IMPORT_DEPTH {
        return Err(Error::too_deep("opml/body/outline"));
    }
    let text = outline
        .attribute("text")
        .or_else(|| outline.attribute("title"))
        .or_else(|| outline.attribute("_note"))
        .unwrap_or_default();
    let note = outline
        .attribute("_note")
        .or_else(|| outline.attribute("note"))
        .filter(|n| !n.is_empty() && *n != text);
    let url = outline
        .attribute("url")
        .or_else(|| outline.attribute("htmlUrl"))
        .filter(|u| !u.is_empty());

    let children = outline
        .children()
        .filter(|n| n.has_tag_name("outline"))
        .map(|n| outline_to_node(n, depth + 1))
        .collect::<Result<Vec<_>>>()?;

    let mut node = MindMapNode::new(text).with_children(children);
    if note.is_some() || url.is_some() {
        node.data = Some(NodeData {
            note: note.map(str::to_string),
            hyperlink: url.map(str::to_string),
            ..NodeData::default()
        });
    }
    Ok(node)
}

fn write_outline(out: &mut String, node: &MindMapNode, level: usize) {
    push_indent(out, level);
    out.push_str("<outline");
    push_attr(out, "text", &node.text);
    if let Some(data) = &node.data {
        if let Some(note) = data.note.as_deref().filter(|n| !n.is_empty()) {
            push_attr(out, "_note", note);
        }
        if let Some(url) = data.hyperlink.as_deref().filter(|u| !u.is_empty()) {
            push_attr(out, "url", url);
        }
    }
    if node.children.is_empty() {
        out.push_str("/>\n");
        return;
    }
    out.push_str(">\n");
    for child in &node.children {
        write_outline(out, child, level + 1);
    }
    push_indent(out, level);
    out.push_str("</outline>\n");
}

/// Epoch milliseconds as an RFC 2822 style UTC date (`Tue, 14 Oct 2025 10:00:00 GMT`).
fn rfc2822(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|d| d.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
        .unwrap_or_default()
}
