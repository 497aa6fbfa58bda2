//! Native `.olook` files: the document wrapped in an application envelope.

use crate::{APP_NAME, Converter, Error, Format, ImportOptions, Result};
use onelook_core::MindMapDocument;
use onelook_core::validate::{parse_document_value, read_json_value};
use serde::Serialize;

pub const ENVELOPE_VERSION: &str = "1.0.0";

#[derive(Serialize)]
struct Envelope<'a> {
    version: &'static str,
    app: &'static str,
    created: i64,
    modified: i64,
    document: &'a MindMapDocument,
}

pub struct OlookConverter;

impl Converter for OlookConverter {
    fn format(&self) -> Format {
        Format::Olook
    }

    fn import(&self, bytes: &[u8], _options: &ImportOptions) -> Result<MindMapDocument> {
        let value = read_json_value(bytes)?;
        let app = value.get("app").and_then(serde_json::Value::as_str);
        if app != Some(APP_NAME) {
            return Err(Error::invalid(Format::Olook, "not a OneLook file"));
        }
        let Some(document) = value.get("document") else {
            return Err(Error::invalid(Format::Olook, "missing document"));
        };
        Ok(parse_document_value(document)?)
    }

    fn export(&self, document: &MindMapDocument) -> Result<Vec<u8>> {
        let envelope = Envelope {
            version: ENVELOPE_VERSION,
            app: APP_NAME,
            created: document.created_at,
            modified: onelook_core::model::now_millis(),
            document,
        };
        Ok(serde_json::to_vec_pretty(&envelope)?)
    }
}
