//! The persisted document as plain JSON.

use crate::{Converter, Format, ImportOptions, Result};
use onelook_core::MindMapDocument;
use onelook_core::validate::{parse_document_value, read_json_value};

pub struct JsonConverter;

impl Converter for JsonConverter {
    fn format(&self) -> Format {
        Format::Json
    }

    fn import(&self, bytes: &[u8], _options: &ImportOptions) -> Result<MindMapDocument> {
        let value = read_json_value(bytes)?;
        Ok(parse_document_value(&value)?)
    }

    fn export(&self, document: &MindMapDocument) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(document)?)
    }
}
