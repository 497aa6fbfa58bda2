use crate::Error;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Xmind,
    Freemind,
    Opml,
    Json,
    Markdown,
    Olook,
}

/// Registry entry describing one file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub name: &'static str,
    /// Primary extension, without the dot.
    pub extension: &'static str,
    pub mime_type: &'static str,
    pub description: &'static str,
}

impl Format {
    pub const ALL: [Format; 6] = [
        Format::Xmind,
        Format::Freemind,
        Format::Opml,
        Format::Json,
        Format::Markdown,
        Format::Olook,
    ];

    pub fn info(self) -> &'static FormatInfo {
        match self {
            Format::Xmind => &FormatInfo {
                name: "XMind",
                extension: "xmind",
                mime_type: "application/zip",
                description: "XMind 8 / XMind Zen workbook",
            },
            Format::Freemind => &FormatInfo {
                name: "FreeMind",
                extension: "mm",
                mime_type: "application/xml",
                description: "FreeMind / Freeplane map",
            },
            Format::Opml => &FormatInfo {
                name: "OPML",
                extension: "opml",
                mime_type: "text/x-opml",
                description: "Outline Processor Markup Language",
            },
            Format::Json => &FormatInfo {
                name: "JSON",
                extension: "json",
                mime_type: "application/json",
                description: "OneLook document as plain JSON",
            },
            Format::Markdown => &FormatInfo {
                name: "Markdown",
                extension: "md",
                mime_type: "text/markdown",
                description: "Heading and bullet-list outline",
            },
            Format::Olook => &FormatInfo {
                name: "OneLook",
                extension: "olook",
                mime_type: "application/json",
                description: "OneLook native file",
            },
        }
    }

    /// Resolves a format from an extension, with or without the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "markdown" => Some(Format::Markdown),
            _ => Self::ALL.into_iter().find(|f| f.info().extension == ext),
        }
    }

    pub fn from_file_name(name: impl AsRef<Path>) -> Option<Self> {
        let ext = name.as_ref().extension()?.to_str()?;
        Self::from_extension(ext)
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.info().name)
    }
}

impl std::str::FromStr for Format {
    type Err = Error;

    /// Accepts a registry name (`xmind`, `OneLook`, ...) or an extension (`mm`, `.md`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.info().name.eq_ignore_ascii_case(key))
            .or_else(|| Self::from_extension(key))
            .ok_or_else(|| Error::UnknownFormat {
                name: key.to_string(),
            })
    }
}
