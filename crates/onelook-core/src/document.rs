use crate::model::{ConnectionStyle, FORMAT_VERSION, LayoutKind, MindMapDocument, Theme};
use crate::tree::{MindTree, NodeRecord};
use crate::Result;

pub const DEFAULT_ROOT_TEXT: &str = "Central Topic";
pub const UNTITLED_PREFIX: &str = "Untitled Map";

/// The live, editable document: persisted metadata plus the node arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub tree: MindTree,
    pub layout: LayoutKind,
    pub theme: Theme,
    pub connection_style: Option<ConnectionStyle>,
    pub rainbow_branch: Option<bool>,
    pub created_at: i64,
    pub updated_at: i64,
    pub version: String,
}

impl Document {
    /// A fresh document with a central topic and three branch topics.
    pub fn new_default(name: impl Into<String>, now_ms: i64) -> Self {
        let root = NodeRecord::new(DEFAULT_ROOT_TEXT);
        let root_id = root.id.clone();
        let mut tree = MindTree::new(root);
        for i in 1..=3 {
            tree.insert_child(root_id.as_str(), None, NodeRecord::new(format!("Branch Topic {i}")));
        }
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            tree,
            layout: LayoutKind::Mind,
            theme: Theme::Light,
            connection_style: None,
            rainbow_branch: None,
            created_at: now_ms,
            updated_at: now_ms,
            version: FORMAT_VERSION.to_string(),
        }
    }

    pub fn from_persisted(doc: &MindMapDocument) -> Result<Self> {
        Ok(Self {
            id: doc.id.clone(),
            name: doc.name.clone(),
            tree: MindTree::from_node(&doc.root)?,
            layout: doc.layout,
            theme: doc.theme,
            connection_style: doc.connection_style,
            rainbow_branch: doc.rainbow_branch,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            version: doc.version.clone(),
        })
    }

    pub fn to_persisted(&self) -> MindMapDocument {
        MindMapDocument {
            id: self.id.clone(),
            name: self.name.clone(),
            root: self.tree.to_node(),
            layout: self.layout,
            theme: self.theme,
            connection_style: self.connection_style,
            rainbow_branch: self.rainbow_branch,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: self.version.clone(),
        }
    }
}

/// Smallest `"Untitled Map N"` (N ≥ 1) not already used in `existing`.
pub fn next_available_name<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let prefix = format!("{UNTITLED_PREFIX} ");
    let used: rustc_hash::FxHashSet<u32> = existing
        .into_iter()
        .filter_map(|name| name.strip_prefix(&prefix))
        .filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|rest| rest.parse().ok())
        .collect();
    let mut n = 1;
    while used.contains(&n) {
        n += 1;
    }
    format!("{prefix}{n}")
}
