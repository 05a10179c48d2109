//! Page documents.
//!
//! Extension commands print a page document on stdout; the launcher renders
//! it. A document is either a list of items or a block of detail text, and
//! both carry actions.
//!
//! ```json
//! {"type": "list", "title": "Repos", "items": [
//!   {"id": "lumen", "title": "lumen", "subtitle": "launcher", "accessories": ["rust"],
//!    "actions": [{"type": "open", "title": "Open", "url": "https://example.com"}]}
//! ]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LumenError, LumenResult};
use crate::filter::FilterItem;

/// A page produced by an extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PageDocument {
    List(ListDocument),
    Detail(DetailDocument),
}

impl PageDocument {
    /// Parse command output into a page. Items without an id get one
    /// derived from their position.
    pub fn parse(bytes: &[u8]) -> LumenResult<Self> {
        let mut page: PageDocument =
            serde_json::from_slice(bytes).map_err(|e| LumenError::InvalidPage(e.to_string()))?;
        if let PageDocument::List(ref mut list) = page {
            for (index, item) in list.items.iter_mut().enumerate() {
                if item.id.is_empty() {
                    item.id = format!("#{}", index);
                }
            }
        }
        Ok(page)
    }

    pub fn title(&self) -> &str {
        match self {
            PageDocument::List(list) => &list.title,
            PageDocument::Detail(detail) => &detail.title,
        }
    }

    /// Point every `run` action without an explicit extension, including
    /// those of nested pages, at `extension`.
    pub fn bind_extension(&mut self, extension: &str) {
        let actions: Vec<&mut Action> = match self {
            PageDocument::List(list) => list
                .items
                .iter_mut()
                .flat_map(|item| item.actions.iter_mut())
                .collect(),
            PageDocument::Detail(detail) => detail.actions.iter_mut().collect(),
        };

        for action in actions {
            match action.effect {
                Effect::Run(ref mut target) if target.extension.is_empty() => {
                    target.extension = extension.to_string();
                }
                Effect::Push { ref mut page } => page.bind_extension(extension),
                _ => {}
            }
        }
    }
}

/// List page document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDocument {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub items: Vec<ListItem>,
}

/// Detail page document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailDocument {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub actions: Vec<Action>,
}

/// A single item in a list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListItem {
    /// Identifier, unique within its list
    #[serde(default)]
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub subtitle: String,

    /// Short labels displayed on the right
    #[serde(default)]
    pub accessories: Vec<String>,

    /// Actions, the first one is primary
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl FilterItem for ListItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn filter_text(&self) -> String {
        let mut text = self.title.clone();
        if !self.subtitle.is_empty() {
            text.push(' ');
            text.push_str(&self.subtitle);
        }
        for accessory in &self.accessories {
            text.push(' ');
            text.push_str(accessory);
        }
        text
    }
}

/// A user-triggerable action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub title: String,

    /// Keyboard shortcut such as `ctrl+y`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,

    #[serde(flatten)]
    pub effect: Effect,
}

impl Action {
    pub fn new(title: impl Into<String>, effect: Effect) -> Self {
        Self {
            title: title.into(),
            shortcut: None,
            effect,
        }
    }

    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }
}

/// What an action does once selected. Evaluation is deferred to the event
/// loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Effect {
    /// Run an extension command and push its page
    Run(RunTarget),
    /// Copy text to the clipboard
    Copy { text: String },
    /// Open a URL in the default browser
    Open { url: String },
    /// Push a page document
    Push { page: Box<PageDocument> },
    /// Go back one page
    Pop,
    /// Exit and print text on stdout
    Print { text: String },
}

/// An extension command bound to params.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunTarget {
    /// Owning extension. Empty means the extension that produced the page.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extension: String,

    pub command: String,

    #[serde(default)]
    pub params: Map<String, Value>,

    /// History key refreshed when the target runs (root items only).
    #[serde(skip)]
    pub history_id: Option<String>,
}
