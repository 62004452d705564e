//! In-memory page source backed by a JSON adjacency file:
//! `{ "Title": ["Linked Title", ...], ... }`. Link targets that have no
//! entry of their own still resolve, as dead-end pages, as long as some
//! page links to them.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use anyhow::Context;

use arena_core::graph::{PageError, PageSource};
use arena_core::models::Page;

#[derive(Debug, Default)]
pub struct StaticGraphSource {
    links: BTreeMap<String, Vec<String>>,
}

impl StaticGraphSource {
    pub fn from_map(links: BTreeMap<String, Vec<String>>) -> Self {
        Self { links }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read graph file {}", path.display()))?;
        let links: BTreeMap<String, Vec<String>> = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse graph file {}", path.display()))?;
        Ok(Self::from_map(links))
    }

    pub fn page_count(&self) -> usize {
        self.links.len()
    }

    fn resolve(&self, title: &str) -> Result<Page, PageError> {
        let links = match self.links.get(title) {
            Some(links) => links.clone(),
            None => {
                // A known link target without its own entry is a dead end.
                if !self
                    .links
                    .values()
                    .any(|links| links.iter().any(|l| l == title))
                {
                    return Err(PageError::NotFound(title.to_string()));
                }
                Vec::new()
            }
        };
        Ok(Page {
            title: title.to_string(),
            url: format!("https://en.wikipedia.org/wiki/{}", title.replace(' ', "_")),
            text: None,
            links,
        })
    }
}

impl PageSource for StaticGraphSource {
    fn get_page<'a>(
        &'a self,
        title: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Page, PageError>> + Send + 'a>> {
        Box::pin(async move { self.resolve(title) })
    }
}
