/*!
 * Content catalog: the source-of-truth text of the site.
 *
 * The catalog is an ordered mapping page → section → content block.
 * Iteration order is the order in which pages and sections were
 * declared, which is also the order the bulk driver walks them.
 */

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::path::Path;

pub mod builtin;
pub mod content;

pub use content::ContentBlock;

use crate::translation::key::validate_key_part;

/// One section of a page
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Section identifier within the page
    pub name: String,
    /// Source-language content
    pub content: ContentBlock,
}

/// One page of the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Page identifier
    pub name: String,
    /// Sections in declaration order
    pub sections: Vec<Section>,
}

/// Ordered page → section → content mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pages: Vec<Page>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self { pages: Vec::new() }
    }

    /// The catalog shipped with the application
    pub fn builtin() -> Self {
        builtin::visa_hub_catalog()
    }

    /// Add (or replace) a section, creating the page when needed
    pub fn with_section(
        mut self,
        page: impl Into<String>,
        section: impl Into<String>,
        content: ContentBlock,
    ) -> Self {
        self.insert_section(page.into(), section.into(), content);
        self
    }

    fn insert_section(&mut self, page: String, section: String, content: ContentBlock) {
        let page_entry = match self.pages.iter().position(|p| p.name == page) {
            Some(index) => &mut self.pages[index],
            None => {
                self.pages.push(Page {
                    name: page,
                    sections: Vec::new(),
                });
                let last = self.pages.len() - 1;
                &mut self.pages[last]
            }
        };

        match page_entry.sections.iter_mut().find(|s| s.name == section) {
            Some(existing) => existing.content = content,
            None => page_entry.sections.push(Section {
                name: section,
                content,
            }),
        }
    }

    /// Pages in declaration order
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Total number of sections across all pages
    pub fn section_count(&self) -> usize {
        self.pages.iter().map(|p| p.sections.len()).sum()
    }

    /// Look up the content of a section
    pub fn get_section(&self, page: &str, section: &str) -> Option<&ContentBlock> {
        self.pages
            .iter()
            .find(|p| p.name == page)?
            .sections
            .iter()
            .find(|s| s.name == section)
            .map(|s| &s.content)
    }

    /// Parse a catalog from JSON of the form `{ page: { section: { ... } } }`
    pub fn from_json_str(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text).context("Failed to parse catalog JSON")?;
        let pages = root
            .as_object()
            .ok_or_else(|| anyhow!("Catalog root must be an object of pages"))?;

        let mut catalog = Catalog::new();
        for (page_name, sections) in pages {
            validate_key_part(page_name)
                .with_context(|| format!("Invalid page name '{}'", page_name))?;
            let sections = sections
                .as_object()
                .ok_or_else(|| anyhow!("Page '{}' must be an object of sections", page_name))?;

            for (section_name, content) in sections {
                validate_key_part(section_name).with_context(|| {
                    format!("Invalid section name '{}.{}'", page_name, section_name)
                })?;
                let block = ContentBlock::from_value(content.clone()).with_context(|| {
                    format!("Invalid content in section '{}.{}'", page_name, section_name)
                })?;
                catalog.insert_section(page_name.clone(), section_name.clone(), block);
            }
        }

        Ok(catalog)
    }

    /// Load a catalog from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {:?}", path))?;
        Self::from_json_str(&text)
    }
}
