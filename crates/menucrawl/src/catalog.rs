//! Catalog records and the output sink.

use crate::result::CrawlResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// A scraped product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Display name
    pub name: String,
    /// Price in the site's display units
    pub price: u64,
}

impl Product {
    /// Create a product
    #[must_use]
    pub fn new(name: impl Into<String>, price: u64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Products in discovery order: category order, then page order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append products, keeping their order
    pub fn extend(&mut self, products: impl IntoIterator<Item = Product>) {
        self.products.extend(products);
    }

    /// Number of products
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if there are no products
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products in order
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }
}

impl FromIterator<Product> for Catalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        Self {
            products: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}

/// A category page address discovered on the landing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryLink(String);

impl CategoryLink {
    /// Wrap a URL
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The URL
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last non-empty path segment, for log lines
    #[must_use]
    pub fn slug(&self) -> &str {
        let path = self.0.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(path)
    }
}

impl fmt::Display for CategoryLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Destination for a finished catalog
pub trait CatalogSink {
    /// Persist the whole catalog, replacing any previous output
    fn write(&self, catalog: &Catalog) -> CrawlResult<()>;
}

/// Writes the catalog as an indented UTF-8 JSON array of `{name, price}`
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    /// Sink writing to `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Output path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSink for JsonFileSink {
    fn write(&self, catalog: &Catalog) -> CrawlResult<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, catalog)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        info!(path = %self.path.display(), products = catalog.len(), "catalog saved");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;

    mod catalog_tests {
        use super::*;

        #[test]
        fn test_extend_preserves_order() {
            let mut catalog = Catalog::new();
            assert!(catalog.is_empty());
            catalog.extend([Product::new("B", 2), Product::new("A", 1)]);
            catalog.extend([Product::new("C", 3)]);
            let names: Vec<_> = catalog.products().iter().map(|p| p.name.as_str()).collect();
            assert_eq!(names, ["B", "A", "C"]);
            assert_eq!(catalog.len(), 3);
        }

        #[test]
        fn test_serializes_as_bare_array() {
            let catalog: Catalog = [Product::new("Latte", 250)].into_iter().collect();
            assert_eq!(
                serde_json::to_string(&catalog).unwrap(),
                r#"[{"name":"Latte","price":250}]"#
            );
        }
    }

    mod category_link_tests {
        use super::*;

        #[test]
        fn test_slug() {
            assert_eq!(CategoryLink::new("https://shop.test/menu/coffee").slug(), "coffee");
            assert_eq!(CategoryLink::new("https://shop.test/menu/tea/").slug(), "tea");
            assert_eq!(CategoryLink::new("https://shop.test/c/42?sort=asc#top").slug(), "42");
            assert_eq!(CategoryLink::new("").slug(), "");
        }
    }

    mod json_sink_tests {
        use super::*;

        #[test]
        fn test_writes_indented_utf8_json() {
            let dir = tempfile::tempdir().unwrap();
            let sink = JsonFileSink::new(dir.path().join("menu.json"));
            let catalog: Catalog = [Product::new("Капучино", 1234)].into_iter().collect();
            sink.write(&catalog).unwrap();

            let written = fs::read_to_string(sink.path()).unwrap();
            assert_eq!(
                written,
                "[\n  {\n    \"name\": \"Капучино\",\n    \"price\": 1234\n  }\n]\n"
            );
            let parsed: Catalog = serde_json::from_str(&written).unwrap();
            assert_eq!(parsed, catalog);
        }

        #[test]
        fn test_overwrites_previous_output() {
            let dir = tempfile::tempdir().unwrap();
            let sink = JsonFileSink::new(dir.path().join("menu.json"));
            let big: Catalog = (0..10).map(|i| Product::new(format!("item {i}"), i)).collect();
            sink.write(&big).unwrap();
            sink.write(&Catalog::new()).unwrap();
            assert_eq!(fs::read_to_string(sink.path()).unwrap(), "[]\n");
        }

        #[test]
        fn test_unwritable_path_is_error() {
            let dir = tempfile::tempdir().unwrap();
            let sink = JsonFileSink::new(dir.path().join("missing").join("menu.json"));
            assert!(sink.write(&Catalog::new()).is_err());
        }
    }
}
