//! Queryable HTML documents.
//!
//! The authenticator and the extractor only see these traits, so they can run
//! against in-memory stubs in tests. `HtmlParser` is the production
//! implementation backed by the `scraper` crate.

use crate::error::{PortalError, Result};
use scraper::{ElementRef, Html, Selector};

/// Turns an HTML body into a queryable document.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, html: &str) -> Box<dyn Document>;
}

/// A parsed page that can be queried by CSS selector.
pub trait Document {
    /// All elements matching `selector`, in document order.
    fn select(&self, selector: &str) -> Result<Vec<Box<dyn Element + '_>>>;
}

/// One element of a parsed page.
pub trait Element {
    /// Attribute value, `None` when the attribute is absent.
    fn attr(&self, name: &str) -> Option<String>;

    /// Concatenated text of all descendant text nodes, untrimmed.
    fn text(&self) -> String;

    /// Descendants matching `selector`, in document order.
    fn select(&self, selector: &str) -> Result<Vec<Box<dyn Element + '_>>>;
}

/// `scraper`-backed parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl DocumentParser for HtmlParser {
    fn parse(&self, html: &str) -> Box<dyn Document> {
        Box::new(HtmlDocument {
            html: Html::parse_document(html),
        })
    }
}

struct HtmlDocument {
    html: Html,
}

impl Document for HtmlDocument {
    fn select(&self, selector: &str) -> Result<Vec<Box<dyn Element + '_>>> {
        let selector = compile(selector)?;
        Ok(self
            .html
            .select(&selector)
            .map(|el| Box::new(HtmlElement(el)) as Box<dyn Element + '_>)
            .collect())
    }
}

struct HtmlElement<'a>(ElementRef<'a>);

impl Element for HtmlElement<'_> {
    fn attr(&self, name: &str) -> Option<String> {
        self.0.value().attr(name).map(str::to_string)
    }

    fn text(&self) -> String {
        self.0.text().collect()
    }

    fn select(&self, selector: &str) -> Result<Vec<Box<dyn Element + '_>>> {
        let selector = compile(selector)?;
        Ok(self
            .0
            .select(&selector)
            .map(|el| Box::new(HtmlElement(el)) as Box<dyn Element + '_>)
            .collect())
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| PortalError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}
