use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;

/// Callbacks invoked by [`HtmlScanner`] for a single selector binding.
///
/// Both methods default to no-ops so an extractor only implements what it needs.
pub trait ElementHandler {
    /// Called once per matched element, in document order.
    fn element(&mut self, _element: ElementRef<'_>) {}

    /// Called for every text node nested anywhere inside a matched element.
    fn text(&mut self, _text: &str) {}
}

/// Parses a CSS selector, falling back to one that matches nothing.
///
/// Extraction misses are never fatal, so a bad selector is logged and the
/// corresponding scan simply yields no matches.
pub fn parse_selector(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| {
        tracing::error!(selector = %selector, error = %e, "Failed to parse CSS selector, using fallback");
        match Selector::parse("*:not(*)") {
            Ok(fallback) => fallback,
            Err(_) => unreachable!("fallback selector is valid"),
        }
    })
}

/// Drives selector-bound callbacks over a parsed HTML document.
///
/// Bindings are registered with [`on`](Self::on) and dispatched by
/// [`run`](Self::run), which walks the document once in document order.
///
/// ```
/// use bulletin_rss::extract::{ElementHandler, HtmlScanner};
/// use scraper::Html;
///
/// #[derive(Default)]
/// struct Collect(String);
///
/// impl ElementHandler for Collect {
///     fn text(&mut self, text: &str) {
///         self.0.push_str(text);
///     }
/// }
///
/// let doc = Html::parse_fragment("<p>a<b>b</b></p><p>c</p>");
/// let mut collect = Collect::default();
/// HtmlScanner::new().on("p", &mut collect).run(&doc);
/// assert_eq!(collect.0, "abc");
/// ```
pub struct HtmlScanner<'h> {
    bindings: Vec<(Selector, &'h mut dyn ElementHandler)>,
}

impl Default for HtmlScanner<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'h> HtmlScanner<'h> {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Binds `handler` to every element matching `selector`.
    pub fn on(mut self, selector: &str, handler: &'h mut dyn ElementHandler) -> Self {
        self.bindings.push((parse_selector(selector), handler));
        self
    }

    /// Walks `document`, invoking the bound callbacks synchronously.
    pub fn run(self, document: &Html) {
        let matched: Vec<HashSet<_>> = self
            .bindings
            .iter()
            .map(|(selector, _)| document.select(selector).map(|el| el.id()).collect())
            .collect();

        let mut bindings = self.bindings;

        for node in document.tree.root().descendants() {
            match node.value() {
                Node::Element(_) => {
                    for (ids, (_, handler)) in matched.iter().zip(bindings.iter_mut()) {
                        if !ids.contains(&node.id()) {
                            continue;
                        }
                        if let Some(element) = ElementRef::wrap(node) {
                            handler.element(element);
                        }
                    }
                }
                Node::Text(text) => {
                    for (ids, (_, handler)) in matched.iter().zip(bindings.iter_mut()) {
                        if node.ancestors().any(|a| ids.contains(&a.id())) {
                            handler.text(text);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}
