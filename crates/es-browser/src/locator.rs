use std::fmt;

/// How an element on the page is addressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Locator {
    /// `name` attribute.
    Name(String),
    /// `id` attribute.
    Id(String),
    XPath(String),
    Css(String),
}

impl Locator {
    pub fn name(name: impl Into<String>) -> Self {
        Locator::Name(name.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn xpath(path: impl Into<String>) -> Self {
        Locator::XPath(path.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    /// Equivalent CSS selector, where one exists.
    pub fn to_css(&self) -> Option<String> {
        match self {
            Locator::Name(name) => Some(format!("[name=\"{}\"]", escape_css_string(name))),
            Locator::Id(id) => Some(format!("[id=\"{}\"]", escape_css_string(id))),
            Locator::Css(selector) => Some(selector.clone()),
            Locator::XPath(_) => None,
        }
    }
}

fn escape_css_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Name(name) => write!(f, "name={}", name),
            Locator::Id(id) => write!(f, "id={}", id),
            Locator::XPath(path) => write!(f, "xpath={}", path),
            Locator::Css(selector) => write!(f, "css={}", selector),
        }
    }
}
