//! Wikipedia cross-references for artist and album fields.

use anyhow::{Result, anyhow, bail};
use url::Url;

use crate::decoder::TextLinker;

/// Turns a value into a Markdown link to its Wikipedia article.
pub struct WikiLinker {
    base: String,
}

impl WikiLinker {
    pub const ENGLISH: &'static str = "https://en.wikipedia.org/wiki/";

    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn article_url(&self, title: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("{} cannot carry an article path", self.base))?
            .pop_if_empty()
            .push(&title.replace(' ', "_"));
        Ok(url)
    }
}

impl Default for WikiLinker {
    fn default() -> Self {
        Self::new(Self::ENGLISH)
    }
}

impl TextLinker for WikiLinker {
    fn link(&self, text: &str) -> Result<String> {
        let title = text.trim();
        if title.is_empty() {
            bail!("nothing to link");
        }
        Ok(format!("[{}]({})", title, self.article_url(title)?))
    }
}
