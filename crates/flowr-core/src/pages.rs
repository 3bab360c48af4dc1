use url::Url;

use crate::settings::RunMode;

pub const DEV_SERVER_URL: &str = "http://localhost:4444/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalPage {
    Config,
    NoConnection,
}

impl LocalPage {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Config => "config.html",
            Self::NoConnection => "noconnection.html",
        }
    }
}

/// Maps local pages to URLs under one base: the dev server, or the bundled frontend origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocator {
    base: Url,
}

impl PageLocator {
    pub fn new(mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base }
    }

    pub fn for_mode(mode: RunMode, packaged_base: Url) -> Result<Self, url::ParseError> {
        let base = match mode {
            RunMode::Development => Url::parse(DEV_SERVER_URL)?,
            RunMode::Packaged => packaged_base,
        };
        Ok(Self::new(base))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, page: LocalPage) -> Url {
        let mut url = self.base.clone();
        let path = format!("{}{}", self.base.path(), page.file_name());
        url.set_path(&path);
        url
    }
}
