use std::{fs, path::PathBuf, time::Duration};

use ureq::Agent;
use url::Url;

use crate::error::Error;

/// Supplies the content fragment behind an instrument's `content_ref`.
///
/// Calls block; the dispatcher runs them off the event thread.
pub trait ContentSource: Send + Sync {
    fn fetch(&self, content_ref: &str) -> Result<String, Error>;
}

pub struct HttpContentSource {
    agent: Agent,
    base: Url,
}

impl HttpContentSource {
    pub fn new(base: Url, proxy_url: Option<&str>, timeout: Duration) -> Self {
        let mut agent = Agent::config_builder().timeout_global(Some(timeout));
        if let Some(proxy_url) = proxy_url {
            let proxy = ureq::Proxy::new(proxy_url).ok();
            agent = agent.proxy(proxy);
        }
        Self {
            agent: agent.build().into(),
            base,
        }
    }

    fn resolve(&self, content_ref: &str) -> Result<Url, Error> {
        self.base
            .join(content_ref)
            .map_err(|err| fetch_failed(content_ref, err))
    }
}

impl ContentSource for HttpContentSource {
    fn fetch(&self, content_ref: &str) -> Result<String, Error> {
        let url = self.resolve(content_ref)?;
        log::debug!("fetching content: {}", url);
        // Non-success statuses come back as `ureq::Error::StatusCode`.
        let mut response = self
            .agent
            .get(url.as_str())
            .call()
            .map_err(|err| fetch_failed(content_ref, err))?;
        if !response.status().is_success() {
            return Err(fetch_failed(content_ref, response.status()));
        }
        response
            .body_mut()
            .read_to_string()
            .map_err(|err| fetch_failed(content_ref, err))
    }
}

/// Serves fragments from a local directory.
pub struct DirContentSource {
    base: PathBuf,
}

impl DirContentSource {
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }
}

impl ContentSource for DirContentSource {
    fn fetch(&self, content_ref: &str) -> Result<String, Error> {
        if content_ref.split(['/', '\\']).any(|part| part == "..") {
            return Err(fetch_failed(content_ref, "path leaves content root"));
        }
        let path = self.base.join(content_ref);
        log::debug!("reading content: {:?}", path);
        fs::read_to_string(&path).map_err(|err| fetch_failed(content_ref, err))
    }
}

fn fetch_failed(content_ref: &str, reason: impl ToString) -> Error {
    Error::ContentFetchFailed {
        content_ref: content_ref.to_owned(),
        reason: reason.to_string(),
    }
}
