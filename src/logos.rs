//! Best-effort logo download for app and font entries.
//!
//! For each entry without a `logos/<id>.png`, try the favicon service for the
//! entry's website, then the GitHub avatar of the repository owner. Network
//! failures only mean "no image from this source"; there is no retry. A short
//! pause after each download keeps the run polite toward both services.

use crate::catalog::{CatalogFiles, EntryType, load_entry};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Responses smaller than this are treated as placeholder favicons.
pub const DEFAULT_MIN_IMAGE_BYTES: usize = 200;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(50);

const FAVICON_ENDPOINT: &str = "https://www.google.com/s2/favicons";
const GITHUB_HOST_MARKER: &str = "github.com/";
const LOGO_EXTENSION: &str = "png";

/// A successful HTTP response body with its declared content type.
#[derive(Clone, Debug)]
pub struct FetchedImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Source of remote images. `Ok(None)` means the server answered with a
/// non-success status.
pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> Result<Option<FetchedImage>>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("perch-catalog/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Option<FetchedImage>> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("requesting {url}"))?;
        if !response.status().is_success() {
            debug!(url, status = %response.status(), "non-success response");
            return Ok(None);
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let bytes = response
            .bytes()
            .with_context(|| format!("reading body of {url}"))?
            .to_vec();
        Ok(Some(FetchedImage {
            content_type,
            bytes,
        }))
    }
}

#[derive(Clone, Debug)]
pub struct LogoOptions {
    pub min_image_bytes: usize,
    pub delay: Duration,
}

impl Default for LogoOptions {
    fn default() -> Self {
        Self {
            min_image_bytes: DEFAULT_MIN_IMAGE_BYTES,
            delay: DEFAULT_DELAY,
        }
    }
}

/// Link fields of one entry that can yield a logo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogoSource {
    pub id: String,
    pub website: Option<String>,
    pub github: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogoOutcome {
    Skipped,
    Favicon(String),
    GitHub(String),
    NoSource,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogoTally {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl LogoTally {
    fn record(&mut self, outcome: &LogoOutcome) {
        match outcome {
            LogoOutcome::Skipped => self.skipped += 1,
            LogoOutcome::Favicon(_) | LogoOutcome::GitHub(_) => self.downloaded += 1,
            LogoOutcome::NoSource => self.failed += 1,
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Done: {} downloaded, {} skipped, {} no source.",
            self.downloaded, self.skipped, self.failed
        )
    }
}

/// Collect link fields from every app and font descriptor.
pub fn collect_sources(catalog_dir: &Path) -> Result<Vec<LogoSource>> {
    let files = CatalogFiles::scan(catalog_dir)?;
    let mut sources = Vec::new();
    for entry_type in [EntryType::App, EntryType::Font] {
        for path in files.of(entry_type) {
            let entry = load_entry(path, entry_type)
                .with_context(|| format!("loading {}", path.display()))?;
            let links = entry.links();
            sources.push(LogoSource {
                id: entry.id().to_string(),
                website: links.and_then(|l| l.website.clone()),
                github: links.and_then(|l| l.github.clone()),
            });
        }
    }
    Ok(sources)
}

pub fn logo_path(logos_dir: &Path, id: &str) -> PathBuf {
    logos_dir.join(format!("{id}.{LOGO_EXTENSION}"))
}

/// Hostname of a website link, if it parses as an absolute URL.
pub fn website_domain(website: &str) -> Option<String> {
    Url::parse(website)
        .ok()?
        .host_str()
        .filter(|host| !host.is_empty())
        .map(str::to_string)
}

/// Owner segment of a GitHub link (`https://github.com/<owner>/...`).
pub fn github_owner(github: &str) -> Option<String> {
    let start = github.find(GITHUB_HOST_MARKER)? + GITHUB_HOST_MARKER.len();
    let owner = github[start..].split('/').next()?;
    (!owner.is_empty()).then(|| owner.to_string())
}

pub fn favicon_url(domain: &str) -> String {
    format!("{FAVICON_ENDPOINT}?domain={domain}&sz=128")
}

pub fn avatar_url(owner: &str) -> String {
    format!("https://github.com/{owner}.png?size=128")
}

fn accept_image(image: FetchedImage, options: &LogoOptions) -> Option<Vec<u8>> {
    if !image.content_type.starts_with("image/") {
        return None;
    }
    if image.bytes.len() < options.min_image_bytes {
        return None;
    }
    Some(image.bytes)
}

fn try_download(fetcher: &impl ImageFetcher, url: &str, options: &LogoOptions) -> Option<Vec<u8>> {
    match fetcher.fetch(url) {
        Ok(Some(image)) => accept_image(image, options),
        Ok(None) => None,
        Err(err) => {
            warn!(url, "fetch failed: {err:#}");
            None
        }
    }
}

/// Fetch one entry's logo into `logos_dir`.
pub fn sync_one(
    source: &LogoSource,
    logos_dir: &Path,
    fetcher: &impl ImageFetcher,
    options: &LogoOptions,
) -> Result<LogoOutcome> {
    let output = logo_path(logos_dir, &source.id);
    if output.exists() {
        return Ok(LogoOutcome::Skipped);
    }

    let candidates = [
        source
            .website
            .as_deref()
            .and_then(website_domain)
            .map(|domain| (favicon_url(&domain), LogoOutcome::Favicon(domain))),
        source
            .github
            .as_deref()
            .and_then(github_owner)
            .map(|owner| (avatar_url(&owner), LogoOutcome::GitHub(owner))),
    ];

    for (url, outcome) in candidates.into_iter().flatten() {
        if let Some(bytes) = try_download(fetcher, &url, options) {
            fs::write(&output, bytes).with_context(|| format!("writing {}", output.display()))?;
            thread::sleep(options.delay);
            return Ok(outcome);
        }
    }
    Ok(LogoOutcome::NoSource)
}

/// Download missing logos for every app and font, reporting progress to `out`.
pub fn sync_logos(
    catalog_dir: &Path,
    logos_dir: &Path,
    fetcher: &impl ImageFetcher,
    options: &LogoOptions,
    out: &mut impl Write,
) -> Result<LogoTally> {
    fs::create_dir_all(logos_dir).with_context(|| format!("creating {}", logos_dir.display()))?;

    let sources = collect_sources(catalog_dir)?;
    writeln!(out, "Found {} catalog entries.\n", sources.len())?;

    let mut tally = LogoTally::default();
    for source in &sources {
        let outcome = sync_one(source, logos_dir, fetcher, options)?;
        tally.record(&outcome);
        match &outcome {
            LogoOutcome::Skipped => {}
            LogoOutcome::Favicon(domain) => writeln!(out, "  {}... favicon ({domain})", source.id)?,
            LogoOutcome::GitHub(owner) => writeln!(out, "  {}... github ({owner})", source.id)?,
            LogoOutcome::NoSource => writeln!(out, "  {}... no source", source.id)?,
        }
    }

    writeln!(out, "\n{}", tally.summary_line())?;
    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeFetcher {
        responses: HashMap<String, FetchedImage>,
        requested: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        fn with(mut self, url: &str, content_type: &str, len: usize) -> Self {
            self.responses.insert(
                url.to_string(),
                FetchedImage {
                    content_type: content_type.to_string(),
                    bytes: vec![0u8; len],
                },
            );
            self
        }
    }

    impl ImageFetcher for FakeFetcher {
        fn fetch(&self, url: &str) -> Result<Option<FetchedImage>> {
            self.requested.borrow_mut().push(url.to_string());
            Ok(self.responses.get(url).cloned())
        }
    }

    fn fast() -> LogoOptions {
        LogoOptions {
            delay: Duration::ZERO,
            ..LogoOptions::default()
        }
    }

    fn source(id: &str, website: Option<&str>, github: Option<&str>) -> LogoSource {
        LogoSource {
            id: id.to_string(),
            website: website.map(str::to_string),
            github: github.map(str::to_string),
        }
    }

    #[test]
    fn parses_link_parts() {
        assert_eq!(website_domain("https://code.visualstudio.com/docs"), Some("code.visualstudio.com".into()));
        assert_eq!(website_domain("not a url"), None);
        assert_eq!(github_owner("https://github.com/microsoft/vscode"), Some("microsoft".into()));
        assert_eq!(github_owner("https://github.com/"), None);
        assert_eq!(github_owner("https://gitlab.com/foo"), None);
    }

    #[test]
    fn favicon_wins_when_available() {
        let dir = TempDir::new().unwrap();
        let fetcher = FakeFetcher::default().with(&favicon_url("example.com"), "image/png", 500);
        let outcome = sync_one(
            &source("ex", Some("https://example.com"), Some("https://github.com/ex/ex")),
            dir.path(),
            &fetcher,
            &fast(),
        )
        .unwrap();
        assert_eq!(outcome, LogoOutcome::Favicon("example.com".into()));
        assert_eq!(fs::read(logo_path(dir.path(), "ex")).unwrap().len(), 500);
        assert_eq!(fetcher.requested.borrow().len(), 1);
    }

    #[test]
    fn placeholder_favicon_falls_back_to_github() {
        let dir = TempDir::new().unwrap();
        let fetcher = FakeFetcher::default()
            .with(&favicon_url("example.com"), "image/png", 120)
            .with(&avatar_url("ex"), "image/png", 4096);
        let outcome = sync_one(
            &source("ex", Some("https://example.com"), Some("https://github.com/ex/ex")),
            dir.path(),
            &fetcher,
            &fast(),
        )
        .unwrap();
        assert_eq!(outcome, LogoOutcome::GitHub("ex".into()));
    }

    #[test]
    fn threshold_is_configurable() {
        let dir = TempDir::new().unwrap();
        let fetcher = FakeFetcher::default().with(&favicon_url("example.com"), "image/png", 120);
        let options = LogoOptions {
            min_image_bytes: 0,
            delay: Duration::ZERO,
        };
        let outcome =
            sync_one(&source("ex", Some("https://example.com"), None), dir.path(), &fetcher, &options)
                .unwrap();
        assert_eq!(outcome, LogoOutcome::Favicon("example.com".into()));
    }

    #[test]
    fn non_image_content_is_rejected() {
        let dir = TempDir::new().unwrap();
        let fetcher = FakeFetcher::default().with(&favicon_url("example.com"), "text/html", 5000);
        let outcome =
            sync_one(&source("ex", Some("https://example.com"), None), dir.path(), &fetcher, &fast())
                .unwrap();
        assert_eq!(outcome, LogoOutcome::NoSource);
        assert!(!logo_path(dir.path(), "ex").exists());
    }

    #[test]
    fn existing_logo_is_skipped_without_fetching() {
        let dir = TempDir::new().unwrap();
        fs::write(logo_path(dir.path(), "ex"), b"png").unwrap();
        let fetcher = FakeFetcher::default();
        let outcome =
            sync_one(&source("ex", Some("https://example.com"), None), dir.path(), &fetcher, &fast())
                .unwrap();
        assert_eq!(outcome, LogoOutcome::Skipped);
        assert!(fetcher.requested.borrow().is_empty());
    }

    #[test]
    fn tally_counts_each_outcome() {
        let mut tally = LogoTally::default();
        for outcome in [
            LogoOutcome::Skipped,
            LogoOutcome::Favicon("a".into()),
            LogoOutcome::GitHub("b".into()),
            LogoOutcome::NoSource,
        ] {
            tally.record(&outcome);
        }
        assert_eq!(tally.summary_line(), "Done: 2 downloaded, 1 skipped, 1 no source.");
    }

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn syncs_apps_and_fonts_with_progress() {
        let dir = TempDir::new().unwrap();
        let catalog = dir.path().join("catalog");
        let logos = catalog.join("logos");
        write(
            &catalog,
            "apps/code.yaml",
            "name: Code\nlinks:\n  website: https://code.visualstudio.com/\n  github: https://github.com/microsoft/vscode\n",
        );
        write(&catalog, "apps/old.yaml", "name: Old\nlinks:\n  website: https://old.example\n");
        write(&catalog, "apps/plain.yaml", "name: Plain\n");
        write(
            &catalog,
            "apps/editors/zed.yaml",
            "name: Zed\nlinks:\n  github: https://github.com/zed-industries/zed\n",
        );
        write(
            &catalog,
            "fonts/fira.yaml",
            "name: Fira\nlinks:\n  github: https://github.com/tonsky/FiraCode\n",
        );
        write(
            &catalog,
            "tweaks/t.yaml",
            "name: T\nscript: x\nlinks:\n  website: https://tweak.example\n",
        );
        write(&logos, "old.png", "png");

        let fetcher = FakeFetcher::default()
            .with(&favicon_url("code.visualstudio.com"), "image/png", 500)
            .with(&avatar_url("zed-industries"), "image/png", 500)
            .with(&avatar_url("tonsky"), "image/jpeg", 500);

        let mut out = Vec::new();
        let tally = sync_logos(&catalog, &logos, &fetcher, &fast(), &mut out).unwrap();

        assert_eq!(
            tally,
            LogoTally {
                downloaded: 3,
                skipped: 1,
                failed: 1,
            }
        );
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Found 5 catalog entries.\n\n\
             \x20 code... favicon (code.visualstudio.com)\n\
             \x20 zed... github (zed-industries)\n\
             \x20 plain... no source\n\
             \x20 fira... github (tonsky)\n\
             \nDone: 3 downloaded, 1 skipped, 1 no source.\n"
        );
        for id in ["code", "zed", "fira"] {
            assert!(logo_path(&logos, id).is_file(), "{id} logo missing");
        }
        assert!(!logo_path(&logos, "plain").exists());
        assert!(
            fetcher
                .requested
                .borrow()
                .iter()
                .all(|url| !url.contains("tweak.example") && !url.contains("old.example"))
        );
    }
}
