use crate::config::toml_config::TomlConfig;
use crate::domain::model::DocumentId;
use crate::domain::ports::DocumentResolver;
use crate::utils::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use url::Url;

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub locale: String,
    pub section: String,
    /// 只接受設定語系底下的路徑
    pub localized_only: bool,
    pub verify_host: bool,
    pub host: Option<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            section: "docs".to_string(),
            localized_only: true,
            verify_host: false,
            host: None,
        }
    }
}

impl ResolveOptions {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            locale: config.locale().to_string(),
            section: config.section().to_string(),
            localized_only: true,
            verify_host: config.verify_host(),
            host: config.documents.host.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupRow {
    id: u64,
    locale: String,
    slug: String,
}

/// 由對照表 (id,locale,slug) 將網址路徑對應到文件 id
#[derive(Debug, Clone)]
pub struct LookupDocumentResolver {
    options: ResolveOptions,
    documents: HashMap<(String, String), DocumentId>,
}

impl LookupDocumentResolver {
    pub fn new(options: ResolveOptions) -> Self {
        Self {
            options,
            documents: HashMap::new(),
        }
    }

    pub fn from_reader<R: Read>(reader: R, options: ResolveOptions) -> Result<Self> {
        let mut resolver = Self::new(options);
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        for row in csv_reader.deserialize::<LookupRow>() {
            let row = row?;
            resolver.insert(&row.locale, &row.slug, DocumentId(row.id));
        }

        tracing::debug!("Loaded {} documents into lookup table", resolver.len());
        Ok(resolver)
    }

    pub fn from_path<P: AsRef<Path>>(path: P, options: ResolveOptions) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, options)
    }

    pub fn insert(&mut self, locale: &str, slug: &str, id: DocumentId) {
        self.documents.insert(
            (locale.to_ascii_lowercase(), slug.trim_matches('/').to_string()),
            id,
        );
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// 解析出 (locale, slug)；不符合 /<locale>/<section>/<slug> 的路徑回傳 None
    fn locale_and_slug<'p>(&self, path: &'p str) -> Option<(&'p str, String)> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let mut segments = path.trim_matches('/').split('/');

        let locale = segments.next().filter(|s| !s.is_empty())?;
        if segments.next()? != self.options.section {
            return None;
        }

        let slug = segments.collect::<Vec<_>>().join("/");
        if slug.is_empty() {
            return None;
        }

        if self.options.localized_only && !locale.eq_ignore_ascii_case(&self.options.locale) {
            return None;
        }

        Some((locale, slug))
    }

    fn resolve_url(&self, raw: &str) -> Option<DocumentId> {
        let url = Url::parse(raw).ok()?;
        if self.options.verify_host {
            let expected = self.options.host.as_deref()?;
            if !url.host_str()?.eq_ignore_ascii_case(expected) {
                return None;
            }
        }
        self.resolve_path(url.path())
    }

    fn resolve_path(&self, path: &str) -> Option<DocumentId> {
        let (locale, slug) = self.locale_and_slug(path)?;
        self.documents
            .get(&(locale.to_ascii_lowercase(), slug))
            .copied()
    }
}

impl DocumentResolver for LookupDocumentResolver {
    fn resolve(&self, path: &str) -> Option<DocumentId> {
        if path.starts_with("http://") || path.starts_with("https://") {
            self.resolve_url(path)
        } else {
            self.resolve_path(path)
        }
    }
}
