//! Purpose: Public read API over a `RawStore`: sections, categories, options and typed values.
//! Exports: `CfgParser`, `SectionKey`.
//! Role: Resolves (category, section, option) lookups and applies caller defaults.
//! Invariants: The category index is built at most once per parser until `reset_categories`.
//! Invariants: Category lookups reflect the section set at build time; reads never invalidate it.
//! Invariants: Defaults are returned as given, never evaluated or split.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::debug;

use crate::core::category::CategoryIndex;
use crate::core::error::{Error, ErrorKind};
use crate::core::evaluate::evaluate;
use crate::core::ini::{self, DEFAULT_SECTION};
use crate::core::list::{split, split_evaluated};
use crate::core::section::SectionView;
use crate::core::store::RawStore;
use crate::core::value::Value;

/// Addresses a section either by its full name or by category and bare name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SectionKey<'a> {
    Name(&'a str),
    Categorized { category: &'a str, name: &'a str },
}

impl<'a> SectionKey<'a> {
    pub fn categorized(category: &'a str, name: &'a str) -> Self {
        Self::Categorized { category, name }
    }
}

impl<'a> From<&'a str> for SectionKey<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for SectionKey<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name.as_str())
    }
}

#[derive(Clone, Debug, Default)]
pub struct CfgParser {
    store: RawStore,
    categories: OnceLock<CategoryIndex>,
}

/// Outcome of an option lookup. `Missing` is the case a caller default may
/// replace; hard failures are returned as `Err` before this point.
enum Lookup<'s> {
    Found(&'s str),
    Missing(Error),
}

impl<'s> Lookup<'s> {
    fn found(self) -> Result<&'s str, Error> {
        match self {
            Self::Found(raw) => Ok(raw),
            Self::Missing(err) => Err(err),
        }
    }

    fn map_or<T>(self, default: T, f: impl FnOnce(&'s str) -> T) -> T {
        match self {
            Self::Found(raw) => f(raw),
            Self::Missing(_) => default,
        }
    }
}

impl CfgParser {
    pub fn new() -> Self {
        Self::from_store(RawStore::new())
    }

    /// Starts with the given `DEFAULT` entries, visible from every section.
    pub fn with_defaults<I, K, V>(defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut store = RawStore::new();
        for (key, value) in defaults {
            store.set_default(key.as_ref(), value);
        }
        Self::from_store(store)
    }

    pub fn from_store(store: RawStore) -> Self {
        Self {
            store,
            categories: OnceLock::new(),
        }
    }

    pub fn store(&self) -> &RawStore {
        &self.store
    }

    /// Parses `text` into this parser. `source` only labels errors and logs.
    pub fn read_str(&mut self, text: &str, source: impl AsRef<Path>) -> Result<(), Error> {
        ini::read_into(&mut self.store, text, source.as_ref())
    }

    pub fn read_path(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| io_error(path, err))?;
        self.read_str(&text, path)
    }

    /// Reads every readable path in order and returns the ones that were read.
    /// Unreadable paths are skipped; parse errors still fail the whole call.
    pub fn read_paths<I, P>(&mut self, paths: I) -> Result<Vec<PathBuf>, Error>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut read = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(err) => {
                    debug!(path = %path.display(), error = %err, "skipping unreadable config");
                    continue;
                }
            };
            self.read_str(&text, path)?;
            read.push(path.to_path_buf());
        }
        Ok(read)
    }

    /// Drops the cached category index; the next category-aware call rebuilds
    /// it from the current sections.
    pub fn reset_categories(&mut self) {
        if self.categories.take().is_some() {
            debug!("category index reset");
        }
    }

    fn category_index(&self) -> &CategoryIndex {
        self.categories.get_or_init(|| {
            let index =
                CategoryIndex::build(self.store.section_names(), self.store.option_transform());
            debug!(
                categories = index.len(),
                sections = index.section_count(),
                "built category index"
            );
            index
        })
    }

    pub fn categories(&self) -> Vec<&str> {
        self.category_index().categories().collect()
    }

    /// All section names as written, or the bare names within `category`.
    pub fn sections(&self, category: Option<&str>) -> Result<Vec<&str>, Error> {
        let Some(category) = category else {
            return Ok(self.store.section_names().collect());
        };
        self.category_index()
            .sections(category)
            .map(|names| names.collect())
            .ok_or_else(|| {
                Error::new(ErrorKind::SectionNotFound)
                    .with_message(format!("no such category {category:?}"))
            })
    }

    pub fn has_section<'k>(&self, key: impl Into<SectionKey<'k>>) -> bool {
        match key.into() {
            SectionKey::Name(name) => self.store.has_section(name),
            SectionKey::Categorized { category, name } => {
                self.category_index().resolve(category, name).is_some()
            }
        }
    }

    fn resolve<'a>(&'a self, key: SectionKey<'a>) -> Option<&'a str> {
        match key {
            SectionKey::Name(name) => Some(name),
            SectionKey::Categorized { category, name } => {
                self.category_index().resolve(category, name)
            }
        }
    }

    fn resolve_existing<'a>(&'a self, key: SectionKey<'a>) -> Result<&'a str, Error> {
        let section = self.resolve(key).ok_or_else(|| unresolved(key))?;
        if !self.store.has_section(section) {
            return Err(Error::section_not_found(section));
        }
        Ok(section)
    }

    /// Option names: the section's own first, then inherited defaults.
    pub fn options<'k>(&self, key: impl Into<SectionKey<'k>>) -> Result<Vec<&str>, Error> {
        let section = self.resolve_existing(key.into())?;
        self.store
            .option_names(section)
            .ok_or_else(|| Error::section_not_found(section))
    }

    /// `DEFAULT` as the section name checks the defaults table alone.
    pub fn has_option<'k>(&self, key: impl Into<SectionKey<'k>>, option: &str) -> bool {
        let option = self.store.transform(option);
        match self.resolve(key.into()) {
            Some(DEFAULT_SECTION) => self.store.defaults().contains_key(&option),
            Some(section) => self.store.value(section, &option).is_some(),
            None => false,
        }
    }

    /// `(option, raw value)` pairs: defaults in their own order (overridden in
    /// place by the section), then the section's remaining options.
    pub fn items<'k>(&self, key: impl Into<SectionKey<'k>>) -> Result<Vec<(&str, &str)>, Error> {
        let section = self.resolve_existing(key.into())?;
        self.store
            .items(section)
            .ok_or_else(|| Error::section_not_found(section))
    }

    fn lookup(&self, key: SectionKey<'_>, option: &str) -> Result<Lookup<'_>, Error> {
        let section = match self.resolve(key) {
            Some(section) => section,
            None => return Ok(Lookup::Missing(unresolved(key))),
        };
        if !self.store.has_section(section) {
            return Err(Error::section_not_found(section));
        }
        let found = self.store.value(section, &self.store.transform(option));
        Ok(match found {
            Some(raw) => Lookup::Found(raw),
            None => Lookup::Missing(Error::option_not_found(section, option)),
        })
    }

    pub fn get<'k>(&self, key: impl Into<SectionKey<'k>>, option: &str) -> Result<&str, Error> {
        self.lookup(key.into(), option)?.found()
    }

    /// Like [`get`](Self::get), but a missing option or an unresolvable
    /// category yields `default`. A missing plain section is still an error.
    pub fn get_or<'s, 'k>(
        &'s self,
        key: impl Into<SectionKey<'k>>,
        option: &str,
        default: &'s str,
    ) -> Result<&'s str, Error> {
        Ok(self.lookup(key.into(), option)?.map_or(default, |raw| raw))
    }

    pub fn get_eval<'k>(&self, key: impl Into<SectionKey<'k>>, option: &str) -> Result<Value, Error> {
        self.lookup(key.into(), option)?.found().map(evaluate)
    }

    pub fn get_eval_or<'k>(
        &self,
        key: impl Into<SectionKey<'k>>,
        option: &str,
        default: Value,
    ) -> Result<Value, Error> {
        Ok(self.lookup(key.into(), option)?.map_or(default, evaluate))
    }

    pub fn get_list<'k>(
        &self,
        key: impl Into<SectionKey<'k>>,
        option: &str,
    ) -> Result<Vec<&str>, Error> {
        self.lookup(key.into(), option)?.found().map(split)
    }

    pub fn get_list_or<'s, 'k>(
        &'s self,
        key: impl Into<SectionKey<'k>>,
        option: &str,
        default: Vec<&'s str>,
    ) -> Result<Vec<&'s str>, Error> {
        Ok(self.lookup(key.into(), option)?.map_or(default, split))
    }

    pub fn get_list_eval<'k>(
        &self,
        key: impl Into<SectionKey<'k>>,
        option: &str,
    ) -> Result<Vec<Value>, Error> {
        self.lookup(key.into(), option)?.found().map(split_evaluated)
    }

    pub fn get_list_eval_or<'k>(
        &self,
        key: impl Into<SectionKey<'k>>,
        option: &str,
        default: Vec<Value>,
    ) -> Result<Vec<Value>, Error> {
        Ok(self.lookup(key.into(), option)?.map_or(default, split_evaluated))
    }

    /// Binds one section for repeated access. Categorized keys are resolved
    /// now; plain names are checked on each access.
    pub fn section<'k>(&self, key: impl Into<SectionKey<'k>>) -> Result<SectionView<'_>, Error> {
        let key = key.into();
        let section = self.resolve(key).ok_or_else(|| unresolved(key))?;
        Ok(SectionView::new(self, section.to_string()))
    }
}

fn unresolved(key: SectionKey<'_>) -> Error {
    match key {
        SectionKey::Name(name) => Error::section_not_found(name),
        SectionKey::Categorized { category, name } => Error::section_not_found(name)
            .with_message(format!("no section {name:?} in category {category:?}")),
    }
}

fn io_error(path: &Path, err: io::Error) -> Error {
    Error::new(ErrorKind::Io)
        .with_message("failed to read config file")
        .with_path(path)
        .with_source(err)
}

#[cfg(test)]
mod tests {
    use super::{CfgParser, SectionKey};
    use crate::core::error::ErrorKind;
    use crate::core::value::Value;

    fn parser(text: &str) -> CfgParser {
        let mut cfg = CfgParser::new();
        cfg.read_str(text, "<test>").expect("parse");
        cfg
    }

    #[test]
    fn index_is_cached_until_reset() {
        let mut cfg = parser("[a: one]\nx = 1\n");
        assert_eq!(cfg.categories(), vec!["a"]);

        cfg.read_str("[b: two]\ny = 2\n", "<more>").unwrap();
        assert_eq!(cfg.categories(), vec!["a"]);
        assert!(!cfg.has_section(SectionKey::categorized("b", "two")));

        cfg.reset_categories();
        assert_eq!(cfg.categories(), vec!["a", "b"]);
        assert_eq!(cfg.get(SectionKey::categorized("B", "Two"), "y").unwrap(), "2");
    }

    #[test]
    fn missing_plain_section_ignores_default() {
        let cfg = parser("[a]\nx = 1\n");
        let err = cfg.get_or("nope", "x", "fallback").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SectionNotFound);
        assert_eq!(err.section(), Some("nope"));
    }

    #[test]
    fn unresolved_category_uses_default() {
        let cfg = parser("[a: one]\nx = 1\n");
        let key = SectionKey::categorized("a", "two");
        assert_eq!(cfg.get_or(key, "x", "fallback").unwrap(), "fallback");
        assert_eq!(cfg.get_eval_or(key, "x", Value::None).unwrap(), Value::None);
        let err = cfg.get(key, "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SectionNotFound);
        assert_eq!(err.message(), Some("no section \"two\" in category \"a\""));
    }

    #[test]
    fn option_names_are_case_insensitive() {
        let cfg = parser("[a]\nMixedCase = v\n");
        assert_eq!(cfg.get("a", "MIXEDCASE").unwrap(), "v");
        assert!(cfg.has_option("a", "mixedcase"));
        assert_eq!(cfg.options("a").unwrap(), vec!["mixedcase"]);
    }

    #[test]
    fn defaults_are_inherited() {
        let mut cfg = CfgParser::with_defaults([("Timeout", "30")]);
        cfg.read_str("[DEFAULT]\nretries = 2\n[svc]\nretries = 5\nname = api\n", "<test>")
            .unwrap();
        assert_eq!(cfg.get_eval("svc", "timeout").unwrap(), Value::Int(30));
        assert_eq!(cfg.get("svc", "retries").unwrap(), "5");
        assert!(cfg.has_option("svc", "timeout"));
        assert_eq!(
            cfg.items("svc").unwrap(),
            vec![("timeout", "30"), ("retries", "5"), ("name", "api")]
        );
        assert_eq!(cfg.options("svc").unwrap(), vec!["retries", "name", "timeout"]);
        assert_eq!(cfg.sections(None).unwrap(), vec!["svc"]);
    }

    #[test]
    fn default_section_name_checks_defaults_table() {
        let cfg = parser("[DEFAULT]\nMode = fast\n[svc]\nname = api\n");
        assert!(cfg.has_option("DEFAULT", "mode"));
        assert!(!cfg.has_option("DEFAULT", "name"));
        assert!(cfg.has_option("svc", "mode"));
        assert!(!cfg.has_section("DEFAULT"));
    }

    #[test]
    fn missing_category_listing_is_section_not_found() {
        let cfg = parser("[a: one]\n");
        let err = cfg.sections(Some("zzz")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SectionNotFound);
    }

    #[test]
    fn parser_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CfgParser>();

        let cfg = parser("[x: a]\nk = 1\n[x: b]\nk = 2\n");
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    assert_eq!(cfg.categories(), vec!["x"]);
                    assert_eq!(cfg.get(SectionKey::categorized("x", "b"), "k").unwrap(), "2");
                });
            }
        });
    }
}
