// Raw section/option storage filled by the tokenizer and read by the parser.
use indexmap::IndexMap;

use crate::core::error::Error;

/// Normalizes option names. The tokenizer and every lookup must agree on it.
pub type OptionTransform = fn(&str) -> String;

pub fn lowercase(name: &str) -> String {
    name.to_lowercase()
}

pub type Options = IndexMap<String, String>;

/// Ordered mapping of section name to ordered options, plus the `DEFAULT`
/// table every section falls back to.
///
/// Section names are stored exactly as written. Option names are stored after
/// the option transform.
#[derive(Clone, Debug)]
pub struct RawStore {
    sections: IndexMap<String, Options>,
    defaults: Options,
    transform: OptionTransform,
}

impl RawStore {
    pub fn new() -> Self {
        Self::with_option_transform(lowercase)
    }

    pub fn with_option_transform(transform: OptionTransform) -> Self {
        Self {
            sections: IndexMap::new(),
            defaults: Options::new(),
            transform,
        }
    }

    pub fn option_transform(&self) -> OptionTransform {
        self.transform
    }

    pub fn transform(&self, name: &str) -> String {
        (self.transform)(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    pub fn section(&self, section: &str) -> Option<&Options> {
        self.sections.get(section)
    }

    pub fn defaults(&self) -> &Options {
        &self.defaults
    }

    /// Returns `true` when the section did not exist yet.
    pub fn add_section(&mut self, section: impl Into<String>) -> bool {
        let section = section.into();
        if self.sections.contains_key(&section) {
            return false;
        }
        self.sections.insert(section, Options::new());
        true
    }

    pub fn set(
        &mut self,
        section: &str,
        option: &str,
        value: impl Into<String>,
    ) -> Result<(), Error> {
        let key = self.transform(option);
        let options = self
            .sections
            .get_mut(section)
            .ok_or_else(|| Error::section_not_found(section))?;
        options.insert(key, value.into());
        Ok(())
    }

    pub fn set_default(&mut self, option: &str, value: impl Into<String>) {
        let key = self.transform(option);
        self.defaults.insert(key, value.into());
    }

    /// Looks up an already-transformed option key, falling back to defaults.
    /// `None` when the section itself is missing or the key is in neither.
    pub(crate) fn value(&self, section: &str, key: &str) -> Option<&str> {
        let options = self.sections.get(section)?;
        options
            .get(key)
            .or_else(|| self.defaults.get(key))
            .map(String::as_str)
    }

    /// Section option names followed by default names the section does not override.
    pub(crate) fn option_names(&self, section: &str) -> Option<Vec<&str>> {
        let options = self.sections.get(section)?;
        let inherited = self
            .defaults
            .keys()
            .filter(|key| !options.contains_key(key.as_str()));
        Some(options.keys().chain(inherited).map(String::as_str).collect())
    }

    /// Defaults in their own order with section overrides applied in place,
    /// then the section's remaining options.
    pub(crate) fn items(&self, section: &str) -> Option<Vec<(&str, &str)>> {
        let options = self.sections.get(section)?;
        let inherited = self.defaults.iter().map(|(key, value)| {
            let value = options.get(key).unwrap_or(value);
            (key.as_str(), value.as_str())
        });
        let own = options
            .iter()
            .filter(|(key, _)| !self.defaults.contains_key(key.as_str()))
            .map(|(key, value)| (key.as_str(), value.as_str()));
        Some(inherited.chain(own).collect())
    }
}

impl Default for RawStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::RawStore;
    use crate::core::error::ErrorKind;

    #[test]
    fn options_are_transformed_and_defaults_fill_gaps() {
        let mut store = RawStore::new();
        store.set_default("Shared", "d");
        store.set_default("dir", "default-dir");
        assert!(store.add_section("Paths"));
        assert!(!store.add_section("Paths"));
        store.set("Paths", "DIR", "/tmp").unwrap();

        assert_eq!(store.value("Paths", "dir"), Some("/tmp"));
        assert_eq!(store.value("Paths", "shared"), Some("d"));
        assert_eq!(store.value("paths", "dir"), None);
        assert_eq!(store.option_names("Paths").unwrap(), vec!["dir", "shared"]);
        assert_eq!(
            store.items("Paths").unwrap(),
            vec![("shared", "d"), ("dir", "/tmp")]
        );
    }

    #[test]
    fn items_list_defaults_first_with_overrides_in_place() {
        let mut store = RawStore::new();
        store.set_default("b", "2");
        store.set_default("c", "3");
        store.add_section("s");
        store.set("s", "a", "1").unwrap();
        store.set("s", "c", "30").unwrap();

        assert_eq!(
            store.items("s").unwrap(),
            vec![("b", "2"), ("c", "30"), ("a", "1")]
        );
        assert_eq!(store.option_names("s").unwrap(), vec!["a", "c", "b"]);
        assert_eq!(store.items("missing"), None);
    }

    #[test]
    fn set_requires_existing_section() {
        let mut store = RawStore::new();
        let err = store.set("missing", "a", "b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SectionNotFound);
        assert_eq!(err.section(), Some("missing"));
    }

    #[test]
    fn custom_transform_keeps_case() {
        fn identity(name: &str) -> String {
            name.to_string()
        }
        let mut store = RawStore::with_option_transform(identity);
        store.add_section("s");
        store.set("s", "Key", "v").unwrap();
        assert_eq!(store.value("s", "Key"), Some("v"));
        assert_eq!(store.value("s", "key"), None);
    }
}
