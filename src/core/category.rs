// Index of sections named `category: name`, grouped by category.
use indexmap::IndexMap;

use crate::core::store::OptionTransform;

/// Built from a snapshot of section names. It never tracks later changes to
/// the section set; owners rebuild it explicitly.
#[derive(Clone, Debug)]
pub struct CategoryIndex {
    categories: IndexMap<String, IndexMap<String, String>>,
    transform: OptionTransform,
}

impl CategoryIndex {
    /// Indexes every name that has exactly one `:` after normalization.
    /// Names with no colon or several colons are not categorized.
    pub fn build<'a, I>(sections: I, transform: OptionTransform) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut categories: IndexMap<String, IndexMap<String, String>> = IndexMap::new();
        for full_name in sections {
            let normalized = normalize(transform, full_name);
            if normalized.matches(':').count() != 1 {
                continue;
            }
            let Some((category, name)) = normalized.split_once(':') else {
                continue;
            };
            categories
                .entry(category.trim().to_string())
                .or_default()
                .insert(name.trim().to_string(), full_name.to_string());
        }
        Self {
            categories,
            transform,
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Bare names in first-seen order, or `None` for an unknown category.
    pub fn sections<'s>(
        &'s self,
        category: &str,
    ) -> Option<impl Iterator<Item = &'s str> + use<'s>> {
        let names = self.categories.get(&normalize(self.transform, category))?;
        Some(names.keys().map(String::as_str))
    }

    /// Full section name for `category`/`section`, matching both arguments
    /// case- and whitespace-insensitively.
    pub fn resolve(&self, category: &str, section: &str) -> Option<&str> {
        self.categories
            .get(&normalize(self.transform, category))?
            .get(&normalize(self.transform, section))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn section_count(&self) -> usize {
        self.categories.values().map(IndexMap::len).sum()
    }
}

fn normalize(transform: OptionTransform, name: &str) -> String {
    transform(name).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::CategoryIndex;
    use crate::core::store::lowercase;

    const SECTIONS: [&str; 8] = [
        "evalvals",
        "listvals",
        "command: foo",
        " Command:    bar ",
        "CoMmaNd:baz",
        "results: hello",
        "a:b:c",
        "command: foo",
    ];

    #[test]
    fn groups_by_category_in_source_order() {
        let index = CategoryIndex::build(SECTIONS, lowercase);
        assert_eq!(index.categories().collect::<Vec<_>>(), vec!["command", "results"]);
        assert_eq!(
            index.sections("command").unwrap().collect::<Vec<_>>(),
            vec!["foo", "bar", "baz"]
        );
        assert_eq!(index.section_count(), 4);
        assert!(index.sections("missing").is_none());
    }

    #[test]
    fn resolve_ignores_case_and_whitespace() {
        let index = CategoryIndex::build(SECTIONS, lowercase);
        assert_eq!(index.resolve("Command", " bar "), Some(" Command:    bar "));
        assert_eq!(index.resolve("command", "bar"), index.resolve("Command", " bar "));
        assert_eq!(index.resolve(" RESULTS ", "Hello"), Some("results: hello"));
        assert_eq!(index.resolve("results", "bye"), None);
        assert_eq!(index.resolve("nonexistent", "hello"), None);
    }

    #[test]
    fn multiple_colons_are_not_categorized() {
        let index = CategoryIndex::build(SECTIONS, lowercase);
        assert!(index.categories().all(|c| c != "a"));
        assert_eq!(index.resolve("a", "b:c"), None);
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let first = CategoryIndex::build(SECTIONS, lowercase);
        let second = CategoryIndex::build(SECTIONS, lowercase);
        assert_eq!(
            first.categories().collect::<Vec<_>>(),
            second.categories().collect::<Vec<_>>()
        );
        for category in first.categories() {
            assert_eq!(
                first.sections(category).unwrap().collect::<Vec<_>>(),
                second.sections(category).unwrap().collect::<Vec<_>>()
            );
        }
        assert!(CategoryIndex::build(std::iter::empty(), lowercase).is_empty());
    }
}
