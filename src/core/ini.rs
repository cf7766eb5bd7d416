// Line-oriented INI tokenizer that fills a `RawStore`.
// Headers are kept verbatim; option names go through the store's transform.
use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::store::RawStore;

pub const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum Target {
    Defaults,
    Section(String),
}

struct Pending {
    target: Target,
    option: String,
    value: String,
}

/// Reads one source into `store`, merging with whatever it already holds.
///
/// Within a single source a section header or an option may appear only once.
/// Across sources, repeated sections merge and later values win.
pub fn read_into(store: &mut RawStore, text: &str, source: &Path) -> Result<(), Error> {
    let mut current: Option<Target> = None;
    let mut pending: Option<Pending> = None;
    let mut seen_sections: HashSet<String> = HashSet::new();
    let mut seen_options: HashSet<(Target, String)> = HashSet::new();
    let parse_error = |line: usize, message: &str| {
        Error::new(ErrorKind::Parse)
            .with_message(message)
            .with_path(source)
            .with_line(line)
    };

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            flush(store, pending.take())?;
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indented = line.starts_with([' ', '\t']);
        if indented {
            if let Some(open) = pending.as_mut() {
                open.value.push('\n');
                open.value.push_str(trimmed);
                continue;
            }
        }

        if let Some(header) = section_header(trimmed) {
            flush(store, pending.take())?;
            if header.is_empty() {
                return Err(parse_error(lineno, "empty section header"));
            }
            if !seen_sections.insert(header.to_string()) {
                return Err(parse_error(lineno, "duplicate section").with_section(header));
            }
            let target = if header == DEFAULT_SECTION {
                Target::Defaults
            } else {
                store.add_section(header);
                Target::Section(header.to_string())
            };
            current = Some(target);
            continue;
        }

        let Some(target) = current.clone() else {
            return Err(parse_error(lineno, "missing section header")
                .with_hint("Start the file with a `[section]` line."));
        };
        let Some(pos) = trimmed.find(['=', ':']) else {
            return Err(parse_error(lineno, "expected `key = value` or `key: value`"));
        };
        let option = trimmed[..pos].trim();
        if option.is_empty() {
            return Err(parse_error(lineno, "empty option name"));
        }
        let value = trimmed[pos + 1..].trim();

        flush(store, pending.take())?;
        let key = store.transform(option);
        if !seen_options.insert((target.clone(), key)) {
            let err = parse_error(lineno, "duplicate option").with_option(option);
            return Err(match &target {
                Target::Section(name) => err.with_section(name.as_str()),
                Target::Defaults => err.with_section(DEFAULT_SECTION),
            });
        }
        pending = Some(Pending {
            target,
            option: option.to_string(),
            value: value.to_string(),
        });
    }
    flush(store, pending.take())?;

    debug!(
        source = %source.display(),
        sections = seen_sections.len(),
        "read config source"
    );
    Ok(())
}

/// Text between the first `[` and the last `]`.
fn section_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let end = rest.rfind(']')?;
    Some(&rest[..end])
}

fn flush(store: &mut RawStore, pending: Option<Pending>) -> Result<(), Error> {
    let Some(Pending {
        target,
        option,
        value,
    }) = pending
    else {
        return Ok(());
    };
    match target {
        Target::Defaults => {
            store.set_default(&option, value);
            Ok(())
        }
        Target::Section(section) => store.set(&section, &option, value),
    }
}

#[cfg(test)]
mod tests {
    use super::read_into;
    use crate::core::error::ErrorKind;
    use crate::core::store::RawStore;
    use std::path::Path;

    fn read(text: &str) -> RawStore {
        let mut store = RawStore::new();
        read_into(&mut store, text, Path::new("<test>")).expect("parse");
        store
    }

    #[test]
    fn sections_options_and_continuations() {
        let store = read(
            "# leading comment\n[listvals]\nval3 = this\n  list\n  uses\n\tnewlines\nVal4: x\n\n[ Command:    bar ]\ndir = baz\n",
        );
        assert_eq!(
            store.section_names().collect::<Vec<_>>(),
            vec!["listvals", " Command:    bar "]
        );
        assert_eq!(store.value("listvals", "val3"), Some("this\nlist\nuses\nnewlines"));
        assert_eq!(store.value("listvals", "val4"), Some("x"));
        assert_eq!(store.value(" Command:    bar ", "dir"), Some("baz"));
    }

    #[test]
    fn first_delimiter_splits_and_values_are_trimmed() {
        let store = read("[s]\ndir:quux\nurl = http://host:80/\nempty =\n");
        assert_eq!(store.value("s", "dir"), Some("quux"));
        assert_eq!(store.value("s", "url"), Some("http://host:80/"));
        assert_eq!(store.value("s", "empty"), Some(""));
    }

    #[test]
    fn default_section_feeds_defaults() {
        let store = read("[DEFAULT]\nmode = fast\n[a]\nx = 1\n");
        assert_eq!(store.section_names().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(store.value("a", "mode"), Some("fast"));
    }

    #[test]
    fn comment_lines_inside_values_are_skipped() {
        let store = read("[s]\nitems = a,\n; note\n  b\n");
        assert_eq!(store.value("s", "items"), Some("a,\nb"));
    }

    #[test]
    fn blank_line_ends_value() {
        let store = read("[s]\na = 1\n\n  b = 2\n");
        assert_eq!(store.value("s", "a"), Some("1"));
        assert_eq!(store.value("s", "b"), Some("2"));
    }

    #[test]
    fn errors_carry_line_numbers() {
        let cases = [
            ("key = value\n", 1, "missing section header"),
            ("[s]\njust words\n", 2, "expected `key = value` or `key: value`"),
            ("[s]\n[s]\n", 2, "duplicate section"),
            ("[s]\na = 1\nA = 2\n", 3, "duplicate option"),
            ("[]\n", 1, "empty section header"),
            ("[s]\n= 1\n", 2, "empty option name"),
        ];
        for (text, line, message) in cases {
            let mut store = RawStore::new();
            let err = read_into(&mut store, text, Path::new("bad.ini")).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Parse, "{text:?}");
            assert_eq!(err.line(), Some(line), "{text:?}");
            assert_eq!(err.message(), Some(message), "{text:?}");
            assert_eq!(err.path(), Some(Path::new("bad.ini")));
        }
    }

    #[test]
    fn later_sources_merge() {
        let mut store = RawStore::new();
        read_into(&mut store, "[s]\na = 1\nb = 2\n", Path::new("one")).unwrap();
        read_into(&mut store, "[s]\na = 3\n[t]\nc = 4\n", Path::new("two")).unwrap();
        assert_eq!(store.value("s", "a"), Some("3"));
        assert_eq!(store.value("s", "b"), Some("2"));
        assert_eq!(store.section_names().collect::<Vec<_>>(), vec!["s", "t"]);
    }
}
