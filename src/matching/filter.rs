use super::{NameMatcher, PatternError, WildcardScope};
use crate::spec::{ArchiveType, ClassPathEntry};
use std::path::Path;

/// Compiled path filter list, such as `["!**.txt", "com/**"]`
///
/// The first element matching a path decides: plain elements accept it and `!` elements reject
/// it. A path no element matches is accepted only if the last element is an exclusion, so
/// `["!**.txt"]` means "everything except text files". An empty list accepts everything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterMatcher {
    entries: Vec<(bool, NameMatcher)>,
}

impl FilterMatcher {
    pub fn compile(filter: &[String]) -> Result<FilterMatcher, PatternError> {
        let mut entries = Vec::with_capacity(filter.len());
        for element in filter {
            let (negated, pattern) = match element.strip_prefix('!') {
                Some(pattern) => (true, pattern),
                None => (false, element.as_str()),
            };
            let matcher = NameMatcher::compile(pattern, &mut WildcardScope::new())?;
            entries.push((negated, matcher));
        }
        Ok(FilterMatcher { entries })
    }

    pub fn accepts(&self, path: &str) -> bool {
        for (negated, matcher) in &self.entries {
            if matcher.matches(path) {
                return !negated;
            }
        }
        match self.entries.last() {
            None => true,
            Some((negated, _)) => *negated,
        }
    }
}

/// All filters of one class path entry, compiled
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassPathFilter {
    filter: Option<FilterMatcher>,
    archive_filters: Vec<(ArchiveType, FilterMatcher)>,
}

impl ClassPathFilter {
    pub fn compile(entry: &ClassPathEntry) -> Result<ClassPathFilter, PatternError> {
        let filter = entry.filter().map(FilterMatcher::compile).transpose()?;
        let mut archive_filters = vec![];
        for archive_type in ArchiveType::ALL {
            if let Some(archive_filter) = entry.archive_filter(archive_type) {
                archive_filters.push((archive_type, FilterMatcher::compile(archive_filter)?));
            }
        }
        Ok(ClassPathFilter {
            filter,
            archive_filters,
        })
    }

    /// Should a file (possibly a nested archive) at this path inside the entry be read?
    ///
    /// Archives are checked against the filter for their type, everything else against the
    /// general filter.
    pub fn accepts(&self, path: &str) -> bool {
        match ArchiveType::of_path(Path::new(path)) {
            Some(archive_type) => self
                .archive_filters
                .iter()
                .find(|(filtered_type, _)| *filtered_type == archive_type)
                .map_or(true, |(_, matcher)| matcher.accepts(path)),
            None => self
                .filter
                .as_ref()
                .map_or(true, |matcher| matcher.accepts(path)),
        }
    }
}
