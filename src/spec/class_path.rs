use std::path::{Path, PathBuf};

/// Kinds of archives a class path entry can restrict with its own filter
///
/// The order is the positional order of the filter slots in rule text, where the general
/// filter comes last: `path(aab;apk;jmod;aar;zip;ear;war;jar;filter)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArchiveType {
    Aab,
    Apk,
    Jmod,
    Aar,
    Zip,
    Ear,
    War,
    Jar,
}

impl ArchiveType {
    pub const ALL: [ArchiveType; 8] = [
        ArchiveType::Aab,
        ArchiveType::Apk,
        ArchiveType::Jmod,
        ArchiveType::Aar,
        ArchiveType::Zip,
        ArchiveType::Ear,
        ArchiveType::War,
        ArchiveType::Jar,
    ];

    /// File extension (without the dot)
    pub const fn extension(&self) -> &'static str {
        match self {
            ArchiveType::Aab => "aab",
            ArchiveType::Apk => "apk",
            ArchiveType::Jmod => "jmod",
            ArchiveType::Aar => "aar",
            ArchiveType::Zip => "zip",
            ArchiveType::Ear => "ear",
            ArchiveType::War => "war",
            ArchiveType::Jar => "jar",
        }
    }

    /// Archive type of a path, judging from its extension
    pub fn of_path(path: &Path) -> Option<ArchiveType> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        ArchiveType::ALL
            .into_iter()
            .find(|archive_type| archive_type.extension() == extension)
    }

    const fn slot(&self) -> usize {
        match self {
            ArchiveType::Aab => 0,
            ArchiveType::Apk => 1,
            ArchiveType::Jmod => 2,
            ArchiveType::Aar => 3,
            ArchiveType::Zip => 4,
            ArchiveType::Ear => 5,
            ArchiveType::War => 6,
            ArchiveType::Jar => 7,
        }
    }
}

/// Number of filter slots on an entry: one per archive type, plus the general filter
pub const FILTER_SLOTS: usize = ArchiveType::ALL.len() + 1;

/// One input or output location on a class path, with optional filters
///
/// Every filter is a list of path patterns (see [`crate::matching::FilterMatcher`]). An absent
/// filter and an empty filter mean the same thing ("no filter"), so setting an empty list stores
/// nothing.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassPathEntry {
    file: PathBuf,
    output: bool,
    feature_name: Option<String>,
    filter: Option<Vec<String>>,
    archive_filters: [Option<Vec<String>>; 8],
}

impl ClassPathEntry {
    pub fn new(file: impl Into<PathBuf>, output: bool) -> ClassPathEntry {
        ClassPathEntry {
            file: file.into(),
            output,
            feature_name: None,
            filter: None,
            archive_filters: Default::default(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn is_output(&self) -> bool {
        self.output
    }

    pub fn feature_name(&self) -> Option<&str> {
        self.feature_name.as_deref()
    }

    pub fn set_feature_name(&mut self, feature_name: Option<String>) {
        self.feature_name = feature_name;
    }

    /// General filter, applied to every file name inside the entry
    pub fn filter(&self) -> Option<&[String]> {
        self.filter.as_deref()
    }

    pub fn set_filter(&mut self, filter: Option<Vec<String>>) {
        self.filter = normalize(filter);
    }

    /// Filter applied to nested archives of the given type
    pub fn archive_filter(&self, archive_type: ArchiveType) -> Option<&[String]> {
        self.archive_filters[archive_type.slot()].as_deref()
    }

    pub fn set_archive_filter(&mut self, archive_type: ArchiveType, filter: Option<Vec<String>>) {
        self.archive_filters[archive_type.slot()] = normalize(filter);
    }

    pub fn jar_filter(&self) -> Option<&[String]> {
        self.archive_filter(ArchiveType::Jar)
    }

    pub fn set_jar_filter(&mut self, filter: Option<Vec<String>>) {
        self.set_archive_filter(ArchiveType::Jar, filter)
    }

    /// Does any filter restrict this entry?
    pub fn is_filtered(&self) -> bool {
        self.filter.is_some() || self.archive_filters.iter().any(Option::is_some)
    }

    /// All nine filter slots, in rule text order (general filter last)
    pub fn filter_slots(&self) -> [Option<&[String]>; FILTER_SLOTS] {
        let mut slots: [Option<&[String]>; FILTER_SLOTS] = [None; FILTER_SLOTS];
        for archive_type in ArchiveType::ALL {
            slots[archive_type.slot()] = self.archive_filter(archive_type);
        }
        slots[FILTER_SLOTS - 1] = self.filter();
        slots
    }
}

fn normalize(filter: Option<Vec<String>>) -> Option<Vec<String>> {
    filter.filter(|filter| !filter.is_empty())
}

/// Ordered list of class path entries
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ClassPath {
    pub entries: Vec<ClassPathEntry>,
}

impl ClassPath {
    pub fn new() -> ClassPath {
        ClassPath::default()
    }

    pub fn add(&mut self, entry: ClassPathEntry) {
        self.entries.push(entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Does the class path contain outputs?
    pub fn has_output(&self) -> bool {
        self.entries.iter().any(ClassPathEntry::is_output)
    }
}
