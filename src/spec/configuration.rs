use super::{ClassPath, ClassSpecification, KeepClassSpecification};
use std::collections::HashSet;

/// Everything a processing run is configured with
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Configuration {
    /// Inputs (`-injars`) and outputs (`-outjars`), in declaration order
    pub program_jars: ClassPath,

    /// Library inputs (`-libraryjars`)
    pub library_jars: ClassPath,

    /// Keep rules (`-keep` and friends, optionally guarded by `-if`)
    pub keep: Vec<KeepClassSpecification>,

    /// Methods without side effects (`-assumenosideeffects`)
    pub assume_no_side_effects: Vec<ClassSpecification>,

    /// Classes and members to explain the kept status of (`-whyareyoukeeping`)
    pub why_are_you_keeping: Vec<ClassSpecification>,
}

impl Configuration {
    pub fn new() -> Configuration {
        Configuration::default()
    }

    /// Drop keep rules that are structurally equal to an earlier one
    ///
    /// Returns the number of rules removed.
    pub fn deduplicate_keep_rules(&mut self) -> usize {
        let before = self.keep.len();
        let mut seen = HashSet::with_capacity(before);
        let first_occurrences: Vec<bool> =
            self.keep.iter().map(|rule| seen.insert(rule)).collect();
        let mut first_occurrences = first_occurrences.into_iter();
        self.keep.retain(|_| first_occurrences.next().unwrap_or(true));
        let removed = before - self.keep.len();
        if removed > 0 {
            log::debug!("Removed {} duplicate keep rules", removed);
        }
        removed
    }
}
