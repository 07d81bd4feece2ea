//! Compiling everything in a configuration once, to find malformed patterns up front

use crate::matching::{
    compile, compile_keep, Callbacks, ClassPathFilter, CompileError, PatternError, WildcardScope,
};
use crate::spec::Configuration;
use std::fmt;
use std::path::PathBuf;

/// Pattern in a configuration that doesn't compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// Keep rule or other class specification
    Rule(CompileError),

    /// Filter of a class path entry
    Filter { file: PathBuf, error: PatternError },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Rule(error) => write!(f, "{}", error),
            Problem::Filter { file, error } => {
                write!(f, "invalid filter for '{}': {}", file.display(), error)
            }
        }
    }
}

/// Compile every rule and every class path filter, collecting what fails
///
/// Each rule and each entry is compiled on its own, so one bad pattern doesn't hide the others.
pub fn check_configuration(configuration: &Configuration) -> Vec<Problem> {
    let mut problems = vec![];

    for keep in &configuration.keep {
        if let Err(error) = compile_keep(keep, Callbacks::new()) {
            problems.push(Problem::Rule(error));
        }
    }
    let other_rules = [
        &configuration.assume_no_side_effects,
        &configuration.why_are_you_keeping,
    ];
    for specifications in other_rules {
        let (_, errors) = compile(specifications, Callbacks::new(), &WildcardScope::new());
        problems.extend(errors.into_iter().map(Problem::Rule));
    }

    let entries = configuration
        .program_jars
        .entries
        .iter()
        .chain(&configuration.library_jars.entries);
    for entry in entries {
        if let Err(error) = ClassPathFilter::compile(entry) {
            problems.push(Problem::Filter {
                file: entry.file().to_path_buf(),
                error,
            });
        }
    }

    log::debug!("Found {} problems", problems.len());
    problems
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::parse_configuration;

    #[test]
    fn every_bad_pattern_is_reported() {
        let configuration = parse_configuration(
            "-injars in.jar(com/**)\n\
             -injars bad.jar(;;;;;;;;com/<1>/**)\n\
             -libraryjars lib.jar(<0>)\n\
             -keep class com.example.Good\n\
             -keep class com.<1>.Bad\n\
             -whyareyoukeeping class com.example.Fine\n\
             -whyareyoukeeping class com.<2>.Bad",
        )
        .unwrap();

        let problems = check_configuration(&configuration);
        let files: Vec<String> = problems
            .iter()
            .filter_map(|problem| match problem {
                Problem::Filter { file, .. } => Some(file.display().to_string()),
                Problem::Rule(_) => None,
            })
            .collect();
        assert_eq!(files, vec!["bad.jar", "lib.jar"]);

        let rules: Vec<&str> = problems
            .iter()
            .filter_map(|problem| match problem {
                Problem::Rule(error) => Some(error.error.pattern()),
                Problem::Filter { .. } => None,
            })
            .collect();
        assert_eq!(rules, vec!["com/<1>/Bad", "com/<2>/Bad"]);
    }

    #[test]
    fn clean_configuration() {
        let configuration =
            parse_configuration("-injars in.jar(!**.txt)\n-keep class com.example.** { *; }")
                .unwrap();
        assert!(check_configuration(&configuration).is_empty());
    }
}
