use std::borrow::{Borrow, Cow};
use std::fmt;

/// Simple name of a field or method, such as `count` or `<init>`
///
/// See <https://docs.oracle.com/javase/specs/jvms/se16/html/jvms-4.html#jvms-4.2.2>
#[derive(Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct UnqualifiedName(Cow<'static, str>);

/// Class name in internal form, such as `java/lang/Object`
///
/// Each `/`-separated segment must itself be a valid unqualified name. Nothing else is checked,
/// so names from obfuscated or synthetic classes (`Feature Name`, `a$b`) are accepted.
///
/// See <https://docs.oracle.com/javase/specs/jvms/se16/html/jvms-4.html#jvms-4.2.1>
#[derive(Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct BinaryName(Cow<'static, str>);

pub trait Name: Sized {
    fn as_str(&self) -> &str;

    /// Validate and wrap a name, or explain what is wrong with it
    fn from_string(name: String) -> Result<Self, String>;
}

/// Problem with one segment of a name, if any
fn segment_problem(segment: &str) -> Option<&'static str> {
    if segment.is_empty() {
        Some("has an empty segment")
    } else if segment.contains(&['.', ';', '[', '/'][..]) {
        Some("contains one of '.', ';', '[' or '/'")
    } else {
        None
    }
}

impl Name for UnqualifiedName {
    fn as_str(&self) -> &str {
        &self.0
    }

    fn from_string(name: String) -> Result<Self, String> {
        match segment_problem(&name) {
            None => Ok(UnqualifiedName(Cow::Owned(name))),
            Some(problem) => Err(format!("Member name '{}' {}", name, problem)),
        }
    }
}

impl Name for BinaryName {
    fn as_str(&self) -> &str {
        &self.0
    }

    fn from_string(name: String) -> Result<Self, String> {
        match name.split('/').find_map(segment_problem) {
            None => Ok(BinaryName(Cow::Owned(name))),
            Some(problem) => Err(format!("Class name '{}' {}", name, problem)),
        }
    }
}

impl AsRef<str> for UnqualifiedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BinaryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lets member indices keyed by name be queried with a plain `&str`
impl Borrow<str> for UnqualifiedName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UnqualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for UnqualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Internal form, as in descriptors
impl fmt::Debug for BinaryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// External (dotted) form, as in rule text
impl fmt::Display for BinaryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&external_class_name(&self.0))
    }
}

impl UnqualifiedName {
    pub const INIT: Self = UnqualifiedName(Cow::Borrowed("<init>"));
}

impl BinaryName {
    pub const OBJECT: Self = BinaryName(Cow::Borrowed("java/lang/Object"));
    pub const STRING: Self = BinaryName(Cow::Borrowed("java/lang/String"));

    /// Name without its package
    pub fn simple_name(&self) -> &str {
        let name: &str = &self.0;
        name.rsplit_once('/').map_or(name, |(_, simple)| simple)
    }
}

/// Convert a dotted class name (or class name pattern) into internal form
///
/// `com.example.Foo` becomes `com/example/Foo`. Wildcards and back-references pass through.
pub fn internal_class_name(external: &str) -> String {
    external.replace('.', "/")
}

/// Convert an internal class name (or class name pattern) into dotted form
pub fn external_class_name(internal: &str) -> String {
    internal.replace('/', ".")
}
