//! Tests for single specification fields
//!
//! Each predicate is built from one field of a specification and checks one class or member.
//! Absent fields build predicates that accept everything.

use super::{Captures, NameMatcher, PatternError, WildcardScope};
use crate::jvm::{BinaryName, ClassData, ClassPool, Name};

/// Required set and unset access flag bits
///
/// Bits required both set and unset count as required set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessPredicate {
    set: u16,
    unset: u16,
}

impl AccessPredicate {
    pub fn new(set: u16, unset: u16) -> AccessPredicate {
        AccessPredicate {
            set,
            unset: unset & !set,
        }
    }

    pub fn test(&self, flags: u16) -> bool {
        flags & self.set == self.set && flags & self.unset == 0
    }
}

/// Some annotation on the candidate has a matching type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotationPredicate {
    annotation_type: Option<NameMatcher>,
}

impl AnnotationPredicate {
    pub fn compile(
        annotation_type: Option<&str>,
        scope: &mut WildcardScope,
    ) -> Result<AnnotationPredicate, PatternError> {
        let annotation_type = annotation_type
            .map(|pattern| NameMatcher::compile(pattern, scope))
            .transpose()?;
        Ok(AnnotationPredicate { annotation_type })
    }

    pub fn is_vacuous(&self) -> bool {
        self.annotation_type.is_none()
    }

    pub fn test(&self, annotations: &[BinaryName], captures: &mut Captures) -> bool {
        match &self.annotation_type {
            None => true,
            Some(matcher) => annotations
                .iter()
                .any(|annotation| matcher.test(annotation.as_str(), captures)),
        }
    }
}

/// Some transitive supertype has a matching name and a matching annotation
///
/// Supertypes missing from the pool never match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupertypePredicate {
    annotation: AnnotationPredicate,
    class_name: Option<NameMatcher>,
}

impl SupertypePredicate {
    /// `annotation` and `class_name` are compiled separately so they can be reported separately
    pub fn new(annotation: AnnotationPredicate, class_name: Option<NameMatcher>) -> Self {
        SupertypePredicate {
            annotation,
            class_name,
        }
    }

    pub fn is_vacuous(&self) -> bool {
        self.annotation.is_vacuous() && self.class_name.is_none()
    }

    pub fn test<'g>(
        &self,
        pool: &ClassPool<'g>,
        class: &ClassData<'g>,
        captures: &mut Captures,
    ) -> bool {
        if self.is_vacuous() {
            return true;
        }
        pool.supertypes(class).into_iter().any(|supertype| {
            let mut trial = captures.clone();
            let matches = self.annotation.test(&supertype.annotations, &mut trial)
                && self
                    .class_name
                    .as_ref()
                    .map_or(true, |matcher| matcher.test(supertype.name.as_str(), &mut trial));
            if matches {
                *captures = trial;
            }
            matches
        })
    }
}

/// The member's code attribute carries every listed attribute
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributePredicate {
    attribute_names: Option<Vec<String>>,
}

impl AttributePredicate {
    pub fn new(attribute_names: Option<&[String]>) -> AttributePredicate {
        AttributePredicate {
            attribute_names: attribute_names.map(<[String]>::to_vec),
        }
    }

    /// `code_attributes` is `None` for members without code (fields, abstract methods)
    pub fn test(&self, code_attributes: Option<&[String]>) -> bool {
        let required = match &self.attribute_names {
            None => return true,
            Some(required) => required,
        };
        let present = code_attributes.unwrap_or_default();
        required.iter().all(|name| present.contains(name))
    }
}
