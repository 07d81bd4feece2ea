//! Declarative descriptions of the classes and members a rule applies to
//!
//! All names and patterns are stored in internal form: class names use `/` as the package
//! separator (`com/example/**`) and member descriptors are JVM descriptors, possibly with
//! wildcards inside their class tokens (`(Lcom/example/*;)V`). Specifications are plain data
//! with structural equality; compiling them into something that can be run against a class
//! pool is the job of [`crate::matching`].

mod class_path;
mod configuration;

pub use class_path::*;
pub use configuration::*;

use crate::jvm::{ClassAccessFlags, MemberAccessFlags};

/// Which classes (and which of their members) a rule applies to
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ClassSpecification {
    /// Free text attached to the rule (no semantic effect)
    pub comments: Option<String>,

    /// Flags a class must have
    pub required_set_access_flags: ClassAccessFlags,

    /// Flags a class must not have
    pub required_unset_access_flags: ClassAccessFlags,

    /// Pattern for the type of an annotation the class must carry
    pub annotation_type: Option<String>,

    /// Pattern for the class name (`None` matches any class)
    pub class_name: Option<String>,

    /// Pattern for the type of an annotation a supertype must carry
    pub extends_annotation_type: Option<String>,

    /// Pattern for the name of a supertype (superclass or interface, transitively)
    pub extends_class_name: Option<String>,

    pub field_specifications: Vec<MemberSpecification>,

    pub method_specifications: Vec<MemberSpecification>,
}

impl ClassSpecification {
    /// Specification matching classes with exactly this (internal) name
    pub fn named(class_name: impl Into<String>) -> ClassSpecification {
        ClassSpecification {
            class_name: Some(class_name.into()),
            ..ClassSpecification::default()
        }
    }

    pub fn with_field(mut self, field: MemberSpecification) -> Self {
        self.field_specifications.push(field);
        self
    }

    pub fn with_method(mut self, method: MemberSpecification) -> Self {
        self.method_specifications.push(method);
        self
    }

    pub fn extending(mut self, extends_class_name: impl Into<String>) -> Self {
        self.extends_class_name = Some(extends_class_name.into());
        self
    }

    /// Human readable identification of the rule, for diagnostics
    pub fn describe(&self) -> String {
        match (&self.comments, &self.class_name) {
            (_, Some(class_name)) => format!("class specification '{}'", class_name),
            (Some(comments), None) => format!("class specification ({})", comments.trim()),
            (None, None) => String::from("class specification for any class"),
        }
    }
}

/// Which fields or methods of a class a rule applies to
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MemberSpecification {
    pub required_set_access_flags: MemberAccessFlags,
    pub required_unset_access_flags: MemberAccessFlags,

    /// Pattern for the type of an annotation the member must carry
    pub annotation_type: Option<String>,

    /// Pattern for the member name (`None` matches any name)
    pub name: Option<String>,

    /// Pattern for the member descriptor (`None` matches any descriptor)
    pub descriptor: Option<String>,

    /// Attributes the member's code must carry (`None` is no constraint)
    pub attribute_names: Option<Vec<String>>,
}

impl MemberSpecification {
    /// Member with this name pattern and descriptor pattern
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> MemberSpecification {
        MemberSpecification {
            name: Some(name.into()),
            descriptor: Some(descriptor.into()),
            ..MemberSpecification::default()
        }
    }

    /// Member with any name and any descriptor
    pub fn any() -> MemberSpecification {
        MemberSpecification::default()
    }
}

/// What a keep rule protects its matches from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeepPolicy {
    /// Keep the matching classes themselves
    pub mark_classes: bool,

    /// Only keep classes that have every specified member
    pub mark_conditionally: bool,

    /// Keep the matching members
    pub mark_class_members: bool,

    /// Also keep the classes mentioned in descriptors of kept members
    pub mark_descriptor_classes: bool,

    /// Also keep the code attributes of kept methods
    pub mark_code_attributes: bool,

    pub allow_shrinking: bool,
    pub allow_optimization: bool,
    pub allow_obfuscation: bool,
}

impl KeepPolicy {
    /// `-keep`
    pub const KEEP: KeepPolicy = KeepPolicy {
        mark_classes: true,
        mark_conditionally: false,
        mark_class_members: true,
        mark_descriptor_classes: false,
        mark_code_attributes: false,
        allow_shrinking: false,
        allow_optimization: false,
        allow_obfuscation: false,
    };

    /// `-keepclassmembers`
    pub const KEEP_CLASS_MEMBERS: KeepPolicy = KeepPolicy {
        mark_classes: false,
        ..KeepPolicy::KEEP
    };

    /// `-keepclasseswithmembers`
    pub const KEEP_CLASSES_WITH_MEMBERS: KeepPolicy = KeepPolicy {
        mark_conditionally: true,
        ..KeepPolicy::KEEP
    };
}

/// A class specification along with what it keeps and when
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeepClassSpecification {
    pub class_specification: ClassSpecification,

    pub policy: KeepPolicy,

    /// Rule only applies when some class in the pool matches this
    ///
    /// The condition shares its wildcard captures with the class specification, so the
    /// class specification can refer back to what the condition matched.
    pub condition: Option<ClassSpecification>,
}

impl KeepClassSpecification {
    pub fn new(class_specification: ClassSpecification, policy: KeepPolicy) -> Self {
        KeepClassSpecification {
            class_specification,
            policy,
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: ClassSpecification) -> Self {
        self.condition = Some(condition);
        self
    }
}
