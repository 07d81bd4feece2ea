use std::fmt;

/// A pattern that can't be compiled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// `<` followed by digits, but no closing `>`
    UnterminatedBackReference { pattern: String, offset: usize },

    /// `<0>` (back-references count from 1)
    InvalidBackReference { pattern: String, index: usize },

    /// Back-reference to a wildcard that doesn't appear earlier in the rule
    UnresolvableBackReference {
        pattern: String,
        index: usize,
        available: usize,
    },

    /// Descriptor pattern doesn't follow the field type or method descriptor grammar
    MalformedDescriptor { pattern: String, message: String },
}

impl PatternError {
    /// The pattern that failed to compile
    pub fn pattern(&self) -> &str {
        match self {
            PatternError::UnterminatedBackReference { pattern, .. }
            | PatternError::InvalidBackReference { pattern, .. }
            | PatternError::UnresolvableBackReference { pattern, .. }
            | PatternError::MalformedDescriptor { pattern, .. } => pattern,
        }
    }
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::UnterminatedBackReference { pattern, offset } => write!(
                f,
                "unterminated back-reference at offset {} in '{}'",
                offset, pattern
            ),
            PatternError::InvalidBackReference { pattern, index } => {
                write!(f, "invalid back-reference <{}> in '{}'", index, pattern)
            }
            PatternError::UnresolvableBackReference {
                pattern,
                index,
                available,
            } => write!(
                f,
                "back-reference <{}> in '{}' refers past the {} wildcard(s) before it",
                index, pattern, available
            ),
            PatternError::MalformedDescriptor { pattern, message } => {
                write!(f, "malformed descriptor '{}': {}", pattern, message)
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// Field of a specification that a pattern came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecificationField {
    AnnotationType,
    ClassName,
    ExtendsAnnotationType,
    ExtendsClassName,
    FieldAnnotationType,
    FieldName,
    FieldDescriptor,
    MethodAnnotationType,
    MethodName,
    MethodDescriptor,
}

impl fmt::Display for SpecificationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpecificationField::AnnotationType => "annotation type",
            SpecificationField::ClassName => "class name",
            SpecificationField::ExtendsAnnotationType => "extends annotation type",
            SpecificationField::ExtendsClassName => "extends class name",
            SpecificationField::FieldAnnotationType => "field annotation type",
            SpecificationField::FieldName => "field name",
            SpecificationField::FieldDescriptor => "field type",
            SpecificationField::MethodAnnotationType => "method annotation type",
            SpecificationField::MethodName => "method name",
            SpecificationField::MethodDescriptor => "method descriptor",
        };
        f.write_str(name)
    }
}

/// A specification that can't be compiled, with enough context to report it to a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Which specification (see [`crate::spec::ClassSpecification::describe`])
    pub specification: String,

    /// Which field of the specification
    pub field: SpecificationField,

    pub error: PatternError,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {} in {}: {}",
            self.field, self.specification, self.error
        )
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
