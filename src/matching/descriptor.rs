use super::{Captures, NameMatcher, PatternError, WildcardScope};
use crate::jvm::{
    ArrayType, BinaryName, FieldType, MethodDescriptor, Name, ParseDescriptor, RefType,
};

/// Compiled descriptor pattern
///
/// The pattern is read with the usual descriptor grammar, keeping the contents of each `L...;`
/// class token as a [`NameMatcher`]. Wildcards anywhere else are rejected at compile time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DescriptorMatcher {
    Field(FieldType<NameMatcher>),
    Method(MethodDescriptor<NameMatcher>),
}

impl DescriptorMatcher {
    /// Compile a field type pattern such as `Lcom/example/*;` or `[I`
    pub fn compile_field(
        pattern: &str,
        scope: &mut WildcardScope,
    ) -> Result<DescriptorMatcher, PatternError> {
        let parsed = FieldType::<String>::parse(pattern).map_err(|err| malformed(pattern, err))?;
        let field_type = compile_field_type(pattern, &parsed, scope)?;
        Ok(DescriptorMatcher::Field(field_type))
    }

    /// Compile a method descriptor pattern such as `(Lcom/**;I)V`
    pub fn compile_method(
        pattern: &str,
        scope: &mut WildcardScope,
    ) -> Result<DescriptorMatcher, PatternError> {
        let parsed =
            MethodDescriptor::<String>::parse(pattern).map_err(|err| malformed(pattern, err))?;
        let mut parameters = Vec::with_capacity(parsed.parameters.len());
        for parameter in &parsed.parameters {
            parameters.push(compile_field_type(pattern, parameter, scope)?);
        }
        let return_type = match &parsed.return_type {
            None => None,
            Some(return_type) => Some(compile_field_type(pattern, return_type, scope)?),
        };
        Ok(DescriptorMatcher::Method(MethodDescriptor {
            parameters,
            return_type,
        }))
    }

    /// Test a field type, committing captures only on success
    pub fn test_field(&self, candidate: &FieldType<BinaryName>, captures: &mut Captures) -> bool {
        let pattern = match self {
            DescriptorMatcher::Field(pattern) => pattern,
            DescriptorMatcher::Method(_) => return false,
        };
        let mut trial = captures.clone();
        if match_field_type(pattern, candidate, &mut trial) {
            *captures = trial;
            true
        } else {
            false
        }
    }

    /// Test a method descriptor, committing captures only on success
    pub fn test_method(
        &self,
        candidate: &MethodDescriptor<BinaryName>,
        captures: &mut Captures,
    ) -> bool {
        let pattern = match self {
            DescriptorMatcher::Method(pattern) => pattern,
            DescriptorMatcher::Field(_) => return false,
        };
        if pattern.parameters.len() != candidate.parameters.len() {
            return false;
        }

        let mut trial = captures.clone();
        let parameters_match = pattern
            .parameters
            .iter()
            .zip(&candidate.parameters)
            .all(|(pattern, candidate)| match_field_type(pattern, candidate, &mut trial));
        let return_matches = match (&pattern.return_type, &candidate.return_type) {
            (None, None) => true,
            (Some(pattern), Some(candidate)) => match_field_type(pattern, candidate, &mut trial),
            _ => false,
        };
        if parameters_match && return_matches {
            *captures = trial;
            true
        } else {
            false
        }
    }
}

fn malformed(pattern: &str, err: std::io::Error) -> PatternError {
    PatternError::MalformedDescriptor {
        pattern: pattern.to_string(),
        message: err.to_string(),
    }
}

fn compile_class_token(
    pattern: &str,
    token: &str,
    scope: &mut WildcardScope,
) -> Result<NameMatcher, PatternError> {
    if token.is_empty() {
        return Err(PatternError::MalformedDescriptor {
            pattern: pattern.to_string(),
            message: String::from("Empty class name in 'L;'"),
        });
    }
    NameMatcher::compile(token, scope)
}

fn compile_field_type(
    pattern: &str,
    field_type: &FieldType<String>,
    scope: &mut WildcardScope,
) -> Result<FieldType<NameMatcher>, PatternError> {
    Ok(match field_type {
        FieldType::Base(base) => FieldType::Base(*base),
        FieldType::Ref(RefType::PrimitiveArray(arr)) => {
            FieldType::Ref(RefType::PrimitiveArray(*arr))
        }
        FieldType::Ref(RefType::Object(token)) => {
            FieldType::object(compile_class_token(pattern, token, scope)?)
        }
        FieldType::Ref(RefType::ObjectArray(arr)) => {
            FieldType::Ref(RefType::ObjectArray(ArrayType {
                additional_dimensions: arr.additional_dimensions,
                element_type: compile_class_token(pattern, &arr.element_type, scope)?,
            }))
        }
    })
}

fn match_field_type(
    pattern: &FieldType<NameMatcher>,
    candidate: &FieldType<BinaryName>,
    captures: &mut Captures,
) -> bool {
    let (pattern, candidate) = match (pattern, candidate) {
        (FieldType::Base(pattern), FieldType::Base(candidate)) => return pattern == candidate,
        (FieldType::Ref(pattern), FieldType::Ref(candidate)) => (pattern, candidate),
        _ => return false,
    };
    match (pattern, candidate) {
        (RefType::PrimitiveArray(pattern), RefType::PrimitiveArray(candidate)) => {
            pattern == candidate
        }
        (RefType::Object(pattern), RefType::Object(candidate)) => {
            pattern.test_into(candidate.as_str(), captures)
        }
        (RefType::ObjectArray(pattern), RefType::ObjectArray(candidate)) => {
            pattern.additional_dimensions == candidate.additional_dimensions
                && pattern
                    .element_type
                    .test_into(candidate.element_type.as_str(), captures)
        }
        _ => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn field(descriptor: &str) -> FieldType<BinaryName> {
        FieldType::parse(descriptor).unwrap()
    }

    fn method(descriptor: &str) -> MethodDescriptor<BinaryName> {
        MethodDescriptor::parse(descriptor).unwrap()
    }

    #[test]
    fn literal_field_types() {
        let matcher = DescriptorMatcher::compile_field("[I", &mut WildcardScope::new()).unwrap();
        assert!(matcher.test_field(&field("[I"), &mut Captures::new()));
        assert!(!matcher.test_field(&field("[[I"), &mut Captures::new()));
        assert!(!matcher.test_field(&field("I"), &mut Captures::new()));
    }

    #[test]
    fn wildcards_inside_class_tokens() {
        let matcher =
            DescriptorMatcher::compile_field("[Lcom/*/Foo;", &mut WildcardScope::new()).unwrap();
        let mut captures = Captures::new();
        assert!(matcher.test_field(&field("[Lcom/a/Foo;"), &mut captures));
        assert_eq!(captures.get(0), Some("a"));
        assert!(!matcher.test_field(&field("Lcom/a/Foo;"), &mut Captures::new()));
        assert!(!matcher.test_field(&field("[Lcom/a/b/Foo;"), &mut Captures::new()));
    }

    #[test]
    fn method_descriptors() {
        let matcher =
            DescriptorMatcher::compile_method("(Ljava/lang/**;I)V", &mut WildcardScope::new())
                .unwrap();
        assert!(matcher.test_method(&method("(Ljava/lang/String;I)V"), &mut Captures::new()));
        assert!(!matcher.test_method(&method("(Ljava/lang/String;)V"), &mut Captures::new()));
        assert!(!matcher.test_method(&method("(Ljava/lang/String;I)I"), &mut Captures::new()));
        assert!(!matcher.test_field(&field("I"), &mut Captures::new()));
    }

    #[test]
    fn failed_match_leaves_captures_alone() {
        let matcher =
            DescriptorMatcher::compile_method("(L*;L*;)V", &mut WildcardScope::new()).unwrap();
        let mut captures = Captures::new();
        assert!(!matcher.test_method(&method("(LA;Lb/B;)V"), &mut captures));
        assert_eq!(captures, Captures::new());
    }

    #[test]
    fn back_references_across_tokens() {
        let mut scope = WildcardScope::new();
        let matcher = DescriptorMatcher::compile_method("(Lcom/*/A;)Lcom/<1>/B;", &mut scope).unwrap();
        assert!(matcher.test_method(&method("(Lcom/x/A;)Lcom/x/B;"), &mut Captures::new()));
        assert!(!matcher.test_method(&method("(Lcom/x/A;)Lcom/y/B;"), &mut Captures::new()));
    }

    #[test]
    fn wildcards_outside_class_tokens_are_rejected() {
        for pattern in ["*", "I*", "[*", "L;", "Lcom/Foo"] {
            let result = DescriptorMatcher::compile_field(pattern, &mut WildcardScope::new());
            assert!(
                matches!(result, Err(PatternError::MalformedDescriptor { .. })),
                "{} should be rejected",
                pattern
            );
        }
        for pattern in ["(I", "(*)V", "()*", "I"] {
            let result = DescriptorMatcher::compile_method(pattern, &mut WildcardScope::new());
            assert!(
                matches!(result, Err(PatternError::MalformedDescriptor { .. })),
                "{} should be rejected",
                pattern
            );
        }
    }

    #[test]
    fn bad_back_reference_in_class_token() {
        let result = DescriptorMatcher::compile_field("Lcom/<3>;", &mut WildcardScope::new());
        assert!(matches!(
            result,
            Err(PatternError::UnresolvableBackReference { index: 3, .. })
        ));
    }
}
