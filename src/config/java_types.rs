use crate::jvm::{
    external_class_name, internal_class_name, BaseType, FieldType, MethodDescriptor,
    ParseDescriptor, RefType, RenderDescriptor,
};

/// Java type that matches any type (only valid where the descriptor can be left out entirely)
pub const ANY_TYPE: &str = "***";

/// Argument list that matches any arguments (same restriction as [`ANY_TYPE`])
pub const ANY_ARGUMENTS: &str = "...";

/// Convert a Java type (`int`, `java.lang.String[]`, `com.example.*`) into a field descriptor
///
/// Returns `None` for `void` and for the "any type" wildcards, which have no descriptor form.
pub fn java_type_to_descriptor(java_type: &str) -> Option<String> {
    java_type_to_field_type(java_type).map(|field_type| field_type.render())
}

/// Convert a return type and argument types into a method descriptor
pub fn java_method_to_descriptor(return_type: &str, arguments: &[String]) -> Option<String> {
    let return_type = match return_type {
        "void" => None,
        return_type => Some(java_type_to_field_type(return_type)?),
    };
    let mut parameters = Vec::with_capacity(arguments.len());
    for argument in arguments {
        parameters.push(java_type_to_field_type(argument)?);
    }
    let descriptor = MethodDescriptor {
        parameters,
        return_type,
    };
    Some(descriptor.render())
}

/// Inverse of [`java_type_to_descriptor`]
pub fn descriptor_to_java_type(descriptor: &str) -> Option<String> {
    FieldType::<String>::parse(descriptor)
        .ok()
        .map(|field_type| field_type_to_java(&field_type))
}

/// Inverse of [`java_method_to_descriptor`], giving the return type and argument types
pub fn descriptor_to_java_method(descriptor: &str) -> Option<(String, Vec<String>)> {
    let descriptor = MethodDescriptor::<String>::parse(descriptor).ok()?;
    let return_type = descriptor
        .return_type
        .as_ref()
        .map_or_else(|| String::from("void"), field_type_to_java);
    let arguments = descriptor.parameters.iter().map(field_type_to_java).collect();
    Some((return_type, arguments))
}

fn java_type_to_field_type(java_type: &str) -> Option<FieldType<String>> {
    let mut element_type = java_type;
    let mut dimensions = 0;
    while let Some(stripped) = element_type.strip_suffix("[]") {
        element_type = stripped;
        dimensions += 1;
    }
    if element_type.is_empty()
        || element_type == "void"
        || element_type == ANY_TYPE
        || element_type == ANY_ARGUMENTS
    {
        return None;
    }

    let mut field_type = match BaseType::from_java_name(element_type) {
        Some(base_type) => FieldType::Base(base_type),
        None => FieldType::object(internal_class_name(element_type)),
    };
    for _ in 0..dimensions {
        field_type = FieldType::array(field_type);
    }
    Some(field_type)
}

fn field_type_to_java(field_type: &FieldType<String>) -> String {
    match field_type {
        FieldType::Base(base_type) => base_type.java_name().to_string(),
        FieldType::Ref(RefType::Object(class_name)) => external_class_name(class_name),
        FieldType::Ref(RefType::PrimitiveArray(arr)) => {
            format!("{}{}", arr.element_type.java_name(), "[]".repeat(arr.dimensions()))
        }
        FieldType::Ref(RefType::ObjectArray(arr)) => format!(
            "{}{}",
            external_class_name(&arr.element_type),
            "[]".repeat(arr.dimensions())
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn field_types() {
        assert_eq!(java_type_to_descriptor("int").as_deref(), Some("I"));
        assert_eq!(
            java_type_to_descriptor("java.lang.String[][]").as_deref(),
            Some("[[Ljava/lang/String;")
        );
        assert_eq!(
            java_type_to_descriptor("com.example.**").as_deref(),
            Some("Lcom/example/**;")
        );
        assert_eq!(java_type_to_descriptor("void"), None);
        assert_eq!(java_type_to_descriptor(ANY_TYPE), None);

        assert_eq!(descriptor_to_java_type("[J").as_deref(), Some("long[]"));
        assert_eq!(
            descriptor_to_java_type("Lcom/<1>/Foo;").as_deref(),
            Some("com.<1>.Foo")
        );
    }

    #[test]
    fn methods() {
        let arguments = vec![String::from("int"), String::from("java.lang.String")];
        let descriptor = java_method_to_descriptor("void", &arguments).unwrap();
        assert_eq!(descriptor, "(ILjava/lang/String;)V");
        assert_eq!(
            descriptor_to_java_method(&descriptor),
            Some((String::from("void"), arguments))
        );
        assert_eq!(java_method_to_descriptor("void", &[String::from("void")]), None);
    }
}
