use super::lexer::quote;
use super::{descriptor_to_java_method, descriptor_to_java_type, Error, ANY_ARGUMENTS, ANY_TYPE};
use crate::jvm::{
    external_class_name, ClassAccessFlags, MemberAccessFlags, CLASS_MODIFIERS, MEMBER_MODIFIERS,
};
use crate::spec::{
    ClassPathEntry, ClassSpecification, Configuration, KeepClassSpecification,
    MemberSpecification,
};

/// Render a configuration as rule text that [`super::parse_configuration`] reads back
///
/// Options are separated by blank lines and the text ends with a single newline. Class path
/// entries get one option line each.
pub fn write_configuration(configuration: &Configuration) -> Result<String, Error> {
    let mut options: Vec<String> = vec![];

    for entry in &configuration.program_jars.entries {
        let option = if entry.is_output() { "-outjars" } else { "-injars" };
        options.push(class_path_entry(option, entry));
    }
    for entry in &configuration.library_jars.entries {
        options.push(class_path_entry("-libraryjars", entry));
    }
    for keep in &configuration.keep {
        options.push(keep_option(keep)?);
    }
    for specification in &configuration.assume_no_side_effects {
        options.push(option("-assumenosideeffects", specification)?);
    }
    for specification in &configuration.why_are_you_keeping {
        options.push(option("-whyareyoukeeping", specification)?);
    }

    // Every option already ends in a newline
    Ok(options.join("\n"))
}

fn class_path_entry(option: &str, entry: &ClassPathEntry) -> String {
    let mut line = format!("{} {}", option, quote(&entry.file().to_string_lossy()));
    if entry.is_filtered() {
        let slots: Vec<String> = entry
            .filter_slots()
            .iter()
            .map(|slot| slot.map_or_else(String::new, filter))
            .collect();
        line.push('(');
        line.push_str(&slots.join(";"));
        line.push(')');
    }
    line.push('\n');
    line
}

fn filter(elements: &[String]) -> String {
    let elements: Vec<String> = elements
        .iter()
        .map(|element| match element.strip_prefix('!') {
            Some(negated) => format!("!{}", quote(negated)),
            None => quote(element),
        })
        .collect();
    elements.join(",")
}

fn keep_option(keep: &KeepClassSpecification) -> Result<String, Error> {
    let policy = &keep.policy;
    let mut text = comments(&keep.class_specification);
    if let Some(condition) = &keep.condition {
        text.push_str("-if ");
        class_specification(&mut text, condition)?;
        text.push('\n');
    }

    text.push_str(if policy.mark_classes && policy.mark_conditionally {
        "-keepclasseswithmembers"
    } else if policy.mark_classes {
        "-keep"
    } else {
        "-keepclassmembers"
    });
    let modifiers = [
        ("includedescriptorclasses", policy.mark_descriptor_classes),
        ("includecode", policy.mark_code_attributes),
        ("allowshrinking", policy.allow_shrinking),
        ("allowoptimization", policy.allow_optimization),
        ("allowobfuscation", policy.allow_obfuscation),
    ];
    for (modifier, _) in modifiers.iter().filter(|(_, enabled)| *enabled) {
        text.push(',');
        text.push_str(modifier);
    }

    text.push(' ');
    class_specification(&mut text, &keep.class_specification)?;
    text.push('\n');
    Ok(text)
}

fn option(option: &str, specification: &ClassSpecification) -> Result<String, Error> {
    let mut text = comments(specification);
    text.push_str(option);
    text.push(' ');
    class_specification(&mut text, specification)?;
    text.push('\n');
    Ok(text)
}

fn comments(specification: &ClassSpecification) -> String {
    let mut text = String::new();
    if let Some(comments) = &specification.comments {
        for line in comments.lines() {
            text.push_str("# ");
            text.push_str(line);
            text.push('\n');
        }
    }
    text
}

/// Keyword for the class kind, from the flags it implies
fn class_keyword(set: ClassAccessFlags, unset: ClassAccessFlags) -> &'static str {
    if set.contains(ClassAccessFlags::ANNOTATION) {
        "@interface"
    } else if set.contains(ClassAccessFlags::INTERFACE) {
        "interface"
    } else if set.contains(ClassAccessFlags::ENUM) {
        "enum"
    } else if unset.contains(ClassAccessFlags::ANNOTATION) {
        "!@interface"
    } else if unset.contains(ClassAccessFlags::INTERFACE) {
        "!interface"
    } else if unset.contains(ClassAccessFlags::ENUM) {
        "!enum"
    } else {
        "class"
    }
}

fn class_specification(
    text: &mut String,
    specification: &ClassSpecification,
) -> Result<(), Error> {
    if let Some(annotation) = &specification.annotation_type {
        text.push('@');
        text.push_str(&class_name(annotation));
        text.push(' ');
    }

    let set = specification.required_set_access_flags;
    let unset = specification.required_unset_access_flags;
    for (name, flag) in CLASS_MODIFIERS {
        if set.contains(*flag) {
            text.push_str(name);
            text.push(' ');
        }
        if unset.contains(*flag) {
            text.push('!');
            text.push_str(name);
            text.push(' ');
        }
    }
    text.push_str(class_keyword(set, unset));
    text.push(' ');

    match &specification.class_name {
        Some(name) => text.push_str(&class_name(name)),
        None => text.push('*'),
    }

    let extends_annotation = specification.extends_annotation_type.as_deref();
    let extends_name = specification.extends_class_name.as_deref();
    if extends_annotation.is_some() || extends_name.is_some() {
        text.push_str(" extends ");
        if let Some(annotation) = extends_annotation {
            text.push('@');
            text.push_str(&class_name(annotation));
            text.push(' ');
        }
        text.push_str(&extends_name.map_or_else(|| String::from("*"), class_name));
    }

    let has_members = !specification.field_specifications.is_empty()
        || !specification.method_specifications.is_empty();
    if has_members {
        text.push_str(" {\n");
        for field in &specification.field_specifications {
            text.push_str("    ");
            member(text, field, false)?;
            text.push_str(";\n");
        }
        for method in &specification.method_specifications {
            text.push_str("    ");
            member(text, method, true)?;
            text.push_str(";\n");
        }
        text.push('}');
    }
    Ok(())
}

fn member(text: &mut String, member: &MemberSpecification, is_method: bool) -> Result<(), Error> {
    if let Some(annotation) = &member.annotation_type {
        text.push('@');
        text.push_str(&class_name(annotation));
        text.push(' ');
    }
    member_modifiers(
        text,
        member.required_set_access_flags,
        member.required_unset_access_flags,
    );

    let name = member.name.as_deref().map_or_else(|| String::from("*"), quote);
    match (&member.name, &member.descriptor, is_method) {
        (None, None, false) => text.push_str("<fields>"),
        (None, None, true) => text.push_str("<methods>"),
        (Some(_), None, false) => text.push_str(&format!("{} {}", ANY_TYPE, name)),
        (Some(_), None, true) => {
            text.push_str(&format!("{} {}({})", ANY_TYPE, name, ANY_ARGUMENTS))
        }
        (_, Some(descriptor), false) => {
            let java_type =
                descriptor_to_java_type(descriptor).ok_or_else(|| unwritable(descriptor))?;
            text.push_str(&format!("{} {}", java_type, name));
        }
        (_, Some(descriptor), true) => {
            let (return_type, arguments) =
                descriptor_to_java_method(descriptor).ok_or_else(|| unwritable(descriptor))?;
            if name == "<init>" && return_type == "void" {
                text.push_str(&format!("{}({})", name, arguments.join(", ")));
            } else {
                text.push_str(&format!("{} {}({})", return_type, name, arguments.join(", ")));
            }
        }
    }
    Ok(())
}

fn member_modifiers(text: &mut String, set: MemberAccessFlags, unset: MemberAccessFlags) {
    for (name, flag) in MEMBER_MODIFIERS {
        if set.contains(*flag) {
            text.push_str(name);
            text.push(' ');
        }
        if unset.contains(*flag) {
            text.push('!');
            text.push_str(name);
            text.push(' ');
        }
    }
}

fn class_name(internal: &str) -> String {
    quote(&external_class_name(internal))
}

fn unwritable(descriptor: &str) -> Error {
    Error::UnwritableDescriptor {
        descriptor: descriptor.to_string(),
    }
}
