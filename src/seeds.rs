//! Listing everything the keep rules of a configuration match in a class pool
//!
//! Output is one seed per line, using external names and Java types:
//!
//! ```text
//! com.example.Foo
//! com.example.Foo: int count
//! com.example.Foo: Foo(int)
//! com.example.Foo: void run(java.lang.String)
//! ```

use crate::config::{descriptor_to_java_method, descriptor_to_java_type};
use crate::jvm::{
    ClassData, ClassPool, FieldData, MethodData, RenderDescriptor, UnqualifiedName,
};
use crate::matching::{compile_keep, Callbacks};
use crate::spec::Configuration;
use std::cell::RefCell;
use std::collections::HashSet;
use std::io::{Result, Write};

/// Seeds of every keep rule, in the order they are first reported
///
/// Rules that fail to compile are logged and skipped. Returns the number of seeds written.
pub fn print_seeds<'g>(
    configuration: &Configuration,
    pool: &ClassPool<'g>,
    out: &mut impl Write,
) -> Result<usize> {
    let seeds = RefCell::new(Seeds::default());

    for keep in &configuration.keep {
        let callbacks = Callbacks::new()
            .on_class(|class| seeds.borrow_mut().add(class_seed(class)))
            .on_field(|field| seeds.borrow_mut().add(field_seed(field)))
            .on_method(|method| seeds.borrow_mut().add(method_seed(method)));
        match compile_keep(keep, callbacks) {
            Ok(traversal) => traversal.run(pool),
            Err(err) => log::error!("Skipping keep rule: {}", err),
        }
    }

    let seeds = seeds.into_inner();
    for line in &seeds.lines {
        writeln!(out, "{}", line)?;
    }
    log::info!("Printed {} seeds", seeds.lines.len());
    Ok(seeds.lines.len())
}

#[derive(Default)]
struct Seeds {
    lines: Vec<String>,
    seen: HashSet<String>,
}

impl Seeds {
    fn add(&mut self, line: String) {
        if self.seen.insert(line.clone()) {
            self.lines.push(line);
        }
    }
}

pub fn class_seed(class: &ClassData<'_>) -> String {
    class.name.to_string()
}

pub fn field_seed(field: &FieldData<'_>) -> String {
    let descriptor = field.descriptor.render();
    let java_type = descriptor_to_java_type(&descriptor).unwrap_or(descriptor);
    format!("{}: {} {}", field.class.name, java_type, field.name)
}

/// Constructors are named after their class, as in Java source
pub fn method_seed(method: &MethodData<'_>) -> String {
    let descriptor = method.descriptor.render();
    let (return_type, arguments) = match descriptor_to_java_method(&descriptor) {
        Some(java_method) => java_method,
        None => return format!("{}: {}{}", method.class.name, method.name, descriptor),
    };

    if method.name == UnqualifiedName::INIT {
        format!(
            "{}: {}({})",
            method.class.name,
            method.class.name.simple_name(),
            arguments.join(",")
        )
    } else {
        format!(
            "{}: {} {}({})",
            method.class.name,
            return_type,
            method.name,
            arguments.join(",")
        )
    }
}
