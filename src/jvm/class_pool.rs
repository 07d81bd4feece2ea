use super::{
    BinaryName, ClassAccessFlags, FieldAccessFlags, FieldType, MethodAccessFlags,
    MethodDescriptor, Name, RenderDescriptor, UnqualifiedName,
};
use elsa::map::FrozenMap;
use elsa::FrozenVec;
use std::collections::HashSet;
use std::fmt;
use std::fmt::Debug;
use typed_arena::Arena;

pub struct ClassPoolArenas<'g> {
    class_arena: Arena<ClassData<'g>>,
    method_arena: Arena<MethodData<'g>>,
    field_arena: Arena<FieldData<'g>>,
}

impl<'g> ClassPoolArenas<'g> {
    pub fn new() -> Self {
        ClassPoolArenas {
            class_arena: Arena::new(),
            method_arena: Arena::new(),
            field_arena: Arena::new(),
        }
    }
}

impl<'g> Default for ClassPoolArenas<'g> {
    fn default() -> Self {
        Self::new()
    }
}

/// Pool of classes that specifications are matched against
///
/// Classes (and their members) are allocated once and then referred to by `&'g` pointers, so the
/// pool can keep growing while callbacks hold on to classes they have already been handed. Classes
/// are indexed by their exact name for direct lookups, and also kept in insertion order so that
/// full scans are deterministic.
pub struct ClassPool<'g> {
    arenas: &'g ClassPoolArenas<'g>,
    classes: FrozenMap<&'g str, Box<&'g ClassData<'g>>>,
    ordered: FrozenVec<Box<&'g ClassData<'g>>>,
}

impl<'g> ClassPool<'g> {
    /// New empty pool
    pub fn new(arenas: &'g ClassPoolArenas<'g>) -> Self {
        ClassPool {
            arenas,
            classes: FrozenMap::new(),
            ordered: FrozenVec::new(),
        }
    }

    /// Look up a class by its exact internal name
    pub fn lookup_class(&self, name: &str) -> Option<&'g ClassData<'g>> {
        self.classes.get(name).copied()
    }

    /// Iterate over all classes in the order they were added
    pub fn classes(&self) -> impl Iterator<Item = &'g ClassData<'g>> + '_ {
        (0..self.ordered.len()).filter_map(move |idx| self.ordered.get(idx).copied())
    }

    /// Number of classes in the pool
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Add a new class to the pool
    ///
    /// If a class with the same name is already present, the first definition wins and is
    /// returned.
    pub fn add_class(&self, data: ClassData<'g>) -> &'g ClassData<'g> {
        if let Some(existing) = self.lookup_class(data.name.as_str()) {
            log::warn!("Duplicate definition of class {:?} ignored", data.name);
            return existing;
        }
        let data = &*self.arenas.class_arena.alloc(data);
        self.classes.insert(data.name.as_str(), Box::new(data));
        self.ordered.push(Box::new(data));
        data
    }

    /// Add a field to the pool and to its class
    pub fn add_field(&self, field: FieldData<'g>) -> &'g FieldData<'g> {
        let data = &*self.arenas.field_arena.alloc(field);
        data.class.fields.push(data);
        match data.class.field_index.get(data.name.as_str()) {
            Some(fields) => fields.push(data),
            None => {
                let fields = FrozenVec::new();
                fields.push(data);
                data.class
                    .field_index
                    .insert(data.name.clone(), Box::new(fields));
            }
        }
        data
    }

    /// Add a method to the pool and to its class
    ///
    /// Adding a method with the same name and descriptor twice returns the original method.
    pub fn add_method(&self, method: MethodData<'g>) -> &'g MethodData<'g> {
        if let Some(m) = method
            .class
            .methods_named(method.name.as_str())
            .find(|m| m.descriptor == method.descriptor)
        {
            return m;
        }
        let data = &*self.arenas.method_arena.alloc(method);
        data.class.methods.push(data);
        match data.class.method_index.get(data.name.as_str()) {
            Some(methods) => methods.push(data),
            None => {
                let methods = FrozenVec::new();
                methods.push(data);
                data.class
                    .method_index
                    .insert(data.name.clone(), Box::new(methods));
            }
        }
        data
    }

    /// Walk the transitive supertypes (superclasses and interfaces) of a class
    ///
    /// Supertypes are visited closest first. Supertypes that aren't in the pool are unknown: they
    /// are neither visited nor walked through. Every supertype is visited at most once, even if the
    /// hierarchy is cyclic.
    pub fn supertypes(&self, class: &ClassData<'g>) -> Vec<&'g ClassData<'g>> {
        let mut visited: Vec<&'g ClassData<'g>> = vec![];
        let mut dont_revisit: HashSet<&str> = HashSet::new();
        dont_revisit.insert(class.name.as_str());

        let mut to_visit: Vec<&BinaryName> = class.direct_supertypes().collect();
        to_visit.reverse();
        while let Some(name) = to_visit.pop() {
            if !dont_revisit.insert(name.as_str()) {
                continue;
            }
            match self.lookup_class(name.as_str()) {
                Some(supertype) => {
                    visited.push(supertype);
                    let mut next: Vec<&BinaryName> = supertype.direct_supertypes().collect();
                    next.reverse();
                    to_visit.extend(next);
                }
                None => log::trace!("Supertype {:?} of {:?} is unknown", name, class.name),
            }
        }

        visited
    }
}

pub struct ClassData<'g> {
    /// Name of the class
    pub name: BinaryName,

    /// Access flags of the class
    pub access_flags: ClassAccessFlags,

    /// Superclass is only ever missing for `java/lang/Object` itself
    pub superclass: Option<BinaryName>,

    /// Interfaces implemented (or super-interfaces)
    pub interfaces: Vec<BinaryName>,

    /// Types of the annotations on the class
    pub annotations: Vec<BinaryName>,

    /// Methods
    pub methods: FrozenVec<&'g MethodData<'g>>,

    /// Fields
    pub fields: FrozenVec<&'g FieldData<'g>>,

    method_index: FrozenMap<UnqualifiedName, Box<FrozenVec<&'g MethodData<'g>>>>,
    field_index: FrozenMap<UnqualifiedName, Box<FrozenVec<&'g FieldData<'g>>>>,
}

impl<'g> ClassData<'g> {
    pub fn new(
        name: BinaryName,
        superclass: Option<BinaryName>,
        access_flags: ClassAccessFlags,
    ) -> ClassData<'g> {
        ClassData {
            name,
            access_flags,
            superclass,
            interfaces: vec![],
            annotations: vec![],
            methods: FrozenVec::new(),
            fields: FrozenVec::new(),
            method_index: FrozenMap::new(),
            field_index: FrozenMap::new(),
        }
    }

    pub fn with_interfaces(mut self, interfaces: Vec<BinaryName>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<BinaryName>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Superclass followed by the interfaces
    pub fn direct_supertypes(&self) -> impl Iterator<Item = &BinaryName> {
        self.superclass.iter().chain(self.interfaces.iter())
    }

    /// Fields with exactly this name
    pub fn fields_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a FieldData<'g>> + 'a {
        let fields = self.field_index.get(name);
        let len = fields.map_or(0, |fields| fields.len());
        (0..len).filter_map(move |idx| fields.and_then(|fields| fields.get(idx)))
    }

    /// Methods with exactly this name
    pub fn methods_named<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = &'a MethodData<'g>> + 'a {
        let methods = self.method_index.get(name);
        let len = methods.map_or(0, |methods| methods.len());
        (0..len).filter_map(move |idx| methods.and_then(|methods| methods.get(idx)))
    }

    /// All fields, in declaration order
    pub fn all_fields<'a>(&'a self) -> impl Iterator<Item = &'a FieldData<'g>> + 'a {
        (0..self.fields.len()).filter_map(move |idx| self.fields.get(idx))
    }

    /// All methods, in declaration order
    pub fn all_methods<'a>(&'a self) -> impl Iterator<Item = &'a MethodData<'g>> + 'a {
        (0..self.methods.len()).filter_map(move |idx| self.methods.get(idx))
    }
}

impl<'g> PartialEq for ClassData<'g> {
    fn eq(&self, other: &ClassData<'g>) -> bool {
        self.name == other.name
    }
}

impl<'g> Eq for ClassData<'g> {}

impl<'g> Debug for ClassData<'g> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_str())
    }
}

pub struct MethodData<'g> {
    /// Class
    pub class: &'g ClassData<'g>,

    /// Name of the method
    pub name: UnqualifiedName,

    /// Type of the method
    pub descriptor: MethodDescriptor<BinaryName>,

    /// Access flags of the method
    pub access_flags: MethodAccessFlags,

    /// Types of the annotations on the method
    pub annotations: Vec<BinaryName>,

    /// Names of the attributes nested in the `Code` attribute (eg. `LineNumberTable`)
    ///
    /// `None` when the method has no code at all (abstract or native methods).
    pub code_attributes: Option<Vec<String>>,
}

impl<'g> MethodData<'g> {
    pub fn new(
        class: &'g ClassData<'g>,
        name: UnqualifiedName,
        descriptor: MethodDescriptor<BinaryName>,
        access_flags: MethodAccessFlags,
    ) -> MethodData<'g> {
        MethodData {
            class,
            name,
            descriptor,
            access_flags,
            annotations: vec![],
            code_attributes: None,
        }
    }
}

impl<'g> Debug for MethodData<'g> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "{}.{}:{}",
            self.class.name.as_str(),
            self.name.as_str(),
            self.descriptor.render(),
        ))
    }
}

pub struct FieldData<'g> {
    /// Class
    ///
    /// Note: this is a pointer back to the class (so don't derive `Debug`)
    pub class: &'g ClassData<'g>,

    /// Name of the field
    pub name: UnqualifiedName,

    /// Type of the field
    pub descriptor: FieldType<BinaryName>,

    /// Access flags of the field
    pub access_flags: FieldAccessFlags,

    /// Types of the annotations on the field
    pub annotations: Vec<BinaryName>,
}

impl<'g> FieldData<'g> {
    pub fn new(
        class: &'g ClassData<'g>,
        name: UnqualifiedName,
        descriptor: FieldType<BinaryName>,
        access_flags: FieldAccessFlags,
    ) -> FieldData<'g> {
        FieldData {
            class,
            name,
            descriptor,
            access_flags,
            annotations: vec![],
        }
    }
}

impl<'g> Debug for FieldData<'g> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "{}.{}:{}",
            self.class.name.as_str(),
            self.name.as_str(),
            self.descriptor.render(),
        ))
    }
}
