use super::{
    AccessPredicate, AnnotationPredicate, AttributePredicate, Captures, CompileError,
    ConditionalTraversal, DescriptorMatcher, NameMatcher, PatternError, SpecificationField,
    SupertypePredicate, WildcardScope,
};
use crate::jvm::{BinaryName, ClassData, ClassPool, FieldData, MethodData, Name};
use crate::spec::{ClassSpecification, KeepClassSpecification, MemberSpecification};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type ClassCallback<'c> = Box<dyn FnMut(&ClassData<'_>) + 'c>;
pub type FieldCallback<'c> = Box<dyn FnMut(&FieldData<'_>) + 'c>;
pub type MethodCallback<'c> = Box<dyn FnMut(&MethodData<'_>) + 'c>;
pub type AttributeCallback<'c> = Box<dyn FnMut(&MethodData<'_>, &str) + 'c>;

/// What a traversal reports its matches to
///
/// Every callback is optional. Leaving out the member callbacks means the traversal never looks
/// at members (unless it needs them to decide whether the class matches).
#[derive(Default)]
pub struct Callbacks<'c> {
    class: Option<ClassCallback<'c>>,
    field: Option<FieldCallback<'c>>,
    method: Option<MethodCallback<'c>>,
    attribute: Option<AttributeCallback<'c>>,
}

impl<'c> Callbacks<'c> {
    pub fn new() -> Callbacks<'c> {
        Callbacks::default()
    }

    pub fn on_class(mut self, callback: impl FnMut(&ClassData<'_>) + 'c) -> Self {
        self.class = Some(Box::new(callback));
        self
    }

    pub fn on_field(mut self, callback: impl FnMut(&FieldData<'_>) + 'c) -> Self {
        self.field = Some(Box::new(callback));
        self
    }

    pub fn on_method(mut self, callback: impl FnMut(&MethodData<'_>) + 'c) -> Self {
        self.method = Some(Box::new(callback));
        self
    }

    /// Called once per attribute name in the code attribute of every reported method
    pub fn on_attribute(mut self, callback: impl FnMut(&MethodData<'_>, &str) + 'c) -> Self {
        self.attribute = Some(Box::new(callback));
        self
    }
}

impl<'c> fmt::Debug for Callbacks<'c> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("class", &self.class.is_some())
            .field("field", &self.field.is_some())
            .field("method", &self.method.is_some())
            .field("attribute", &self.attribute.is_some())
            .finish()
    }
}

/// Which of the (shared) callbacks one specification reports to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Reporting {
    pub classes: bool,
    pub members: bool,
    pub code_attributes: bool,
    pub descriptor_classes: bool,
}

impl Reporting {
    pub const ALL: Reporting = Reporting {
        classes: true,
        members: true,
        code_attributes: true,
        descriptor_classes: false,
    };

    pub const NONE: Reporting = Reporting {
        classes: false,
        members: false,
        code_attributes: false,
        descriptor_classes: false,
    };
}

/// Compiled specification (or specifications), ready to be run against class pools
///
/// The variant records which strategy was chosen for finding candidate classes.
#[derive(Debug)]
pub enum Traversal<'c> {
    /// Class name resolves to one name, so the candidate is looked up in the pool's index
    DirectLookup(ClassTraversal<'c>),

    /// Every class of the pool is a candidate
    FullScan(ClassTraversal<'c>),

    /// Several specifications, each reporting its own matches
    Composite(Vec<Traversal<'c>>),

    /// Specification evaluated once per match of a condition
    Conditional(ConditionalTraversal<'c>),
}

impl<'c> Traversal<'c> {
    /// Run the traversal, reporting matches to the callbacks
    pub fn run<'g>(&self, pool: &ClassPool<'g>) {
        self.for_each_match(pool, &Captures::new(), &mut |traversal, class, members| {
            traversal.report(pool, class, members)
        });
    }

    pub(crate) fn from_class(traversal: ClassTraversal<'c>) -> Traversal<'c> {
        if traversal.is_direct_lookup() {
            Traversal::DirectLookup(traversal)
        } else {
            Traversal::FullScan(traversal)
        }
    }

    fn for_each_match<'g>(
        &self,
        pool: &ClassPool<'g>,
        captures: &Captures,
        accept: &mut dyn FnMut(&ClassTraversal<'c>, &'g ClassData<'g>, &MemberMatches<'g>),
    ) {
        match self {
            Traversal::DirectLookup(traversal) | Traversal::FullScan(traversal) => traversal
                .for_each_match(pool, captures, &mut |class, members, _| {
                    accept(traversal, class, members)
                }),
            Traversal::Composite(traversals) => {
                for traversal in traversals {
                    traversal.for_each_match(pool, captures, accept);
                }
            }
            Traversal::Conditional(conditional) => {
                conditional.for_each_match(pool, captures, accept)
            }
        }
    }
}

/// Members of one class accepted by the member specifications, in specification order
#[derive(Debug, Default)]
pub(crate) struct MemberMatches<'g> {
    pub fields: Vec<&'g FieldData<'g>>,
    pub methods: Vec<&'g MethodData<'g>>,
}

/// One compiled class specification
pub struct ClassTraversal<'c> {
    description: String,
    access: AccessPredicate,
    annotation: AnnotationPredicate,
    class_name: Option<NameMatcher>,
    direct_lookup: bool,
    supertype: SupertypePredicate,
    fields: Vec<MemberMatcher>,
    methods: Vec<MemberMatcher>,
    require_members: bool,
    descend_to_members: bool,
    reporting: Reporting,
    callbacks: Rc<RefCell<Callbacks<'c>>>,
}

impl<'c> ClassTraversal<'c> {
    /// Compile one specification
    ///
    /// Patterns are compiled (and so capture slots allocated) in this order: class annotation,
    /// class name, supertype annotation, supertype name, then for each field and then each method
    /// its annotation, name and descriptor.
    pub(crate) fn compile(
        specification: &ClassSpecification,
        callbacks: Rc<RefCell<Callbacks<'c>>>,
        reporting: Reporting,
        require_members: bool,
        scope: &mut WildcardScope,
    ) -> Result<ClassTraversal<'c>, CompileError> {
        let description = specification.describe();
        let error = |field: SpecificationField| {
            let specification = description.clone();
            move |error: PatternError| CompileError {
                specification,
                field,
                error,
            }
        };

        let captured_before = scope.slots();
        let access = AccessPredicate::new(
            specification.required_set_access_flags.bits(),
            specification.required_unset_access_flags.bits(),
        );
        let annotation =
            AnnotationPredicate::compile(specification.annotation_type.as_deref(), scope)
                .map_err(error(SpecificationField::AnnotationType))?;
        let class_name = specification
            .class_name
            .as_deref()
            .map(|pattern| NameMatcher::compile(pattern, scope))
            .transpose()
            .map_err(error(SpecificationField::ClassName))?;
        let direct_lookup = class_name
            .as_ref()
            .map_or(false, |matcher| matcher.is_resolvable_with(captured_before));

        let extends_annotation =
            AnnotationPredicate::compile(specification.extends_annotation_type.as_deref(), scope)
                .map_err(error(SpecificationField::ExtendsAnnotationType))?;
        let extends_class_name = specification
            .extends_class_name
            .as_deref()
            .map(|pattern| NameMatcher::compile(pattern, scope))
            .transpose()
            .map_err(error(SpecificationField::ExtendsClassName))?;
        let supertype = SupertypePredicate::new(extends_annotation, extends_class_name);

        let mut fields = vec![];
        for member in &specification.field_specifications {
            let matcher = MemberMatcher::compile(member, MemberKind::Field, scope)
                .map_err(|(field, pattern_error)| error(field)(pattern_error))?;
            fields.push(matcher);
        }
        let mut methods = vec![];
        for member in &specification.method_specifications {
            let matcher = MemberMatcher::compile(member, MemberKind::Method, scope)
                .map_err(|(field, pattern_error)| error(field)(pattern_error))?;
            methods.push(matcher);
        }

        let descend_to_members = require_members || {
            let present = callbacks.borrow();
            (reporting.members && (present.field.is_some() || present.method.is_some()))
                || (reporting.code_attributes && present.attribute.is_some())
                || (reporting.descriptor_classes && present.class.is_some())
        };

        log::debug!(
            "Compiled {} ({})",
            description,
            if direct_lookup { "direct lookup" } else { "full scan" }
        );
        Ok(ClassTraversal {
            description,
            access,
            annotation,
            class_name,
            direct_lookup,
            supertype,
            fields,
            methods,
            require_members,
            descend_to_members,
            reporting,
            callbacks,
        })
    }

    /// Which specification this was compiled from
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Class name pattern
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_ref().map(NameMatcher::pattern)
    }

    /// Does the class name resolve to a single name before any class is examined?
    pub fn is_direct_lookup(&self) -> bool {
        self.direct_lookup
    }

    /// Must every member specification match for the class to match?
    pub fn requires_members(&self) -> bool {
        self.require_members
    }

    /// Are members examined at all?
    ///
    /// Only when the class match depends on them, or some callback is there to report them to.
    pub fn descends_to_members(&self) -> bool {
        self.descend_to_members
    }

    /// Find the classes (and members) matching the specification
    ///
    /// Every candidate is matched starting from its own copy of `captures`. The captures a match
    /// ended with are handed to `accept` along with it.
    pub(crate) fn for_each_match<'g>(
        &self,
        pool: &ClassPool<'g>,
        captures: &Captures,
        accept: &mut dyn FnMut(&'g ClassData<'g>, &MemberMatches<'g>, &Captures),
    ) {
        if self.direct_lookup {
            let resolved = self
                .class_name
                .as_ref()
                .and_then(|matcher| matcher.resolve(captures));
            if let Some(class) = resolved.and_then(|name| pool.lookup_class(&name)) {
                self.visit(pool, class, captures, accept);
            }
        } else {
            for class in pool.classes() {
                self.visit(pool, class, captures, accept);
            }
        }
    }

    fn visit<'g>(
        &self,
        pool: &ClassPool<'g>,
        class: &'g ClassData<'g>,
        captures: &Captures,
        accept: &mut dyn FnMut(&'g ClassData<'g>, &MemberMatches<'g>, &Captures),
    ) {
        let mut captures = captures.clone();
        if !self.access.test(class.access_flags.bits())
            || !self.annotation.test(&class.annotations, &mut captures)
        {
            return;
        }
        if let Some(class_name) = &self.class_name {
            if !class_name.test(class.name.as_str(), &mut captures) {
                return;
            }
        }
        if !self.supertype.test(pool, class, &mut captures) {
            return;
        }

        let mut members = MemberMatches::default();
        if self.descend_to_members {
            for matcher in &self.fields {
                let matched = matcher.matching_fields(class, &mut captures);
                if matched.is_empty() && self.require_members {
                    return;
                }
                members.fields.extend(matched);
            }
            for matcher in &self.methods {
                let matched = matcher.matching_methods(class, &mut captures);
                if matched.is_empty() && self.require_members {
                    return;
                }
                members.methods.extend(matched);
            }
        }

        log::trace!("{} matches {:?}", self.description, class);
        accept(class, &members, &captures);
    }

    /// Invoke the callbacks this specification reports to
    pub(crate) fn report<'g>(
        &self,
        pool: &ClassPool<'g>,
        class: &'g ClassData<'g>,
        members: &MemberMatches<'g>,
    ) {
        let mut callbacks = self.callbacks.borrow_mut();
        let callbacks = &mut *callbacks;

        if self.reporting.classes {
            if let Some(on_class) = &mut callbacks.class {
                on_class(class);
            }
        }

        if self.reporting.members {
            if let Some(on_field) = &mut callbacks.field {
                members.fields.iter().for_each(|field| on_field(field));
            }
            if let Some(on_method) = &mut callbacks.method {
                members.methods.iter().for_each(|method| on_method(method));
            }
        }

        if self.reporting.code_attributes {
            if let Some(on_attribute) = &mut callbacks.attribute {
                for method in &members.methods {
                    for attribute in method.code_attributes.iter().flatten() {
                        on_attribute(method, attribute);
                    }
                }
            }
        }

        if self.reporting.descriptor_classes {
            if let Some(on_class) = &mut callbacks.class {
                let field_classes = members
                    .fields
                    .iter()
                    .filter_map(|field| field.descriptor.class());
                let method_classes = members
                    .methods
                    .iter()
                    .flat_map(|method| method.descriptor.classes());
                for name in field_classes.chain(method_classes) {
                    if let Some(descriptor_class) = pool.lookup_class(name.as_str()) {
                        on_class(descriptor_class);
                    }
                }
            }
        }
    }
}

impl<'c> fmt::Debug for ClassTraversal<'c> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassTraversal")
            .field("description", &self.description)
            .field("class_name", &self.class_name())
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .field("require_members", &self.require_members)
            .field("descend_to_members", &self.descend_to_members)
            .field("reporting", &self.reporting)
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MemberKind {
    Field,
    Method,
}

/// One compiled member specification
#[derive(Debug)]
struct MemberMatcher {
    access: AccessPredicate,
    annotation: AnnotationPredicate,
    name: Option<NameMatcher>,
    descriptor: Option<DescriptorMatcher>,
    attributes: AttributePredicate,
}

impl MemberMatcher {
    fn compile(
        specification: &MemberSpecification,
        kind: MemberKind,
        scope: &mut WildcardScope,
    ) -> Result<MemberMatcher, (SpecificationField, PatternError)> {
        let (annotation_field, name_field, descriptor_field) = match kind {
            MemberKind::Field => (
                SpecificationField::FieldAnnotationType,
                SpecificationField::FieldName,
                SpecificationField::FieldDescriptor,
            ),
            MemberKind::Method => (
                SpecificationField::MethodAnnotationType,
                SpecificationField::MethodName,
                SpecificationField::MethodDescriptor,
            ),
        };

        let annotation =
            AnnotationPredicate::compile(specification.annotation_type.as_deref(), scope)
                .map_err(|err| (annotation_field, err))?;
        let name = specification
            .name
            .as_deref()
            .map(|pattern| NameMatcher::compile(pattern, scope))
            .transpose()
            .map_err(|err| (name_field, err))?;
        let descriptor = specification
            .descriptor
            .as_deref()
            .map(|pattern| match kind {
                MemberKind::Field => DescriptorMatcher::compile_field(pattern, scope),
                MemberKind::Method => DescriptorMatcher::compile_method(pattern, scope),
            })
            .transpose()
            .map_err(|err| (descriptor_field, err))?;

        Ok(MemberMatcher {
            access: AccessPredicate::new(
                specification.required_set_access_flags.bits(),
                specification.required_unset_access_flags.bits(),
            ),
            annotation,
            name,
            descriptor,
            attributes: AttributePredicate::new(specification.attribute_names.as_deref()),
        })
    }

    /// Name to look members up by, if the name pattern resolves to one
    fn resolved_name(&self, captures: &Captures) -> Option<String> {
        self.name
            .as_ref()
            .filter(|name| name.is_resolvable())
            .and_then(|name| name.resolve(captures))
    }

    /// Matching fields, committing the captures of the first one
    fn matching_fields<'g>(
        &self,
        class: &'g ClassData<'g>,
        captures: &mut Captures,
    ) -> Vec<&'g FieldData<'g>> {
        let test = |field: &FieldData<'g>, captures: &mut Captures| {
            self.test(
                field.access_flags.bits(),
                &field.annotations,
                field.name.as_str(),
                captures,
            ) && self
                .descriptor
                .as_ref()
                .map_or(true, |descriptor| descriptor.test_field(&field.descriptor, captures))
                && self.attributes.test(None)
        };

        let candidates: Vec<&'g FieldData<'g>> = match self.resolved_name(captures) {
            Some(name) => class.fields_named(&name).collect(),
            None => class.all_fields().collect(),
        };
        commit_first(candidates, captures, test)
    }

    /// Matching methods, committing the captures of the first one
    fn matching_methods<'g>(
        &self,
        class: &'g ClassData<'g>,
        captures: &mut Captures,
    ) -> Vec<&'g MethodData<'g>> {
        let test = |method: &MethodData<'g>, captures: &mut Captures| {
            self.test(
                method.access_flags.bits(),
                &method.annotations,
                method.name.as_str(),
                captures,
            ) && self.descriptor.as_ref().map_or(true, |descriptor| {
                descriptor.test_method(&method.descriptor, captures)
            }) && self.attributes.test(method.code_attributes.as_deref())
        };

        let candidates: Vec<&'g MethodData<'g>> = match self.resolved_name(captures) {
            Some(name) => class.methods_named(&name).collect(),
            None => class.all_methods().collect(),
        };
        commit_first(candidates, captures, test)
    }

    fn test(
        &self,
        access_flags: u16,
        annotations: &[BinaryName],
        name: &str,
        captures: &mut Captures,
    ) -> bool {
        self.access.test(access_flags)
            && self.annotation.test(annotations, captures)
            && self
                .name
                .as_ref()
                .map_or(true, |matcher| matcher.test(name, captures))
    }
}

/// Keep the candidates passing `test`, each tested on its own copy of the captures
///
/// The captures of the first passing candidate are then committed, so later member
/// specifications can refer back to them.
fn commit_first<T: Copy>(
    candidates: Vec<T>,
    captures: &mut Captures,
    test: impl Fn(T, &mut Captures) -> bool,
) -> Vec<T> {
    let mut committed: Option<Captures> = None;
    let mut matched = vec![];
    for candidate in candidates {
        let mut trial = captures.clone();
        if test(candidate, &mut trial) {
            if committed.is_none() {
                committed = Some(trial);
            }
            matched.push(candidate);
        }
    }
    if let Some(committed) = committed {
        *captures = committed;
    }
    matched
}

/// Compile specifications into one traversal
///
/// Every specification starts allocating capture slots where `scope` left off, independently of
/// the other specifications. A single specification compiles to a [`Traversal::DirectLookup`] or
/// [`Traversal::FullScan`], several to a [`Traversal::Composite`].
///
/// A specification that fails to compile is left out of the traversal and its error returned
/// alongside; the other specifications are unaffected.
pub fn compile<'c>(
    specifications: &[ClassSpecification],
    callbacks: Callbacks<'c>,
    scope: &WildcardScope,
) -> (Traversal<'c>, Vec<CompileError>) {
    let callbacks = Rc::new(RefCell::new(callbacks));
    let mut traversals = Vec::with_capacity(specifications.len());
    let mut errors = vec![];
    for specification in specifications {
        let compiled = ClassTraversal::compile(
            specification,
            Rc::clone(&callbacks),
            Reporting::ALL,
            false,
            &mut scope.clone(),
        );
        match compiled {
            Ok(traversal) => traversals.push(Traversal::from_class(traversal)),
            Err(error) => {
                log::debug!("Skipping {}: {}", specification.describe(), error);
                errors.push(error);
            }
        }
    }

    let traversal = if traversals.len() == 1 && errors.is_empty() {
        traversals.remove(0)
    } else {
        Traversal::Composite(traversals)
    };
    (traversal, errors)
}

/// Compile a keep rule, reporting only what its policy keeps
///
/// The class callback only fires if the rule marks classes, member callbacks if it marks class
/// members, the attribute callback if it marks code attributes. Descriptor classes of reported
/// members go to the class callback too, when the rule marks them.
pub fn compile_keep<'c>(
    keep: &KeepClassSpecification,
    callbacks: Callbacks<'c>,
) -> Result<Traversal<'c>, CompileError> {
    let policy = keep.policy;
    let reporting = Reporting {
        classes: policy.mark_classes,
        members: policy.mark_class_members,
        code_attributes: policy.mark_code_attributes,
        descriptor_classes: policy.mark_descriptor_classes,
    };
    let callbacks = Rc::new(RefCell::new(callbacks));
    let mut scope = WildcardScope::new();

    match &keep.condition {
        None => {
            let traversal = ClassTraversal::compile(
                &keep.class_specification,
                callbacks,
                reporting,
                policy.mark_conditionally,
                &mut scope,
            )?;
            Ok(Traversal::from_class(traversal))
        }
        Some(condition) => {
            let conditional = ConditionalTraversal::compile(
                condition,
                &keep.class_specification,
                callbacks,
                reporting,
                policy.mark_conditionally,
                &mut scope,
            )?;
            Ok(Traversal::Conditional(conditional))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::{
        ClassAccessFlags, ClassPoolArenas, FieldAccessFlags, FieldType, MemberAccessFlags,
        MethodAccessFlags, MethodDescriptor, ParseDescriptor, UnqualifiedName,
    };
    use crate::spec::KeepPolicy;

    fn binary_name(name: &str) -> BinaryName {
        BinaryName::from_string(name.to_string()).unwrap()
    }

    fn unqualified_name(name: &str) -> UnqualifiedName {
        UnqualifiedName::from_string(name.to_string()).unwrap()
    }

    /// `com/example/Foo { int count; String label; void run(String); abstract void stop() }`
    /// and `com/example/Bar extends Foo`
    fn populate<'g>(pool: &ClassPool<'g>) {
        let foo = pool.add_class(ClassData::new(
            binary_name("com/example/Foo"),
            Some(BinaryName::OBJECT),
            ClassAccessFlags::PUBLIC,
        ));
        pool.add_field(FieldData::new(
            foo,
            unqualified_name("count"),
            FieldType::int(),
            FieldAccessFlags::PRIVATE,
        ));
        pool.add_field(FieldData::new(
            foo,
            unqualified_name("label"),
            FieldType::object(BinaryName::STRING),
            FieldAccessFlags::PUBLIC,
        ));
        let mut run = MethodData::new(
            foo,
            unqualified_name("run"),
            MethodDescriptor::parse("(Ljava/lang/String;)V").unwrap(),
            MethodAccessFlags::PUBLIC,
        );
        run.code_attributes = Some(vec![String::from("LineNumberTable")]);
        pool.add_method(run);
        pool.add_method(MethodData::new(
            foo,
            unqualified_name("stop"),
            MethodDescriptor::parse("()V").unwrap(),
            MethodAccessFlags::PUBLIC | MethodAccessFlags::ABSTRACT,
        ));
        pool.add_class(ClassData::new(
            binary_name("com/example/Bar"),
            Some(binary_name("com/example/Foo")),
            ClassAccessFlags::PUBLIC | ClassAccessFlags::FINAL,
        ));
        pool.add_class(ClassData::new(
            BinaryName::STRING,
            Some(BinaryName::OBJECT),
            ClassAccessFlags::PUBLIC | ClassAccessFlags::FINAL,
        ));
    }

    /// Everything a traversal reported, as strings
    fn report(traversal: impl FnOnce(Callbacks<'_>) -> Traversal<'_>) -> Vec<String> {
        let arenas = ClassPoolArenas::new();
        let pool = ClassPool::new(&arenas);
        populate(&pool);

        let reported = RefCell::new(vec![]);
        let callbacks = Callbacks::new()
            .on_class(|class| reported.borrow_mut().push(format!("class {:?}", class)))
            .on_field(|field| reported.borrow_mut().push(format!("field {:?}", field)))
            .on_method(|method| reported.borrow_mut().push(format!("method {:?}", method)))
            .on_attribute(|method, attribute| {
                reported
                    .borrow_mut()
                    .push(format!("attribute {:?} {}", method, attribute))
            });
        traversal(callbacks).run(&pool);
        reported.into_inner()
    }

    /// Compile specifications that are all expected to compile
    fn compile_all<'c>(
        specifications: &[ClassSpecification],
        callbacks: Callbacks<'c>,
    ) -> Traversal<'c> {
        let (traversal, errors) = compile(specifications, callbacks, &WildcardScope::new());
        assert!(errors.is_empty(), "{:?}", errors);
        traversal
    }

    fn member(name: &str) -> MemberSpecification {
        MemberSpecification {
            name: Some(name.to_string()),
            ..MemberSpecification::any()
        }
    }

    #[test]
    fn literal_class_name_is_a_direct_lookup() {
        let specification = ClassSpecification::named("com/example/Foo");
        let traversal = compile_all(&[specification], Callbacks::new());
        assert!(matches!(traversal, Traversal::DirectLookup(_)));

        let specification = ClassSpecification::named("com/example/*");
        let traversal = compile_all(&[specification], Callbacks::new());
        assert!(matches!(traversal, Traversal::FullScan(_)));

        let traversal = compile_all(&[ClassSpecification::default()], Callbacks::new());
        assert!(matches!(traversal, Traversal::FullScan(_)));
    }

    #[test]
    fn back_reference_to_own_wildcard_is_a_scan() {
        let specification = ClassSpecification {
            annotation_type: Some(String::from("com/*/Keep")),
            class_name: Some(String::from("com/<1>/Foo")),
            ..ClassSpecification::default()
        };
        let traversal = compile_all(&[specification], Callbacks::new());
        assert!(matches!(traversal, Traversal::FullScan(_)));
    }

    #[test]
    fn classes_and_members() {
        let specification = ClassSpecification::named("com/example/Foo")
            .with_field(member("count"))
            .with_method(MemberSpecification {
                required_set_access_flags: MemberAccessFlags::ABSTRACT,
                ..MemberSpecification::any()
            });
        let reported = report(|callbacks| {
            compile_all(&[specification], callbacks)
        });
        assert_eq!(
            reported,
            vec![
                "class com/example/Foo",
                "field com/example/Foo.count:I",
                "method com/example/Foo.stop:()V",
            ]
        );
    }

    #[test]
    fn attribute_callback_sees_code_attributes() {
        let specification = ClassSpecification::named("com/example/Foo").with_method(member("run"));
        let reported = report(|callbacks| {
            compile_all(&[specification], callbacks)
        });
        assert_eq!(
            reported,
            vec![
                "class com/example/Foo",
                "method com/example/Foo.run:(Ljava/lang/String;)V",
                "attribute com/example/Foo.run:(Ljava/lang/String;)V LineNumberTable",
            ]
        );
    }

    #[test]
    fn wildcarded_member_descriptors() {
        let specification = ClassSpecification::named("com/example/Foo").with_field(
            MemberSpecification {
                descriptor: Some(String::from("Ljava/**;")),
                ..MemberSpecification::any()
            },
        );
        let reported = report(|callbacks| {
            compile_all(&[specification], callbacks)
        });
        assert_eq!(
            reported,
            vec!["class com/example/Foo", "field com/example/Foo.label:Ljava/lang/String;"]
        );
    }

    #[test]
    fn supertypes_and_access_flags() {
        let specification = ClassSpecification {
            required_set_access_flags: ClassAccessFlags::FINAL,
            ..ClassSpecification::default().extending("com/example/*")
        };
        let reported = report(|callbacks| {
            compile_all(&[specification], callbacks)
        });
        assert_eq!(reported, vec!["class com/example/Bar"]);
    }

    #[test]
    fn composite_reports_once_per_specification() {
        let specifications = [
            ClassSpecification::named("com/example/Foo"),
            ClassSpecification::named("com/example/F*"),
        ];
        let reported = report(|callbacks| {
            let traversal = compile_all(&specifications, callbacks);
            assert!(matches!(&traversal, Traversal::Composite(children) if children.len() == 2));
            traversal
        });
        assert_eq!(
            reported,
            vec!["class com/example/Foo", "class com/example/Foo"]
        );
    }

    #[test]
    fn keep_class_members_does_not_report_classes() {
        let keep = KeepClassSpecification::new(
            ClassSpecification::named("com/example/Foo").with_field(member("count")),
            KeepPolicy::KEEP_CLASS_MEMBERS,
        );
        let reported = report(|callbacks| compile_keep(&keep, callbacks).unwrap());
        assert_eq!(reported, vec!["field com/example/Foo.count:I"]);
    }

    #[test]
    fn keep_classes_with_members_requires_every_member() {
        let keep = |field: &str| {
            KeepClassSpecification::new(
                ClassSpecification::named("com/example/Foo")
                    .with_field(member("count"))
                    .with_field(member(field)),
                KeepPolicy::KEEP_CLASSES_WITH_MEMBERS,
            )
        };
        let reported = report(|callbacks| compile_keep(&keep("missing"), callbacks).unwrap());
        assert!(reported.is_empty());

        let reported = report(|callbacks| compile_keep(&keep("label"), callbacks).unwrap());
        assert_eq!(reported.len(), 3);
    }

    #[test]
    fn keep_descriptor_classes() {
        let keep = KeepClassSpecification::new(
            ClassSpecification::named("com/example/Foo").with_method(member("run")),
            KeepPolicy {
                mark_classes: false,
                mark_descriptor_classes: true,
                ..KeepPolicy::KEEP
            },
        );
        let reported = report(|callbacks| compile_keep(&keep, callbacks).unwrap());
        assert_eq!(
            reported,
            vec![
                "method com/example/Foo.run:(Ljava/lang/String;)V",
                "class java/lang/String",
            ]
        );
    }

    #[test]
    fn compile_errors_carry_context() {
        let specification = ClassSpecification::named("com/example/Foo").with_method(
            MemberSpecification {
                descriptor: Some(String::from("(*)V")),
                ..member("run")
            },
        );
        let (_, errors) = compile(&[specification], Callbacks::new(), &WildcardScope::new());
        let error = &errors[0];
        assert_eq!(error.field, SpecificationField::MethodDescriptor);
        assert_eq!(error.error.pattern(), "(*)V");
        assert!(error.specification.contains("com/example/Foo"));
    }

    #[test]
    fn bad_specification_leaves_the_others_compiled() {
        let specifications = [
            ClassSpecification::named("com/example/Foo"),
            ClassSpecification::named("com/<1>/Bad"),
            ClassSpecification::named("com/example/Bar"),
        ];
        let mut errors = vec![];
        let reported = report(|callbacks| {
            let (traversal, compile_errors) =
                compile(&specifications, callbacks, &WildcardScope::new());
            errors = compile_errors;
            assert!(matches!(&traversal, Traversal::Composite(children) if children.len() == 2));
            traversal
        });
        assert_eq!(reported, vec!["class com/example/Foo", "class com/example/Bar"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, SpecificationField::ClassName);
        assert!(errors[0].specification.contains("com/<1>/Bad"));
    }

    #[test]
    fn members_are_examined_only_when_needed() {
        let specification = || {
            ClassSpecification::named("com/example/Foo").with_field(member("count"))
        };
        let descends = |callbacks: Callbacks<'_>| match compile_all(&[specification()], callbacks)
        {
            Traversal::DirectLookup(traversal) => traversal.descends_to_members(),
            other => panic!("unexpected traversal {:?}", other),
        };
        assert!(!descends(Callbacks::new()));
        assert!(!descends(Callbacks::new().on_class(|_| ())));
        assert!(descends(Callbacks::new().on_field(|_| ())));
        assert!(descends(Callbacks::new().on_attribute(|_, _| ())));

        let keep =
            KeepClassSpecification::new(specification(), KeepPolicy::KEEP_CLASSES_WITH_MEMBERS);
        match compile_keep(&keep, Callbacks::new().on_class(|_| ())).unwrap() {
            Traversal::DirectLookup(traversal) => assert!(traversal.descends_to_members()),
            other => panic!("unexpected traversal {:?}", other),
        }
    }
}
