use keepspec::config::{parse_configuration, write_configuration};
use keepspec::jvm::*;
use keepspec::matching::*;
use keepspec::spec::*;
use proptest::prelude::*;
use std::cell::RefCell;

fn binary_name(name: &str) -> BinaryName {
    BinaryName::from_string(name.to_string()).unwrap()
}

fn add_class<'g>(pool: &ClassPool<'g>, name: &str, flags: ClassAccessFlags) -> &'g ClassData<'g> {
    pool.add_class(ClassData::new(binary_name(name), Some(BinaryName::OBJECT), flags))
}

/// Names of the classes a traversal reports, in report order
fn reported_classes<'c>(
    pool: &ClassPool<'_>,
    build: impl FnOnce(Callbacks<'c>) -> Traversal<'c>,
    reported: &'c RefCell<Vec<String>>,
) {
    let callbacks =
        Callbacks::new().on_class(|class| reported.borrow_mut().push(class.name.to_string()));
    build(callbacks).run(pool);
}

#[test]
fn flagged_literal_class_is_looked_up_and_reported_once() {
    let arenas = ClassPoolArenas::new();
    let pool = ClassPool::new(&arenas);
    add_class(&pool, "Feature Name", ClassAccessFlags::PUBLIC);
    add_class(&pool, "Other", ClassAccessFlags::PUBLIC);

    let specification = ClassSpecification {
        required_set_access_flags: ClassAccessFlags::PUBLIC,
        required_unset_access_flags: ClassAccessFlags::PUBLIC,
        ..ClassSpecification::named("Feature Name")
    };

    let mut reported = vec![];
    let (traversal, errors) = compile(
        &[specification],
        Callbacks::new()
            .on_class(|class| reported.push((class.name.to_string(), class.access_flags))),
        &WildcardScope::new(),
    );
    assert!(errors.is_empty());
    assert!(matches!(traversal, Traversal::DirectLookup(_)));
    traversal.run(&pool);
    drop(traversal);

    assert_eq!(
        reported,
        vec![(String::from("Feature Name"), ClassAccessFlags::PUBLIC)]
    );
}

#[test]
fn only_non_empty_filters_filter() {
    let mut entry = ClassPathEntry::new("in.jar", false);
    entry.set_jar_filter(Some(vec![String::from("foo")]));
    assert!(entry.is_filtered());

    entry.set_jar_filter(Some(vec![]));
    assert!(!entry.is_filtered());

    entry.set_jar_filter(None);
    assert!(!entry.is_filtered());
}

#[test]
fn jar_filter_renders_every_slot() {
    let mut entry = ClassPathEntry::new("path", false);
    entry.set_jar_filter(Some(vec![String::from("foo")]));
    let mut configuration = Configuration::new();
    configuration.program_jars.add(entry);

    let text = write_configuration(&configuration).unwrap();
    assert!(text.contains("-injars path(;;;;;;;foo;)"));
    assert_eq!(parse_configuration(&text).unwrap(), configuration);
}

#[test]
fn conditional_keep_rule_from_text() {
    let arenas = ClassPoolArenas::new();
    let pool = ClassPool::new(&arenas);
    add_class(&pool, "com/a/Service", ClassAccessFlags::PUBLIC | ClassAccessFlags::INTERFACE);
    add_class(&pool, "com/a/ServiceImpl", ClassAccessFlags::PUBLIC);
    add_class(&pool, "com/b/ServiceImpl", ClassAccessFlags::PUBLIC);
    add_class(&pool, "com/c/Service", ClassAccessFlags::PUBLIC);
    add_class(&pool, "com/c/ServiceImpl", ClassAccessFlags::PUBLIC);

    let configuration = parse_configuration(
        "-if interface com.*.Service\n\
         -keep class com.<1>.ServiceImpl",
    )
    .unwrap();

    let reported = RefCell::new(vec![]);
    reported_classes(
        &pool,
        |callbacks| compile_keep(&configuration.keep[0], callbacks).unwrap(),
        &reported,
    );
    assert_eq!(reported.into_inner(), vec!["com.a.ServiceImpl"]);
}

#[test]
fn unmet_condition_reports_nothing() {
    let arenas = ClassPoolArenas::new();
    let pool = ClassPool::new(&arenas);
    add_class(&pool, "com/a/ServiceImpl", ClassAccessFlags::PUBLIC);

    let mut reports = 0;
    let traversal = compile_conditional(
        &ClassSpecification::named("com/*/Service"),
        &ClassSpecification::default(),
        Callbacks::new()
            .on_class(|_| reports += 1)
            .on_field(|_| panic!("no field should be reported"))
            .on_method(|_| panic!("no method should be reported")),
        &mut WildcardScope::new(),
    )
    .unwrap();
    traversal.run(&pool);
    drop(traversal);
    assert_eq!(reports, 0);
}

#[test]
fn literal_specifications_are_deterministic() {
    let arenas = ClassPoolArenas::new();
    let pool = ClassPool::new(&arenas);
    for name in ["com/example/A", "com/example/B", "com/example/C"] {
        add_class(&pool, name, ClassAccessFlags::PUBLIC);
    }
    let specifications = [
        ClassSpecification::named("com/example/C"),
        ClassSpecification::named("com/example/A"),
    ];

    let runs: Vec<Vec<String>> = (0..2)
        .map(|_| {
            let reported = RefCell::new(vec![]);
            reported_classes(
                &pool,
                |callbacks| compile(&specifications, callbacks, &WildcardScope::new()).0,
                &reported,
            );
            reported.into_inner()
        })
        .collect();
    assert_eq!(runs[0], vec!["com.example.C", "com.example.A"]);
    assert_eq!(runs[0], runs[1]);
}

#[test]
fn keep_classes_with_members_from_text() {
    let arenas = ClassPoolArenas::new();
    let pool = ClassPool::new(&arenas);
    let main = add_class(&pool, "com/example/Main", ClassAccessFlags::PUBLIC);
    add_class(&pool, "com/example/Helper", ClassAccessFlags::PUBLIC);
    pool.add_method(MethodData::new(
        main,
        UnqualifiedName::from_string(String::from("main")).unwrap(),
        MethodDescriptor::parse("([Ljava/lang/String;)V").unwrap(),
        MethodAccessFlags::PUBLIC | MethodAccessFlags::STATIC,
    ));

    let configuration = parse_configuration(
        "-keepclasseswithmembers public class * {\n    \
             public static void main(java.lang.String[]);\n\
         }",
    )
    .unwrap();

    let reported = RefCell::new(vec![]);
    let traversal = compile_keep(
        &configuration.keep[0],
        Callbacks::new()
            .on_class(|class| reported.borrow_mut().push(format!("{:?}", class)))
            .on_method(|method| reported.borrow_mut().push(format!("{:?}", method))),
    )
    .unwrap();
    assert!(matches!(traversal, Traversal::FullScan(_)));
    traversal.run(&pool);
    drop(traversal);

    assert_eq!(
        reported.into_inner(),
        vec![
            "com/example/Main",
            "com/example/Main.main:([Ljava/lang/String;)V"
        ]
    );
}

proptest! {
    #[test]
    fn back_reference_picks_the_captured_package(packages in prop::collection::btree_set("[a-z]{1,6}", 1..5)) {
        let arenas = ClassPoolArenas::new();
        let pool = ClassPool::new(&arenas);
        let packages: Vec<String> = packages.into_iter().collect();
        add_class(&pool, &format!("com/{}/Foo", packages[0]), ClassAccessFlags::PUBLIC);
        for package in &packages {
            add_class(&pool, &format!("com/{}/Bar", package), ClassAccessFlags::PUBLIC);
        }

        let mut reported = vec![];
        let traversal = compile_conditional(
            &ClassSpecification::named("com/*/Foo"),
            &ClassSpecification::named("com/<1>/Bar"),
            Callbacks::new().on_class(|class| reported.push(class.name.as_str().to_string())),
            &mut WildcardScope::new(),
        )
        .unwrap();
        traversal.run(&pool);
        drop(traversal);

        prop_assert_eq!(reported, vec![format!("com/{}/Bar", packages[0])]);
    }
}
