use super::traversal::{ClassTraversal, MemberMatches, Reporting};
use super::{Callbacks, Captures, CompileError, Traversal, WildcardScope};
use crate::jvm::{ClassData, ClassPool};
use crate::spec::ClassSpecification;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Dependent specification guarded by a condition
///
/// The dependent specification is evaluated once for every class the condition matches, starting
/// from the captures of that condition match. If nothing matches the condition, nothing is
/// reported.
pub struct ConditionalTraversal<'c> {
    condition: ClassTraversal<'c>,
    dependent: ClassTraversal<'c>,
}

impl<'c> ConditionalTraversal<'c> {
    /// Compile the condition, then the dependent specification, in the same scope
    pub(crate) fn compile(
        condition: &ClassSpecification,
        dependent: &ClassSpecification,
        callbacks: Rc<RefCell<Callbacks<'c>>>,
        reporting: Reporting,
        require_members: bool,
        scope: &mut WildcardScope,
    ) -> Result<ConditionalTraversal<'c>, CompileError> {
        let condition = ClassTraversal::compile(
            condition,
            Rc::new(RefCell::new(Callbacks::new())),
            Reporting::NONE,
            true,
            scope,
        )?;
        let dependent =
            ClassTraversal::compile(dependent, callbacks, reporting, require_members, scope)?;
        Ok(ConditionalTraversal {
            condition,
            dependent,
        })
    }

    pub fn condition(&self) -> &ClassTraversal<'c> {
        &self.condition
    }

    pub fn dependent(&self) -> &ClassTraversal<'c> {
        &self.dependent
    }

    pub(crate) fn for_each_match<'g>(
        &self,
        pool: &ClassPool<'g>,
        captures: &Captures,
        accept: &mut dyn FnMut(&ClassTraversal<'c>, &'g ClassData<'g>, &MemberMatches<'g>),
    ) {
        self.condition
            .for_each_match(pool, captures, &mut |condition_class, _, condition_captures| {
                log::trace!(
                    "Condition of {} met by {:?}",
                    self.dependent.description(),
                    condition_class
                );
                self.dependent
                    .for_each_match(pool, condition_captures, &mut |class, members, _| {
                        accept(&self.dependent, class, members)
                    });
            });
    }
}

impl<'c> fmt::Debug for ConditionalTraversal<'c> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalTraversal")
            .field("condition", &self.condition)
            .field("dependent", &self.dependent)
            .finish()
    }
}

/// Compile a dependent specification that only applies for classes matching a condition
///
/// The condition is compiled first, so the dependent specification can refer back to its
/// wildcards. The condition requires all of its member specifications to match and reports
/// nothing itself; the dependent specification reports to every callback.
pub fn compile_conditional<'c>(
    condition: &ClassSpecification,
    dependent: &ClassSpecification,
    callbacks: Callbacks<'c>,
    scope: &mut WildcardScope,
) -> Result<Traversal<'c>, CompileError> {
    let conditional = ConditionalTraversal::compile(
        condition,
        dependent,
        Rc::new(RefCell::new(callbacks)),
        Reporting::ALL,
        false,
        scope,
    )?;
    Ok(Traversal::Conditional(conditional))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::{BinaryName, ClassAccessFlags, ClassPoolArenas, Name};

    fn add_classes<'g>(pool: &ClassPool<'g>, names: &[&str]) {
        for name in names {
            let name = BinaryName::from_string(name.to_string()).unwrap();
            pool.add_class(ClassData::new(
                name,
                Some(BinaryName::OBJECT),
                ClassAccessFlags::PUBLIC,
            ));
        }
    }

    fn run(pool: &ClassPool<'_>, condition: &str, dependent: &str) -> Vec<String> {
        let mut reported = vec![];
        {
            let callbacks =
                Callbacks::new().on_class(|class| reported.push(class.name.as_str().to_string()));
            let traversal = compile_conditional(
                &ClassSpecification::named(condition),
                &ClassSpecification::named(dependent),
                callbacks,
                &mut WildcardScope::new(),
            )
            .unwrap();
            assert!(matches!(traversal, Traversal::Conditional(_)));
            traversal.run(pool);
        }
        reported
    }

    #[test]
    fn dependent_uses_condition_captures() {
        let arenas = ClassPoolArenas::new();
        let pool = ClassPool::new(&arenas);
        add_classes(
            &pool,
            &["com/a/Service", "com/a/ServiceImpl", "com/b/Service", "com/c/ServiceImpl"],
        );

        assert_eq!(
            run(&pool, "com/*/Service", "com/<1>/ServiceImpl"),
            vec!["com/a/ServiceImpl"]
        );
    }

    #[test]
    fn dependent_with_back_reference_is_a_direct_lookup() {
        let traversal = compile_conditional(
            &ClassSpecification::named("com/*/Service"),
            &ClassSpecification::named("com/<1>/ServiceImpl"),
            Callbacks::new(),
            &mut WildcardScope::new(),
        )
        .unwrap();
        match traversal {
            Traversal::Conditional(conditional) => {
                assert!(!conditional.condition().is_direct_lookup());
                assert!(conditional.dependent().is_direct_lookup());
            }
            other => panic!("unexpected traversal {:?}", other),
        }
    }

    #[test]
    fn no_condition_match_means_no_report() {
        let arenas = ClassPoolArenas::new();
        let pool = ClassPool::new(&arenas);
        add_classes(&pool, &["com/a/Foo", "com/a/Bar"]);

        assert!(run(&pool, "org/**", "com/**").is_empty());
    }

    #[test]
    fn one_dependent_evaluation_per_condition_match() {
        let arenas = ClassPoolArenas::new();
        let pool = ClassPool::new(&arenas);
        add_classes(&pool, &["com/a/Foo", "com/b/Foo", "com/x/Bar"]);

        assert_eq!(
            run(&pool, "com/*/Foo", "com/x/Bar"),
            vec!["com/x/Bar", "com/x/Bar"]
        );
    }

    #[test]
    fn condition_failing_to_compile_is_reported() {
        let result = compile_conditional(
            &ClassSpecification::named("com/<1>/Foo"),
            &ClassSpecification::named("com/Bar"),
            Callbacks::new(),
            &mut WildcardScope::new(),
        );
        assert!(result.is_err());
    }
}
