//! Compiling specifications into traversals over a class pool
//!
//! Specifications are compiled once, up front, so that malformed patterns are rejected before
//! any class is looked at. The result is a [`Traversal`], which can then be run against any
//! number of class pools.
//!
//! ### Wildcards and back-references
//!
//! Name patterns use `?`, `*` and `**` (see [`NameMatcher`]). Each of those wildcards captures
//! what it matched into a numbered slot, counting from 1 across the whole rule, and `<n>` later
//! in the rule matches exactly what slot `n` captured:
//!
//! ```
//! use keepspec::jvm::*;
//! use keepspec::matching::*;
//! use keepspec::spec::ClassSpecification;
//!
//! let arenas = ClassPoolArenas::new();
//! let pool = ClassPool::new(&arenas);
//! for name in ["com/a/Service", "com/a/ServiceImpl", "com/b/ServiceImpl"] {
//!     let name = BinaryName::from_string(String::from(name)).unwrap();
//!     pool.add_class(ClassData::new(name, Some(BinaryName::OBJECT), ClassAccessFlags::PUBLIC));
//! }
//!
//! let mut kept = vec![];
//! let traversal = compile_conditional(
//!     &ClassSpecification::named("com/*/Service"),
//!     &ClassSpecification::named("com/<1>/ServiceImpl"),
//!     Callbacks::new().on_class(|class| kept.push(class.name.to_string())),
//!     &mut WildcardScope::new(),
//! )
//! .unwrap();
//! traversal.run(&pool);
//! drop(traversal);
//!
//! assert_eq!(kept, vec!["com.a.ServiceImpl"]);
//! ```

mod conditional;
mod descriptor;
mod errors;
mod filter;
mod predicates;
mod traversal;
mod wildcard;

pub use conditional::*;
pub use descriptor::*;
pub use errors::*;
pub use filter::*;
pub use predicates::*;
pub use traversal::{
    compile, compile_keep, AttributeCallback, Callbacks, ClassCallback, ClassTraversal,
    FieldCallback, MethodCallback, Traversal,
};
pub use wildcard::*;
