//! JVM class model that specifications are matched against
//!
//! ### Simple example
//!
//! ```
//! use keepspec::jvm::*;
//!
//! let arenas = ClassPoolArenas::new();
//! let pool = ClassPool::new(&arenas);
//!
//! let point = pool.add_class(ClassData::new(
//!     BinaryName::from_string(String::from("com/example/Point")).unwrap(),
//!     Some(BinaryName::OBJECT),
//!     ClassAccessFlags::PUBLIC,
//! ));
//! pool.add_field(FieldData::new(
//!     point,
//!     UnqualifiedName::from_string(String::from("x")).unwrap(),
//!     FieldType::int(),
//!     FieldAccessFlags::PUBLIC | FieldAccessFlags::FINAL,
//! ));
//! pool.add_method(MethodData::new(
//!     point,
//!     UnqualifiedName::INIT,
//!     MethodDescriptor::parse("(II)V").unwrap(),
//!     MethodAccessFlags::PUBLIC,
//! ));
//!
//! assert!(pool.lookup_class("com/example/Point").is_some());
//! assert_eq!(point.methods_named("<init>").count(), 1);
//! ```

mod access_flags;
mod class_pool;
mod descriptors;
mod names;

pub use access_flags::*;
pub use class_pool::*;
pub use descriptors::*;
pub use names::*;
