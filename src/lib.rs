//! Matching class and member specifications against a pool of JVM classes
//!
//! A shrinker or obfuscator is configured with rules like
//!
//! ```text
//! -keep public class com.example.** extends android.app.Activity {
//!     public <init>();
//! }
//! ```
//!
//! Each rule is modelled as a [`spec::ClassSpecification`] (possibly wrapped in a
//! [`spec::KeepClassSpecification`]), compiled once by [`matching`] into a [`matching::Traversal`],
//! and then run against a [`jvm::ClassPool`]. Matches are reported through callbacks, one per
//! matching class and member.
//!
//! Rule text can be read and written with [`config`], [`check`] finds patterns in a configuration
//! that don't compile, and [`seeds`] lists everything a configuration's keep rules match.

pub mod check;
pub mod config;
pub mod jvm;
pub mod matching;
pub mod seeds;
pub mod spec;
