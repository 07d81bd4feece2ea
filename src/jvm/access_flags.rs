use bitflags::bitflags;

bitflags! {
    /// Access flags on classes
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.1-200-E.1
    #[derive(Default)]
    pub struct ClassAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
    }
}

bitflags! {
    /// Access flags on methods
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.6-200-A.1
    #[derive(Default)]
    pub struct MethodAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
    }
}

bitflags! {
    /// Access flags on fields
    ///
    /// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.5-200-A.1
    #[derive(Default)]
    pub struct FieldAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const SYNTHETIC = 0x1000;
        const ENUM = 0x4000;
    }
}

bitflags! {
    /// Access flags as seen by a member specification
    ///
    /// Field and method flags share one bit space in the class file format (eg. `VOLATILE` and
    /// `BRIDGE` are both `0x0040`), so a member specification constrains the raw bits and the
    /// names here are only used when reading and writing rules.
    #[derive(Default)]
    pub struct MemberAccessFlags: u16 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ENUM = 0x4000;
    }
}

impl From<FieldAccessFlags> for MemberAccessFlags {
    fn from(flags: FieldAccessFlags) -> MemberAccessFlags {
        MemberAccessFlags::from_bits_truncate(flags.bits())
    }
}

impl From<MethodAccessFlags> for MemberAccessFlags {
    fn from(flags: MethodAccessFlags) -> MemberAccessFlags {
        MemberAccessFlags::from_bits_truncate(flags.bits())
    }
}

/// Keyword used for each class access flag in rule text
pub const CLASS_MODIFIERS: &[(&str, ClassAccessFlags)] = &[
    ("public", ClassAccessFlags::PUBLIC),
    ("final", ClassAccessFlags::FINAL),
    ("abstract", ClassAccessFlags::ABSTRACT),
    ("synthetic", ClassAccessFlags::SYNTHETIC),
];

/// Keyword used for each member access flag in rule text
pub const MEMBER_MODIFIERS: &[(&str, MemberAccessFlags)] = &[
    ("public", MemberAccessFlags::PUBLIC),
    ("private", MemberAccessFlags::PRIVATE),
    ("protected", MemberAccessFlags::PROTECTED),
    ("static", MemberAccessFlags::STATIC),
    ("final", MemberAccessFlags::FINAL),
    ("synchronized", MemberAccessFlags::SYNCHRONIZED),
    ("volatile", MemberAccessFlags::VOLATILE),
    ("transient", MemberAccessFlags::TRANSIENT),
    ("native", MemberAccessFlags::NATIVE),
    ("abstract", MemberAccessFlags::ABSTRACT),
    ("strictfp", MemberAccessFlags::STRICT),
    ("synthetic", MemberAccessFlags::SYNTHETIC),
];

/// Method spellings of bits that [`MEMBER_MODIFIERS`] names after their field meaning
///
/// Accepted when reading, never written.
pub const MEMBER_MODIFIER_ALIASES: &[(&str, MemberAccessFlags)] = &[
    ("bridge", MemberAccessFlags::VOLATILE),
    ("varargs", MemberAccessFlags::TRANSIENT),
];
