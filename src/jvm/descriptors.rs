use super::{BinaryName, Name};
use std::io::{Error, ErrorKind, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Descriptors that can be written out in class file syntax
pub trait RenderDescriptor {
    fn render(&self) -> String {
        let mut string = String::new();
        self.render_to(&mut string);
        string
    }

    /// Append the descriptor to `out`
    fn render_to(&self, out: &mut String);
}

/// Descriptors that can be read from class file syntax
///
/// The class token type decides how the text between `L` and `;` is read: [`BinaryName`]
/// validates it, while [`String`] keeps it as is (for descriptor patterns with wildcards).
pub trait ParseDescriptor: Sized {
    /// Parse a descriptor, rejecting anything left over after it
    fn parse(source: &str) -> Result<Self> {
        let mut chars = source.chars().peekable();
        let parsed = Self::parse_from(&mut chars)?;
        let rest: String = chars.collect();
        if rest.is_empty() {
            Ok(parsed)
        } else {
            Err(invalid(format!("Trailing input '{}' in '{}'", rest, source)))
        }
    }

    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self>;
}

fn invalid(message: String) -> Error {
    Error::new(ErrorKind::InvalidInput, message)
}

fn truncated(expected: &str) -> Error {
    Error::new(ErrorKind::UnexpectedEof, format!("Descriptor ended, expected {}", expected))
}

/// Primitive types
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

/// Each base type with its descriptor character and its Java keyword
const BASE_TYPES: [(BaseType, char, &str); 8] = [
    (BaseType::Byte, 'B', "byte"),
    (BaseType::Char, 'C', "char"),
    (BaseType::Double, 'D', "double"),
    (BaseType::Float, 'F', "float"),
    (BaseType::Int, 'I', "int"),
    (BaseType::Long, 'J', "long"),
    (BaseType::Short, 'S', "short"),
    (BaseType::Boolean, 'Z', "boolean"),
];

impl BaseType {
    fn entry(self) -> (BaseType, char, &'static str) {
        BASE_TYPES[self as usize]
    }

    /// Keyword for the type in Java source, which is also how rule text spells it
    pub fn java_name(self) -> &'static str {
        self.entry().2
    }

    pub fn from_java_name(name: &str) -> Option<BaseType> {
        BASE_TYPES
            .iter()
            .find(|(_, _, java_name)| *java_name == name)
            .map(|(base_type, _, _)| *base_type)
    }

    fn from_descriptor_char(c: char) -> Option<BaseType> {
        BASE_TYPES
            .iter()
            .find(|(_, descriptor_char, _)| *descriptor_char == c)
            .map(|(base_type, _, _)| *base_type)
    }
}

impl RenderDescriptor for BaseType {
    fn render_to(&self, out: &mut String) {
        out.push(self.entry().1);
    }
}

impl ParseDescriptor for BaseType {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        let c = source.next().ok_or_else(|| truncated("a primitive type"))?;
        BaseType::from_descriptor_char(c)
            .ok_or_else(|| invalid(format!("'{}' is not a primitive type", c)))
    }
}

/// Array of `T`, where `T` is never itself an array
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct ArrayType<T> {
    /// Dimensions past the first, so `int[][]` has one
    pub additional_dimensions: usize,
    pub element_type: T,
}

impl<T> ArrayType<T> {
    pub const fn dimensions(&self) -> usize {
        self.additional_dimensions + 1
    }
}

impl<T: RenderDescriptor> RenderDescriptor for ArrayType<T> {
    fn render_to(&self, out: &mut String) {
        out.extend(std::iter::repeat('[').take(self.dimensions()));
        self.element_type.render_to(out);
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum RefType<Class> {
    Object(Class),
    ObjectArray(ArrayType<Class>),
    PrimitiveArray(ArrayType<BaseType>),
}

impl<C> RefType<C> {
    /// Class named by an object type or by the elements of an object array
    pub fn class(&self) -> Option<&C> {
        match self {
            RefType::Object(class) => Some(class),
            RefType::ObjectArray(array) => Some(&array.element_type),
            RefType::PrimitiveArray(_) => None,
        }
    }
}

impl<C: RenderDescriptor> RenderDescriptor for RefType<C> {
    fn render_to(&self, out: &mut String) {
        match self {
            RefType::Object(class) => class.render_to(out),
            RefType::ObjectArray(array) => array.render_to(out),
            RefType::PrimitiveArray(array) => array.render_to(out),
        }
    }
}

impl<C: ParseDescriptor> ParseDescriptor for RefType<C> {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        let mut dimensions = 0;
        while source.next_if_eq(&'[').is_some() {
            dimensions += 1;
        }
        let is_object = source.peek() == Some(&'L');
        Ok(match (dimensions, is_object) {
            (0, true) => RefType::Object(C::parse_from(source)?),
            (0, false) => return Err(not_a_type(source.peek().copied())),
            (_, true) => RefType::ObjectArray(ArrayType {
                additional_dimensions: dimensions - 1,
                element_type: C::parse_from(source)?,
            }),
            (_, false) => RefType::PrimitiveArray(ArrayType {
                additional_dimensions: dimensions - 1,
                element_type: BaseType::parse_from(source)?,
            }),
        })
    }
}

fn not_a_type(c: Option<char>) -> Error {
    match c {
        Some(c) => invalid(format!("'{}' does not start a type", c)),
        None => truncated("a type"),
    }
}

/// Text of an `L...;` token, up to but not including the `;`
fn read_class_token(source: &mut Peekable<Chars>) -> Result<String> {
    match source.next() {
        Some('L') => (),
        other => return Err(invalid(format!("Expected 'L', found {:?}", other))),
    }
    let mut token = String::new();
    for c in source.by_ref() {
        if c == ';' {
            return Ok(token);
        }
        token.push(c);
    }
    Err(truncated(&format!("';' to close 'L{}'", token)))
}

impl RenderDescriptor for BinaryName {
    fn render_to(&self, out: &mut String) {
        out.push('L');
        out.push_str(self.as_str());
        out.push(';');
    }
}

impl ParseDescriptor for BinaryName {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        BinaryName::from_string(read_class_token(source)?).map_err(invalid)
    }
}

/// Class tokens taken verbatim, wildcards and all
impl RenderDescriptor for String {
    fn render_to(&self, out: &mut String) {
        out.push('L');
        out.push_str(self);
        out.push(';');
    }
}

impl ParseDescriptor for String {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        read_class_token(source)
    }
}

/// Type of a field, parameter or return value
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum FieldType<Class> {
    Base(BaseType),
    Ref(RefType<Class>),
}

impl<C> FieldType<C> {
    pub const fn int() -> FieldType<C> {
        FieldType::Base(BaseType::Int)
    }

    pub const fn object(class: C) -> FieldType<C> {
        FieldType::Ref(RefType::Object(class))
    }

    /// One-dimension-deeper array of `element`
    pub fn array(element: FieldType<C>) -> FieldType<C> {
        let array = match element {
            FieldType::Base(element_type) => RefType::PrimitiveArray(ArrayType {
                additional_dimensions: 0,
                element_type,
            }),
            FieldType::Ref(RefType::Object(element_type)) => RefType::ObjectArray(ArrayType {
                additional_dimensions: 0,
                element_type,
            }),
            FieldType::Ref(RefType::PrimitiveArray(mut array)) => {
                array.additional_dimensions += 1;
                RefType::PrimitiveArray(array)
            }
            FieldType::Ref(RefType::ObjectArray(mut array)) => {
                array.additional_dimensions += 1;
                RefType::ObjectArray(array)
            }
        };
        FieldType::Ref(array)
    }

    pub fn class(&self) -> Option<&C> {
        match self {
            FieldType::Base(_) => None,
            FieldType::Ref(ref_type) => ref_type.class(),
        }
    }
}

impl<C: RenderDescriptor> RenderDescriptor for FieldType<C> {
    fn render_to(&self, out: &mut String) {
        match self {
            FieldType::Base(base_type) => base_type.render_to(out),
            FieldType::Ref(ref_type) => ref_type.render_to(out),
        }
    }
}

impl<C: ParseDescriptor> ParseDescriptor for FieldType<C> {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        match source.peek().copied() {
            Some('L' | '[') => RefType::parse_from(source).map(FieldType::Ref),
            Some(c) if BaseType::from_descriptor_char(c).is_some() => {
                BaseType::parse_from(source).map(FieldType::Base)
            }
            other => Err(not_a_type(other)),
        }
    }
}

/// Parameter and return types of a method
#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub struct MethodDescriptor<Class> {
    pub parameters: Vec<FieldType<Class>>,
    /// `None` for `void`
    pub return_type: Option<FieldType<Class>>,
}

impl<C> MethodDescriptor<C> {
    /// Classes named by the parameters, then by the return type
    pub fn classes(&self) -> impl Iterator<Item = &C> {
        self.parameters
            .iter()
            .chain(self.return_type.iter())
            .filter_map(FieldType::class)
    }
}

impl<C: RenderDescriptor> RenderDescriptor for MethodDescriptor<C> {
    fn render_to(&self, out: &mut String) {
        out.push('(');
        for parameter in &self.parameters {
            parameter.render_to(out);
        }
        out.push(')');
        match &self.return_type {
            Some(return_type) => return_type.render_to(out),
            None => out.push('V'),
        }
    }
}

impl<C: ParseDescriptor> ParseDescriptor for MethodDescriptor<C> {
    fn parse_from(source: &mut Peekable<Chars>) -> Result<Self> {
        if source.next_if_eq(&'(').is_none() {
            return Err(invalid(String::from("Method descriptors start with '('")));
        }
        let mut parameters = vec![];
        loop {
            match source.peek() {
                Some(')') => break,
                None => return Err(truncated("')' after the parameters")),
                Some(_) => parameters.push(FieldType::parse_from(source)?),
            }
        }
        source.next();
        let return_type = match source.next_if_eq(&'V') {
            Some(_) => None,
            None => Some(FieldType::parse_from(source)?),
        };
        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }
}
