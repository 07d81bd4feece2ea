use super::lexer::{tokenize, Token, TokenKind};
use super::{java_method_to_descriptor, java_type_to_descriptor, Error, ANY_ARGUMENTS, ANY_TYPE};
use crate::jvm::{
    internal_class_name, ClassAccessFlags, CLASS_MODIFIERS, MEMBER_MODIFIERS,
    MEMBER_MODIFIER_ALIASES,
};
use crate::spec::{
    ArchiveType, ClassPath, ClassPathEntry, ClassSpecification, Configuration,
    KeepClassSpecification, KeepPolicy, MemberSpecification, FILTER_SLOTS,
};
use std::fs;
use std::path::Path;

/// Read a configuration from a rule text file
pub fn read_configuration(path: &Path) -> Result<Configuration, Error> {
    let text = fs::read_to_string(path)?;
    parse_configuration(&text)
}

/// Parse a configuration from rule text
pub fn parse_configuration(text: &str) -> Result<Configuration, Error> {
    let tokens = tokenize(text)?;
    let mut parser = Parser {
        tokens: &tokens,
        position: 0,
    };
    let mut configuration = Configuration::new();
    parser.parse_options(&mut configuration)?;
    log::debug!(
        "Parsed {} keep rules, {} program entries, {} library entries",
        configuration.keep.len(),
        configuration.program_jars.entries.len(),
        configuration.library_jars.entries.len()
    );
    Ok(configuration)
}

/// Keep options and the policy each one starts from
const KEEP_OPTIONS: &[(&str, KeepPolicy, bool)] = &[
    ("-keep", KeepPolicy::KEEP, false),
    ("-keepclassmembers", KeepPolicy::KEEP_CLASS_MEMBERS, false),
    ("-keepclasseswithmembers", KeepPolicy::KEEP_CLASSES_WITH_MEMBERS, false),
    ("-keepnames", KeepPolicy::KEEP, true),
    ("-keepclassmembernames", KeepPolicy::KEEP_CLASS_MEMBERS, true),
    ("-keepclasseswithmembernames", KeepPolicy::KEEP_CLASSES_WITH_MEMBERS, true),
];

struct Parser<'t> {
    tokens: &'t [Token],
    position: usize,
}

impl<'t> Parser<'t> {
    /// Next token that isn't a comment, without consuming anything
    fn peek(&self) -> Option<&'t Token> {
        let tokens: &'t [Token] = self.tokens;
        tokens[self.position..]
            .iter()
            .find(|token| !matches!(token.kind, TokenKind::Comment(_)))
    }

    fn next(&mut self) -> Option<&'t Token> {
        let tokens: &'t [Token] = self.tokens;
        while let Some(token) = tokens.get(self.position) {
            self.position += 1;
            if !matches!(token.kind, TokenKind::Comment(_)) {
                return Some(token);
            }
        }
        None
    }

    fn peek_delimiter(&self, delimiter: char) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Delimiter(c), .. }) if *c == delimiter)
    }

    fn peek_word(&self) -> Option<&'t str> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Word(word),
                ..
            }) => Some(word.as_str()),
            _ => None,
        }
    }

    /// Consume the delimiter if it is next
    fn eat_delimiter(&mut self, delimiter: char) -> bool {
        let found = self.peek_delimiter(delimiter);
        if found {
            self.next();
        }
        found
    }

    fn expect_delimiter(&mut self, delimiter: char, expected: &'static str) -> Result<(), Error> {
        match self.next() {
            Some(Token {
                kind: TokenKind::Delimiter(c),
                ..
            }) if *c == delimiter => Ok(()),
            Some(token) => Err(unexpected(token, expected)),
            None => Err(Error::UnexpectedEnd { expected }),
        }
    }

    fn expect_word(&mut self, expected: &'static str) -> Result<(&'t str, usize), Error> {
        match self.next() {
            Some(Token {
                kind: TokenKind::Word(word),
                line,
            }) => Ok((word.as_str(), *line)),
            Some(token) => Err(unexpected(token, expected)),
            None => Err(Error::UnexpectedEnd { expected }),
        }
    }

    /// Consume the comment lines directly ahead
    fn take_comments(&mut self) -> Option<String> {
        let tokens: &'t [Token] = self.tokens;
        let mut lines = vec![];
        while let Some(Token {
            kind: TokenKind::Comment(comment),
            ..
        }) = tokens.get(self.position)
        {
            lines.push(comment.as_str());
            self.position += 1;
        }
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    fn parse_options(&mut self, configuration: &mut Configuration) -> Result<(), Error> {
        loop {
            let comments = self.take_comments();
            let (option, line) = match self.peek() {
                None => return Ok(()),
                Some(_) => self.expect_word("an option")?,
            };

            match option {
                "-injars" => self.parse_class_path(&mut configuration.program_jars, false)?,
                "-outjars" => self.parse_class_path(&mut configuration.program_jars, true)?,
                "-libraryjars" => self.parse_class_path(&mut configuration.library_jars, false)?,
                "-if" => {
                    let condition = self.parse_class_specification(None)?;
                    let (keep_option, line) = self.expect_word("a keep option after '-if'")?;
                    let mut keep = self.parse_keep(keep_option, line, comments)?;
                    keep.condition = Some(condition);
                    configuration.keep.push(keep);
                }
                "-assumenosideeffects" => {
                    let specification = self.parse_class_specification(comments)?;
                    configuration.assume_no_side_effects.push(specification);
                }
                "-whyareyoukeeping" => {
                    let specification = self.parse_class_specification(comments)?;
                    configuration.why_are_you_keeping.push(specification);
                }
                option if option.starts_with("-keep") => {
                    let keep = self.parse_keep(option, line, comments)?;
                    configuration.keep.push(keep);
                }
                option => {
                    return Err(Error::UnknownOption {
                        line,
                        option: option.to_string(),
                    })
                }
            }
        }
    }

    /// `path[(filters)][:path[(filters)]...]`
    fn parse_class_path(&mut self, class_path: &mut ClassPath, output: bool) -> Result<(), Error> {
        loop {
            let (path, _) = self.expect_word("a class path entry")?;
            let mut entry = ClassPathEntry::new(path, output);
            if self.eat_delimiter('(') {
                self.parse_filters(&mut entry)?;
            }
            class_path.add(entry);
            if !self.eat_delimiter(':') {
                return Ok(());
            }
        }
    }

    /// `aab;apk;jmod;aar;zip;ear;war;jar;filter)`, right-aligned so that trailing slots can be
    /// given on their own
    fn parse_filters(&mut self, entry: &mut ClassPathEntry) -> Result<(), Error> {
        let line = self.peek().map_or(0, |token| token.line);
        let mut slots: Vec<Vec<String>> = vec![vec![]];
        loop {
            match self.next() {
                Some(Token {
                    kind: TokenKind::Delimiter(')'),
                    ..
                }) => break,
                Some(Token {
                    kind: TokenKind::Delimiter(';'),
                    ..
                }) => slots.push(vec![]),
                Some(Token {
                    kind: TokenKind::Delimiter(','),
                    ..
                }) => (),
                Some(Token {
                    kind: TokenKind::Delimiter('!'),
                    ..
                }) => {
                    let (element, _) = self.expect_word("a filter after '!'")?;
                    push_element(&mut slots, format!("!{}", element));
                }
                Some(Token {
                    kind: TokenKind::Word(element),
                    ..
                }) => push_element(&mut slots, element.clone()),
                Some(token) => return Err(unexpected(token, "a filter")),
                None => return Err(Error::UnexpectedEnd { expected: "')'" }),
            }
        }

        if slots.len() > FILTER_SLOTS {
            return Err(Error::TooManyFilters {
                line,
                count: slots.len(),
            });
        }
        let first_slot = FILTER_SLOTS - slots.len();
        for (offset, filter) in slots.into_iter().enumerate() {
            let slot = first_slot + offset;
            if slot == FILTER_SLOTS - 1 {
                entry.set_filter(Some(filter));
            } else {
                entry.set_archive_filter(ArchiveType::ALL[slot], Some(filter));
            }
        }
        Ok(())
    }

    /// `-keep[,modifier...] class_specification`
    fn parse_keep(
        &mut self,
        option: &str,
        line: usize,
        comments: Option<String>,
    ) -> Result<KeepClassSpecification, Error> {
        let (mut policy, allow_shrinking) = KEEP_OPTIONS
            .iter()
            .find(|(name, _, _)| *name == option)
            .map(|(_, policy, allow_shrinking)| (*policy, *allow_shrinking))
            .ok_or_else(|| Error::UnknownOption {
                line,
                option: option.to_string(),
            })?;
        policy.allow_shrinking = allow_shrinking;

        while self.eat_delimiter(',') {
            let (modifier, line) = self.expect_word("a keep modifier")?;
            match modifier {
                "includedescriptorclasses" => policy.mark_descriptor_classes = true,
                "includecode" => policy.mark_code_attributes = true,
                "allowshrinking" => policy.allow_shrinking = true,
                "allowoptimization" => policy.allow_optimization = true,
                "allowobfuscation" => policy.allow_obfuscation = true,
                modifier => {
                    return Err(Error::UnknownModifier {
                        line,
                        modifier: modifier.to_string(),
                    })
                }
            }
        }

        let specification = self.parse_class_specification(comments)?;
        Ok(KeepClassSpecification::new(specification, policy))
    }

    /// `[@annotation] [[!]modifier...] [!]class|interface|enum|@interface name
    /// [extends|implements [@annotation] name] [{ members }]`
    fn parse_class_specification(
        &mut self,
        comments: Option<String>,
    ) -> Result<ClassSpecification, Error> {
        let mut specification = ClassSpecification {
            comments,
            ..ClassSpecification::default()
        };
        let mut set = ClassAccessFlags::empty();
        let mut unset = ClassAccessFlags::empty();

        if self.peek_delimiter('@') && self.peek_nth_word(1) != Some("interface") {
            self.next();
            let (annotation, _) = self.expect_word("an annotation type")?;
            specification.annotation_type = Some(internal_class_name(annotation));
        }

        loop {
            let negated = self.eat_delimiter('!');
            let token = self.next().ok_or(Error::UnexpectedEnd {
                expected: "'class', 'interface', 'enum' or '@interface'",
            })?;
            let (flags, keyword_flags) = match &token.kind {
                TokenKind::Delimiter('@') => {
                    let (keyword, line) = self.expect_word("'interface'")?;
                    if keyword != "interface" {
                        return Err(Error::UnexpectedToken {
                            line,
                            found: keyword.to_string(),
                            expected: "'interface'",
                        });
                    }
                    let keyword_flags = if negated {
                        ClassAccessFlags::ANNOTATION
                    } else {
                        ClassAccessFlags::ANNOTATION | ClassAccessFlags::INTERFACE
                    };
                    (None, Some(keyword_flags))
                }
                TokenKind::Word(word) => match word.as_str() {
                    "class" => (None, Some(ClassAccessFlags::empty())),
                    "interface" => (None, Some(ClassAccessFlags::INTERFACE)),
                    "enum" => (None, Some(ClassAccessFlags::ENUM)),
                    word => match lookup(CLASS_MODIFIERS, word) {
                        Some(flag) => (Some(flag), None),
                        None => {
                            return Err(Error::UnknownModifier {
                                line: token.line,
                                modifier: word.to_string(),
                            })
                        }
                    },
                },
                _ => return Err(unexpected(token, "a class modifier or 'class'")),
            };

            if let Some(flag) = flags {
                if negated {
                    unset |= flag;
                } else {
                    set |= flag;
                }
            }
            if let Some(keyword_flags) = keyword_flags {
                if negated {
                    unset |= keyword_flags;
                } else {
                    set |= keyword_flags;
                }
                break;
            }
        }
        specification.required_set_access_flags = set;
        specification.required_unset_access_flags = unset;

        let (class_name, _) = self.expect_word("a class name")?;
        specification.class_name = class_name_pattern(class_name);

        if let Some("extends" | "implements") = self.peek_word() {
            self.next();
            if self.eat_delimiter('@') {
                let (annotation, _) = self.expect_word("an annotation type")?;
                specification.extends_annotation_type = Some(internal_class_name(annotation));
            }
            let (extends, _) = self.expect_word("a class name")?;
            specification.extends_class_name = class_name_pattern(extends);
        }

        if self.eat_delimiter('{') {
            while !self.eat_delimiter('}') {
                self.parse_member(&mut specification)?;
            }
        }

        Ok(specification)
    }

    /// Like [`Self::peek_word`], but `n` non-comment tokens further
    fn peek_nth_word(&self, n: usize) -> Option<&'t str> {
        let tokens: &'t [Token] = self.tokens;
        let token = tokens[self.position..]
            .iter()
            .filter(|token| !matches!(token.kind, TokenKind::Comment(_)))
            .nth(n)?;
        match &token.kind {
            TokenKind::Word(word) => Some(word.as_str()),
            _ => None,
        }
    }

    /// One member, up to and including its `;`
    fn parse_member(&mut self, specification: &mut ClassSpecification) -> Result<(), Error> {
        let mut member = MemberSpecification::any();
        if self.eat_delimiter('@') {
            let (annotation, _) = self.expect_word("an annotation type")?;
            member.annotation_type = Some(internal_class_name(annotation));
        }

        // Modifiers, up to the first word that isn't one
        let (first, line) = loop {
            let negated = self.eat_delimiter('!');
            let (word, line) = self.expect_word("a member")?;
            let flag = lookup(MEMBER_MODIFIERS, word)
                .or_else(|| lookup(MEMBER_MODIFIER_ALIASES, word));
            match flag {
                Some(flag) if negated => member.required_unset_access_flags |= flag,
                Some(flag) => member.required_set_access_flags |= flag,
                None if negated => {
                    return Err(Error::UnknownModifier {
                        line,
                        modifier: word.to_string(),
                    })
                }
                None => break (word, line),
            }
        };

        match first {
            "<fields>" => specification.field_specifications.push(member),
            "<methods>" => specification.method_specifications.push(member),
            "*" if self.peek_delimiter(';') => {
                specification.field_specifications.push(member.clone());
                specification.method_specifications.push(member);
            }
            _ if self.peek_delimiter('(') => {
                // Constructor, written either as `<init>` or as the simple class name
                let arguments = self.parse_arguments()?;
                member.name = Some(String::from("<init>"));
                member.descriptor = Some(method_descriptor(line, "void", &arguments)?);
                specification.method_specifications.push(member);
            }
            java_type => {
                let (name, _) = self.expect_word("a member name")?;
                member.name = member_name_pattern(name);
                if self.peek_delimiter('(') {
                    let arguments = self.parse_arguments()?;
                    member.descriptor = if java_type == ANY_TYPE && arguments == [ANY_ARGUMENTS] {
                        None
                    } else {
                        Some(method_descriptor(line, java_type, &arguments)?)
                    };
                    specification.method_specifications.push(member);
                } else {
                    member.descriptor = if java_type == ANY_TYPE {
                        None
                    } else {
                        let descriptor = java_type_to_descriptor(java_type);
                        Some(descriptor.ok_or_else(|| unsupported(line, java_type))?)
                    };
                    specification.field_specifications.push(member);
                }
            }
        }

        self.expect_delimiter(';', "';' after a member")
    }

    /// `(type, type, ...)`
    fn parse_arguments(&mut self) -> Result<Vec<String>, Error> {
        self.expect_delimiter('(', "'('")?;
        let mut arguments = vec![];
        if self.eat_delimiter(')') {
            return Ok(arguments);
        }
        loop {
            let (argument, _) = self.expect_word("an argument type")?;
            arguments.push(argument.to_string());
            if self.eat_delimiter(')') {
                return Ok(arguments);
            }
            self.expect_delimiter(',', "',' or ')'")?;
        }
    }
}

fn push_element(slots: &mut [Vec<String>], element: String) {
    if let Some(slot) = slots.last_mut() {
        slot.push(element);
    }
}

fn lookup<F: Copy>(table: &[(&str, F)], word: &str) -> Option<F> {
    table
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, flag)| *flag)
}

/// `*` on its own means any class
fn class_name_pattern(class_name: &str) -> Option<String> {
    if class_name == "*" {
        None
    } else {
        Some(internal_class_name(class_name))
    }
}

fn member_name_pattern(name: &str) -> Option<String> {
    if name == "*" {
        None
    } else {
        Some(name.to_string())
    }
}

fn method_descriptor(line: usize, return_type: &str, arguments: &[String]) -> Result<String, Error> {
    java_method_to_descriptor(return_type, arguments).ok_or_else(|| {
        let java_type = format!("{}({})", return_type, arguments.join(","));
        unsupported(line, &java_type)
    })
}

fn unsupported(line: usize, java_type: &str) -> Error {
    Error::UnsupportedType {
        line,
        java_type: java_type.to_string(),
    }
}

fn unexpected(token: &Token, expected: &'static str) -> Error {
    Error::UnexpectedToken {
        line: token.line,
        found: token.text(),
        expected,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::MemberAccessFlags;
    use std::path::PathBuf;

    fn parse_keep(text: &str) -> KeepClassSpecification {
        let mut configuration = parse_configuration(text).unwrap();
        assert_eq!(configuration.keep.len(), 1);
        configuration.keep.remove(0)
    }

    #[test]
    fn class_path_entries() {
        let configuration =
            parse_configuration("-injars in.jar(**.class):lib.jar\n-outjars out.jar").unwrap();
        let entries = &configuration.program_jars.entries;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].file(), PathBuf::from("in.jar"));
        assert_eq!(entries[0].filter(), Some(&[String::from("**.class")][..]));
        assert!(!entries[1].is_filtered());
        assert!(entries[2].is_output());
    }

    #[test]
    fn filters_are_right_aligned() {
        let configuration = parse_configuration("-injars in.jar(!**.zip;a,!b;)").unwrap();
        let entry = &configuration.program_jars.entries[0];
        assert_eq!(entry.filter(), None);
        assert_eq!(
            entry.jar_filter(),
            Some(&[String::from("a"), String::from("!b")][..])
        );
        assert_eq!(
            entry.archive_filter(ArchiveType::War),
            Some(&[String::from("!**.zip")][..])
        );

        let too_many = parse_configuration("-injars in.jar(;;;;;;;;;)");
        assert!(matches!(too_many, Err(Error::TooManyFilters { count: 10, .. })));
    }

    #[test]
    fn keep_options() {
        let keep = parse_keep("-keepnames,includedescriptorclasses class com.example.Foo");
        assert_eq!(
            keep.policy,
            KeepPolicy {
                allow_shrinking: true,
                mark_descriptor_classes: true,
                ..KeepPolicy::KEEP
            }
        );
        assert_eq!(keep.class_specification.class_name.as_deref(), Some("com/example/Foo"));

        let keep = parse_keep("-keepclasseswithmembers class * { native <methods>; }");
        assert_eq!(keep.policy, KeepPolicy::KEEP_CLASSES_WITH_MEMBERS);
        assert_eq!(keep.class_specification.class_name, None);
        let method = &keep.class_specification.method_specifications[0];
        assert_eq!(method.required_set_access_flags, MemberAccessFlags::NATIVE);
        assert_eq!(method.name, None);
    }

    #[test]
    fn class_keywords_and_modifiers() {
        let keep = parse_keep("-keep @com.example.Keep public !final @interface *");
        let specification = keep.class_specification;
        assert_eq!(specification.annotation_type.as_deref(), Some("com/example/Keep"));
        assert_eq!(
            specification.required_set_access_flags,
            ClassAccessFlags::PUBLIC | ClassAccessFlags::ANNOTATION | ClassAccessFlags::INTERFACE
        );
        assert_eq!(specification.required_unset_access_flags, ClassAccessFlags::FINAL);

        let keep = parse_keep("-keep !interface * implements @com.example.Api com.example.**");
        let specification = keep.class_specification;
        assert_eq!(specification.required_unset_access_flags, ClassAccessFlags::INTERFACE);
        assert_eq!(
            specification.extends_annotation_type.as_deref(),
            Some("com/example/Api")
        );
        assert_eq!(specification.extends_class_name.as_deref(), Some("com/example/**"));
    }

    #[test]
    fn members() {
        let keep = parse_keep(
            "-keep class com.example.Foo {
                 private static final long serialVersionUID;
                 *** get*(...);
                 Foo(java.lang.String[]);
                 public void set*(int);
                 @com.example.Inject *;
                 !bridge <methods>;
             }",
        );
        let specification = keep.class_specification;
        assert_eq!(specification.field_specifications.len(), 2);
        assert_eq!(specification.method_specifications.len(), 5);

        let uid = &specification.field_specifications[0];
        assert_eq!(uid.name.as_deref(), Some("serialVersionUID"));
        assert_eq!(uid.descriptor.as_deref(), Some("J"));

        let getter = &specification.method_specifications[0];
        assert_eq!(getter.name.as_deref(), Some("get*"));
        assert_eq!(getter.descriptor, None);

        let constructor = &specification.method_specifications[1];
        assert_eq!(constructor.name.as_deref(), Some("<init>"));
        assert_eq!(constructor.descriptor.as_deref(), Some("([Ljava/lang/String;)V"));

        let setter = &specification.method_specifications[2];
        assert_eq!(setter.descriptor.as_deref(), Some("(I)V"));

        let injected = &specification.field_specifications[1];
        assert_eq!(injected.annotation_type.as_deref(), Some("com/example/Inject"));
        assert_eq!(
            specification.method_specifications[3].annotation_type.as_deref(),
            Some("com/example/Inject")
        );

        let not_bridge = &specification.method_specifications[4];
        assert_eq!(not_bridge.required_unset_access_flags, MemberAccessFlags::VOLATILE);
    }

    #[test]
    fn conditions_and_comments() {
        let configuration = parse_configuration(
            "# Keep implementations\n# of services\n-if class com.*.Service\n-keep class com.<1>.ServiceImpl\n",
        )
        .unwrap();
        let keep = &configuration.keep[0];
        assert_eq!(
            keep.condition.as_ref().and_then(|condition| condition.class_name.as_deref()),
            Some("com/*/Service")
        );
        assert_eq!(
            keep.class_specification.comments.as_deref(),
            Some("Keep implementations\nof services")
        );
        assert_eq!(
            keep.class_specification.class_name.as_deref(),
            Some("com/<1>/ServiceImpl")
        );
    }

    #[test]
    fn other_options() {
        let configuration = parse_configuration(
            "-assumenosideeffects class android.util.Log { public static *** d(...); }\n\
             -whyareyoukeeping class com.example.Foo",
        );
        let configuration = configuration.unwrap_or_else(|err| panic!("{}", err));
        assert_eq!(configuration.assume_no_side_effects.len(), 1);
        assert_eq!(configuration.why_are_you_keeping.len(), 1);
    }

    #[test]
    fn errors_carry_lines() {
        assert!(matches!(
            parse_configuration("-keep class A\n-dontwarn"),
            Err(Error::UnknownOption { line: 2, .. })
        ));
        assert!(matches!(
            parse_configuration("-keep,allowsomething class A"),
            Err(Error::UnknownModifier { line: 1, .. })
        ));
        assert!(matches!(
            parse_configuration("-keep class A {\n void x;\n}"),
            Err(Error::UnsupportedType { line: 2, .. })
        ));
        assert!(matches!(
            parse_configuration("-keep class A {"),
            Err(Error::UnexpectedEnd { .. })
        ));
    }

    #[test]
    fn partly_wildcarded_method_types_are_rejected() {
        match parse_configuration("-keep class A {\n    *** get*();\n}") {
            Err(Error::UnsupportedType { line, java_type }) => {
                assert_eq!(line, 2);
                assert_eq!(java_type, "***()");
            }
            other => panic!("unexpected result {:?}", other),
        }
        match parse_configuration("-keep class A {\n    void set*(...);\n}") {
            Err(Error::UnsupportedType { line, java_type }) => {
                assert_eq!(line, 2);
                assert_eq!(java_type, "void(...)");
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(parse_configuration("-keep class A {\n    *** get*(...);\n}").is_ok());
    }

    #[test]
    fn annotated_supertype_of_any_name() {
        let configuration = parse_configuration("-keep class * extends @com.example.Api *").unwrap();
        let specification = &configuration.keep[0].class_specification;
        assert_eq!(
            specification.extends_annotation_type.as_deref(),
            Some("com/example/Api")
        );
        assert_eq!(specification.extends_class_name, None);
    }
}
