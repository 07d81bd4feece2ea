use super::PatternError;

/// Package separator in internal class names (also the directory separator in filters)
const SEPARATOR: char = '/';

/// Allocates capture slots while the patterns of one rule are compiled
///
/// Every `?`, `*` and `**` in a rule gets the next slot, in the order patterns are compiled. A
/// back-reference `<n>` may only name a slot that has already been allocated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WildcardScope {
    slots: usize,
}

impl WildcardScope {
    pub fn new() -> WildcardScope {
        WildcardScope::default()
    }

    /// Number of slots allocated so far
    pub fn slots(&self) -> usize {
        self.slots
    }

    fn allocate(&mut self) -> usize {
        let slot = self.slots;
        self.slots += 1;
        slot
    }
}

/// Substrings captured while one rule is evaluated against one candidate
///
/// Slots are 0-based here (`<1>` in rule text is slot 0).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Captures {
    values: Vec<Option<String>>,
}

impl Captures {
    pub fn new() -> Captures {
        Captures::default()
    }

    pub fn get(&self, slot: usize) -> Option<&str> {
        self.values.get(slot).and_then(|value| value.as_deref())
    }

    pub fn set(&mut self, slot: usize, value: String) {
        if self.values.len() <= slot {
            self.values.resize(slot + 1, None);
        }
        self.values[slot] = Some(value);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Wildcard {
    /// `?`
    AnyChar,

    /// `*`
    AnyInSegment,

    /// `**`
    Any,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Literal(Vec<char>),
    Wildcard { kind: Wildcard, slot: usize },
    BackReference(usize),
}

/// Compiled name pattern
///
/// Grammar:
///
///   - `?` matches any one character except `/`
///   - `*` matches any run of characters without a `/`
///   - `**` matches any run of characters
///   - `<n>` (with `n` at least 1) matches exactly what the `n`-th wildcard of the rule matched
///   - everything else (including `<init>`) matches itself
///
/// Matching is anchored at both ends and case-sensitive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameMatcher {
    pattern: String,
    tokens: Vec<Token>,
}

impl NameMatcher {
    /// Compile a pattern, allocating capture slots from the rule's scope
    pub fn compile(pattern: &str, scope: &mut WildcardScope) -> Result<NameMatcher, PatternError> {
        let mut tokens: Vec<Token> = vec![];
        let mut literal: Vec<char> = vec![];
        let chars: Vec<char> = pattern.chars().collect();

        let mut idx = 0;
        while idx < chars.len() {
            let wildcard = match chars[idx] {
                '?' => Some((Wildcard::AnyChar, 1)),
                '*' if chars.get(idx + 1) == Some(&'*') => Some((Wildcard::Any, 2)),
                '*' => Some((Wildcard::AnyInSegment, 1)),
                _ => None,
            };
            if let Some((kind, width)) = wildcard {
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                let slot = scope.allocate();
                tokens.push(Token::Wildcard { kind, slot });
                idx += width;
                continue;
            }

            if chars[idx] == '<' {
                let digits = chars[idx + 1..]
                    .iter()
                    .take_while(|c| c.is_ascii_digit())
                    .count();
                if digits > 0 {
                    if chars.get(idx + 1 + digits) != Some(&'>') {
                        return Err(PatternError::UnterminatedBackReference {
                            pattern: pattern.to_string(),
                            offset: idx,
                        });
                    }
                    let digits: String = chars[idx + 1..idx + 1 + digits].iter().collect();
                    let index = digits.parse::<usize>().unwrap_or(usize::MAX);
                    if index == 0 {
                        return Err(PatternError::InvalidBackReference {
                            pattern: pattern.to_string(),
                            index,
                        });
                    }
                    if index > scope.slots() {
                        return Err(PatternError::UnresolvableBackReference {
                            pattern: pattern.to_string(),
                            index,
                            available: scope.slots(),
                        });
                    }
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(Token::BackReference(index - 1));
                    idx += digits.len() + 2;
                    continue;
                }
            }

            literal.push(chars[idx]);
            idx += 1;
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(NameMatcher {
            pattern: pattern.to_string(),
            tokens,
        })
    }

    /// The source pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Pattern has no wildcards or back-references at all
    pub fn is_literal(&self) -> bool {
        self.tokens
            .iter()
            .all(|token| matches!(token, Token::Literal(_)))
    }

    /// Pattern has no wildcards (back-references are fine, since they resolve to one string)
    pub fn is_resolvable(&self) -> bool {
        self.tokens
            .iter()
            .all(|token| !matches!(token, Token::Wildcard { .. }))
    }

    /// Pattern has no wildcards and only refers back to slots below `slots`
    pub fn is_resolvable_with(&self, slots: usize) -> bool {
        self.tokens.iter().all(|token| match token {
            Token::Literal(_) => true,
            Token::BackReference(slot) => *slot < slots,
            Token::Wildcard { .. } => false,
        })
    }

    /// The one string this pattern can match, given the captures so far
    ///
    /// Only defined for resolvable patterns whose back-references have all been captured.
    pub fn resolve(&self, captures: &Captures) -> Option<String> {
        let mut resolved = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(chars) => resolved.extend(chars.iter()),
                Token::BackReference(slot) => resolved.push_str(captures.get(*slot)?),
                Token::Wildcard { .. } => return None,
            }
        }
        Some(resolved)
    }

    /// Test a candidate against the pattern
    ///
    /// On success, the captures of this pattern's wildcards are written into `captures`. On
    /// failure, `captures` is left untouched.
    pub fn test(&self, candidate: &str, captures: &mut Captures) -> bool {
        let mut trial = captures.clone();
        if self.test_into(candidate, &mut trial) {
            *captures = trial;
            true
        } else {
            false
        }
    }

    /// Test a candidate that uses no captures from other patterns
    pub fn matches(&self, candidate: &str) -> bool {
        self.test(candidate, &mut Captures::new())
    }

    /// Like [`Self::test`], but may leave partial captures behind on failure
    pub(crate) fn test_into(&self, candidate: &str, captures: &mut Captures) -> bool {
        if let [Token::Literal(literal)] = self.tokens.as_slice() {
            return literal.iter().copied().eq(candidate.chars());
        }
        let candidate: Vec<char> = candidate.chars().collect();
        Backtracker::new(&self.tokens, &candidate).matches(0, 0, captures)
    }
}

/// Backtracking matcher, trying the shortest expansion of each wildcard first
///
/// Whether the tokens from some index on match the candidate from some offset on usually
/// depends on nothing else, so failures are remembered per `(token, offset)`. The exception is a
/// back-reference to a wildcard earlier in the same pattern: from there on the outcome depends on
/// what that wildcard captured, and nothing is remembered.
struct Backtracker<'a> {
    tokens: &'a [Token],
    candidate: &'a [char],
    memoizable: Vec<bool>,
    failed: Vec<bool>,
}

impl<'a> Backtracker<'a> {
    fn new(tokens: &'a [Token], candidate: &'a [char]) -> Backtracker<'a> {
        let memoizable = (0..=tokens.len())
            .map(|idx| {
                let earlier_slots: Vec<usize> = tokens[..idx]
                    .iter()
                    .filter_map(|token| match token {
                        Token::Wildcard { slot, .. } => Some(*slot),
                        _ => None,
                    })
                    .collect();
                !tokens[idx..].iter().any(|token| {
                    matches!(token, Token::BackReference(slot) if earlier_slots.contains(slot))
                })
            })
            .collect();
        Backtracker {
            tokens,
            candidate,
            memoizable,
            failed: vec![false; (tokens.len() + 1) * (candidate.len() + 1)],
        }
    }

    fn matches(&mut self, token: usize, offset: usize, captures: &mut Captures) -> bool {
        let memo = token * (self.candidate.len() + 1) + offset;
        if self.memoizable[token] && self.failed[memo] {
            return false;
        }
        let matched = self.matches_uncached(token, offset, captures);
        if !matched && self.memoizable[token] {
            self.failed[memo] = true;
        }
        matched
    }

    fn matches_uncached(&mut self, token: usize, offset: usize, captures: &mut Captures) -> bool {
        let (tokens, whole) = (self.tokens, self.candidate);
        let candidate = &whole[offset..];
        let current = match tokens.get(token) {
            None => return candidate.is_empty(),
            Some(current) => current,
        };

        match current {
            Token::Literal(literal) => {
                candidate.starts_with(literal)
                    && self.matches(token + 1, offset + literal.len(), captures)
            }

            Token::BackReference(slot) => {
                let value: Vec<char> = match captures.get(*slot) {
                    Some(value) => value.chars().collect(),
                    None => return false,
                };
                candidate.starts_with(&value)
                    && self.matches(token + 1, offset + value.len(), captures)
            }

            Token::Wildcard { kind, slot } => {
                let (min, max) = match kind {
                    Wildcard::AnyChar => (1, 1),
                    Wildcard::AnyInSegment => (
                        0,
                        candidate.iter().take_while(|c| **c != SEPARATOR).count(),
                    ),
                    Wildcard::Any => (0, candidate.len()),
                };
                if *kind == Wildcard::AnyChar
                    && candidate.first().map_or(true, |c| *c == SEPARATOR)
                {
                    return false;
                }
                for len in min..=max {
                    captures.set(*slot, candidate[..len].iter().collect());
                    if self.matches(token + 1, offset + len, captures) {
                        return true;
                    }
                }
                false
            }
        }
    }
}
