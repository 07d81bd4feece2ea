use super::Error;

/// Characters that end a word (unless quoted)
pub const DELIMITERS: &[char] = &['(', ')', '{', '}', ';', ',', ':', '!', '@', '#'];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Word(String),
    Delimiter(char),

    /// Text of a `#` comment that has a line to itself (without the `#` and one leading space)
    Comment(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    /// How the token looked in the source, for error messages
    pub fn text(&self) -> String {
        match &self.kind {
            TokenKind::Word(word) => word.clone(),
            TokenKind::Delimiter(c) => c.to_string(),
            TokenKind::Comment(comment) => format!("#{}", comment),
        }
    }
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && c != '\'' && c != '"' && !DELIMITERS.contains(&c)
}

/// Does a word have to be quoted to read back as one word?
pub fn needs_quotes(word: &str) -> bool {
    word.is_empty() || !word.chars().all(is_word_char)
}

/// Quote a word if needed
pub fn quote(word: &str) -> String {
    if !needs_quotes(word) {
        word.to_string()
    } else if word.contains('\'') {
        format!("\"{}\"", word)
    } else {
        format!("'{}'", word)
    }
}

/// Split rule text into words, delimiters and comments
pub fn tokenize(text: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = vec![];
    let mut line = 1;
    let mut line_has_tokens = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                line += 1;
                line_has_tokens = false;
            }
            c if c.is_whitespace() => (),
            '#' => {
                let mut comment = String::new();
                while let Some(c) = chars.next_if(|c| *c != '\n') {
                    comment.push(c);
                }
                if !line_has_tokens {
                    let comment = comment.strip_prefix(' ').unwrap_or(&comment);
                    let comment = comment.trim_end_matches('\r').to_string();
                    tokens.push(Token {
                        kind: TokenKind::Comment(comment),
                        line,
                    });
                }
            }
            '\'' | '"' => {
                let quote = c;
                let mut word = String::new();
                loop {
                    match chars.next() {
                        None => return Err(Error::UnterminatedQuote { line }),
                        Some(c) if c == quote => break,
                        Some('\n') => return Err(Error::UnterminatedQuote { line }),
                        Some(c) => word.push(c),
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Word(word),
                    line,
                });
                line_has_tokens = true;
            }
            c if DELIMITERS.contains(&c) => {
                tokens.push(Token {
                    kind: TokenKind::Delimiter(c),
                    line,
                });
                line_has_tokens = true;
            }
            c => {
                let mut word = String::from(c);
                while let Some(c) = chars.next_if(|c| is_word_char(*c)) {
                    word.push(c);
                }
                tokens.push(Token {
                    kind: TokenKind::Word(word),
                    line,
                });
                line_has_tokens = true;
            }
        }
    }

    Ok(tokens)
}
