#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// Identifier, keyword or numeric literal.
    Word(String),
    /// Any single punctuation or operator character.
    Symbol(char),
    /// A string, text block or char literal. Contents are dropped.
    Literal,
}

impl Token {
    pub fn word(value: &str) -> Self {
        Self::Word(value.to_owned())
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Lex Java-ish source into tokens, skipping whitespace and comments.
///
/// Unterminated comments and literals run to the end of input.
pub fn tokenize(source: &str) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut cursor = 0;

    while cursor < chars.len() {
        let ch = chars[cursor];
        let next = chars.get(cursor + 1).copied();

        if ch.is_whitespace() {
            cursor += 1;
            continue;
        }

        if ch == '/' && next == Some('/') {
            while cursor < chars.len() && chars[cursor] != '\n' {
                cursor += 1;
            }
            continue;
        }

        if ch == '/' && next == Some('*') {
            cursor += 2;
            while cursor < chars.len() && !(chars[cursor] == '*' && chars.get(cursor + 1) == Some(&'/')) {
                cursor += 1;
            }
            cursor = (cursor + 2).min(chars.len());
            continue;
        }

        if ch == '"' && next == Some('"') && chars.get(cursor + 2) == Some(&'"') {
            cursor += 3;
            while cursor < chars.len() && !chars[cursor..].starts_with(&['"', '"', '"']) {
                cursor += if chars[cursor] == '\\' { 2 } else { 1 };
            }
            cursor = (cursor + 3).min(chars.len());
            tokens.push(Token::Literal);
            continue;
        }

        if ch == '"' || ch == '\'' {
            cursor = skip_quoted(&chars, cursor, ch);
            tokens.push(Token::Literal);
            continue;
        }

        if is_word_char(ch) {
            let start = cursor;
            while cursor < chars.len() && is_word_char(chars[cursor]) {
                cursor += 1;
            }
            tokens.push(Token::Word(chars[start..cursor].iter().collect()));
            continue;
        }

        tokens.push(Token::Symbol(ch));
        cursor += 1;
    }

    tokens
}

/// Return the index just past the closing `quote` of a literal opened at `start`.
fn skip_quoted(chars: &[char], start: usize, quote: char) -> usize {
    let mut cursor = start + 1;
    while cursor < chars.len() {
        match chars[cursor] {
            '\\' => cursor += 2,
            '\n' => return cursor,
            ch if ch == quote => return cursor + 1,
            _ => cursor += 1,
        }
    }
    chars.len()
}
