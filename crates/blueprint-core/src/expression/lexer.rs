//! Tokenizer for the expression language.

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    True,
    False,
    LParen,
    RParen,
    Comma,
    Question,
    Colon,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Bang,
    RegexMatch,
    RegexNotMatch,
    In,
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let (token, width) = match (c, next) {
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            (',', _) => (Token::Comma, 1),
            ('?', _) => (Token::Question, 1),
            (':', _) => (Token::Colon, 1),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('/', _) => (Token::Slash, 1),
            ('%', _) => (Token::Percent, 1),
            ('=', Some('=')) => (Token::EqEq, 2),
            ('=', Some('~')) => (Token::RegexMatch, 2),
            ('!', Some('=')) => (Token::NotEq, 2),
            ('!', Some('~')) => (Token::RegexNotMatch, 2),
            ('!', _) => (Token::Bang, 1),
            ('<', Some('=')) => (Token::Le, 2),
            ('<', _) => (Token::Lt, 1),
            ('>', Some('=')) => (Token::Ge, 2),
            ('>', _) => (Token::Gt, 1),
            ('&', Some('&')) => (Token::AndAnd, 2),
            ('|', Some('|')) => (Token::OrOr, 2),
            ('\'' | '"', _) => {
                let (s, width) = read_string(&chars[i..])?;
                (Token::Str(s), width)
            }
            (d, _) if d.is_ascii_digit() || (d == '.' && next.is_some_and(|n| n.is_ascii_digit())) => {
                let (n, width) = read_number(&chars[i..])?;
                (Token::Number(n), width)
            }
            (a, _) if a.is_alphabetic() || a == '_' => {
                let width = chars[i..]
                    .iter()
                    .take_while(|ch| ch.is_alphanumeric() || **ch == '_')
                    .count();
                let word: String = chars[i..i + width].iter().collect();
                let token = match word.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    "in" | "IN" => Token::In,
                    _ => Token::Ident(word),
                };
                (token, width)
            }
            (other, _) => return Err(format!("unexpected character '{other}' at position {i}")),
        };

        tokens.push(token);
        i += width;
    }

    Ok(tokens)
}

/// Reads a quoted string. Known escapes are unescaped; unknown ones such as
/// `\S` are kept verbatim so regex patterns survive.
fn read_string(chars: &[char]) -> Result<(String, usize), String> {
    let quote = chars[0];
    let mut out = String::new();
    let mut i = 1;

    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                match chars[i + 1] {
                    '\\' => out.push('\\'),
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    q if q == quote => out.push(q),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
                i += 2;
            }
            c if c == quote => return Ok((out, i + 1)),
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    Err("unterminated string literal".into())
}

fn read_number(chars: &[char]) -> Result<(f64, usize), String> {
    let width = chars
        .iter()
        .take_while(|c| c.is_ascii_digit() || **c == '.')
        .count();
    let text: String = chars[..width].iter().collect();
    text.parse::<f64>()
        .map(|n| (n, width))
        .map_err(|_| format!("invalid number '{text}'"))
}
