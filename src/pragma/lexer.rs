use logos::Logos;

/// Tokens of a version constraint expression such as `>=0.4.19 <0.7.0 || ^0.8`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub(crate) enum Token {
    #[token(">=")]
    GreaterEq,
    #[token("<=")]
    LessEq,
    #[token(">")]
    Greater,
    #[token("<")]
    Less,
    #[token("=")]
    Exact,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("||")]
    Or,
    /// `0.8.21`, `0.8`, `0.8.x`, `0.8.*`
    #[regex(r"[0-9]+(\.([0-9]+|[xX*]))*")]
    Version,
}

impl Token {
    /// The comparator prefix understood by `semver`.
    pub(crate) fn operator(self) -> Option<&'static str> {
        match self {
            Token::GreaterEq => Some(">="),
            Token::LessEq => Some("<="),
            Token::Greater => Some(">"),
            Token::Less => Some("<"),
            Token::Exact => Some("="),
            Token::Caret => Some("^"),
            Token::Tilde => Some("~"),
            Token::Or | Token::Version => None,
        }
    }
}

/// Tokenize `expression`, returning the byte offset of the first unknown character on failure.
pub(crate) fn tokenize(expression: &str) -> Result<Vec<(Token, &str)>, usize> {
    let mut lexer = Token::lexer(expression);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next() {
        match token {
            Ok(token) => tokens.push((token, lexer.slice())),
            Err(()) => return Err(lexer.span().start),
        }
    }
    Ok(tokens)
}
