// RUST CONCEPT: Character-level tokenizer with byte-offset spans
// Turns RawrCat source text into a flat token stream. Nesting is tracked here
// only far enough to tag brackets with their depth; the parser builds the tree.

use std::fmt;
use std::rc::Rc;
use std::str::CharIndices;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use crate::parser::{ParseError, Quotation};
use crate::render::render_token;
use crate::value::Word;

// Byte offsets into the source text: `begin` inclusive, `end` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

// RUST CONCEPT: Closed set of token kinds
// The last two variants never come out of `tokenize`: `Quotation` is built by
// the parser and `Word` is substituted for a `Symbol` by the binder.
#[derive(Debug, Clone)]
pub enum TokenKind {
    String(Rc<str>),
    Integer(i64),
    BigInteger(BigInt), // integer literal too wide for i64
    Float(f64),
    Symbol(Rc<str>),
    BeginQuotation(usize), // payload: nesting depth after the bracket opens
    EndQuotation(usize),   // payload: nesting depth being closed
    Channel(Rc<str>),      // identifier text includes the sigil, e.g. "#jobs"
    Stack(Rc<str>),
    PubSub(Rc<str>),
    Quotation(Rc<Quotation>),
    Word(Word),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render_token(self))
    }
}

fn is_delimiter_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

// Largest power of ten accepted in an exponent-form integer, the same range
// an f64 literal covers
const MAX_EXPONENT: u32 = 308;

// Exponent form without a '.', such as "1e3" or "25e-1"; only texts that
// denote an exact integer qualify
fn exponent_integer(text: &str) -> Option<TokenKind> {
    let (mantissa, exponent) = text.split_once(['e', 'E'])?;
    let mantissa: BigInt = mantissa.parse().ok()?;
    let exponent: i32 = exponent.parse().ok()?;
    if exponent.unsigned_abs() > MAX_EXPONENT {
        return None;
    }
    let scale = BigInt::from(10u32).pow(exponent.unsigned_abs());
    let value = if exponent >= 0 {
        mantissa * scale
    } else if (&mantissa % &scale).is_zero() {
        mantissa / scale
    } else {
        return None;
    };
    Some(match value.to_i64() {
        Some(i) => TokenKind::Integer(i),
        None => TokenKind::BigInteger(value),
    })
}

// Integer if it has no '.' and denotes an integer, Float if it has a '.' and
// parses as f64, otherwise a word name.
fn classify_bare(text: &str) -> TokenKind {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let looks_numeric = unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && unsigned.chars().any(|c| c.is_ascii_digit())
        && unsigned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));

    if looks_numeric {
        if !text.contains('.') {
            if let Ok(i) = text.parse::<i64>() {
                return TokenKind::Integer(i);
            }
            if let Ok(big) = text.parse::<BigInt>() {
                return TokenKind::BigInteger(big);
            }
            if let Some(kind) = exponent_integer(text) {
                return kind;
            }
        } else if let Ok(f) = text.parse::<f64>() {
            return TokenKind::Float(f);
        }
    }

    TokenKind::Symbol(Rc::from(text))
}

struct Tokenizer<'a> {
    input: &'a str,
    chars: CharIndices<'a>,
    tokens: Vec<Token>,
    depth: usize,
    pending: Option<usize>, // start offset of the bare token being accumulated
    sigil: Option<char>,    // '#', '@' or '$' waiting for the next bare token
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices(),
            tokens: Vec::new(),
            depth: 0,
            pending: None,
            sigil: None,
        }
    }

    fn next_char(&mut self) -> Result<(usize, char), ParseError> {
        self.chars.next().ok_or(ParseError::EndOfData)
    }

    // Consume up to and including `target`, returning its offset
    fn seek(&mut self, target: char) -> Result<usize, ParseError> {
        loop {
            let (pos, ch) = self.next_char()?;
            if ch == target {
                return Ok(pos);
            }
        }
    }

    fn flush(&mut self, end: usize) {
        let Some(begin) = self.pending.take() else {
            return;
        };
        let text = &self.input[begin..end];
        let kind = match self.sigil.take() {
            Some('#') => TokenKind::Channel(Rc::from(format!("#{text}"))),
            Some('@') => TokenKind::Stack(Rc::from(format!("@{text}"))),
            Some('$') => TokenKind::PubSub(Rc::from(format!("${text}"))),
            _ => classify_bare(text),
        };
        // The sigil is not part of the span
        self.tokens.push(Token::new(kind, Span::new(begin, end)));
    }

    // Runs until the input is exhausted (Err(EndOfData)) or a real error occurs
    fn run(&mut self) -> Result<(), ParseError> {
        loop {
            let (pos, ch) = self.next_char()?;
            match ch {
                c if is_delimiter_space(c) => self.flush(pos),
                '"' => {
                    self.flush(pos);
                    let close = self.seek('"')?;
                    let text = &self.input[pos + 1..close];
                    self.tokens.push(Token::new(
                        TokenKind::String(Rc::from(text)),
                        Span::new(pos, close + 1),
                    ));
                }
                '(' => {
                    self.flush(pos);
                    self.seek(')')?;
                }
                '[' => {
                    self.flush(pos);
                    self.depth += 1;
                    self.tokens.push(Token::new(
                        TokenKind::BeginQuotation(self.depth),
                        Span::new(pos, pos + 1),
                    ));
                }
                ']' => {
                    self.flush(pos);
                    if self.depth == 0 {
                        return Err(ParseError::UnbalancedQuotation { offset: pos });
                    }
                    self.tokens.push(Token::new(
                        TokenKind::EndQuotation(self.depth),
                        Span::new(pos, pos + 1),
                    ));
                    self.depth -= 1;
                }
                '#' | '@' | '$' => {
                    self.flush(pos);
                    self.sigil = Some(ch);
                }
                _ => {
                    if self.pending.is_none() {
                        self.pending = Some(pos);
                    }
                }
            }
        }
    }

    fn finish(mut self) -> Result<Vec<Token>, ParseError> {
        self.flush(self.input.len());
        if self.depth > 0 {
            return Err(ParseError::UnterminatedQuotation { depth: self.depth });
        }
        Ok(self.tokens)
    }
}

// RUST CONCEPT: EndOfData is a sentinel, not a failure
// Running out of input (even inside an unclosed string or comment) ends the
// stream normally; only an open bracket turns it into UnterminatedQuotation.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokenizer = Tokenizer::new(input);
    match tokenizer.run() {
        Ok(()) | Err(ParseError::EndOfData) => tokenizer.finish(),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_numbers_and_words() {
        let tokens = kinds("2 5 + -3 1.5 -rot .5 1e3");
        assert!(matches!(tokens[0], TokenKind::Integer(2)));
        assert!(matches!(tokens[1], TokenKind::Integer(5)));
        assert!(matches!(&tokens[2], TokenKind::Symbol(s) if &**s == "+"));
        assert!(matches!(tokens[3], TokenKind::Integer(-3)));
        assert!(matches!(tokens[4], TokenKind::Float(f) if f == 1.5));
        assert!(matches!(&tokens[5], TokenKind::Symbol(s) if &**s == "-rot"));
        assert!(matches!(tokens[6], TokenKind::Float(f) if f == 0.5));
        assert!(matches!(tokens[7], TokenKind::Integer(1000)));
    }

    #[test]
    fn test_exponent_without_point_is_integer() {
        let tokens = kinds("2E2 -3e0 25e-1 1200e-2 1e19 1e- 1e999 1.5e2");
        assert!(matches!(tokens[0], TokenKind::Integer(200)));
        assert!(matches!(tokens[1], TokenKind::Integer(-3)));
        assert!(matches!(&tokens[2], TokenKind::Symbol(s) if &**s == "25e-1"));
        assert!(matches!(tokens[3], TokenKind::Integer(12)));
        assert!(matches!(&tokens[4], TokenKind::BigInteger(b) if b.to_string() == "10000000000000000000"));
        assert!(matches!(&tokens[5], TokenKind::Symbol(s) if &**s == "1e-"));
        assert!(matches!(&tokens[6], TokenKind::Symbol(s) if &**s == "1e999"));
        assert!(matches!(tokens[7], TokenKind::Float(f) if f == 150.0));
    }

    #[test]
    fn test_tokenize_big_integer() {
        let tokens = kinds("123456789012345678901234567890");
        assert!(matches!(&tokens[0], TokenKind::BigInteger(b) if b.to_string() == "123456789012345678901234567890"));
    }

    #[test]
    fn test_tokenize_strings_are_verbatim() {
        let tokens = tokenize(r#"say "hello (not a comment) [x]" done"#).unwrap();
        assert_eq!(tokens.len(), 3);
        assert!(matches!(&tokens[1].kind, TokenKind::String(s) if &**s == "hello (not a comment) [x]"));
        assert_eq!(tokens[1].span, Span::new(4, 31));
    }

    #[test]
    fn test_tokenize_string_adjacent_to_word() {
        let tokens = kinds(r#"abc"def"ghi"#);
        assert_eq!(tokens.len(), 3);
        assert!(matches!(&tokens[0], TokenKind::Symbol(s) if &**s == "abc"));
        assert!(matches!(&tokens[1], TokenKind::String(s) if &**s == "def"));
        assert!(matches!(&tokens[2], TokenKind::Symbol(s) if &**s == "ghi"));
    }

    #[test]
    fn test_tokenize_comments_are_skipped() {
        let tokens = kinds("1 ( push one [ ) 2");
        assert_eq!(tokens.len(), 2);
        assert!(matches!(tokens[1], TokenKind::Integer(2)));
    }

    #[test]
    fn test_tokenize_sigils() {
        let tokens = tokenize("#jobs @history $events").unwrap();
        assert!(matches!(&tokens[0].kind, TokenKind::Channel(s) if &**s == "#jobs"));
        assert!(matches!(&tokens[1].kind, TokenKind::Stack(s) if &**s == "@history"));
        assert!(matches!(&tokens[2].kind, TokenKind::PubSub(s) if &**s == "$events"));
        assert_eq!(tokens[0].span, Span::new(1, 5));
    }

    #[test]
    fn test_tokenize_bracket_depths() {
        let tokens = kinds("[ 1 [ 2 ] ]");
        assert!(matches!(tokens[0], TokenKind::BeginQuotation(1)));
        assert!(matches!(tokens[2], TokenKind::BeginQuotation(2)));
        assert!(matches!(tokens[4], TokenKind::EndQuotation(2)));
        assert!(matches!(tokens[5], TokenKind::EndQuotation(1)));
    }

    #[test]
    fn test_brackets_delimit_bare_tokens() {
        let tokens = kinds("[dup]");
        assert_eq!(tokens.len(), 3);
        assert!(matches!(&tokens[1], TokenKind::Symbol(s) if &**s == "dup"));
    }

    #[test]
    fn test_unbalanced_quotation() {
        let result = tokenize("1 2 ] 3");
        assert_eq!(result.unwrap_err(), ParseError::UnbalancedQuotation { offset: 4 });
    }

    #[test]
    fn test_unterminated_quotation() {
        let result = tokenize("[ 1 [ 2 ]");
        assert_eq!(result.unwrap_err(), ParseError::UnterminatedQuotation { depth: 1 });
    }

    #[test]
    fn test_unterminated_string_ends_input() {
        let tokens = kinds("1 2 \"never closed");
        assert_eq!(tokens.len(), 2);

        let result = tokenize("[ \"open");
        assert!(matches!(result, Err(ParseError::UnterminatedQuotation { depth: 1 })));
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("  \n\t ").unwrap().is_empty());
    }
}
