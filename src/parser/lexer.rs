//! Two stage lexer for node assembly.
//!
//! [`tokenize`] tags every character on its own. [`join`] then merges runs of
//! equal tags into [`Symbol`]s, carrying the literal text. Labels are only
//! recognised once their trailing `:` is seen, so `join` rewrites the symbol
//! it just emitted instead of looking ahead.
//!
//! ```text
//! "LOOP: MOV UP, ACC  # read"
//!   -> Label("LOOP") Text("MOV") Text("UP") Text("ACC") Comment("# read")
//! ```

/// Character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Whitespace,
    Newline,
    Comma,
    Comment,
    Label,
    Number,
    Text,
}

/// A joined run of tokens with its literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub token: Token,
    pub value: String,
}

impl Symbol {
    pub fn new(token: Token, value: impl Into<String>) -> Self {
        Self {
            token,
            value: value.into(),
        }
    }
}

/// Collapse CRLF so every line break is a single character.
fn normalize(input: &str) -> String {
    input.replace("\r\n", "\n")
}

fn classify(c: char) -> Token {
    match c {
        ' ' => Token::Whitespace,
        '\n' => Token::Newline,
        ',' => Token::Comma,
        '#' => Token::Comment,
        ':' => Token::Label,
        '-' | '0'..='9' => Token::Number,
        _ => Token::Text,
    }
}

/// Tag each character of `input`.
///
/// Never fails; empty input gives an empty list.
pub fn tokenize(input: &str) -> Vec<Token> {
    if input.is_empty() {
        return Vec::new();
    }

    normalize(input).chars().map(classify).collect()
}

/// Merge `tokens` (as produced by [`tokenize`] on `input`) into symbols.
///
/// - whitespace runs become a single `" "` symbol
/// - a comment runs from `#` up to the next newline
/// - `:` retags the previously emitted symbol as a label
/// - each newline becomes an empty newline symbol
/// - commas are separators only and produce nothing
pub fn join(tokens: &[Token], input: &str) -> Vec<Symbol> {
    let chars: Vec<char> = normalize(input).chars().collect();
    let literal = |start: usize, end: usize| -> String {
        chars
            .get(start..end)
            .map(|run| run.iter().collect())
            .unwrap_or_default()
    };

    let mut symbols = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];

        match token {
            Token::Whitespace => {
                while i < tokens.len() && tokens[i] == Token::Whitespace {
                    i += 1;
                }
                symbols.push(Symbol::new(Token::Whitespace, " "));
            }
            Token::Text | Token::Number => {
                let start = i;
                while i < tokens.len() && tokens[i] == token {
                    i += 1;
                }
                symbols.push(Symbol::new(token, literal(start, i)));
            }
            Token::Label => {
                // A colon closes the run before it; there is nothing to retag
                // when the colon opens the input.
                if let Some(prior) = symbols.last_mut() {
                    prior.token = Token::Label;
                }
                i += 1;
            }
            Token::Comment => {
                let start = i;
                i += 1;
                while i < tokens.len() && tokens[i] != Token::Newline {
                    i += 1;
                }
                symbols.push(Symbol::new(Token::Comment, literal(start, i)));
            }
            Token::Newline => {
                symbols.push(Symbol::new(Token::Newline, ""));
                i += 1;
            }
            Token::Comma => {
                i += 1;
            }
        }
    }

    symbols
}

/// Full lexing pass: tokenize, join, drop whitespace.
pub fn lex(input: &str) -> Vec<Symbol> {
    let mut symbols = join(&tokenize(input), input);
    symbols.retain(|s| s.token != Token::Whitespace);
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_tokenize_characters() {
        assert_eq!(tokenize(" "), vec![Token::Whitespace]);
        assert_eq!(tokenize("\n"), vec![Token::Newline]);
        assert_eq!(tokenize(","), vec![Token::Comma]);
        assert_eq!(tokenize("#"), vec![Token::Comment]);
        assert_eq!(tokenize(":"), vec![Token::Label]);
        assert_eq!(tokenize("-"), vec![Token::Number]);
        assert_eq!(tokenize("A"), vec![Token::Text]);
        assert_eq!(tokenize("!"), vec![Token::Text]);
    }

    #[test]
    fn test_tokenize_numbers() {
        let tokens = tokenize("0123456789");
        assert_eq!(tokens.len(), 10);
        assert!(tokens.iter().all(|t| *t == Token::Number));
    }

    #[test]
    fn test_tokenize_word() {
        assert_eq!(tokenize("MOV"), vec![Token::Text; 3]);
        assert_eq!(tokenize("A1"), vec![Token::Text, Token::Number]);
    }

    #[test]
    fn test_tokenize_crlf_is_one_newline() {
        assert_eq!(tokenize("A\r\nB"), vec![Token::Text, Token::Newline, Token::Text]);
        assert_eq!(tokenize("A\nB"), tokenize("A\r\nB"));
    }

    #[test]
    fn test_join_whitespace_collapses() {
        for n in 1..10 {
            let input = " ".repeat(n);
            let symbols = join(&tokenize(&input), &input);
            assert_eq!(symbols, vec![Symbol::new(Token::Whitespace, " ")]);
        }
    }

    #[test]
    fn test_join_two_words() {
        let input = "AAA BB";
        let symbols = join(&tokenize(input), input);
        assert_eq!(
            symbols,
            vec![
                Symbol::new(Token::Text, "AAA"),
                Symbol::new(Token::Whitespace, " "),
                Symbol::new(Token::Text, "BB"),
            ]
        );
    }

    #[test]
    fn test_join_negative_number() {
        let input = "-100";
        let symbols = join(&tokenize(input), input);
        assert_eq!(symbols, vec![Symbol::new(Token::Number, "-100")]);
    }

    #[test]
    fn test_join_label() {
        let input = "LOOP:";
        let symbols = join(&tokenize(input), input);
        assert_eq!(symbols, vec![Symbol::new(Token::Label, "LOOP")]);
    }

    #[test]
    fn test_join_label_then_text() {
        let input = "AA: NEG";
        let symbols = join(&tokenize(input), input);
        assert_eq!(
            symbols,
            vec![
                Symbol::new(Token::Label, "AA"),
                Symbol::new(Token::Whitespace, " "),
                Symbol::new(Token::Text, "NEG"),
            ]
        );
    }

    #[test]
    fn test_join_leading_colon_ignored() {
        let input = ":A";
        let symbols = join(&tokenize(input), input);
        assert_eq!(symbols, vec![Symbol::new(Token::Text, "A")]);
    }

    #[test]
    fn test_join_comment_swallows_line() {
        let input = "#AAA MOV 1: ,x";
        let symbols = join(&tokenize(input), input);
        assert_eq!(symbols, vec![Symbol::new(Token::Comment, input)]);
    }

    #[test]
    fn test_join_comment_stops_at_newline() {
        let input = "#note\nNOP";
        let symbols = join(&tokenize(input), input);
        assert_eq!(
            symbols,
            vec![
                Symbol::new(Token::Comment, "#note"),
                Symbol::new(Token::Newline, ""),
                Symbol::new(Token::Text, "NOP"),
            ]
        );
    }

    #[test]
    fn test_join_multiline() {
        let input = "AA\r\nBBB";
        let symbols = join(&tokenize(input), input);
        assert_eq!(
            symbols,
            vec![
                Symbol::new(Token::Text, "AA"),
                Symbol::new(Token::Newline, ""),
                Symbol::new(Token::Text, "BBB"),
            ]
        );
    }

    #[test]
    fn test_lex_strips_whitespace_and_commas() {
        let symbols = lex("MOV 8, ACC");
        assert_eq!(
            symbols,
            vec![
                Symbol::new(Token::Text, "MOV"),
                Symbol::new(Token::Number, "8"),
                Symbol::new(Token::Text, "ACC"),
            ]
        );
    }

    #[test]
    fn test_lex_is_deterministic() {
        let source = "START:\n MOV UP ACC # read\n JGZ START\n";
        assert_eq!(lex(source), lex(source));
    }
}
