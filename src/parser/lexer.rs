//! Lexer for action bodies (the text between `${` and `}`) using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Resolve backslash escapes in a double-quoted string literal
fn unescape(quoted: &str) -> Option<String> {
    let body = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            _ => return None,
        }
    }
    Some(out)
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Delimiters
    #[token("|")]
    Pipe,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(".")]
    Dot,

    // Literals - identifiers must come after keywords
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r"\.[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice()[1..].to_string())]
    Field(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    String(String),

    #[regex(r"`[^`]*`", |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    RawString(String),

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),
}

/// Lex an action body into tokens with spans
///
/// Unrecognized input is yielded as `Err(())` so the parser can reject the
/// whole action.
pub fn lex(input: &str) -> impl Iterator<Item = (Result<Token, ()>, Span)> + '_ {
    Token::lexer(input).spanned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input).map(|(t, _)| t.expect("valid token")).collect()
    }

    #[test]
    fn test_function_call() {
        assert_eq!(
            tokens(r#"today "15:04" "America/New_York""#),
            vec![
                Token::Ident("today".to_string()),
                Token::String("15:04".to_string()),
                Token::String("America/New_York".to_string()),
            ]
        );
    }

    #[test]
    fn test_integers() {
        assert_eq!(
            tokens("today_mins_ago 30 -5"),
            vec![
                Token::Ident("today_mins_ago".to_string()),
                Token::Int(30),
                Token::Int(-5)
            ]
        );
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        let results: Vec<_> = lex("99999999999999999999").map(|(t, _)| t).collect();
        assert_eq!(results, vec![Err(())]);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            tokens(r#""a\"b\tc\\""#),
            vec![Token::String("a\"b\tc\\".to_string())]
        );
    }

    #[test]
    fn test_unknown_escape_is_an_error() {
        let results: Vec<_> = lex(r#""\q""#).map(|(t, _)| t).collect();
        assert_eq!(results, vec![Err(())]);
    }

    #[test]
    fn test_raw_string_keeps_backslashes() {
        assert_eq!(
            tokens(r"`C:\logs\`"),
            vec![Token::RawString(r"C:\logs\".to_string())]
        );
    }

    #[test]
    fn test_pipes_parens_and_dots() {
        assert_eq!(
            tokens("(today_date) | printf . .Name"),
            vec![
                Token::ParenOpen,
                Token::Ident("today_date".to_string()),
                Token::ParenClose,
                Token::Pipe,
                Token::Ident("printf".to_string()),
                Token::Dot,
                Token::Field("Name".to_string()),
            ]
        );
    }

    #[test]
    fn test_booleans_are_keywords() {
        assert_eq!(
            tokens("true false truest"),
            vec![
                Token::True,
                Token::False,
                Token::Ident("truest".to_string())
            ]
        );
    }

    #[test]
    fn test_comment_inside_action_is_an_error() {
        let results: Vec<_> = lex("today_date /* the date */").map(|(t, _)| t).collect();
        assert_eq!(results[0], Ok(Token::Ident("today_date".to_string())));
        assert!(results[1..].iter().any(|t| t.is_err()));
    }

    #[test]
    fn test_spans() {
        let spans: Vec<_> = lex("today  \"x\"").map(|(_, s)| s).collect();
        assert_eq!(spans, vec![0..5, 7..10]);
    }

    #[test]
    fn test_unexpected_character() {
        let results: Vec<_> = lex("today_date # 3").map(|(t, _)| t).collect();
        assert_eq!(
            results,
            vec![Ok(Token::Ident("today_date".to_string())), Err(()), Ok(Token::Int(3))]
        );
    }
}
