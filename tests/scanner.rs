#[cfg(test)]
mod scanner_tests {
    use rox::error::LoxError;
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    fn assert_token_matches(
        result: &Result<Token, LoxError>,
        expected_type: TokenType,
        expected_lexeme: &str,
    ) {
        match result {
            Ok(token) => {
                assert_eq!(
                    token.token_type, expected_type,
                    "Expected token type {:?}, got {:?}",
                    expected_type, token.token_type
                );
                assert_eq!(
                    token.lexeme, expected_lexeme,
                    "Expected lexeme '{}', got '{}'",
                    expected_lexeme, token.lexeme
                );
            }
            Err(e) => panic!("Expected token but got error: {}", e),
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_operators() {
        assert_token_sequence(
            "! != = == < <= > >= /",
            &[
                (TokenType::BANG, "!"),
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL, "="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS, "<"),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER, ">"),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::SLASH, "/"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "var breakable = fun; while (x) break;",
            &[
                (TokenType::VAR, "var"),
                (TokenType::IDENTIFIER, "breakable"),
                (TokenType::EQUAL, "="),
                (TokenType::FUN, "fun"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::WHILE, "while"),
                (TokenType::LEFT_PAREN, "("),
                (TokenType::IDENTIFIER, "x"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::BREAK, "break"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_04_comments_are_skipped() {
        let source = "// line comment\n/* block\n   comment */ print 1; /**/";
        let tokens: Vec<Token> = Scanner::new(source).filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0].token_type, TokenType::PRINT);
        assert_eq!(tokens[0].line, 3);
        assert_eq!(tokens[0].column, 15);
    }

    #[test]
    fn test_scanner_05_literals_carry_values() {
        let tokens: Vec<Token> = Scanner::new("\"hi there\" 12.5 7")
            .filter_map(Result::ok)
            .collect();

        assert_eq!(tokens[0].token_type, TokenType::STRING("hi there".into()));
        assert_eq!(tokens[0].to_string(), "STRING \"hi there\" hi there");
        assert_eq!(tokens[1].to_string(), "NUMBER 12.5 12.5");
        assert_eq!(tokens[2].to_string(), "NUMBER 7 7.0");
        assert_eq!(tokens[3].to_string(), "EOF  null");
    }

    #[test]
    fn test_scanner_06_lines_and_columns() {
        let tokens: Vec<Token> = Scanner::new("a\n  bb\n\"x\ny\" c")
            .filter_map(Result::ok)
            .collect();

        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
        assert_eq!((tokens[2].line, tokens[2].column), (3, 1));
        assert_eq!((tokens[3].line, tokens[3].column), (4, 4));
    }

    #[test]
    fn test_columns_count_characters_not_bytes() {
        let tokens: Vec<Token> = Scanner::new("var s = \"éé\"; print s + 1;")
            .filter_map(Result::ok)
            .collect();

        assert_token_matches(&Ok(tokens[7].clone()), TokenType::PLUS, "+");
        assert_eq!(tokens[7].column, 23);

        let error = Scanner::new("\"é\" $")
            .find_map(|r| r.err())
            .expect("'$' is not a valid character");
        assert_eq!(error.position(), Some((1, 5)));
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let source = ",.$(#";
        let results: Vec<_> = Scanner::new(source).collect();

        // COMMA, DOT, error '$', LEFT_PAREN, error '#', EOF
        assert_eq!(results.len(), 6, "Expected 6 items in result");

        assert_token_matches(&results[0], TokenType::COMMA, ",");
        assert_token_matches(&results[1], TokenType::DOT, ".");
        assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
        assert_token_matches(&results[5], TokenType::EOF, "");

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(
            errors,
            vec![
                "[line 1] Error: Unexpected character: $",
                "[line 1] Error: Unexpected character: #",
            ]
        );
    }

    #[test]
    fn test_non_ascii_character_is_reported_once() {
        let results: Vec<_> = Scanner::new("é;").collect();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_err());
        assert_token_matches(&results[1], TokenType::SEMICOLON, ";");
    }

    #[test]
    fn test_unterminated_string_and_comment() {
        let errors: Vec<String> = Scanner::new("\"open")
            .filter_map(|r| r.err())
            .map(|e| e.to_string())
            .collect();
        assert_eq!(errors, vec!["[line 1] Error: Unterminated string."]);

        let errors: Vec<String> = Scanner::new("/* never\nclosed")
            .filter_map(|r| r.err())
            .map(|e| e.to_string())
            .collect();
        assert_eq!(errors, vec!["[line 1] Error: Unterminated block comment."]);
    }

    #[test]
    fn test_exactly_one_eof() {
        let mut scanner = Scanner::new("");
        assert_token_matches(&scanner.next().unwrap(), TokenType::EOF, "");
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }
}
