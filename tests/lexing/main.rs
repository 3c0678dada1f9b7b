use pretty_assertions::assert_eq;
use proptest::prelude::*;
use stache_lexer::{
    base::SilentHandler,
    collect,
    lexical::{
        delimiters::Delimiters,
        token::{CloseKind, OpenKind, TokenKind},
        ErrorKind, Lexer,
    },
    scan, tokenize, Token,
};

fn summary(input: &str) -> Vec<(TokenKind, String)> {
    collect(input)
        .into_iter()
        .map(|token| (token.kind(), token.into_value()))
        .collect()
}

fn tok(kind: TokenKind, value: &str) -> (TokenKind, String) {
    (kind, value.to_string())
}

fn eof() -> (TokenKind, String) {
    tok(TokenKind::Eof, "")
}

#[test]
fn plain_text_is_a_single_content_token() {
    assert_eq!(
        summary("Hello, world!\nNo mustaches { here }."),
        vec![
            tok(TokenKind::Content, "Hello, world!\nNo mustaches { here }."),
            eof()
        ]
    );
    assert_eq!(summary(""), vec![eof()]);
}

#[test]
fn escaped_open_is_content() {
    assert_eq!(
        summary(r"\{{foo}}"),
        vec![tok(TokenKind::Content, "{{foo}}"), eof()]
    );
    assert_eq!(
        summary(r"a \{{{foo}}} b"),
        vec![
            tok(TokenKind::Content, "a "),
            tok(TokenKind::Content, "{{{foo}}} b"),
            eof()
        ]
    );
}

#[test]
fn escaped_escape_keeps_one_backslash() {
    assert_eq!(
        summary(r"\\{{foo}}"),
        vec![
            tok(TokenKind::Content, r"\"),
            tok(TokenKind::Open(OpenKind::Plain), "{{"),
            tok(TokenKind::Id, "foo"),
            tok(TokenKind::Close(CloseKind::Plain), "}}"),
            eof()
        ]
    );
}

#[test]
fn raw_block_body_is_not_tokenized() {
    assert_eq!(
        summary("{{{{raw}}}}a{{b}}c{{{{/raw}}}}"),
        vec![
            tok(TokenKind::Open(OpenKind::RawBlock), "{{{{"),
            tok(TokenKind::Id, "raw"),
            tok(TokenKind::Close(CloseKind::RawBlock), "}}}}"),
            tok(TokenKind::Content, "a{{b}}c"),
            tok(TokenKind::Open(OpenKind::EndRawBlock), "{{{{/"),
            tok(TokenKind::Id, "raw"),
            tok(TokenKind::Close(CloseKind::RawBlock), "}}}}"),
            eof()
        ]
    );
}

#[test]
fn unclosed_raw_block() {
    assert_eq!(
        summary("{{{{raw}}}} never closed {{/raw}}"),
        vec![
            tok(TokenKind::Open(OpenKind::RawBlock), "{{{{"),
            tok(TokenKind::Id, "raw"),
            tok(TokenKind::Close(CloseKind::RawBlock), "}}}}"),
            tok(TokenKind::Error, "Unclosed raw block"),
        ]
    );
}

#[test]
fn comments_span_both_delimiters() {
    assert_eq!(
        summary("{{! comment }}"),
        vec![tok(TokenKind::Comment, "{{! comment }}"), eof()]
    );
    assert_eq!(
        summary("{{!-- a }} b --}}"),
        vec![tok(TokenKind::Comment, "{{!-- a }} b --}}"), eof()]
    );
    assert_eq!(
        summary("x{{~!-- strip --~}}y"),
        vec![
            tok(TokenKind::Content, "x"),
            tok(TokenKind::Comment, "{{~!-- strip --~}}"),
            tok(TokenKind::Content, "y"),
            eof()
        ]
    );
}

#[test]
fn unclosed_comment() {
    assert_eq!(
        summary("a {{!-- b }}"),
        vec![
            tok(TokenKind::Content, "a "),
            tok(TokenKind::Error, "Unclosed comment")
        ]
    );
}

#[test]
fn delimiter_reassignment() {
    assert_eq!(
        summary("{{=<% %>=}}<%foo%> {{foo}}"),
        vec![
            tok(TokenKind::Open(OpenKind::Plain), "<%"),
            tok(TokenKind::Id, "foo"),
            tok(TokenKind::Close(CloseKind::Plain), "%>"),
            tok(TokenKind::Content, " {{foo}}"),
            eof()
        ]
    );
}

#[test]
fn reassigned_delimiters_support_every_construct() {
    assert_eq!(
        summary("{{= <% %> =}}<%#each items%><%! note %><%{raw}%><%/each%><%={{ }}=%>{{x}}"),
        vec![
            tok(TokenKind::Open(OpenKind::Block), "<%#"),
            tok(TokenKind::Id, "each"),
            tok(TokenKind::Id, "items"),
            tok(TokenKind::Close(CloseKind::Plain), "%>"),
            tok(TokenKind::Comment, "<%! note %>"),
            tok(TokenKind::Open(OpenKind::Unescaped), "<%{"),
            tok(TokenKind::Id, "raw"),
            tok(TokenKind::Close(CloseKind::Unescaped), "}%>"),
            tok(TokenKind::Open(OpenKind::EndBlock), "<%/"),
            tok(TokenKind::Id, "each"),
            tok(TokenKind::Close(CloseKind::Plain), "%>"),
            tok(TokenKind::Open(OpenKind::Plain), "{{"),
            tok(TokenKind::Id, "x"),
            tok(TokenKind::Close(CloseKind::Plain), "}}"),
            eof()
        ]
    );
}

#[test]
fn unescaped_strip_close_follows_delimiters() {
    assert_eq!(
        summary("{{{foo}~}}"),
        vec![
            tok(TokenKind::Open(OpenKind::Unescaped), "{{{"),
            tok(TokenKind::Id, "foo"),
            tok(TokenKind::Close(CloseKind::Unescaped), "}~}}"),
            eof()
        ]
    );
    assert_eq!(
        summary("{{=<% %>=}}<%{foo}~%>"),
        vec![
            tok(TokenKind::Open(OpenKind::Unescaped), "<%{"),
            tok(TokenKind::Id, "foo"),
            tok(TokenKind::Close(CloseKind::Unescaped), "}~%>"),
            eof()
        ]
    );
}

#[test]
fn escaped_custom_open_only_drops_the_backslash() {
    // the escape scan only swallows literal `{`, so `<%` is still opened
    assert_eq!(
        collect(r"{{=<% %>=}}\<%x%>"),
        vec![
            Token::new(TokenKind::Open(OpenKind::Plain), "<%", 12, 1),
            Token::new(TokenKind::Id, "x", 14, 1),
            Token::new(TokenKind::Close(CloseKind::Plain), "%>", 15, 1),
            Token::new(TokenKind::Eof, "", 17, 1),
        ]
    );
}

#[test]
fn custom_initial_delimiters() {
    let delimiters = Delimiters::new("[[", "]]").unwrap();
    let lexer = Lexer::with_delimiters("[[name]] {{name}}", delimiters.clone());
    assert_eq!(lexer.delimiters(), &delimiters);

    let kinds = lexer.map(|token| token.kind()).collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Open(OpenKind::Plain),
            TokenKind::Id,
            TokenKind::Close(CloseKind::Plain),
            TokenKind::Content,
            TokenKind::Eof
        ]
    );
}

#[test]
fn escaped_quotes_in_strings() {
    assert_eq!(
        summary(r#"{{foo "a\"b"}}"#),
        vec![
            tok(TokenKind::Open(OpenKind::Plain), "{{"),
            tok(TokenKind::Id, "foo"),
            tok(TokenKind::String, r#"a"b"#),
            tok(TokenKind::Close(CloseKind::Plain), "}}"),
            eof()
        ]
    );
}

#[test]
fn unclosed_expression_ends_the_stream() {
    let tokens = collect("{{foo");

    assert_eq!(
        tokens,
        vec![
            Token::new(TokenKind::Open(OpenKind::Plain), "{{", 0, 1),
            Token::new(TokenKind::Id, "foo", 2, 1),
            Token::new(TokenKind::Error, "Unclosed expression", 5, 1),
        ]
    );

    let mut source = scan("{{foo");
    assert_eq!(source.by_ref().count(), 3);
    assert_eq!(source.next_token(), None);
}

#[test]
fn block_with_else_chain() {
    let kinds = collect("{{#if a}}x{{else if b}}y{{else}}z{{/if}}")
        .into_iter()
        .map(|token| token.kind())
        .collect::<Vec<_>>();

    assert_eq!(
        kinds,
        vec![
            TokenKind::Open(OpenKind::Block),
            TokenKind::Id,
            TokenKind::Id,
            TokenKind::Close(CloseKind::Plain),
            TokenKind::Content,
            TokenKind::Open(OpenKind::InverseChain),
            TokenKind::Id,
            TokenKind::Id,
            TokenKind::Close(CloseKind::Plain),
            TokenKind::Content,
            TokenKind::Inverse,
            TokenKind::Content,
            TokenKind::Open(OpenKind::EndBlock),
            TokenKind::Id,
            TokenKind::Close(CloseKind::Plain),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn partials_hashes_and_sub_expressions() {
    assert_eq!(
        summary("{{> card title=(upper @root.name) size=12}}"),
        vec![
            tok(TokenKind::Open(OpenKind::Partial), "{{>"),
            tok(TokenKind::Id, "card"),
            tok(TokenKind::Id, "title"),
            tok(TokenKind::Equals, "="),
            tok(TokenKind::OpenSexpr, "("),
            tok(TokenKind::Id, "upper"),
            tok(TokenKind::Data, "@"),
            tok(TokenKind::Id, "root"),
            tok(TokenKind::Sep, "."),
            tok(TokenKind::Id, "name"),
            tok(TokenKind::CloseSexpr, ")"),
            tok(TokenKind::Id, "size"),
            tok(TokenKind::Equals, "="),
            tok(TokenKind::Number, "12"),
            tok(TokenKind::Close(CloseKind::Plain), "}}"),
            eof()
        ]
    );
}

#[test]
fn line_numbers_of_multiline_template() {
    let input = "first line\n{{#each items}}\n  {{! note\n  }}\n  {{name}}\n{{/each}}";
    let lines = collect(input)
        .into_iter()
        .map(|token| (token.kind(), token.line()))
        .collect::<Vec<_>>();

    assert_eq!(
        lines,
        vec![
            (TokenKind::Content, 1),
            (TokenKind::Open(OpenKind::Block), 2),
            (TokenKind::Id, 2),
            (TokenKind::Id, 2),
            (TokenKind::Close(CloseKind::Plain), 2),
            (TokenKind::Content, 2),
            (TokenKind::Comment, 3),
            (TokenKind::Content, 4),
            (TokenKind::Open(OpenKind::Plain), 5),
            (TokenKind::Id, 5),
            (TokenKind::Close(CloseKind::Plain), 5),
            (TokenKind::Content, 5),
            (TokenKind::Open(OpenKind::EndBlock), 6),
            (TokenKind::Id, 6),
            (TokenKind::Close(CloseKind::Plain), 6),
            (TokenKind::Eof, 6),
        ]
    );
}

#[test]
fn tokenize_reports_through_handler() {
    let handler = SilentHandler::new();
    let result = tokenize(&handler, "{{foo 'bar}}");

    assert!(result.is_err());

    let received = handler.into_received();
    assert_eq!(received.len(), 1);
    let stache_lexer::base::Error::LexicalError(error) = &received[0] else {
        panic!("expected a lexical error, got {:?}", received[0]);
    };
    assert_eq!(error.kind(), &ErrorKind::UnterminatedString);
    assert_eq!((error.start(), error.line()), (7, 1));
}

#[test]
fn reported_errors_show_the_source_line() {
    let handler = SilentHandler::new();
    let result = tokenize(&handler, "line one\n{{foo");

    assert!(result.is_err());

    let received = handler.into_received();
    assert_eq!(received.len(), 1);

    let rendered = received[0].to_string();
    assert!(rendered.contains("Unclosed expression"), "{rendered}");
    assert!(rendered.contains("{{foo"), "{rendered}");
    assert!(rendered.contains('^'), "{rendered}");
    assert!(!rendered.contains("line one"), "{rendered}");
}

#[test]
fn tokenize_success() {
    let handler = SilentHandler::new();
    let tokens = tokenize(&handler, "Hi {{name}}!").expect("template is valid");

    assert_eq!(tokens.len(), 6);
    assert!(handler.into_received().is_empty());
}

/// Mustaches that keep every scanned byte inside some token.
const LOSSLESS_MUSTACHES: &[&str] = &[
    "{{name}}",
    "{{&name}}",
    "{{{name}}}",
    "{{#each}}",
    "{{/each}}",
    "{{^}}",
    "{{else}}",
    "{{~name~}}",
    "{{>partial}}",
    "{{../parent/child}}",
    "{{! a comment }}",
    "{{!-- a }} comment --}}",
    "{{{{raw}}}} {{body}} {{{{/raw}}}}",
    "{{helper(sub)=12}}",
    "{{[path literal]}}",
];

/// Constructs that discard part of their text, or fail.
const LOSSY_FRAGMENTS: &[&str] = &[
    "{{ spaced\n  out }}",
    "{{helper \"str\ning\"}}",
    "{{helper 'quoted' key=true}}",
    r"\{{escaped}}",
    r"\\{{name}}",
    "{{=\n<% %>\n=}}<%name%><%= {{ }} =%>",
    "{{unclosed",
    "{{12abc}}",
];

fn lossless_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ,.!?\n]{1,12}",
        prop::sample::select(LOSSLESS_MUSTACHES).prop_map(String::from),
    ]
}

fn any_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => lossless_fragment(),
        1 => prop::sample::select(LOSSY_FRAGMENTS).prop_map(String::from),
    ]
}

fn lossless_template() -> impl Strategy<Value = String> {
    prop::collection::vec(lossless_fragment(), 0..12).prop_map(|fragments| fragments.concat())
}

fn any_template() -> impl Strategy<Value = String> {
    prop::collection::vec(any_fragment(), 0..12).prop_map(|fragments| fragments.concat())
}

proptest! {
    #[test]
    fn tokens_reconstruct_the_input(input in lossless_template()) {
        let tokens = Lexer::new(input.as_str()).collect::<Vec<_>>();

        prop_assert_eq!(tokens.last().map(Token::kind), Some(TokenKind::Eof));

        let reconstructed = tokens.iter().map(|token| token.value().as_str()).collect::<String>();
        prop_assert_eq!(reconstructed, input);
    }

    #[test]
    fn tokens_are_ordered_and_report_their_line(input in any_template()) {
        let tokens = Lexer::new(input.as_str()).collect::<Vec<_>>();

        prop_assert!(tokens.last().is_some_and(|token| token.kind().is_terminal()));
        prop_assert_eq!(
            tokens.iter().filter(|token| token.kind().is_terminal()).count(),
            1
        );

        for pair in tokens.windows(2) {
            prop_assert!(pair[0].start() < pair[1].start());
        }

        for token in &tokens {
            let expected = input[..token.start()].matches('\n').count() + 1;
            prop_assert_eq!(token.line(), expected, "{}", token);
        }
    }
}
