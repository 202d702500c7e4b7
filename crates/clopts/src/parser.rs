use std::ffi::OsString;

use indexmap::IndexMap;

use crate::definition::OptionDefinition;
use crate::error::{ParseError, ParseErrorKind, Result};
use crate::matches::{Matches, TRAILING_KEY};
use crate::value::Value;

/// An ordered set of option definitions.
///
/// Parsing is a pure function of the definitions and argv: the same input
/// always yields the same [`Matches`] or the same error, and a `Parser` can
/// be shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    definitions: Vec<OptionDefinition>,
    /// Result keys each definition writes, parallel to `definitions`. A key
    /// belongs to the first definition that names it.
    owned_keys: Vec<Vec<String>>,
}

enum Token<'a> {
    Separator,
    Long(&'a str),
    Short(char),
    Trailing,
}

fn classify(token: &str) -> Token<'_> {
    if token == "--" {
        return Token::Separator;
    }
    if let Some(name) = token.strip_prefix("--") {
        return Token::Long(name);
    }
    if let Some(name) = token.strip_prefix('-') {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Token::Short(c);
        }
    }
    Token::Trailing
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition after the existing ones.
    ///
    /// Names should be unique across a parser. A definition that reuses a
    /// long or short form is kept, but the earlier one always matches first.
    pub fn option(mut self, definition: OptionDefinition) -> Self {
        if let Some(prev) = self
            .definitions
            .iter()
            .find(|d| d.name().overlaps(definition.name()))
        {
            tracing::warn!(
                existing = %prev.name(),
                shadowed = %definition.name(),
                "option name already defined; the first definition wins"
            );
        }
        let owned: Vec<String> = definition
            .name()
            .keys()
            .into_iter()
            .filter(|key| !self.owned_keys.iter().flatten().any(|k| k == key))
            .collect();
        self.definitions.push(definition);
        self.owned_keys.push(owned);
        self
    }

    /// Append all of `other`'s definitions after this parser's.
    pub fn concat(self, other: Parser) -> Self {
        other.definitions.into_iter().fold(self, Self::option)
    }

    pub fn definitions(&self) -> &[OptionDefinition] {
        &self.definitions
    }

    /// Parse any sequence of string-like tokens (program name excluded).
    pub fn parse<I, S>(&self, args: I) -> Result<Matches>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        self.parse_args(&args)
    }

    /// Parse the current process arguments, skipping the program name.
    pub fn parse_env(&self) -> Result<Matches> {
        self.parse_os(std::env::args_os().skip(1))
    }

    /// Parse OS strings; an argument that is not valid Unicode is a
    /// parse error.
    pub fn parse_os<I>(&self, args: I) -> Result<Matches>
    where
        I: IntoIterator<Item = OsString>,
    {
        let args = args
            .into_iter()
            .map(|arg| {
                arg.into_string().map_err(|arg| {
                    ParseError::new(ParseErrorKind::InvalidEncoding(
                        arg.to_string_lossy().into_owned(),
                    ))
                })
            })
            .collect::<std::result::Result<Vec<String>, ParseError>>()?;
        self.parse_args(&args)
    }

    pub fn parse_args(&self, args: &[String]) -> Result<Matches> {
        let mut values: IndexMap<String, Value> = IndexMap::new();
        values.insert(TRAILING_KEY.to_string(), Value::List(Vec::new()));

        let mut input = args;
        while let Some((token, rest)) = input.split_first() {
            let found = match classify(token) {
                Token::Separator => {
                    tracing::trace!(count = rest.len(), "option scan ended at `--`");
                    values.insert(TRAILING_KEY.to_string(), trailing(rest));
                    break;
                }
                Token::Trailing => {
                    tracing::trace!(count = input.len(), "option scan ended at positional");
                    values.insert(TRAILING_KEY.to_string(), trailing(input));
                    break;
                }
                Token::Long(name) => self.find(|d| d.name().matches_long(name)),
                Token::Short(name) => self.find(|d| d.name().matches_short(name)),
            };
            let Some((definition, keys)) = found else {
                return Err(
                    ParseError::new(ParseErrorKind::UnrecognizedOption(token.clone())).into(),
                );
            };

            let (next, value) = definition
                .processor()
                .process(rest)
                .map_err(|kind| ParseError::in_option(token.as_str(), kind))?;
            tracing::debug!(option = %token, consumed = rest.len() - next.len(), "matched option");
            definition.merge(&mut values, keys, value);
            input = next;
        }

        for (definition, keys) in self.definitions.iter().zip(&self.owned_keys) {
            definition.copy_to_aliases(&mut values, keys);
        }
        for (definition, keys) in self.definitions.iter().zip(&self.owned_keys) {
            if definition.apply_default(&mut values, keys) {
                tracing::trace!(option = %definition.name(), "applied default");
            }
        }

        Ok(Matches::new(values))
    }

    fn find<P>(&self, predicate: P) -> Option<(&OptionDefinition, &[String])>
    where
        P: Fn(&OptionDefinition) -> bool,
    {
        self.definitions
            .iter()
            .zip(&self.owned_keys)
            .find(|(d, _)| predicate(d))
            .map(|(d, keys)| (d, keys.as_slice()))
    }
}

fn trailing(args: &[String]) -> Value {
    Value::List(args.iter().cloned().map(Value::Str).collect())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::convert;
    use crate::error::Error;
    use crate::name::OptionName;
    use crate::processor;

    fn int_option(def: fn(OptionName, processor::Processor<i32>) -> OptionDefinition) -> Parser {
        Parser::new().option(def(
            OptionName::both("foo", 'f').unwrap(),
            processor::required(convert::integer::<i32>()),
        ))
    }

    fn parse_err(parser: &Parser, args: &[&str]) -> ParseError {
        match parser.parse(args.iter().copied()) {
            Err(Error::Parse(err)) => err,
            other => panic!("expected parse error, got: {other:?}"),
        }
    }

    #[test]
    fn replace_keeps_last_value() {
        let m = int_option(OptionDefinition::replace)
            .parse(["--foo", "0", "--foo", "1"])
            .unwrap();
        assert_eq!(m.get::<i32>("foo").unwrap(), 1);
        assert_eq!(m.get::<i32>("f").unwrap(), 1);
        assert!(m.trailing().is_empty());
    }

    #[test]
    fn append_accumulates_across_long_and_short() {
        let m = int_option(OptionDefinition::append)
            .parse(["--foo", "0", "-f", "1"])
            .unwrap();
        assert_eq!(m.get::<Vec<i32>>("foo").unwrap(), vec![0, 1]);
        assert_eq!(m.get::<Vec<i32>>("f").unwrap(), vec![0, 1]);
    }

    #[test]
    fn separator_stops_scanning() {
        let m = int_option(OptionDefinition::replace)
            .parse(["--foo", "3", "--", "--bar", "\\-x"])
            .unwrap();
        assert_eq!(m.get::<i32>("foo").unwrap(), 3);
        assert_eq!(m.trailing(), vec!["--bar", "\\-x"]);
    }

    #[test]
    fn flag_before_separator() {
        let parser = Parser::new().option(OptionDefinition::replace(
            OptionName::long("foo").unwrap(),
            processor::flag(),
        ));
        let m = parser.parse(["--foo", "--", "--bar"]).unwrap();
        assert!(m.get::<bool>("foo").unwrap());
        assert_eq!(m.trailing(), vec!["--bar"]);
    }

    #[test]
    fn positional_ends_scanning() {
        let m = int_option(OptionDefinition::replace)
            .parse(["-f", "1", "file.txt", "--foo", "2"])
            .unwrap();
        assert_eq!(m.get::<i32>("foo").unwrap(), 1);
        assert_eq!(m.trailing(), vec!["file.txt", "--foo", "2"]);

        // Trailing arguments are passed through without unescaping.
        let m = int_option(OptionDefinition::replace)
            .parse(["file", "\\-x"])
            .unwrap();
        assert_eq!(m.trailing(), vec!["file", "\\-x"]);
    }

    #[test]
    fn unrecognized_option_anywhere_fails() {
        let parser = int_option(OptionDefinition::replace);
        for args in [
            &["--nope"][..],
            &["--foo", "1", "--nope", "--foo", "2"][..],
            &["-f", "1", "-x"][..],
        ] {
            let err = parse_err(&parser, args);
            assert!(
                matches!(err.kind(), ParseErrorKind::UnrecognizedOption(_)),
                "{args:?}: {err}"
            );
            assert_eq!(err.option(), None);
        }
        assert_eq!(
            parse_err(&parser, &["-x"]).to_string(),
            "unrecognized option: -x"
        );
    }

    #[test]
    fn clustered_short_options_fall_through_to_trailing() {
        let m = int_option(OptionDefinition::replace)
            .parse(["-ab", "c"])
            .unwrap();
        assert_eq!(m.trailing(), vec!["-ab", "c"]);
        assert!(!m.contains("foo"));
    }

    #[test]
    fn processor_errors_are_prefixed_with_option() {
        let parser = int_option(OptionDefinition::replace);

        let err = parse_err(&parser, &["--foo"]);
        assert_eq!(err.kind(), &ParseErrorKind::MissingArgument);
        assert_eq!(err.to_string(), "--foo: missing argument");

        let err = parse_err(&parser, &["-f", "x"]);
        assert_eq!(err.option(), Some("-f"));
        assert_eq!(err.to_string(), "-f: invalid value 'x': must be an integer");
    }

    #[test]
    fn escaped_negative_value() {
        let m = int_option(OptionDefinition::replace)
            .parse(["--foo", "\\-10"])
            .unwrap();
        assert_eq!(m.get::<i32>("foo").unwrap(), -10);

        let parser = Parser::new().option(OptionDefinition::replace(
            OptionName::long("name").unwrap(),
            processor::required(convert::string()),
        ));
        let m = parser.parse(["--name", "\\-10"]).unwrap();
        assert_eq!(m.get::<String>("name").unwrap(), "-10");
    }

    #[test]
    fn empty_input_applies_defaults() {
        let parser = Parser::new()
            .option(
                OptionDefinition::replace(
                    OptionName::both("level", 'l').unwrap(),
                    processor::required(convert::integer::<u8>()),
                )
                .with_default(3u8),
            )
            .option(
                OptionDefinition::append(
                    OptionName::short('I').unwrap(),
                    processor::required(convert::path()),
                )
                .with_default(Vec::<PathBuf>::new()),
            )
            .option(OptionDefinition::replace(
                OptionName::long("quiet").unwrap(),
                processor::flag(),
            ));

        let m = parser.parse(Vec::<String>::new()).unwrap();
        assert!(m.trailing().is_empty());
        assert!(m.contains(TRAILING_KEY));
        assert_eq!(m.get::<u8>("level").unwrap(), 3);
        assert_eq!(m.get::<u8>("l").unwrap(), 3);
        assert!(m.get::<Vec<PathBuf>>("I").unwrap().is_empty());
        assert!(!m.contains("quiet"));
        assert_eq!(m.get_optional::<bool>("quiet").unwrap(), None);
    }

    #[test]
    fn optional_processor_without_value() {
        let parser = Parser::new()
            .option(OptionDefinition::replace(
                OptionName::long("color").unwrap(),
                processor::optional(convert::string()),
            ))
            .option(OptionDefinition::replace(
                OptionName::short('v').unwrap(),
                processor::flag(),
            ));

        let m = parser.parse(["--color", "-v"]).unwrap();
        assert_eq!(m.get::<Option<String>>("color").unwrap(), None);
        assert!(m.get::<bool>("v").unwrap());

        let m = parser.parse(["--color", "always", "rest"]).unwrap();
        assert_eq!(
            m.get::<Option<String>>("color").unwrap(),
            Some("always".to_string())
        );
        assert_eq!(m.trailing(), vec!["rest"]);
    }

    #[test]
    fn custom_processor_consumes_pairs() {
        let pair = processor::Processor::new(|args| match args {
            [k, v, rest @ ..] => Ok((rest, format!("{k}={v}"))),
            _ => Err(ParseErrorKind::Custom("expected KEY VALUE".to_string())),
        });
        let parser = Parser::new().option(OptionDefinition::append(
            OptionName::short('D').unwrap(),
            pair,
        ));

        let m = parser.parse(["-D", "a", "1", "-D", "b", "2"]).unwrap();
        assert_eq!(m.get::<Vec<String>>("D").unwrap(), vec!["a=1", "b=2"]);

        let err = parse_err(&parser, &["-D", "a"]);
        assert_eq!(err.to_string(), "-D: expected KEY VALUE");
    }

    #[test]
    fn parsing_is_deterministic() {
        let parser = int_option(OptionDefinition::append);
        let args = ["-f", "1", "--foo", "2", "x", "y"];
        let a = parser.parse(args).unwrap();
        let b = parser.parse(args).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn first_duplicate_definition_wins() {
        let parser = Parser::new()
            .option(OptionDefinition::replace(
                OptionName::both("foo", 'f').unwrap(),
                processor::constant("first"),
            ))
            .option(OptionDefinition::replace(
                OptionName::short('f').unwrap(),
                processor::constant("second"),
            ));
        let m = parser.parse(["-f"]).unwrap();
        assert_eq!(m.get::<String>("foo").unwrap(), "first");
    }

    #[test]
    fn shadowed_definition_keeps_only_its_unique_keys() {
        let parser = Parser::new()
            .option(OptionDefinition::replace(
                OptionName::both("foo", 'f').unwrap(),
                processor::required(convert::integer::<i32>()),
            ))
            .option(OptionDefinition::replace(
                OptionName::both("bar", 'f').unwrap(),
                processor::required(convert::string()),
            ));

        let m = parser.parse(["-f", "1", "--bar", "x"]).unwrap();
        assert_eq!(m.get::<i32>("foo").unwrap(), 1);
        assert_eq!(m.get::<i32>("f").unwrap(), 1);
        assert_eq!(m.get::<String>("bar").unwrap(), "x");

        let m = parser.parse(["--bar", "x"]).unwrap();
        assert!(!m.contains("f"));
        assert_eq!(m.get::<String>("bar").unwrap(), "x");
    }

    #[test]
    fn shadowed_default_does_not_fill_owned_key() {
        let parser = Parser::new()
            .option(OptionDefinition::replace(
                OptionName::both("foo", 'f').unwrap(),
                processor::required(convert::integer::<i32>()),
            ))
            .option(
                OptionDefinition::replace(OptionName::both("bar", 'f').unwrap(), processor::flag())
                    .with_default(false),
            );

        let m = parser.parse(["--foo", "7"]).unwrap();
        assert_eq!(m.get::<i32>("f").unwrap(), 7);
        assert!(!m.get::<bool>("bar").unwrap());
    }

    #[test]
    fn append_many_occurrences() {
        let args: Vec<String> = (0..500)
            .flat_map(|i| ["-f".to_string(), i.to_string()])
            .collect();
        let m = int_option(OptionDefinition::append).parse_args(&args).unwrap();
        let expected: Vec<i32> = (0..500).collect();
        assert_eq!(m.get::<Vec<i32>>("foo").unwrap(), expected);
        assert_eq!(m.get::<Vec<i32>>("f").unwrap(), expected);
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_argument_is_a_parse_error() {
        use std::os::unix::ffi::OsStringExt;

        let parser = int_option(OptionDefinition::replace);
        let args = vec![OsString::from("file"), OsString::from_vec(vec![b'a', 0xff])];
        match parser.parse_os(args) {
            Err(Error::Parse(err)) => {
                assert!(err.option().is_none());
                assert_eq!(
                    err.kind(),
                    &ParseErrorKind::InvalidEncoding("a\u{FFFD}".to_string())
                );
            }
            other => panic!("expected parse error, got: {other:?}"),
        }

        let m = parser
            .parse_os(["-f", "3"].map(OsString::from))
            .unwrap();
        assert_eq!(m.get::<i32>("foo").unwrap(), 3);
    }

    #[test]
    fn concat_preserves_order() {
        let a = Parser::new().option(OptionDefinition::replace(
            OptionName::long("alpha").unwrap(),
            processor::flag(),
        ));
        let b = Parser::new().option(OptionDefinition::replace(
            OptionName::long("beta").unwrap(),
            processor::flag(),
        ));
        let parser = a.concat(b);
        let names: Vec<String> = parser
            .definitions()
            .iter()
            .map(|d| d.name().canonical())
            .collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert!(parser.parse(["--beta"]).unwrap().get::<bool>("beta").unwrap());
    }
}
