//! Processors consume the arguments that follow a matched option.
//!
//! A processor receives the remaining argv as a slice and returns the
//! unconsumed tail together with the value it produced. It never mutates
//! its input.

use std::fmt;
use std::sync::Arc;

use crate::convert::Converter;
use crate::error::ParseErrorKind;

/// Prefix that makes an option-like token (`\-10`) usable as a value.
pub const ESCAPE: char = '\\';

pub type ProcessResult<'a, T> = Result<(&'a [String], T), ParseErrorKind>;

type ProcessFn<T> = dyn for<'a> Fn(&'a [String]) -> ProcessResult<'a, T> + Send + Sync;

pub struct Processor<T> {
    f: Arc<ProcessFn<T>>,
}

impl<T> Clone for Processor<T> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<T> fmt::Debug for Processor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor").finish_non_exhaustive()
    }
}

impl<T: 'static> Processor<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a [String]) -> ProcessResult<'a, T> + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    pub fn process<'a>(&self, args: &'a [String]) -> ProcessResult<'a, T> {
        (self.f)(args)
    }

    pub fn map<U, F>(self, f: F) -> Processor<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Processor::new(move |args| {
            let (rest, value) = self.process(args)?;
            Ok((rest, f(value)))
        })
    }
}

/// Ignore the input and always yield `value`.
pub fn constant<T>(value: T) -> Processor<T>
where
    T: Clone + Send + Sync + 'static,
{
    Processor::new(move |args| Ok((args, value.clone())))
}

/// A switch: `true` when present.
pub fn flag() -> Processor<bool> {
    constant(true)
}

/// Consume exactly one value argument.
pub fn required<T: 'static>(converter: Converter<T>) -> Processor<T> {
    Processor::new(move |args| {
        let Some((token, rest)) = value_token(args) else {
            return Err(ParseErrorKind::MissingArgument);
        };
        let value = convert(&converter, token)?;
        Ok((rest, value))
    })
}

/// [`required`] followed by `transform` on the converted value.
pub fn required_with<T, U, F>(converter: Converter<T>, transform: F) -> Processor<U>
where
    T: 'static,
    U: 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    required(converter).map(transform)
}

/// Consume one value argument if there is an eligible one.
///
/// An exhausted argv or an option-like head yields `None` and consumes
/// nothing.
pub fn optional<T: 'static>(converter: Converter<T>) -> Processor<Option<T>> {
    Processor::new(move |args| {
        let Some((token, rest)) = value_token(args) else {
            return Ok((args, None));
        };
        let value = convert(&converter, token)?;
        Ok((rest, Some(value)))
    })
}

/// [`optional`] followed by `transform` on a present value.
pub fn optional_with<T, U, F>(converter: Converter<T>, transform: F) -> Processor<Option<U>>
where
    T: 'static,
    U: 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    optional(converter).map(move |value| value.map(&transform))
}

/// Whether `token` would be read as an option rather than a value.
pub fn looks_like_option(token: &str) -> bool {
    token.starts_with('-')
}

fn value_token(args: &[String]) -> Option<(&str, &[String])> {
    let (head, rest) = args.split_first()?;
    if looks_like_option(head) {
        return None;
    }
    Some((head.as_str(), rest))
}

fn convert<T>(converter: &Converter<T>, token: &str) -> Result<T, ParseErrorKind>
where
    T: 'static,
{
    let unescaped = token.strip_prefix(ESCAPE).unwrap_or(token);
    converter
        .convert(unescaped)
        .map_err(|reason| ParseErrorKind::Conversion {
            token: token.to_string(),
            reason,
        })
}
