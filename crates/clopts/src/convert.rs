//! String-to-value converters used by the standard processors.
//!
//! A converter is a pure function from one raw token to either a value or a
//! fixed, user-readable message. Converters never panic on bad input.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use url::Url;

use crate::value::{Charset, Uri};

pub const BOOLEAN_MESSAGE: &str = "must be a boolean";
pub const CHARACTER_MESSAGE: &str = "must be a single character";
pub const INTEGER_MESSAGE: &str = "must be an integer";
pub const NUMBER_MESSAGE: &str = "must be a number";
pub const CHARSET_MESSAGE: &str = "must be a valid charset name";
pub const PATH_MESSAGE: &str = "must be a valid path";
pub const URI_MESSAGE: &str = "must be a valid URI";
pub const URL_MESSAGE: &str = "must be a valid URL";

type ConvertFn<T> = dyn Fn(&str) -> Result<T, String> + Send + Sync;

pub struct Converter<T> {
    f: Arc<ConvertFn<T>>,
}

impl<T> Clone for Converter<T> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<T> fmt::Debug for Converter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter").finish_non_exhaustive()
    }
}

impl<T: 'static> Converter<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<T, String> + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    pub fn convert(&self, token: &str) -> Result<T, String> {
        (self.f)(token)
    }

    /// Lift to `Option<T>`: success is wrapped in `Some`, failure is unchanged.
    pub fn optional(self) -> Converter<Option<T>> {
        Converter::new(move |token| self.convert(token).map(Some))
    }

    pub fn map<U, F>(self, f: F) -> Converter<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Converter::new(move |token| self.convert(token).map(&f))
    }
}

/// Parse through `FromStr`, replacing any failure with `message`.
pub fn from_str<T>(message: &'static str) -> Converter<T>
where
    T: FromStr + 'static,
{
    Converter::new(move |token| token.parse::<T>().map_err(|_| message.to_string()))
}

pub fn boolean() -> Converter<bool> {
    Converter::new(|token| {
        if token.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if token.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(BOOLEAN_MESSAGE.to_string())
        }
    })
}

pub fn character() -> Converter<char> {
    Converter::new(|token| {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(CHARACTER_MESSAGE.to_string()),
        }
    })
}

mod sealed {
    pub trait Sealed {}
}

/// Fixed-width integer types with a builtin converter.
pub trait Integer: FromStr + sealed::Sealed + 'static {}

/// Floating point types with a builtin converter.
pub trait Float: FromStr + sealed::Sealed + 'static {}

macro_rules! numeric {
    ($marker:ident: $($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}
            impl $marker for $ty {}
        )*
    };
}

numeric!(Integer: i8, i16, i32, i64, u8, u16, u32, u64);
numeric!(Float: f32, f64);

pub fn integer<T: Integer>() -> Converter<T> {
    from_str(INTEGER_MESSAGE)
}

pub fn float<T: Float>() -> Converter<T> {
    from_str(NUMBER_MESSAGE)
}

pub fn string() -> Converter<String> {
    Converter::new(|token| Ok(token.to_string()))
}

pub fn charset() -> Converter<Charset> {
    from_str(CHARSET_MESSAGE)
}

pub fn path() -> Converter<PathBuf> {
    Converter::new(|token| {
        if token.is_empty() || token.contains('\0') {
            Err(PATH_MESSAGE.to_string())
        } else {
            Ok(PathBuf::from(token))
        }
    })
}

pub fn uri() -> Converter<Uri> {
    from_str(URI_MESSAGE)
}

pub fn url() -> Converter<Url> {
    Converter::new(|token| Url::parse(token).map_err(|_| URL_MESSAGE.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_is_case_insensitive() {
        let c = boolean();
        assert_eq!(c.convert("TRUE"), Ok(true));
        assert_eq!(c.convert("false"), Ok(false));
        assert_eq!(c.convert("yes"), Err(BOOLEAN_MESSAGE.to_string()));
    }

    #[test]
    fn integers_respect_width() {
        assert_eq!(integer::<i8>().convert("-128"), Ok(-128));
        assert_eq!(
            integer::<i8>().convert("128"),
            Err(INTEGER_MESSAGE.to_string())
        );
        assert_eq!(integer::<u32>().convert("-1"), Err(INTEGER_MESSAGE.to_string()));
        assert_eq!(integer::<i64>().convert("9000000000"), Ok(9_000_000_000));
        assert_eq!(integer::<i32>().convert("1.5"), Err(INTEGER_MESSAGE.to_string()));
    }

    #[test]
    fn floats() {
        assert_eq!(float::<f64>().convert("2.5"), Ok(2.5));
        assert_eq!(float::<f32>().convert("abc"), Err(NUMBER_MESSAGE.to_string()));
    }

    #[test]
    fn character_needs_exactly_one() {
        assert_eq!(character().convert("x"), Ok('x'));
        assert_eq!(character().convert("é"), Ok('é'));
        assert!(character().convert("").is_err());
        assert!(character().convert("xy").is_err());
    }

    #[test]
    fn path_uri_url() {
        assert_eq!(path().convert("a/b.txt"), Ok(PathBuf::from("a/b.txt")));
        assert_eq!(path().convert(""), Err(PATH_MESSAGE.to_string()));
        assert!(uri().convert("../relative").is_ok());
        assert_eq!(uri().convert("not a uri"), Err(URI_MESSAGE.to_string()));
        assert!(url().convert("http://localhost:8080/").is_ok());
        assert_eq!(url().convert("../relative"), Err(URL_MESSAGE.to_string()));
    }

    #[test]
    fn charset_names() {
        assert_eq!(charset().convert("utf8"), Ok(Charset::Utf8));
        assert_eq!(charset().convert("ebcdic"), Err(CHARSET_MESSAGE.to_string()));
    }

    #[test]
    fn optional_and_map_propagate_failure() {
        let c = integer::<i32>().optional();
        assert_eq!(c.convert("7"), Ok(Some(7)));
        assert_eq!(c.convert("x"), Err(INTEGER_MESSAGE.to_string()));

        let doubled = integer::<i32>().map(|n| n * 2);
        assert_eq!(doubled.convert("21"), Ok(42));
    }
}
