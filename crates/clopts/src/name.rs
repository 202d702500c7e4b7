use crate::error::{Error, Result};

/// The name an option is matched by: `--long`, `-s`, or both.
///
/// At least one form is always present. Long forms match
/// `[a-zA-Z0-9][a-zA-Z0-9-]+`; short forms are a single `[a-zA-Z0-9?]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionName {
    long: Option<String>,
    short: Option<char>,
}

impl OptionName {
    pub fn new(long: Option<&str>, short: Option<char>) -> Result<Self> {
        if long.is_none() && short.is_none() {
            return Err(Error::InvalidName(
                "an option needs a long or a short name".to_string(),
            ));
        }
        if let Some(long) = long {
            if !is_valid_long(long) {
                return Err(Error::InvalidName(format!("'{long}' is not a valid long name")));
            }
        }
        if let Some(short) = short {
            if !is_valid_short(short) {
                return Err(Error::InvalidName(format!(
                    "'{short}' is not a valid short name"
                )));
            }
        }
        Ok(Self {
            long: long.map(str::to_string),
            short,
        })
    }

    /// Name with only a long form (`--name`).
    pub fn long(name: &str) -> Result<Self> {
        Self::new(Some(name), None)
    }

    /// Name with only a short form (`-n`).
    pub fn short(name: char) -> Result<Self> {
        Self::new(None, Some(name))
    }

    pub fn both(long: &str, short: char) -> Result<Self> {
        Self::new(Some(long), Some(short))
    }

    pub fn long_form(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn short_form(&self) -> Option<char> {
        self.short
    }

    /// Long form if present, otherwise the short form as a one-character string.
    pub fn canonical(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => long.clone(),
            (None, Some(short)) => short.to_string(),
            (None, None) => unreachable!("OptionName always has at least one form"),
        }
    }

    /// Every key this option's value is stored under in the result map.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(2);
        if let Some(long) = &self.long {
            keys.push(long.clone());
        }
        if let Some(short) = self.short {
            keys.push(short.to_string());
        }
        keys
    }

    pub(crate) fn matches_long(&self, name: &str) -> bool {
        self.long.as_deref() == Some(name)
    }

    pub(crate) fn matches_short(&self, name: char) -> bool {
        self.short == Some(name)
    }

    pub(crate) fn overlaps(&self, other: &OptionName) -> bool {
        (self.long.is_some() && self.long == other.long)
            || (self.short.is_some() && self.short == other.short)
    }
}

impl std::fmt::Display for OptionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.long, self.short) {
            (Some(long), Some(short)) => write!(f, "-{short}, --{long}"),
            (Some(long), None) => write!(f, "--{long}"),
            (None, Some(short)) => write!(f, "-{short}"),
            (None, None) => Ok(()),
        }
    }
}

fn is_valid_long(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphanumeric() {
        return false;
    }
    let mut rest = 0usize;
    for c in chars {
        if !(c.is_ascii_alphanumeric() || c == '-') {
            return false;
        }
        rest += 1;
    }
    rest >= 1
}

fn is_valid_short(name: char) -> bool {
    name.is_ascii_alphanumeric() || name == '?'
}
