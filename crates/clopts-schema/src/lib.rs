//! JSON model for declaring clopts option definitions.
//!
//! A schema document looks like:
//!
//! ```json
//! {
//!   "options": [
//!     { "long": "verbose", "short": "v", "kind": "flag" },
//!     { "long": "level", "kind": "required", "type": "u8", "default": 3 },
//!     { "short": "I", "kind": "required", "type": "path", "mode": "append", "default": [] }
//!   ]
//! }
//! ```
//!
//! Defaults are written as JSON and run through the declared converter, so
//! they are validated the same way command-line values are.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clopts::{
    Converter, MergeMode, OptionDefinition, OptionName, Parser, Value, convert, processor,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ArgKind {
    /// Takes no argument; `true` when present.
    #[default]
    Flag,
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    #[default]
    String,
    Charset,
    Path,
    Uri,
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Replace,
    Append,
}

impl From<Mode> for MergeMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Replace => MergeMode::Replace,
            Mode::Append => MergeMode::Append,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct OptionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    #[serde(default)]
    pub kind: ArgKind,
    #[serde(default, rename = "type")]
    pub value_type: ValueType,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSpec>,
}

impl Schema {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("failed to parse option schema")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("invalid schema in {}", path.display()))
    }

    /// Build a parser with one definition per option, in document order.
    pub fn to_parser(&self) -> Result<Parser> {
        self.options
            .iter()
            .enumerate()
            .try_fold(Parser::new(), |parser, (idx, spec)| {
                let definition = spec
                    .to_definition()
                    .with_context(|| format!("options[{idx}]"))?;
                Ok(parser.option(definition))
            })
    }
}

impl OptionSpec {
    pub fn name(&self) -> Result<OptionName> {
        Ok(OptionName::new(self.long.as_deref(), self.short)?)
    }

    pub fn to_definition(&self) -> Result<OptionDefinition> {
        match self.value_type {
            ValueType::Bool => self.build(convert::boolean()),
            ValueType::Char => self.build(convert::character()),
            ValueType::I8 => self.build(convert::integer::<i8>()),
            ValueType::I16 => self.build(convert::integer::<i16>()),
            ValueType::I32 => self.build(convert::integer::<i32>()),
            ValueType::I64 => self.build(convert::integer::<i64>()),
            ValueType::U8 => self.build(convert::integer::<u8>()),
            ValueType::U16 => self.build(convert::integer::<u16>()),
            ValueType::U32 => self.build(convert::integer::<u32>()),
            ValueType::U64 => self.build(convert::integer::<u64>()),
            ValueType::F32 => self.build(convert::float::<f32>()),
            ValueType::F64 => self.build(convert::float::<f64>()),
            ValueType::String => self.build(convert::string()),
            ValueType::Charset => self.build(convert::charset()),
            ValueType::Path => self.build(convert::path()),
            ValueType::Uri => self.build(convert::uri()),
            ValueType::Url => self.build(convert::url()),
        }
    }

    fn build<T>(&self, converter: Converter<T>) -> Result<OptionDefinition>
    where
        T: Into<Value> + 'static,
    {
        let name = self.name()?;
        let mode = MergeMode::from(self.mode);
        let definition = match self.kind {
            ArgKind::Flag => OptionDefinition::new(name, processor::flag(), mode),
            ArgKind::Required => {
                OptionDefinition::new(name, processor::required(converter.clone()), mode)
            }
            ArgKind::Optional => {
                OptionDefinition::new(name, processor::optional(converter.clone()), mode)
            }
        };

        let Some(default) = &self.default else {
            return Ok(definition);
        };
        let value = match (self.mode, default) {
            (Mode::Append, serde_json::Value::Array(items)) => Value::List(
                items
                    .iter()
                    .map(|item| self.default_element(&converter, item))
                    .collect::<Result<_>>()?,
            ),
            (Mode::Append, _) => bail!("default for an append option must be an array"),
            (Mode::Replace, item) => self.default_element(&converter, item)?,
        };
        Ok(definition.with_default(value))
    }

    fn default_element<T>(
        &self,
        converter: &Converter<T>,
        json: &serde_json::Value,
    ) -> Result<Value>
    where
        T: Into<Value> + 'static,
    {
        match self.kind {
            ArgKind::Flag => match json {
                serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
                other => bail!("default for a flag must be a boolean, got {other}"),
            },
            ArgKind::Optional if json.is_null() => Ok(Value::Option(None)),
            ArgKind::Optional => Ok(Value::from(Some(convert_default(converter, json)?))),
            ArgKind::Required => convert_default(converter, json),
        }
    }
}

fn convert_default<T>(converter: &Converter<T>, json: &serde_json::Value) -> Result<Value>
where
    T: Into<Value> + 'static,
{
    let text = match json {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => bail!("default must be a string, number or boolean, got {other}"),
    };
    match converter.convert(&text) {
        Ok(value) => Ok(value.into()),
        Err(reason) => bail!("invalid default '{text}': {reason}"),
    }
}
