use indexmap::IndexMap;

use crate::name::OptionName;
use crate::processor::Processor;
use crate::value::Value;

/// How repeated occurrences of one option combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// The last occurrence wins.
    #[default]
    Replace,
    /// Occurrences accumulate, in order, into a list.
    Append,
}

/// An option: its name, the processor for its arguments, an optional
/// default and the merge policy for repeats.
///
/// Definitions are immutable; [`with_default`](Self::with_default) returns a
/// new definition.
#[derive(Debug, Clone)]
pub struct OptionDefinition {
    name: OptionName,
    processor: Processor<Value>,
    default: Option<Value>,
    mode: MergeMode,
}

impl OptionDefinition {
    pub fn new<T>(name: OptionName, processor: Processor<T>, mode: MergeMode) -> Self
    where
        T: Into<Value> + 'static,
    {
        Self {
            name,
            processor: processor.map(Into::into),
            default: None,
            mode,
        }
    }

    pub fn replace<T>(name: OptionName, processor: Processor<T>) -> Self
    where
        T: Into<Value> + 'static,
    {
        Self::new(name, processor, MergeMode::Replace)
    }

    pub fn append<T>(name: OptionName, processor: Processor<T>) -> Self
    where
        T: Into<Value> + 'static,
    {
        Self::new(name, processor, MergeMode::Append)
    }

    /// A copy of this definition that falls back to `value` when the option
    /// never occurs. The processor is not run for defaults, and in append
    /// mode the value is stored as given (pass a `Vec` for a list).
    pub fn with_default(&self, value: impl Into<Value>) -> Self {
        Self {
            default: Some(value.into()),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &OptionName {
        &self.name
    }

    pub fn processor(&self) -> &Processor<Value> {
        &self.processor
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn mode(&self) -> MergeMode {
        self.mode
    }

    /// Fold one processed occurrence into `values` under the first of
    /// `keys`. Append mode pushes onto the stored list in place.
    ///
    /// `keys` are the result keys this definition owns in its parser; the
    /// remaining ones are filled by [`copy_to_aliases`](Self::copy_to_aliases)
    /// once the scan is done.
    pub(crate) fn merge(
        &self,
        values: &mut IndexMap<String, Value>,
        keys: &[String],
        value: Value,
    ) {
        let Some(primary) = keys.first() else {
            return;
        };
        match self.mode {
            MergeMode::Replace => {
                values.insert(primary.clone(), value);
            }
            MergeMode::Append => match values.get_mut(primary) {
                Some(Value::List(items)) => items.push(value),
                Some(other) => {
                    let prior = std::mem::replace(other, Value::Unit);
                    *other = Value::List(vec![prior, value]);
                }
                None => {
                    values.insert(primary.clone(), Value::List(vec![value]));
                }
            },
        }
    }

    /// Mirror the value under the first of `keys` into the others.
    pub(crate) fn copy_to_aliases(
        &self,
        values: &mut IndexMap<String, Value>,
        keys: &[String],
    ) {
        let Some((primary, aliases)) = keys.split_first() else {
            return;
        };
        let Some(value) = values.get(primary).cloned() else {
            return;
        };
        for alias in aliases {
            values.insert(alias.clone(), value.clone());
        }
    }

    /// Insert the default under `keys` if the option was never matched.
    /// Returns whether anything was inserted.
    pub(crate) fn apply_default(
        &self,
        values: &mut IndexMap<String, Value>,
        keys: &[String],
    ) -> bool {
        let Some(primary) = keys.first() else {
            return false;
        };
        if values.contains_key(primary) {
            return false;
        }
        let Some(default) = &self.default else {
            return false;
        };
        for key in keys {
            values.insert(key.clone(), default.clone());
        }
        true
    }
}
