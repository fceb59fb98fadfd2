use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::Result;

/// Checks one element of a list option, possibly normalising it.
pub type Validator<'a> = Box<dyn Fn(&str) -> Result<String> + 'a>;

/// Values of a repeatable option, validated as they are added.
#[derive(Default)]
pub struct ListOpts<'a> {
    values: Vec<String>,
    validator: Option<Validator<'a>>,
}

impl fmt::Debug for ListOpts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListOpts")
            .field("values", &self.values)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl<'a> ListOpts<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator<F>(validator: F) -> Self
    where
        F: Fn(&str) -> Result<String> + 'a,
    {
        ListOpts {
            values: Vec::new(),
            validator: Some(Box::new(validator)),
        }
    }

    /// Builds the list from raw values, stopping at the first invalid one.
    pub fn from_values<F>(validator: F, values: &[String]) -> Result<Self>
    where
        F: Fn(&str) -> Result<String> + 'a,
    {
        let mut list = Self::with_validator(validator);
        list.extend(values)?;
        Ok(list)
    }

    /// Validates `value` and appends what the validator returned.
    pub fn set(&mut self, value: &str) -> Result<()> {
        let value = match &self.validator {
            Some(validator) => validator(value)?,
            None => value.to_owned(),
        };
        self.values.push(value);
        Ok(())
    }

    pub fn extend<I, S>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        values.into_iter().try_for_each(|value| self.set(value.as_ref()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.iter().any(|value| value == key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values in insertion order, duplicates included.
    pub fn get_all(&self) -> &[String] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<String> {
        self.values
    }

    /// The distinct values.
    pub fn get_set(&self) -> BTreeSet<String> {
        self.values.iter().cloned().collect()
    }

    /// The values read as `key=value`, later keys overriding earlier ones. A
    /// value without `=` maps to an empty string.
    pub fn get_map(&self) -> BTreeMap<String, String> {
        crate::parsers::convert_kv_strings_to_map(&self.values)
    }
}
