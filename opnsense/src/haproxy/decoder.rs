//! Read-direction coercions with an explicit policy for malformed input.
//!
//! OPNsense transmits every scalar as a string. In [`DecodeMode::Lenient`]
//! a value that does not parse falls back to the field's sentinel and the
//! coercion is recorded as a [`CodecWarning`]. In [`DecodeMode::Strict`] the
//! first such value fails the whole decode.

use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use super::convert::selected_list_to_set;
use super::selected::{SelectedList, SelectedValue};

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("field {field}: {value:?} is not a valid integer")]
    InvalidInteger { field: String, value: String },

    #[error("field {field}: {value:?} is not a valid number")]
    InvalidFloat { field: String, value: String },

    #[error("field {field}: {value:?} is not a valid boolean")]
    InvalidBool { field: String, value: String },

    #[error("attribute {0} is missing")]
    MissingAttribute(String),

    #[error("attribute {0} is not known yet")]
    UnknownValue(String),

    #[error("attribute {attribute}: {source}")]
    InvalidAttribute {
        attribute: String,
        #[source]
        source: tfplug::TfplugError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    #[default]
    Lenient,
    Strict,
}

/// A value that did not parse and was replaced during a lenient decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecWarning {
    pub field: String,
    pub value: String,
    pub replacement: String,
}

impl fmt::Display for CodecWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "remote field {} has unexpected value {:?}, using {}",
            self.field, self.value, self.replacement
        )
    }
}

/// A decoded model plus the coercions that produced it
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub value: T,
    pub warnings: Vec<CodecWarning>,
}

pub struct Decoder {
    mode: DecodeMode,
    warnings: Vec<CodecWarning>,
    error: Option<CodecError>,
}

impl Decoder {
    pub fn new(mode: DecodeMode) -> Self {
        Self {
            mode,
            warnings: Vec::new(),
            error: None,
        }
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    /// "" is the unset sentinel and decodes to -1 silently.
    pub fn int64(&mut self, field: &str, raw: &str) -> i64 {
        if raw.is_empty() {
            return -1;
        }
        match raw.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                self.coerce(
                    field,
                    raw,
                    "-1",
                    CodecError::InvalidInteger {
                        field: field.to_string(),
                        value: raw.to_string(),
                    },
                );
                -1
            }
        }
    }

    pub fn float64(&mut self, field: &str, raw: &str) -> f64 {
        if raw.is_empty() {
            return -1.0;
        }
        match raw.parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                self.coerce(
                    field,
                    raw,
                    "-1",
                    CodecError::InvalidFloat {
                        field: field.to_string(),
                        value: raw.to_string(),
                    },
                );
                -1.0
            }
        }
    }

    /// "1" is true; "0" and "" are false.
    pub fn bool(&mut self, field: &str, raw: &str) -> bool {
        match raw {
            "1" => true,
            "0" | "" => false,
            other => {
                self.coerce(
                    field,
                    other,
                    "false",
                    CodecError::InvalidBool {
                        field: field.to_string(),
                        value: other.to_string(),
                    },
                );
                false
            }
        }
    }

    pub fn selected(&self, value: &SelectedValue) -> String {
        value.render().to_string()
    }

    pub fn set(&self, list: &SelectedList) -> BTreeSet<String> {
        selected_list_to_set(list)
    }

    pub fn finish<T>(self, value: T) -> Result<Decoded<T>, CodecError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(Decoded {
                value,
                warnings: self.warnings,
            }),
        }
    }

    fn coerce(&mut self, field: &str, value: &str, replacement: &str, error: CodecError) {
        match self.mode {
            DecodeMode::Lenient => {
                tracing::warn!(
                    "Coercing remote field {} value {:?} to {}",
                    field,
                    value,
                    replacement
                );
                self.warnings.push(CodecWarning {
                    field: field.to_string(),
                    value: value.to_string(),
                    replacement: replacement.to_string(),
                });
            }
            DecodeMode::Strict => {
                if self.error.is_none() {
                    self.error = Some(error);
                }
            }
        }
    }
}
