//! Built-in attribute validators

use crate::schema::{Validator, ValidatorRequest, ValidatorResponse};
use crate::types::{Diagnostic, Dynamic};
use std::sync::Arc;

/// Checks that a string's length (in characters) falls within `min..=max`
pub struct StringLengthBetween {
    pub min: usize,
    pub max: usize,
}

impl StringLengthBetween {
    pub fn create(min: usize, max: usize) -> Arc<dyn Validator> {
        Arc::new(Self { min, max })
    }
}

impl Validator for StringLengthBetween {
    fn description(&self) -> String {
        format!(
            "string length must be between {} and {}",
            self.min, self.max
        )
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();
        if let Some(s) = request.config_value.as_str() {
            let len = s.chars().count();
            if len < self.min || len > self.max {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Invalid length for {}", request.path),
                        format!(
                            "Attribute {} string length must be between {} and {}, got: {}",
                            request.path, self.min, self.max, len
                        ),
                    )
                    .with_attribute(request.path),
                );
            }
        }
        ValidatorResponse { diagnostics }
    }
}

/// Checks that a string is one of a fixed set of values
pub struct StringOneOf {
    pub values: Vec<String>,
}

impl StringOneOf {
    pub fn create(values: &[&str]) -> Arc<dyn Validator> {
        Arc::new(Self {
            values: values.iter().map(|v| v.to_string()).collect(),
        })
    }
}

impl Validator for StringOneOf {
    fn description(&self) -> String {
        format!("value must be one of: {:?}", self.values)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();
        if let Some(s) = request.config_value.as_str() {
            if !self.values.iter().any(|v| v == s) {
                diagnostics.push(
                    Diagnostic::error(
                        format!("Invalid value for {}", request.path),
                        format!(
                            "Attribute {} value must be one of: {:?}, got: {:?}",
                            request.path, self.values, s
                        ),
                    )
                    .with_attribute(request.path),
                );
            }
        }
        ValidatorResponse { diagnostics }
    }
}

/// Checks that every member of a set of strings is one of a fixed set of values
pub struct SetValuesOneOf {
    pub values: Vec<String>,
}

impl SetValuesOneOf {
    pub fn create(values: &[&str]) -> Arc<dyn Validator> {
        Arc::new(Self {
            values: values.iter().map(|v| v.to_string()).collect(),
        })
    }
}

impl Validator for SetValuesOneOf {
    fn description(&self) -> String {
        format!("all set members must be one of: {:?}", self.values)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();
        if let Dynamic::List(items) = &request.config_value {
            for (idx, item) in items.iter().enumerate() {
                let Some(s) = item.as_str() else {
                    continue;
                };
                if !self.values.iter().any(|v| v == s) {
                    let path = request.path.clone().index(idx as i64);
                    diagnostics.push(
                        Diagnostic::error(
                            format!("Invalid value for {}", request.path),
                            format!(
                                "Attribute {} set members must be one of: {:?}, got: {:?}",
                                request.path, self.values, s
                            ),
                        )
                        .with_attribute(path),
                    );
                }
            }
        }
        ValidatorResponse { diagnostics }
    }
}

/// Checks that every member of a set of strings can be joined with a
/// separator and split back unchanged: no empty members, no member
/// containing the separator.
pub struct SetValuesJoinable {
    pub separator: char,
}

impl SetValuesJoinable {
    pub fn create(separator: char) -> Arc<dyn Validator> {
        Arc::new(Self { separator })
    }
}

impl Validator for SetValuesJoinable {
    fn description(&self) -> String {
        format!(
            "set members must be non-empty and must not contain {:?}",
            self.separator
        )
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let mut diagnostics = Vec::new();
        if let Dynamic::List(items) = &request.config_value {
            for (idx, item) in items.iter().enumerate() {
                let Some(s) = item.as_str() else {
                    continue;
                };
                let problem = if s.is_empty() {
                    "must not be empty".to_string()
                } else if s.contains(self.separator) {
                    format!("must not contain {:?}, got: {:?}", self.separator, s)
                } else {
                    continue;
                };
                diagnostics.push(
                    Diagnostic::error(
                        format!("Invalid value for {}", request.path),
                        format!("Attribute {} set members {}", request.path, problem),
                    )
                    .with_attribute(request.path.clone().index(idx as i64)),
                );
            }
        }
        ValidatorResponse { diagnostics }
    }
}
