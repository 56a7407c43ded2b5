//! Configuration validation and plan computation
//!
//! These run the per-attribute hooks declared in a [`Schema`]: validators
//! against configuration, then defaults and plan modifiers to produce the
//! planned state handed to create/update.

use crate::schema::{Attribute, DefaultRequest, PlanModifierRequest, Schema, ValidatorRequest};
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::HashMap;

/// Checks a configuration object against a schema.
///
/// Reports unsupported attributes, missing required attributes and any
/// validator failures. Unknown values are skipped; they are validated again
/// once known.
pub fn validate_config(schema: &Schema, config: &DynamicValue) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if let Dynamic::Map(values) = &config.value {
        let mut names: Vec<&String> = values.keys().collect();
        names.sort();
        for name in names {
            if schema.attribute(name).is_none() {
                diagnostics.push(
                    Diagnostic::error(
                        "Unsupported argument",
                        format!("An argument named {:?} is not expected here.", name),
                    )
                    .with_attribute(AttributePath::new(name)),
                );
            }
        }
    }

    for attr in &schema.block.attributes {
        let path = AttributePath::new(&attr.name);
        let value = config.attribute(&attr.name).unwrap_or(&Dynamic::Null);

        if value.is_null() {
            if attr.required {
                diagnostics.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!("The argument {:?} is required, but no definition was found.", attr.name),
                    )
                    .with_attribute(path),
                );
            }
            continue;
        }

        if value.is_unknown() {
            continue;
        }

        if attr.computed && !attr.optional && !attr.required {
            diagnostics.push(
                Diagnostic::error(
                    "Invalid configuration",
                    format!("The attribute {:?} is read-only and cannot be set.", attr.name),
                )
                .with_attribute(path),
            );
            continue;
        }

        for validator in &attr.validators {
            let response = validator.validate(ValidatorRequest {
                config_value: value.clone(),
                path: path.clone(),
            });
            diagnostics.extend(response.diagnostics);
        }
    }

    diagnostics
}

/// Result of planning a resource change
#[derive(Debug, Clone)]
pub struct PlannedChange {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Computes the planned state from the prior state and configuration.
///
/// A null configuration plans a destroy. Otherwise each attribute is
/// planned as: its configured value when set; else its default when
/// optional+computed; else unknown when computed; else null. Plan modifiers
/// then run in declaration order.
pub fn plan_resource_change(
    schema: &Schema,
    prior_state: &DynamicValue,
    config: &DynamicValue,
) -> PlannedChange {
    let mut change = PlannedChange {
        planned_state: DynamicValue::null(),
        requires_replace: Vec::new(),
        diagnostics: Vec::new(),
    };

    if config.is_null() {
        tracing::debug!("Null configuration, planning destroy");
        return change;
    }

    let mut planned = HashMap::with_capacity(schema.block.attributes.len());
    for attr in &schema.block.attributes {
        let path = AttributePath::new(&attr.name);
        let config_value = config
            .attribute(&attr.name)
            .cloned()
            .unwrap_or(Dynamic::Null);
        let state_value = prior_state
            .attribute(&attr.name)
            .cloned()
            .unwrap_or(Dynamic::Null);

        let mut plan_value = initial_plan_value(attr, &config_value, &path);

        for modifier in &attr.plan_modifiers {
            let response = modifier.modify(PlanModifierRequest {
                config_value: config_value.clone(),
                state_value: state_value.clone(),
                plan_value,
                path: path.clone(),
            });
            plan_value = response.plan_value;
            change.diagnostics.extend(response.diagnostics);
            if response.requires_replace && !prior_state.is_null() {
                tracing::debug!("Attribute {} requires replacement", attr.name);
                change.requires_replace.push(path.clone());
            }
        }

        planned.insert(attr.name.clone(), plan_value);
    }

    change.planned_state = DynamicValue::new(Dynamic::Map(planned));
    change
}

fn initial_plan_value(attr: &Attribute, config_value: &Dynamic, path: &AttributePath) -> Dynamic {
    if !config_value.is_null() {
        return config_value.clone();
    }

    if attr.optional && attr.computed {
        if let Some(default) = &attr.default {
            return default
                .default_value(DefaultRequest { path: path.clone() })
                .value;
        }
    }

    if attr.computed {
        Dynamic::Unknown
    } else {
        Dynamic::Null
    }
}
