//! HAProxy objects: declarative models, their OPNsense wire structs, and the
//! conversions between them.

pub mod backend;
pub mod convert;
pub mod decoder;
pub mod frontend;
pub mod selected;
pub mod server;
pub mod state;

pub use backend::Backend;
pub use decoder::{CodecError, CodecWarning, DecodeMode, Decoded, Decoder};
pub use frontend::Frontend;
pub use selected::{ListEncoding, SelectedList, SelectedValue};
pub use server::Server;

use std::collections::BTreeSet;
use std::fmt::Debug;
use tfplug::defaults::StaticDefault;
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, Schema};
use tfplug::types::DynamicValue;
use tfplug::validator::{SetValuesJoinable, SetValuesOneOf, StringLengthBetween, StringOneOf};

use crate::api::OpnsenseApiResource;

/// One kind of HAProxy object managed through the settings controller.
pub trait HaproxyKind: Send + Sync + 'static {
    /// Suffix after the provider prefix, e.g. "haproxy_backend"
    const TYPE_SUFFIX: &'static str;
    /// Human readable name used in diagnostics
    const DISPLAY_NAME: &'static str;

    type Model: Clone + Debug + PartialEq + Send + Sync;
    type Remote: OpnsenseApiResource + Clone + Debug;

    fn schema() -> Schema;

    fn to_remote(model: &Self::Model, encoding: ListEncoding) -> Self::Remote;

    /// Never sees `id`; the caller reattaches it.
    fn from_remote(remote: &Self::Remote, decoder: &mut Decoder) -> Self::Model;

    fn read_model(state: &DynamicValue) -> Result<Self::Model, CodecError>;

    fn write_model(model: &Self::Model, id: &str) -> Result<DynamicValue, CodecError>;
}

/// Runs [`HaproxyKind::from_remote`] under the given decode mode.
pub fn decode<K: HaproxyKind>(
    remote: &K::Remote,
    mode: DecodeMode,
) -> Result<Decoded<K::Model>, CodecError> {
    let mut decoder = Decoder::new(mode);
    let model = K::from_remote(remote, &mut decoder);
    decoder.finish(model)
}

pub(crate) fn id_attr(description: &str) -> Attribute {
    AttributeBuilder::new("id", AttributeType::String)
        .description(description)
        .computed()
        .plan_modifier(UseStateForUnknown::create())
        .build()
}

pub(crate) fn name_attr(description: &str) -> Attribute {
    AttributeBuilder::new("name", AttributeType::String)
        .description(description)
        .required()
        .validator(StringLengthBetween::create(1, 255))
        .build()
}

pub(crate) fn string_attr(name: &str, description: &str, default: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .description(description)
        .optional()
        .computed()
        .default(StaticDefault::string(default))
        .build()
}

pub(crate) fn one_of_attr(
    name: &str,
    description: &str,
    default: &str,
    values: &[&str],
) -> Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .description(description)
        .optional()
        .computed()
        .validator(StringOneOf::create(values))
        .default(StaticDefault::string(default))
        .build()
}

pub(crate) fn bool_attr(name: &str, description: &str, default: bool) -> Attribute {
    AttributeBuilder::new(name, AttributeType::Bool)
        .description(description)
        .optional()
        .computed()
        .default(StaticDefault::bool(default))
        .build()
}

pub(crate) fn int64_attr(name: &str, description: &str, default: i64) -> Attribute {
    AttributeBuilder::new(name, AttributeType::Number)
        .description(description)
        .optional()
        .computed()
        .default(StaticDefault::int64(default))
        .build()
}

pub(crate) fn set_attr(name: &str, description: &str, default: &BTreeSet<String>) -> Attribute {
    AttributeBuilder::new(name, AttributeType::set_of_string())
        .description(description)
        .optional()
        .computed()
        .validator(SetValuesJoinable::create(','))
        .default(StaticDefault::string_set(default))
        .build()
}

pub(crate) fn set_one_of_attr(
    name: &str,
    description: &str,
    default: &BTreeSet<String>,
    values: &[&str],
) -> Attribute {
    AttributeBuilder::new(name, AttributeType::set_of_string())
        .description(description)
        .optional()
        .computed()
        .validator(SetValuesJoinable::create(','))
        .validator(SetValuesOneOf::create(values))
        .default(StaticDefault::string_set(default))
        .build()
}

pub(crate) const RESOLVER_OPTS: &[&str] = &["allow-dup-ip", "ignore-weight", "prevent-dup-ip"];

pub(crate) const RESOLVE_PREFER: &[&str] = &["", "ipv4", "ipv6"];

pub(crate) const ADVERTISED_PROTOCOLS: &[&str] = &["h2", "http11", "http10"];

pub(crate) const STICKINESS_DATA_TYPES: &[&str] = &[
    "conn_cnt",
    "conn_cur",
    "conn_rate",
    "sess_cnt",
    "sess_rate",
    "http_req_cnt",
    "http_req_rate",
    "http_err_cnt",
    "http_err_rate",
    "bytes_in_cnt",
    "bytes_in_rate",
    "bytes_out_cnt",
    "bytes_out_rate",
];

/// Stick-table rate counters share one description shape.
pub(crate) fn rate_period_attr(name: &str, measured: &str, default: &str) -> Attribute {
    string_attr(
        name,
        &format!(
            "The length of the period over which the average {} rate is measured. \
             Defaults to milliseconds; the unit may be given as d, h, m, s, ms or us.",
            measured
        ),
        default,
    )
}
