//! HAProxy public services (`opnsense_haproxy_frontend`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::DynamicValue;
use tfplug::validator::SetValuesJoinable;

use super::convert::{
    bool_to_string, empty_set, int64_to_string_negative, preset_set, set_to_selected_list,
};
use super::state::{StateReader, StateWriter};
use super::{
    bool_attr, id_attr, int64_attr, name_attr, one_of_attr, rate_period_attr, set_attr,
    set_one_of_attr, string_attr, CodecError, Decoder, HaproxyKind, ListEncoding, SelectedList,
    SelectedValue, ADVERTISED_PROTOCOLS, STICKINESS_DATA_TYPES,
};
use crate::api::OpnsenseApiResource;

const DEFAULT_CIPHER_LIST: &str = "ECDHE-ECDSA-AES256-GCM-SHA384:ECDHE-RSA-AES256-GCM-SHA384:\
ECDHE-ECDSA-CHACHA20-POLY1305:ECDHE-RSA-CHACHA20-POLY1305:ECDHE-ECDSA-AES128-GCM-SHA256:\
ECDHE-RSA-AES128-GCM-SHA256:ECDHE-ECDSA-AES256-SHA384:ECDHE-ECDSA-AES128-SHA256";

const DEFAULT_CIPHER_SUITES: &str =
    "TLS_AES_128_GCM_SHA256:TLS_AES_256_GCM_SHA384:TLS_CHACHA20_POLY1305_SHA256";

const SSL_VERSIONS: &[&str] = &["", "SSLv3", "TLSv1.0", "TLSv1.1", "TLSv1.2", "TLSv1.3"];

const SSL_BIND_OPTIONS: &[&str] = &[
    "no-sslv3",
    "no-tlsv10",
    "no-tlsv11",
    "no-tlsv12",
    "no-tlsv13",
    "no-tls-tickets",
    "force-sslv3",
    "force-tlsv10",
    "force-tlsv11",
    "force-tlsv12",
    "force-tlsv13",
    "prefer-client-ciphers",
    "strict-sni",
];

pub struct Frontend;

#[derive(Debug, Clone, PartialEq)]
pub struct FrontendModel {
    pub advertised_protocols: BTreeSet<String>,
    pub basic_auth_enabled: bool,
    pub basic_auth_groups: BTreeSet<String>,
    pub basic_auth_users: BTreeSet<String>,
    pub bind: BTreeSet<String>,
    pub bind_options: String,
    pub connection_behaviour: String,
    pub custom_options: String,
    pub default_backend: String,
    pub description: String,
    pub enabled: bool,
    pub forward_for: bool,
    pub http2enabled: bool,
    pub http2enabled_nontls: bool,
    pub linked_actions: BTreeSet<String>,
    pub linked_cpu_affinity_rules: BTreeSet<String>,
    pub linked_errorfiles: BTreeSet<String>,
    pub logging_detailed_log: bool,
    pub logging_dont_log_normal: bool,
    pub logging_dont_log_null: bool,
    pub logging_log_separate_errors: bool,
    pub logging_socket_stats: bool,
    pub mode: String,
    pub name: String,
    pub prometheus_enabled: bool,
    pub prometheus_path: String,
    pub ssl_advanced_enabled: bool,
    pub ssl_bind_options: BTreeSet<String>,
    pub ssl_certificates: BTreeSet<String>,
    pub ssl_cipher_list: String,
    pub ssl_cipher_suites: String,
    pub ssl_client_auth_cas: BTreeSet<String>,
    pub ssl_client_auth_crls: BTreeSet<String>,
    pub ssl_client_auth_enabled: bool,
    pub ssl_client_auth_verify: String,
    pub ssl_custom_options: String,
    pub ssl_default_certificate: String,
    pub ssl_enabled: bool,
    pub ssl_hsts_enabled: bool,
    pub ssl_hsts_include_sub_domains: bool,
    pub ssl_hsts_max_age: i64,
    pub ssl_hsts_preload: bool,
    pub ssl_max_version: String,
    pub ssl_min_version: String,
    pub stickiness_bytes_in_rate_period: String,
    pub stickiness_bytes_out_rate_period: String,
    pub stickiness_conn_rate_period: String,
    pub stickiness_counter: bool,
    pub stickiness_counter_key: String,
    pub stickiness_data_types: BTreeSet<String>,
    pub stickiness_expire: String,
    pub stickiness_http_err_rate_period: String,
    pub stickiness_http_req_rate_period: String,
    pub stickiness_length: i64,
    pub stickiness_pattern: String,
    pub stickiness_sess_rate_period: String,
    pub stickiness_size: String,
    pub tuning_max_connections: i64,
    pub tuning_shards: String,
    pub tuning_timeout_client: String,
    pub tuning_timeout_http_keep_alive: String,
    pub tuning_timeout_http_req: String,
}

impl Default for FrontendModel {
    /// Matches the schema defaults. `bind` and `name` have none.
    fn default() -> Self {
        Self {
            advertised_protocols: preset_set(&["h2", "http11"]),
            basic_auth_enabled: false,
            basic_auth_groups: empty_set(),
            basic_auth_users: empty_set(),
            bind: empty_set(),
            bind_options: String::new(),
            connection_behaviour: "http-keep-alive".to_string(),
            custom_options: String::new(),
            default_backend: String::new(),
            description: String::new(),
            enabled: true,
            forward_for: false,
            http2enabled: false,
            http2enabled_nontls: false,
            linked_actions: empty_set(),
            linked_cpu_affinity_rules: empty_set(),
            linked_errorfiles: empty_set(),
            logging_detailed_log: false,
            logging_dont_log_normal: false,
            logging_dont_log_null: false,
            logging_log_separate_errors: false,
            logging_socket_stats: false,
            mode: "http".to_string(),
            name: String::new(),
            prometheus_enabled: false,
            prometheus_path: "/metrics".to_string(),
            ssl_advanced_enabled: false,
            ssl_bind_options: empty_set(),
            ssl_certificates: empty_set(),
            ssl_cipher_list: DEFAULT_CIPHER_LIST.to_string(),
            ssl_cipher_suites: DEFAULT_CIPHER_SUITES.to_string(),
            ssl_client_auth_cas: empty_set(),
            ssl_client_auth_crls: empty_set(),
            ssl_client_auth_enabled: false,
            ssl_client_auth_verify: "required".to_string(),
            ssl_custom_options: String::new(),
            ssl_default_certificate: String::new(),
            ssl_enabled: false,
            ssl_hsts_enabled: true,
            ssl_hsts_include_sub_domains: false,
            ssl_hsts_max_age: 15768000,
            ssl_hsts_preload: false,
            ssl_max_version: String::new(),
            ssl_min_version: String::new(),
            stickiness_bytes_in_rate_period: "1m".to_string(),
            stickiness_bytes_out_rate_period: "1m".to_string(),
            stickiness_conn_rate_period: "10s".to_string(),
            stickiness_counter: true,
            stickiness_counter_key: "src".to_string(),
            stickiness_data_types: empty_set(),
            stickiness_expire: "30m".to_string(),
            stickiness_http_err_rate_period: "10s".to_string(),
            stickiness_http_req_rate_period: "10s".to_string(),
            stickiness_length: -1,
            stickiness_pattern: String::new(),
            stickiness_sess_rate_period: "10s".to_string(),
            stickiness_size: "50k".to_string(),
            tuning_max_connections: -1,
            tuning_shards: String::new(),
            tuning_timeout_client: String::new(),
            tuning_timeout_http_keep_alive: String::new(),
            tuning_timeout_http_req: String::new(),
        }
    }
}

/// Frontend as exchanged with `haproxy/settings/*Frontend`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteFrontend {
    pub advertised_protocols: SelectedList,
    #[serde(rename = "basicAuthEnabled")]
    pub basic_auth_enabled: String,
    #[serde(rename = "basicAuthGroups")]
    pub basic_auth_groups: SelectedList,
    #[serde(rename = "basicAuthUsers")]
    pub basic_auth_users: SelectedList,
    pub bind: SelectedList,
    #[serde(rename = "bindOptions")]
    pub bind_options: String,
    #[serde(rename = "connectionBehaviour")]
    pub connection_behaviour: SelectedValue,
    #[serde(rename = "customOptions")]
    pub custom_options: String,
    #[serde(rename = "defaultBackend")]
    pub default_backend: SelectedValue,
    pub description: String,
    pub enabled: String,
    #[serde(rename = "forwardFor")]
    pub forward_for: String,
    #[serde(rename = "http2Enabled")]
    pub http2_enabled: String,
    #[serde(rename = "http2Enabled_nontls")]
    pub http2_enabled_nontls: String,
    #[serde(rename = "linkedActions")]
    pub linked_actions: SelectedList,
    #[serde(rename = "linkedCpuAffinityRules")]
    pub linked_cpu_affinity_rules: SelectedList,
    #[serde(rename = "linkedErrorfiles")]
    pub linked_errorfiles: SelectedList,
    #[serde(rename = "logging_detailedLog")]
    pub logging_detailed_log: String,
    #[serde(rename = "logging_dontLogNormal")]
    pub logging_dont_log_normal: String,
    #[serde(rename = "logging_dontLogNull")]
    pub logging_dont_log_null: String,
    #[serde(rename = "logging_logSeparateErrors")]
    pub logging_log_separate_errors: String,
    #[serde(rename = "logging_socketStats")]
    pub logging_socket_stats: String,
    pub mode: SelectedValue,
    pub name: String,
    pub prometheus_enabled: String,
    pub prometheus_path: String,
    #[serde(rename = "ssl_advancedEnabled")]
    pub ssl_advanced_enabled: String,
    #[serde(rename = "ssl_bindOptions")]
    pub ssl_bind_options: SelectedList,
    pub ssl_certificates: SelectedList,
    #[serde(rename = "ssl_cipherList")]
    pub ssl_cipher_list: String,
    #[serde(rename = "ssl_cipherSuites")]
    pub ssl_cipher_suites: String,
    #[serde(rename = "ssl_clientAuthCAs")]
    pub ssl_client_auth_cas: SelectedList,
    #[serde(rename = "ssl_clientAuthCRLs")]
    pub ssl_client_auth_crls: SelectedList,
    #[serde(rename = "ssl_clientAuthEnabled")]
    pub ssl_client_auth_enabled: String,
    #[serde(rename = "ssl_clientAuthVerify")]
    pub ssl_client_auth_verify: SelectedValue,
    #[serde(rename = "ssl_customOptions")]
    pub ssl_custom_options: String,
    pub ssl_default_certificate: SelectedValue,
    pub ssl_enabled: String,
    #[serde(rename = "ssl_hstsEnabled")]
    pub ssl_hsts_enabled: String,
    #[serde(rename = "ssl_hstsIncludeSubDomains")]
    pub ssl_hsts_include_sub_domains: String,
    #[serde(rename = "ssl_hstsMaxAge")]
    pub ssl_hsts_max_age: String,
    #[serde(rename = "ssl_hstsPreload")]
    pub ssl_hsts_preload: String,
    #[serde(rename = "ssl_maxVersion")]
    pub ssl_max_version: SelectedValue,
    #[serde(rename = "ssl_minVersion")]
    pub ssl_min_version: SelectedValue,
    #[serde(rename = "stickiness_bytesInRatePeriod")]
    pub stickiness_bytes_in_rate_period: String,
    #[serde(rename = "stickiness_bytesOutRatePeriod")]
    pub stickiness_bytes_out_rate_period: String,
    #[serde(rename = "stickiness_connRatePeriod")]
    pub stickiness_conn_rate_period: String,
    pub stickiness_counter: String,
    pub stickiness_counter_key: String,
    #[serde(rename = "stickiness_dataTypes")]
    pub stickiness_data_types: SelectedList,
    pub stickiness_expire: String,
    #[serde(rename = "stickiness_httpErrRatePeriod")]
    pub stickiness_http_err_rate_period: String,
    #[serde(rename = "stickiness_httpReqRatePeriod")]
    pub stickiness_http_req_rate_period: String,
    pub stickiness_length: String,
    pub stickiness_pattern: SelectedValue,
    #[serde(rename = "stickiness_sessRatePeriod")]
    pub stickiness_sess_rate_period: String,
    pub stickiness_size: String,
    #[serde(rename = "tuning_maxConnections")]
    pub tuning_max_connections: String,
    pub tuning_shards: String,
    #[serde(rename = "tuning_timeoutClient")]
    pub tuning_timeout_client: String,
    #[serde(rename = "tuning_timeoutHttpKeepAlive")]
    pub tuning_timeout_http_keep_alive: String,
    #[serde(rename = "tuning_timeoutHttpReq")]
    pub tuning_timeout_http_req: String,
}

impl OpnsenseApiResource for RemoteFrontend {
    const CONTROLLER: &'static str = "haproxy/settings";
    const ENDPOINT: &'static str = "Frontend";
    const WRAPPER: &'static str = "frontend";
}

impl HaproxyKind for Frontend {
    const TYPE_SUFFIX: &'static str = "haproxy_frontend";
    const DISPLAY_NAME: &'static str = "HAProxy frontend";

    type Model = FrontendModel;
    type Remote = RemoteFrontend;

    fn schema() -> Schema {
        SchemaBuilder::new()
            .description("Public services: the listen addresses HAProxy accepts traffic on.")
            .attribute(id_attr("UUID of the frontend."))
            .attribute(name_attr("Name to identify the frontend."))
            .attribute(
                AttributeBuilder::new("bind", AttributeType::set_of_string())
                    .description("Listen addresses, e.g. 0.0.0.0:443 or unix@name.")
                    .required()
                    .validator(SetValuesJoinable::create(','))
                    .build(),
            )
            .attribute(set_one_of_attr(
                "advertised_protocols",
                "Protocols advertised through TLS ALPN. SSL offloading must be enabled.",
                &preset_set(&["h2", "http11"]),
                ADVERTISED_PROTOCOLS,
            ))
            .attribute(bool_attr(
                "basic_auth_enabled",
                "Enable HTTP basic authentication.",
                false,
            ))
            .attribute(set_attr("basic_auth_groups", "Allowed groups.", &empty_set()))
            .attribute(set_attr("basic_auth_users", "Allowed users.", &empty_set()))
            .attribute(string_attr(
                "bind_options",
                "Parameters appended to every listen address line.",
                "",
            ))
            .attribute(one_of_attr(
                "connection_behaviour",
                "Persistent connection handling (http-keep-alive, httpclose, http-server-close).",
                "http-keep-alive",
                &["http-keep-alive", "httpclose", "http-server-close"],
            ))
            .attribute(string_attr(
                "custom_options",
                "Lines added verbatim to the frontend section.",
                "",
            ))
            .attribute(string_attr(
                "default_backend",
                "Backend pool used when no rule selects another one.",
                "",
            ))
            .attribute(string_attr("description", "Description for this frontend.", ""))
            .attribute(bool_attr("enabled", "Enable this frontend.", true))
            .attribute(bool_attr(
                "forward_for",
                "Insert an X-Forwarded-For header into requests sent to servers.",
                false,
            ))
            .attribute(bool_attr("http2enabled", "Enable HTTP/2.", false))
            .attribute(bool_attr(
                "http2enabled_nontls",
                "Enable HTTP/2 without SSL offloading.",
                false,
            ))
            .attribute(set_attr(
                "linked_actions",
                "Rules included in this frontend.",
                &empty_set(),
            ))
            .attribute(set_attr(
                "linked_cpu_affinity_rules",
                "CPU affinity rules applied to this frontend.",
                &empty_set(),
            ))
            .attribute(set_attr(
                "linked_errorfiles",
                "Error messages included in this frontend.",
                &empty_set(),
            ))
            .attribute(bool_attr(
                "logging_detailed_log",
                "Use the verbose log format.",
                false,
            ))
            .attribute(bool_attr(
                "logging_dont_log_normal",
                "Do not log normal, successful connections.",
                false,
            ))
            .attribute(bool_attr(
                "logging_dont_log_null",
                "Do not log connections that carried no data.",
                false,
            ))
            .attribute(bool_attr(
                "logging_log_separate_errors",
                "Raise the log level of connections that did not complete successfully.",
                false,
            ))
            .attribute(bool_attr(
                "logging_socket_stats",
                "Collect separate statistics for each socket.",
                false,
            ))
            .attribute(one_of_attr(
                "mode",
                "Running mode of the frontend (http, ssl, tcp).",
                "http",
                &["http", "ssl", "tcp"],
            ))
            .attribute(bool_attr(
                "prometheus_enabled",
                "Enable the Prometheus exporter.",
                false,
            ))
            .attribute(string_attr(
                "prometheus_path",
                "Path the Prometheus exporter is served on.",
                "/metrics",
            ))
            .attribute(bool_attr(
                "ssl_advanced_enabled",
                "Enable the advanced SSL settings below.",
                false,
            ))
            .attribute(set_one_of_attr(
                "ssl_bind_options",
                "SSL options to enforce or disable.",
                &empty_set(),
                SSL_BIND_OPTIONS,
            ))
            .attribute(set_attr(
                "ssl_certificates",
                "Certificates offered by this frontend.",
                &empty_set(),
            ))
            .attribute(string_attr(
                "ssl_cipher_list",
                "Cipher list negotiated up to TLSv1.2.",
                DEFAULT_CIPHER_LIST,
            ))
            .attribute(string_attr(
                "ssl_cipher_suites",
                "Cipher suites negotiated for TLSv1.3.",
                DEFAULT_CIPHER_SUITES,
            ))
            .attribute(set_attr(
                "ssl_client_auth_cas",
                "CAs used for client certificate authentication.",
                &empty_set(),
            ))
            .attribute(set_attr(
                "ssl_client_auth_crls",
                "CRLs used for client certificate authentication.",
                &empty_set(),
            ))
            .attribute(bool_attr(
                "ssl_client_auth_enabled",
                "Enable client certificate authentication.",
                false,
            ))
            .attribute(one_of_attr(
                "ssl_client_auth_verify",
                "Whether a client certificate is requested (none, optional, required).",
                "required",
                &["", "none", "optional", "required"],
            ))
            .attribute(string_attr(
                "ssl_custom_options",
                "Additional SSL parameters.",
                "",
            ))
            .attribute(string_attr(
                "ssl_default_certificate",
                "Certificate presented when the client sends no matching SNI.",
                "",
            ))
            .attribute(bool_attr("ssl_enabled", "Enable SSL offloading.", false))
            .attribute(bool_attr(
                "ssl_hsts_enabled",
                "Enable HTTP Strict Transport Security.",
                true,
            ))
            .attribute(bool_attr(
                "ssl_hsts_include_sub_domains",
                "Apply HSTS to all subdomains.",
                false,
            ))
            .attribute(int64_attr(
                "ssl_hsts_max_age",
                "Seconds for which clients should only use HTTPS.",
                15768000,
            ))
            .attribute(bool_attr(
                "ssl_hsts_preload",
                "Request inclusion in the HSTS preload list.",
                false,
            ))
            .attribute(one_of_attr(
                "ssl_max_version",
                "Highest SSL/TLS version accepted.",
                "",
                SSL_VERSIONS,
            ))
            .attribute(one_of_attr(
                "ssl_min_version",
                "Lowest SSL/TLS version accepted.",
                "",
                SSL_VERSIONS,
            ))
            .attribute(rate_period_attr(
                "stickiness_bytes_in_rate_period",
                "incoming bytes",
                "1m",
            ))
            .attribute(rate_period_attr(
                "stickiness_bytes_out_rate_period",
                "outgoing bytes",
                "1m",
            ))
            .attribute(rate_period_attr(
                "stickiness_conn_rate_period",
                "connection",
                "10s",
            ))
            .attribute(bool_attr(
                "stickiness_counter",
                "Make sticky counter values available to conditions.",
                true,
            ))
            .attribute(string_attr(
                "stickiness_counter_key",
                "Sample expression selecting the table entry to update, `src` by default.",
                "src",
            ))
            .attribute(set_one_of_attr(
                "stickiness_data_types",
                "Additional counters stored in the stick table.",
                &empty_set(),
                STICKINESS_DATA_TYPES,
            ))
            .attribute(string_attr(
                "stickiness_expire",
                "Maximum lifetime of a stick-table entry, e.g. 30m.",
                "30m",
            ))
            .attribute(rate_period_attr(
                "stickiness_http_err_rate_period",
                "HTTP error",
                "10s",
            ))
            .attribute(rate_period_attr(
                "stickiness_http_req_rate_period",
                "HTTP request",
                "10s",
            ))
            .attribute(int64_attr(
                "stickiness_length",
                "Maximum length of a value in the stick table.",
                -1,
            ))
            .attribute(one_of_attr(
                "stickiness_pattern",
                "Type of data stored in the stick table (ipv4, ipv6, integer, string, binary).",
                "",
                &["", "ipv4", "ipv6", "integer", "string", "binary"],
            ))
            .attribute(rate_period_attr(
                "stickiness_sess_rate_period",
                "session",
                "10s",
            ))
            .attribute(string_attr(
                "stickiness_size",
                "Maximum number of stick-table entries with a k, m or g suffix.",
                "50k",
            ))
            .attribute(int64_attr(
                "tuning_max_connections",
                "Maximum concurrent connections for this frontend.",
                -1,
            ))
            .attribute(string_attr(
                "tuning_shards",
                "Listeners created per address, spread over the available threads.",
                "",
            ))
            .attribute(string_attr(
                "tuning_timeout_client",
                "Maximum inactivity time on the client side.",
                "",
            ))
            .attribute(string_attr(
                "tuning_timeout_http_keep_alive",
                "Maximum time to wait for a new HTTP request on a kept-alive connection.",
                "",
            ))
            .attribute(string_attr(
                "tuning_timeout_http_req",
                "Maximum time to wait for a complete HTTP request.",
                "",
            ))
            .build()
    }

    fn to_remote(m: &FrontendModel, encoding: ListEncoding) -> RemoteFrontend {
        let list = |set: &BTreeSet<String>| set_to_selected_list(set, encoding);

        RemoteFrontend {
            advertised_protocols: list(&m.advertised_protocols),
            basic_auth_enabled: bool_to_string(m.basic_auth_enabled),
            basic_auth_groups: list(&m.basic_auth_groups),
            basic_auth_users: list(&m.basic_auth_users),
            bind: list(&m.bind),
            bind_options: m.bind_options.clone(),
            connection_behaviour: SelectedValue::new(&m.connection_behaviour),
            custom_options: m.custom_options.clone(),
            default_backend: SelectedValue::new(&m.default_backend),
            description: m.description.clone(),
            enabled: bool_to_string(m.enabled),
            forward_for: bool_to_string(m.forward_for),
            http2_enabled: bool_to_string(m.http2enabled),
            http2_enabled_nontls: bool_to_string(m.http2enabled_nontls),
            linked_actions: list(&m.linked_actions),
            linked_cpu_affinity_rules: list(&m.linked_cpu_affinity_rules),
            linked_errorfiles: list(&m.linked_errorfiles),
            logging_detailed_log: bool_to_string(m.logging_detailed_log),
            logging_dont_log_normal: bool_to_string(m.logging_dont_log_normal),
            logging_dont_log_null: bool_to_string(m.logging_dont_log_null),
            logging_log_separate_errors: bool_to_string(m.logging_log_separate_errors),
            logging_socket_stats: bool_to_string(m.logging_socket_stats),
            mode: SelectedValue::new(&m.mode),
            name: m.name.clone(),
            prometheus_enabled: bool_to_string(m.prometheus_enabled),
            prometheus_path: m.prometheus_path.clone(),
            ssl_advanced_enabled: bool_to_string(m.ssl_advanced_enabled),
            ssl_bind_options: list(&m.ssl_bind_options),
            ssl_certificates: list(&m.ssl_certificates),
            ssl_cipher_list: m.ssl_cipher_list.clone(),
            ssl_cipher_suites: m.ssl_cipher_suites.clone(),
            ssl_client_auth_cas: list(&m.ssl_client_auth_cas),
            ssl_client_auth_crls: list(&m.ssl_client_auth_crls),
            ssl_client_auth_enabled: bool_to_string(m.ssl_client_auth_enabled),
            ssl_client_auth_verify: SelectedValue::new(&m.ssl_client_auth_verify),
            ssl_custom_options: m.ssl_custom_options.clone(),
            ssl_default_certificate: SelectedValue::new(&m.ssl_default_certificate),
            ssl_enabled: bool_to_string(m.ssl_enabled),
            ssl_hsts_enabled: bool_to_string(m.ssl_hsts_enabled),
            ssl_hsts_include_sub_domains: bool_to_string(m.ssl_hsts_include_sub_domains),
            ssl_hsts_max_age: int64_to_string_negative(m.ssl_hsts_max_age),
            ssl_hsts_preload: bool_to_string(m.ssl_hsts_preload),
            ssl_max_version: SelectedValue::new(&m.ssl_max_version),
            ssl_min_version: SelectedValue::new(&m.ssl_min_version),
            stickiness_bytes_in_rate_period: m.stickiness_bytes_in_rate_period.clone(),
            stickiness_bytes_out_rate_period: m.stickiness_bytes_out_rate_period.clone(),
            stickiness_conn_rate_period: m.stickiness_conn_rate_period.clone(),
            stickiness_counter: bool_to_string(m.stickiness_counter),
            stickiness_counter_key: m.stickiness_counter_key.clone(),
            stickiness_data_types: list(&m.stickiness_data_types),
            stickiness_expire: m.stickiness_expire.clone(),
            stickiness_http_err_rate_period: m.stickiness_http_err_rate_period.clone(),
            stickiness_http_req_rate_period: m.stickiness_http_req_rate_period.clone(),
            stickiness_length: int64_to_string_negative(m.stickiness_length),
            stickiness_pattern: SelectedValue::new(&m.stickiness_pattern),
            stickiness_sess_rate_period: m.stickiness_sess_rate_period.clone(),
            stickiness_size: m.stickiness_size.clone(),
            tuning_max_connections: int64_to_string_negative(m.tuning_max_connections),
            tuning_shards: m.tuning_shards.clone(),
            tuning_timeout_client: m.tuning_timeout_client.clone(),
            tuning_timeout_http_keep_alive: m.tuning_timeout_http_keep_alive.clone(),
            tuning_timeout_http_req: m.tuning_timeout_http_req.clone(),
        }
    }

    fn from_remote(r: &RemoteFrontend, d: &mut Decoder) -> FrontendModel {
        FrontendModel {
            advertised_protocols: d.set(&r.advertised_protocols),
            basic_auth_enabled: d.bool("basicAuthEnabled", &r.basic_auth_enabled),
            basic_auth_groups: d.set(&r.basic_auth_groups),
            basic_auth_users: d.set(&r.basic_auth_users),
            bind: d.set(&r.bind),
            bind_options: r.bind_options.clone(),
            connection_behaviour: d.selected(&r.connection_behaviour),
            custom_options: r.custom_options.clone(),
            default_backend: d.selected(&r.default_backend),
            description: r.description.clone(),
            enabled: d.bool("enabled", &r.enabled),
            forward_for: d.bool("forwardFor", &r.forward_for),
            http2enabled: d.bool("http2Enabled", &r.http2_enabled),
            http2enabled_nontls: d.bool("http2Enabled_nontls", &r.http2_enabled_nontls),
            linked_actions: d.set(&r.linked_actions),
            linked_cpu_affinity_rules: d.set(&r.linked_cpu_affinity_rules),
            linked_errorfiles: d.set(&r.linked_errorfiles),
            logging_detailed_log: d.bool("logging_detailedLog", &r.logging_detailed_log),
            logging_dont_log_normal: d.bool("logging_dontLogNormal", &r.logging_dont_log_normal),
            logging_dont_log_null: d.bool("logging_dontLogNull", &r.logging_dont_log_null),
            logging_log_separate_errors: d.bool(
                "logging_logSeparateErrors",
                &r.logging_log_separate_errors,
            ),
            logging_socket_stats: d.bool("logging_socketStats", &r.logging_socket_stats),
            mode: d.selected(&r.mode),
            name: r.name.clone(),
            prometheus_enabled: d.bool("prometheus_enabled", &r.prometheus_enabled),
            prometheus_path: r.prometheus_path.clone(),
            ssl_advanced_enabled: d.bool("ssl_advancedEnabled", &r.ssl_advanced_enabled),
            ssl_bind_options: d.set(&r.ssl_bind_options),
            ssl_certificates: d.set(&r.ssl_certificates),
            ssl_cipher_list: r.ssl_cipher_list.clone(),
            ssl_cipher_suites: r.ssl_cipher_suites.clone(),
            ssl_client_auth_cas: d.set(&r.ssl_client_auth_cas),
            ssl_client_auth_crls: d.set(&r.ssl_client_auth_crls),
            ssl_client_auth_enabled: d.bool("ssl_clientAuthEnabled", &r.ssl_client_auth_enabled),
            ssl_client_auth_verify: d.selected(&r.ssl_client_auth_verify),
            ssl_custom_options: r.ssl_custom_options.clone(),
            ssl_default_certificate: d.selected(&r.ssl_default_certificate),
            ssl_enabled: d.bool("ssl_enabled", &r.ssl_enabled),
            ssl_hsts_enabled: d.bool("ssl_hstsEnabled", &r.ssl_hsts_enabled),
            ssl_hsts_include_sub_domains: d.bool(
                "ssl_hstsIncludeSubDomains",
                &r.ssl_hsts_include_sub_domains,
            ),
            ssl_hsts_max_age: d.int64("ssl_hstsMaxAge", &r.ssl_hsts_max_age),
            ssl_hsts_preload: d.bool("ssl_hstsPreload", &r.ssl_hsts_preload),
            ssl_max_version: d.selected(&r.ssl_max_version),
            ssl_min_version: d.selected(&r.ssl_min_version),
            stickiness_bytes_in_rate_period: r.stickiness_bytes_in_rate_period.clone(),
            stickiness_bytes_out_rate_period: r.stickiness_bytes_out_rate_period.clone(),
            stickiness_conn_rate_period: r.stickiness_conn_rate_period.clone(),
            stickiness_counter: d.bool("stickiness_counter", &r.stickiness_counter),
            stickiness_counter_key: r.stickiness_counter_key.clone(),
            stickiness_data_types: d.set(&r.stickiness_data_types),
            stickiness_expire: r.stickiness_expire.clone(),
            stickiness_http_err_rate_period: r.stickiness_http_err_rate_period.clone(),
            stickiness_http_req_rate_period: r.stickiness_http_req_rate_period.clone(),
            stickiness_length: d.int64("stickiness_length", &r.stickiness_length),
            stickiness_pattern: d.selected(&r.stickiness_pattern),
            stickiness_sess_rate_period: r.stickiness_sess_rate_period.clone(),
            stickiness_size: r.stickiness_size.clone(),
            tuning_max_connections: d.int64("tuning_maxConnections", &r.tuning_max_connections),
            tuning_shards: r.tuning_shards.clone(),
            tuning_timeout_client: r.tuning_timeout_client.clone(),
            tuning_timeout_http_keep_alive: r.tuning_timeout_http_keep_alive.clone(),
            tuning_timeout_http_req: r.tuning_timeout_http_req.clone(),
        }
    }

    fn read_model(state: &DynamicValue) -> Result<FrontendModel, CodecError> {
        let r = StateReader::new(state);
        Ok(FrontendModel {
            advertised_protocols: r.set("advertised_protocols")?,
            basic_auth_enabled: r.bool("basic_auth_enabled")?,
            basic_auth_groups: r.set("basic_auth_groups")?,
            basic_auth_users: r.set("basic_auth_users")?,
            bind: r.set("bind")?,
            bind_options: r.string("bind_options")?,
            connection_behaviour: r.string("connection_behaviour")?,
            custom_options: r.string("custom_options")?,
            default_backend: r.string("default_backend")?,
            description: r.string("description")?,
            enabled: r.bool("enabled")?,
            forward_for: r.bool("forward_for")?,
            http2enabled: r.bool("http2enabled")?,
            http2enabled_nontls: r.bool("http2enabled_nontls")?,
            linked_actions: r.set("linked_actions")?,
            linked_cpu_affinity_rules: r.set("linked_cpu_affinity_rules")?,
            linked_errorfiles: r.set("linked_errorfiles")?,
            logging_detailed_log: r.bool("logging_detailed_log")?,
            logging_dont_log_normal: r.bool("logging_dont_log_normal")?,
            logging_dont_log_null: r.bool("logging_dont_log_null")?,
            logging_log_separate_errors: r.bool("logging_log_separate_errors")?,
            logging_socket_stats: r.bool("logging_socket_stats")?,
            mode: r.string("mode")?,
            name: r.string("name")?,
            prometheus_enabled: r.bool("prometheus_enabled")?,
            prometheus_path: r.string("prometheus_path")?,
            ssl_advanced_enabled: r.bool("ssl_advanced_enabled")?,
            ssl_bind_options: r.set("ssl_bind_options")?,
            ssl_certificates: r.set("ssl_certificates")?,
            ssl_cipher_list: r.string("ssl_cipher_list")?,
            ssl_cipher_suites: r.string("ssl_cipher_suites")?,
            ssl_client_auth_cas: r.set("ssl_client_auth_cas")?,
            ssl_client_auth_crls: r.set("ssl_client_auth_crls")?,
            ssl_client_auth_enabled: r.bool("ssl_client_auth_enabled")?,
            ssl_client_auth_verify: r.string("ssl_client_auth_verify")?,
            ssl_custom_options: r.string("ssl_custom_options")?,
            ssl_default_certificate: r.string("ssl_default_certificate")?,
            ssl_enabled: r.bool("ssl_enabled")?,
            ssl_hsts_enabled: r.bool("ssl_hsts_enabled")?,
            ssl_hsts_include_sub_domains: r.bool("ssl_hsts_include_sub_domains")?,
            ssl_hsts_max_age: r.int64("ssl_hsts_max_age")?,
            ssl_hsts_preload: r.bool("ssl_hsts_preload")?,
            ssl_max_version: r.string("ssl_max_version")?,
            ssl_min_version: r.string("ssl_min_version")?,
            stickiness_bytes_in_rate_period: r.string("stickiness_bytes_in_rate_period")?,
            stickiness_bytes_out_rate_period: r.string("stickiness_bytes_out_rate_period")?,
            stickiness_conn_rate_period: r.string("stickiness_conn_rate_period")?,
            stickiness_counter: r.bool("stickiness_counter")?,
            stickiness_counter_key: r.string("stickiness_counter_key")?,
            stickiness_data_types: r.set("stickiness_data_types")?,
            stickiness_expire: r.string("stickiness_expire")?,
            stickiness_http_err_rate_period: r.string("stickiness_http_err_rate_period")?,
            stickiness_http_req_rate_period: r.string("stickiness_http_req_rate_period")?,
            stickiness_length: r.int64("stickiness_length")?,
            stickiness_pattern: r.string("stickiness_pattern")?,
            stickiness_sess_rate_period: r.string("stickiness_sess_rate_period")?,
            stickiness_size: r.string("stickiness_size")?,
            tuning_max_connections: r.int64("tuning_max_connections")?,
            tuning_shards: r.string("tuning_shards")?,
            tuning_timeout_client: r.string("tuning_timeout_client")?,
            tuning_timeout_http_keep_alive: r.string("tuning_timeout_http_keep_alive")?,
            tuning_timeout_http_req: r.string("tuning_timeout_http_req")?,
        })
    }

    fn write_model(m: &FrontendModel, id: &str) -> Result<DynamicValue, CodecError> {
        Ok(StateWriter::new()
            .string("id", id)?
            .set("advertised_protocols", &m.advertised_protocols)?
            .bool("basic_auth_enabled", m.basic_auth_enabled)?
            .set("basic_auth_groups", &m.basic_auth_groups)?
            .set("basic_auth_users", &m.basic_auth_users)?
            .set("bind", &m.bind)?
            .string("bind_options", &m.bind_options)?
            .string("connection_behaviour", &m.connection_behaviour)?
            .string("custom_options", &m.custom_options)?
            .string("default_backend", &m.default_backend)?
            .string("description", &m.description)?
            .bool("enabled", m.enabled)?
            .bool("forward_for", m.forward_for)?
            .bool("http2enabled", m.http2enabled)?
            .bool("http2enabled_nontls", m.http2enabled_nontls)?
            .set("linked_actions", &m.linked_actions)?
            .set("linked_cpu_affinity_rules", &m.linked_cpu_affinity_rules)?
            .set("linked_errorfiles", &m.linked_errorfiles)?
            .bool("logging_detailed_log", m.logging_detailed_log)?
            .bool("logging_dont_log_normal", m.logging_dont_log_normal)?
            .bool("logging_dont_log_null", m.logging_dont_log_null)?
            .bool("logging_log_separate_errors", m.logging_log_separate_errors)?
            .bool("logging_socket_stats", m.logging_socket_stats)?
            .string("mode", &m.mode)?
            .string("name", &m.name)?
            .bool("prometheus_enabled", m.prometheus_enabled)?
            .string("prometheus_path", &m.prometheus_path)?
            .bool("ssl_advanced_enabled", m.ssl_advanced_enabled)?
            .set("ssl_bind_options", &m.ssl_bind_options)?
            .set("ssl_certificates", &m.ssl_certificates)?
            .string("ssl_cipher_list", &m.ssl_cipher_list)?
            .string("ssl_cipher_suites", &m.ssl_cipher_suites)?
            .set("ssl_client_auth_cas", &m.ssl_client_auth_cas)?
            .set("ssl_client_auth_crls", &m.ssl_client_auth_crls)?
            .bool("ssl_client_auth_enabled", m.ssl_client_auth_enabled)?
            .string("ssl_client_auth_verify", &m.ssl_client_auth_verify)?
            .string("ssl_custom_options", &m.ssl_custom_options)?
            .string("ssl_default_certificate", &m.ssl_default_certificate)?
            .bool("ssl_enabled", m.ssl_enabled)?
            .bool("ssl_hsts_enabled", m.ssl_hsts_enabled)?
            .bool("ssl_hsts_include_sub_domains", m.ssl_hsts_include_sub_domains)?
            .int64("ssl_hsts_max_age", m.ssl_hsts_max_age)?
            .bool("ssl_hsts_preload", m.ssl_hsts_preload)?
            .string("ssl_max_version", &m.ssl_max_version)?
            .string("ssl_min_version", &m.ssl_min_version)?
            .string("stickiness_bytes_in_rate_period", &m.stickiness_bytes_in_rate_period)?
            .string("stickiness_bytes_out_rate_period", &m.stickiness_bytes_out_rate_period)?
            .string("stickiness_conn_rate_period", &m.stickiness_conn_rate_period)?
            .bool("stickiness_counter", m.stickiness_counter)?
            .string("stickiness_counter_key", &m.stickiness_counter_key)?
            .set("stickiness_data_types", &m.stickiness_data_types)?
            .string("stickiness_expire", &m.stickiness_expire)?
            .string("stickiness_http_err_rate_period", &m.stickiness_http_err_rate_period)?
            .string("stickiness_http_req_rate_period", &m.stickiness_http_req_rate_period)?
            .int64("stickiness_length", m.stickiness_length)?
            .string("stickiness_pattern", &m.stickiness_pattern)?
            .string("stickiness_sess_rate_period", &m.stickiness_sess_rate_period)?
            .string("stickiness_size", &m.stickiness_size)?
            .int64("tuning_max_connections", m.tuning_max_connections)?
            .string("tuning_shards", &m.tuning_shards)?
            .string("tuning_timeout_client", &m.tuning_timeout_client)?
            .string("tuning_timeout_http_keep_alive", &m.tuning_timeout_http_keep_alive)?
            .string("tuning_timeout_http_req", &m.tuning_timeout_http_req)?
            .finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haproxy::{decode, DecodeMode};
    use serde_json::json;
    use tfplug::plan::{plan_resource_change, validate_config};
    use tfplug::types::AttributePath;

    fn https() -> FrontendModel {
        FrontendModel {
            name: "https_in".to_string(),
            bind: preset_set(&["0.0.0.0:443", "[::]:443"]),
            mode: "ssl".to_string(),
            ssl_enabled: true,
            ssl_certificates: preset_set(&["cert-1"]),
            ssl_bind_options: preset_set(&["no-sslv3", "strict-sni"]),
            ssl_min_version: "TLSv1.2".to_string(),
            default_backend: "uuid-backend".to_string(),
            ssl_hsts_max_age: 31536000,
            tuning_max_connections: 0,
            ..FrontendModel::default()
        }
    }

    #[test]
    fn schema_covers_every_model_field() {
        let schema = Frontend::schema();
        assert_eq!(schema.block.attributes.len(), 63);
        assert!(schema.attribute("bind").unwrap().required);
    }

    #[test]
    fn advertised_protocols_follow_list_encoding() {
        let model = FrontendModel {
            advertised_protocols: preset_set(&["http11", "h2"]),
            ..https()
        };

        let comma = serde_json::to_value(Frontend::to_remote(&model, ListEncoding::CommaJoined))
            .unwrap();
        assert_eq!(comma["advertised_protocols"], json!("h2,http11"));

        let seq =
            serde_json::to_value(Frontend::to_remote(&model, ListEncoding::Sequence)).unwrap();
        assert_eq!(seq["advertised_protocols"], json!(["h2", "http11"]));
    }

    #[test]
    fn to_remote_encodes_sentinels_and_options() {
        let remote = Frontend::to_remote(&https(), ListEncoding::CommaJoined);
        assert_eq!(remote.stickiness_length, "");
        assert_eq!(remote.tuning_max_connections, "0");
        assert_eq!(remote.ssl_hsts_max_age, "31536000");
        assert_eq!(remote.ssl_enabled, "1");
        assert_eq!(remote.ssl_min_version.render(), "TLSv1.2");
        assert_eq!(remote.ssl_max_version.render(), "");
    }

    #[test]
    fn remote_round_trip_through_json() {
        for encoding in [ListEncoding::CommaJoined, ListEncoding::Sequence] {
            let model = https();
            let wire = serde_json::to_string(&Frontend::to_remote(&model, encoding)).unwrap();
            let remote: RemoteFrontend = serde_json::from_str(&wire).unwrap();

            let decoded = decode::<Frontend>(&remote, DecodeMode::Strict).unwrap();
            assert_eq!(decoded.value, model);
        }
    }

    #[test]
    fn lenient_decode_flags_bad_max_age() {
        let remote: RemoteFrontend = serde_json::from_value(json!({
            "name": "https_in",
            "bind": "0.0.0.0:443",
            "ssl_hstsMaxAge": "half a year",
            "enabled": "1"
        }))
        .unwrap();

        let decoded = decode::<Frontend>(&remote, DecodeMode::Lenient).unwrap();
        assert_eq!(decoded.value.ssl_hsts_max_age, -1);
        assert_eq!(decoded.value.bind, preset_set(&["0.0.0.0:443"]));
        assert_eq!(decoded.warnings.len(), 1);
        assert!(decoded.warnings[0].to_string().contains("ssl_hstsMaxAge"));
    }

    #[test]
    fn planned_defaults_match_model_defaults() {
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("name"), "https_in")
            .unwrap();
        config
            .set_string_set(&AttributePath::new("bind"), &preset_set(&["0.0.0.0:443"]))
            .unwrap();

        let change = plan_resource_change(&Frontend::schema(), &DynamicValue::null(), &config);
        let model = Frontend::read_model(&change.planned_state).unwrap();

        assert_eq!(
            model,
            FrontendModel {
                name: "https_in".to_string(),
                bind: preset_set(&["0.0.0.0:443"]),
                ..FrontendModel::default()
            }
        );
    }

    #[test]
    fn state_round_trip_keeps_id() {
        let model = https();
        let state = Frontend::write_model(&model, "uuid-f").unwrap();
        assert_eq!(Frontend::read_model(&state).unwrap(), model);
        assert_eq!(
            state.get_string(&AttributePath::new("id")).unwrap(),
            "uuid-f"
        );
    }

    #[test]
    fn bind_and_user_sets_must_split_back_cleanly() {
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("name"), "https_in")
            .unwrap();
        config
            .set_string_set(&AttributePath::new("bind"), &preset_set(&["", "0.0.0.0:443"]))
            .unwrap();
        config
            .set_string_set(&AttributePath::new("basic_auth_users"), &preset_set(&["a,b"]))
            .unwrap();

        let mut paths: Vec<String> = validate_config(&Frontend::schema(), &config)
            .iter()
            .filter_map(|d| d.attribute.as_ref().map(|p| p.to_string()))
            .collect();
        paths.sort();
        assert_eq!(paths, ["basic_auth_users[0]", "bind[0]"]);
    }

    #[test]
    fn accepted_sets_survive_comma_encoding() {
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("name"), "https_in")
            .unwrap();
        config
            .set_string_set(
                &AttributePath::new("bind"),
                &preset_set(&["0.0.0.0:443", "[::]:443"]),
            )
            .unwrap();
        config
            .set_string_set(&AttributePath::new("basic_auth_users"), &preset_set(&["alice", "bob"]))
            .unwrap();
        config
            .set_string_set(
                &AttributePath::new("stickiness_data_types"),
                &preset_set(&["conn_cnt", "sess_rate"]),
            )
            .unwrap();
        assert!(validate_config(&Frontend::schema(), &config).is_empty());

        let change = plan_resource_change(&Frontend::schema(), &DynamicValue::null(), &config);
        let model = Frontend::read_model(&change.planned_state).unwrap();
        let wire =
            serde_json::to_string(&Frontend::to_remote(&model, ListEncoding::CommaJoined)).unwrap();
        let remote: RemoteFrontend = serde_json::from_str(&wire).unwrap();

        assert_eq!(decode::<Frontend>(&remote, DecodeMode::Strict).unwrap().value, model);
    }
}
