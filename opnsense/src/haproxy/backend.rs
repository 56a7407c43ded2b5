//! HAProxy backend pools (`opnsense_haproxy_backend`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tfplug::schema::{Schema, SchemaBuilder};
use tfplug::types::DynamicValue;

use super::convert::{
    bool_to_string, empty_set, int64_to_string_negative, preset_set, set_to_selected_list,
};
use super::state::{StateReader, StateWriter};
use super::{
    bool_attr, id_attr, int64_attr, name_attr, one_of_attr, rate_period_attr, set_attr,
    set_one_of_attr, string_attr, CodecError, Decoder, HaproxyKind, ListEncoding, SelectedList,
    SelectedValue, ADVERTISED_PROTOCOLS, RESOLVER_OPTS, RESOLVE_PREFER, STICKINESS_DATA_TYPES,
};
use crate::api::OpnsenseApiResource;

pub struct Backend;

#[derive(Debug, Clone, PartialEq)]
pub struct BackendModel {
    pub algorithm: String,
    pub ba_advertised_protocols: BTreeSet<String>,
    pub basic_auth_enabled: bool,
    pub basic_auth_groups: BTreeSet<String>,
    pub basic_auth_users: BTreeSet<String>,
    pub check_down_interval: i64,
    pub check_interval: i64,
    pub custom_options: String,
    pub description: String,
    pub enabled: bool,
    pub health_check: String,
    pub health_check_enabled: bool,
    pub health_check_fall: i64,
    pub health_check_log_status: bool,
    pub health_check_rise: i64,
    pub http2enabled: bool,
    pub http2enabled_nontls: bool,
    pub linked_actions: BTreeSet<String>,
    pub linked_errorfiles: BTreeSet<String>,
    pub linked_fcgi: String,
    pub linked_mailer: String,
    pub linked_resolver: String,
    pub linked_servers: BTreeSet<String>,
    pub mode: String,
    pub name: String,
    pub persistence: String,
    pub persistence_cookiemode: String,
    pub persistence_cookiename: String,
    pub persistence_stripquotes: bool,
    pub proxy_protocol: String,
    pub random_draws: i64,
    pub resolve_prefer: String,
    pub resolver_opts: BTreeSet<String>,
    pub source: String,
    pub stickiness_bytes_in_rate_period: String,
    pub stickiness_bytes_out_rate_period: String,
    pub stickiness_conn_rate_period: String,
    pub stickiness_cookielength: i64,
    pub stickiness_cookiename: String,
    pub stickiness_data_types: BTreeSet<String>,
    pub stickiness_expire: String,
    pub stickiness_http_err_rate_period: String,
    pub stickiness_http_req_rate_period: String,
    pub stickiness_pattern: String,
    pub stickiness_sess_rate_period: String,
    pub stickiness_size: String,
    pub tuning_caching: bool,
    pub tuning_defaultserver: String,
    pub tuning_httpreuse: String,
    pub tuning_noport: bool,
    pub tuning_retries: i64,
    pub tuning_timeout_check: String,
    pub tuning_timeout_connect: String,
    pub tuning_timeout_server: String,
}

impl Default for BackendModel {
    /// Matches the schema defaults.
    fn default() -> Self {
        Self {
            algorithm: "source".to_string(),
            ba_advertised_protocols: preset_set(&["h2", "http11"]),
            basic_auth_enabled: false,
            basic_auth_groups: empty_set(),
            basic_auth_users: empty_set(),
            check_down_interval: -1,
            check_interval: -1,
            custom_options: String::new(),
            description: String::new(),
            enabled: true,
            health_check: String::new(),
            health_check_enabled: false,
            health_check_fall: -1,
            health_check_log_status: false,
            health_check_rise: -1,
            http2enabled: false,
            http2enabled_nontls: false,
            linked_actions: empty_set(),
            linked_errorfiles: empty_set(),
            linked_fcgi: String::new(),
            linked_mailer: String::new(),
            linked_resolver: String::new(),
            linked_servers: empty_set(),
            mode: "http".to_string(),
            name: String::new(),
            persistence: "sticktable".to_string(),
            persistence_cookiemode: "piggyback".to_string(),
            persistence_cookiename: "SRVCOOKIE".to_string(),
            persistence_stripquotes: true,
            proxy_protocol: String::new(),
            random_draws: 2,
            resolve_prefer: String::new(),
            resolver_opts: empty_set(),
            source: String::new(),
            stickiness_bytes_in_rate_period: "1m".to_string(),
            stickiness_bytes_out_rate_period: "1m".to_string(),
            stickiness_conn_rate_period: "10s".to_string(),
            stickiness_cookielength: -1,
            stickiness_cookiename: String::new(),
            stickiness_data_types: empty_set(),
            stickiness_expire: "30m".to_string(),
            stickiness_http_err_rate_period: "10s".to_string(),
            stickiness_http_req_rate_period: "10s".to_string(),
            stickiness_pattern: "sourceipv4".to_string(),
            stickiness_sess_rate_period: "10s".to_string(),
            stickiness_size: "50k".to_string(),
            tuning_caching: false,
            tuning_defaultserver: String::new(),
            tuning_httpreuse: "safe".to_string(),
            tuning_noport: false,
            tuning_retries: -1,
            tuning_timeout_check: String::new(),
            tuning_timeout_connect: String::new(),
            tuning_timeout_server: String::new(),
        }
    }
}

/// Backend as exchanged with `haproxy/settings/*Backend`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteBackend {
    pub algorithm: SelectedValue,
    pub ba_advertised_protocols: SelectedList,
    #[serde(rename = "basicAuthEnabled")]
    pub basic_auth_enabled: String,
    #[serde(rename = "basicAuthGroups")]
    pub basic_auth_groups: SelectedList,
    #[serde(rename = "basicAuthUsers")]
    pub basic_auth_users: SelectedList,
    #[serde(rename = "checkDownInterval")]
    pub check_down_interval: String,
    #[serde(rename = "checkInterval")]
    pub check_interval: String,
    #[serde(rename = "customOptions")]
    pub custom_options: String,
    pub description: String,
    pub enabled: String,
    #[serde(rename = "healthCheck")]
    pub health_check: SelectedValue,
    #[serde(rename = "healthCheckEnabled")]
    pub health_check_enabled: String,
    #[serde(rename = "healthCheckFall")]
    pub health_check_fall: String,
    #[serde(rename = "healthCheckLogStatus")]
    pub health_check_log_status: String,
    #[serde(rename = "healthCheckRise")]
    pub health_check_rise: String,
    #[serde(rename = "http2Enabled")]
    pub http2_enabled: String,
    #[serde(rename = "http2Enabled_nontls")]
    pub http2_enabled_nontls: String,
    #[serde(rename = "linkedActions")]
    pub linked_actions: SelectedList,
    #[serde(rename = "linkedErrorfiles")]
    pub linked_errorfiles: SelectedList,
    #[serde(rename = "linkedFcgi")]
    pub linked_fcgi: SelectedValue,
    #[serde(rename = "linkedMailer")]
    pub linked_mailer: SelectedValue,
    #[serde(rename = "linkedResolver")]
    pub linked_resolver: SelectedValue,
    #[serde(rename = "linkedServers")]
    pub linked_servers: SelectedList,
    pub mode: SelectedValue,
    pub name: String,
    pub persistence: SelectedValue,
    pub persistence_cookiemode: SelectedValue,
    pub persistence_cookiename: String,
    pub persistence_stripquotes: String,
    #[serde(rename = "proxyProtocol")]
    pub proxy_protocol: SelectedValue,
    pub random_draws: String,
    #[serde(rename = "resolvePrefer")]
    pub resolve_prefer: SelectedValue,
    #[serde(rename = "resolverOpts")]
    pub resolver_opts: SelectedList,
    pub source: String,
    #[serde(rename = "stickiness_bytesInRatePeriod")]
    pub stickiness_bytes_in_rate_period: String,
    #[serde(rename = "stickiness_bytesOutRatePeriod")]
    pub stickiness_bytes_out_rate_period: String,
    #[serde(rename = "stickiness_connRatePeriod")]
    pub stickiness_conn_rate_period: String,
    pub stickiness_cookielength: String,
    pub stickiness_cookiename: String,
    #[serde(rename = "stickiness_dataTypes")]
    pub stickiness_data_types: SelectedList,
    pub stickiness_expire: String,
    #[serde(rename = "stickiness_httpErrRatePeriod")]
    pub stickiness_http_err_rate_period: String,
    #[serde(rename = "stickiness_httpReqRatePeriod")]
    pub stickiness_http_req_rate_period: String,
    pub stickiness_pattern: SelectedValue,
    #[serde(rename = "stickiness_sessRatePeriod")]
    pub stickiness_sess_rate_period: String,
    pub stickiness_size: String,
    pub tuning_caching: String,
    pub tuning_defaultserver: String,
    pub tuning_httpreuse: SelectedValue,
    pub tuning_noport: String,
    pub tuning_retries: String,
    #[serde(rename = "tuning_timeoutCheck")]
    pub tuning_timeout_check: String,
    #[serde(rename = "tuning_timeoutConnect")]
    pub tuning_timeout_connect: String,
    #[serde(rename = "tuning_timeoutServer")]
    pub tuning_timeout_server: String,
}

impl OpnsenseApiResource for RemoteBackend {
    const CONTROLLER: &'static str = "haproxy/settings";
    const ENDPOINT: &'static str = "Backend";
    const WRAPPER: &'static str = "backend";
}

impl HaproxyKind for Backend {
    const TYPE_SUFFIX: &'static str = "haproxy_backend";
    const DISPLAY_NAME: &'static str = "HAProxy backend";

    type Model = BackendModel;
    type Remote = RemoteBackend;

    fn schema() -> Schema {
        SchemaBuilder::new()
            .description("Backend pools group the servers a frontend forwards requests to.")
            .attribute(id_attr("UUID of the backend pool."))
            .attribute(name_attr("Name to identify this backend pool."))
            .attribute(one_of_attr(
                "algorithm",
                "Load balancing algorithm used by the pool (see the HAProxy `balance` keyword).",
                "source",
                &["source", "roundrobin", "static-rr", "leastconn", "uri", "random"],
            ))
            .attribute(set_one_of_attr(
                "ba_advertised_protocols",
                "Protocols advertised through TLS ALPN. TLS must be enabled.",
                &preset_set(&["h2", "http11"]),
                ADVERTISED_PROTOCOLS,
            ))
            .attribute(bool_attr(
                "basic_auth_enabled",
                "Enable HTTP basic authentication.",
                false,
            ))
            .attribute(set_attr(
                "basic_auth_groups",
                "Groups allowed through basic authentication.",
                &empty_set(),
            ))
            .attribute(set_attr(
                "basic_auth_users",
                "Users allowed through basic authentication.",
                &empty_set(),
            ))
            .attribute(int64_attr(
                "check_down_interval",
                "Health check interval in milliseconds for servers that are DOWN. Falls back to check_interval.",
                -1,
            ))
            .attribute(int64_attr(
                "check_interval",
                "Health check interval in milliseconds for all servers in the pool.",
                -1,
            ))
            .attribute(string_attr(
                "custom_options",
                "Lines added verbatim to the backend section.",
                "",
            ))
            .attribute(string_attr(
                "description",
                "Description for this backend pool.",
                "",
            ))
            .attribute(bool_attr("enabled", "Enable this backend pool.", true))
            .attribute(string_attr(
                "health_check",
                "Health monitor used for the servers in this pool.",
                "",
            ))
            .attribute(bool_attr(
                "health_check_enabled",
                "Enable health checking.",
                false,
            ))
            .attribute(int64_attr(
                "health_check_fall",
                "Consecutive failed checks before a server is considered unavailable.",
                -1,
            ))
            .attribute(bool_attr(
                "health_check_log_status",
                "Log health check status changes.",
                false,
            ))
            .attribute(int64_attr(
                "health_check_rise",
                "Consecutive successful checks before a server is considered available.",
                -1,
            ))
            .attribute(bool_attr(
                "http2enabled",
                "Enable end-to-end HTTP/2.",
                false,
            ))
            .attribute(bool_attr(
                "http2enabled_nontls",
                "Enable HTTP/2 without TLS.",
                false,
            ))
            .attribute(set_attr(
                "linked_actions",
                "Rules included in this backend pool.",
                &empty_set(),
            ))
            .attribute(set_attr(
                "linked_errorfiles",
                "Error messages included in this backend pool.",
                &empty_set(),
            ))
            .attribute(string_attr(
                "linked_fcgi",
                "FastCGI application used for all servers in the pool.",
                "",
            ))
            .attribute(string_attr(
                "linked_mailer",
                "E-mail alert configuration notified when a server changes state.",
                "",
            ))
            .attribute(string_attr(
                "linked_resolver",
                "Resolver used for all servers in the pool.",
                "",
            ))
            .attribute(set_attr(
                "linked_servers",
                "Servers that belong to this pool.",
                &empty_set(),
            ))
            .attribute(one_of_attr(
                "mode",
                "Running mode of the pool, usually the same as its frontend.",
                "http",
                &["http", "tcp"],
            ))
            .attribute(one_of_attr(
                "persistence",
                "How user-to-server mappings are tracked (sticktable, cookie).",
                "sticktable",
                &["", "sticktable", "cookie"],
            ))
            .attribute(one_of_attr(
                "persistence_cookiemode",
                "Reuse an existing cookie (piggyback) or insert a new one (new).",
                "piggyback",
                &["piggyback", "new"],
            ))
            .attribute(string_attr(
                "persistence_cookiename",
                "Cookie name used for persistence.",
                "SRVCOOKIE",
            ))
            .attribute(bool_attr(
                "persistence_stripquotes",
                "Strip quotes from the cookie value.",
                true,
            ))
            .attribute(one_of_attr(
                "proxy_protocol",
                "PROXY protocol version used towards the servers (v1, v2, empty to disable).",
                "",
                &["", "v1", "v2"],
            ))
            .attribute(int64_attr(
                "random_draws",
                "Draws made by the random algorithm before picking the least loaded server.",
                2,
            ))
            .attribute(one_of_attr(
                "resolve_prefer",
                "Address family to prefer when DNS returns both (ipv4, ipv6).",
                "",
                RESOLVE_PREFER,
            ))
            .attribute(set_one_of_attr(
                "resolver_opts",
                "Resolver options (allow-dup-ip, ignore-weight, prevent-dup-ip).",
                &empty_set(),
                RESOLVER_OPTS,
            ))
            .attribute(string_attr(
                "source",
                "Source address used when connecting to the servers.",
                "",
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
            .attribute(int64_attr(
                "stickiness_cookielength",
                "Maximum characters stored in the stick table for cookie patterns.",
                -1,
            ))
            .attribute(string_attr(
                "stickiness_cookiename",
                "Cookie name used for the stick table.",
                "",
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
            .attribute(one_of_attr(
                "stickiness_pattern",
                "Request pattern that ties a user to a server (sourceipv4, sourceipv6, cookievalue, rdpcookie).",
                "sourceipv4",
                &["", "sourceipv4", "sourceipv6", "cookievalue", "rdpcookie"],
            ))
            .attribute(rate_period_attr(
                "stickiness_sess_rate_period",
                "session",
                "10s",
            ))
            .attribute(string_attr(
                "stickiness_size",
                "Stick table size with a k, m or g suffix.",
                "50k",
            ))
            .attribute(bool_attr(
                "tuning_caching",
                "Cache responses from this pool. The HAProxy cache must be enabled.",
                false,
            ))
            .attribute(string_attr(
                "tuning_defaultserver",
                "Default options for every server line.",
                "",
            ))
            .attribute(one_of_attr(
                "tuning_httpreuse",
                "How idle HTTP connections are shared between requests (never, safe, aggressive, always).",
                "safe",
                &["", "never", "safe", "aggressive", "always"],
            ))
            .attribute(bool_attr(
                "tuning_noport",
                "Connect to servers on the port the frontend received the request on.",
                false,
            ))
            .attribute(int64_attr(
                "tuning_retries",
                "Retries after a connection failure to a server.",
                -1,
            ))
            .attribute(string_attr(
                "tuning_timeout_check",
                "Additional read timeout for health checks.",
                "",
            ))
            .attribute(string_attr(
                "tuning_timeout_connect",
                "Maximum time to wait for a connection to a server.",
                "",
            ))
            .attribute(string_attr(
                "tuning_timeout_server",
                "Maximum inactivity time on the server side.",
                "",
            ))
            .build()
    }

    fn to_remote(m: &BackendModel, encoding: ListEncoding) -> RemoteBackend {
        let list = |set: &BTreeSet<String>| set_to_selected_list(set, encoding);

        RemoteBackend {
            algorithm: SelectedValue::new(&m.algorithm),
            ba_advertised_protocols: list(&m.ba_advertised_protocols),
            basic_auth_enabled: bool_to_string(m.basic_auth_enabled),
            basic_auth_groups: list(&m.basic_auth_groups),
            basic_auth_users: list(&m.basic_auth_users),
            check_down_interval: int64_to_string_negative(m.check_down_interval),
            check_interval: int64_to_string_negative(m.check_interval),
            custom_options: m.custom_options.clone(),
            description: m.description.clone(),
            enabled: bool_to_string(m.enabled),
            health_check: SelectedValue::new(&m.health_check),
            health_check_enabled: bool_to_string(m.health_check_enabled),
            health_check_fall: int64_to_string_negative(m.health_check_fall),
            health_check_log_status: bool_to_string(m.health_check_log_status),
            health_check_rise: int64_to_string_negative(m.health_check_rise),
            http2_enabled: bool_to_string(m.http2enabled),
            http2_enabled_nontls: bool_to_string(m.http2enabled_nontls),
            linked_actions: list(&m.linked_actions),
            linked_errorfiles: list(&m.linked_errorfiles),
            linked_fcgi: SelectedValue::new(&m.linked_fcgi),
            linked_mailer: SelectedValue::new(&m.linked_mailer),
            linked_resolver: SelectedValue::new(&m.linked_resolver),
            linked_servers: list(&m.linked_servers),
            mode: SelectedValue::new(&m.mode),
            name: m.name.clone(),
            persistence: SelectedValue::new(&m.persistence),
            persistence_cookiemode: SelectedValue::new(&m.persistence_cookiemode),
            persistence_cookiename: m.persistence_cookiename.clone(),
            persistence_stripquotes: bool_to_string(m.persistence_stripquotes),
            proxy_protocol: SelectedValue::new(&m.proxy_protocol),
            random_draws: int64_to_string_negative(m.random_draws),
            resolve_prefer: SelectedValue::new(&m.resolve_prefer),
            resolver_opts: list(&m.resolver_opts),
            source: m.source.clone(),
            stickiness_bytes_in_rate_period: m.stickiness_bytes_in_rate_period.clone(),
            stickiness_bytes_out_rate_period: m.stickiness_bytes_out_rate_period.clone(),
            stickiness_conn_rate_period: m.stickiness_conn_rate_period.clone(),
            stickiness_cookielength: int64_to_string_negative(m.stickiness_cookielength),
            stickiness_cookiename: m.stickiness_cookiename.clone(),
            stickiness_data_types: list(&m.stickiness_data_types),
            stickiness_expire: m.stickiness_expire.clone(),
            stickiness_http_err_rate_period: m.stickiness_http_err_rate_period.clone(),
            stickiness_http_req_rate_period: m.stickiness_http_req_rate_period.clone(),
            stickiness_pattern: SelectedValue::new(&m.stickiness_pattern),
            stickiness_sess_rate_period: m.stickiness_sess_rate_period.clone(),
            stickiness_size: m.stickiness_size.clone(),
            tuning_caching: bool_to_string(m.tuning_caching),
            tuning_defaultserver: m.tuning_defaultserver.clone(),
            tuning_httpreuse: SelectedValue::new(&m.tuning_httpreuse),
            tuning_noport: bool_to_string(m.tuning_noport),
            tuning_retries: int64_to_string_negative(m.tuning_retries),
            tuning_timeout_check: m.tuning_timeout_check.clone(),
            tuning_timeout_connect: m.tuning_timeout_connect.clone(),
            tuning_timeout_server: m.tuning_timeout_server.clone(),
        }
    }

    fn from_remote(r: &RemoteBackend, d: &mut Decoder) -> BackendModel {
        BackendModel {
            algorithm: d.selected(&r.algorithm),
            ba_advertised_protocols: d.set(&r.ba_advertised_protocols),
            basic_auth_enabled: d.bool("basicAuthEnabled", &r.basic_auth_enabled),
            basic_auth_groups: d.set(&r.basic_auth_groups),
            basic_auth_users: d.set(&r.basic_auth_users),
            check_down_interval: d.int64("checkDownInterval", &r.check_down_interval),
            check_interval: d.int64("checkInterval", &r.check_interval),
            custom_options: r.custom_options.clone(),
            description: r.description.clone(),
            enabled: d.bool("enabled", &r.enabled),
            health_check: d.selected(&r.health_check),
            health_check_enabled: d.bool("healthCheckEnabled", &r.health_check_enabled),
            health_check_fall: d.int64("healthCheckFall", &r.health_check_fall),
            health_check_log_status: d.bool("healthCheckLogStatus", &r.health_check_log_status),
            health_check_rise: d.int64("healthCheckRise", &r.health_check_rise),
            http2enabled: d.bool("http2Enabled", &r.http2_enabled),
            http2enabled_nontls: d.bool("http2Enabled_nontls", &r.http2_enabled_nontls),
            linked_actions: d.set(&r.linked_actions),
            linked_errorfiles: d.set(&r.linked_errorfiles),
            linked_fcgi: d.selected(&r.linked_fcgi),
            linked_mailer: d.selected(&r.linked_mailer),
            linked_resolver: d.selected(&r.linked_resolver),
            linked_servers: d.set(&r.linked_servers),
            mode: d.selected(&r.mode),
            name: r.name.clone(),
            persistence: d.selected(&r.persistence),
            persistence_cookiemode: d.selected(&r.persistence_cookiemode),
            persistence_cookiename: r.persistence_cookiename.clone(),
            persistence_stripquotes: d.bool("persistence_stripquotes", &r.persistence_stripquotes),
            proxy_protocol: d.selected(&r.proxy_protocol),
            random_draws: d.int64("random_draws", &r.random_draws),
            resolve_prefer: d.selected(&r.resolve_prefer),
            resolver_opts: d.set(&r.resolver_opts),
            source: r.source.clone(),
            stickiness_bytes_in_rate_period: r.stickiness_bytes_in_rate_period.clone(),
            stickiness_bytes_out_rate_period: r.stickiness_bytes_out_rate_period.clone(),
            stickiness_conn_rate_period: r.stickiness_conn_rate_period.clone(),
            stickiness_cookielength: d.int64("stickiness_cookielength", &r.stickiness_cookielength),
            stickiness_cookiename: r.stickiness_cookiename.clone(),
            stickiness_data_types: d.set(&r.stickiness_data_types),
            stickiness_expire: r.stickiness_expire.clone(),
            stickiness_http_err_rate_period: r.stickiness_http_err_rate_period.clone(),
            stickiness_http_req_rate_period: r.stickiness_http_req_rate_period.clone(),
            stickiness_pattern: d.selected(&r.stickiness_pattern),
            stickiness_sess_rate_period: r.stickiness_sess_rate_period.clone(),
            stickiness_size: r.stickiness_size.clone(),
            tuning_caching: d.bool("tuning_caching", &r.tuning_caching),
            tuning_defaultserver: r.tuning_defaultserver.clone(),
            tuning_httpreuse: d.selected(&r.tuning_httpreuse),
            tuning_noport: d.bool("tuning_noport", &r.tuning_noport),
            tuning_retries: d.int64("tuning_retries", &r.tuning_retries),
            tuning_timeout_check: r.tuning_timeout_check.clone(),
            tuning_timeout_connect: r.tuning_timeout_connect.clone(),
            tuning_timeout_server: r.tuning_timeout_server.clone(),
        }
    }

    fn read_model(state: &DynamicValue) -> Result<BackendModel, CodecError> {
        let r = StateReader::new(state);
        Ok(BackendModel {
            algorithm: r.string("algorithm")?,
            ba_advertised_protocols: r.set("ba_advertised_protocols")?,
            basic_auth_enabled: r.bool("basic_auth_enabled")?,
            basic_auth_groups: r.set("basic_auth_groups")?,
            basic_auth_users: r.set("basic_auth_users")?,
            check_down_interval: r.int64("check_down_interval")?,
            check_interval: r.int64("check_interval")?,
            custom_options: r.string("custom_options")?,
            description: r.string("description")?,
            enabled: r.bool("enabled")?,
            health_check: r.string("health_check")?,
            health_check_enabled: r.bool("health_check_enabled")?,
            health_check_fall: r.int64("health_check_fall")?,
            health_check_log_status: r.bool("health_check_log_status")?,
            health_check_rise: r.int64("health_check_rise")?,
            http2enabled: r.bool("http2enabled")?,
            http2enabled_nontls: r.bool("http2enabled_nontls")?,
            linked_actions: r.set("linked_actions")?,
            linked_errorfiles: r.set("linked_errorfiles")?,
            linked_fcgi: r.string("linked_fcgi")?,
            linked_mailer: r.string("linked_mailer")?,
            linked_resolver: r.string("linked_resolver")?,
            linked_servers: r.set("linked_servers")?,
            mode: r.string("mode")?,
            name: r.string("name")?,
            persistence: r.string("persistence")?,
            persistence_cookiemode: r.string("persistence_cookiemode")?,
            persistence_cookiename: r.string("persistence_cookiename")?,
            persistence_stripquotes: r.bool("persistence_stripquotes")?,
            proxy_protocol: r.string("proxy_protocol")?,
            random_draws: r.int64("random_draws")?,
            resolve_prefer: r.string("resolve_prefer")?,
            resolver_opts: r.set("resolver_opts")?,
            source: r.string("source")?,
            stickiness_bytes_in_rate_period: r.string("stickiness_bytes_in_rate_period")?,
            stickiness_bytes_out_rate_period: r.string("stickiness_bytes_out_rate_period")?,
            stickiness_conn_rate_period: r.string("stickiness_conn_rate_period")?,
            stickiness_cookielength: r.int64("stickiness_cookielength")?,
            stickiness_cookiename: r.string("stickiness_cookiename")?,
            stickiness_data_types: r.set("stickiness_data_types")?,
            stickiness_expire: r.string("stickiness_expire")?,
            stickiness_http_err_rate_period: r.string("stickiness_http_err_rate_period")?,
            stickiness_http_req_rate_period: r.string("stickiness_http_req_rate_period")?,
            stickiness_pattern: r.string("stickiness_pattern")?,
            stickiness_sess_rate_period: r.string("stickiness_sess_rate_period")?,
            stickiness_size: r.string("stickiness_size")?,
            tuning_caching: r.bool("tuning_caching")?,
            tuning_defaultserver: r.string("tuning_defaultserver")?,
            tuning_httpreuse: r.string("tuning_httpreuse")?,
            tuning_noport: r.bool("tuning_noport")?,
            tuning_retries: r.int64("tuning_retries")?,
            tuning_timeout_check: r.string("tuning_timeout_check")?,
            tuning_timeout_connect: r.string("tuning_timeout_connect")?,
            tuning_timeout_server: r.string("tuning_timeout_server")?,
        })
    }

    fn write_model(m: &BackendModel, id: &str) -> Result<DynamicValue, CodecError> {
        Ok(StateWriter::new()
            .string("id", id)?
            .string("algorithm", &m.algorithm)?
            .set("ba_advertised_protocols", &m.ba_advertised_protocols)?
            .bool("basic_auth_enabled", m.basic_auth_enabled)?
            .set("basic_auth_groups", &m.basic_auth_groups)?
            .set("basic_auth_users", &m.basic_auth_users)?
            .int64("check_down_interval", m.check_down_interval)?
            .int64("check_interval", m.check_interval)?
            .string("custom_options", &m.custom_options)?
            .string("description", &m.description)?
            .bool("enabled", m.enabled)?
            .string("health_check", &m.health_check)?
            .bool("health_check_enabled", m.health_check_enabled)?
            .int64("health_check_fall", m.health_check_fall)?
            .bool("health_check_log_status", m.health_check_log_status)?
            .int64("health_check_rise", m.health_check_rise)?
            .bool("http2enabled", m.http2enabled)?
            .bool("http2enabled_nontls", m.http2enabled_nontls)?
            .set("linked_actions", &m.linked_actions)?
            .set("linked_errorfiles", &m.linked_errorfiles)?
            .string("linked_fcgi", &m.linked_fcgi)?
            .string("linked_mailer", &m.linked_mailer)?
            .string("linked_resolver", &m.linked_resolver)?
            .set("linked_servers", &m.linked_servers)?
            .string("mode", &m.mode)?
            .string("name", &m.name)?
            .string("persistence", &m.persistence)?
            .string("persistence_cookiemode", &m.persistence_cookiemode)?
            .string("persistence_cookiename", &m.persistence_cookiename)?
            .bool("persistence_stripquotes", m.persistence_stripquotes)?
            .string("proxy_protocol", &m.proxy_protocol)?
            .int64("random_draws", m.random_draws)?
            .string("resolve_prefer", &m.resolve_prefer)?
            .set("resolver_opts", &m.resolver_opts)?
            .string("source", &m.source)?
            .string("stickiness_bytes_in_rate_period", &m.stickiness_bytes_in_rate_period)?
            .string("stickiness_bytes_out_rate_period", &m.stickiness_bytes_out_rate_period)?
            .string("stickiness_conn_rate_period", &m.stickiness_conn_rate_period)?
            .int64("stickiness_cookielength", m.stickiness_cookielength)?
            .string("stickiness_cookiename", &m.stickiness_cookiename)?
            .set("stickiness_data_types", &m.stickiness_data_types)?
            .string("stickiness_expire", &m.stickiness_expire)?
            .string("stickiness_http_err_rate_period", &m.stickiness_http_err_rate_period)?
            .string("stickiness_http_req_rate_period", &m.stickiness_http_req_rate_period)?
            .string("stickiness_pattern", &m.stickiness_pattern)?
            .string("stickiness_sess_rate_period", &m.stickiness_sess_rate_period)?
            .string("stickiness_size", &m.stickiness_size)?
            .bool("tuning_caching", m.tuning_caching)?
            .string("tuning_defaultserver", &m.tuning_defaultserver)?
            .string("tuning_httpreuse", &m.tuning_httpreuse)?
            .bool("tuning_noport", m.tuning_noport)?
            .int64("tuning_retries", m.tuning_retries)?
            .string("tuning_timeout_check", &m.tuning_timeout_check)?
            .string("tuning_timeout_connect", &m.tuning_timeout_connect)?
            .string("tuning_timeout_server", &m.tuning_timeout_server)?
            .finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haproxy::{decode, DecodeMode};
    use serde_json::json;
    use tfplug::plan::{plan_resource_change, validate_config};
    use tfplug::AttributePath;

    fn pool() -> BackendModel {
        BackendModel {
            name: "pool_web".to_string(),
            algorithm: "leastconn".to_string(),
            linked_servers: preset_set(&["srv-a", "srv-b"]),
            health_check_enabled: true,
            check_interval: 2000,
            tuning_retries: 3,
            stickiness_data_types: preset_set(&["conn_cnt", "http_req_rate"]),
            stickiness_http_req_rate_period: "30s".to_string(),
            stickiness_sess_rate_period: "5m".to_string(),
            ..BackendModel::default()
        }
    }

    fn planned(config: DynamicValue) -> BackendModel {
        let change = plan_resource_change(&Backend::schema(), &DynamicValue::null(), &config);
        assert!(change.diagnostics.is_empty());
        Backend::read_model(&change.planned_state).unwrap()
    }

    #[test]
    fn schema_covers_every_model_field() {
        let schema = Backend::schema();
        assert_eq!(schema.block.attributes.len(), 55);
        assert!(schema.attribute("stickiness_sess_rate_period").is_some());
    }

    #[test]
    fn unset_algorithm_encodes_as_source() {
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("name"), "pool_web")
            .unwrap();

        let model = planned(config);
        assert_eq!(model, BackendModel { name: "pool_web".to_string(), ..BackendModel::default() });

        let remote = Backend::to_remote(&model, ListEncoding::CommaJoined);
        assert_eq!(remote.algorithm.render(), "source");
        assert_eq!(remote.random_draws, "2");
        assert_eq!(remote.persistence_stripquotes, "1");

        let body = serde_json::to_value(&remote).unwrap();
        assert_eq!(body["algorithm"], json!("source"));
        assert_eq!(body["ba_advertised_protocols"], json!("h2,http11"));
        assert_eq!(body["linkedServers"], json!(""));
    }

    #[test]
    fn remote_round_trip_through_json() {
        for encoding in [ListEncoding::CommaJoined, ListEncoding::Sequence] {
            let model = pool();
            let wire = serde_json::to_vec(&Backend::to_remote(&model, encoding)).unwrap();
            let remote: RemoteBackend = serde_json::from_slice(&wire).unwrap();

            let decoded = decode::<Backend>(&remote, DecodeMode::Strict).unwrap();
            assert_eq!(decoded.value, model);
        }
    }

    #[test]
    fn session_rate_period_reads_its_own_field() {
        let remote: RemoteBackend = serde_json::from_value(json!({
            "name": "pool_web",
            "stickiness_httpReqRatePeriod": "30s",
            "stickiness_sessRatePeriod": "5m"
        }))
        .unwrap();

        let model = decode::<Backend>(&remote, DecodeMode::Lenient).unwrap().value;
        assert_eq!(model.stickiness_http_req_rate_period, "30s");
        assert_eq!(model.stickiness_sess_rate_period, "5m");
    }

    #[test]
    fn malformed_check_interval_is_lenient_by_default() {
        let remote: RemoteBackend = serde_json::from_value(json!({
            "name": "pool_web",
            "checkInterval": "not-a-number",
            "checkDownInterval": ""
        }))
        .unwrap();

        let decoded = decode::<Backend>(&remote, DecodeMode::Lenient).unwrap();
        assert_eq!(decoded.value.check_interval, -1);
        assert_eq!(decoded.value.check_down_interval, -1);
        assert_eq!(decoded.warnings.len(), 1);
        assert_eq!(decoded.warnings[0].field, "checkInterval");

        assert!(matches!(
            decode::<Backend>(&remote, DecodeMode::Strict),
            Err(CodecError::InvalidInteger { ref field, .. }) if field == "checkInterval"
        ));
    }

    #[test]
    fn decodes_option_maps_from_get_response() {
        let remote: RemoteBackend = serde_json::from_value(json!({
            "name": "pool_web",
            "algorithm": {
                "source": {"value": "Source-IP Hash", "selected": 0},
                "roundrobin": {"value": "Round Robin", "selected": 1}
            },
            "linkedServers": {
                "srv-a": {"value": "web1", "selected": 1},
                "srv-b": {"value": "web2", "selected": 1},
                "srv-c": {"value": "web3", "selected": 0}
            },
            "random_draws": "2"
        }))
        .unwrap();

        let model = decode::<Backend>(&remote, DecodeMode::Strict).unwrap().value;
        assert_eq!(model.algorithm, "roundrobin");
        assert_eq!(model.linked_servers, preset_set(&["srv-a", "srv-b"]));
        assert_eq!(model.random_draws, 2);
    }

    #[test]
    fn state_round_trip_keeps_id() {
        let model = pool();
        let state = Backend::write_model(&model, "uuid-b").unwrap();
        assert_eq!(
            state.get_string(&AttributePath::new("id")).unwrap(),
            "uuid-b"
        );
        assert_eq!(Backend::read_model(&state).unwrap(), model);
    }

    #[test]
    fn empty_and_comma_members_are_rejected() {
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("name"), "pool_web")
            .unwrap();
        config
            .set_string_set(&AttributePath::new("resolver_opts"), &preset_set(&[""]))
            .unwrap();
        config
            .set_string_set(&AttributePath::new("basic_auth_users"), &preset_set(&["a,b"]))
            .unwrap();

        let mut paths: Vec<String> = validate_config(&Backend::schema(), &config)
            .iter()
            .filter_map(|d| d.attribute.as_ref().map(|p| p.to_string()))
            .collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths, ["basic_auth_users[0]", "resolver_opts[0]"]);
    }

    #[test]
    fn accepted_sets_survive_comma_encoding() {
        let mut config = DynamicValue::object();
        config
            .set_string(&AttributePath::new("name"), "pool_web")
            .unwrap();
        config
            .set_string_set(
                &AttributePath::new("resolver_opts"),
                &preset_set(&["allow-dup-ip", "prevent-dup-ip"]),
            )
            .unwrap();
        config
            .set_string_set(&AttributePath::new("basic_auth_users"), &preset_set(&["alice", "bob"]))
            .unwrap();
        config
            .set_string_set(
                &AttributePath::new("stickiness_data_types"),
                &preset_set(&["conn_cnt"]),
            )
            .unwrap();
        assert!(validate_config(&Backend::schema(), &config).is_empty());

        let model = planned(config);
        let wire =
            serde_json::to_vec(&Backend::to_remote(&model, ListEncoding::CommaJoined)).unwrap();
        let remote: RemoteBackend = serde_json::from_slice(&wire).unwrap();

        assert_eq!(decode::<Backend>(&remote, DecodeMode::Strict).unwrap().value, model);
    }

    #[test]
    fn negative_interval_other_than_unset_round_trips() {
        let model = BackendModel {
            check_interval: -5,
            ..pool()
        };
        let remote = Backend::to_remote(&model, ListEncoding::CommaJoined);
        assert_eq!(remote.check_interval, "-5");

        let decoded = decode::<Backend>(&remote, DecodeMode::Strict).unwrap();
        assert_eq!(decoded.value.check_interval, -5);
    }

    #[test]
    fn padded_number_is_a_coercion() {
        let remote: RemoteBackend = serde_json::from_value(json!({
            "name": "pool_web",
            "checkInterval": " 5"
        }))
        .unwrap();

        let decoded = decode::<Backend>(&remote, DecodeMode::Lenient).unwrap();
        assert_eq!(decoded.value.check_interval, -1);
        assert_eq!(decoded.warnings.len(), 1);
        assert!(decode::<Backend>(&remote, DecodeMode::Strict).is_err());
    }
}
