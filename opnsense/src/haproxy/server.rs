//! HAProxy real servers (`opnsense_haproxy_server`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::DynamicValue;

use super::convert::{
    bool_to_string, empty_set, int64_to_string_negative, set_to_selected_list,
};
use super::state::{StateReader, StateWriter};
use super::{
    bool_attr, id_attr, int64_attr, one_of_attr, set_attr, set_one_of_attr, string_attr,
    CodecError, Decoder, HaproxyKind, ListEncoding, SelectedList, SelectedValue, RESOLVER_OPTS,
    RESOLVE_PREFER,
};
use crate::api::OpnsenseApiResource;

pub struct Server;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerModel {
    pub address: String,
    pub advanced: String,
    pub check_down_interval: i64,
    pub check_interval: i64,
    pub checkport: i64,
    pub description: String,
    pub enabled: bool,
    pub linked_resolver: String,
    pub max_connections: i64,
    pub mode: String,
    pub multiplexer_protocol: String,
    pub name: String,
    pub number: String,
    pub port: i64,
    pub resolve_prefer: String,
    pub resolver_opts: BTreeSet<String>,
    pub service_name: String,
    pub source: String,
    pub ssl: bool,
    pub ssl_ca: BTreeSet<String>,
    pub ssl_client_certificate: String,
    pub ssl_crl: String,
    pub ssl_sni: String,
    pub ssl_verify: bool,
    pub server_type: String,
    pub unix_socket: String,
    pub weight: i64,
}

impl Default for ServerModel {
    /// Matches the schema defaults.
    fn default() -> Self {
        Self {
            address: String::new(),
            advanced: String::new(),
            check_down_interval: -1,
            check_interval: -1,
            checkport: -1,
            description: String::new(),
            enabled: true,
            linked_resolver: String::new(),
            max_connections: -1,
            mode: "active".to_string(),
            multiplexer_protocol: "unspecified".to_string(),
            name: String::new(),
            number: String::new(),
            port: -1,
            resolve_prefer: String::new(),
            resolver_opts: empty_set(),
            service_name: String::new(),
            source: String::new(),
            ssl: false,
            ssl_ca: empty_set(),
            ssl_client_certificate: String::new(),
            ssl_crl: String::new(),
            ssl_sni: String::new(),
            ssl_verify: true,
            server_type: "static".to_string(),
            unix_socket: String::new(),
            weight: -1,
        }
    }
}

/// Server as exchanged with `haproxy/settings/*Server`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteServer {
    pub address: String,
    pub advanced: String,
    #[serde(rename = "checkDownInterval")]
    pub check_down_interval: String,
    #[serde(rename = "checkInterval")]
    pub check_interval: String,
    pub checkport: String,
    pub description: String,
    pub enabled: String,
    #[serde(rename = "linkedResolver")]
    pub linked_resolver: SelectedValue,
    #[serde(rename = "maxConnections")]
    pub max_connections: String,
    pub mode: SelectedValue,
    pub multiplexer_protocol: SelectedValue,
    pub name: String,
    pub number: String,
    pub port: String,
    #[serde(rename = "resolvePrefer")]
    pub resolve_prefer: SelectedValue,
    #[serde(rename = "resolverOpts")]
    pub resolver_opts: SelectedList,
    #[serde(rename = "serviceName")]
    pub service_name: String,
    pub source: String,
    pub ssl: String,
    #[serde(rename = "sslCA")]
    pub ssl_ca: SelectedList,
    #[serde(rename = "sslClientCertificate")]
    pub ssl_client_certificate: SelectedValue,
    #[serde(rename = "sslCRL")]
    pub ssl_crl: SelectedValue,
    #[serde(rename = "sslSNI")]
    pub ssl_sni: String,
    #[serde(rename = "sslVerify")]
    pub ssl_verify: String,
    #[serde(rename = "type")]
    pub server_type: SelectedValue,
    pub unix_socket: SelectedValue,
    pub weight: String,
}

impl OpnsenseApiResource for RemoteServer {
    const CONTROLLER: &'static str = "haproxy/settings";
    const ENDPOINT: &'static str = "Server";
    const WRAPPER: &'static str = "server";
}

impl HaproxyKind for Server {
    const TYPE_SUFFIX: &'static str = "haproxy_server";
    const DISPLAY_NAME: &'static str = "HAProxy server";

    type Model = ServerModel;
    type Remote = RemoteServer;

    fn schema() -> Schema {
        SchemaBuilder::new()
            .description("Real servers that HAProxy backends balance traffic to.")
            .attribute(id_attr("UUID of the server."))
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description(
                        "Name of a static server. For a template this is the prefix of the generated server names.",
                    )
                    .required()
                    .build(),
            )
            .attribute(string_attr(
                "address",
                "FQDN or IP address of the server.",
                "",
            ))
            .attribute(string_attr(
                "advanced",
                "Extra options appended to the server line.",
                "",
            ))
            .attribute(int64_attr(
                "check_down_interval",
                "Health check interval in milliseconds while the server is DOWN. Falls back to check_interval.",
                -1,
            ))
            .attribute(int64_attr(
                "check_interval",
                "Health check interval in milliseconds for this server.",
                -1,
            ))
            .attribute(int64_attr(
                "checkport",
                "TCP port used for health checks.",
                -1,
            ))
            .attribute(string_attr("description", "Description for the server.", ""))
            .attribute(bool_attr("enabled", "Enable the server.", true))
            .attribute(string_attr(
                "linked_resolver",
                "Resolver used to look up the server address.",
                "",
            ))
            .attribute(int64_attr(
                "max_connections",
                "Maximum number of concurrent connections sent to this server. 0 means unlimited.",
                -1,
            ))
            .attribute(one_of_attr(
                "mode",
                "Operation mode of the server (active, backup, disabled).",
                "active",
                &["", "active", "backup", "disabled"],
            ))
            .attribute(one_of_attr(
                "multiplexer_protocol",
                "Multiplexer protocol for outgoing connections (unspecified, fcgi, h1, h2).",
                "unspecified",
                &["", "unspecified", "fcgi", "h2", "h1"],
            ))
            .attribute(string_attr(
                "number",
                "Number of servers a template initializes.",
                "",
            ))
            .attribute(int64_attr(
                "port",
                "TCP or UDP port of the server.",
                -1,
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
                "service_name",
                "FQDN or DNS SRV service name for the servers a template initializes.",
                "",
            ))
            .attribute(string_attr(
                "source",
                "Source address used when connecting to the server.",
                "",
            ))
            .attribute(bool_attr(
                "ssl",
                "Use SSL when communicating with the server.",
                false,
            ))
            .attribute(set_attr(
                "ssl_ca",
                "CAs used to verify the server certificate.",
                &empty_set(),
            ))
            .attribute(string_attr(
                "ssl_client_certificate",
                "Certificate sent when the server requests a client certificate.",
                "",
            ))
            .attribute(string_attr(
                "ssl_crl",
                "Revocation list used to verify the server certificate.",
                "",
            ))
            .attribute(string_attr(
                "ssl_sni",
                "Host name sent in the SNI TLS extension.",
                "",
            ))
            .attribute(bool_attr(
                "ssl_verify",
                "Verify the server certificate against the configured CAs and CRLs.",
                true,
            ))
            .attribute(one_of_attr(
                "type",
                "A static server or a template that initializes several servers (static, template, unix).",
                "static",
                &["static", "template", "unix"],
            ))
            .attribute(string_attr(
                "unix_socket",
                "Frontend whose UNIX socket is used as the server address.",
                "",
            ))
            .attribute(int64_attr(
                "weight",
                "Weight of the server relative to the other servers.",
                -1,
            ))
            .build()
    }

    fn to_remote(model: &ServerModel, encoding: ListEncoding) -> RemoteServer {
        RemoteServer {
            address: model.address.clone(),
            advanced: model.advanced.clone(),
            check_down_interval: int64_to_string_negative(model.check_down_interval),
            check_interval: int64_to_string_negative(model.check_interval),
            checkport: int64_to_string_negative(model.checkport),
            description: model.description.clone(),
            enabled: bool_to_string(model.enabled),
            linked_resolver: SelectedValue::new(&model.linked_resolver),
            max_connections: int64_to_string_negative(model.max_connections),
            mode: SelectedValue::new(&model.mode),
            multiplexer_protocol: SelectedValue::new(&model.multiplexer_protocol),
            name: model.name.clone(),
            number: model.number.clone(),
            port: int64_to_string_negative(model.port),
            resolve_prefer: SelectedValue::new(&model.resolve_prefer),
            resolver_opts: set_to_selected_list(&model.resolver_opts, encoding),
            service_name: model.service_name.clone(),
            source: model.source.clone(),
            ssl: bool_to_string(model.ssl),
            ssl_ca: set_to_selected_list(&model.ssl_ca, encoding),
            ssl_client_certificate: SelectedValue::new(&model.ssl_client_certificate),
            ssl_crl: SelectedValue::new(&model.ssl_crl),
            ssl_sni: model.ssl_sni.clone(),
            ssl_verify: bool_to_string(model.ssl_verify),
            server_type: SelectedValue::new(&model.server_type),
            unix_socket: SelectedValue::new(&model.unix_socket),
            weight: int64_to_string_negative(model.weight),
        }
    }

    fn from_remote(remote: &RemoteServer, d: &mut Decoder) -> ServerModel {
        ServerModel {
            address: remote.address.clone(),
            advanced: remote.advanced.clone(),
            check_down_interval: d.int64("checkDownInterval", &remote.check_down_interval),
            check_interval: d.int64("checkInterval", &remote.check_interval),
            checkport: d.int64("checkport", &remote.checkport),
            description: remote.description.clone(),
            enabled: d.bool("enabled", &remote.enabled),
            linked_resolver: d.selected(&remote.linked_resolver),
            max_connections: d.int64("maxConnections", &remote.max_connections),
            mode: d.selected(&remote.mode),
            multiplexer_protocol: d.selected(&remote.multiplexer_protocol),
            name: remote.name.clone(),
            number: remote.number.clone(),
            port: d.int64("port", &remote.port),
            resolve_prefer: d.selected(&remote.resolve_prefer),
            resolver_opts: d.set(&remote.resolver_opts),
            service_name: remote.service_name.clone(),
            source: remote.source.clone(),
            ssl: d.bool("ssl", &remote.ssl),
            ssl_ca: d.set(&remote.ssl_ca),
            ssl_client_certificate: d.selected(&remote.ssl_client_certificate),
            ssl_crl: d.selected(&remote.ssl_crl),
            ssl_sni: remote.ssl_sni.clone(),
            ssl_verify: d.bool("sslVerify", &remote.ssl_verify),
            server_type: d.selected(&remote.server_type),
            unix_socket: d.selected(&remote.unix_socket),
            weight: d.int64("weight", &remote.weight),
        }
    }

    fn read_model(state: &DynamicValue) -> Result<ServerModel, CodecError> {
        let r = StateReader::new(state);
        Ok(ServerModel {
            address: r.string("address")?,
            advanced: r.string("advanced")?,
            check_down_interval: r.int64("check_down_interval")?,
            check_interval: r.int64("check_interval")?,
            checkport: r.int64("checkport")?,
            description: r.string("description")?,
            enabled: r.bool("enabled")?,
            linked_resolver: r.string("linked_resolver")?,
            max_connections: r.int64("max_connections")?,
            mode: r.string("mode")?,
            multiplexer_protocol: r.string("multiplexer_protocol")?,
            name: r.string("name")?,
            number: r.string("number")?,
            port: r.int64("port")?,
            resolve_prefer: r.string("resolve_prefer")?,
            resolver_opts: r.set("resolver_opts")?,
            service_name: r.string("service_name")?,
            source: r.string("source")?,
            ssl: r.bool("ssl")?,
            ssl_ca: r.set("ssl_ca")?,
            ssl_client_certificate: r.string("ssl_client_certificate")?,
            ssl_crl: r.string("ssl_crl")?,
            ssl_sni: r.string("ssl_sni")?,
            ssl_verify: r.bool("ssl_verify")?,
            server_type: r.string("type")?,
            unix_socket: r.string("unix_socket")?,
            weight: r.int64("weight")?,
        })
    }

    fn write_model(m: &ServerModel, id: &str) -> Result<DynamicValue, CodecError> {
        Ok(StateWriter::new()
            .string("id", id)?
            .string("address", &m.address)?
            .string("advanced", &m.advanced)?
            .int64("check_down_interval", m.check_down_interval)?
            .int64("check_interval", m.check_interval)?
            .int64("checkport", m.checkport)?
            .string("description", &m.description)?
            .bool("enabled", m.enabled)?
            .string("linked_resolver", &m.linked_resolver)?
            .int64("max_connections", m.max_connections)?
            .string("mode", &m.mode)?
            .string("multiplexer_protocol", &m.multiplexer_protocol)?
            .string("name", &m.name)?
            .string("number", &m.number)?
            .int64("port", m.port)?
            .string("resolve_prefer", &m.resolve_prefer)?
            .set("resolver_opts", &m.resolver_opts)?
            .string("service_name", &m.service_name)?
            .string("source", &m.source)?
            .bool("ssl", m.ssl)?
            .set("ssl_ca", &m.ssl_ca)?
            .string("ssl_client_certificate", &m.ssl_client_certificate)?
            .string("ssl_crl", &m.ssl_crl)?
            .string("ssl_sni", &m.ssl_sni)?
            .bool("ssl_verify", m.ssl_verify)?
            .string("type", &m.server_type)?
            .string("unix_socket", &m.unix_socket)?
            .int64("weight", m.weight)?
            .finish())
    }
}
