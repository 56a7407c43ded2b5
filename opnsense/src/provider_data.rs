//! Provider data structure passed to resources and data sources

use crate::api::Client;
use crate::haproxy::{DecodeMode, ListEncoding};

#[derive(Clone)]
pub struct OpnsenseProviderData {
    pub client: Client,
    /// Wire shape for set-valued fields on add/set
    pub list_encoding: ListEncoding,
    /// How malformed numbers and flags in GET responses are handled
    pub decode_mode: DecodeMode,
}

impl OpnsenseProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            list_encoding: ListEncoding::default(),
            decode_mode: DecodeMode::default(),
        }
    }

    pub fn with_list_encoding(mut self, encoding: ListEncoding) -> Self {
        self.list_encoding = encoding;
        self
    }

    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }
}
