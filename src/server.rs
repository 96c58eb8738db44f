use serde_json::{json, Value};

/// Seconds written into the `timeout` field of every generated client entry.
pub const DEFAULT_ENTRY_TIMEOUT: u64 = 5;

/// One proxy endpoint harvested from the source page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRecord {
    host: String,
    port: String,
    password: String,
    method: String,
}

impl ServerRecord {
    /// Builds a record only when every field is non-empty.
    pub fn new(
        host: impl Into<String>,
        port: impl Into<String>,
        password: impl Into<String>,
        method: impl Into<String>,
    ) -> Option<Self> {
        let record = Self {
            host: host.into(),
            port: port.into(),
            password: password.into(),
            method: method.into(),
        };
        record.is_complete().then_some(record)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    fn is_complete(&self) -> bool {
        !self.host.is_empty()
            && !self.port.is_empty()
            && !self.password.is_empty()
            && !self.method.is_empty()
    }

    /// Maps the record onto a `gui-config.json` entry.
    ///
    /// The plugin, remarks and timeout fields are constants the client expects to be present.
    pub fn to_client_entry(&self) -> Value {
        json!({
            "server": self.host,
            "server_port": self.port,
            "password": self.password,
            "method": self.method,
            "plugin": "",
            "plugin_opts": "",
            "plugin_args": "",
            "remarks": "",
            "timeout": DEFAULT_ENTRY_TIMEOUT,
        })
    }
}
