use oracle::{Connection, Error as OracleError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionInfo {
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub host: String,
    pub port: u16,
    pub service_name: String,
}

impl ConnectionInfo {
    pub fn new(username: &str, password: &str, host: &str, port: u16, service_name: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            host: host.to_string(),
            port,
            service_name: service_name.to_string(),
        }
    }

    pub fn connection_string(&self) -> String {
        format!("//{}:{}/{}", self.host, self.port, self.service_name)
    }

    /// Also the name the password is stored under in the OS keyring.
    pub fn display_string(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.username, self.host, self.port, self.service_name
        )
    }

    pub fn connect(&self) -> Result<Connection, OracleError> {
        debug!(database = %self.display_string(), "connecting");
        Connection::connect(&self.username, &self.password, self.connection_string()).map_err(
            |err| {
                warn!(database = %self.display_string(), "connection error: {err}");
                err
            },
        )
    }
}

impl Default for ConnectionInfo {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            host: "localhost".to_string(),
            port: 1521,
            service_name: "XE".to_string(),
        }
    }
}
