use keyring::Entry;

const SERVICE_NAME: &str = "sqlplus_runner";

fn entry_for(connection_key: &str) -> Result<Entry, keyring::Error> {
    Entry::new(SERVICE_NAME, connection_key)
}

/// Store a password in the OS keyring for the given connection.
pub fn store_password(connection_key: &str, password: &str) -> Result<(), String> {
    let entry = entry_for(connection_key).map_err(|e| format!("Keyring error: {}", e))?;
    entry
        .set_password(password)
        .map_err(|e| format!("Failed to store password in keyring: {}", e))
}

/// Retrieve a password from the OS keyring for the given connection.
/// Returns Ok(None) if no credential is found (not an error).
pub fn get_password(connection_key: &str) -> Result<Option<String>, String> {
    let entry = entry_for(connection_key).map_err(|e| format!("Keyring error: {}", e))?;
    match entry.get_password() {
        Ok(password) => Ok(Some(password)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(format!("Failed to retrieve password from keyring: {}", e)),
    }
}
