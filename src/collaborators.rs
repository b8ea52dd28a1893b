// Services the report consumes but does not own
use crate::bom::AvailPricingRequest;
use crate::error::ConfigError;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Runtime-mutable ("on the fly") configuration variables.
pub trait OtfVariables: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;

    // Y/N, true/false and 1/0 are accepted; anything else falls back to the default
    fn get_bool(&self, name: &str, default: bool) -> bool {
        match self.get(name).as_deref().map(str::trim) {
            Some("Y" | "y" | "true" | "TRUE" | "1") => true,
            Some("N" | "n" | "false" | "FALSE" | "0") => false,
            _ => default,
        }
    }
}

/// Identifier of the transaction being processed (ATID).
pub trait TransactionIdProvider: Send + Sync {
    fn transaction_id(&self) -> Option<String>;
}

/// Computes the functional channel and the sub-channel of a request in one go.
pub trait ChannelResolver: Send + Sync {
    fn resolve(&self, request: &AvailPricingRequest) -> (String, String);
}

impl<F> ChannelResolver for F
where
    F: Fn(&AvailPricingRequest) -> (String, String) + Send + Sync,
{
    fn resolve(&self, request: &AvailPricingRequest) -> (String, String) {
        self(request)
    }
}

// In-process OTF variable store
#[derive(Debug, Default)]
pub struct StaticOtfVariables {
    values: RwLock<HashMap<String, String>>,
}

impl StaticOtfVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&self, name: &str, value: &str) {
        self.values
            .write()
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove(&self, name: &str) -> Option<String> {
        self.values.write().remove(name)
    }

    // Expects a flat JSON object of string values
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let values: HashMap<String, String> =
            serde_json::from_str(json).map_err(|e| ConfigError::JsonParseError(e.to_string()))?;
        Ok(Self {
            values: RwLock::new(values),
        })
    }
}

impl OtfVariables for StaticOtfVariables {
    fn get(&self, name: &str) -> Option<String> {
        self.values.read().get(name).cloned()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FixedTransactionId(pub Option<String>);

impl TransactionIdProvider for FixedTransactionId {
    fn transaction_id(&self) -> Option<String> {
        self.0.clone()
    }
}
