use async_trait::async_trait;
use currency_core::{CurrencyError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

pub mod convert_tool;
pub mod list_tool;
pub mod price_tool;
pub mod toolkit;

pub use convert_tool::ConvertCurrencyTool;
pub use list_tool::ListCurrenciesTool;
pub use price_tool::CryptoPriceTool;
pub use toolkit::{render_error, CurrencyToolkit};

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> Value;
    async fn execute(&self, args: Value) -> Result<String>;
}

pub struct ToolRegistry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn register(&self, tool: impl Tool + 'static) -> Result<()> {
        self.register_shared(Arc::new(tool))
    }

    /// Register a tool the caller keeps a handle to.
    pub fn register_shared(&self, tool: Arc<dyn Tool>) -> Result<()> {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        let name = tool.name().to_string();
        if tools.contains_key(&name) {
            return Err(CurrencyError::ToolError {
                tool: name,
                message: "Tool is already registered".into(),
            });
        }
        tools.insert(name, tool);
        Ok(())
    }

    pub fn unregister(&self, name: &str) -> Result<()> {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        tools.remove(name);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.get(name).cloned()
    }

    pub fn list(&self) -> Vec<String> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get_all(&self) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.values().cloned().collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Deserialize tool arguments, reporting failures against the tool.
pub(crate) fn parse_args<T: serde::de::DeserializeOwned>(tool: &str, args: Value) -> Result<T> {
    // Hosts send `{}` or nothing at all for argument-less calls
    let args = if args.is_null() { Value::Object(Default::default()) } else { args };
    serde_json::from_value(args).map_err(|e| CurrencyError::ToolError {
        tool: tool.to_string(),
        message: format!("Invalid arguments: {e}"),
    })
}
