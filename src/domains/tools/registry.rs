//! Tool Registry - name lookup and listing for all tools.

use std::collections::HashMap;

use rmcp::model::Tool;

use super::definitions::*;
use super::handlers::{Handler, RedmineTool, ToolHandler};

/// Registered tools in registration order, indexed by name.
pub struct ToolRegistry {
    tools: Vec<Box<dyn ToolHandler>>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registry holding the full Redmine tool catalog.
    pub fn with_default_tools() -> Self {
        let mut registry = Self::new();

        // Issues
        registry.register::<ListIssuesTool>();
        registry.register::<GetIssueTool>();
        registry.register::<CreateIssueTool>();
        registry.register::<UpdateIssueTool>();
        registry.register::<DeleteIssueTool>();

        // Projects
        registry.register::<ListProjectsTool>();
        registry.register::<GetProjectTool>();
        registry.register::<GetProjectVersionsTool>();

        // Users
        registry.register::<ListUsersTool>();
        registry.register::<GetCurrentUserTool>();
        registry.register::<GetUserTool>();

        // Time entries
        registry.register::<ListTimeEntriesTool>();
        registry.register::<GetTimeEntryTool>();
        registry.register::<CreateTimeEntryTool>();
        registry.register::<UpdateTimeEntryTool>();
        registry.register::<DeleteTimeEntryTool>();
        registry.register::<ListTimeEntryActivitiesTool>();

        // Wiki
        registry.register::<ListWikiPagesTool>();
        registry.register::<GetWikiPageTool>();
        registry.register::<SaveWikiPageTool>();
        registry.register::<DeleteWikiPageTool>();

        // Enumerations
        registry.register::<ListStatusesTool>();
        registry.register::<ListPrioritiesTool>();
        registry.register::<ListTrackersTool>();

        registry.register::<SearchTool>();
        registry.register::<CustomRequestTool>();

        registry
    }

    /// Register a tool.
    ///
    /// # Panics
    ///
    /// When a tool with the same name is already registered.
    pub fn register<T: RedmineTool>(&mut self) {
        self.register_handler(Box::new(Handler::<T>::new()));
    }

    /// Register an already boxed handler. Same panics as [`register`](Self::register).
    pub fn register_handler(&mut self, handler: Box<dyn ToolHandler>) {
        let name = handler.name();
        assert!(
            !self.index.contains_key(name),
            "tool {} registered twice",
            name
        );
        self.index.insert(name, self.tools.len());
        self.tools.push(handler);
    }

    pub fn get(&self, name: &str) -> Option<&dyn ToolHandler> {
        self.index.get(name).map(|&i| self.tools[i].as_ref())
    }

    /// Tool descriptors in registration order.
    pub fn list(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| t.to_tool()).collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_default_tools()
    }
}
