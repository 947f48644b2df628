use flowdeck_types::{Definition, HandlerNode, ViewerLocation, WorkflowInstance, active_handlers};
use flowdeck_util::humanize_identifier;
use serde::Serialize;
use serde_json::Value;

/// Everything one load produced, frozen.
///
/// The viewer never mutates a snapshot in place; a successful load builds a
/// new one and the previous one is dropped when the slot swaps it out.
#[derive(Debug, Clone)]
pub struct ViewerSnapshot {
    location: ViewerLocation,
    instance: WorkflowInstance,
    definition: Definition,
    diagram: Option<String>,
    handlers: Vec<HandlerNode>,
    active: Vec<HandlerNode>,
}

impl ViewerSnapshot {
    /// Precomputes the handler list and the active subset.
    pub fn new(location: ViewerLocation, instance: WorkflowInstance, definition: Definition, diagram: Option<String>) -> Self {
        let all = definition.handlers();
        let active = active_handlers(&instance, &all).into_iter().cloned().collect();
        let handlers = all.into_iter().cloned().collect();
        Self {
            location,
            instance,
            definition,
            diagram,
            handlers,
            active,
        }
    }

    pub fn location(&self) -> &ViewerLocation {
        &self.location
    }

    pub fn instance(&self) -> &WorkflowInstance {
        &self.instance
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// Raw diagram markup, when the graph endpoint answered.
    pub fn diagram(&self) -> Option<&str> {
        self.diagram.as_deref()
    }

    /// Every handler node in the definition, pre-order.
    pub fn handlers(&self) -> &[HandlerNode] {
        &self.handlers
    }

    /// Handlers the instance is currently waiting on, one per matching wait-event.
    pub fn active_handlers(&self) -> &[HandlerNode] {
        &self.active
    }

    pub fn workflow_name(&self) -> &str {
        &self.instance.meta.workflow
    }

    /// Id events are posted under: the instance's own `Meta.ID`, or the
    /// location id when the backend left it empty.
    pub fn submit_id(&self) -> &str {
        match self.instance.meta.id.as_str() {
            "" => self.location.id(),
            id => id,
        }
    }

    /// Plain-data view used by the CLI printers.
    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            id: self.instance.meta.id.clone(),
            workflow: self.instance.meta.workflow.clone(),
            location: self.location.to_string(),
            pending_events: self.instance.pending_events().into_iter().map(str::to_string).collect(),
            active_handlers: self.active.iter().map(HandlerSummary::from).collect(),
            state: self.instance.state.clone(),
            has_diagram: self.diagram.is_some(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SnapshotSummary {
    pub id: String,
    pub workflow: String,
    pub location: String,
    pub pending_events: Vec<String>,
    pub active_handlers: Vec<HandlerSummary>,
    pub state: Value,
    pub has_diagram: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HandlerSummary {
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub input_schema: Value,
}

impl From<&HandlerNode> for HandlerSummary {
    fn from(handler: &HandlerNode) -> Self {
        Self {
            name: handler.name.clone(),
            title: humanize_identifier(&handler.name),
            role: handler.role.clone(),
            input_schema: handler.input_schema.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition() -> Definition {
        serde_json::from_value(json!({
            "Stmts": [
                { "Type": "event", "Name": "PlaceOrder", "Role": "customer", "Handler": { "Type": "handler", "Input": {} } },
                { "Type": "event", "Name": "Bake", "Handler": { "Type": "handler" } }
            ],
            "State": { "type": "object" }
        }))
        .expect("definition")
    }

    fn instance() -> WorkflowInstance {
        serde_json::from_value(json!({
            "Meta": {
                "Workflow": "pizzaOrder",
                "ID": "5",
                "Threads": [
                    { "WaitEvents": [{ "Req": { "Name": "PlaceOrder" } }] },
                    { "WaitEvents": [{ "Req": { "Name": "PlaceOrder" } }, null] }
                ]
            },
            "State": { "Items": [] }
        }))
        .expect("instance")
    }

    #[test]
    fn precomputes_handlers_and_active_subset() {
        let snapshot = ViewerSnapshot::new(ViewerLocation::new("5"), instance(), definition(), None);
        assert_eq!(snapshot.handlers().len(), 2);
        let active: Vec<_> = snapshot.active_handlers().iter().map(|h| h.name.as_str()).collect();
        assert_eq!(active, vec!["PlaceOrder", "PlaceOrder"]);
    }

    #[test]
    fn summary_humanizes_titles() {
        let snapshot = ViewerSnapshot::new(ViewerLocation::new("5"), instance(), definition(), Some("<svg/>".into()));
        let summary = snapshot.summary();
        assert_eq!(summary.location, "/ui/?id=5");
        assert_eq!(summary.active_handlers[0].title, "Place Order");
        assert_eq!(summary.active_handlers[0].role.as_deref(), Some("customer"));
        assert!(summary.has_diagram);
    }
}
