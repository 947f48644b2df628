//! Workflow definitions returned by `GET /definition/{name}`.
//!
//! The backend serializes its statement tree as free-form JSON. Rather than
//! probing that JSON ad hoc, [`Stmt::parse`] lowers it once into a small set of
//! typed variants, and handler discovery becomes a plain pre-order walk over
//! those variants.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

const EVENT_TYPE: &str = "event";
const HANDLER_TYPE: &str = "handler";

/// Static structure of a workflow type: its statements and state schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definition {
    /// Top-level statements, lowered from the raw `Stmts` document.
    pub stmts: Vec<Stmt>,
    /// JSON schema describing the workflow `State`.
    pub state_schema: Value,
    /// The raw `Stmts` document as received.
    pub raw_stmts: Value,
}

/// One node of the statement tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// An `event` node whose `Handler` is of type `handler`: a submittable action.
    Handler(HandlerNode),
    /// An `event` node without a handler-typed `Handler`.
    Event { name: Option<String>, children: Vec<Stmt> },
    /// Any other object or array.
    Other { kind: Option<String>, children: Vec<Stmt> },
}

/// A named, schema-described action a user can submit to advance a thread.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerNode {
    /// Event name; matched against `Req.Name` of pending wait-events.
    pub name: String,
    /// Who is expected to submit the event, when the backend says so.
    pub role: Option<String>,
    /// JSON schema of the submitted form data.
    pub input_schema: Value,
    /// JSON schema of the handler result, if advertised.
    pub output_schema: Option<Value>,
    /// The node exactly as received.
    pub raw: Value,
}

impl Stmt {
    /// Lowers a raw JSON value into a statement node.
    ///
    /// Scalars and `null` carry no structure and yield `None`.
    pub fn parse(value: &Value) -> Option<Stmt> {
        match value {
            Value::Object(map) => Some(Self::parse_object(value, map)),
            Value::Array(items) => Some(Stmt::Other {
                kind: None,
                children: items.iter().filter_map(Stmt::parse).collect(),
            }),
            _ => None,
        }
    }

    /// Lowers a raw `Stmts` document into top-level statements.
    ///
    /// An array contributes one statement per element; any other shape is
    /// lowered as a single root.
    pub fn parse_forest(value: &Value) -> Vec<Stmt> {
        match value {
            Value::Array(items) => items.iter().filter_map(Stmt::parse).collect(),
            other => Stmt::parse(other).into_iter().collect(),
        }
    }

    fn parse_object(value: &Value, map: &Map<String, Value>) -> Stmt {
        let kind = map.get("Type").and_then(Value::as_str);
        if kind == Some(EVENT_TYPE) {
            if let Some(handler) = HandlerNode::from_event(value, map) {
                return Stmt::Handler(handler);
            }
            return Stmt::Event {
                name: map.get("Name").and_then(Value::as_str).map(str::to_string),
                children: parse_children(map),
            };
        }
        Stmt::Other {
            kind: kind.map(str::to_string),
            children: parse_children(map),
        }
    }

    /// Child statements of this node; handler nodes are leaves.
    pub fn children(&self) -> &[Stmt] {
        match self {
            Stmt::Handler(_) => &[],
            Stmt::Event { children, .. } | Stmt::Other { children, .. } => children,
        }
    }
}

fn parse_children(map: &Map<String, Value>) -> Vec<Stmt> {
    map.values().filter_map(Stmt::parse).collect()
}

impl HandlerNode {
    fn from_event(value: &Value, map: &Map<String, Value>) -> Option<Self> {
        let handler = map.get("Handler")?.as_object()?;
        if handler.get("Type").and_then(Value::as_str) != Some(HANDLER_TYPE) {
            return None;
        }
        let role = map
            .get("Role")
            .or_else(|| handler.get("Role"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Some(Self {
            name: map.get("Name").and_then(Value::as_str).unwrap_or_default().to_string(),
            role,
            input_schema: handler.get("Input").cloned().unwrap_or_else(|| Value::Object(Map::new())),
            output_schema: handler.get("Output").filter(|schema| !schema.is_null()).cloned(),
            raw: value.clone(),
        })
    }
}

/// Collects every handler node of `stmts` in pre-order, at any depth.
pub fn extract_handlers(stmts: &[Stmt]) -> Vec<&HandlerNode> {
    let mut handlers = Vec::new();
    let mut stack: Vec<&Stmt> = stmts.iter().rev().collect();
    while let Some(stmt) = stack.pop() {
        match stmt {
            Stmt::Handler(handler) => handlers.push(handler),
            other => stack.extend(other.children().iter().rev()),
        }
    }
    handlers
}

impl Definition {
    pub fn handlers(&self) -> Vec<&HandlerNode> {
        extract_handlers(&self.stmts)
    }

    /// Finds a handler node by event name.
    pub fn handler(&self, name: &str) -> Option<&HandlerNode> {
        self.handlers().into_iter().find(|handler| handler.name == name)
    }
}

#[derive(Deserialize)]
struct RawDefinition {
    #[serde(rename = "Stmts", default)]
    stmts: Value,
    #[serde(rename = "State", default)]
    state: Value,
}

#[derive(Serialize)]
struct RawDefinitionRef<'a> {
    #[serde(rename = "Stmts")]
    stmts: &'a Value,
    #[serde(rename = "State")]
    state: &'a Value,
}

impl<'de> Deserialize<'de> for Definition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawDefinition::deserialize(deserializer)?;
        Ok(Self {
            stmts: Stmt::parse_forest(&raw.stmts),
            state_schema: raw.state,
            raw_stmts: raw.stmts,
        })
    }
}

impl Serialize for Definition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        RawDefinitionRef {
            stmts: &self.raw_stmts,
            state: &self.state_schema,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(name: &str, handler_type: &str) -> Value {
        json!({
            "Type": "event",
            "Name": name,
            "Handler": { "Type": handler_type, "Input": { "type": "object" } }
        })
    }

    fn names(stmts: &[Stmt]) -> Vec<String> {
        extract_handlers(stmts).into_iter().map(|h| h.name.clone()).collect()
    }

    #[test]
    fn finds_handlers_at_any_depth_in_pre_order() {
        let stmts = json!([
            { "Type": "for", "Section": [
                { "Type": "select", "Cases": [event("add", "handler"), event("clean", "handler")] },
                { "Type": "step", "Name": "noop" }
            ]},
            event("confirm", "handler"),
            { "Type": "go", "Stmt": { "Type": "section", "Stmts": [ { "Nested": [event("pay", "handler")] } ] } }
        ]);

        let parsed = Stmt::parse_forest(&stmts);
        assert_eq!(names(&parsed), vec!["add", "clean", "confirm", "pay"]);
    }

    #[test]
    fn ignores_events_whose_handler_is_not_handler_typed() {
        let stmts = json!([
            event("simple", "simpleEvent"),
            { "Type": "event", "Name": "no-handler" },
            { "Type": "wait", "Handler": { "Type": "handler" } },
            { "Type": "event", "Name": "scalar", "Handler": "handler" }
        ]);

        assert!(names(&Stmt::parse_forest(&stmts)).is_empty());
    }

    #[test]
    fn scans_inside_non_handler_events() {
        let stmts = json!([{
            "Type": "event",
            "Name": "outer",
            "Handler": { "Type": "timeout" },
            "Stmt": event("inner", "handler")
        }]);

        assert_eq!(names(&Stmt::parse_forest(&stmts)), vec!["inner"]);
    }

    #[test]
    fn does_not_descend_into_handler_nodes() {
        let mut outer = event("outer", "handler");
        outer["Stmt"] = event("inner", "handler");

        assert_eq!(names(&Stmt::parse_forest(&json!([outer]))), vec!["outer"]);
    }

    #[test]
    fn handler_carries_schema_and_role() {
        let node = json!({
            "Type": "event",
            "Name": "start_cooking",
            "Role": "kitchen",
            "Handler": {
                "Type": "handler",
                "Input": { "$ref": "#/definitions/CookingRecord" },
                "Output": null
            }
        });

        let parsed = Stmt::parse_forest(&json!([node]));
        let handler = extract_handlers(&parsed)[0];
        assert_eq!(handler.name, "start_cooking");
        assert_eq!(handler.role.as_deref(), Some("kitchen"));
        assert_eq!(handler.input_schema, json!({ "$ref": "#/definitions/CookingRecord" }));
        assert!(handler.output_schema.is_none());
    }

    #[test]
    fn missing_input_schema_defaults_to_empty_object() {
        let node = json!({ "Type": "event", "Name": "submit", "Handler": { "Type": "handler" } });
        let parsed = Stmt::parse_forest(&json!([node]));
        assert_eq!(extract_handlers(&parsed)[0].input_schema, json!({}));
    }

    #[test]
    fn definition_tolerates_missing_fields() {
        let definition: Definition = serde_json::from_value(json!({})).expect("definition");
        assert!(definition.stmts.is_empty());
        assert!(definition.handlers().is_empty());
        assert_eq!(definition.state_schema, Value::Null);

        let definition: Definition = serde_json::from_value(json!({ "Stmts": null, "State": { "type": "object" } })).expect("definition");
        assert!(definition.handlers().is_empty());
        assert_eq!(definition.state_schema, json!({ "type": "object" }));
    }

    #[test]
    fn definition_looks_up_handler_by_name() {
        let definition: Definition =
            serde_json::from_value(json!({ "Stmts": [event("add", "handler"), event("submit", "handler")] })).expect("definition");
        assert!(definition.handler("submit").is_some());
        assert!(definition.handler("missing").is_none());
    }
}
