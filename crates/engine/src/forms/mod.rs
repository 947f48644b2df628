//! Schema-driven forms for handler input and workflow state.

mod schema;
mod state;
mod text_input;

pub use schema::{ChoiceOption, FieldKind, FormField, FormSchema};
pub use state::{FieldValue, FormError, FormState};
pub use text_input::TextInput;

use flowdeck_types::HandlerNode;
use flowdeck_util::humanize_identifier;

use crate::viewer::ViewerSnapshot;

/// An editable form bound to one active handler.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerForm {
    pub handler: String,
    pub title: String,
    pub role: Option<String>,
    pub state: FormState,
}

impl HandlerForm {
    pub fn from_handler(handler: &HandlerNode) -> Self {
        let schema = FormSchema::from_json_schema(&handler.input_schema);
        Self {
            handler: handler.name.clone(),
            title: humanize_identifier(&handler.name),
            role: handler.role.clone(),
            state: FormState::new(&schema),
        }
    }
}

/// One form per active handler, in active-list order.
pub fn handler_forms(snapshot: &ViewerSnapshot) -> Vec<HandlerForm> {
    snapshot.active_handlers().iter().map(HandlerForm::from_handler).collect()
}

/// The read-only view of the instance state, laid out by the definition's
/// state schema.
pub fn state_form(snapshot: &ViewerSnapshot) -> FormState {
    let schema = FormSchema::from_json_schema(&snapshot.definition().state_schema);
    FormState::new(&schema).with_data(&snapshot.instance().state).read_only()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowdeck_types::{Definition, ViewerLocation, WorkflowInstance};
    use serde_json::json;

    #[test]
    fn builds_titled_forms_for_each_active_handler() {
        let definition: Definition = serde_json::from_value(json!({
            "Stmts": [{
                "Type": "event",
                "Name": "PlaceOrder",
                "Handler": {
                    "Type": "handler",
                    "Role": "customer",
                    "Input": { "type": "object", "properties": { "Phone": { "type": "string" } } }
                }
            }],
            "State": {
                "type": "object",
                "properties": { "Status": { "type": "string" }, "Paid": { "type": "boolean" } }
            }
        }))
        .expect("definition");
        let instance: WorkflowInstance = serde_json::from_value(json!({
            "Meta": { "Workflow": "pizzaOrder", "ID": "1", "Threads": [{ "WaitEvents": [{ "Req": { "Name": "PlaceOrder" } }] }] },
            "State": { "Status": "new", "Paid": false }
        }))
        .expect("instance");
        let snapshot = ViewerSnapshot::new(ViewerLocation::new("1"), instance, definition, None);

        let forms = handler_forms(&snapshot);
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].title, "Place Order");
        assert_eq!(forms[0].role.as_deref(), Some("customer"));
        assert_eq!(forms[0].state.fields()[0].key, "Phone");

        let state = state_form(&snapshot);
        assert!(state.is_read_only());
        assert_eq!(state.display_value(0), "new");
        assert_eq!(state.display_value(1), "false");
    }
}
