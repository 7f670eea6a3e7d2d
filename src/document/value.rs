use crate::dom::NodeId;

use super::property::PropertyId;

/// An engine argument, already unwrapped from the engine's value space.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Any other engine value, carried as the engine's own string conversion.
    Object(String),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ArgValue::Undefined => "undefined",
            ArgValue::Null => "null",
            ArgValue::Bool(_) => "boolean",
            ArgValue::Number(_) => "number",
            ArgValue::String(_) => "string",
            ArgValue::Object(_) => "object",
        }
    }

    /// String conversion with script semantics (`String(value)`).
    pub fn coerce_to_string(&self) -> String {
        match self {
            ArgValue::Undefined => "undefined".to_string(),
            ArgValue::Null => "null".to_string(),
            ArgValue::Bool(value) => value.to_string(),
            ArgValue::Number(value) => number_to_string(*value),
            ArgValue::String(value) | ArgValue::Object(value) => value.clone(),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::String(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::String(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Number(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if value == 0.0 {
        "0".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// A result handed back to the engine. Nodes travel as ids; the engine side
/// maps them to its wrapper objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineValue {
    Undefined,
    Null,
    String(String),
    Node(NodeId),
    Collection(Vec<NodeId>),
}

impl EngineValue {
    pub fn from_node(node: Option<NodeId>) -> Self {
        node.map_or(EngineValue::Null, EngineValue::Node)
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            EngineValue::Node(node) => Some(*node),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, EngineValue::Null)
    }
}

/// What a property read on the document resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertySlot {
    /// The property is a bound function.
    Callable(PropertyId),
    Value(EngineValue),
    /// Not a document property; the base node object answers instead.
    Delegate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_numbers_like_script() {
        assert_eq!(ArgValue::from(42.0).coerce_to_string(), "42");
        assert_eq!(ArgValue::from(-0.0).coerce_to_string(), "0");
        assert_eq!(ArgValue::from(1.5).coerce_to_string(), "1.5");
        assert_eq!(ArgValue::from(f64::NAN).coerce_to_string(), "NaN");
        assert_eq!(ArgValue::from(f64::NEG_INFINITY).coerce_to_string(), "-Infinity");
    }

    #[test]
    fn coerces_other_primitives() {
        assert_eq!(ArgValue::Null.coerce_to_string(), "null");
        assert_eq!(ArgValue::Undefined.coerce_to_string(), "undefined");
        assert_eq!(ArgValue::from(true).coerce_to_string(), "true");
        assert_eq!(
            ArgValue::Object("[object Object]".to_string()).coerce_to_string(),
            "[object Object]"
        );
    }

    #[test]
    fn only_strings_expose_str() {
        assert_eq!(ArgValue::from("div").as_str(), Some("div"));
        assert_eq!(ArgValue::from(1.0).as_str(), None);
        assert_eq!(ArgValue::Object("x".to_string()).as_str(), None);
    }

    #[test]
    fn missing_node_becomes_null() {
        assert!(EngineValue::from_node(None).is_null());
        assert_eq!(EngineValue::from_node(Some(4)).as_node(), Some(4));
    }
}
