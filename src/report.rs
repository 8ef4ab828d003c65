//! Hierarchical report produced by the decoders.
//!
//! A report is a tree of [`ReportNode`]s. Each node has a label, an optional
//! scalar [`Value`] and an ordered list of children. Child order mirrors byte
//! order in the inspected stream. Building a report is additive only: nodes
//! can be appended and filled in, never removed.

use serde::Serialize;
use std::fmt;

/// Longest value printed in full by the text rendering.
const DISPLAY_VALUE_LIMIT: usize = 96;

/// Scalar carried by a report node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(u64),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<u64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

macro_rules! number_value {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(n: $ty) -> Self {
                Value::Number(n as u64)
            }
        })*
    };
}

number_value!(u8, u16, u32, u64);

/// One node of a report tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReportNode {
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<ReportNode>,
}

impl ReportNode {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: None,
            children: Vec::new(),
        }
    }

    pub fn with_value(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn children(&self) -> &[ReportNode] {
        &self.children
    }

    /// Set the value of a node that does not have one yet.
    pub fn set_value(&mut self, value: impl Into<Value>) {
        debug_assert!(self.value.is_none(), "report values are write-once");
        self.value = Some(value.into());
    }

    /// Append a child with a value and return it for further nesting.
    pub fn add(&mut self, label: impl Into<String>, value: impl Into<Value>) -> &mut ReportNode {
        self.attach(ReportNode::with_value(label, value))
    }

    /// Append a child without a value.
    pub fn add_label(&mut self, label: impl Into<String>) -> &mut ReportNode {
        self.attach(ReportNode::new(label))
    }

    /// Append an already built subtree.
    pub fn attach(&mut self, node: ReportNode) -> &mut ReportNode {
        self.children.push(node);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// First direct child with the given label.
    pub fn child(&self, label: &str) -> Option<&ReportNode> {
        self.children.iter().find(|c| c.label == label)
    }

    /// Value of the first direct child with the given label.
    pub fn child_value(&self, label: &str) -> Option<&Value> {
        self.child(label).and_then(|c| c.value())
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Serialization of this type cannot fail: it has only string keys
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.label, indent = depth * 2)?;
        if let Some(value) = &self.value {
            let text = value.to_string();
            if text.chars().count() > DISPLAY_VALUE_LIMIT {
                let head: String = text.chars().take(DISPLAY_VALUE_LIMIT).collect();
                write!(f, ": {}... ({} chars)", head, text.chars().count())?;
            } else {
                write!(f, ": {}", text)?;
            }
        }
        writeln!(f)?;
        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ReportNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn children_keep_insertion_order() {
        let mut root = ReportNode::new("root");
        root.add("b", 2u32);
        root.add("a", "first");
        let nested = root.add_label("c");
        nested.add("inner", 7u8);

        let labels: Vec<_> = root.children().iter().map(|c| c.label()).collect();
        assert_eq!(labels, ["b", "a", "c"]);
        assert_eq!(root.child_value("a"), Some(&Value::from("first")));
        assert_eq!(
            root.child("c").and_then(|c| c.child_value("inner")),
            Some(&Value::Number(7))
        );
    }

    #[test]
    fn serializes_label_value_children() {
        let mut root = ReportNode::with_value("ZIP structure", "x");
        root.add("Size", 12u32);
        assert_eq!(
            root.to_json(),
            json!({
                "label": "ZIP structure",
                "value": "x",
                "children": [{ "label": "Size", "value": 12 }]
            })
        );
    }

    #[test]
    fn text_rendering_indents_and_truncates() {
        let mut root = ReportNode::new("root");
        root.add("long", "x".repeat(200));
        root.add_label("leaf").add("n", 1u8);
        let text = root.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "root");
        assert!(lines[1].starts_with("  long: xxx"));
        assert!(lines[1].ends_with("(200 chars)"));
        assert_eq!(lines[2], "  leaf");
        assert_eq!(lines[3], "    n: 1");
    }
}
