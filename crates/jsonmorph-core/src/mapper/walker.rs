//! Mapper tree traversal
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use super::context::TransformContext;
use super::directive::DirectiveEvaluator;
use super::node::{child_path, MapperNode, MapperTree};
use crate::Result;
use serde_json::{Map, Value};

/// Walks a mapper tree, mirroring its shape into an output object
pub struct TreeWalker<'c, 'a> {
    context: &'c mut TransformContext<'a>,
}

impl<'c, 'a> TreeWalker<'c, 'a> {
    /// Create a walker over a transform context
    pub fn new(context: &'c mut TransformContext<'a>) -> Self {
        Self { context }
    }

    /// Build the output object for a tree
    pub fn walk(&mut self, tree: &MapperTree) -> Result<Map<String, Value>> {
        let mut output = Map::new();
        self.walk_into(tree, &mut output, "")?;
        Ok(output)
    }

    fn walk_into(
        &mut self,
        tree: &MapperTree,
        into: &mut Map<String, Value>,
        parent: &str,
    ) -> Result<()> {
        for (key, node) in tree.iter() {
            let path = child_path(parent, key);

            match node {
                MapperNode::Container(subtree) => {
                    // Nested leaves start out as null and stay that way if they resolve to nothing
                    let mut child = subtree.skeleton();
                    self.walk_into(subtree, &mut child, &path)?;
                    into.insert(key.to_string(), Value::Object(child));
                }
                MapperNode::Directive(directive) => {
                    if let Some(from) = &directive.from {
                        self.context.mark_consumed(from);
                    }

                    let value = DirectiveEvaluator::new(self.context).evaluate(&path, directive)?;
                    if let Some(value) = value {
                        into.insert(key.to_string(), value);
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::node::MapperDocument;
    use crate::options::TransformOptions;
    use serde_json::json;

    fn walk(map: Value, source: Value) -> (Value, Vec<String>) {
        let document = MapperDocument::from_value(&json!({ "$map": map })).unwrap();
        let mut context = TransformContext::new(&source, TransformOptions::default());
        let output = TreeWalker::new(&mut context).walk(document.tree()).unwrap();
        let consumed = context.consumed().iter().cloned().collect();
        (Value::Object(output), consumed)
    }

    #[test]
    fn test_output_mirrors_mapper_order() {
        let (output, _) = walk(
            json!({
                "z": {"$from": "a"},
                "m": {"inner": {"$from": "b"}},
                "a": {"$default": 1}
            }),
            json!({"a": "A", "b": "B"}),
        );
        let keys: Vec<_> = output.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "m", "a"]);
        assert_eq!(output, json!({"z": "A", "m": {"inner": "B"}, "a": 1}));
    }

    #[test]
    fn test_unresolved_top_level_key_is_omitted() {
        let (output, _) = walk(json!({"missing": {"$from": "nope"}}), json!({}));
        assert_eq!(output, json!({}));
    }

    #[test]
    fn test_unresolved_nested_key_keeps_placeholder() {
        let (output, _) = walk(
            json!({"user": {"name": {"$from": "name"}, "nick": {"$from": "nick"}}}),
            json!({"name": "Al"}),
        );
        assert_eq!(output, json!({"user": {"name": "Al", "nick": null}}));
    }

    #[test]
    fn test_consumption_tracks_top_level_keys() {
        let (_, consumed) = walk(
            json!({
                "name": {"$from": "user::name"},
                "nested": {"state": {"$from": "state"}},
                "branch": {"$if": {"$from": "flag", "$is": true}}
            }),
            json!({}),
        );
        // Condition paths are not consumption
        assert_eq!(consumed, vec!["state".to_string(), "user".to_string()]);
    }

    #[test]
    fn test_errors_name_nested_key() {
        let document = MapperDocument::from_value(&json!({"$map": {
            "outer": {"inner": {"$if": {"$from": "n", "$condition": {"$const": "% 0"}}}}
        }}))
        .unwrap();
        let source = json!({"n": 4});
        let mut context = TransformContext::new(&source, TransformOptions::default());
        let err = TreeWalker::new(&mut context)
            .walk(document.tree())
            .unwrap_err();
        assert_eq!(err.key(), Some("outer.inner"));
    }
}
