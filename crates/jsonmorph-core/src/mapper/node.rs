//! Mapper document model
//!
//! The raw `{"$map": {...}}` JSON is compiled once into a typed tree. Each
//! node is either a container (an object with at least one plain key) that
//! is mirrored into the output, or a directive leaf whose `$`-prefixed keys
//! describe how one output value is produced. All shape checks happen here,
//! so the tree walker never has to sniff key prefixes or report malformed
//! directives mid-transform.
//!
//! Copyright (c) 2025 Jsonmorph Team
//! Licensed under the Apache-2.0 license

use crate::expression::{self, Expression, ExpressionError};
use crate::loader::DocumentSource;
use crate::{Error, Result};
use serde_json::{Map, Value};
use tracing::debug;

/// Root key of every mapper document
pub const MAP_KEY: &str = "$map";

/// Name bound to the resolved `$from` value in conditions
pub const FROM_BINDING: &str = "from";

/// Name bound to the current output value in `$apply`
pub const VALUE_BINDING: &str = "value";

/// Name bound to the resolved path reference of a `from` condition
pub const REFERENCE_BINDING: &str = "reference";

/// Characters that separate the trailing path reference in a `from` condition
const REFERENCE_SEPARATORS: &[char] = &['=', '<', '>', ' ', '*', '/', '^', '%', '+', '-'];

/// A compiled mapper document
#[derive(Debug, Clone)]
pub struct MapperDocument {
    tree: MapperTree,
}

/// Ordered children of a container node
#[derive(Debug, Clone, Default)]
pub struct MapperTree {
    entries: Vec<(String, MapperNode)>,
}

/// A node in the mapper tree
#[derive(Debug, Clone)]
pub enum MapperNode {
    /// Nested object mirrored into the output
    Container(MapperTree),
    /// Leaf producing a single output value
    Directive(Box<Directive>),
}

/// Directives of one leaf node, applied in a fixed order
#[derive(Debug, Clone, Default)]
pub struct Directive {
    /// `$from`: source path
    pub from: Option<String>,
    /// `$default`: fallback literal
    pub default: Option<Value>,
    /// `$if`: conditions combined with AND semantics
    pub conditions: Option<Vec<Condition>>,
    /// `$then`: value when all conditions hold
    pub then_branch: Option<Branch>,
    /// `$else`: value when any condition fails
    pub else_branch: Option<Branch>,
    /// `$rename`: value substitutions
    pub rename: Option<Rename>,
    /// `$apply`: post-processing expression
    pub apply: Option<ApplyExpression>,
}

/// One entry of `$if`
#[derive(Debug, Clone)]
pub struct Condition {
    /// Source path of the tested value
    pub from: String,
    /// How the value is tested
    pub test: ConditionTest,
}

/// Test applied to a condition's resolved value
#[derive(Debug, Clone)]
pub enum ConditionTest {
    /// `$is`: membership in a set of literals
    Is(Vec<Value>),
    /// `$typeof`: non-null with a matching type tag
    TypeOf(String),
    /// `$condition`: expression over `from`
    Expression {
        constant: String,
        kind: ConditionKind,
        compiled: Expression,
    },
}

/// `$condition.$type`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionKind {
    /// `from <const>`
    Simple,
    /// `from <const>` where the trailing token of the constant is a source path
    From { reference: String },
}

/// `$then` / `$else` target
#[derive(Debug, Clone, PartialEq)]
pub enum Branch {
    /// Resolve a path against the source
    From(String),
    /// Use a literal
    Value(Value),
}

/// `$rename` substitution pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub pairs: Vec<(String, String)>,
}

/// `$apply` expression
///
/// A parse failure is kept rather than rejected: the node still transforms,
/// and the failure surfaces as a warning whenever the expression would run.
#[derive(Debug, Clone)]
pub struct ApplyExpression {
    pub source: String,
    pub compiled: std::result::Result<Expression, ExpressionError>,
}

impl MapperDocument {
    /// Compile a mapper document from JSON
    pub fn from_value(value: &Value) -> Result<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| Error::definition(MAP_KEY, "Mapper document must be a JSON object."))?;

        let map = root
            .get(MAP_KEY)
            .ok_or_else(|| Error::definition(MAP_KEY, "Mapper object must have a `$map` property."))?;

        let map = map
            .as_object()
            .ok_or_else(|| Error::definition(MAP_KEY, "`$map` must be a JSON object."))?;

        let tree = MapperTree::compile(map, "")?;
        debug!(keys = tree.len(), "Compiled mapper document");

        Ok(Self { tree })
    }

    /// Load and compile a mapper document
    pub fn from_source(source: impl Into<DocumentSource>) -> Result<Self> {
        let value = source.into().load()?;
        Self::from_value(&value)
    }

    /// Get the root tree
    pub fn tree(&self) -> &MapperTree {
        &self.tree
    }
}

impl MapperTree {
    fn compile(object: &Map<String, Value>, parent: &str) -> Result<Self> {
        let mut entries = Vec::with_capacity(object.len());

        for (key, value) in object {
            let path = child_path(parent, key);
            let node = MapperNode::compile(value, &path)?;
            entries.push((key.clone(), node));
        }

        Ok(Self { entries })
    }

    /// Iterate over children in mapper order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MapperNode)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    /// Look up a child by key
    pub fn get(&self, key: &str) -> Option<&MapperNode> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree has no children
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Output object with every key present and directive leaves set to null
    pub fn skeleton(&self) -> Map<String, Value> {
        self.iter()
            .map(|(key, node)| {
                let value = match node {
                    MapperNode::Container(tree) => Value::Object(tree.skeleton()),
                    MapperNode::Directive(_) => Value::Null,
                };
                (key.to_string(), value)
            })
            .collect()
    }
}

impl MapperNode {
    fn compile(value: &Value, path: &str) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Error::definition(path, "Mapper node must be an object of child keys or directives.")
        })?;

        let directive_keys = object.keys().filter(|k| is_directive_key(k)).count();

        if directive_keys < object.len() {
            if directive_keys > 0 {
                return Err(Error::definition(
                    path,
                    "Node mixes $-prefixed directives with child keys.",
                ));
            }
            return Ok(MapperNode::Container(MapperTree::compile(object, path)?));
        }

        Ok(MapperNode::Directive(Box::new(Directive::compile(object, path)?)))
    }

    /// Whether this node is a container
    pub fn is_container(&self) -> bool {
        matches!(self, MapperNode::Container(_))
    }
}

impl Directive {
    fn compile(object: &Map<String, Value>, path: &str) -> Result<Self> {
        let mut directive = Directive::default();

        for (name, value) in object {
            match name.as_str() {
                "$from" => directive.from = Some(expect_string(value, path, "$from")?),
                "$default" => directive.default = Some(value.clone()),
                "$if" => directive.conditions = Some(compile_conditions(value, path)?),
                "$then" => directive.then_branch = Some(Branch::compile(value, path, "$then")?),
                "$else" => directive.else_branch = Some(Branch::compile(value, path, "$else")?),
                "$rename" => directive.rename = Some(Rename::compile(value, path)?),
                "$apply" => {
                    let source = expect_string(value, path, "$apply")?;
                    let compiled = expression::compile(&source, &[VALUE_BINDING]);
                    directive.apply = Some(ApplyExpression { source, compiled });
                }
                other => {
                    return Err(Error::definition(
                        path,
                        format!("Unknown directive {}.", other),
                    ))
                }
            }
        }

        Ok(directive)
    }
}

fn compile_conditions(value: &Value, path: &str) -> Result<Vec<Condition>> {
    match value {
        Value::Object(_) => Ok(vec![Condition::compile(value, path)?]),
        Value::Array(items) => items
            .iter()
            .map(|item| Condition::compile(item, path))
            .collect(),
        _ => Err(Error::definition(
            path,
            "$if must be a condition object or an array of condition objects.",
        )),
    }
}

impl Condition {
    fn compile(value: &Value, path: &str) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::definition(path, "$if conditions must be objects."))?;

        let from = match object.get("$from") {
            Some(from) => expect_string(from, path, "$if.$from")?,
            None => return Err(Error::definition(path, "$if requires a $from child.")),
        };

        let tests: Vec<&str> = ["$is", "$typeof", "$condition"]
            .into_iter()
            .filter(|k| object.contains_key(*k))
            .collect();

        if tests.len() != 1 {
            return Err(Error::definition(
                path,
                "$if requires exactly one of $is, $typeof, or $condition.",
            ));
        }

        if let Some(unknown) = object
            .keys()
            .find(|k| !matches!(k.as_str(), "$from" | "$is" | "$typeof" | "$condition"))
        {
            return Err(Error::definition(
                path,
                format!("Unknown condition key {}.", unknown),
            ));
        }

        let test = match (object.get("$is"), object.get("$typeof"), object.get("$condition")) {
            (Some(is), _, _) => ConditionTest::Is(match is {
                Value::Array(items) => items.clone(),
                single => vec![single.clone()],
            }),
            (_, Some(type_tag), _) => {
                ConditionTest::TypeOf(expect_string(type_tag, path, "$typeof")?)
            }
            (_, _, Some(condition)) => compile_condition_expression(condition, path)?,
            _ => {
                return Err(Error::definition(
                    path,
                    "$if requires exactly one of $is, $typeof, or $condition.",
                ))
            }
        };

        Ok(Self { from, test })
    }
}

fn compile_condition_expression(value: &Value, path: &str) -> Result<ConditionTest> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::definition(path, "$condition must be an object."))?;

    let constant = match object.get("$const") {
        Some(constant) => expect_string(constant, path, "$condition.$const")?,
        None => return Err(Error::definition(path, "$condition requires $const.")),
    };

    let kind = match object.get("$type").map(Value::as_str) {
        None | Some(Some("simple")) => ConditionKind::Simple,
        Some(Some("from")) => {
            let (_, reference) = split_reference(&constant);
            if reference.is_empty() {
                return Err(Error::definition(
                    path,
                    "$condition of $type \"from\" must end with a source path.",
                ));
            }
            ConditionKind::From {
                reference: reference.to_string(),
            }
        }
        _ => {
            return Err(Error::definition(
                path,
                "$condition.$type must be \"simple\" or \"from\".",
            ))
        }
    };

    let (source, allowed) = match &kind {
        ConditionKind::Simple => (
            format!("{} {}", FROM_BINDING, constant),
            vec![FROM_BINDING],
        ),
        ConditionKind::From { .. } => {
            let (prefix, _) = split_reference(&constant);
            (
                format!("{} {}{}", FROM_BINDING, prefix, REFERENCE_BINDING),
                vec![FROM_BINDING, REFERENCE_BINDING],
            )
        }
    };

    let compiled = expression::compile(&source, &allowed).map_err(|e| {
        Error::definition(path, format!("Invalid $condition \"{}\": {}", constant, e))
    })?;

    Ok(ConditionTest::Expression {
        constant,
        kind,
        compiled,
    })
}

/// Split a `from` condition constant into operator prefix and trailing path token
///
/// `>= limits::min` splits into `">= "` and `"limits::min"`. Paths containing
/// any separator character cannot be referenced this way.
pub fn split_reference(constant: &str) -> (&str, &str) {
    match constant.rfind(REFERENCE_SEPARATORS) {
        Some(index) => constant.split_at(index + 1),
        None => ("", constant),
    }
}

impl Branch {
    fn compile(value: &Value, path: &str, name: &str) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::definition(path, format!("{} must be an object.", name)))?;

        if let Some(from) = object.get("$from") {
            return Ok(Branch::From(expect_string(from, path, name)?));
        }

        match object.get("$value") {
            Some(literal) => Ok(Branch::Value(literal.clone())),
            None => Err(Error::definition(
                path,
                format!("{} requires either $from or $value.", name),
            )),
        }
    }
}

impl Rename {
    fn compile(value: &Value, path: &str) -> Result<Self> {
        let missing = || Error::definition(path, "$rename requires both $source and $target.");

        let object = value.as_object().ok_or_else(missing)?;
        let source = object.get("$source").ok_or_else(missing)?;
        let target = object.get("$target").ok_or_else(missing)?;

        let source = string_list(source, path, "$rename.$source")?;
        let target = string_list(target, path, "$rename.$target")?;

        if source.len() != target.len() {
            return Err(Error::definition(
                path,
                "$rename's $source and $target length don't match.",
            ));
        }

        Ok(Self {
            pairs: source.into_iter().zip(target).collect(),
        })
    }
}

fn string_list(value: &Value, path: &str, name: &str) -> Result<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::definition(path, format!("{} must be an array of strings.", name)))?;

    items
        .iter()
        .map(|item| expect_string(item, path, name))
        .collect()
}

fn expect_string(value: &Value, path: &str, name: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::definition(path, format!("{} must be a string.", name)))
}

fn is_directive_key(key: &str) -> bool {
    key.starts_with('$')
}

pub(crate) fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(map: Value) -> Result<MapperDocument> {
        MapperDocument::from_value(&json!({ "$map": map }))
    }

    fn definition_message(result: Result<MapperDocument>) -> (String, String) {
        match result {
            Err(Error::MappingDefinition { key, message }) => (key, message),
            other => panic!("expected definition error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_map() {
        let (key, message) = definition_message(MapperDocument::from_value(&json!({"x": 1})));
        assert_eq!(key, "$map");
        assert!(message.contains("`$map`"));

        assert!(MapperDocument::from_value(&json!([])).is_err());
        assert!(MapperDocument::from_value(&json!({"$map": 5})).is_err());
    }

    #[test]
    fn test_container_and_directive_detection() {
        let doc = compile(json!({
            "user": {"name": {"$from": "name"}, "age": {"$from": "age"}},
            "status": {"$from": "state"},
            "empty": {}
        }))
        .unwrap();

        let tree = doc.tree();
        assert_eq!(tree.len(), 3);
        assert!(tree.get("user").unwrap().is_container());
        assert!(!tree.get("status").unwrap().is_container());
        assert!(!tree.get("empty").unwrap().is_container());

        let keys: Vec<_> = tree.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["user", "status", "empty"]);
    }

    #[test]
    fn test_skeleton_nulls_directives() {
        let doc = compile(json!({
            "a": {"b": {"$from": "x"}, "c": {"d": {"$default": 1}}},
            "e": {"$from": "y"}
        }))
        .unwrap();

        assert_eq!(
            Value::Object(doc.tree().skeleton()),
            json!({"a": {"b": null, "c": {"d": null}}, "e": null})
        );
    }

    #[test]
    fn test_mixed_node_rejected() {
        let (key, _) = definition_message(compile(json!({
            "outer": {"inner": {"$from": "x"}, "$from": "y"}
        })));
        assert_eq!(key, "outer");
    }

    #[test]
    fn test_non_object_node_rejected() {
        let (key, _) = definition_message(compile(json!({"a": {"b": "literal"}})));
        assert_eq!(key, "a.b");
    }

    #[test]
    fn test_unknown_directive_rejected() {
        let (key, message) = definition_message(compile(json!({"a": {"$form": "x"}})));
        assert_eq!(key, "a");
        assert!(message.contains("$form"));
    }

    #[test]
    fn test_if_normalised_to_list() {
        let doc = compile(json!({
            "flag": {"$if": {"$from": "x", "$is": "y"}}
        }))
        .unwrap();

        match doc.tree().get("flag") {
            Some(MapperNode::Directive(directive)) => {
                let conditions = directive.conditions.as_ref().unwrap();
                assert_eq!(conditions.len(), 1);
                assert!(matches!(&conditions[0].test, ConditionTest::Is(set) if set == &vec![json!("y")]));
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_condition_requires_exactly_one_test() {
        let (_, message) = definition_message(compile(json!({
            "flag": {"$if": {"$from": "x"}}
        })));
        assert!(message.contains("exactly one"));

        assert!(compile(json!({
            "flag": {"$if": {"$from": "x", "$is": 1, "$typeof": "number"}}
        }))
        .is_err());

        assert!(compile(json!({
            "flag": {"$if": {"$is": 1}}
        }))
        .is_err());
    }

    #[test]
    fn test_condition_type_defaults_to_simple() {
        let doc = compile(json!({
            "flag": {"$if": {"$from": "x", "$condition": {"$const": "> 10"}}}
        }))
        .unwrap();

        match doc.tree().get("flag") {
            Some(MapperNode::Directive(directive)) => {
                let test = &directive.conditions.as_ref().unwrap()[0].test;
                assert!(matches!(
                    test,
                    ConditionTest::Expression { kind: ConditionKind::Simple, .. }
                ));
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_condition_errors() {
        assert!(compile(json!({
            "f": {"$if": {"$from": "x", "$condition": {"$type": "simple"}}}
        }))
        .is_err());
        assert!(compile(json!({
            "f": {"$if": {"$from": "x", "$condition": {"$const": "> 1", "$type": "regex"}}}
        }))
        .is_err());
        assert!(compile(json!({
            "f": {"$if": {"$from": "x", "$condition": {"$const": "= 1"}}}
        }))
        .is_err());
        assert!(compile(json!({
            "f": {"$if": {"$from": "x", "$condition": {"$const": "> other"}}}
        }))
        .is_err());
    }

    #[test]
    fn test_from_condition_reference() {
        let doc = compile(json!({
            "f": {"$if": {"$from": "x", "$condition": {"$const": ">= limits::min", "$type": "from"}}}
        }))
        .unwrap();

        match doc.tree().get("f") {
            Some(MapperNode::Directive(directive)) => {
                let test = &directive.conditions.as_ref().unwrap()[0].test;
                match test {
                    ConditionTest::Expression { kind, compiled, .. } => {
                        assert_eq!(
                            kind,
                            &ConditionKind::From {
                                reference: "limits::min".to_string()
                            }
                        );
                        assert_eq!(compiled.to_string(), "(from >= reference)");
                    }
                    other => panic!("unexpected test {:?}", other),
                }
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_split_reference() {
        assert_eq!(split_reference("== target"), ("== ", "target"));
        assert_eq!(split_reference(">limit"), (">", "limit"));
        assert_eq!(split_reference("a::b"), ("", "a::b"));
        assert_eq!(split_reference("> "), ("> ", ""));
    }

    #[test]
    fn test_branch_requires_from_or_value() {
        let (_, message) = definition_message(compile(json!({
            "f": {"$if": {"$from": "x", "$is": 1}, "$then": {"$other": 1}}
        })));
        assert!(message.contains("$then requires"));

        assert!(compile(json!({
            "f": {"$if": {"$from": "x", "$is": 1}, "$then": {"$value": null}}
        }))
        .is_ok());
    }

    #[test]
    fn test_rename_shape() {
        let (key, message) = definition_message(compile(json!({
            "s": {"$from": "x", "$rename": {"$source": ["a"]}}
        })));
        assert_eq!(key, "s");
        assert_eq!(message, "$rename requires both $source and $target.");

        let (_, message) = definition_message(compile(json!({
            "s": {"$from": "x", "$rename": {"$source": ["a", "b"], "$target": ["x"]}}
        })));
        assert!(message.contains("length"));

        assert!(compile(json!({
            "s": {"$from": "x", "$rename": {"$source": [1], "$target": ["x"]}}
        }))
        .is_err());
    }

    #[test]
    fn test_apply_parse_failure_is_deferred() {
        let doc = compile(json!({
            "s": {"$from": "x", "$apply": "value.toUpperCase()"}
        }))
        .unwrap();

        match doc.tree().get("s") {
            Some(MapperNode::Directive(directive)) => {
                assert!(directive.apply.as_ref().unwrap().compiled.is_err());
            }
            other => panic!("unexpected node {:?}", other),
        }

        assert!(compile(json!({"s": {"$apply": 5}})).is_err());
    }

    #[test]
    fn test_nested_key_path_in_errors() {
        let (key, _) = definition_message(compile(json!({
            "a": {"b": {"c": {"$from": 7}}}
        })));
        assert_eq!(key, "a.b.c");
    }
}
