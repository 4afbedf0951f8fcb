//! Field classification shared by record creation and snapshot merges.
//!
//! Every key a caller can hand to `add_node`/`add_edge` is looked up in a
//! static table. Typed fields are coerced into the record, identity and
//! derived fields are refused, and anything the table does not know lands in
//! the record's `attr` map under its original name.

use serde_json::{Map, Value};

use super::{Edge, Node};

/// Records that carry a free-form attribute bucket.
pub(crate) trait Attributed {
    fn attr_mut(&mut self) -> &mut Map<String, Value>;
}

impl Attributed for Node {
    fn attr_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attr
    }
}

impl Attributed for Edge {
    fn attr_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attr
    }
}

pub(crate) enum Access<R> {
    Numeric(fn(&mut R) -> &mut f64),
    Boolean(fn(&mut R) -> &mut bool),
    Text(fn(&mut R) -> &mut String),
    OptionalText(fn(&mut R) -> &mut Option<String>),
    /// Never written after creation, never taken from parameters.
    Identity,
    /// Maintained by the store or the transform passes.
    Derived,
    /// The `attr` bucket itself. Carried over on merge; as a creation
    /// parameter it is an ordinary unknown key.
    AttrMap,
    /// An array of `{ "attr": name, "val": value }` pairs.
    AttrPairs,
}

pub(crate) struct Field<R> {
    pub names: &'static [&'static str],
    pub access: Access<R>,
}

macro_rules! field_mut {
    ($record:ty, $field:ident, $out:ty) => {{
        fn access(record: &mut $record) -> &mut $out {
            &mut record.$field
        }
        access
    }};
}

#[rustfmt::skip]
pub(crate) const NODE_FIELDS: &[Field<Node>] = &[
    Field { names: &["id"], access: Access::Identity },
    Field { names: &["x"], access: Access::Numeric(field_mut!(Node, x, f64)) },
    Field { names: &["y"], access: Access::Numeric(field_mut!(Node, y, f64)) },
    Field { names: &["size"], access: Access::Numeric(field_mut!(Node, size, f64)) },
    Field { names: &["fixed"], access: Access::Boolean(field_mut!(Node, fixed, bool)) },
    Field { names: &["active"], access: Access::Boolean(field_mut!(Node, active, bool)) },
    Field { names: &["hidden"], access: Access::Boolean(field_mut!(Node, hidden, bool)) },
    Field {
        names: &["forceLabel", "force_label"],
        access: Access::Boolean(field_mut!(Node, force_label, bool)),
    },
    Field { names: &["label"], access: Access::Text(field_mut!(Node, label, String)) },
    Field {
        names: &["color"],
        access: Access::OptionalText(field_mut!(Node, color, Option<String>)),
    },
    Field { names: &["degree"], access: Access::Derived },
    Field { names: &["inDegree", "in_degree"], access: Access::Derived },
    Field { names: &["outDegree", "out_degree"], access: Access::Derived },
    Field { names: &["displayX", "display_x"], access: Access::Derived },
    Field { names: &["displayY", "display_y"], access: Access::Derived },
    Field { names: &["displaySize", "display_size"], access: Access::Derived },
    Field { names: &["hover"], access: Access::Derived },
    Field { names: &["attr"], access: Access::AttrMap },
];

#[rustfmt::skip]
pub(crate) const EDGE_FIELDS: &[Field<Edge>] = &[
    Field { names: &["id"], access: Access::Identity },
    Field { names: &["source"], access: Access::Identity },
    Field { names: &["target"], access: Access::Identity },
    Field { names: &["size"], access: Access::Numeric(field_mut!(Edge, size, f64)) },
    Field { names: &["weight"], access: Access::Numeric(field_mut!(Edge, weight, f64)) },
    Field { names: &["hidden"], access: Access::Boolean(field_mut!(Edge, hidden, bool)) },
    Field { names: &["label"], access: Access::Text(field_mut!(Edge, label, String)) },
    Field {
        names: &["color"],
        access: Access::OptionalText(field_mut!(Edge, color, Option<String>)),
    },
    Field {
        names: &["type"],
        access: Access::OptionalText(field_mut!(Edge, kind, Option<String>)),
    },
    Field { names: &["displaySize", "display_size"], access: Access::Derived },
    Field { names: &["hover"], access: Access::Derived },
    Field { names: &["attr"], access: Access::AttrMap },
    Field { names: &["attributes"], access: Access::AttrPairs },
];

fn lookup<'t, R>(table: &'t [Field<R>], key: &str) -> Option<&'t Field<R>> {
    table.iter().find(|field| field.names.contains(&key))
}

/// Applies a parameter bag to a freshly created record.
pub(crate) fn apply_params<R: Attributed>(
    record: &mut R,
    table: &[Field<R>],
    params: &Map<String, Value>,
) {
    for (key, value) in params {
        let Some(field) = lookup(table, key) else {
            record.attr_mut().insert(key.clone(), value.clone());
            continue;
        };

        match &field.access {
            Access::Numeric(get) => *get(record) = to_number(value),
            Access::Boolean(get) => *get(record) = truthy(value),
            Access::Text(get) => *get(record) = to_text(value),
            Access::OptionalText(get) => *get(record) = to_optional_text(value),
            Access::Identity | Access::Derived => {
                log::debug!("ignoring read-only parameter \"{key}\"");
            }
            Access::AttrMap => {
                record.attr_mut().insert(key.clone(), value.clone());
            }
            Access::AttrPairs => {
                let Value::Array(pairs) = value else {
                    record.attr_mut().insert(key.clone(), value.clone());
                    continue;
                };
                for pair in pairs {
                    let Some(name) = pair.get("attr") else {
                        continue;
                    };
                    let entry = pair.get("val").cloned().unwrap_or(Value::Null);
                    record.attr_mut().insert(to_text(name), entry);
                }
            }
        }
    }
}

/// Copies the writable fields of an edited snapshot back onto the live record.
///
/// Identity and derived fields of the snapshot are discarded.
pub(crate) fn merge_snapshot<R: Attributed>(live: &mut R, snapshot: &mut R, table: &[Field<R>]) {
    for field in table {
        match &field.access {
            Access::Numeric(get) => *get(live) = *get(snapshot),
            Access::Boolean(get) => *get(live) = *get(snapshot),
            Access::Text(get) => *get(live) = std::mem::take(get(snapshot)),
            Access::OptionalText(get) => *get(live) = get(snapshot).take(),
            Access::AttrMap => *live.attr_mut() = std::mem::take(snapshot.attr_mut()),
            Access::Identity | Access::Derived | Access::AttrPairs => {}
        }
    }
}

/// Loose numeric coercion: numeric strings parse, booleans are 0/1, null is 0.
pub(crate) fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(number) => number.as_f64().unwrap_or(f64::NAN),
        Value::Bool(flag) => f64::from(u8::from(*flag)),
        Value::Null => 0.0,
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                0.0
            } else {
                text.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn to_optional_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(to_text(other)),
    }
}
