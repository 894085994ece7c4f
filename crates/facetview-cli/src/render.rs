//! Output of projected trees: colored text or JSON.

use anyhow::Result;
use colored::Colorize;
use serde_json::{json, Value as Json};

use facetview_engine::ProjectionEngine;
use facetview_model::{ContextToken, VirtualNode};

/// A projected node plus the children expanded below it.
pub struct Expanded {
    pub node: VirtualNode,
    pub children: Vec<Expanded>,
}

/// Expand `node` lazily, `depth` levels down.
pub fn expand_tree(
    engine: &ProjectionEngine,
    node: VirtualNode,
    depth: usize,
    ctx: &ContextToken,
) -> Result<Expanded> {
    let mut children = Vec::new();
    if depth > 0 {
        for child in &node.children {
            let projected = engine.expand(child, ctx)?;
            children.push(expand_tree(engine, projected, depth - 1, ctx)?);
        }
    }
    Ok(Expanded { node, children })
}

pub fn to_json(tree: &Expanded) -> Result<Json> {
    let node = &tree.node;
    let properties = node
        .properties
        .iter()
        .map(|(name, value)| Ok((name.clone(), serde_json::to_value(value)?)))
        .collect::<Result<serde_json::Map<_, _>>>()?;
    let identity = match &node.identity {
        Some(id) => json!({
            "canonical": id.canonical.to_string(),
            "path": id.path(),
            "context": id.context.as_str(),
            "owning_name": id.owning_name,
            "view": serde_json::to_value(&id.view)?,
            "order": serde_json::to_value(&id.order)?,
            "singled": id.singled,
        }),
        None => Json::Null,
    };
    let entries: Vec<Json> = node
        .children
        .iter()
        .map(|c| json!({ "name": c.name, "canonical": c.canonical.to_string() }))
        .collect();
    let expanded = tree.children.iter().map(to_json).collect::<Result<Vec<_>>>()?;

    Ok(json!({
        "name": node.name,
        "population": serde_json::to_value(node.population)?,
        "type": node.node_type,
        "mixins": node.mixins,
        "identity": identity,
        "properties": properties,
        "children": entries,
        "expanded": expanded,
    }))
}

pub fn print_tree(tree: &Expanded) {
    print_node(tree, 0);
}

fn print_node(tree: &Expanded, indent: usize) {
    let pad = "  ".repeat(indent);
    let node = &tree.node;

    if let Some(reason) = node.empty_reason() {
        println!(
            "{pad}{} {}",
            node.name.bold(),
            format!("(empty: {reason:?})").red()
        );
        return;
    }

    let node_type = node.node_type.as_deref().unwrap_or("?");
    let canonical = node
        .identity
        .as_ref()
        .map(|i| i.canonical.to_string())
        .unwrap_or_default();
    println!(
        "{pad}{} {} {}",
        node.name.bold(),
        format!("[{node_type}]").cyan(),
        canonical.dimmed()
    );
    if !node.mixins.is_empty() {
        let mixins: Vec<&str> = node.mixins.iter().map(String::as_str).collect();
        println!("{pad}  {} {}", "mixins".dimmed(), mixins.join(", "));
    }
    for (name, value) in &node.properties {
        println!("{pad}  {} = {}", name.yellow(), value.texts().join(", "));
    }
    if tree.children.is_empty() {
        for child in &node.children {
            println!("{pad}  {} {}", "-".dimmed(), child.name);
        }
    } else {
        for child in &tree.children {
            print_node(child, indent + 1);
        }
    }
}
