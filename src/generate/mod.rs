//! Source generator for syntax-tree node types.
//!
//! A grammar is a base type name plus one rule per variant, written
//! `"Variant : field Type, field Type"`. [`define_ast`] expands it into a Rust
//! module holding the `Visitor` trait, the base enum with its `accept`
//! dispatch, and one node struct per variant. Fields whose type is the base
//! type are boxed. The output depends only on the input, so regenerating an
//! unchanged grammar reproduces the file byte for byte.

pub mod grammar;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GenerateError;
use grammar::{Rule, is_type_name, parse_rules, snake_case};

/// The expression grammar that `src/ast/expr.rs` is generated from.
pub const EXPR_GRAMMAR: &[&str] = &[
    "Binary   : left Expr, operator Token, right Expr",
    "Grouping : expression Expr",
    "Literal  : value LiteralValue",
    "Unary    : operator Token, right Expr",
];

/// Render the module source for `base_name` and its variant `rules`.
pub fn define_ast(base_name: &str, rules: &[&str]) -> Result<String, GenerateError> {
    if !is_type_name(base_name) {
        return Err(GenerateError::malformed(
            base_name,
            "base name must be a capitalized identifier",
        ));
    }
    let rules = parse_rules(rules)?;

    let mut out = String::new();
    define_header(&mut out, base_name, &rules);
    define_visitor(&mut out, base_name, &rules);
    define_base(&mut out, base_name, &rules);
    for rule in &rules {
        define_type(&mut out, base_name, rule);
    }
    Ok(out)
}

/// Render the grammar and write it to `<output_dir>/<base_name in snake case>.rs`.
/// Nothing touches the disk unless rendering succeeded.
pub fn write_ast(
    output_dir: &Path,
    base_name: &str,
    rules: &[&str],
) -> Result<PathBuf, GenerateError> {
    let source = define_ast(base_name, rules)?;
    let path = output_dir.join(format!("{}.rs", snake_case(base_name)));
    fs::write(&path, source).map_err(|source| GenerateError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn node_type(base_name: &str, rule: &Rule) -> String {
    format!("{}{base_name}", rule.variant)
}

fn visit_method(base_name: &str, rule: &Rule) -> String {
    format!("visit_{}_{}", snake_case(&rule.variant), snake_case(base_name))
}

fn define_header(out: &mut String, base_name: &str, rules: &[Rule]) {
    out.push_str(&format!(
        "// @generated by `generate_ast` from the `{base_name}` grammar. Do not edit by hand.\n"
    ));
    out.push_str("\nuse serde::Serialize;\n");

    let imports: BTreeSet<&str> = rules
        .iter()
        .flat_map(|rule| rule.fields.iter())
        .map(|field| field.ty.as_str())
        .filter(|ty| *ty != base_name && ty.starts_with(|c: char| c.is_ascii_uppercase()))
        .collect();
    match imports.len() {
        0 => {}
        1 => out.push_str(&format!(
            "\nuse super::{};\n",
            imports.iter().copied().collect::<String>()
        )),
        _ => out.push_str(&format!(
            "\nuse super::{{{}}};\n",
            imports.into_iter().collect::<Vec<_>>().join(", ")
        )),
    }
}

fn define_visitor(out: &mut String, base_name: &str, rules: &[Rule]) {
    let param = snake_case(base_name);
    out.push_str(&format!("\n/// One handler per `{base_name}` variant.\n"));
    out.push_str("pub trait Visitor {\n");
    out.push_str("    type Output;\n\n");
    for rule in rules {
        out.push_str(&format!(
            "    fn {}(&mut self, {param}: &{}) -> Self::Output;\n",
            visit_method(base_name, rule),
            node_type(base_name, rule),
        ));
    }
    out.push_str("}\n");
}

fn define_base(out: &mut String, base_name: &str, rules: &[Rule]) {
    let param = snake_case(base_name);

    out.push_str("\n#[derive(Debug, Clone, PartialEq, Serialize)]\n");
    out.push_str("#[serde(tag = \"type\")]\n");
    out.push_str(&format!("pub enum {base_name} {{\n"));
    for rule in rules {
        out.push_str(&format!(
            "    {}({}),\n",
            rule.variant,
            node_type(base_name, rule)
        ));
    }
    out.push_str("}\n");

    out.push_str(&format!("\nimpl {base_name} {{\n"));
    out.push_str("    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {\n");
    out.push_str("        match self {\n");
    for rule in rules {
        out.push_str(&format!(
            "            Self::{}({param}) => visitor.{}({param}),\n",
            rule.variant,
            visit_method(base_name, rule),
        ));
    }
    out.push_str("        }\n");
    out.push_str("    }\n");
    out.push_str("}\n");
}

fn define_type(out: &mut String, base_name: &str, rule: &Rule) {
    let name = node_type(base_name, rule);
    let param = snake_case(base_name);

    out.push_str("\n#[derive(Debug, Clone, PartialEq, Serialize)]\n");
    out.push_str(&format!("pub struct {name} {{\n"));
    for field in &rule.fields {
        let ty = if field.ty == base_name {
            format!("Box<{base_name}>")
        } else {
            field.ty.clone()
        };
        out.push_str(&format!("    pub {}: {ty},\n", field.name));
    }
    out.push_str("}\n");

    let params: Vec<String> = rule
        .fields
        .iter()
        .map(|field| format!("{}: {}", field.name, field.ty))
        .collect();
    out.push_str(&format!("\nimpl {name} {{\n"));
    out.push_str(&format!(
        "    pub fn new({}) -> Self {{\n",
        params.join(", ")
    ));
    match rule.fields.as_slice() {
        [only] if only.ty != base_name => {
            out.push_str(&format!("        Self {{ {} }}\n", only.name));
        }
        fields => {
            out.push_str("        Self {\n");
            for field in fields {
                if field.ty == base_name {
                    out.push_str(&format!(
                        "            {0}: Box::new({0}),\n",
                        field.name
                    ));
                } else {
                    out.push_str(&format!("            {},\n", field.name));
                }
            }
            out.push_str("        }\n");
        }
    }
    out.push_str("    }\n\n");
    out.push_str("    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::Output {\n");
    out.push_str(&format!(
        "        visitor.{}(self)\n",
        visit_method(base_name, rule)
    ));
    out.push_str("    }\n");
    out.push_str("}\n");

    out.push_str(&format!("\nimpl From<{name}> for {base_name} {{\n"));
    out.push_str(&format!("    fn from({param}: {name}) -> Self {{\n"));
    out.push_str(&format!("        Self::{}({param})\n", rule.variant));
    out.push_str("    }\n");
    out.push_str("}\n");
}
