use std::collections::HashSet;

use crate::error::GenerateError;

/// One `Variant : field Type, field Type` line of a grammar description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub variant: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: String,
}

impl Rule {
    pub fn parse(rule: &str) -> Result<Self, GenerateError> {
        let (variant, field_list) = rule
            .split_once(':')
            .ok_or_else(|| GenerateError::malformed(rule, "missing ':' after the variant name"))?;

        let variant = variant.trim();
        if !is_type_name(variant) {
            return Err(GenerateError::malformed(
                rule,
                "variant name must be a capitalized identifier",
            ));
        }

        let mut fields: Vec<Field> = Vec::new();
        for field in field_list.split(',') {
            let mut parts = field.split_whitespace();
            let (Some(name), Some(ty), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(GenerateError::malformed(
                    rule,
                    format!("field '{}' must be written as 'name Type'", field.trim()),
                ));
            };
            if !is_field_name(name) {
                return Err(GenerateError::malformed(
                    rule,
                    format!("'{name}' is not a valid field name"),
                ));
            }
            if !is_identifier(ty) {
                return Err(GenerateError::malformed(
                    rule,
                    format!("'{ty}' is not a valid type name"),
                ));
            }
            if fields.iter().any(|f| f.name == name) {
                return Err(GenerateError::malformed(
                    rule,
                    format!("field '{name}' is declared twice"),
                ));
            }
            fields.push(Field {
                name: name.to_string(),
                ty: ty.to_string(),
            });
        }

        Ok(Self {
            variant: variant.to_string(),
            fields,
        })
    }
}

/// Parse every rule, rejecting the whole grammar on the first bad line.
pub fn parse_rules(rules: &[&str]) -> Result<Vec<Rule>, GenerateError> {
    let mut seen = HashSet::new();
    let mut parsed = Vec::with_capacity(rules.len());
    for rule in rules {
        let rule = Rule::parse(rule)?;
        if !seen.insert(rule.variant.clone()) {
            return Err(GenerateError::DuplicateVariant(rule.variant));
        }
        parsed.push(rule);
    }
    Ok(parsed)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

pub(crate) fn is_type_name(s: &str) -> bool {
    is_identifier(s) && s.starts_with(|c: char| c.is_ascii_uppercase())
}

/// Rust keywords (strict and reserved, 2024 edition) that cannot name a field.
const RESERVED: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof", "_",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

fn is_field_name(s: &str) -> bool {
    is_identifier(s)
        && !s.starts_with(|c: char| c.is_ascii_uppercase())
        && !RESERVED.contains(&s)
}

/// `GroupingExpr` -> `grouping_expr`
pub(crate) fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
