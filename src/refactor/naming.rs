use std::collections::HashSet;

use crate::lexer::is_keyword;
use crate::parser::ast::{ident_value, MethodDecl, TypeDecl, TypeExpr};
use crate::visit::composers::names_in_block;

/// Names already bound or referenced around a method body: its parameters,
/// everything named inside the body, and the members of its declaring type.
pub fn taken_names(owner: &TypeDecl, method: &MethodDecl) -> HashSet<String> {
    let mut taken: HashSet<String> =
        method.params.iter().map(|p| ident_value(&p.node.name.node).to_string()).collect();
    if let Some(body) = &method.body {
        taken.extend(names_in_block(body));
    }
    taken.extend(owner.fields.iter().map(|f| ident_value(&f.node.name.node).to_string()));
    taken.extend(owner.methods.iter().map(|m| ident_value(&m.node.name.node).to_string()));
    taken
}

/// Local name for a value of type `target`: the simple type name with its
/// first letter lower-cased, numbered when the plain form is taken, and
/// escaped with `@` when it collides with a keyword.
pub fn binding_name(target: &TypeExpr, taken: &HashSet<String>) -> Option<String> {
    let simple = target.simple_name()?;
    let mut chars = simple.chars();
    let first = chars.next()?;
    let base: String = first.to_lowercase().chain(chars).collect();

    let candidate = (0usize..)
        .map(|n| if n == 0 { base.clone() } else { format!("{base}{n}") })
        .find(|c| !taken.contains(c))?;
    Some(if is_keyword(&candidate) { format!("@{candidate}") } else { candidate })
}
