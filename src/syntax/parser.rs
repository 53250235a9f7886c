//! Go parsing and lowering via tree-sitter.
//!
//! tree-sitter supplies the concrete parse tree; this module lowers it into
//! the typed model in [`super::ast`]. Package and import extraction use
//! tree-sitter queries, the rest is a cursor walk over named children.
//!
//! A file whose tree contains syntax errors yields no `SourceFile` at all:
//! the caller excludes it from context building and detection rather than
//! analyzing a partial tree.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use super::ast::*;

/// Shared grammar handle; building it is not free and it never changes.
static GO_LANGUAGE: Lazy<Language> = Lazy::new(|| tree_sitter_go::LANGUAGE.into());

/// Query for the package clause.
const PACKAGE_QUERY: &str = r#"
(package_clause
  (package_identifier) @package_name
)
"#;

/// Query for import specs, grouped or not.
const IMPORT_QUERY: &str = r#"
(import_declaration
  (import_spec
    name: (package_identifier)? @alias
    path: (interpreted_string_literal) @path
  )
)

(import_declaration
  (import_spec_list
    (import_spec
      name: (package_identifier)? @alias
      path: (interpreted_string_literal) @path
    )
  )
)
"#;

/// Parses Go source files into [`SourceFile`] values.
///
/// The tree-sitter `Parser` itself is not `Sync`, so one is created per
/// parse call; the `Language` handle is shared and thread-safe.
pub struct GoParser {
    language: Language,
}

impl GoParser {
    pub fn new() -> Self {
        Self {
            language: GO_LANGUAGE.clone(),
        }
    }

    /// Read and parse a file from disk.
    pub fn parse_file(&self, path: &Path) -> anyhow::Result<SourceFile> {
        let source = fs::read(path)?;
        self.parse_source(&path.to_string_lossy(), &source)
    }

    /// Parse in-memory source. `path` is recorded for issue reporting only.
    pub fn parse_source(&self, path: &str, source: &[u8]) -> anyhow::Result<SourceFile> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Go source: {}", path))?;

        let root = tree.root_node();
        if root.has_error() {
            anyhow::bail!("syntax errors in {}", path);
        }

        let mut file = SourceFile {
            path: path.to_string(),
            package: self.extract_package(root, source).unwrap_or_default(),
            imports: self.extract_imports(root, source)?,
            funcs: Vec::new(),
        };

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "function_declaration" | "method_declaration" => {
                    if let Some(func) = lower_function(child, source) {
                        file.funcs.push(func);
                    }
                }
                _ => {}
            }
        }

        Ok(file)
    }

    fn extract_package(&self, root: Node, source: &[u8]) -> Option<String> {
        let query = Query::new(&self.language, PACKAGE_QUERY).ok()?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, root, source);

        if let Some(m) = matches.next() {
            for capture in m.captures {
                let name = query.capture_names()[capture.index as usize];
                if name == "package_name" {
                    return Some(node_text(capture.node, source).to_string());
                }
            }
        }
        None
    }

    fn extract_imports(&self, root: Node, source: &[u8]) -> anyhow::Result<Vec<ImportSpec>> {
        let query = Query::new(&self.language, IMPORT_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, root, source);

        let mut imports = Vec::new();
        let mut seen = std::collections::HashSet::new();

        while let Some(m) = matches.next() {
            let mut path = String::new();
            let mut alias = None;
            let mut pos = None;

            for capture in m.captures {
                let name = query.capture_names()[capture.index as usize];
                match name {
                    "path" => {
                        path = node_text(capture.node, source)
                            .trim_matches('"')
                            .to_string();
                        pos = Some(pos_of(capture.node));
                    }
                    "alias" => {
                        alias = Some(node_text(capture.node, source).to_string());
                    }
                    _ => {}
                }
            }

            if !path.is_empty() && seen.insert(path.clone()) {
                if let Some(pos) = pos {
                    imports.push(ImportSpec { path, alias, pos });
                }
            }
        }

        imports.sort_by_key(|i| (i.pos.line, i.pos.column));
        Ok(imports)
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn pos_of(node: Node) -> Position {
    let start = node.start_position();
    Position {
        line: start.row + 1,
        column: start.column + 1,
    }
}

fn lower_function(node: Node, source: &[u8]) -> Option<FuncDecl> {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source).to_string())?;

    let receiver = node
        .child_by_field_name("receiver")
        .and_then(|r| receiver_type(r, source));

    let body = node.child_by_field_name("body").map(|b| lower_block(b, source));

    Some(FuncDecl {
        name,
        receiver,
        pos: pos_of(node),
        end_line: node.end_position().row + 1,
        body,
    })
}

fn receiver_type(param_list: Node, source: &[u8]) -> Option<String> {
    let mut cursor = param_list.walk();
    let decl = param_list
        .named_children(&mut cursor)
        .find(|n| n.kind() == "parameter_declaration")?;
    let mut ty = decl.child_by_field_name("type")?;
    if ty.kind() == "pointer_type" {
        ty = ty.named_child(0)?;
    }
    Some(node_text(ty, source).to_string())
}

fn lower_block(node: Node, source: &[u8]) -> Block {
    let mut cursor = node.walk();
    let stmts = node
        .named_children(&mut cursor)
        .filter_map(|n| lower_stmt(n, source))
        .collect();
    Block {
        pos: pos_of(node),
        stmts,
    }
}

fn lower_stmt(node: Node, source: &[u8]) -> Option<Stmt> {
    let pos = pos_of(node);
    let stmt = match node.kind() {
        "if_statement" => Stmt::If(lower_if(node, source)),
        "for_statement" => lower_for(node, source),
        "expression_switch_statement" | "type_switch_statement" => {
            Stmt::Switch(lower_switch(node, source))
        }
        "select_statement" => Stmt::Select(lower_select(node, source)),
        "assignment_statement" => {
            let op = match node
                .child_by_field_name("operator")
                .map(|o| node_text(o, source))
            {
                Some("=") => AssignOp::Assign,
                Some("+=") => AssignOp::AddAssign,
                _ => AssignOp::OtherCompound,
            };
            Stmt::Assign(AssignStmt {
                pos,
                op,
                lhs: lower_expr_list(node.child_by_field_name("left"), source),
                rhs: lower_expr_list(node.child_by_field_name("right"), source),
            })
        }
        "short_var_declaration" => Stmt::Assign(AssignStmt {
            pos,
            op: AssignOp::Define,
            lhs: lower_expr_list(node.child_by_field_name("left"), source),
            rhs: lower_expr_list(node.child_by_field_name("right"), source),
        }),
        "var_declaration" => Stmt::VarDecl(lower_var_decl(node, source)),
        "return_statement" => {
            let mut cursor = node.walk();
            let values = node
                .named_children(&mut cursor)
                .find(|n| n.kind() == "expression_list")
                .map(|list| lower_expr_list(Some(list), source))
                .unwrap_or_default();
            Stmt::Return(ReturnStmt { pos, values })
        }
        "break_statement" => Stmt::Branch(BranchStmt {
            pos,
            kind: BranchKind::Break,
        }),
        "continue_statement" => Stmt::Branch(BranchStmt {
            pos,
            kind: BranchKind::Continue,
        }),
        "goto_statement" => Stmt::Branch(BranchStmt {
            pos,
            kind: BranchKind::Goto,
        }),
        "fallthrough_statement" => Stmt::Branch(BranchStmt {
            pos,
            kind: BranchKind::Fallthrough,
        }),
        "expression_statement" => {
            let expr = node.named_child(0).map(|e| lower_expr(e, source))?;
            Stmt::Expr(ExprStmt { pos, expr })
        }
        "go_statement" | "defer_statement" => {
            let expr = node.named_child(0).map(|e| lower_expr(e, source))?;
            Stmt::Expr(ExprStmt { pos, expr })
        }
        "send_statement" => {
            let expr = node
                .child_by_field_name("value")
                .map(|e| lower_expr(e, source))?;
            Stmt::Expr(ExprStmt { pos, expr })
        }
        "inc_statement" | "dec_statement" => {
            let expr = node.named_child(0).map(|e| lower_expr(e, source))?;
            Stmt::Expr(ExprStmt { pos, expr })
        }
        "labeled_statement" => {
            let mut cursor = node.walk();
            let inner = node
                .named_children(&mut cursor)
                .filter(|n| n.kind() != "label_name")
                .find_map(|n| lower_stmt(n, source));
            inner.unwrap_or(Stmt::Other(pos))
        }
        "block" => Stmt::Block(lower_block(node, source)),
        "empty_statement" | "comment" => return None,
        kind if is_expression_kind(kind) => Stmt::Expr(ExprStmt {
            pos,
            expr: lower_expr(node, source),
        }),
        _ => Stmt::Other(pos),
    };
    Some(stmt)
}

fn is_expression_kind(kind: &str) -> bool {
    matches!(
        kind,
        "call_expression"
            | "binary_expression"
            | "unary_expression"
            | "selector_expression"
            | "index_expression"
            | "composite_literal"
            | "func_literal"
            | "parenthesized_expression"
            | "identifier"
            | "int_literal"
    )
}

fn lower_if(node: Node, source: &[u8]) -> IfStmt {
    let init = node
        .child_by_field_name("initializer")
        .and_then(|n| lower_stmt(n, source))
        .map(Box::new);
    let cond = node
        .child_by_field_name("condition")
        .map(|c| lower_expr(c, source))
        .unwrap_or(Expr::Other(pos_of(node)));
    let then_block = node
        .child_by_field_name("consequence")
        .map(|b| lower_block(b, source))
        .unwrap_or(Block {
            pos: pos_of(node),
            stmts: Vec::new(),
        });
    let else_branch = node
        .child_by_field_name("alternative")
        .and_then(|alt| match alt.kind() {
            "block" => Some(Stmt::Block(lower_block(alt, source))),
            "if_statement" => Some(Stmt::If(lower_if(alt, source))),
            _ => None,
        })
        .map(Box::new);

    IfStmt {
        pos: pos_of(node),
        init,
        cond,
        then_block,
        else_branch,
    }
}

/// `for_statement` covers counted, conditional, infinite, and range loops;
/// the clause child decides which variant we produce.
fn lower_for(node: Node, source: &[u8]) -> Stmt {
    let pos = pos_of(node);
    let body = node
        .child_by_field_name("body")
        .map(|b| lower_block(b, source))
        .unwrap_or(Block {
            pos,
            stmts: Vec::new(),
        });

    let mut cursor = node.walk();
    let clause = node
        .named_children(&mut cursor)
        .find(|n| matches!(n.kind(), "range_clause" | "for_clause"));

    match clause {
        Some(rc) if rc.kind() == "range_clause" => {
            let subject = rc
                .child_by_field_name("right")
                .map(|e| lower_expr(e, source))
                .unwrap_or(Expr::Other(pos));
            Stmt::Range(RangeStmt { pos, subject, body })
        }
        Some(fc) => Stmt::For(ForStmt {
            pos,
            init: fc
                .child_by_field_name("initializer")
                .and_then(|n| lower_stmt(n, source))
                .map(Box::new),
            cond: fc
                .child_by_field_name("condition")
                .map(|e| lower_expr(e, source)),
            post: fc
                .child_by_field_name("update")
                .and_then(|n| lower_stmt(n, source))
                .map(Box::new),
            body,
        }),
        None => {
            // `for cond {}` or bare `for {}`
            let mut cursor = node.walk();
            let cond = node
                .named_children(&mut cursor)
                .filter(|n| n.kind() != "block" && n.kind() != "comment")
                .map(|n| lower_expr(n, source))
                .next();
            Stmt::For(ForStmt {
                pos,
                init: None,
                cond,
                post: None,
                body,
            })
        }
    }
}

fn lower_switch(node: Node, source: &[u8]) -> SwitchStmt {
    let mut cursor = node.walk();
    let cases = node
        .named_children(&mut cursor)
        .filter_map(|n| match n.kind() {
            "expression_case" | "type_case" => Some(lower_case_arm(n, source, false)),
            "default_case" => Some(lower_case_arm(n, source, true)),
            _ => None,
        })
        .collect();
    SwitchStmt {
        pos: pos_of(node),
        cases,
    }
}

fn lower_case_arm(node: Node, source: &[u8], is_default: bool) -> CaseArm {
    let excluded = arm_header_nodes(node);
    let mut cursor = node.walk();
    let body = node
        .named_children(&mut cursor)
        .filter(|n| !excluded.contains(&n.id()))
        .filter_map(|n| lower_stmt(n, source))
        .collect();
    CaseArm {
        pos: pos_of(node),
        is_default,
        body,
    }
}

/// Node ids of the arm's header (case values, type list, comm operation),
/// which are not part of the arm body.
fn arm_header_nodes(node: Node) -> Vec<usize> {
    let mut ids = Vec::new();
    for field in ["value", "type", "communication"] {
        let mut cursor = node.walk();
        for child in node.children_by_field_name(field, &mut cursor) {
            ids.push(child.id());
        }
    }
    ids
}

fn lower_select(node: Node, source: &[u8]) -> SelectStmt {
    let mut cursor = node.walk();
    let arms = node
        .named_children(&mut cursor)
        .filter_map(|n| match n.kind() {
            "communication_case" => Some(lower_comm_arm(n, source, false)),
            "default_case" => Some(lower_comm_arm(n, source, true)),
            _ => None,
        })
        .collect();
    SelectStmt {
        pos: pos_of(node),
        arms,
    }
}

fn lower_comm_arm(node: Node, source: &[u8], is_default: bool) -> CommArm {
    let excluded = arm_header_nodes(node);
    let mut cursor = node.walk();
    let body = node
        .named_children(&mut cursor)
        .filter(|n| !excluded.contains(&n.id()))
        .filter_map(|n| lower_stmt(n, source))
        .collect();
    CommArm {
        pos: pos_of(node),
        is_default,
        body,
    }
}

fn lower_var_decl(node: Node, source: &[u8]) -> VarDecl {
    let mut names = Vec::new();
    let mut values = Vec::new();

    let mut cursor = node.walk();
    for spec in node.named_children(&mut cursor) {
        if spec.kind() != "var_spec" {
            continue;
        }
        let mut spec_cursor = spec.walk();
        for name in spec.children_by_field_name("name", &mut spec_cursor) {
            names.push(node_text(name, source).to_string());
        }
        if let Some(value_list) = spec.child_by_field_name("value") {
            values.extend(lower_expr_list(Some(value_list), source));
        }
    }

    VarDecl {
        pos: pos_of(node),
        names,
        values,
    }
}

fn lower_expr_list(list: Option<Node>, source: &[u8]) -> Vec<Expr> {
    let Some(list) = list else {
        return Vec::new();
    };
    if list.kind() != "expression_list" {
        return vec![lower_expr(list, source)];
    }
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .map(|n| lower_expr(n, source))
        .collect()
}

fn lower_expr(node: Node, source: &[u8]) -> Expr {
    let pos = pos_of(node);
    match node.kind() {
        "identifier" | "field_identifier" | "package_identifier" => Expr::Ident(Ident {
            pos,
            name: node_text(node, source).to_string(),
        }),
        "int_literal" => match parse_int_literal(node_text(node, source)) {
            Some(value) => Expr::IntLit(IntLit { pos, value }),
            None => Expr::Other(pos),
        },
        "call_expression" => Expr::Call(lower_call(node, source)),
        "binary_expression" => {
            let op = match node
                .child_by_field_name("operator")
                .map(|o| node_text(o, source))
            {
                Some("+") => BinaryOp::Add,
                Some("==") => BinaryOp::Eq,
                Some("&&") => BinaryOp::LogicalAnd,
                Some("||") => BinaryOp::LogicalOr,
                _ => BinaryOp::Other,
            };
            Expr::Binary(BinaryExpr {
                pos,
                op,
                lhs: Box::new(lower_child_expr(node, "left", source)),
                rhs: Box::new(lower_child_expr(node, "right", source)),
            })
        }
        "unary_expression" => Expr::Unary(UnaryExpr {
            pos,
            operand: Box::new(lower_child_expr(node, "operand", source)),
        }),
        "selector_expression" => Expr::Selector(SelectorExpr {
            pos,
            operand: Box::new(lower_child_expr(node, "operand", source)),
            field: node
                .child_by_field_name("field")
                .map(|f| node_text(f, source).to_string())
                .unwrap_or_default(),
        }),
        "index_expression" => Expr::Index(IndexExpr {
            pos,
            operand: Box::new(lower_child_expr(node, "operand", source)),
            index: Box::new(lower_child_expr(node, "index", source)),
        }),
        "composite_literal" => {
            let type_ref = node
                .child_by_field_name("type")
                .map(|t| lower_type(t, source))
                .unwrap_or(TypeRef::Other);
            let elem_count = node
                .child_by_field_name("body")
                .map(|b| b.named_child_count())
                .unwrap_or(0);
            Expr::Composite(CompositeLit {
                pos,
                type_ref,
                elem_count,
            })
        }
        "func_literal" => {
            let body = node
                .child_by_field_name("body")
                .map(|b| lower_block(b, source))
                .unwrap_or(Block {
                    pos,
                    stmts: Vec::new(),
                });
            Expr::FuncLit(FuncLit { pos, body })
        }
        "parenthesized_expression" => match node.named_child(0) {
            Some(inner) => lower_expr(inner, source),
            None => Expr::Other(pos),
        },
        _ => Expr::Other(pos),
    }
}

fn lower_child_expr(node: Node, field: &str, source: &[u8]) -> Expr {
    node.child_by_field_name(field)
        .map(|c| lower_expr(c, source))
        .unwrap_or(Expr::Other(pos_of(node)))
}

fn lower_call(node: Node, source: &[u8]) -> CallExpr {
    let pos = pos_of(node);
    let callee = node
        .child_by_field_name("function")
        .map(|f| lower_expr(f, source))
        .unwrap_or(Expr::Other(pos));

    let mut type_arg = None;
    let mut args = Vec::new();

    if let Some(arg_list) = node.child_by_field_name("arguments") {
        let mut cursor = arg_list.walk();
        for arg in arg_list.named_children(&mut cursor) {
            if is_type_kind(arg.kind()) && type_arg.is_none() && args.is_empty() {
                type_arg = Some(lower_type(arg, source));
            } else {
                args.push(lower_expr(arg, source));
            }
        }
    }

    CallExpr {
        pos,
        callee: Box::new(callee),
        type_arg,
        args,
    }
}

fn is_type_kind(kind: &str) -> bool {
    matches!(
        kind,
        "slice_type"
            | "map_type"
            | "array_type"
            | "channel_type"
            | "pointer_type"
            | "qualified_type"
            | "struct_type"
            | "interface_type"
            | "function_type"
            | "generic_type"
    )
}

fn lower_type(node: Node, source: &[u8]) -> TypeRef {
    match node.kind() {
        "slice_type" => TypeRef::Slice,
        "map_type" => TypeRef::Map,
        "array_type" => TypeRef::Array,
        "channel_type" => TypeRef::Chan,
        "type_identifier" | "qualified_type" => TypeRef::Named(node_text(node, source).to_string()),
        "pointer_type" | "generic_type" => match node.named_child(0) {
            Some(inner) => lower_type(inner, source),
            None => TypeRef::Other,
        },
        _ => TypeRef::Other,
    }
}

/// Go integer literal syntax: optional base prefix, `_` separators.
fn parse_int_literal(text: &str) -> Option<i64> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else if lower.len() > 1 && lower.starts_with('0') {
        i64::from_str_radix(&lower[1..], 8).ok()
    } else {
        lower.parse().ok()
    }
}
