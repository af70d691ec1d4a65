// src/filters/lint/scripts.rs

//! Script rules, checked against the oxc AST so that strings and comments
//! never produce findings.

use oxc_allocator::Allocator;
use oxc_ast::ast::{CallExpression, Expression, VariableDeclarationKind};
use oxc_ast::{AstKind, Visit};
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};
use oxc_syntax::operator::BinaryOperator;

use crate::types::Severity;

#[derive(Debug, Clone)]
pub(super) struct ScriptRule {
    pub id: &'static str,
    pub severity: Severity,
}

pub(super) fn default_rules() -> Vec<ScriptRule> {
    [
        ("no-debugger", Severity::Error),
        ("no-console", Severity::Warn),
        ("no-var", Severity::Warn),
        ("eqeqeq", Severity::Warn),
    ]
    .into_iter()
    .map(|(id, severity)| ScriptRule { id, severity })
    .collect()
}

/// One rule violation at a byte offset into the source.
#[derive(Debug)]
pub(super) struct Hit {
    pub rule: &'static str,
    pub severity: Severity,
    pub offset: usize,
    pub message: String,
}

/// Parse `source` once; returns the first syntax error and every rule hit
/// in source order.
pub(super) fn check(source: &str, rules: &[ScriptRule]) -> (Option<String>, Vec<Hit>) {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::default()).parse();
    let syntax = ret.errors.first().map(|e| e.to_string());

    let mut visitor = RuleVisitor {
        rules,
        hits: Vec::new(),
    };
    visitor.visit_program(&ret.program);
    visitor.hits.sort_by_key(|h| h.offset);
    (syntax, visitor.hits)
}

struct RuleVisitor<'r> {
    rules: &'r [ScriptRule],
    hits: Vec<Hit>,
}

impl RuleVisitor<'_> {
    fn check_node(&mut self, kind: &AstKind<'_>) {
        let hit = match kind {
            AstKind::DebuggerStatement(stmt) => Some((
                "no-debugger",
                stmt.span,
                "Unexpected 'debugger' statement".to_string(),
            )),
            AstKind::CallExpression(call) => console_method(call).map(|method| {
                (
                    "no-console",
                    call.span,
                    format!("Unexpected console.{method} statement"),
                )
            }),
            AstKind::VariableDeclaration(decl) if decl.kind == VariableDeclarationKind::Var => {
                Some((
                    "no-var",
                    decl.span,
                    "Unexpected var, use let or const instead".to_string(),
                ))
            }
            AstKind::BinaryExpression(expr)
                if matches!(
                    expr.operator,
                    BinaryOperator::Equality | BinaryOperator::Inequality
                ) =>
            {
                Some((
                    "eqeqeq",
                    expr.span,
                    "Expected '===' and '!==' instead of '==' and '!='".to_string(),
                ))
            }
            _ => None,
        };

        let Some((id, span, message)) = hit else {
            return;
        };
        if let Some(rule) = self.rules.iter().find(|r| r.id == id) {
            self.hits.push(Hit {
                rule: rule.id,
                severity: rule.severity,
                offset: start(span),
                message,
            });
        }
    }
}

impl Visit<'_> for RuleVisitor<'_> {
    fn enter_node(&mut self, kind: AstKind<'_>) {
        self.check_node(&kind);
    }
}

/// `console.<method>(...)` calls; returns the method name.
fn console_method<'a>(call: &'a CallExpression<'a>) -> Option<&'a str> {
    if let Expression::StaticMemberExpression(member) = &call.callee {
        if let Expression::Identifier(id) = &member.object {
            if id.name == "console" {
                return Some(member.property.name.as_str());
            }
        }
    }
    None
}

fn start(span: Span) -> usize {
    span.start as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_ids(source: &str) -> Vec<&'static str> {
        let (_, hits) = check(source, &default_rules());
        hits.into_iter().map(|h| h.rule).collect()
    }

    #[test]
    fn words_in_strings_and_comments_are_not_code() {
        let src = "const msg = \"press F12 to open the debugger\";\n\
                   foo(); // remove debugger before release\n\
                   /* console.log(x); var y = a == b; */\n\
                   const t = `var z == console.log()`;\n";
        assert!(rule_ids(src).is_empty());
    }

    #[test]
    fn member_named_var_is_not_a_declaration() {
        assert!(rule_ids("obj.var = 1;\nlet v = obj.var;\n").is_empty());
    }

    #[test]
    fn hits_come_back_in_source_order() {
        let src = "if (a != b) { console.warn(a); }\nvar c;\ndebugger;\n";
        assert_eq!(
            rule_ids(src),
            vec!["eqeqeq", "no-console", "no-var", "no-debugger"]
        );
    }

    #[test]
    fn syntax_errors_are_reported_alongside_hits() {
        let (syntax, _) = check("let = ;", &default_rules());
        assert!(syntax.is_some());
    }
}
