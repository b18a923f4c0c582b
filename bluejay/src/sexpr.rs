// S-expression formatter for the BlueJay syntax tree
// Statements go one per line, expressions stay on a single line

use bluejay_parser::*;

pub fn format_program_as_sexpr(program: &Program) -> String {
    let statements = program
        .statements
        .iter()
        .map(|statement| format_statement_with_indent(statement, 2))
        .collect();
    format_body("program", statements, 0)
}

/// `(head child...)` on one line when every child fits on one, otherwise one
/// child per line indented under the head
fn format_list(head: &str, children: Vec<String>, indent: usize) -> String {
    if children.is_empty() {
        return format!("({head})");
    }
    if children.iter().all(|child| !child.contains('\n')) {
        return format!("({head} {})", children.join(" "));
    }
    format_vertical(head, &children, indent)
}

/// Statement lists break onto separate lines as soon as there are two
fn format_body(head: &str, statements: Vec<String>, indent: usize) -> String {
    match statements.as_slice() {
        [] => format!("({head})"),
        [only] if !only.contains('\n') => format!("({head} {only})"),
        _ => format_vertical(head, &statements, indent),
    }
}

fn format_vertical(head: &str, children: &[String], indent: usize) -> String {
    let padding = " ".repeat(indent + 2);
    let body: Vec<String> = children
        .iter()
        .map(|child| format!("{padding}{child}"))
        .collect();
    format!("({head}\n{})", body.join("\n"))
}

fn format_statement_with_indent(statement: &Statement, indent: usize) -> String {
    match &statement.kind {
        StatementKind::Assignment(assignment) => format_assignment(assignment),
        StatementKind::Print(print) => {
            let head = match print.mode {
                PrintMode::Value => "print_value",
                PrintMode::Line => "print_line",
            };
            format!("({head} {})", format_expression(&print.expression))
        }
        StatementKind::Block(block) => format_block_with_indent(block, indent),
        StatementKind::If(if_statement) => format_if_with_indent(if_statement, indent),
        StatementKind::While(while_statement) => format_list(
            "while",
            vec![
                format_expression(&while_statement.condition),
                format_block_with_indent(&while_statement.body, indent + 2),
            ],
            indent,
        ),
        StatementKind::For(for_statement) => {
            let initializer = match &for_statement.initializer {
                Some(assignment) => format_assignment(assignment),
                None => "(no-init)".to_string(),
            };
            format_list(
                "for",
                vec![
                    initializer,
                    format_expression(&for_statement.condition),
                    format_expression(&for_statement.update),
                    format_block_with_indent(&for_statement.body, indent + 2),
                ],
                indent,
            )
        }
        StatementKind::Expression(expression) => format_expression(expression),
    }
}

fn format_block_with_indent(block: &Block, indent: usize) -> String {
    let statements = block
        .statements
        .iter()
        .map(|statement| format_statement_with_indent(statement, indent + 2))
        .collect();
    format_body("block", statements, indent)
}

fn format_if_with_indent(if_statement: &IfStatement, indent: usize) -> String {
    let mut arms: Vec<String> = if_statement
        .branches
        .iter()
        .map(|branch| {
            format_list(
                "when",
                vec![
                    format_expression(&branch.condition),
                    format_block_with_indent(&branch.body, indent + 4),
                ],
                indent + 2,
            )
        })
        .collect();

    if let Some(else_block) = &if_statement.else_block {
        arms.push(format_list(
            "else",
            vec![format_block_with_indent(else_block, indent + 4)],
            indent + 2,
        ));
    }

    format_list("if", arms, indent)
}

fn format_assignment(assignment: &Assignment) -> String {
    format!(
        "(assign {} {})",
        assignment.target.name,
        format_expression(&assignment.value)
    )
}

fn format_expression(expr: &Expression) -> String {
    match &expr.kind {
        ExpressionKind::Integer(value) => format!("(integer {value})"),
        ExpressionKind::Float(value) => format!("(float {value:?})"),
        ExpressionKind::String(raw) => format!("(string {raw})"),
        ExpressionKind::Boolean(value) => format!("(boolean {value})"),
        ExpressionKind::Nil => "nil".to_string(),
        ExpressionKind::Identifier(identifier) => identifier.name.clone(),
        ExpressionKind::Parenthesized(inner) => format!("(group {})", format_expression(inner)),
        ExpressionKind::UnaryOp(unary) => {
            format!("({} {})", unary.operator, format_expression(&unary.operand))
        }
        ExpressionKind::BinaryOp(binary) => format!(
            "({} {} {})",
            binary.operator,
            format_expression(&binary.left),
            format_expression(&binary.right)
        ),
        ExpressionKind::Increment(increment) => {
            let symbol = match increment.kind {
                IncrementKind::Increment => "++",
                IncrementKind::Decrement => "--",
            };
            let fixity = match increment.fixity {
                Fixity::Prefix => "pre",
                Fixity::Postfix => "post",
            };
            format!("({fixity}{symbol} {})", increment.target.name)
        }
        ExpressionKind::CompoundAssignment(compound) => format!(
            "({} {} {})",
            compound.operator,
            compound.target.name,
            format_expression(&compound.value)
        ),
    }
}
