//! Statement and control-flow executor for BlueJay programs.

use crate::environment::Environment;
use crate::error::{Result, RuntimeError};
use crate::evaluator::ExpressionEvaluator;
use crate::output::Output;
use crate::value::Value;
use bluejay_parser::{
    Assignment, Block, Expression, ForStatement, IfStatement, PrintMode, PrintStatement, Program,
    Statement, StatementKind, WhileStatement,
};
use tracing::trace;

/// The main interpreter for executing BlueJay programs
///
/// Owns the environment and the output sink, so independent runs never share
/// state.
#[derive(Debug)]
pub struct Interpreter<O: Output> {
    /// Variable bindings and block declaration sets
    environment: Environment,
    evaluator: ExpressionEvaluator,
    output: O,
    /// Statements executed since creation (REPL /stats)
    statements_executed: u64,
}

impl<O: Output> Interpreter<O> {
    /// Create an interpreter writing printed text to `output`
    pub fn new(output: O) -> Self {
        Self {
            environment: Environment::new(),
            evaluator: ExpressionEvaluator::new(),
            output,
            statements_executed: 0,
        }
    }

    /// Execute every top-level statement in order, stopping at the first failure
    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    pub fn run(&mut self, program: &Program) -> Result<()> {
        for statement in &program.statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    /// Execute one statement
    ///
    /// Assignments, prints and expression statements produce the value they
    /// computed; blocks, conditionals and loops produce nothing.
    pub fn execute(&mut self, statement: &Statement) -> Result<Option<Value>> {
        self.statements_executed += 1;
        trace!(depth = self.environment.depth(), span = ?statement.span, "executing statement");

        match &statement.kind {
            StatementKind::Assignment(assignment) => self.execute_assignment(assignment).map(Some),
            StatementKind::Print(print) => self.execute_print(print).map(Some),
            StatementKind::Expression(expression) => self.evaluate(expression).map(Some),
            StatementKind::Block(block) => self.execute_block(block).map(|_| None),
            StatementKind::If(if_statement) => self.execute_if(if_statement).map(|_| None),
            StatementKind::While(while_statement) => {
                self.execute_while(while_statement).map(|_| None)
            }
            StatementKind::For(for_statement) => self.execute_for(for_statement).map(|_| None),
        }
    }

    /// Evaluate an expression against the current environment
    pub fn evaluate(&mut self, expression: &Expression) -> Result<Value> {
        self.evaluator.evaluate(expression, &mut self.environment)
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Consume the interpreter, handing back its output sink
    pub fn into_output(self) -> O {
        self.output
    }

    pub fn statements_executed(&self) -> u64 {
        self.statements_executed
    }

    fn execute_assignment(&mut self, assignment: &Assignment) -> Result<Value> {
        let value = self.evaluate(&assignment.value)?;
        self.environment
            .declare_or_assign(&assignment.target.name, value.clone());
        Ok(value)
    }

    fn execute_print(&mut self, print: &PrintStatement) -> Result<Value> {
        let value = self.evaluate(&print.expression)?;
        let text = value.to_string();

        match print.mode {
            PrintMode::Value => self.output.write_text(&text)?,
            PrintMode::Line => self.output.write_line(&text)?,
        }

        Ok(value)
    }

    /// Run a block's statements inside a fresh scope
    fn execute_block(&mut self, block: &Block) -> Result<()> {
        let mut scope = self.scoped();
        for statement in &block.statements {
            scope.execute(statement)?;
        }
        Ok(())
    }

    /// First true condition wins; later conditions are never evaluated
    fn execute_if(&mut self, if_statement: &IfStatement) -> Result<()> {
        for branch in &if_statement.branches {
            if self.evaluate_condition(&branch.condition)? {
                return self.execute_block(&branch.body);
            }
        }

        match &if_statement.else_block {
            Some(else_block) => self.execute_block(else_block),
            None => Ok(()),
        }
    }

    fn execute_while(&mut self, while_statement: &WhileStatement) -> Result<()> {
        while self.evaluate_condition(&while_statement.condition)? {
            self.execute_block(&while_statement.body)?;
        }
        Ok(())
    }

    /// The initializer only runs when its target is unbound; the update runs
    /// after each body block has closed
    fn execute_for(&mut self, for_statement: &ForStatement) -> Result<()> {
        if let Some(initializer) = &for_statement.initializer {
            if self.environment.is_bound(&initializer.target.name) {
                trace!(
                    name = %initializer.target.name,
                    "loop variable already bound, skipping initializer"
                );
            } else {
                self.execute_assignment(initializer)?;
            }
        }

        while self.evaluate_condition(&for_statement.condition)? {
            self.execute_block(&for_statement.body)?;
            self.evaluate(&for_statement.update)?;
        }
        Ok(())
    }

    fn evaluate_condition(&mut self, condition: &Expression) -> Result<bool> {
        let value = self.evaluate(condition)?;
        value.as_boolean().map_err(|_| {
            RuntimeError::invalid_operand_type_with_span(
                "condition",
                vec![value.kind().to_string()],
                condition.span,
            )
        })
    }
}
