// BlueJay AST Definitions
// Closed syntax tree node types with source spans

use std::fmt;

/// Source position information for AST nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub start_line_col: Option<(usize, usize)>,
    pub end_line_col: Option<(usize, usize)>,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            start_line_col: None,
            end_line_col: None,
        }
    }

    pub fn with_line_col(
        start: usize,
        end: usize,
        start_line_col: (usize, usize),
        end_line_col: (usize, usize),
    ) -> Self {
        Self {
            start,
            end,
            start_line_col: Some(start_line_col),
            end_line_col: Some(end_line_col),
        }
    }

    /// Number of bytes covered by this span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Root node: the statements of a whole source file
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub source_file: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Assignment(Assignment),
    Print(PrintStatement),
    Block(Block),
    If(IfStatement),
    While(WhileStatement),
    For(ForStatement),
    Expression(Expression),
}

/// `name = expression`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: Identifier,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintMode {
    /// `print_value(...)`, no line terminator
    Value,
    /// `print_line(...)`
    Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintStatement {
    pub mode: PrintMode,
    pub expression: Expression,
    pub span: Span,
}

/// Braced statement list; opens a new scope depth when executed
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// One `if` / `elif` arm
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBranch {
    pub condition: Expression,
    pub body: Block,
    pub span: Span,
}

/// `if` chain. The first branch is the `if` itself, the rest are `elif` arms.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub branches: Vec<ConditionalBranch>,
    pub else_block: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Block,
    pub span: Span,
}

/// `for (init; condition; update) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub initializer: Option<Assignment>,
    pub condition: Expression,
    pub update: Expression,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Integer(i64),
    Float(f64),
    /// Raw string token, surrounding quotes and doubled inner quotes included
    String(String),
    Boolean(bool),
    Nil,
    Identifier(Identifier),
    Parenthesized(Box<Expression>),
    UnaryOp(UnaryOperation),
    BinaryOp(BinaryOperation),
    Increment(IncrementOperation),
    CompoundAssignment(CompoundAssignment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperation {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Negate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperation {
    pub left: Box<Expression>,
    pub operator: BinaryOperator,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Logical
    Or,
    And,
    // Equality
    Equal,
    NotEqual,
    // Relational
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOperator {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
                | BinaryOperator::Modulo
        )
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Less
                | BinaryOperator::LessEqual
                | BinaryOperator::Greater
                | BinaryOperator::GreaterEqual
        )
    }
}

/// `++x`, `x++`, `--x`, `x--`
#[derive(Debug, Clone, PartialEq)]
pub struct IncrementOperation {
    pub target: Identifier,
    pub kind: IncrementKind,
    pub fixity: Fixity,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementKind {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    Prefix,
    Postfix,
}

/// `x += expr` and friends
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundAssignment {
    pub target: Identifier,
    pub operator: CompoundOperator,
    pub value: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOperator {
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    ModuloAssign,
}

impl CompoundOperator {
    /// The arithmetic operator applied between the current value and the right-hand side
    pub fn binary_operator(&self) -> BinaryOperator {
        match self {
            CompoundOperator::AddAssign => BinaryOperator::Add,
            CompoundOperator::SubtractAssign => BinaryOperator::Subtract,
            CompoundOperator::MultiplyAssign => BinaryOperator::Multiply,
            CompoundOperator::DivideAssign => BinaryOperator::Divide,
            CompoundOperator::ModuloAssign => BinaryOperator::Modulo,
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Not => write!(f, "not"),
            UnaryOperator::Negate => write!(f, "-"),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOperator::Or => "or",
            BinaryOperator::And => "and",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
        };
        write!(f, "{}", symbol)
    }
}

impl fmt::Display for CompoundOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.binary_operator())
    }
}

impl fmt::Display for IncrementOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self.kind {
            IncrementKind::Increment => "++",
            IncrementKind::Decrement => "--",
        };
        match self.fixity {
            Fixity::Prefix => write!(f, "{}{}", symbol, self.target.name),
            Fixity::Postfix => write!(f, "{}{}", self.target.name, symbol),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
