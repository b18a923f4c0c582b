//! REPL (Read-Eval-Print Loop) for the BlueJay interpreter
//!
//! [`ReplSession`] owns one persistent [`Interpreter`], so bindings made by
//! one input are visible to the next. [`Repl`] wraps a session with a
//! rustyline editor and the terminal-facing loop:
//! - multi-line input until braces and parentheses balance
//! - REPL commands for inspecting and resetting the session
//! - miette reports for failing inputs, after which the session carries on

use bluejay_interpreter::{Interpreter, Output, RuntimeError, Value};
use bluejay_parser::{ParseError, StatementKind, parse_program_with_source};
use miette::{Diagnostic, NamedSource, Report};
use rustyline::{DefaultEditor, error::ReadlineError};
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur in the REPL
#[derive(Debug, Error, Diagnostic)]
pub enum ReplError {
    #[error("Parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("Runtime error: {source}")]
    Runtime {
        #[from]
        source: RuntimeError,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("Readline error: {source}")]
    Readline {
        #[from]
        source: ReadlineError,
    },

    #[error("REPL command error: {message}")]
    #[diagnostic(code(bluejay::repl::command), help("Type /help for available commands"))]
    Command { message: String },
}

/// REPL configuration options
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// Prompt string for input
    pub prompt: String,

    /// Echo the value of assignments and expression statements
    pub show_results: bool,

    /// Show detailed error information
    pub verbose_errors: bool,

    /// Enable history persistence
    pub persist_history: bool,

    /// History file path
    pub history_file: Option<PathBuf>,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "bluejay> ".to_string(),
            show_results: true,
            verbose_errors: false,
            persist_history: true,
            history_file: Some(PathBuf::from(".bluejay_history")),
        }
    }
}

/// REPL session statistics
#[derive(Debug, Clone, Default)]
pub struct ReplStats {
    /// Number of inputs evaluated
    pub inputs_evaluated: usize,

    /// Number of errors encountered
    pub errors_encountered: usize,

    /// Total REPL commands executed
    pub commands_executed: usize,
}

/// Result of evaluating one input
#[derive(Debug, PartialEq)]
pub enum ReplResult {
    /// The input ended with an expression statement
    Value { value: Value },

    /// The input ended with an assignment
    Assigned { name: String, value: Value },

    /// Executed a REPL command
    Command { message: String },

    /// Nothing to echo: empty input, a comment, or a statement without a value
    Empty,

    /// Exit request
    Exit,
}

/// Interpreter state that persists across REPL inputs
pub struct ReplSession<O: Output> {
    interpreter: Interpreter<O>,
    config: ReplConfig,
    stats: ReplStats,
}

impl<O: Output> ReplSession<O> {
    pub fn new(output: O, config: ReplConfig) -> Self {
        Self {
            interpreter: Interpreter::new(output),
            config,
            stats: ReplStats::default(),
        }
    }

    pub fn config(&self) -> &ReplConfig {
        &self.config
    }

    pub fn stats(&self) -> &ReplStats {
        &self.stats
    }

    pub fn interpreter(&self) -> &Interpreter<O> {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter<O> {
        &mut self.interpreter
    }

    /// Evaluate one (possibly multi-line) input
    pub fn evaluate_line(&mut self, line: &str) -> Result<ReplResult, ReplError> {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(ReplResult::Empty);
        }

        if trimmed.starts_with('/') {
            return self.execute_command(trimmed);
        }

        self.stats.inputs_evaluated += 1;
        let program = parse_program_with_source(line, Some("<repl>".to_string()))?;

        let mut result = ReplResult::Empty;
        for statement in &program.statements {
            let value = self.interpreter.execute(statement)?;
            result = match (&statement.kind, value) {
                (StatementKind::Assignment(assignment), Some(value)) => ReplResult::Assigned {
                    name: assignment.target.name.clone(),
                    value,
                },
                (StatementKind::Expression(_), Some(value)) => ReplResult::Value { value },
                _ => ReplResult::Empty,
            };
        }

        Ok(result)
    }

    /// Record a failed input
    pub fn record_error(&mut self) {
        self.stats.errors_encountered += 1;
    }

    fn execute_command(&mut self, command: &str) -> Result<ReplResult, ReplError> {
        self.stats.commands_executed += 1;

        let parts: Vec<&str> = command.split_whitespace().collect();
        let Some(&name) = parts.first() else {
            return Ok(ReplResult::Empty);
        };

        match name {
            "/help" | "/h" => Ok(ReplResult::Command {
                message: help_message(),
            }),

            "/vars" | "/variables" => Ok(ReplResult::Command {
                message: self.format_variables(),
            }),

            "/clear" => {
                self.interpreter.environment_mut().reset();
                Ok(ReplResult::Command {
                    message: "Variables cleared".to_string(),
                })
            }

            "/stats" => Ok(ReplResult::Command {
                message: self.format_stats(),
            }),

            "/config" => Ok(ReplResult::Command {
                message: self.format_config(),
            }),

            "/quit" | "/q" | "/exit" => Ok(ReplResult::Exit),

            unknown => Err(ReplError::Command {
                message: format!("Unknown command: {unknown}"),
            }),
        }
    }

    /// Text echoed for a result, if any
    pub fn render_result(&self, result: &ReplResult) -> Option<String> {
        match result {
            ReplResult::Value { value } if self.config.show_results => Some(value.to_string()),
            ReplResult::Assigned { name, value } if self.config.show_results => {
                Some(format!("{name} = {value}"))
            }
            ReplResult::Command { message } => Some(message.clone()),
            _ => None,
        }
    }

    fn format_variables(&self) -> String {
        let bindings = self.interpreter.environment().bindings();
        if bindings.is_empty() {
            return "No variables defined".to_string();
        }

        let mut lines = vec!["Variables:".to_string()];
        for (name, value) in bindings {
            lines.push(format!("  {name}: {} = {value}", value.kind()));
        }
        lines.join("\n")
    }

    fn format_stats(&self) -> String {
        format!(
            r#"Session Statistics:
  Inputs evaluated: {}
  Statements executed: {}
  Errors encountered: {}
  Commands executed: {}"#,
            self.stats.inputs_evaluated,
            self.interpreter.statements_executed(),
            self.stats.errors_encountered,
            self.stats.commands_executed
        )
    }

    fn format_config(&self) -> String {
        format!(
            r#"REPL Configuration:
  Prompt: "{}"
  Show results: {}
  Verbose errors: {}
  Persist history: {}
  History file: {}"#,
            self.config.prompt,
            self.config.show_results,
            self.config.verbose_errors,
            self.config.persist_history,
            self.config
                .history_file
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "<none>".to_string())
        )
    }
}

/// Writer that remembers whether the last byte it wrote ended a line
pub struct LineTrackingSink<W: Write> {
    inner: W,
    mid_line: bool,
}

impl<W: Write> LineTrackingSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            mid_line: false,
        }
    }

    /// Terminate a partial line, then flush
    pub fn end_line(&mut self) -> io::Result<()> {
        if self.mid_line {
            self.write_all(b"\n")?;
        }
        self.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }
}

impl<W: Write> Write for LineTrackingSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        if let Some(last) = buf[..written].last() {
            self.mid_line = *last != b'\n';
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Interactive terminal front end over a [`ReplSession`] printing to stdout
pub struct Repl {
    editor: DefaultEditor,
    session: ReplSession<LineTrackingSink<Stdout>>,
}

impl Repl {
    pub fn new(config: ReplConfig) -> Result<Self, ReplError> {
        let mut editor = DefaultEditor::new()?;

        if config.persist_history {
            if let Some(history_file) = &config.history_file {
                // A missing history file just means a first session
                if let Err(error) = editor.load_history(history_file) {
                    debug!(%error, "no history loaded");
                }
            }
        }

        Ok(Self {
            editor,
            session: ReplSession::new(LineTrackingSink::new(io::stdout()), config),
        })
    }

    /// Start the REPL main loop
    pub fn run(&mut self) -> Result<(), ReplError> {
        print_welcome();

        while let Some(input) = self.read_input()? {
            let outcome = self.session.evaluate_line(&input);

            // print_value output has no trailing newline; end the line before echoing
            let printed = self.session.interpreter_mut().output_mut().end_line();
            if let Err(error) = printed {
                warn!(%error, "failed to flush program output");
            }

            match outcome {
                Ok(ReplResult::Exit) => break,
                Ok(result) => {
                    if let Some(text) = self.session.render_result(&result) {
                        println!("{text}");
                    }
                }
                Err(error) => {
                    self.session.record_error();
                    self.display_error(error, &input);
                }
            }
        }

        println!("Goodbye!");
        self.save_history()
    }

    /// Read one input, continuing on `... ` lines while it is incomplete
    fn read_input(&mut self) -> Result<Option<String>, ReplError> {
        let mut complete_input = String::new();
        let mut line_count = 0;

        loop {
            let prompt = if line_count == 0 {
                self.session.config().prompt.clone()
            } else {
                "... ".to_string()
            };

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    line_count += 1;

                    if line_count == 1 && line.trim().is_empty() {
                        return Ok(Some(String::new()));
                    }

                    if !complete_input.is_empty() {
                        complete_input.push('\n');
                    }
                    complete_input.push_str(&line);

                    if is_input_complete(&complete_input) {
                        self.editor.add_history_entry(complete_input.as_str())?;
                        return Ok(Some(complete_input));
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Abandon the current input and start over
                    println!("^C");
                    return Ok(Some(String::new()));
                }
                Err(ReadlineError::Eof) => return Ok(None),
                Err(source) => return Err(ReplError::Readline { source }),
            }
        }
    }

    fn display_error(&self, error: ReplError, source_code: &str) {
        match error {
            ReplError::Parse { source } => {
                // ParseError carries its own source text
                eprintln!("{:?}", Report::new(source));
            }
            ReplError::Runtime { source } => {
                let named_source = NamedSource::new("<repl>", source_code.to_string());
                eprintln!("{:?}", Report::new(source).with_source_code(named_source));
            }
            ReplError::Command { .. } => {
                eprintln!("{:?}", Report::new(error));
            }
            error => {
                if self.session.config().verbose_errors {
                    eprintln!("Error: {error:?}");
                } else {
                    eprintln!("Error: {error}");
                }
            }
        }
    }

    fn save_history(&mut self) -> Result<(), ReplError> {
        let config = self.session.config();
        if config.persist_history {
            if let Some(history_file) = &config.history_file {
                self.editor.save_history(history_file)?;
            }
        }
        Ok(())
    }
}

/// Whether braces and parentheses balance outside string literals and comments
pub fn is_input_complete(input: &str) -> bool {
    let mut brace_count = 0i32;
    let mut paren_count = 0i32;
    let mut in_string = false;
    let mut in_comment = false;

    for ch in input.chars() {
        if in_comment {
            in_comment = ch != '\n';
            continue;
        }

        match ch {
            // Doubled quotes inside a string toggle twice, which is a no-op
            '"' => in_string = !in_string,
            '#' if !in_string => in_comment = true,
            '{' if !in_string => brace_count += 1,
            '}' if !in_string => brace_count -= 1,
            '(' if !in_string => paren_count += 1,
            ')' if !in_string => paren_count -= 1,
            _ => {}
        }
    }

    brace_count <= 0 && paren_count <= 0 && !in_string
}

fn print_welcome() {
    println!("BlueJay REPL v{}", env!("CARGO_PKG_VERSION"));
    println!("Type /help for commands, /quit to exit");
    println!();
}

fn help_message() -> String {
    r#"BlueJay REPL Commands:
  /help, /h           Show this help message
  /vars, /variables   List all variables with their values and kinds
  /clear              Drop every variable
  /stats              Show session statistics
  /config             Show current configuration
  /quit, /q, /exit    Exit the REPL

Examples:
  x = 42              # Bind a variable
  x * 2 + 1           # Evaluate an expression
  print_line("hi")    # Print a line

Multi-line input:
  while x > 0 {       # Type { and press Enter
      x--             # Continuation prompt (...)
  }                   # Completes when braces close

Use Ctrl+C to interrupt, Ctrl+D to exit."#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_session() -> ReplSession<Vec<u8>> {
        let config = ReplConfig {
            persist_history: false,
            history_file: None,
            ..Default::default()
        };
        ReplSession::new(Vec::new(), config)
    }

    fn command_message(result: ReplResult) -> String {
        match result {
            ReplResult::Command { message } => message,
            other => panic!("Expected command result, got {other:?}"),
        }
    }

    #[test]
    fn test_session_creation() {
        let session = create_test_session();
        assert_eq!(session.stats().inputs_evaluated, 0);
        assert_eq!(session.stats().errors_encountered, 0);
        assert!(session.interpreter().environment().is_empty());
    }

    #[test]
    fn test_expression_evaluation() {
        let mut session = create_test_session();

        let result = session.evaluate_line("6 * 7").unwrap();
        assert_eq!(
            result,
            ReplResult::Value {
                value: Value::Integer(42)
            }
        );
        assert_eq!(session.stats().inputs_evaluated, 1);
    }

    #[test]
    fn test_bindings_persist_between_inputs() {
        let mut session = create_test_session();

        let result = session.evaluate_line("x = 40").unwrap();
        assert_eq!(
            result,
            ReplResult::Assigned {
                name: "x".to_string(),
                value: Value::Integer(40)
            }
        );

        let result = session.evaluate_line("x + 2").unwrap();
        assert_eq!(session.render_result(&result), Some("42".to_string()));
    }

    #[test]
    fn test_statements_without_values_echo_nothing() {
        let mut session = create_test_session();

        let result = session.evaluate_line("{ y = 1 }").unwrap();
        assert_eq!(result, ReplResult::Empty);

        let result = session.evaluate_line("print_value(3)").unwrap();
        assert_eq!(result, ReplResult::Empty);
        assert_eq!(session.interpreter().output().as_slice(), b"3");
    }

    #[test]
    fn test_partial_print_line_is_ended_before_echo() {
        let config = ReplConfig {
            persist_history: false,
            history_file: None,
            ..Default::default()
        };
        let mut session = ReplSession::new(LineTrackingSink::new(Vec::<u8>::new()), config);

        let result = session.evaluate_line("print_value(1); 2").unwrap();
        session.interpreter_mut().output_mut().end_line().unwrap();
        assert_eq!(session.render_result(&result), Some("2".to_string()));
        assert_eq!(session.interpreter().output().get_ref().as_slice(), b"1\n");

        session.evaluate_line("print_line(3)").unwrap();
        session.interpreter_mut().output_mut().end_line().unwrap();
        assert_eq!(
            session.interpreter().output().get_ref().as_slice(),
            b"1\n3\n"
        );
    }

    #[test]
    fn test_empty_line_handling() {
        let mut session = create_test_session();

        assert_eq!(session.evaluate_line("").unwrap(), ReplResult::Empty);
        assert_eq!(session.evaluate_line("   ").unwrap(), ReplResult::Empty);
        assert_eq!(
            session.evaluate_line("# comment").unwrap(),
            ReplResult::Empty
        );
    }

    #[test]
    fn test_failed_input_leaves_session_usable() {
        let mut session = create_test_session();
        session.evaluate_line("total = 1").unwrap();

        let result = session.evaluate_line("{ inner = 2 { total = total / 0 } }");
        assert!(matches!(result, Err(ReplError::Runtime { .. })));
        assert_eq!(session.interpreter().environment().depth(), 0);
        assert!(!session.interpreter().environment().is_bound("inner"));

        let result = session.evaluate_line("total").unwrap();
        assert_eq!(
            result,
            ReplResult::Value {
                value: Value::Integer(1)
            }
        );
    }

    #[test]
    fn test_parse_failure_is_reported() {
        let mut session = create_test_session();
        let result = session.evaluate_line("x = ");
        assert!(matches!(result, Err(ReplError::Parse { .. })));
    }

    #[test]
    fn test_show_results_off_suppresses_echo() {
        let mut session = ReplSession::new(
            Vec::<u8>::new(),
            ReplConfig {
                show_results: false,
                persist_history: false,
                history_file: None,
                ..Default::default()
            },
        );

        let result = session.evaluate_line("x = 1").unwrap();
        assert_eq!(session.render_result(&result), None);

        let result = session.evaluate_line("/help").unwrap();
        assert!(session.render_result(&result).is_some());
    }

    #[test]
    fn test_help_command() {
        let mut session = create_test_session();

        let message = command_message(session.evaluate_line("/help").unwrap());
        assert!(message.contains("BlueJay REPL Commands"));
        assert!(message.contains("/help"));
        assert!(message.contains("/vars"));
        assert!(message.contains("/quit"));

        assert_eq!(session.stats().commands_executed, 1);
    }

    #[test]
    fn test_vars_command() {
        let mut session = create_test_session();

        let message = command_message(session.evaluate_line("/vars").unwrap());
        assert!(message.contains("No variables defined"));

        session.evaluate_line("b = \"two\"; a = 1.5").unwrap();
        let message = command_message(session.evaluate_line("/vars").unwrap());
        assert_eq!(
            message,
            "Variables:\n  a: Floating = 1.5\n  b: Text = two"
        );
    }

    #[test]
    fn test_clear_command() {
        let mut session = create_test_session();
        session.evaluate_line("x = 42").unwrap();

        let message = command_message(session.evaluate_line("/clear").unwrap());
        assert!(message.contains("Variables cleared"));
        assert!(!session.interpreter().environment().is_bound("x"));
    }

    #[test]
    fn test_quit_command() {
        let mut session = create_test_session();

        assert_eq!(session.evaluate_line("/quit").unwrap(), ReplResult::Exit);
        assert_eq!(session.evaluate_line("/q").unwrap(), ReplResult::Exit);
        assert_eq!(session.evaluate_line("/exit").unwrap(), ReplResult::Exit);
    }

    #[test]
    fn test_unknown_command() {
        let mut session = create_test_session();

        match session.evaluate_line("/unknown") {
            Err(ReplError::Command { message }) => {
                assert!(message.contains("Unknown command"));
                assert!(message.contains("/unknown"));
            }
            other => panic!("Expected command error, got {other:?}"),
        }
    }

    #[test]
    fn test_stats_command() {
        let mut session = create_test_session();

        session.evaluate_line("42").unwrap();
        session.evaluate_line("/help").unwrap();
        if session.evaluate_line("missing").is_err() {
            session.record_error();
        }

        let message = command_message(session.evaluate_line("/stats").unwrap());
        assert!(message.contains("Session Statistics"));
        assert!(message.contains("Inputs evaluated: 2"));
        assert!(message.contains("Errors encountered: 1"));
        assert!(message.contains("Commands executed: 2"));
    }

    #[test]
    fn test_config_command() {
        let mut session = create_test_session();

        let message = command_message(session.evaluate_line("/config").unwrap());
        assert!(message.contains("REPL Configuration"));
        assert!(message.contains("bluejay>"));
        assert!(message.contains("History file: <none>"));
    }

    #[test]
    fn test_multi_line_input_detection() {
        assert!(is_input_complete("42"));
        assert!(is_input_complete("x = (1 + 2) * 3"));
        assert!(is_input_complete("while x > 0 { x-- }"));
        assert!(is_input_complete("\"hello world\""));

        assert!(!is_input_complete("while x > 0 {"));
        assert!(!is_input_complete("print_line(1 +"));
        assert!(!is_input_complete("\"hello"));
        assert!(!is_input_complete("if a {\n  if b {\n  }"));

        assert!(is_input_complete("\"braces { inside\""));
        assert!(is_input_complete("\"say \"\"hi\"\" {\""));
        assert!(is_input_complete("x = 1 # { not counted"));
        assert!(!is_input_complete("{ # }\n"));
    }

    #[test]
    fn test_repl_config_defaults() {
        let config = ReplConfig::default();
        assert_eq!(config.prompt, "bluejay> ");
        assert!(config.show_results);
        assert!(!config.verbose_errors);
        assert!(config.persist_history);
        assert_eq!(config.history_file, Some(PathBuf::from(".bluejay_history")));
    }
}
