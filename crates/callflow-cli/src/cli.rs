//! Command-line interface for the callflow utility
//!
//! Provides a CLI to turn recorded call traces into sequence and C4 diagrams.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, info};

use callflow::core::logging::{init_logging, LOG_FORMAT_ENV, LOG_LEVEL_ENV};
use callflow::plugins::c4::C4Style;
use callflow::plugins::native::InputFormat;
use callflow::plugins::Orchestrator;
use callflow::{Container, RenderConfig, Trace};

/// Callflow - Turn call traces into sequence diagrams
#[derive(Parser)]
#[command(name = "callflow")]
#[command(about = "Render distributed-trace call records as Mermaid, PlantUML or C4 diagrams")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a trace as a diagram
    Render {
        /// Input trace file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the diagram (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Diagram format
        #[arg(short, long, value_enum, default_value_t = OutputChoice::Mermaid)]
        format: OutputChoice,

        /// Diagram name (PlantUML)
        #[arg(long, default_value = "App")]
        name: String,

        /// Input trace format
        #[arg(long, value_enum, default_value_t = InputChoice::Auto)]
        input_format: InputChoice,

        /// Maximum call label width, 0 for no limit
        #[arg(long, default_value_t = 60)]
        max_label_len: usize,

        /// Maximum return comment width, 0 for no limit
        #[arg(long, default_value_t = 30)]
        max_comment_len: usize,

        /// Omit the Mermaid init directive
        #[arg(long)]
        no_init: bool,

        /// JSON file with C4 colours and layouts
        #[arg(long)]
        c4_style: Option<PathBuf>,
    },

    /// Print the synthesized message list as JSON
    Messages {
        /// Input trace file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Input trace format
        #[arg(long, value_enum, default_value_t = InputChoice::Auto)]
        input_format: InputChoice,
    },

    /// Print participant categories and their actors as JSON
    Participants {
        /// Input trace file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Input trace format
        #[arg(long, value_enum, default_value_t = InputChoice::Auto)]
        input_format: InputChoice,
    },

    /// Check that a trace can be ingested
    Validate {
        /// Input trace file to validate (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Input trace format
        #[arg(long, value_enum, default_value_t = InputChoice::Auto)]
        input_format: InputChoice,
    },
}

/// Supported diagram formats
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputChoice {
    Mermaid,
    Markdown,
    Plantuml,
    C4,
}

impl OutputChoice {
    /// Name of the renderer registered for this format
    pub fn renderer(&self) -> &'static str {
        match self {
            OutputChoice::Mermaid => "mermaid",
            OutputChoice::Markdown => "markdown",
            OutputChoice::Plantuml => "plantuml",
            OutputChoice::C4 => "c4",
        }
    }
}

/// Supported trace formats
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum InputChoice {
    /// Detect from the content
    #[default]
    Auto,
    /// OpenTelemetry OTLP/JSON
    Otlp,
    /// Native call records (JSON array or JSON lines)
    Calls,
}

impl From<InputChoice> for InputFormat {
    fn from(value: InputChoice) -> Self {
        match value {
            InputChoice::Auto => InputFormat::Auto,
            InputChoice::Otlp => InputFormat::Otlp,
            InputChoice::Calls => InputFormat::Calls,
        }
    }
}

/// Options of the render command
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub format: OutputChoice,
    pub name: String,
    pub input_format: InputChoice,
    pub config: RenderConfig,
    pub c4_style: Option<PathBuf>,
}

#[derive(Serialize)]
struct CategoryEntry<'a> {
    category: &'a str,
    actors: &'a [Container],
}

/// Main CLI application
#[derive(Default)]
pub struct CallflowApp;

impl CallflowApp {
    /// Create a new application instance
    pub fn new() -> Self {
        Self
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Callflow v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Render {
                input,
                output,
                format,
                name,
                input_format,
                max_label_len,
                max_comment_len,
                no_init,
                c4_style,
            } => {
                let mut config = RenderConfig::new(max_label_len, max_comment_len);
                if no_init {
                    config = config.with_mermaid_init(None);
                }
                let options = RenderOptions {
                    format,
                    name,
                    input_format,
                    config,
                    c4_style,
                };
                self.render_command(input, output, &options, cli.verbose)
            }
            Commands::Messages {
                input,
                input_format,
            } => {
                let content = self.read_input(input)?;
                let json = self.messages_json(&content, input_format)?;
                self.write_output(None, &json)
            }
            Commands::Participants {
                input,
                input_format,
            } => {
                let content = self.read_input(input)?;
                let json = self.participants_json(&content, input_format)?;
                self.write_output(None, &json)
            }
            Commands::Validate {
                input,
                input_format,
            } => self.validate_command(input, input_format, cli.verbose),
        }
    }

    /// Handle the render command
    fn render_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        options: &RenderOptions,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let diagram = self.render(&content, options)?;

        if verbose {
            eprintln!("Rendered {} diagram", options.format.renderer());
        }

        self.write_output(output, &diagram)
    }

    /// Render trace text with the given options
    pub fn render(&self, content: &str, options: &RenderOptions) -> Result<String> {
        let style = match &options.c4_style {
            Some(path) => self.load_c4_style(path)?,
            None => C4Style::default(),
        };
        let orchestrator =
            Orchestrator::with_settings(&options.name, options.config.clone(), style);
        orchestrator.process(
            content,
            options.input_format.into(),
            options.format.renderer(),
        )
    }

    fn load_c4_style(&self, path: &PathBuf) -> Result<C4Style> {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read C4 style '{}': {}", path.display(), e))?;
        let style = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Invalid C4 style '{}': {}", path.display(), e))?;
        debug!(path = %path.display(), "Loaded C4 style");
        Ok(style)
    }

    fn load(&self, content: &str, input_format: InputChoice) -> Result<Trace> {
        callflow::load_trace(content, input_format.into())
    }

    /// Synthesized messages as pretty JSON
    pub fn messages_json(&self, content: &str, input_format: InputChoice) -> Result<String> {
        let trace = self.load(content, input_format)?;
        Ok(serde_json::to_string_pretty(trace.messages())?)
    }

    /// Participant categories as pretty JSON, in diagram order
    pub fn participants_json(&self, content: &str, input_format: InputChoice) -> Result<String> {
        let trace = self.load(content, input_format)?;
        let entries: Vec<CategoryEntry<'_>> = trace
            .participants()
            .iter()
            .map(|(_, category, actors)| CategoryEntry { category, actors })
            .collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    /// Handle the validate command
    fn validate_command(
        &self,
        input: Option<PathBuf>,
        input_format: InputChoice,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        match self.load(&content, input_format) {
            Ok(trace) => {
                info!(calls = trace.len(), "Trace is valid");
                println!(
                    "✓ Valid trace: {} calls, {} messages, {} actors",
                    trace.len(),
                    trace.messages().len(),
                    trace.participants().actor_count()
                );
                Ok(())
            }
            Err(e) => {
                println!("✗ Invalid trace: {}", e);
                Err(e)
            }
        }
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(content.as_bytes())?;
                if !content.is_empty() && !content.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()?;
            }
        }
        Ok(())
    }
}
