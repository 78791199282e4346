use colored::*;
use std::error::Error as StdError;
use std::fmt;

/// CLI-specific error type with semantic exit codes
#[derive(Debug)]
pub struct CliError {
    /// The main error message
    message: String,

    /// Error category for exit code determination
    category: ErrorCategory,

    /// Additional context information
    context: Vec<(String, String)>,

    /// Suggestions for recovery
    pub suggestions: Vec<String>,

    /// Source error if any
    source: Option<Box<dyn StdError + Send + Sync>>,
}

/// Error categories that map to exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorCategory {
    General,
    Misuse,
    Network,
    Filesystem,
    Configuration,
}

/// Semantic exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    GeneralError = 1,
    Misuse = 2,
    NetworkError = 3,
    FilesystemError = 4,
    ConfigurationError = 5,
}

/// Extension trait for adding context to errors
pub trait ErrorContext {
    fn with_context(self, key: &str, value: &str) -> Self;
    fn with_suggestion(self, suggestion: &str) -> Self;
    fn with_source(self, source: Box<dyn StdError + Send + Sync>) -> Self;
}

impl CliError {
    fn with_category(message: &str, category: ErrorCategory) -> Self {
        Self {
            message: message.to_string(),
            category,
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    /// Create a general error
    pub fn general(message: &str) -> Self {
        Self::with_category(message, ErrorCategory::General)
    }

    /// Create a command misuse error
    pub fn misuse(message: &str) -> Self {
        let mut error = Self::with_category(message, ErrorCategory::Misuse);
        error
            .suggestions
            .push("Run 'komal --help' for usage information".to_string());
        error
    }

    /// Create a network error
    pub fn network(message: &str) -> Self {
        let mut error = Self::with_category(message, ErrorCategory::Network);
        error.suggestions = vec![
            "Check that the Komga server is running and reachable".to_string(),
            "Verify komga.url, komga.email and komga.password".to_string(),
        ];
        error
    }

    /// Create a filesystem error
    pub fn filesystem(message: &str) -> Self {
        let mut error = Self::with_category(message, ErrorCategory::Filesystem);

        if message.contains("permission") || message.contains("denied") {
            error.suggestions.push("Check file permissions".to_string());
        }
        error
            .suggestions
            .push("Override the location with paths.cache_file or paths.progress_file".to_string());

        error
    }

    /// Create a configuration error
    pub fn configuration(message: &str) -> Self {
        let mut error = Self::with_category(message, ErrorCategory::Configuration);
        error.suggestions = vec![
            "Run 'komal config init' to set up the Komga connection".to_string(),
            "Or set KOMAL_KOMGA__URL, KOMAL_KOMGA__EMAIL and KOMAL_KOMGA__PASSWORD".to_string(),
        ];
        error
    }

    /// Map a core error that ends a run to its CLI category
    pub fn from_core(error: komal_core::Error) -> Self {
        let message = error.to_string();
        let mut cli_error = match &error {
            komal_core::Error::ConfigurationMissing { field } => {
                Self::configuration(&message).with_context("field", field)
            }
            komal_core::Error::CatalogListing { .. }
            | komal_core::Error::Transport { .. }
            | komal_core::Error::HttpStatus { .. } => Self::network(&message),
            komal_core::Error::Persistence { .. } | komal_core::Error::Io(_) => {
                Self::filesystem(&message)
            }
            _ => Self::general(&message),
        };

        if error.is_fatal() {
            cli_error = cli_error.with_suggestion("No series were changed by this run");
        }
        if error.is_transient() {
            cli_error = cli_error.with_suggestion("The server may be busy; try again shortly");
        }

        cli_error.with_source(Box::new(error))
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self.category {
            ErrorCategory::General => ExitCode::GeneralError,
            ErrorCategory::Misuse => ExitCode::Misuse,
            ErrorCategory::Network => ExitCode::NetworkError,
            ErrorCategory::Filesystem => ExitCode::FilesystemError,
            ErrorCategory::Configuration => ExitCode::ConfigurationError,
        }
    }

    fn label(&self) -> &'static str {
        match self.category {
            ErrorCategory::General => "Error",
            ErrorCategory::Misuse => "Usage Error",
            ErrorCategory::Network => "Network Error",
            ErrorCategory::Filesystem => "File Error",
            ErrorCategory::Configuration => "Configuration Error",
        }
    }

    /// Format the error for user display
    pub fn format_for_user(&self, debug: bool) -> String {
        let mut output = String::new();

        let prefix = match self.category {
            ErrorCategory::Misuse | ErrorCategory::Configuration => self.label().yellow(),
            _ => self.label().red(),
        };

        output.push_str(&format!("{}: {}\n", prefix, self.message));

        if !self.context.is_empty() {
            output.push_str("\nContext:\n");
            for (key, value) in &self.context {
                output.push_str(&format!("  {}: {}\n", key.bold(), value));
            }
        }

        // Error chain in debug mode
        if debug && let Some(source) = &self.source {
            output.push_str("\nCaused by:\n");
            let mut current: Option<&dyn StdError> = Some(source.as_ref());
            let mut level = 1;

            while let Some(err) = current {
                output.push_str(&format!("  {level}: {err}\n"));
                current = err.source();
                level += 1;
            }
        }

        if !self.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in &self.suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.message)?;

        for (key, value) in &self.context {
            write!(f, " ({key}: {value})")?;
        }

        Ok(())
    }
}

impl StdError for CliError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl ErrorContext for CliError {
    fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.push((key.to_string(), value.to_string()));
        self
    }

    fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestions.push(suggestion.to_string());
        self
    }

    fn with_source(mut self, source: Box<dyn StdError + Send + Sync>) -> Self {
        self.source = Some(source);
        self
    }
}

/// Convert anyhow errors to CLI errors, keeping the category of a core error
impl From<anyhow::Error> for CliError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<komal_core::Error>() {
            Ok(core) => Self::from_core(core),
            Err(error) => match error.downcast::<CliError>() {
                Ok(cli) => cli,
                Err(error) => Self::general(&format!("{error:#}")),
            },
        }
    }
}
