use evalir_core::IrError;
use evalir_parser::{ParseError, Span};
use thiserror::Error;

fn at(span: &Option<Span>) -> String {
    match span {
        Some(span) => format!(" at {}", span),
        None => String::new(),
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoweringError {
    #[error("Undefined variable `{name}`{}", at(.span))]
    UnboundVariable { name: String, span: Option<Span> },

    #[error("Unsupported form {form}{}", at(.span))]
    UnsupportedForm { form: String, span: Option<Span> },

    #[error("Malformed `{form}`: {message}{}", at(.span))]
    MalformedForm {
        form: String,
        message: String,
        span: Option<Span>,
    },

    #[error("Empty `begin`{}", at(.span))]
    EmptyBegin { span: Option<Span> },

    #[error("Type mismatch: expected {expected}, found {found}{}", at(.span))]
    TypeMismatch {
        expected: String,
        found: String,
        span: Option<Span>,
    },

    #[error("Integer literal {value} does not fit in i32{}", at(.span))]
    IntegerOutOfRange { value: i64, span: Option<Span> },

    #[error("IR builder error: {0}")]
    Builder(String),
}

impl LoweringError {
    pub fn span(&self) -> Option<Span> {
        match self {
            LoweringError::UnboundVariable { span, .. }
            | LoweringError::UnsupportedForm { span, .. }
            | LoweringError::MalformedForm { span, .. }
            | LoweringError::EmptyBegin { span }
            | LoweringError::TypeMismatch { span, .. }
            | LoweringError::IntegerOutOfRange { span, .. } => *span,
            LoweringError::Builder(_) => None,
        }
    }

    /// Attach `span` unless the error already points somewhere more precise.
    pub fn with_span(mut self, at: Option<Span>) -> Self {
        match &mut self {
            LoweringError::UnboundVariable { span, .. }
            | LoweringError::UnsupportedForm { span, .. }
            | LoweringError::MalformedForm { span, .. }
            | LoweringError::EmptyBegin { span }
            | LoweringError::TypeMismatch { span, .. }
            | LoweringError::IntegerOutOfRange { span, .. } => {
                if span.is_none() {
                    *span = at;
                }
            }
            LoweringError::Builder(_) => {}
        }
        self
    }

    pub fn malformed(form: &str, message: impl Into<String>, span: Option<Span>) -> Self {
        LoweringError::MalformedForm {
            form: form.to_string(),
            message: message.into(),
            span,
        }
    }
}

impl From<IrError> for LoweringError {
    fn from(err: IrError) -> Self {
        match err {
            IrError::TypeMismatch { expected, found } => LoweringError::TypeMismatch {
                expected,
                found,
                span: None,
            },
            other => LoweringError::Builder(other.to_string()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Lowering(#[from] LoweringError),
}
