use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

/// Why a call was rejected before (or while) assembling the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamsErrorCode {
    ShortcutNotFound,
    PluginIncompatible,
    MissingParam,
}

/// Why the provider could not be wired to perform a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorCode {
    HttpClientMissing,
    ConfigUnreadable,
    SignKeyInvalid,
}

/// Why the gateway exchange produced no usable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseErrorCode {
    RequestResponseError,
    ResponseStatus,
    ResponseParse,
    ResponseSignature,
    ResponseBusiness,
    DestinationAlreadySet,
}

impl ParamsErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortcutNotFound => "shortcut not found",
            Self::PluginIncompatible => "plugin incompatible",
            Self::MissingParam => "missing param",
        }
    }
}

impl ConfigErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HttpClientMissing => "http client missing",
            Self::ConfigUnreadable => "config unreadable",
            Self::SignKeyInvalid => "sign key invalid",
        }
    }
}

impl ResponseErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestResponseError => "request/response error",
            Self::ResponseStatus => "unexpected response status",
            Self::ResponseParse => "response parse error",
            Self::ResponseSignature => "response signature mismatch",
            Self::ResponseBusiness => "gateway rejected the request",
            Self::DestinationAlreadySet => "destination already set",
        }
    }
}

impl fmt::Display for ParamsErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ConfigErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ResponseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Diagnostic, Debug)]
pub enum PayError {
    #[error("{code}: {message}")]
    #[diagnostic(code(paypipe::invalid_params))]
    InvalidParams {
        code: ParamsErrorCode,
        message: String,
    },
    #[error("{code}: {message}")]
    #[diagnostic(
        code(paypipe::invalid_config),
        help("check the provider wiring and the configuration file")
    )]
    InvalidConfig {
        code: ConfigErrorCode,
        message: String,
    },
    #[error("{code}: {message}")]
    #[diagnostic(code(paypipe::invalid_response))]
    InvalidResponse {
        code: ResponseErrorCode,
        message: String,
    },
}

impl PayError {
    pub fn invalid_params(code: ParamsErrorCode, message: impl Into<String>) -> Self {
        Self::InvalidParams {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_config(code: ConfigErrorCode, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_response(code: ResponseErrorCode, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            code,
            message: message.into(),
        }
    }
}

/// Failure reported by a transport collaborator.
///
/// The dispatch gate never inspects the variant; it only forwards the message.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("transport error: {0}")]
    Connection(String),
}

pub type Result<T> = std::result::Result<T, PayError>;
