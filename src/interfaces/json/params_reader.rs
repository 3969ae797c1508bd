use crate::domain::envelope::Params;
use crate::error::{ParamsErrorCode, PayError, Result};
use serde_json::Value;
use std::io::Read;

/// Reads call parameters from a JSON source.
///
/// The document must be a single JSON object; its keys become the params of
/// the call.
pub struct ParamsReader<R: Read> {
    source: R,
}

impl<R: Read> ParamsReader<R> {
    /// Creates a new `ParamsReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn params(self) -> Result<Params> {
        let value: Value = serde_json::from_reader(self.source).map_err(|e| {
            PayError::invalid_params(
                ParamsErrorCode::MissingParam,
                format!("params are not valid JSON: {e}"),
            )
        })?;

        match value {
            Value::Object(params) => Ok(params),
            other => Err(PayError::invalid_params(
                ParamsErrorCode::MissingParam,
                format!("params must be a JSON object, got {other}"),
            )),
        }
    }
}
