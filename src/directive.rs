//! The [`DirectiveCommand`] trait and the [`Context`] directives run against.

use crate::device::Device;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub(crate) type OutputHandler = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Execution context shared by the engine and the directives it runs.
///
/// Holds the device and the handler that receives everything shown to the
/// operator.
pub struct Context {
    pub(crate) device: Box<dyn Device>,
    pub(crate) output_handler: OutputHandler,
}

impl Context {
    /// Send one line to the device.
    pub async fn write_line(&mut self, line: &[u8]) -> Result<()> {
        self.device.write_line(line).await
    }

    /// Read device output for up to `timeout` and show it to the operator.
    ///
    /// Returns `None` when the device cannot produce output at all. Output
    /// received before a disconnect is shown before the error is returned.
    pub async fn read_output(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>> {
        match self.device.read_timeout(timeout).await {
            Ok(output) => {
                self.emit(&output);
                Ok(Some(output))
            }
            Err(e) if e.is_unsupported() => Ok(None),
            Err(Error::Disconnected { received, source }) => {
                self.emit(&received);
                Err(Error::Disconnected { received, source })
            }
            Err(e) => Err(e),
        }
    }

    /// Pass bytes through the output handler (stdout unless overridden).
    pub fn emit(&self, data: &[u8]) {
        if !data.is_empty() {
            (self.output_handler)(data);
        }
    }
}

/// A directive the engine knows how to execute.
///
/// To add one:
///
/// 1. Define `pub const NAME: &'static str` on the struct; it is the word
///    after `!` in a script.
/// 2. Re-export the struct from `src/directives/mod.rs`.
/// 3. Add `(MyDirective::NAME, MyDirective::parse_boxed)` to the registry in
///    [`crate::directives`].
///
/// Names missing from the registry are accepted and ignored.
#[async_trait(?Send)]
pub trait DirectiveCommand: 'static {
    /// The directive name, available through a trait object.
    fn name(&self) -> &'static str;

    /// Parse the directive from its argument (everything after the first
    /// space on the line).
    fn parse(argument: &str) -> Result<Self>
    where
        Self: Sized;

    /// Parse and box. This is the function-pointer type the registry stores.
    fn parse_boxed(argument: &str) -> Result<Box<dyn DirectiveCommand>>
    where
        Self: Sized,
    {
        Ok(Box::new(Self::parse(argument)?))
    }

    async fn execute(&self, ctx: &mut Context) -> Result<()>;
}
