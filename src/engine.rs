use crate::device::Device;
use crate::directive::{Context, OutputHandler};
use crate::directives;
use crate::error::{Error, Result};
use crate::script::{ConfigLine, Directive, ScriptReader};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;

/// How long to wait for the device to answer a literal line.
pub const ECHO_WINDOW: Duration = Duration::from_millis(200);

/// How long to collect trailing output once a script has finished.
pub const TRAILING_OUTPUT_WINDOW: Duration = Duration::from_secs(1);

/// Applies configuration lines to a device and shows the operator what the
/// device says back.
pub struct Engine {
    ctx: Context,
}

impl Engine {
    /// Create an engine that writes device output to stdout.
    pub fn new(device: Box<dyn Device>) -> Self {
        Self::with_handler(device, |data| {
            if let Err(e) = write_transcript(&mut io::stdout().lock(), data) {
                tracing::warn!(error = %e, "failed to write device output to stdout");
            }
        })
    }

    /// Create an engine that passes device output and directive notices to
    /// `handler` instead of stdout.
    pub fn with_handler<F>(device: Box<dyn Device>, handler: F) -> Self
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        let output_handler: OutputHandler = Arc::new(handler);
        Self {
            ctx: Context {
                device,
                output_handler,
            },
        }
    }

    /// Apply every line of one script, then drain trailing device output.
    ///
    /// Stops at the first failing line and returns its error wrapped in
    /// [`Error::AtLine`]. Trailing output is collected and shown either way;
    /// if the script failed, that error is the one returned. `source` is
    /// dropped before returning.
    pub async fn run_script<R: AsyncRead + Unpin>(&mut self, source: R) -> Result<()> {
        let mut reader = ScriptReader::new(source);
        let mut line_num = 0;

        let outcome = loop {
            line_num += 1;
            let line = match reader.read().await {
                Ok(line) => line,
                Err(Error::EndOfInput) => break Ok(()),
                Err(e) => break Err(e),
            };
            if let Err(e) = self.apply(&line).await {
                break Err(Error::AtLine {
                    line: line_num,
                    source: Box::new(e),
                });
            }
        };
        drop(reader);

        let drained = self.drain(TRAILING_OUTPUT_WINDOW).await;
        outcome.and(drained)
    }

    /// Apply a single configuration line.
    pub async fn apply(&mut self, line: &ConfigLine) -> Result<()> {
        match line {
            ConfigLine::Literal { bytes, comment } => {
                tracing::debug!(line = %line, comment, "sending");
                self.ctx.write_line(bytes).await?;
                self.drain(ECHO_WINDOW).await
            }
            ConfigLine::Directive(directive) => {
                self.ctx.emit(format!("directive: {directive}\n").as_bytes());
                self.execute_directive(directive).await
            }
        }
    }

    async fn execute_directive(&mut self, directive: &Directive) -> Result<()> {
        let Some(parse) = directives::lookup(&directive.name) else {
            tracing::debug!(name = %directive.name, "ignoring unknown directive");
            return Ok(());
        };
        let command = parse(&directive.argument)?;
        tracing::debug!(
            name = command.name(),
            argument = %directive.argument,
            "executing directive"
        );
        command.execute(&mut self.ctx).await
    }

    /// Read whatever the device has to say within `timeout` and show it.
    async fn drain(&mut self, timeout: Duration) -> Result<()> {
        self.ctx.read_output(timeout).await.map(|_| ())
    }

    /// Close the device. Call once, after the last script.
    pub async fn close(&mut self) -> Result<()> {
        self.ctx.device.close().await?;
        tracing::info!("device closed");
        Ok(())
    }
}

fn write_transcript(out: &mut impl Write, data: &[u8]) -> io::Result<()> {
    out.write_all(data)?;
    out.flush()
}
