//! [`Assert`] directive: fails the script unless the device prints some text.
//!
//! Script syntax: `!assert Router(config)#`

use crate::directive::{Context, DirectiveCommand};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// How long the device gets to produce the expected text.
pub const ASSERT_WINDOW: Duration = Duration::from_secs(1);

/// Reads device output for [`ASSERT_WINDOW`] and checks that `expected`
/// occurs in it.
///
/// The output read is still shown to the operator. On a device that cannot
/// be read from the check is skipped.
#[derive(Debug)]
pub struct Assert {
    pub expected: String,
    pub window: Duration,
}

impl Assert {
    pub const NAME: &'static str = "assert";

    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            window: ASSERT_WINDOW,
        }
    }
}

#[async_trait(?Send)]
impl DirectiveCommand for Assert {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(argument: &str) -> Result<Self> {
        if argument.is_empty() {
            return Err(Error::invalid_argument(
                Self::NAME,
                argument,
                "expected text is empty",
            ));
        }
        Ok(Self::new(argument))
    }

    async fn execute(&self, ctx: &mut Context) -> Result<()> {
        let Some(output) = ctx.read_output(self.window).await? else {
            tracing::warn!(expected = %self.expected, "device has no output, assertion skipped");
            return Ok(());
        };

        if contains(&output, self.expected.as_bytes()) {
            Ok(())
        } else {
            Err(Error::AssertionFailed {
                expected: self.expected.clone(),
            })
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}
