//! [`Sleep`] directive: pauses the script for whole seconds.
//!
//! Script syntax: `!sleep 5`

use crate::directive::{Context, DirectiveCommand};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Suspends the script for a number of seconds. Nothing is sent to the device.
///
/// The argument must be a whole number of seconds and nothing else, apart
/// from surrounding whitespace. Trailing text such as `5s` or
/// `5 # wait for reload` is rejected rather than ignored.
#[derive(Debug)]
pub struct Sleep {
    pub duration: Duration,
}

impl Sleep {
    pub const NAME: &'static str = "sleep";
}

#[async_trait(?Send)]
impl DirectiveCommand for Sleep {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(argument: &str) -> Result<Self> {
        let seconds: u64 = argument
            .trim()
            .parse()
            .map_err(|e| Error::invalid_argument(Self::NAME, argument, e))?;
        Ok(Self {
            duration: Duration::from_secs(seconds),
        })
    }

    async fn execute(&self, _ctx: &mut Context) -> Result<()> {
        tokio::time::sleep(self.duration).await;
        Ok(())
    }
}
