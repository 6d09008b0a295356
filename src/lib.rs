//! # ttyapply
//!
//! Replay configuration scripts over a serial console.
//!
//! ttyapply sends a file of device commands to a serial port one line at a
//! time and prints whatever the device answers, so the operator can check the
//! result by eye. It does not understand the commands it sends. A few
//! directives embedded in the script add pauses and simple output checks.
//!
//! ## Quick start
//!
//! ```no_run
//! use ttyapply::{DeviceKind, Engine, device};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dev = device::open("/dev/ttyUSB0", DeviceKind::Serial { baud_rate: 9600 }).await?;
//!     let mut engine = Engine::new(dev);
//!
//!     let script = tokio::fs::File::open("switch.conf").await?;
//!     let outcome = engine.run_script(script).await;
//!     engine.close().await?;
//!     outcome?;
//!     Ok(())
//! }
//! ```
//!
//! ## Script syntax
//!
//! | Line | Description |
//! |------|-------------|
//! | `hostname r1` | Sent to the device verbatim |
//! | `! text` | Comment, also sent to the device |
//! | `!sleep 5` | Pause the script for 5 seconds |
//! | `!assert Router#` | Fail unless the device prints `Router#` within 1 second |
//! | `!other ...` | Unknown directives are ignored |
//!
//! ## Devices
//!
//! Anything implementing [`Device`] can be driven. Two transports ship with the
//! crate: [`SerialDevice`], which reads device output through a background
//! line pump, and [`FileDevice`], which appends lines to a file and never
//! produces output (handy for dry runs).
//!
//! ## Custom output handling
//!
//! [`Engine::new`] prints device output to stdout. Use
//! [`Engine::with_handler`] to send it anywhere else:
//!
//! ```no_run
//! use std::sync::{Arc, Mutex};
//! use ttyapply::{Engine, FileDevice};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let captured = Arc::new(Mutex::new(Vec::<u8>::new()));
//!     let sink = captured.clone();
//!
//!     let dev = FileDevice::open("dry-run.txt").await?;
//!     let mut engine = Engine::with_handler(Box::new(dev), move |data| {
//!         sink.lock().unwrap().extend_from_slice(data);
//!     });
//!     engine.run_script(&b"!sleep 1\nend\n"[..]).await?;
//!     engine.close().await?;
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod directive;
pub mod directives;
pub mod engine;
pub mod error;
pub mod line_pump;
pub mod script;

pub use device::{Device, DeviceKind, FileDevice, SerialDevice};
pub use directive::{Context, DirectiveCommand};
pub use directives::{Assert, Sleep};
pub use engine::Engine;
pub use error::{Error, Result};
pub use script::{ConfigLine, Directive, ScriptReader, parse_line};
