mod assert;
mod sleep;

pub use assert::Assert;
pub use sleep::Sleep;

use crate::directive::DirectiveCommand;
use crate::error::Result;

type ParseFn = fn(&str) -> Result<Box<dyn DirectiveCommand>>;

static REGISTRY: &[(&str, ParseFn)] = &[
    (Sleep::NAME, Sleep::parse_boxed),
    (Assert::NAME, Assert::parse_boxed),
];

/// Look up the parser registered for a directive name.
pub(crate) fn lookup(name: &str) -> Option<ParseFn> {
    REGISTRY
        .iter()
        .find(|(directive, _)| *directive == name)
        .map(|(_, parse)| *parse)
}
