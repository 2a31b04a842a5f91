use std::borrow::Cow;

/// Trait for formatting messages into wire lines.
///
/// Implementors must be thread-safe (`Send + Sync`) so a formatter can be
/// shared between concurrent emit sites.
pub trait Formatter: Send + Sync {
    /// Produce the line for one message, without the trailing delimiter.
    fn format(&self, name: &str, message: &str) -> String;
}

/// Default `<tag>: <message>` framing used by every built-in sink.
///
/// Interior newlines are escaped so that one emit always maps onto exactly
/// one newline-terminated frame on the wire. Backslashes are escaped first,
/// so a literal two-character `\n` in a message stays distinguishable from an
/// escaped line break and the receiver can reverse the mapping.
#[derive(Copy, Clone, Debug, Default)]
pub struct LineFormatter;

impl Formatter for LineFormatter {
    fn format(&self, name: &str, message: &str) -> String {
        format!("{name}: {}", escape_message(message))
    }
}

fn escape_message(message: &str) -> Cow<'_, str> {
    if message.contains(['\n', '\r', '\\']) {
        Cow::Owned(
            message
                .replace('\\', "\\\\")
                .replace('\r', "\\r")
                .replace('\n', "\\n"),
        )
    } else {
        Cow::Borrowed(message)
    }
}
