//! Post-processing applied to generated text before it is returned.

/// Turns raw model output into the text sent back to the client.
pub trait ResponseFormatter: Send + Sync {
    fn format(&self, text: &str) -> String;
}

/// Returns model output unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughFormatter;

impl ResponseFormatter for PassthroughFormatter {
    fn format(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Normalizes line endings and whitespace while keeping markdown markers
/// (`**bold**`, `*em*`) intact for the client to render.
#[derive(Debug, Clone, Copy, Default)]
pub struct TidyFormatter;

impl ResponseFormatter for TidyFormatter {
    fn format(&self, text: &str) -> String {
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

        let mut lines: Vec<&str> = Vec::new();
        for line in normalized.split('\n').map(str::trim_end) {
            // at most one blank line in a row
            if line.is_empty() && lines.last().is_some_and(|prev| prev.is_empty()) {
                continue;
            }
            lines.push(line);
        }

        while lines.first().is_some_and(|line| line.is_empty()) {
            lines.remove(0);
        }
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }

        lines.join("\n")
    }
}
