//! Number and label formatting.

/// Rounds up to two decimals; used for every translate emitted by the axis layer.
pub fn format_number(v: f64) -> f64 {
    (v * 100.0).ceil() / 100.0
}

/// Formats a number the way a browser prints it (`1`, `0.1`, `1e+21`).
pub fn js_number(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let v = if v == 0.0 { 0.0 } else { v };
    let mut buf = ryu_js::Buffer::new();
    buf.format_finite(v).to_string()
}

/// Produces tooltip text for a record.
pub trait TooltipFormat {
    fn format(&self, label: &str, value: &str) -> String;
}

/// `{label}` and `{value}` placeholders substituted into a fixed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFormat(pub String);

impl TemplateFormat {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }
}

impl TooltipFormat for TemplateFormat {
    fn format(&self, label: &str, value: &str) -> String {
        self.0.replace("{label}", label).replace("{value}", value)
    }
}

impl<F> TooltipFormat for F
where
    F: Fn(&str, &str) -> String,
{
    fn format(&self, label: &str, value: &str) -> String {
        self(label, value)
    }
}

/// Applies an optional `{value}` template to a tick value.
pub fn format_tick(template: Option<&str>, value: &str) -> String {
    match template {
        Some(t) => t.replace("{value}", value),
        None => value.to_string(),
    }
}
