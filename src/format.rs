use crate::value::{Callable, Value};

/// Renders a value the way `print` shows it: integral numbers without a
/// fractional part, `true`/`false`, `novalue`, lists recursively, strings
/// raw.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Number(n) => format_number(*n),
        Value::Str(s) => ascii_replace(&s.borrow().iter().collect::<String>()),
        Value::Bool(b) => {
            if *b {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        Value::List(items) => {
            let rendered: Vec<String> = items.borrow().iter().map(render_value).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::NoValue => "novalue".to_string(),
        Value::Callable(c) => format!("<fun {}>", c.name()),
    }
}

pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Replaces every non-ASCII character with `?`. Output is plain ASCII.
pub fn ascii_replace(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect()
}
