use serde_json::Value;

use super::Context;

const OPEN: &str = "${ctx.";

/// Whether `template` contains at least one `${ctx.…}` placeholder.
pub fn has_placeholders(template: &str) -> bool {
    template.contains(OPEN)
}

/// Render `${ctx.key}` and `${ctx.nested.key}` placeholders in a location
/// template. Missing keys render as the empty string; an unterminated
/// placeholder is left as written.
pub fn render(template: &str, ctx: &Context) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find(OPEN) {
        let after = &rest[open + OPEN.len()..];
        let Some(close) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(&lookup(&after[..close], ctx));
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

fn lookup(path: &str, ctx: &Context) -> String {
    let mut parts = path.split('.');
    let Some(mut current) = parts.next().and_then(|head| ctx.get(head)) else {
        return String::new();
    };

    for part in parts {
        match current.get(part) {
            Some(next) => current = next,
            None => return String::new(),
        }
    }

    match current {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_render_flat_and_nested() {
        let mut ctx = HashMap::new();
        ctx.insert("task".to_string(), serde_json::json!("extract"));
        ctx.insert("run".to_string(), serde_json::json!({"id": 42}));

        assert_eq!(
            render("runs/${ctx.run.id}/${ctx.task}.json", &ctx),
            "runs/42/extract.json"
        );
    }

    #[test]
    fn test_render_missing_key() {
        assert_eq!(render("out/${ctx.missing}.json", &HashMap::new()), "out/.json");
    }

    #[test]
    fn test_render_unterminated() {
        assert_eq!(render("out/${ctx.task", &HashMap::new()), "out/${ctx.task");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert!(!has_placeholders("plain/key.json"));
        assert_eq!(render("plain/key.json", &HashMap::new()), "plain/key.json");
    }
}
