use anyhow::{anyhow, Result};
use kuchiki::parse_html;
use kuchiki::traits::*;
use tracing::{debug, error};

use super::environment::JsDocumentEnvironment;
use super::script::{ScriptDescriptor, ScriptExecution, ScriptKind, ScriptSource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptExecutionSummary {
    pub executed_scripts: usize,
    pub failed_scripts: usize,
    pub skipped_scripts: usize,
}

/// Finds every `<script>` element in `html`, in document order.
pub fn collect_scripts(html: &str) -> Result<Vec<ScriptDescriptor>> {
    let parsed = parse_html().one(html);
    let mut collected = Vec::new();
    let selector = parsed
        .select("script")
        .map_err(|_| anyhow!("failed to compile selector"))?;

    for (index, script) in selector.enumerate() {
        let attributes = script.attributes.borrow();
        let kind = classify_kind(attributes.get("type"));
        let execution = determine_execution(&attributes, kind);

        if let Some(src) = attributes
            .get("src")
            .map(str::trim)
            .filter(|src| !src.is_empty())
        {
            collected.push(ScriptDescriptor {
                index,
                kind,
                execution,
                source: ScriptSource::External {
                    src: src.to_string(),
                },
            });
            continue;
        }

        drop(attributes);
        let code = script.text_contents();
        if code.trim().is_empty() {
            continue;
        }
        collected.push(ScriptDescriptor {
            execution,
            ..ScriptDescriptor::inline(index, code, kind)
        });
    }

    Ok(collected)
}

fn classify_kind(script_type: Option<&str>) -> ScriptKind {
    let Some(value) = script_type else {
        return ScriptKind::Classic;
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "text/javascript" | "application/javascript" | "text/ecmascript"
        | "application/ecmascript" => ScriptKind::Classic,
        "module" | "text/javascript+module" => ScriptKind::Module,
        _ => ScriptKind::Unknown,
    }
}

fn determine_execution(attributes: &kuchiki::Attributes, kind: ScriptKind) -> ScriptExecution {
    if attributes.get("async").is_some() {
        return ScriptExecution::Async;
    }
    if attributes.get("defer").is_some() {
        return ScriptExecution::Defer;
    }
    match kind {
        ScriptKind::Module => ScriptExecution::Defer,
        _ => ScriptExecution::Blocking,
    }
}

/// Runs the inline blocking classic scripts in order. A failing script is
/// logged and does not stop the ones after it.
pub fn run_inline_scripts(
    environment: &JsDocumentEnvironment,
    scripts: &[ScriptDescriptor],
) -> ScriptExecutionSummary {
    let mut summary = ScriptExecutionSummary::default();

    for descriptor in scripts {
        let Some(source) = descriptor.inline_code().filter(|_| descriptor.runs_inline()) else {
            debug!(
                target: "quickjs",
                index = descriptor.index,
                kind = ?descriptor.kind,
                execution = ?descriptor.execution,
                "skipping script"
            );
            summary.skipped_scripts += 1;
            continue;
        };

        let filename = descriptor.filename();
        match environment.eval(source, &filename) {
            Ok(()) => summary.executed_scripts += 1,
            Err(err) => {
                error!(target: "quickjs", %filename, error = %err, "inline script execution failed");
                summary.failed_scripts += 1;
            }
        }
    }

    summary
}

/// Collects and runs the page's inline scripts against `environment`.
pub fn execute_inline_scripts(
    environment: &JsDocumentEnvironment,
    html: &str,
) -> Result<ScriptExecutionSummary> {
    let scripts = collect_scripts(html)?;
    let summary = run_inline_scripts(environment, &scripts);
    debug!(
        target: "quickjs",
        executed = summary.executed_scripts,
        failed = summary.failed_scripts,
        skipped = summary.skipped_scripts,
        "inline scripts finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_scripts_in_document_order() {
        let html = r#"<html><head>
            <script>var a = 1;</script>
            <script src="/app.js" defer></script>
            <script type="module">import x from './x.js';</script>
            <script type="application/json">{"k": 1}</script>
            <script>   </script>
            <script async>var b = 2;</script>
        </head></html>"#;
        let scripts = collect_scripts(html).unwrap();
        assert_eq!(scripts.len(), 5);

        assert!(scripts[0].runs_inline());
        assert_eq!(scripts[0].inline_code(), Some("var a = 1;"));

        assert_eq!(
            scripts[1].source,
            ScriptSource::External {
                src: "/app.js".to_string()
            }
        );
        assert_eq!(scripts[1].execution, ScriptExecution::Defer);

        assert_eq!(scripts[2].kind, ScriptKind::Module);
        assert_eq!(scripts[2].execution, ScriptExecution::Defer);
        assert!(!scripts[2].runs_inline());

        assert_eq!(scripts[3].kind, ScriptKind::Unknown);
        assert_eq!(scripts[4].execution, ScriptExecution::Async);
        assert_eq!(scripts[4].index, 5);
    }

    #[test]
    fn classifies_types_case_insensitively() {
        assert_eq!(classify_kind(None), ScriptKind::Classic);
        assert_eq!(classify_kind(Some(" Text/JavaScript ")), ScriptKind::Classic);
        assert_eq!(classify_kind(Some("MODULE")), ScriptKind::Module);
        assert_eq!(classify_kind(Some("text/x-template")), ScriptKind::Unknown);
    }

    #[test]
    fn failing_script_does_not_stop_later_ones() {
        let html = r#"<html><body>
            <script>document.body.setAttribute('data-first', '1');</script>
            <script>throw new Error('boom');</script>
            <script>document.body.setAttribute('data-third', '3');</script>
            <script type="module">document.body.setAttribute('data-module', 'x');</script>
        </body></html>"#;
        let environment = JsDocumentEnvironment::new(html).unwrap();
        let summary = execute_inline_scripts(&environment, html).unwrap();
        assert_eq!(
            summary,
            ScriptExecutionSummary {
                executed_scripts: 2,
                failed_scripts: 1,
                skipped_scripts: 1,
            }
        );

        let tree = environment.tree().borrow();
        let body = tree.body().unwrap();
        assert_eq!(tree.attribute(body, "data-first"), Some("1"));
        assert_eq!(tree.attribute(body, "data-third"), Some("3"));
        assert_eq!(tree.attribute(body, "data-module"), None);
    }
}
