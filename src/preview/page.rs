//! HTML pages served by the preview server

use crate::formatter::display_source;
use crate::preview::view::{PreviewState, ViewMode, Viewport};
use crate::session::{Phase, SessionSnapshot};

/// Shown in place of the frame until a document exists
pub const PLACEHOLDER_TEXT: &str = "Generating your preview...";

/// Permissions granted to the generated document
pub const IFRAME_SANDBOX: &str = "allow-scripts allow-same-origin allow-forms allow-popups";

const STYLE: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; height: 100vh; display: flex; flex-direction: column; background: #030712; color: #e5e7eb; font-family: system-ui, sans-serif; }
header { display: flex; align-items: center; justify-content: space-between; gap: 1rem; padding: .5rem 1rem; border-bottom: 1px solid #1f2937; background: #111827; }
nav { display: flex; gap: .25rem; background: #1f2937; padding: .125rem; border-radius: .5rem; border: 1px solid #374151; }
nav a, nav span, header button { color: #9ca3af; text-decoration: none; font-size: .875rem; padding: .375rem .75rem; border-radius: .375rem; border: 0; background: none; cursor: pointer; }
nav a.active { background: #374151; color: #fff; }
.disabled { opacity: .4; cursor: not-allowed; }
.status { font-size: .75rem; color: #6b7280; }
main { flex: 1; display: flex; justify-content: center; overflow: hidden; }
.frame { height: 100%; background: #fff; transition: width .3s ease-in-out; border-left: 1px solid #1f2937; border-right: 1px solid #1f2937; }
.frame iframe { width: 100%; height: 100%; border: none; background: #fff; }
.placeholder { height: 100%; display: flex; align-items: center; justify-content: center; color: #6b7280; background: #030712; }
.source { width: 100%; overflow: auto; background: #282c34; }
.source pre { margin: 0; padding: 1rem; font: .8125rem/1.5 ui-monospace, monospace; white-space: pre; }
"#;

const SCRIPT: &str = r#"
async function copySource(button) {
  const text = document.getElementById('source').textContent;
  if (!text) return;
  try {
    await navigator.clipboard.writeText(text);
    button.textContent = 'Copied!';
    setTimeout(() => { button.textContent = 'Copy'; }, 2000);
  } catch (err) {
    console.error('Failed to copy:', err);
  }
}
setInterval(async () => {
  try {
    const response = await fetch('/api/session');
    const session = await response.json();
    if (String(session.turn_count) !== document.body.dataset.turns || session.phase !== document.body.dataset.phase) {
      location.reload();
    }
  } catch (_) {}
}, 2000);
"#;

/// Escape text for use inside element content or a double-quoted attribute
///
/// # Examples
///
/// ```
/// use sitewright::preview::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Full preview page for the given session and view
pub fn render_page(snapshot: &SessionSnapshot, view: PreviewState) -> String {
    let document = snapshot.document.as_context();

    let body = match view.mode {
        ViewMode::Rendered => rendered_body(document, view.viewport),
        ViewMode::Source => source_body(document),
    };

    let phase = match snapshot.phase {
        Phase::Idle => "idle",
        Phase::Generating => "generating",
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Sitewright preview</title>
<style>{style}</style>
</head>
<body data-turns="{turns}" data-phase="{phase}">
{toolbar}
<main>{body}</main>
<script>{script}</script>
</body>
</html>
"#,
        style = STYLE,
        turns = snapshot.conversation.len(),
        phase = phase,
        toolbar = toolbar(view, document.is_some(), snapshot.phase),
        body = body,
        script = SCRIPT,
    )
}

fn link(label: &str, mode: ViewMode, viewport: Viewport, active: bool) -> String {
    format!(
        r#"<a href="/?mode={}&amp;viewport={}"{}>{}</a>"#,
        mode,
        viewport,
        if active { r#" class="active""# } else { "" },
        label
    )
}

fn toolbar(view: PreviewState, has_document: bool, phase: Phase) -> String {
    let modes = format!(
        "<nav>{}{}</nav>",
        link(
            "Preview",
            ViewMode::Rendered,
            view.viewport,
            view.mode == ViewMode::Rendered
        ),
        link(
            "Code",
            ViewMode::Source,
            view.viewport,
            view.mode == ViewMode::Source
        ),
    );

    let viewports = if view.mode == ViewMode::Rendered {
        let links: String = Viewport::ALL
            .iter()
            .map(|viewport| {
                link(
                    viewport.label(),
                    ViewMode::Rendered,
                    *viewport,
                    *viewport == view.viewport,
                )
            })
            .collect();
        format!("<nav>{}</nav>", links)
    } else {
        String::new()
    };

    let actions = match (view.mode, has_document) {
        (ViewMode::Source, true) => {
            r#"<nav><button type="button" onclick="copySource(this)">Copy</button><a href="/download" download="index.html">Download</a></nav>"#
        }
        (ViewMode::Rendered, true) => {
            r#"<nav><a href="/download" download="index.html">Download</a></nav>"#
        }
        (_, false) => r#"<nav><span class="disabled" title="Nothing generated yet">Download</span></nav>"#,
    };

    let status = match phase {
        Phase::Generating => r#"<span class="status">Generating...</span>"#,
        Phase::Idle => "",
    };

    format!(
        "<header>{}{}{}{}</header>",
        modes, viewports, status, actions
    )
}

fn rendered_body(document: Option<&str>, viewport: Viewport) -> String {
    let inner = match document {
        Some(html) => format!(
            r#"<iframe title="Preview" sandbox="{}" srcdoc="{}"></iframe>"#,
            IFRAME_SANDBOX,
            escape_html(html)
        ),
        None => format!(r#"<div class="placeholder"><p>{}</p></div>"#, PLACEHOLDER_TEXT),
    };

    format!(
        r#"<div class="frame" style="width: {}">{}</div>"#,
        viewport.css_width(),
        inner
    )
}

fn source_body(document: Option<&str>) -> String {
    let source = document.map(display_source).unwrap_or_default();
    format!(
        r#"<div class="source"><pre id="source">{}</pre></div>"#,
        escape_html(&source)
    )
}
