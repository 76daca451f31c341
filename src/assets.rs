//! Static CSS and JS inlined into every exported page.

/// Stylesheet for a conversation page.
///
/// `.artifact-inline` copies stay hidden on screen. When printing, buttons are
/// hidden and inline copies carrying `print-enabled` are shown instead.
pub const CONVERSATION_CSS: &str = r#"
body {
  font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Oxygen-Sans, Ubuntu, Cantarell, "Helvetica Neue", sans-serif;
  line-height: 1.6;
  margin: 0;
  padding: 0;
  background-color: #f9fafb;
}
.container { display: flex; justify-content: center; }
.chat-container { flex: 0 1 1000px; padding: 20px; transition: max-width 0.3s ease; }
.artifact-container {
  width: 0;
  background: white;
  border-left: 1px solid #e5e7eb;
  transition: width 0.3s ease;
  overflow: hidden;
  flex-shrink: 0;
  position: sticky;
  top: 0;
  height: 100vh;
}
.artifact-container.active { width: 800px; }
.conversation-title { font-size: 24px; font-weight: bold; margin-bottom: 20px; color: #111827; }
.message {
  margin-bottom: 24px;
  background: white;
  border-radius: 8px;
  padding: 20px;
  box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1);
}
.message-header { display: flex; align-items: center; margin-bottom: 12px; }
.sender { font-weight: 600; color: #111827; margin-right: 12px; }
.timestamp { color: #6b7280; font-size: 0.875rem; }
.message-content { color: #1f2937; }
.human { background: #f3f4f6; }
.assistant { background: white; font-family: "Times New Roman", Times, serif; font-size: 110%; }

.artifact-button-wrapper { margin: 1em 0; }
.artifact-button {
  display: inline-flex;
  align-items: center;
  gap: 8px;
  padding: 8px 16px;
  background-color: #f3f4f6;
  border: 1px solid #e5e7eb;
  border-radius: 6px;
  cursor: pointer;
  font-size: 14px;
  color: #374151;
  transition: background-color 0.2s;
}
.artifact-button:hover { background-color: #e5e7eb; }
.artifact-icon { width: 16px; height: 16px; }
.artifact-panel { display: none; height: 100%; flex-direction: column; }
.artifact-panel.active { display: flex; }
.artifact-panel-header {
  display: flex;
  justify-content: space-between;
  align-items: center;
  padding: 16px;
  background: #f9fafb;
  border-bottom: 1px solid #e5e7eb;
}
.artifact-panel-header h3 { margin: 0; font-size: 16px; color: #111827; }
.close-panel { background: none; border: none; font-size: 24px; cursor: pointer; color: #6b7280; padding: 0 8px; }
.close-panel:hover { color: #111827; }
.artifact-panel-content { flex: 1; padding: 16px; overflow-y: auto; }
.artifact-inline { display: none; margin: 1em 0; padding: 1em; border: 1px solid #e5e7eb; border-radius: 6px; }
.artifact-inline h4 { margin: 0 0 1em 0; color: #111827; }
.artifact-inline-block { margin: 1em 0; padding: 1em; border: 1px solid #e5e7eb; border-radius: 6px; }
.artifact-inline-block h4 { margin: 0 0 1em 0; color: #111827; }
.artifact-inline-block p { margin: 0.5em 0; }

.attachment { margin: 0.75em 0; border: 1px solid #e5e7eb; border-radius: 6px; background: #f8fafc; }
.attachment summary { cursor: pointer; padding: 6px 12px; font-weight: 500; }
.attachment-content { margin: 0; padding: 12px; white-space: pre-wrap; font-size: 0.875rem; }

.code-block {
  margin: 0;
  padding: 12px;
  background: #f8fafc;
  overflow-x: auto;
  font-family: ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, "Liberation Mono", "Courier New", monospace;
  font-size: 0.875rem;
  white-space: pre-wrap;
  border-radius: 6px;
  border: 1px solid #e5e7eb;
}
.inline-code {
  font-family: ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, "Liberation Mono", "Courier New", monospace;
  font-size: 0.875rem;
  background: #f3f4f6;
  padding: 2px 4px;
  border-radius: 4px;
}

.numbered-list { margin: 16px 0; padding-left: 40px; }
.numbered-list li { margin-bottom: 8px; }
.bulleted-list { margin: 16px 0; padding-left: 40px; list-style-type: disc; }
.bulleted-list .bulleted-list { margin: 8px 0; list-style-type: circle; }
.bulleted-list .bulleted-list .bulleted-list { list-style-type: square; }
.bulleted-list li { margin-bottom: 8px; }

@media print {
  body { background-color: white; }
  .container { display: block; }
  .chat-container { max-width: 100%; padding: 0; }
  .artifact-container { display: none; }
  .artifact-button-wrapper { display: none; }
  .artifact-inline.print-enabled { display: block; }
  .artifact-inline:not(.print-enabled) { display: none; }
}
"#;

/// Panel toggling for a conversation page.
///
/// Showing a panel hides every other one. Clicking the button of the panel
/// that is already open closes it, as does its close button.
pub const CONVERSATION_JS: &str = r#"
document.addEventListener('DOMContentLoaded', function () {
  const container = document.querySelector('.container');
  const artifactContainer = document.querySelector('.artifact-container');
  const panels = document.querySelectorAll('.artifact-panel');
  let currentPanelId = null;

  function hideAllPanels() {
    panels.forEach(panel => panel.classList.remove('active'));
    artifactContainer.classList.remove('active');
    container.classList.remove('has-panel');
    currentPanelId = null;
  }

  function showPanel(panelId) {
    panels.forEach(panel => panel.classList.remove('active'));
    const panel = document.getElementById(panelId);
    if (panel) {
      panel.classList.add('active');
      artifactContainer.classList.add('active');
      container.classList.add('has-panel');
      currentPanelId = panelId;
    }
  }

  document.querySelectorAll('.artifact-button').forEach(button => {
    button.addEventListener('click', () => {
      const panelId = button.dataset.artifactId;
      if (panelId === currentPanelId) {
        hideAllPanels();
      } else {
        showPanel(panelId);
      }
    });
  });

  document.querySelectorAll('.close-panel').forEach(button => {
    button.addEventListener('click', hideAllPanels);
  });
});
"#;

pub const INDEX_CSS: &str = r#"
body { font-family: sans-serif; max-width: 1000px; margin: auto; padding: 0 1em; }
ul { list-style-type: none; padding: 0; }
li { margin-bottom: 1em; }
a { text-decoration: none; color: blue; }
a:hover { text-decoration: underline; }
.timestamp { color: black; font-size: 1em; white-space: nowrap; }
.description { font-size: 0.8em; color: black; margin-left: 3em; }
"#;
