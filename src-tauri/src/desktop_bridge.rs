/// Injected into every document the main window loads, remote destinations included.
///
/// Exposes `window.flowrBridge.send(name, payload)` and binds the operator chord
/// Ctrl+Shift+Alt+C to `openConfigMode`.
pub(crate) const BRIDGE_SCRIPT: &str = r#"
(() => {
  if (window.flowrBridge) {
    return;
  }

  const invoke = (command, args) => {
    const internals = window.__TAURI_INTERNALS__;
    if (!internals || typeof internals.invoke !== 'function') {
      return Promise.reject(new Error('flowr bridge is unavailable'));
    }
    return internals.invoke(command, args);
  };

  const send = async (name, payload) => {
    const result = await invoke('flowr_bridge_send', {
      name,
      payload: payload === undefined ? null : payload,
    });
    if (!result || !result.ok) {
      throw new Error((result && result.reason) || `flowr bridge rejected '${name}'`);
    }
    return result.data === undefined ? null : result.data;
  };

  window.flowrBridge = {
    send,
    isDesktopRuntime: () => invoke('flowr_bridge_is_desktop_runtime'),
  };

  window.addEventListener('keydown', (event) => {
    if (event.ctrlKey && event.shiftKey && event.altKey && event.code === 'KeyC') {
      event.preventDefault();
      send('openConfigMode').catch((error) => console.error(error));
    }
  });
})();
"#;
