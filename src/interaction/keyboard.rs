use anyhow::Result;

use crate::session::Modifiers;

/// Empty a form field and notify listeners.
pub fn clear_body() -> &'static str {
    r#"
        if (el.isContentEditable) {
            el.textContent = '';
        } else {
            el.value = '';
        }
        el.dispatchEvent(new Event('input', { bubbles: true }));
        el.dispatchEvent(new Event('change', { bubbles: true }));
        return { v: true };
    "#
}

/// Focus the element and append `text`, either one character at a time
/// (with key events around every character) or all at once.
pub fn type_text_body(text: &str, modifiers: Modifiers, per_character: bool) -> Result<String> {
    Ok(format!(
        r#"
        const text = {text};
        const chunks = {per_character} ? Array.from(text) : [text];
        const mods = {{ ctrlKey: {ctrl}, shiftKey: {shift}, altKey: {alt} }};
        el.scrollIntoView({{ block: 'center', behavior: 'instant' }});
        el.focus();
        const isField = el.tagName === 'INPUT' || el.tagName === 'TEXTAREA';
        const proto = el.tagName === 'TEXTAREA'
            ? window.HTMLTextAreaElement.prototype
            : window.HTMLInputElement.prototype;
        const setter = isField ? Object.getOwnPropertyDescriptor(proto, 'value')?.set : null;
        for (const chunk of chunks) {{
            const keyOpts = {{ key: chunk, bubbles: true, cancelable: true, ...mods }};
            el.dispatchEvent(new KeyboardEvent('keydown', keyOpts));
            el.dispatchEvent(new KeyboardEvent('keypress', keyOpts));
            if (isField) {{
                if (setter) {{
                    setter.call(el, el.value + chunk);
                }} else {{
                    el.value += chunk;
                }}
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            }} else {{
                document.execCommand('insertText', false, chunk);
            }}
            el.dispatchEvent(new KeyboardEvent('keyup', keyOpts));
        }}
        el.dispatchEvent(new Event('change', {{ bubbles: true }}));
        return {{ v: true }};
        "#,
        text = serde_json::to_string(text)?,
        per_character = per_character,
        ctrl = modifiers.control,
        shift = modifiers.shift,
        alt = modifiers.alt,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_text_escapes_payload() {
        let body = type_text_body(r#"say "hi"</script>"#, Modifiers::default(), true).unwrap();
        assert!(body.contains(r#"const text = "say \"hi\"</script>";"#));
        assert!(body.contains("const chunks = true ?"));
    }

    #[test]
    fn test_type_text_carries_modifiers() {
        let modifiers = Modifiers {
            control: true,
            shift: false,
            alt: true,
        };
        let body = type_text_body("a", modifiers, false).unwrap();
        assert!(body.contains("ctrlKey: true, shiftKey: false, altKey: true"));
        assert!(body.contains("const chunks = false ?"));
    }
}
