/// Scroll into view, then dispatch the mouse sequence and a native click.
///
/// Options are selected on their parent `<select>` instead, since option
/// elements do not receive synthetic mouse input.
pub fn click_body() -> &'static str {
    r#"
        if (el.tagName === 'OPTION') {
            el.selected = true;
            const select = el.closest('select');
            if (select) {
                select.dispatchEvent(new Event('input', { bubbles: true }));
                select.dispatchEvent(new Event('change', { bubbles: true }));
            }
            return { v: true };
        }
        el.scrollIntoView({ block: 'center', inline: 'center', behavior: 'instant' });
        const rect = el.getBoundingClientRect();
        const opts = {
            bubbles: true,
            cancelable: true,
            clientX: rect.left + rect.width / 2,
            clientY: rect.top + rect.height / 2,
            button: 0
        };
        el.dispatchEvent(new MouseEvent('mousemove', opts));
        el.dispatchEvent(new MouseEvent('mousedown', opts));
        el.dispatchEvent(new MouseEvent('mouseup', opts));
        el.click();
        return { v: true };
    "#
}

pub fn double_click_body() -> &'static str {
    r#"
        el.scrollIntoView({ block: 'center', inline: 'center', behavior: 'instant' });
        const rect = el.getBoundingClientRect();
        const opts = {
            bubbles: true,
            cancelable: true,
            clientX: rect.left + rect.width / 2,
            clientY: rect.top + rect.height / 2,
            button: 0
        };
        for (let i = 1; i <= 2; i++) {
            el.dispatchEvent(new MouseEvent('mousedown', { ...opts, detail: i }));
            el.dispatchEvent(new MouseEvent('mouseup', { ...opts, detail: i }));
            el.dispatchEvent(new MouseEvent('click', { ...opts, detail: i }));
        }
        el.dispatchEvent(new MouseEvent('dblclick', { ...opts, detail: 2 }));
        return { v: true };
    "#
}

pub fn hover_body() -> &'static str {
    r#"
        el.scrollIntoView({ block: 'center', behavior: 'instant' });
        const rect = el.getBoundingClientRect();
        const opts = {
            bubbles: true,
            clientX: rect.left + rect.width / 2,
            clientY: rect.top + rect.height / 2
        };
        el.dispatchEvent(new MouseEvent('mouseenter', { ...opts, bubbles: false }));
        el.dispatchEvent(new MouseEvent('mouseover', opts));
        el.dispatchEvent(new MouseEvent('mousemove', opts));
        return { v: true };
    "#
}
