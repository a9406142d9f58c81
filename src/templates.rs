//! Launch configuration templates for the CodeLLDB `attach` request

/// Attach to a process that has already loaded `libflutter.so`
pub const TEMPLATE_ATTACH: &str = r#"
{
    "version": "0.2.0",
    "configurations": [
        {
            "name": "remote_lldb",
            "type": "lldb",
            "request": "attach",
            "pid": "{{PID}}",
            "initCommands": [
                "platform select remote-android",
                "platform connect unix-abstract-connect:///data/data/{{PACKAGE}}/debug.socket"
            ],
            "postRunCommands": [
                "add-dsym {{SYMBOL_DIR}}/libflutter.so",
                "settings set target.source-map {{BUILD_DIR}} {{SRC_DIR}}"
            ],
        }
    ]
}
    "#;

/// Attach and wait for the process to load `libflutter.so`
pub const TEMPLATE_WAIT_FOR_PROCESS: &str = r#"
{
    "version": "0.2.0",
    "configurations": [
        {
            "name": "remote_lldb",
            "type": "lldb",
            "request": "attach",
            "pid": "{{PID}}",
            "initCommands": [
                "platform select remote-android",
                "platform connect unix-abstract-connect:///data/data/{{PACKAGE}}/debug.socket"
            ],
            "preRunCommands": [
                "settings append target.exec-search-paths {{SYMBOL_DIR}}"
            ],
            "postRunCommands": [
                "settings set target.source-map {{BUILD_DIR}} {{SRC_DIR}}"
            ],
        }
    ]
}
        "#;

/// Replace `{{PLACEHOLDER}}` patterns in a template string.
///
/// Single pass: text coming from a value is never scanned again, and unknown
/// placeholders are left as they are.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };

        let key = &after[..end];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    result.push_str(rest);
    result
}
