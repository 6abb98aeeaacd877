//! Human and JSON output for one-shot commands.

use serde::Serialize;

/// Something a command prints
pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
}

pub fn output<T: CommandOutput>(data: &T, json_mode: bool) {
    if json_mode {
        match serde_json::to_string_pretty(data) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Error: failed to serialize output: {}", e),
        }
    } else {
        println!("{}", data.to_human());
    }
}

pub fn print_error(err: &anyhow::Error, json_mode: bool) {
    if json_mode {
        let body = serde_json::json!({ "error": format!("{:#}", err) });
        eprintln!("{}", body);
    } else {
        eprintln!("Error: {:#}", err);
    }
}
