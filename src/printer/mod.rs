//! Printers: colored text for generated code, notices and payloads.

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

use crate::config::Config;

#[derive(Debug, Clone, Copy, Default)]
pub struct TextPrinter {
    pub color: Option<&'static str>,
}

impl TextPrinter {
    pub fn from_name(name: &str) -> Self {
        let color = match name.to_ascii_lowercase().as_str() {
            "green" => Some("green"),
            "cyan" => Some("cyan"),
            "magenta" => Some("magenta"),
            "yellow" => Some("yellow"),
            _ => None,
        };
        Self { color }
    }

    /// Colors only when stdout is a terminal.
    pub fn from_config(cfg: &Config) -> Self {
        if !std::io::stdout().is_terminal() {
            return Self::default();
        }
        cfg.get("DEFAULT_COLOR")
            .map(|c| Self::from_name(&c))
            .unwrap_or_default()
    }

    pub fn print(&self, text: &str) {
        if let Some(c) = self.color {
            match c {
                "green" => println!("{}", text.green()),
                "cyan" => println!("{}", text.cyan()),
                "magenta" => println!("{}", text.magenta()),
                "yellow" => println!("{}", text.yellow()),
                _ => println!("{}", text),
            }
        } else {
            println!("{}", text);
        }
    }

    pub fn notice(&self, text: &str) {
        if self.color.is_some() {
            println!("{}", text.yellow());
        } else {
            println!("{}", text);
        }
    }
}
