use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use colored::*;

pub struct Logger;

impl Logger {
    fn logs_dir() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("logs")
    }

    fn log_file_name() -> PathBuf {
        let date = Local::now().format("%Y-%m-%d").to_string();
        Self::logs_dir().join(format!("bot-{}.log", date))
    }

    fn write_to_file(message: &str) {
        if (|| -> std::io::Result<()> {
            let logs_dir = Self::logs_dir();
            if !logs_dir.exists() {
                fs::create_dir_all(&logs_dir)?;
            }
            let timestamp = Local::now().to_rfc3339();
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(Self::log_file_name())?;
            file.write_all(format!("[{}] {}\n", timestamp, message).as_bytes())?;
            Ok(())
        })()
        .is_err()
        {
            // Silently fail to avoid infinite loops
        }
    }

    pub fn header(title: &str) {
        println!("\n{}", "━".repeat(70).cyan());
        println!("{}", format!("  {}", title).cyan().bold());
        println!("{}\n", "━".repeat(70).cyan());
        Self::write_to_file(&format!("HEADER: {}", title));
    }

    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
        Self::write_to_file(&format!("INFO: {}", message));
    }

    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
        Self::write_to_file(&format!("SUCCESS: {}", message));
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
        Self::write_to_file(&format!("WARNING: {}", message));
    }

    pub fn error(message: &str) {
        println!("{} {}", "✗".red(), message);
        Self::write_to_file(&format!("ERROR: {}", message));
    }

    pub fn separator() {
        println!("{}", "─".repeat(70).bright_black());
    }
}
