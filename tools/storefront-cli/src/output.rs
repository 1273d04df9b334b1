//! Output formatting for the CLI.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use storefront_commerce::cart::{CartLineItem, OrderTotals};
use storefront_commerce::checkout::CheckoutState;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(&self, item: &str) {
        if self.json {
            return;
        }
        println!("  {} {}", style("•").dim(), item);
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Print cart lines as a table.
    pub fn line_items(&self, items: &[CartLineItem]) {
        const WIDTHS: [usize; 5] = [3, 6, 28, 5, 12];
        self.table_row(&["", "ID", "NAME", "QTY", "LINE TOTAL"], &WIDTHS);
        for item in items {
            let mark = if item.selected { "[x]" } else { "[ ]" };
            let total = item
                .line_total()
                .map(|m| m.display())
                .unwrap_or_else(|_| "overflow".to_string());
            self.table_row(
                &[
                    mark,
                    &item.id.to_string(),
                    &item.name,
                    &item.qty.to_string(),
                    &total,
                ],
                &WIDTHS,
            );
        }
    }

    /// Print a totals breakdown.
    pub fn totals(&self, totals: &OrderTotals) {
        self.kv("Subtotal", &totals.subtotal.display());
        self.kv("Shipping", &totals.shipping.display());
        self.kv("Tax", &totals.tax.display());
        if !self.json {
            println!(
                "  {}: {}",
                style("Total").bold(),
                style(totals.grand_total.display()).bold()
            );
        }
    }

    /// Create a spinner for indeterminate progress.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) =
            ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
        {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Colored label for a checkout state.
pub fn state_badge(state: CheckoutState) -> String {
    let label = state.as_str();
    match state {
        CheckoutState::PaymentSucceeded | CheckoutState::CartCleaned => {
            style(label).green().to_string()
        }
        CheckoutState::OrderCreating | CheckoutState::PaymentPending => {
            style(label).yellow().to_string()
        }
        CheckoutState::InsufficientFunds | CheckoutState::PaymentFailed => {
            style(label).red().to_string()
        }
        CheckoutState::Idle | CheckoutState::Done => style(label).dim().to_string(),
        _ => label.to_string(),
    }
}
