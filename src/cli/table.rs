//! Tabular list output
//!
//! Lists print as TSV (a bold header row, then one line per record) or as a
//! boxed table rendered by `tabled`.

use console::style;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

/// Rows collected for a list command
#[derive(Debug, Clone)]
pub struct Listing {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Listing {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing trailing cells print empty
    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn padded(&self, row: &[String]) -> Vec<String> {
        (0..self.headers.len())
            .map(|i| row.get(i).cloned().unwrap_or_default())
            .collect()
    }

    /// Tab-separated text, header first, newline-terminated
    pub fn render_tsv(&self) -> String {
        let mut out = self.headers.join("\t");
        out.push('\n');
        for row in &self.rows {
            out.push_str(&self.padded(row).join("\t"));
            out.push('\n');
        }
        out
    }

    pub fn render_table(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers.clone());
        for row in &self.rows {
            builder.push_record(self.padded(row));
        }
        let mut table = builder.build();
        table.with(Style::rounded());
        table.to_string()
    }

    /// Print in the tabular `format`, followed by a count line
    pub fn print(&self, format: OutputFormat, noun: &str) {
        match format {
            OutputFormat::Table => println!("{}", self.render_table()),
            _ => {
                let header: Vec<String> = self
                    .headers
                    .iter()
                    .map(|h| style(h).bold().to_string())
                    .collect();
                println!("{}", header.join("\t"));
                for row in &self.rows {
                    println!("{}", self.padded(row).join("\t"));
                }
            }
        }
        println!();
        println!("{} {}(s) found", style(self.len()).cyan(), noun);
    }
}
