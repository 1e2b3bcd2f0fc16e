//! `comparators`: print the comparator table.

use clap::Args;
use gd_filters::{ComparatorRule, ComparatorTable, FilterType};

use crate::output::{self, OutputFormat};

/// Arguments for the comparators command
#[derive(Debug, Args)]
pub struct ComparatorsArgs {
    /// Only this filter type, e.g. `range-date`
    #[arg(short = 't', long)]
    pub filter_type: Option<FilterType>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Execute the comparators command
pub fn execute(args: &ComparatorsArgs, table: &ComparatorTable) -> anyhow::Result<()> {
    let rules: Vec<&ComparatorRule> = table
        .rules()
        .iter()
        .filter(|rule| args.filter_type.map_or(true, |t| rule.filter_type == t))
        .collect();

    match args.format {
        OutputFormat::Json => output::print_json(&rules)?,
        OutputFormat::Table => {
            if rules.is_empty() {
                println!("No comparators found.");
            }
            for line in table_lines(table, &rules) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn table_lines(table: &ComparatorTable, rules: &[&ComparatorRule]) -> Vec<String> {
    rules
        .iter()
        .map(|rule| {
            let default = table.default_comparator(rule.filter_type) == Some(rule.comparator);
            format!(
                "{:<14} {:<22} {:<14}{}",
                rule.filter_type.as_str(),
                rule.comparator.as_str(),
                rule.value_type.to_string(),
                if default { " (default)" } else { "" }
            )
            .trim_end()
            .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lines_mark_default() {
        let table = ComparatorTable::standard();
        let rules: Vec<&ComparatorRule> = table
            .rules()
            .iter()
            .filter(|r| r.filter_type == FilterType::RangeDate)
            .collect();
        let lines = table_lines(&table, &rules);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("range-date"));
        assert!(lines[0].ends_with("(default)"));
        assert!(!lines[1].ends_with("(default)"));
    }
}
