//! Interactive prompts for the add, edit and remove forms
//!
//! Choices come from the category's field rules: a rule with several
//! values becomes a select list (with an "Other..." entry when the rule is
//! open), a single closed value is filled in without asking, and fields
//! without a rule are free text.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};
use std::io::IsTerminal;

use crate::core::item::LineItem;
use crate::core::schema::CategorySchema;
use crate::core::validate::{parse_quantity, ItemInput};

const OTHER: &str = "Other...";

/// True if stdin is attached to a terminal
pub fn stdin_is_interactive() -> bool {
    std::io::stdin().is_terminal()
}

/// Prompts for one category's forms
pub struct StockWizard<'a> {
    schema: &'a CategorySchema,
    theme: ColorfulTheme,
}

impl<'a> StockWizard<'a> {
    pub fn new(schema: &'a CategorySchema) -> Self {
        Self {
            schema,
            theme: ColorfulTheme::default(),
        }
    }

    /// Prompt for every field in order, using current values as defaults
    pub fn fill_item(&self, input: &mut ItemInput) -> Result<()> {
        for field in self.schema.field_names() {
            let value = self.prompt_field(field, input)?;
            input.set(self.schema, field, value);
        }
        Ok(())
    }

    fn prompt_field(&self, field: &str, input: &ItemInput) -> Result<String> {
        let label = self.schema.label_for(field).unwrap_or(field);
        let current = input.get(self.schema, field).unwrap_or("").trim().to_string();

        let rule = self.schema.rule_for(field, |upstream| {
            input
                .get(self.schema, upstream)
                .map(str::trim)
                .filter(|v| !v.is_empty())
        });

        let Some(rule) = rule else {
            return self.prompt_text(label, &current, field == "expiry");
        };

        if rule.is_fixed() {
            let value = rule.values[0].to_string();
            println!("  {}: {}", style(label).cyan(), style(&value).dim());
            return Ok(value);
        }

        let mut items: Vec<&str> = rule.values.to_vec();
        if rule.open {
            items.push(OTHER);
        }
        let default_idx = items
            .iter()
            .position(|v| *v == current)
            .or_else(|| (rule.open && !current.is_empty()).then(|| items.len() - 1))
            .unwrap_or(0);

        let selection = Select::with_theme(&self.theme)
            .with_prompt(label)
            .items(&items)
            .default(default_idx)
            .interact()
            .into_diagnostic()?;

        if items[selection] == OTHER {
            self.prompt_text(label, &current, false)
        } else {
            Ok(items[selection].to_string())
        }
    }

    fn prompt_text(&self, label: &str, current: &str, is_date: bool) -> Result<String> {
        let prompt = if is_date {
            format!("{} (YYYY-MM-DD)", label)
        } else {
            label.to_string()
        };
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if !current.is_empty() {
            input = input.default(current.to_string());
        }
        input.interact_text().into_diagnostic()
    }

    /// Prompt for an amount to take from each batch, bounded by its qty
    pub fn removal_amounts(&self, members: &[LineItem]) -> Result<Vec<u32>> {
        let mut amounts = Vec::with_capacity(members.len());
        for (idx, member) in members.iter().enumerate() {
            let available = member.qty;
            let text: String = Input::with_theme(&self.theme)
                .with_prompt(format!("Batch {} ({}) remove", idx + 1, member.batch_label()))
                .default("0".to_string())
                .validate_with(move |text: &String| -> std::result::Result<(), String> {
                    match parse_quantity(text) {
                        Ok(n) if n <= available => Ok(()),
                        Ok(_) => Err(format!("only {} in stock", available)),
                        Err(e) => Err(e.to_string()),
                    }
                })
                .interact_text()
                .into_diagnostic()?;
            amounts.push(parse_quantity(&text).into_diagnostic()?);
        }
        Ok(amounts)
    }
}

/// Ask "Proceed? [y/N]" unless `yes` was given
pub fn confirm(yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    print!("Proceed? [y/N] ");
    std::io::Write::flush(&mut std::io::stdout()).into_diagnostic()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input).into_diagnostic()?;
    Ok(input.trim().eq_ignore_ascii_case("y") || input.trim().eq_ignore_ascii_case("yes"))
}
