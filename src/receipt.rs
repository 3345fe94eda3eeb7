//! Receipt

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, iso::Currency};
use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::LineItem,
    checkout::OrderConfirmation,
    views::{format_money, free_shipping_progress},
};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable receipt for a placed order.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    confirmation: &'a OrderConfirmation,
    currency: &'static Currency,
}

impl<'a> Receipt<'a> {
    /// Create a receipt for a placed order.
    #[must_use]
    pub fn new(confirmation: &'a OrderConfirmation, currency: &'static Currency) -> Self {
        Receipt {
            confirmation,
            currency,
        }
    }

    /// Amount charged for the order.
    #[must_use]
    pub fn subtotal(&self) -> Money<'static, Currency> {
        Money::from_minor(self.confirmation.totals().subtotal, self.currency)
    }

    /// What the order would have cost at list prices.
    #[must_use]
    pub fn list_subtotal(&self) -> Money<'static, Currency> {
        let minor: i64 = self
            .confirmation
            .lines()
            .iter()
            .map(|line| line.product.price * i64::from(line.quantity))
            .sum();

        Money::from_minor(minor, self.currency)
    }

    /// Amount saved through sale prices.
    #[must_use]
    pub fn savings(&self) -> Money<'static, Currency> {
        let minor = self.list_subtotal().to_minor_units() - self.subtotal().to_minor_units();

        Money::from_minor(minor, self.currency)
    }

    /// Savings as a fraction of the list-price subtotal.
    #[must_use]
    pub fn savings_percent(&self) -> Percentage {
        let savings_minor = self.savings().to_minor_units();
        let list_minor = self.list_subtotal().to_minor_units();

        if list_minor == 0 {
            return Percentage::from(0.0);
        }

        let savings_dec = Decimal::from_i64(savings_minor).unwrap_or(Decimal::ZERO);
        let list_dec = Decimal::from_i64(list_minor).unwrap_or(Decimal::ZERO);

        Percentage::from(savings_dec / list_dec)
    }

    /// Total units on the order.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.confirmation.totals().count
    }

    /// Currency used for all monetary values.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Prints the receipt to the console.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be printed.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        push_receipt_header(&mut builder);

        let mut item_boundary_rows: SmallVec<[usize; 16]> = smallvec![];
        let mut color_ops: SmallVec<[(usize, usize, Color); 32]> = smallvec![];

        append_line_rows(
            self.confirmation.lines(),
            self.currency,
            &mut builder,
            &mut item_boundary_rows,
            &mut color_ops,
        );

        write_receipt_table(&mut out, builder, &item_boundary_rows, color_ops)?;

        write_receipt_summary(&mut out, self)?;

        Ok(())
    }
}

fn push_receipt_header(builder: &mut Builder) {
    builder.push_record([
        "",
        "Item",
        "Condition",
        "Qty",
        "List Price",
        "Sale Price",
        "Line Total",
    ]);
}

fn append_line_rows(
    lines: &[LineItem],
    currency: &'static Currency,
    builder: &mut Builder,
    item_boundary_rows: &mut SmallVec<[usize; 16]>,
    color_ops: &mut SmallVec<[(usize, usize, Color); 32]>,
) {
    for (line_idx, line) in lines.iter().enumerate() {
        // Header is row 0.
        let row = line_idx + 1;
        let product = &line.product;

        item_boundary_rows.push(row);

        let sale_price = if product.is_on_sale() {
            format_money(product.effective_price(), currency)
        } else {
            String::new()
        };

        builder.push_record([
            format!("#{:<3}", line_idx + 1),
            product.title.clone(),
            product.condition.clone(),
            line.quantity.to_string(),
            format_money(product.price, currency),
            sale_price.clone(),
            format_money(line.line_total(), currency),
        ]);

        color_ops.push((row, 2, color_dark_grey()));

        if !sale_price.is_empty() {
            color_ops.push((row, 5, Color::FG_GREEN));
        }
    }
}

fn write_receipt_table(
    out: &mut impl io::Write,
    builder: Builder,
    item_boundary_rows: &[usize],
    color_ops: SmallVec<[(usize, usize, Color); 32]>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    for &row in item_boundary_rows {
        if row > 1 {
            theme.insert_horizontal_line(row, separator);
        }
    }

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..7), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    receipt: &Receipt<'_>,
) -> Result<(), ReceiptError> {
    let savings = receipt.savings();
    let savings_percent_points = percent_points(receipt.savings_percent());

    let items_label = " Items:";
    let savings_label = " Savings:";
    let subtotal_label = " \x1b[1mSubtotal:\x1b[0m";

    let items_val = format!("{}  ", receipt.item_count());
    let savings_val = format!("({savings_percent_points:.2}%) {savings}  ");
    let subtotal_val = format!("{}  ", receipt.subtotal());

    let label_width = visible_width(items_label)
        .max(visible_width(savings_label))
        .max(visible_width(subtotal_label));

    let value_width = items_val
        .len()
        .max(savings_val.len())
        .max(subtotal_val.len());

    write_summary_line(out, items_label, &items_val, label_width, value_width)?;

    write_summary_line(out, savings_label, &savings_val, label_width, value_width)?;

    write_summary_line(
        out,
        subtotal_label,
        &format!("\x1b[1m{subtotal_val}\x1b[0m"),
        label_width,
        value_width,
    )?;

    writeln!(out).map_err(|_err| ReceiptError::IO)?;

    write_delivery_line(out, receipt)
}

fn write_delivery_line(out: &mut impl io::Write, receipt: &Receipt<'_>) -> Result<(), ReceiptError> {
    let progress = free_shipping_progress(receipt.subtotal().to_minor_units(), receipt.currency());

    if progress.qualified {
        writeln!(out, " Free delivery unlocked.").map_err(|_err| ReceiptError::IO)
    } else {
        writeln!(
            out,
            " Spend {} more to unlock free delivery.",
            progress.remaining
        )
        .map_err(|_err| ReceiptError::IO)
    }
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    // `Percentage` is a fraction (e.g. 0.25), so multiply by 100 to print percent points.
    ((percentage * Decimal::ONE) * Decimal::from_i64(100).unwrap_or(Decimal::ZERO)).round_dp(2)
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
///
/// Box-drawing characters occupy the Unicode range U+2500..U+257F. This function
/// scans each character, grouping consecutive border characters and emitting a
/// single grey escape sequence around each run, leaving cell content untouched.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_vis = visible_width(label);
    let value_vis = visible_width(value);

    // 2 chars of spacing between label and value column.
    let label_pad = label_col_width.saturating_sub(label_vis);
    let value_pad = value_col_width.saturating_sub(value_vis);

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
