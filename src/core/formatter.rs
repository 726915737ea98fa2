use crate::core::models::cost::CostReport;

const TOTAL_LABEL: &str = "Total";
const EMPTY_LINE: &str = "No costs recorded.";

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency.to_ascii_uppercase().as_str() {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" => Some("¥"),
        _ => None,
    }
}

/// Inserts thousands separators into a string of ASCII digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Returns "$1,234.50", "-$3.20", or "12.00 CHF" for codes without a symbol.
pub fn format_amount(amount: f64, currency: &str) -> String {
    let rounded = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let number = format!("{}.{}", group_thousands(int_part), frac_part);
    // -0.001 prints as 0.00, so it gets no sign either
    let sign = if amount < 0.0 && rounded != "0.00" { "-" } else { "" };

    match currency_symbol(currency) {
        Some(symbol) => format!("{}{}{}", sign, symbol, number),
        None => format!("{}{} {}", sign, number, currency.to_ascii_uppercase()),
    }
}

/// Render a report as a plain-text chat message.
///
/// Layout:
/// ```text
/// Daily cost report: my-team (2024-03-14)
///
/// EC2    $120.50
/// S3      $40.00
/// Other   $15.25
///
/// Total  $175.75
/// ```
pub fn format_message(report: &CostReport) -> String {
    let rows: Vec<(&str, String)> = report
        .groups
        .iter()
        .map(|g| (g.key.as_str(), format_amount(g.amount, &g.currency)))
        .collect();
    let total = format_amount(report.total, &report.currency);

    let name_width = rows
        .iter()
        .map(|(key, _)| key.chars().count())
        .chain(std::iter::once(TOTAL_LABEL.len()))
        .max()
        .unwrap_or(0);
    let amount_width = rows
        .iter()
        .map(|(_, amount)| amount.chars().count())
        .chain(std::iter::once(total.chars().count()))
        .max()
        .unwrap_or(0);

    let mut lines: Vec<String> = Vec::with_capacity(rows.len() + 4);
    lines.push(format!(
        "Daily cost report: {} ({})",
        report.account,
        report.date.format("%Y-%m-%d")
    ));
    lines.push(String::new());

    if rows.is_empty() {
        lines.push(EMPTY_LINE.to_string());
    }
    for (key, amount) in &rows {
        lines.push(format!(
            "{:<nw$}  {:>aw$}",
            key,
            amount,
            nw = name_width,
            aw = amount_width
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "{:<nw$}  {:>aw$}",
        TOTAL_LABEL,
        total,
        nw = name_width,
        aw = amount_width
    ));

    lines.join("\n")
}
