//! Display formatting shared by the tools

/// Rupee amount with Indian digit grouping, e.g. `₹1,00,000.00`
pub fn currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let paise = (amount.abs() * 100.0).round() as u128;
    format!(
        "{sign}₹{}.{:02}",
        group_indian(&(paise / 100).to_string()),
        paise % 100
    )
}

/// Two-decimal percentage, e.g. `40.00%`
pub fn percentage(value: f64) -> String {
    format!("{value:.2}%")
}

/// Whole count with Indian digit grouping
pub fn count(value: usize) -> String {
    group_indian(&value.to_string())
}

/// Number without a trailing `.0` for whole values
pub fn number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Plural suffix for English counts
pub fn plural(n: u64, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// Group digits as 12,34,567: last three, then pairs
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (front, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = front;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}
