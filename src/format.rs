use crate::error::Result;
use crate::types::Indicator;

pub const TABLE_COLUMNS: [&str; 4] = ["lasttime", "indicator", "confidence", "description"];

fn cell(indicator: &Indicator, column: &str) -> String {
    match column {
        "lasttime" => indicator.lasttime.clone(),
        "indicator" => indicator.indicator.clone(),
        "confidence" => indicator.confidence.to_string(),
        "description" => indicator.description.clone(),
        "tags" => indicator.tags.clone(),
        "itype" => indicator.itype.clone(),
        "provider" => indicator.provider.clone(),
        _ => String::new(),
    }
}

/// Render indicators as a plain text table, one string per line.
pub fn table_lines<'a, I>(indicators: I, columns: &[&str]) -> Vec<String>
where
    I: IntoIterator<Item = &'a Indicator>,
{
    let rows: Vec<Vec<String>> = indicators
        .into_iter()
        .map(|i| columns.iter().map(|c| cell(i, c)).collect())
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }

    let render = |values: &[String]| -> String {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let header: Vec<String> = columns.iter().map(|c| c.to_string()).collect();

    let mut lines = Vec::with_capacity(rows.len() + 4);
    lines.push(border.clone());
    lines.push(render(&header));
    lines.push(border.clone());
    lines.extend(rows.iter().map(|r| render(r)));
    lines.push(border);
    lines
}

/// One JSON object per indicator.
pub fn json_lines<'a, I>(indicators: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'a Indicator>,
{
    indicators
        .into_iter()
        .map(|i| serde_json::to_string(i).map_err(Into::into))
        .collect()
}
