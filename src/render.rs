//! HTML page and terminal table output.

use crate::types::{ComparisonTable, Dimension};
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Table};

const FONT_FAMILY: &str = "Arial, sans-serif";
const FONT_SIZE: &str = "16px";

/// What the form currently shows.
pub struct PageModel<'a> {
    pub dimensions: &'a [Dimension],
    pub postcode: &'a str,
    pub selected_dimension: Option<&'a str>,
    pub table: Option<&'a ComparisonTable>,
}

pub fn render_page(model: &PageModel<'_>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>2021 Census results by postcode</title>
    <style>{css}</style>
</head>
<body>
    <h1>Enter a postcode below to see 2021 Census results for the associated Lower Super Output Area (LSOA)</h1>
    <p>Note: LSOAs are small geographic areas of 1,500 people on average. There are 33,755 LSOAs in England.</p>
    <form method="get" action="/">
        <input id="postcode" name="postcode" type="text" value="{postcode}">
        <h1>Choose variable here</h1>
        <select id="dimension" name="dimension" onchange="this.form.submit()">
{options}
        </select>
        <br><br>
        <button type="submit">Submit</button>
    </form>
    <br>
{table}
    <br>
    <p class="note">These are estimates from the Office of National Statistics (ONS) as of Census day March 21 2021.</p>
    <p class="note">For statistical disclosure control, the ONS has made small changes to some small counts.</p>
</body>
</html>"#,
        css = inline_css(),
        postcode = escape(model.postcode),
        options = render_options(model.dimensions, model.selected_dimension),
        table = render_table(model.table),
    )
}

fn inline_css() -> String {
    format!(
        "body, h1, p, input, select, button, table {{ font-family: {FONT_FAMILY}; font-size: {FONT_SIZE}; }}\n\
         h1 {{ font-weight: normal; }}\n\
         p.note {{ font-size: 13px; }}\n\
         table {{ border-collapse: collapse; }}\n\
         th, td {{ border: 1px solid #ccc; padding: 4px 8px; }}\n\
         td.num {{ text-align: right; }}"
    )
}

fn render_options(dimensions: &[Dimension], selected: Option<&str>) -> String {
    // Without an explicit choice the first entry is the default
    let selected = selected.or_else(|| dimensions.first().map(|d| d.id.as_str()));

    dimensions
        .iter()
        .map(|d| {
            let marker = if Some(d.id.as_str()) == selected {
                " selected"
            } else {
                ""
            };
            format!(
                r#"            <option value="{}"{}>{}</option>"#,
                escape(&d.id),
                marker,
                escape(&d.label)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_table(table: Option<&ComparisonTable>) -> String {
    let (columns, rows) = match table {
        Some(table) => (&table.columns[..], &table.rows[..]),
        None => (&[][..], &[][..]),
    };

    let mut html = String::from("    <table id=\"output\">\n        <thead><tr>");
    for column in columns {
        html.push_str(&format!("<th>{}</th>", escape(column)));
    }
    html.push_str("</tr></thead>\n        <tbody>\n");

    for row in rows {
        html.push_str(&format!(
            "            <tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>\n",
            escape(&row.category),
            row.area_count,
            escape(&row.area_share),
            escape(&row.reference_share),
        ));
    }

    html.push_str("        </tbody>\n    </table>");
    html
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Plain-text rendering for the `compare` command.
pub fn render_terminal_table(table: &ComparisonTable) -> String {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL);
    out.set_header(table.columns.iter().map(Cell::new));

    for row in &table.rows {
        out.add_row(vec![
            Cell::new(&row.category),
            Cell::new(row.area_count).set_alignment(CellAlignment::Right),
            Cell::new(&row.area_share).set_alignment(CellAlignment::Right),
            Cell::new(&row.reference_share).set_alignment(CellAlignment::Right),
        ]);
    }

    out.to_string()
}
