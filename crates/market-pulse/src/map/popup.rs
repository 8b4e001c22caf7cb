use market_pulse_data::ClinicPoint;

/// Escape text for use inside HTML content or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Popup shown when a clinic marker is clicked.
pub fn popup_html(point: &ClinicPoint) -> String {
    let mut html = format!(
        r#"<div style="min-width:220px"><div style="font-weight:700">{}</div>"#,
        escape_html(&point.name)
    );
    if let Some(address) = &point.address {
        html.push_str(&format!(
            r#"<div style="margin-top:6px; color:#b7c3e6">{}</div>"#,
            escape_html(address)
        ));
    }

    let links: Vec<String> = [("Website", &point.website), ("Google Maps", &point.gmaps)]
        .into_iter()
        .filter_map(|(label, href)| {
            href.as_ref().map(|href| {
                format!(
                    r#"<a href="{}" target="_blank" rel="noreferrer">{label}</a>"#,
                    escape_html(href)
                )
            })
        })
        .collect();
    if !links.is_empty() {
        html.push_str(&format!(
            r#"<div style="margin-top:8px; display:flex; gap:10px; flex-wrap:wrap">{}</div>"#,
            links.join(" ")
        ));
    }
    html.push_str("</div>");
    html
}
