use std::fmt::Write;

use crate::notification::Notification;

const GENERATED_AT_FORMAT: &str = "%B %-d, %Y at %-I:%M %p UTC";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

pub fn report_subject(report_id: &str) -> String {
    if report_id.is_empty() {
        "Investigation Report".to_string()
    } else {
        format!("Investigation Report {report_id}")
    }
}

pub fn render_report(n: &Notification) -> String {
    let mut html = String::new();
    html.push_str(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"UTF-8\"><title>Investigation Report</title></head>\n\
         <body style=\"font-family: Arial, sans-serif; line-height: 1.6; color: #333;\">\n\
         <div style=\"max-width: 640px; margin: 0 auto; padding: 24px;\">\n\
         <h2 style=\"color: #2c3e50;\">Investigation Report</h2>\n",
    );

    let name = n.tenant_name.trim();
    if name.is_empty() {
        html.push_str("<p>Hello,</p>\n");
    } else {
        let _ = writeln!(html, "<p>Hello {},</p>", escape_html(name));
    }
    html.push_str(
        "<p>A heartbeat investigation completed. Here is a summary of what we found.</p>\n",
    );

    let summary = n.record.summary.trim();
    if !summary.is_empty() {
        let _ = writeln!(
            html,
            "<div style=\"background-color: #f8f9fa; padding: 16px; border-radius: 6px; margin: 20px 0;\">\
             <strong>Summary</strong><p style=\"margin: 10px 0 0 0;\">{}</p></div>",
            escape_html(summary)
        );
    }

    let metrics: Vec<&str> = n.metrics().collect();
    if !metrics.is_empty() {
        html.push_str("<h3 style=\"color: #2c3e50; margin-top: 30px;\">Key Metrics</h3>\n<ul>\n");
        for metric in metrics {
            let _ = writeln!(html, "<li><strong>{}</strong></li>", escape_html(metric));
        }
        html.push_str("</ul>\n");
    }

    let mut recs = n.recommendations().peekable();
    if recs.peek().is_some() {
        html.push_str(
            "<h3 style=\"color: #2c3e50; margin-top: 30px;\">Recommendations</h3>\n<ul style=\"padding-left: 20px;\">\n",
        );
        for rec in recs {
            let _ = write!(html, "<li style=\"margin-bottom: 12px;\"><strong>{}</strong>", escape_html(rec.text.trim()));
            let confidence = rec.confidence.trim();
            if !confidence.is_empty() {
                let _ = write!(html, " <span style=\"color: #e67e22;\">({})</span>", escape_html(confidence));
            }
            html.push_str("</li>\n");
        }
        html.push_str("</ul>\n");
    }

    let _ = writeln!(
        html,
        "<p style=\"color: #6c757d; font-size: 12px;\">Generated at {}</p>",
        n.generated_at().format(GENERATED_AT_FORMAT)
    );

    let url = n.report_url.trim();
    if !url.is_empty() {
        let _ = writeln!(
            html,
            "<p style=\"text-align: center; margin: 30px 0;\"><a href=\"{}\" \
             style=\"background-color: #3498db; color: white; padding: 12px 24px; text-decoration: none; border-radius: 5px; display: inline-block;\">\
             View Full Report</a></p>",
            escape_html(url)
        );
    }

    html.push_str("<p>If you have questions, reply to this email.</p>\n</div>\n</body>\n</html>\n");
    html
}
