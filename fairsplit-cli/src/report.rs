//! Text and HTML rendering of a fair-split calculation.

use std::fmt::Write as _;

use fairsplit_core::calculations::{Calculation, partner_summary};
use fairsplit_core::{FairSplitResult, JointTaxData, TaxPartner};
use rust_decimal::Decimal;

use crate::utils::{format_amount, format_factor};

/// Everything a report shows. Partner and joint records are the prepared
/// ones, so calculated-mode reports show the estimated amounts.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub tax_year: i32,
    pub partner_a: &'a TaxPartner,
    pub partner_b: &'a TaxPartner,
    pub joint_data: &'a JointTaxData,
    pub result: &'a FairSplitResult,
}

impl<'a> Report<'a> {
    pub fn new(
        tax_year: i32,
        calculation: &'a Calculation,
    ) -> Self {
        Self {
            tax_year,
            partner_a: &calculation.inputs.partner_a,
            partner_b: &calculation.inputs.partner_b,
            joint_data: &calculation.inputs.joint_data,
            result: &calculation.result,
        }
    }

    fn title(&self) -> String {
        format!(
            "Fair split for tax year {} ({} amounts)",
            self.tax_year,
            self.joint_data.calculation_mode.as_str()
        )
    }

    /// One row per figure, one column per partner.
    fn rows(&self) -> Vec<(&'static str, String, String)> {
        let a = self.partner_a;
        let b = self.partner_b;
        let mut rows = vec![
            ("Taxable income", format_amount(a.taxable_income), format_amount(b.taxable_income)),
            ("Tax class", a.tax_class.to_string(), b.tax_class.to_string()),
            ("Tax ID", tax_id(a), tax_id(b)),
            (
                "Work expenses",
                format_amount(a.income_related_expenses),
                format_amount(b.income_related_expenses),
            ),
            ("Special expenses", format_amount(a.special_expenses), format_amount(b.special_expenses)),
            (
                "Extraordinary costs",
                format_amount(a.extraordinary_expenses),
                format_amount(b.extraordinary_expenses),
            ),
            ("Child allowance", format_amount(a.child_allowance), format_amount(b.child_allowance)),
        ];

        if self.result.plausible {
            let (ra, rb) = (&self.result.partner_a, &self.result.partner_b);
            rows.extend([
                ("Individual tax", format_amount(ra.would_have_owed), format_amount(rb.would_have_owed)),
                ("Share of joint tax", format_factor(self.result.factor_a), format_factor(self.result.factor_b)),
                ("Must now pay", format_amount(ra.must_now_pay), format_amount(rb.must_now_pay)),
                ("Already paid", format_amount(ra.already_paid), format_amount(rb.already_paid)),
                ("Difference", format_amount(ra.difference), format_amount(rb.difference)),
            ]);
        } else {
            let (sa, sb) = (partner_summary(a), partner_summary(b));
            rows.extend([
                ("Individual tax", format_amount(sa.would_have_owed), format_amount(sb.would_have_owed)),
                ("Already paid", format_amount(sa.already_paid), format_amount(sb.already_paid)),
                ("Difference", format_amount(sa.difference), format_amount(sb.difference)),
            ]);
        }
        rows
    }

    /// Settlement sentences, one per partner. Empty for implausible results.
    fn settlements(&self) -> Vec<String> {
        if !self.result.plausible {
            return Vec::new();
        }
        vec![
            settlement(&self.partner_a.label(), self.result.partner_a.difference),
            settlement(&self.partner_b.label(), self.result.partner_b.difference),
        ]
    }

    pub fn render_text(&self) -> String {
        let title = self.title();
        let mut out = String::new();
        let _ = writeln!(out, "{title}");
        let _ = writeln!(out, "{}", "=".repeat(title.len()));
        let _ = writeln!(out);

        if let Some(error) = &self.result.plausibility_error {
            let _ = writeln!(out, "{error}");
            let _ = writeln!(out, "Stand-alone positions are shown instead.");
            let _ = writeln!(out);
        }

        let _ = writeln!(
            out,
            "{:<20}{:>16}{:>16}",
            "",
            self.partner_a.label(),
            self.partner_b.label()
        );
        for (label, a, b) in self.rows() {
            let _ = writeln!(out, "{label:<20}{a:>16}{b:>16}");
        }

        if self.result.plausible {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Joint taxable income: {}",
                format_amount(self.joint_data.joint_taxable_income)
            );
            let _ = writeln!(out, "Joint tax due: {}", format_amount(self.result.joint_tax_due));
            for line in self.settlements() {
                let _ = writeln!(out, "{line}");
            }
        }
        out
    }

    /// A self-contained HTML document.
    pub fn render_html(&self) -> String {
        let title = escape_html(&self.title());
        let mut out = String::new();
        let _ = writeln!(out, "<!DOCTYPE html>");
        let _ = writeln!(out, "<html lang=\"en\">");
        let _ = writeln!(out, "<head>");
        let _ = writeln!(out, "<meta charset=\"utf-8\">");
        let _ = writeln!(out, "<title>{title}</title>");
        let _ = writeln!(
            out,
            "<style>body{{font-family:sans-serif;margin:2em}}table{{border-collapse:collapse}}\
             th,td{{border:1px solid #ccc;padding:.3em .8em}}td.num{{text-align:right}}\
             .error{{color:#a00}}</style>"
        );
        let _ = writeln!(out, "</head>");
        let _ = writeln!(out, "<body>");
        let _ = writeln!(out, "<h1>{title}</h1>");

        if let Some(error) = &self.result.plausibility_error {
            let _ = writeln!(out, "<p class=\"error\">{}</p>", escape_html(error));
        }

        let _ = writeln!(out, "<table>");
        let _ = writeln!(
            out,
            "<tr><th></th><th>{}</th><th>{}</th></tr>",
            escape_html(&self.partner_a.label()),
            escape_html(&self.partner_b.label())
        );
        for (label, a, b) in self.rows() {
            let _ = writeln!(
                out,
                "<tr><th>{label}</th><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
                escape_html(&a),
                escape_html(&b)
            );
        }
        let _ = writeln!(out, "</table>");

        if self.result.plausible {
            let _ = writeln!(
                out,
                "<p>Joint tax due: <strong>{}</strong></p>",
                format_amount(self.result.joint_tax_due)
            );
            let _ = writeln!(out, "<ul>");
            for line in self.settlements() {
                let _ = writeln!(out, "<li>{}</li>", escape_html(&line));
            }
            let _ = writeln!(out, "</ul>");
        }

        let _ = writeln!(out, "</body>");
        let _ = writeln!(out, "</html>");
        out
    }
}

fn tax_id(partner: &TaxPartner) -> String {
    match partner.tax_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => "not provided".to_string(),
    }
}

fn settlement(
    label: &str,
    difference: Decimal,
) -> String {
    if difference > Decimal::ZERO {
        format!("{label} pays {} more.", format_amount(difference))
    } else if difference < Decimal::ZERO {
        format!("{label} is owed {}.", format_amount(-difference))
    } else {
        format!("{label} is settled.")
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
