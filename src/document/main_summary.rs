//! Main bill: the examination report with batch and staff tables.

use super::common::{
    close_page, escape_html, format_amount, format_exam_date, open_page, push_letterhead,
    push_signatures, BASE_STYLE,
};
use super::DocumentContext;
use crate::bill::Bill;

pub(super) fn render(bill: &Bill, ctx: &DocumentContext) -> String {
    let c = &bill.content;
    let exam_type = c.exam_type.label();
    let date = format_exam_date(c.exam_start_time, ctx.utc_offset);

    let mut out = String::with_capacity(8 * 1024);
    open_page(&mut out, "Examination Report", &[BASE_STYLE]);
    push_letterhead(&mut out, &ctx.letterhead);

    out.push_str(&format!(
        "<h3>{} Examination Report ({})</h3>\n",
        exam_type,
        escape_html(&c.exam_session)
    ));

    out.push_str("<div class=\"info-section\">\n");
    out.push_str(&format!(
        "<p><b>1) Name of the Department:</b> {}</p>\n",
        escape_html(&c.department)
    ));
    out.push_str(&format!("<p><b>2) Class:</b> {}</p>\n", escape_html(&c.class_name)));
    out.push_str(&format!(
        "<p><b>3) Total No. of present students:</b> {}</p>\n",
        c.present_students
    ));
    out.push_str(&format!(
        "<p><b>4) Total No. of batches:</b> {}</p>\n",
        c.total_batches
    ));
    out.push_str(&format!(
        "<p><b>5) Duration of {} exam per batch:</b> {} hrs</p>\n",
        exam_type,
        format_amount(c.duration_per_batch)
    ));
    out.push_str(&format!("<p><b>Date :</b> {}</p>\n", escape_html(&date)));
    out.push_str(&format!("<p><b>Subject :</b> {}</p>\n", escape_html(&c.subject)));
    if let Some(paper_no) = &c.paper_no {
        out.push_str(&format!("<p><b>Paper No. :</b> {}</p>\n", escape_html(paper_no)));
    }
    out.push_str("</div>\n");

    // Batch table: one column per batch plus the total
    out.push_str("<table class=\"batches\">\n<tr><th>Batch No</th>");
    for batch in &c.batches {
        out.push_str(&format!("<th>{}</th>", escape_html(&batch.batch_no)));
    }
    out.push_str("<th>Total</th></tr>\n<tr><td>No. of Students Present</td>");
    for batch in &c.batches {
        out.push_str(&format!("<td>{}</td>", batch.students_present));
    }
    out.push_str(&format!("<td>{}</td></tr>\n</table>\n", c.present_students));

    out.push_str("<h3>6) Statement of Staff Appointed and Remuneration Paid</h3>\n");
    out.push_str("<table class=\"staff\">\n<tr><th>Sr. No.</th><th>Particulars</th><th>Name</th><th>Rate (&#8377;) + Allowance</th><th>Total Amount (&#8377;)</th></tr>\n");
    for (i, group) in c.staff_payments.iter().enumerate() {
        for (j, person) in group.persons.iter().enumerate() {
            let (sr_no, role) = if j == 0 {
                ((i + 1).to_string(), escape_html(&group.role))
            } else {
                (String::new(), String::new())
            };
            out.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{} + {}</td><td>{}</td></tr>\n",
                sr_no,
                role,
                escape_html(&person.name),
                escape_html(&person.rate),
                format_amount(person.extra_allowance),
                format_amount(person.total_amount)
            ));
        }
    }
    out.push_str(&format!(
        "<tr class=\"total-row\"><td colspan=\"4\" style=\"text-align:right;\"><b>Total</b></td><td><b>{}</b></td></tr>\n</table>\n",
        format_amount(c.total_amount)
    ));

    out.push_str("<div class=\"amount-section\">\n");
    out.push_str(&format!(
        "<p><b>Balance Payable:</b> &#8377;{:.2} = &#8377;{}/-</p>\n",
        c.balance_payable,
        format_amount(c.balance_payable)
    ));
    out.push_str(&format!(
        "<p><b>(Amount in words):</b> {}</p>\n",
        escape_html(&c.amount_in_words)
    ));
    out.push_str("</div>\n");

    push_signatures(&mut out, &["In Charge", "Vice Principal", "Principal"]);
    close_page(&mut out);
    out
}
