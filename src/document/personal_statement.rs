//! Personal statements: one page-break-separated section per person, each
//! followed by a blank bank-detail block for that person to fill in.

use super::bank_form::push_bank_block;
use super::common::{
    close_page, escape_html, format_amount, format_exam_date, open_page, push_letterhead,
    push_signatures, BANK_FORM_STYLE, BASE_STYLE,
};
use super::DocumentContext;
use crate::bill::words::{amount_in_words, whole_rupees};
use crate::bill::{derive::parse_rate, Bill, Person, StaffPayment};

pub(super) fn render(bill: &Bill, ctx: &DocumentContext) -> String {
    let mut out = String::with_capacity(8 * 1024);
    open_page(&mut out, "Individual Bills", &[BASE_STYLE, BANK_FORM_STYLE]);

    for (group, person) in bill.persons() {
        push_statement(&mut out, bill, group, person, ctx);
    }

    close_page(&mut out);
    out
}

fn push_statement(
    out: &mut String,
    bill: &Bill,
    group: &StaffPayment,
    person: &Person,
    ctx: &DocumentContext,
) {
    let c = &bill.content;
    let date = format_exam_date(c.exam_start_time, ctx.utc_offset);
    let rate = escape_html(&person.rate);
    let base_amount = f64::from(c.present_students) * parse_rate(&person.rate);

    out.push_str("<section class=\"statement\" style=\"page-break-after: always;\">\n");
    push_letterhead(out, &ctx.letterhead);

    out.push_str(&format!(
        "<h3>{} Examination - Individual Bill ({})</h3>\n",
        c.exam_type.label(),
        escape_html(&c.exam_session)
    ));

    out.push_str("<div class=\"info-section\">\n");
    out.push_str(&format!("<p><b>Staff Name:</b> {}</p>\n", escape_html(&person.name)));
    out.push_str(&format!("<p><b>Role:</b> {}</p>\n", escape_html(&group.role)));
    out.push_str(&format!("<p><b>Department:</b> {}</p>\n", escape_html(&c.department)));
    out.push_str(&format!("<p><b>Class:</b> {}</p>\n", escape_html(&c.class_name)));
    out.push_str(&format!("<p><b>Subject:</b> {}</p>\n", escape_html(&c.subject)));
    out.push_str(&format!("<p><b>Semester:</b> {}</p>\n", c.semester));
    out.push_str(&format!("<p><b>Exam Date:</b> {}</p>\n", escape_html(&date)));
    out.push_str("</div>\n");

    out.push_str("<h3>Payment Details</h3>\n");
    out.push_str("<table>\n<tr><th>Particulars</th><th>Details</th><th>Amount (&#8377;)</th></tr>\n");
    out.push_str(&format!(
        "<tr><td>No. of Present Students</td><td>{}</td><td></td></tr>\n",
        c.present_students
    ));
    out.push_str(&format!(
        "<tr><td>Rate per Student</td><td>&#8377;{}</td><td></td></tr>\n",
        rate
    ));
    out.push_str(&format!(
        "<tr><td>Base Amount</td><td>{} &#215; &#8377;{}</td><td>&#8377;{}</td></tr>\n",
        c.present_students,
        rate,
        format_amount(base_amount)
    ));
    out.push_str(&format!(
        "<tr><td>Extra Allowance</td><td></td><td>&#8377;{}</td></tr>\n",
        format_amount(person.extra_allowance)
    ));
    out.push_str(&format!(
        "<tr class=\"total-row\"><td colspan=\"2\" style=\"text-align:right;\"><b>Total Amount</b></td><td><b>&#8377;{}</b></td></tr>\n</table>\n",
        format_amount(person.total_amount)
    ));

    out.push_str(&format!(
        "<p class=\"calculation\">{} &#215; {} + {} = {}</p>\n",
        c.present_students,
        rate,
        format_amount(person.extra_allowance),
        format_amount(person.total_amount)
    ));

    out.push_str("<div class=\"amount-section\">\n");
    out.push_str(&format!(
        "<p><b>(Amount in words):</b> {}</p>\n",
        amount_in_words(whole_rupees(person.total_amount))
    ));
    out.push_str("</div>\n");

    push_signatures(out, &["Staff Signature", "In Charge", "Principal"]);
    push_bank_block(out);
    out.push_str("</section>\n");
}
