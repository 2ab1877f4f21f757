//! Blank bank-detail form, standalone or embedded in a personal statement.

use super::common::{close_page, open_page, BANK_FORM_STYLE, BASE_STYLE};

const FIELDS: [&str; 8] = [
    "Name of Account Holder :",
    "Bank Name :",
    "Account No :",
    "IFSC Code :",
    "Mobile No :",
    "Amount :",
    "Amount in Words:",
    "Nature of Payment(Optional) :",
];

pub(super) fn render() -> String {
    let mut out = String::with_capacity(4 * 1024);
    open_page(&mut out, "Bank Details Form", &[BASE_STYLE, BANK_FORM_STYLE]);
    push_bank_block(&mut out);
    close_page(&mut out);
    out
}

pub(super) fn push_bank_block(out: &mut String) {
    out.push_str("<div class=\"bank-form\">\n<h1>BANK DETAILS</h1>\n");
    for label in FIELDS {
        out.push_str(&format!(
            "<div class=\"form-row\"><span class=\"label\">{}</span><div class=\"line\"></div></div>\n",
            label
        ));
    }
    out.push_str("<div class=\"signature-row\"><span class=\"signature-label\">Signature:</span><div class=\"signature-line\"></div></div>\n");
    out.push_str("</div>\n");
}
