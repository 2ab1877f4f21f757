//! Bodies for the passcode emails.

use crate::auth::model::{Role, User};
use crate::document::common::escape_html;
use crate::mail::OutgoingMail;
use crate::otp::OTP_TTL_MINUTES;

pub fn login_otp(user: &User, code: &str) -> OutgoingMail {
    let text = format!(
        "Hello {},\n\nYour OTP code for accessing the Staff Remuneration System is: {}\n\
         This OTP is valid for {} minutes.\nIf you did not request this, please ignore this email.\n\n\
         Regards,\nStaff Remuneration Team",
        user.name, code, OTP_TTL_MINUTES
    );

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; line-height: 1.5; color: #333; text-align: center;">
  <h2 style="margin:0; color:#1a73e8;">MODERN COLLEGE OF ARTS, SCIENCE, AND COMMERCE</h2>
  <h4 style="margin:0; font-weight:normal;">(AUTONOMOUS)</h4>
  <p style="margin:0 0 15px 0;">GANESHKHIND, PUNE - 411016</p>
  <p>Hello <strong>{name}</strong>,</p>
  <p>Your OTP code for accessing the Staff Remuneration System is:</p>
  <h1 style="color: #1a73e8; font-size: 32px; margin: 10px 0;">{code}</h1>
  <p>This OTP is valid for {ttl} minutes.</p>
  <p>If you did not request this, please ignore this email.</p>
  <hr style="margin:20px 0; border:none; border-top:1px solid #ccc;" />
  <p>Regards,<br/>Staff Remuneration Team</p>
</div>"#,
        name = escape_html(&user.name),
        code = code,
        ttl = OTP_TTL_MINUTES,
    );

    OutgoingMail::new(&user.email, "Your OTP Code", text).with_html(html)
}

pub fn password_reset_otp(user: &User, code: &str) -> OutgoingMail {
    let role = match user.role {
        Role::Admin => "Administrator",
        Role::Teacher => "Teacher",
    };

    let text = format!(
        "Dear {},\n\nYou have requested to reset your password for the Modern College Exam Staff \
         Remuneration System.\nEmail: {}\nRole: {}\n\nYour OTP is: {}\n\
         This OTP is valid for {} minutes only. Do not share this code with anyone.",
        user.name, user.email, role, code, OTP_TTL_MINUTES
    );

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto;">
  <div style="text-align: center; border-bottom: 2px solid #1a237e; padding-bottom: 15px;">
    <div style="color: #1a237e; font-size: 18px; font-weight: bold;">Modern College of Arts, Science and Commerce</div>
    <div style="color: #666; font-size: 14px;">Ganeshkhind, Pune-16</div>
  </div>
  <h2>Password Reset Request</h2>
  <p>Dear {name},</p>
  <p>You have requested to reset your password for the Modern College Exam Staff Remuneration System.</p>
  <ul>
    <li>Email: {email}</li>
    <li>Role: {role}</li>
  </ul>
  <p>Please use the following OTP to reset your password:</p>
  <div style="background: #f3f4f6; border: 2px dashed #1a237e; padding: 15px; text-align: center; font-size: 24px; font-weight: bold; color: #1a237e;">{code}</div>
  <p><strong>Important:</strong> This OTP is valid for {ttl} minutes only. Do not share this code with anyone.</p>
  <p>If you did not request a password reset, please ignore this email or contact the system administrator immediately.</p>
</div>"#,
        name = escape_html(&user.name),
        email = escape_html(&user.email),
        role = role,
        code = code,
        ttl = OTP_TTL_MINUTES,
    );

    OutgoingMail::new(&user.email, "Password Reset OTP - Modern College", text).with_html(html)
}
