//! Amount-in-words on the Indian numbering scale (crore / lakh / thousand /
//! hundred), as printed on remuneration statements.

/// Returned for amounts with more than nine digits.
pub const OVERFLOW: &str = "Overflow";

/// Largest amount that can be transcribed.
pub const MAX_AMOUNT: u64 = 999_999_999;

const ONES: [&str; 10] = [
    "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];

const TEENS: [&str; 10] = [
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const SCALES: [(u64, &str); 4] = [
    (10_000_000, "Crore"),
    (100_000, "Lakh"),
    (1_000, "Thousand"),
    (100, "Hundred"),
];

/// `1850` becomes `"One Thousand Eight Hundred Fifty Only"`, `0` becomes
/// `"Zero Only"`, anything above [`MAX_AMOUNT`] becomes [`OVERFLOW`].
pub fn amount_in_words(amount: u64) -> String {
    match to_words(amount) {
        Some(words) => format!("{} Only", words),
        None => OVERFLOW.to_string(),
    }
}

/// Words without the `" Only"` suffix, or `None` past nine digits.
pub fn to_words(amount: u64) -> Option<String> {
    if amount > MAX_AMOUNT {
        return None;
    }
    if amount == 0 {
        return Some("Zero".to_string());
    }
    Some(spell(amount))
}

/// Rupee amount used for transcription: rounded to the nearest whole rupee,
/// negatives and non-finite values treated as zero.
pub fn whole_rupees(amount: f64) -> u64 {
    if amount.is_finite() && amount > 0.0 {
        amount.round() as u64
    } else {
        0
    }
}

fn spell(n: u64) -> String {
    if n < 10 {
        return ONES[n as usize].to_string();
    }
    if n < 20 {
        return TEENS[(n - 10) as usize].to_string();
    }
    if n < 100 {
        let tens = TENS[(n / 10) as usize];
        return match n % 10 {
            0 => tens.to_string(),
            ones => format!("{} {}", tens, ONES[ones as usize]),
        };
    }

    let (scale, label) = SCALES
        .iter()
        .copied()
        .find(|(scale, _)| n >= *scale)
        .unwrap_or((100, "Hundred"));

    let head = format!("{} {}", spell(n / scale), label);
    match n % scale {
        0 => head,
        rest => format!("{} {}", head, spell(rest)),
    }
}
