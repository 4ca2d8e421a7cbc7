//! Display strings for prices and predictions.
//!
//! Prices follow the browser `toLocaleString()` convention for `en-US`:
//! comma thousands separators, at most three fraction digits, trailing
//! zeros trimmed. Rounding works on the shortest decimal form of the value,
//! half away from zero, so `2.0015` becomes `2.002`.

/// Maximum fraction digits shown for a spot price.
const PRICE_FRACTION_DIGITS: usize = 3;

/// `$` followed by the grouped price, e.g. `$67,012.345`.
pub fn usd(amount: f64) -> String {
    format!("${}", grouped(amount, PRICE_FRACTION_DIGITS))
}

/// Groups the integer part by thousands after rounding to `decimals`.
pub fn grouped(amount: f64, decimals: usize) -> String {
    if !amount.is_finite() {
        return non_finite(amount).to_string();
    }
    let formatted = round_half_away(amount, decimals);
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };

    let (sign, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", trimmed),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // "-0" after rounding a tiny negative value
    let sign = if grouped == "0" && fraction.is_none() { "" } else { sign };

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Rounds the shortest round-trip decimal of `amount` to `decimals` digits.
fn round_half_away(amount: f64, decimals: usize) -> String {
    let shortest = format!("{}", amount.abs());
    let (integer, fraction) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));

    let kept = &fraction[..fraction.len().min(decimals)];
    let round_up = fraction.as_bytes().get(decimals).map_or(false, |d| *d >= b'5');

    let mut digits: Vec<u8> = integer.bytes().chain(kept.bytes()).collect();
    if round_up {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - kept.len();
    let integer = String::from_utf8_lossy(&digits[..split]);
    let fraction = String::from_utf8_lossy(&digits[split..]);
    let sign = if amount.is_sign_negative() { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{integer}")
    } else {
        format!("{sign}{integer}.{fraction}")
    }
}

/// The prediction field text. Non-finite predictions are shown as-is.
pub fn prediction_text(prediction: f64) -> String {
    let value = if prediction.is_finite() {
        format!("{:.2}", prediction)
    } else {
        non_finite(prediction).to_string()
    };
    format!("Price Prediction for next 24hrs: ${value} (based on Linear Regression)")
}

fn non_finite(value: f64) -> &'static str {
    if value.is_nan() {
        "NaN"
    } else if value.is_sign_negative() {
        "-Infinity"
    } else {
        "Infinity"
    }
}
