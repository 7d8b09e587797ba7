//! Strict value parsers backing the typed column encodings.
//!
//! A value parses successfully only if the *entire* string is the value in
//! one of the accepted shapes. The parsers deliberately reject anything the
//! canonical encodings could not round-trip, so that byte equality of the
//! encoded forms coincides with value equality.

/// Parses an unsigned decimal integer, allowing `_` digit separators
/// (`"18_446_744_073_709_551_615"`).
///
/// Rejects empty input, strings longer than the widest possible value with
/// separators, non-digit characters and overflow.
pub fn try_parse_uint64(s: &str) -> Option<u64> {
    const MAX_LEN: usize = "18_446_744_073_709_551_615".len();
    if s.is_empty() || s.len() > MAX_LEN {
        return None;
    }
    let mut n: u64 = 0;
    for ch in s.bytes() {
        if ch == b'_' {
            continue;
        }
        if !ch.is_ascii_digit() {
            return None;
        }
        n = n.checked_mul(10)?.checked_add(u64::from(ch - b'0'))?;
    }
    Some(n)
}

/// Parses a plain decimal float: optional leading `-`, decimal digits, at
/// most one `.` that is neither leading nor trailing. Scientific notation
/// is rejected.
///
/// The result is composed with a fused multiply-add so that parsing is
/// deterministic across platforms.
pub fn try_parse_float64(s: &str) -> Option<f64> {
    if s.is_empty() || s.len() > 20 {
        return None;
    }
    let (minus, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let f = match s.find('.') {
        None => try_parse_uint64(s)? as f64,
        Some(0) => return None,
        Some(dot) if dot == s.len() - 1 => return None,
        Some(dot) => {
            let int_part = try_parse_uint64(&s[..dot])? as f64;
            let frac = &s[dot + 1..];
            let frac_part = try_parse_uint64(frac)? as f64;
            frac_part.mul_add(10f64.powi(-(frac.len() as i32)), int_part)
        }
    };
    Some(if minus { -f } else { f })
}

/// Parses a dotted-quad IPv4 address into its big-endian u32 form.
pub fn try_parse_ipv4(s: &str) -> Option<u32> {
    if s.len() < "1.1.1.1".len() || s.len() > "255.255.255.255".len() {
        return None;
    }
    let mut octets = s.split('.');
    let mut addr: u32 = 0;
    for _ in 0..4 {
        let part = octets.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let octet = try_parse_uint64(part)?;
        if octet > 255 {
            return None;
        }
        addr = (addr << 8) | octet as u32;
    }
    if octets.next().is_some() {
        return None;
    }
    Some(addr)
}

/// Parses a strict millisecond-precision ISO 8601 UTC timestamp,
/// `YYYY-MM-DDThh:mm:ss.mmmZ`, into nanoseconds since the Unix epoch.
///
/// Only years 1677 through 2262 are accepted; anything outside that range
/// would overflow the nanosecond representation.
pub fn try_parse_timestamp_iso8601(s: &str) -> Option<i64> {
    let b = s.as_bytes();
    if b.len() != "2006-01-02T15:04:05.999Z".len() {
        return None;
    }
    if b[4] != b'-'
        || b[7] != b'-'
        || b[10] != b'T'
        || b[13] != b':'
        || b[16] != b':'
        || b[19] != b'.'
        || b[23] != b'Z'
    {
        return None;
    }
    let year = parse_digits(&b[0..4])?;
    let month = parse_digits(&b[5..7])?;
    let day = parse_digits(&b[8..10])?;
    let hour = parse_digits(&b[11..13])?;
    let minute = parse_digits(&b[14..16])?;
    let second = parse_digits(&b[17..19])?;
    let millis = parse_digits(&b[20..23])?;

    if !(1677..=2262).contains(&year) {
        return None;
    }
    if !(1..=12).contains(&month) || day < 1 || day > days_in_month(year, month) {
        return None;
    }
    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }

    let days = days_from_civil(year as i64, month as u32, day as u32);
    let secs = days * 86_400 + (hour * 3_600 + minute * 60 + second) as i64;
    Some(secs * 1_000_000_000 + millis as i64 * 1_000_000)
}

fn parse_digits(b: &[u8]) -> Option<u64> {
    let mut n: u64 = 0;
    for &ch in b {
        if !ch.is_ascii_digit() {
            return None;
        }
        n = n * 10 + u64::from(ch - b'0');
    }
    Some(n)
}

fn days_in_month(year: u64, month: u64) -> u64 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        _ => 28,
    }
}

// Days since 1970-01-01 for a proleptic Gregorian date, via Howard
// Hinnant's civil-days algorithm.
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u64;
    let mp = if month > 2 { month - 3 } else { month + 9 } as u64;
    let doy = (153 * mp + 2) / 5 + day as u64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe as i64 - 719_468
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint64_basic() {
        assert_eq!(try_parse_uint64("0"), Some(0));
        assert_eq!(try_parse_uint64("012"), Some(12));
        assert_eq!(try_parse_uint64("18446744073709551615"), Some(u64::MAX));
        assert_eq!(try_parse_uint64("1_000_000"), Some(1_000_000));
    }

    #[test]
    fn uint64_rejects() {
        assert_eq!(try_parse_uint64(""), None);
        assert_eq!(try_parse_uint64("-1"), None);
        assert_eq!(try_parse_uint64("12a"), None);
        assert_eq!(try_parse_uint64("1.5"), None);
        // one past u64::MAX
        assert_eq!(try_parse_uint64("18446744073709551616"), None);
        // over the length cap even though all digits
        assert_eq!(try_parse_uint64("000000000000000000000000000"), None);
    }

    #[test]
    fn float64_basic() {
        assert_eq!(try_parse_float64("0"), Some(0.0));
        assert_eq!(try_parse_float64("123"), Some(123.0));
        assert_eq!(try_parse_float64("-12.34"), Some(-12.34));
        assert_eq!(try_parse_float64("0.25"), Some(0.25));
    }

    #[test]
    fn float64_rejects() {
        assert_eq!(try_parse_float64(""), None);
        assert_eq!(try_parse_float64(".5"), None);
        assert_eq!(try_parse_float64("5."), None);
        assert_eq!(try_parse_float64("1e3"), None);
        assert_eq!(try_parse_float64("1.2.3"), None);
        assert_eq!(try_parse_float64("123456789012345678901"), None);
    }

    #[test]
    fn ipv4_basic() {
        assert_eq!(try_parse_ipv4("0.0.0.0"), Some(0));
        assert_eq!(try_parse_ipv4("1.2.3.4"), Some(0x01020304));
        assert_eq!(try_parse_ipv4("255.255.255.255"), Some(u32::MAX));
    }

    #[test]
    fn ipv4_rejects() {
        assert_eq!(try_parse_ipv4("1.2.3"), None);
        assert_eq!(try_parse_ipv4("1.2.3.4.5"), None);
        assert_eq!(try_parse_ipv4("256.1.1.1"), None);
        assert_eq!(try_parse_ipv4("1.2.3."), None);
        assert_eq!(try_parse_ipv4("a.b.c.d"), None);
        assert_eq!(try_parse_ipv4("1.2.3.1234"), None);
    }

    #[test]
    fn timestamp_basic() {
        assert_eq!(try_parse_timestamp_iso8601("1970-01-01T00:00:00.000Z"), Some(0));
        assert_eq!(
            try_parse_timestamp_iso8601("1970-01-01T00:00:00.001Z"),
            Some(1_000_000)
        );
        assert_eq!(
            try_parse_timestamp_iso8601("1970-01-02T00:00:00.000Z"),
            Some(86_400_000_000_000)
        );
        // leap day
        assert_eq!(
            try_parse_timestamp_iso8601("2024-02-29T12:30:45.123Z"),
            Some(1_709_209_845_123_000_000)
        );
        // negative nanos before the epoch
        assert_eq!(
            try_parse_timestamp_iso8601("1969-12-31T23:59:59.000Z"),
            Some(-1_000_000_000)
        );
    }

    #[test]
    fn timestamp_rejects() {
        assert_eq!(try_parse_timestamp_iso8601("2024-02-30T00:00:00.000Z"), None);
        assert_eq!(try_parse_timestamp_iso8601("2023-02-29T00:00:00.000Z"), None);
        assert_eq!(try_parse_timestamp_iso8601("2024-13-01T00:00:00.000Z"), None);
        assert_eq!(try_parse_timestamp_iso8601("2024-01-01T24:00:00.000Z"), None);
        assert_eq!(try_parse_timestamp_iso8601("2024-01-01 00:00:00.000Z"), None);
        assert_eq!(try_parse_timestamp_iso8601("2024-01-01T00:00:00.000"), None);
        assert_eq!(try_parse_timestamp_iso8601("2024-01-01T00:00:00Z"), None);
        // outside the representable year range
        assert_eq!(try_parse_timestamp_iso8601("1676-12-31T00:00:00.000Z"), None);
        assert_eq!(try_parse_timestamp_iso8601("2263-01-01T00:00:00.000Z"), None);
    }
}
